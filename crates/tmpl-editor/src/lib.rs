pub mod bus;
pub mod commands;
pub mod form;
pub mod history;
pub mod session;
pub mod shortcuts;

pub use bus::{CoalescingQueue, EditorEvent, EventBus, PropertyChanged, SubscriberId};
pub use commands::{Command, EditorContext, MoveKind, ObjectChange, PropChange};
pub use form::{FormState, PatchOptions};
pub use history::CommandHistory;
pub use session::EditorSession;
pub use shortcuts::{EditorAction, ShortcutMap};
