pub mod config;
pub mod geometry;
pub mod id;
pub mod layers;
pub mod mapper;
pub mod model;
pub mod scene;
pub mod style;

pub use config::EditorConfig;
pub use id::{LayerId, ObjectId};
pub use layers::{Layer, LayerRegistry};
pub use mapper::{CanvasObjectProperties, FormValues, PropertyMapper, PropertyPatch};
pub use model::*;
pub use scene::{MemoryScene, SceneFacade};
pub use style::{CharStyle, TextStyles};

// Re-export kurbo's rectangle so downstream crates don't need a direct dependency
pub use kurbo::Rect;
