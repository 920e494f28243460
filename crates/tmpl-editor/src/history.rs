//! Undo/redo history.
//!
//! Two stacks of executed commands. Executing a new command clears the redo
//! stack; undo pops and reverts; redo pops and re-applies. The undo stack is
//! bounded and drops its oldest entry once full.
//!
//! Gestures that produce several commands (a drag, a multi-field form
//! commit) can be grouped so they undo as a single step.

use crate::commands::{Command, EditorContext};

pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Group nesting depth (0 = not grouping).
    group_depth: usize,
    /// Commands executed inside the open group.
    group: Vec<Command>,
}

impl CommandHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(256)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            group_depth: 0,
            group: Vec::new(),
        }
    }

    /// Apply a command and record it.
    pub fn execute(&mut self, cmd: Command, ctx: &mut EditorContext<'_>) {
        log::debug!("execute: {}", cmd.label());
        cmd.execute(ctx);
        self.push_executed(cmd);
    }

    /// Record a command whose effect has already been applied, e.g. by a
    /// direct-manipulation gesture on the canvas.
    pub fn push_executed(&mut self, cmd: Command) {
        if self.group_depth > 0 {
            self.group.push(cmd);
            return;
        }
        self.push(cmd);
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            let dropped = self.undo_stack.remove(0);
            log::debug!("history full, dropped oldest: {}", dropped.label());
        }
        // A new action invalidates everything that was undone.
        self.redo_stack.clear();
    }

    /// Revert the most recent command. Returns false if there is nothing
    /// to undo or a group is still open.
    pub fn undo(&mut self, ctx: &mut EditorContext<'_>) -> bool {
        if self.group_depth > 0 {
            log::warn!("undo refused while a command group is open");
            return false;
        }
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("undo: {}", cmd.label());
        cmd.undo(ctx);
        self.redo_stack.push(cmd);
        true
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, ctx: &mut EditorContext<'_>) -> bool {
        if self.group_depth > 0 {
            log::warn!("redo refused while a command group is open");
            return false;
        }
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("redo: {}", cmd.label());
        cmd.redo(ctx);
        self.undo_stack.push(cmd);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.group_depth == 0 && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.group_depth == 0 && !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(Command::label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(Command::label)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Drop all history. An open group is discarded too; its commands stay
    /// applied.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group.clear();
        self.group_depth = 0;
    }

    // ─── Grouping ────────────────────────────────────────────────────────

    /// Start a group. Groups nest; only the outermost `end_group` records.
    pub fn begin_group(&mut self) {
        self.group_depth += 1;
    }

    pub fn in_group(&self) -> bool {
        self.group_depth > 0
    }

    /// Close a group. When the outermost group closes, its commands are
    /// recorded as one composite entry labelled `label`. A group holding a
    /// single command records that command as-is; an empty group records
    /// nothing.
    pub fn end_group(&mut self, label: &str) {
        if self.group_depth == 0 {
            log::warn!("end_group without matching begin_group");
            return;
        }
        self.group_depth -= 1;
        if self.group_depth > 0 {
            return;
        }
        let mut commands = std::mem::take(&mut self.group);
        commands.retain(|c| !c.is_empty());
        match commands.len() {
            0 => {}
            1 => {
                if let Some(cmd) = commands.pop() {
                    self.push(cmd);
                }
            }
            _ => self.push(Command::composite(label, commands)),
        }
    }
}
