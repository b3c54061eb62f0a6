//! Undo/Redo Command Stack
//!
//! # Overview
//!
//! [`CommandStack`] keeps a bounded linear history of reversible commands. Commands before the
//! current position are applied; commands after it have been undone and can be redone.
//!
//! - Pushing a command executes it, discards everything redoable, then either folds it into
//!   the command on top (see [`UndoCommand::merge_with`]) or appends it.
//! - When the stack is full the oldest command is evicted.
//! - The clean point records where the history was last saved. A command never merges into the
//!   command at the clean point, and a clean point that gets discarded or evicted becomes
//!   unreachable.
//!
//! # Example
//!
//! ```rust
//! use tilemap_core::{CommandError, CommandStack, UndoCommand};
//!
//! struct Add(i32);
//!
//! impl UndoCommand for Add {
//!     type Target = i32;
//!     type Kind = ();
//!
//!     fn kind(&self) {}
//!
//!     fn text(&self) -> &'static str {
//!         "Add"
//!     }
//!
//!     fn redo(&mut self, target: &mut i32) -> Result<(), CommandError> {
//!         *target += self.0;
//!         Ok(())
//!     }
//!
//!     fn undo(&mut self, target: &mut i32) -> Result<(), CommandError> {
//!         *target -= self.0;
//!         Ok(())
//!     }
//!
//!     fn merge_with(&mut self, other: &mut Self) -> bool {
//!         self.0 += other.0;
//!         true
//!     }
//! }
//!
//! let mut value = 0;
//! let mut stack = CommandStack::new(16);
//! stack.push(Add(2), &mut value).unwrap();
//! stack.push(Add(3), &mut value).unwrap();
//! assert_eq!((value, stack.size()), (5, 1));
//!
//! stack.undo(&mut value).unwrap();
//! assert_eq!(value, 0);
//! ```

use crate::commands::CommandError;
use std::fmt::Debug;

/// A reversible edit of some target.
pub trait UndoCommand {
    /// The state the command edits.
    type Target;
    /// Tag compared before attempting a merge.
    type Kind: PartialEq + Copy + Debug;

    /// Kind tag of this command.
    fn kind(&self) -> Self::Kind;

    /// Label for undo/redo menu entries.
    fn text(&self) -> &'static str;

    /// Apply (or re-apply) the command.
    fn redo(&mut self, target: &mut Self::Target) -> Result<(), CommandError>;

    /// Revert the command.
    fn undo(&mut self, target: &mut Self::Target) -> Result<(), CommandError>;

    /// Fold the already applied `other` into `self`.
    ///
    /// Returns `true` if `other` was absorbed and can be discarded. Only called with a command
    /// of the same kind that was applied right after `self`.
    fn merge_with(&mut self, _other: &mut Self) -> bool {
        false
    }
}

/// Bounded undo/redo history.
#[derive(Debug)]
pub struct CommandStack<C> {
    commands: Vec<C>,
    capacity: usize,
    /// Number of applied commands.
    applied: usize,
    /// Value of `applied` at the clean point. May exceed `applied` while the clean point is in
    /// the redo area.
    clean_at: Option<usize>,
}

impl<C: UndoCommand> CommandStack<C> {
    /// Create an empty stack that keeps at most `capacity` commands (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            commands: Vec::new(),
            capacity: capacity.max(1),
            applied: 0,
            clean_at: Some(0),
        }
    }

    /// Execute `command` and record it.
    ///
    /// If execution fails nothing is recorded and the error is returned.
    pub fn push(&mut self, mut command: C, target: &mut C::Target) -> Result<(), CommandError> {
        command.redo(target)?;
        self.store(command);
        Ok(())
    }

    /// Record a command whose effect has already been applied.
    pub fn store(&mut self, mut command: C) {
        self.discard_redoable();

        if self.clean_at != Some(self.applied)
            && let Some(top) = self.commands.last_mut()
            && top.kind() == command.kind()
            && top.merge_with(&mut command)
        {
            tracing::debug!(kind = ?top.kind(), "merged command");
            return;
        }

        if self.commands.len() >= self.capacity {
            self.evict_oldest();
        }

        tracing::debug!(kind = ?command.kind(), text = command.text(), "pushed command");
        self.commands.push(command);
        self.applied = self.commands.len();
    }

    /// Revert the current command. Does nothing if everything is undone.
    pub fn undo(&mut self, target: &mut C::Target) -> Result<(), CommandError> {
        let Some(index) = self.applied.checked_sub(1) else {
            return Ok(());
        };
        let command = &mut self.commands[index];
        command.undo(target)?;
        tracing::debug!(kind = ?command.kind(), "undid command");
        self.applied = index;
        Ok(())
    }

    /// Re-apply the next undone command. Does nothing if nothing is redoable.
    pub fn redo(&mut self, target: &mut C::Target) -> Result<(), CommandError> {
        let Some(command) = self.commands.get_mut(self.applied) else {
            return Ok(());
        };
        command.redo(target)?;
        tracing::debug!(kind = ?command.kind(), "redid command");
        self.applied += 1;
        Ok(())
    }

    /// Drop every command. The empty history is clean.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.applied = 0;
        self.clean_at = Some(0);
    }

    /// Number of stored commands.
    pub fn size(&self) -> usize {
        self.commands.len()
    }

    /// Maximum number of stored commands.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity (at least one), evicting commands that no longer fit.
    ///
    /// Applied commands are evicted oldest first. Redoable commands are only dropped, newest
    /// first, once no applied command is left.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.commands.len() > self.capacity {
            if self.applied > 0 {
                self.evict_oldest();
            } else {
                self.commands.pop();
                if self.clean_at.is_some_and(|clean| clean > self.commands.len()) {
                    self.clean_at = None;
                }
            }
        }
    }

    /// Index of the current (most recently applied) command.
    pub fn index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Index of the command at the clean point.
    pub fn clean_index(&self) -> Option<usize> {
        self.clean_at.and_then(|clean| clean.checked_sub(1))
    }

    /// Returns `true` if the history is at the clean point.
    pub fn is_clean(&self) -> bool {
        self.clean_at == Some(self.applied)
    }

    /// Make the current position the clean point.
    pub fn mark_as_clean(&mut self) {
        self.clean_at = Some(self.applied);
    }

    /// Forget the clean point.
    pub fn reset_clean(&mut self) {
        self.clean_at = None;
    }

    /// Returns `true` if a command can be undone.
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Returns `true` if a command can be redone.
    pub fn can_redo(&self) -> bool {
        self.applied < self.commands.len()
    }

    /// Label of the command [`CommandStack::undo`] would revert.
    pub fn undo_text(&self) -> Option<&'static str> {
        self.index().map(|index| self.commands[index].text())
    }

    /// Label of the command [`CommandStack::redo`] would apply.
    pub fn redo_text(&self) -> Option<&'static str> {
        self.commands.get(self.applied).map(UndoCommand::text)
    }

    fn discard_redoable(&mut self) {
        if !self.can_redo() {
            return;
        }
        if self.clean_at.is_some_and(|clean| clean > self.applied) {
            self.clean_at = None;
        }
        tracing::trace!(count = self.commands.len() - self.applied, "discarded redoable commands");
        self.commands.truncate(self.applied);
    }

    fn evict_oldest(&mut self) {
        let evicted = self.commands.remove(0);
        tracing::debug!(kind = ?evicted.kind(), "evicted oldest command");
        self.applied = self.applied.saturating_sub(1);
        self.clean_at = match self.clean_at {
            Some(0) | None => None,
            Some(clean) => Some(clean - 1),
        };
    }
}
