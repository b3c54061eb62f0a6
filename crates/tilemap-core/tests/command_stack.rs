use pretty_assertions::assert_eq;
use tilemap_core::{CommandError, CommandStack, UndoCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    First,
    Second,
}

/// Records every call in the target log and never merges.
struct Mock(Kind);

impl UndoCommand for Mock {
    type Target = Vec<String>;
    type Kind = Kind;

    fn kind(&self) -> Kind {
        self.0
    }

    fn text(&self) -> &'static str {
        match self.0 {
            Kind::First => "First",
            Kind::Second => "Second",
        }
    }

    fn redo(&mut self, target: &mut Vec<String>) -> Result<(), CommandError> {
        target.push(format!("redo {}", self.text()));
        Ok(())
    }

    fn undo(&mut self, target: &mut Vec<String>) -> Result<(), CommandError> {
        target.push(format!("undo {}", self.text()));
        Ok(())
    }
}

/// Adds its value to the target and folds consecutive additions together.
struct Add(i32);

impl UndoCommand for Add {
    type Target = i32;
    type Kind = ();

    fn kind(&self) {}

    fn text(&self) -> &'static str {
        "Add"
    }

    fn redo(&mut self, target: &mut i32) -> Result<(), CommandError> {
        *target += self.0;
        Ok(())
    }

    fn undo(&mut self, target: &mut i32) -> Result<(), CommandError> {
        *target -= self.0;
        Ok(())
    }

    fn merge_with(&mut self, other: &mut Self) -> bool {
        self.0 += other.0;
        true
    }
}

/// Always fails to execute.
struct Broken;

impl UndoCommand for Broken {
    type Target = i32;
    type Kind = ();

    fn kind(&self) {}

    fn text(&self) -> &'static str {
        "Broken"
    }

    fn redo(&mut self, _: &mut i32) -> Result<(), CommandError> {
        Err(CommandError::InvalidArgument("broken".to_string()))
    }

    fn undo(&mut self, _: &mut i32) -> Result<(), CommandError> {
        Ok(())
    }
}

fn first() -> Mock {
    Mock(Kind::First)
}

fn second() -> Mock {
    Mock(Kind::Second)
}

#[test]
fn test_new_stack() {
    let stack: CommandStack<Mock> = CommandStack::new(64);
    assert_eq!(stack.size(), 0);
    assert_eq!(stack.capacity(), 64);
    assert!(stack.is_clean());
    assert!(!stack.can_undo());
    assert!(!stack.can_redo());
    assert_eq!(stack.index(), None);
    assert_eq!(stack.clean_index(), None);
    assert_eq!(stack.undo_text(), None);
    assert_eq!(stack.redo_text(), None);
}

#[test]
fn test_mixed_usage() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(64);

    stack.push(first(), &mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (1, Some(0)));
    assert!(stack.can_undo());
    assert!(!stack.can_redo());

    stack.push(second(), &mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (2, Some(1)));
    assert_eq!(stack.undo_text(), Some("Second"));

    stack.undo(&mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (2, Some(0)));
    assert!(stack.can_undo());
    assert!(stack.can_redo());
    assert_eq!(stack.redo_text(), Some("Second"));

    stack.undo(&mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (2, None));
    assert!(!stack.can_undo());
    assert!(stack.can_redo());

    stack.redo(&mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (2, Some(0)));
    stack.redo(&mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (2, Some(1)));
    assert!(!stack.can_redo());

    stack.push(first(), &mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (3, Some(2)));

    stack.undo(&mut log).unwrap();
    stack.undo(&mut log).unwrap();
    stack.undo(&mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (3, None));
    assert!(!stack.can_undo());
    assert!(stack.can_redo());

    // Pushing discards everything that could have been redone.
    stack.push(second(), &mut log).unwrap();
    assert_eq!((stack.size(), stack.index()), (1, Some(0)));
    assert!(!stack.can_redo());
    assert_eq!(stack.clean_index(), None);

    assert_eq!(
        log,
        vec![
            "redo First",
            "redo Second",
            "undo Second",
            "undo First",
            "redo First",
            "redo Second",
            "redo First",
            "undo First",
            "undo Second",
            "undo First",
            "redo Second",
        ]
    );
}

#[test]
fn test_undo_and_redo_at_the_ends_do_nothing() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(8);
    stack.undo(&mut log).unwrap();
    stack.push(first(), &mut log).unwrap();
    stack.redo(&mut log).unwrap();
    assert_eq!(log, vec!["redo First"]);
    assert_eq!(stack.index(), Some(0));
}

#[test]
fn test_clean_index_management() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(32);
    assert_eq!(stack.clean_index(), None);
    assert!(stack.is_clean());

    stack.mark_as_clean();
    assert_eq!(stack.clean_index(), None);
    assert!(stack.is_clean());

    stack.push(first(), &mut log).unwrap();
    assert_eq!(stack.clean_index(), None);
    assert!(!stack.is_clean());

    // Back at the empty history, which was clean.
    stack.undo(&mut log).unwrap();
    assert!(stack.is_clean());

    stack.push(first(), &mut log).unwrap();
    stack.push(second(), &mut log).unwrap();
    assert_eq!((stack.clean_index(), stack.index()), (None, Some(1)));
    assert!(!stack.is_clean());

    stack.mark_as_clean();
    assert_eq!((stack.clean_index(), stack.index()), (Some(1), Some(1)));
    assert!(stack.is_clean());

    stack.undo(&mut log).unwrap();
    assert_eq!((stack.clean_index(), stack.index()), (Some(1), Some(0)));
    assert!(!stack.is_clean());

    stack.redo(&mut log).unwrap();
    assert_eq!((stack.clean_index(), stack.index()), (Some(1), Some(1)));
    assert!(stack.is_clean());

    // The clean command is discarded, so the clean point becomes unreachable.
    stack.undo(&mut log).unwrap();
    stack.push(first(), &mut log).unwrap();
    assert_eq!((stack.clean_index(), stack.index()), (None, Some(1)));
    assert!(!stack.is_clean());

    stack.mark_as_clean();
    assert_eq!((stack.clean_index(), stack.index()), (Some(1), Some(1)));
    assert!(stack.is_clean());

    stack.reset_clean();
    assert_eq!((stack.clean_index(), stack.index()), (None, Some(1)));
    assert!(!stack.is_clean());
}

#[test]
fn test_overflow_with_clean_index() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(4);

    stack.push(first(), &mut log).unwrap();
    stack.push(second(), &mut log).unwrap();
    stack.mark_as_clean();
    stack.push(first(), &mut log).unwrap();
    stack.push(second(), &mut log).unwrap();
    assert_eq!(stack.size(), stack.capacity());
    assert_eq!((stack.clean_index(), stack.index()), (Some(1), Some(3)));
    assert!(!stack.is_clean());

    stack.push(first(), &mut log).unwrap();
    assert_eq!(stack.size(), stack.capacity());
    assert_eq!((stack.clean_index(), stack.index()), (Some(0), Some(3)));

    stack.push(second(), &mut log).unwrap();
    assert_eq!(stack.size(), stack.capacity());
    assert_eq!((stack.clean_index(), stack.index()), (None, Some(3)));
    assert!(!stack.is_clean());
}

#[test]
fn test_simple_overflow() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(100);
    for _ in 0..110 {
        stack.push(first(), &mut log).unwrap();
    }
    assert_eq!(stack.size(), stack.capacity());
    assert_eq!(stack.index(), Some(stack.capacity() - 1));
}

#[test]
fn test_dynamic_capacity() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(50);
    for _ in 0..50 {
        stack.push(first(), &mut log).unwrap();
    }
    assert_eq!(stack.size(), stack.capacity());

    stack.set_capacity(20);
    assert_eq!((stack.size(), stack.capacity()), (20, 20));
    assert_eq!(stack.index(), Some(19));

    stack.set_capacity(25);
    assert_eq!((stack.size(), stack.capacity()), (20, 25));
}

#[test]
fn test_shrinking_keeps_applied_commands_over_redoable_ones() {
    let mut log = Vec::new();
    let mut stack = CommandStack::new(10);
    for _ in 0..6 {
        stack.push(first(), &mut log).unwrap();
    }
    for _ in 0..4 {
        stack.undo(&mut log).unwrap();
    }

    // Two applied, four redoable: the applied ones go first.
    stack.set_capacity(4);
    assert_eq!((stack.size(), stack.index()), (4, None));

    stack.set_capacity(1);
    assert_eq!((stack.size(), stack.index()), (1, None));
    assert!(stack.can_redo());
}

#[test]
fn test_merging() {
    let mut value = 0;
    let mut stack = CommandStack::new(16);

    stack.push(Add(1), &mut value).unwrap();
    stack.push(Add(2), &mut value).unwrap();
    assert_eq!((value, stack.size()), (3, 1));

    // Never merge into the command at the clean point.
    stack.mark_as_clean();
    stack.push(Add(4), &mut value).unwrap();
    assert_eq!((value, stack.size()), (7, 2));

    stack.undo(&mut value).unwrap();
    assert_eq!(value, 3);
    assert!(stack.is_clean());
    stack.undo(&mut value).unwrap();
    assert_eq!(value, 0);
}

#[test]
fn test_failed_push_is_not_recorded() {
    let mut value = 0;
    let mut stack = CommandStack::new(4);
    let result = stack.push(Broken, &mut value);
    assert!(result.is_err());
    assert_eq!(stack.size(), 0);
    assert!(stack.is_clean());
}

#[test]
fn test_store_records_without_executing() {
    let mut value = 5;
    let mut stack = CommandStack::new(4);
    stack.store(Add(5));
    assert_eq!(value, 5);
    stack.undo(&mut value).unwrap();
    assert_eq!(value, 0);
    stack.redo(&mut value).unwrap();
    assert_eq!(value, 5);
}

#[test]
fn test_clear() {
    let mut value = 0;
    let mut stack = CommandStack::new(4);
    stack.push(Add(1), &mut value).unwrap();
    stack.clear();
    assert_eq!(stack.size(), 0);
    assert!(stack.is_clean());
    assert!(!stack.can_undo());
}
