use super::*;
use fdr_common::interner::Interner;

#[test]
fn test_only_outermost_frame_drains() {
    let mut tasks = PostponedTasks::new();
    assert!(tasks.enter());
    assert!(!tasks.enter());
    tasks.leave();
    tasks.leave();
    assert!(tasks.enter());
}

#[test]
fn test_queue_is_fifo_and_counts_executed() {
    let mut interner = Interner::new();
    let value = interner.intern("value");
    let mut tasks = PostponedTasks::new();
    tasks.push(PendingAction::SetAnnotationType {
        annotation: AnnotationId(0),
        class: FqNameUnsafe::new("a.A"),
    });
    tasks.push(PendingAction::BindEnumEntry {
        annotation: AnnotationId(0),
        argument: value,
        element: None,
    });
    assert_eq!(tasks.len(), 2);

    assert!(matches!(
        tasks.pop(),
        Some(PendingAction::SetAnnotationType { .. })
    ));
    assert!(matches!(tasks.pop(), Some(PendingAction::BindEnumEntry { .. })));
    assert!(tasks.pop().is_none());
    assert!(tasks.is_empty());
    assert_eq!(tasks.executed(), 2);
}
