/// Dispatch priority of a submitted task.
///
/// Priorities only order an executor's queue: a higher priority task is
/// dequeued before a lower one. Tasks of equal priority are dequeued in
/// submission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
}
