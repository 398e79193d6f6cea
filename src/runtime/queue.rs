use crate::runtime::task::{Priority, Runnable};

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A queued task together with its ordering key.
struct Entry {
    priority: Priority,

    /// Submission sequence number; breaks ties between equal priorities.
    seq: u64,

    task: Box<dyn Runnable>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// Higher priority first, then lower sequence number first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of pending tasks shared by both executors.
///
/// Tasks are popped highest priority first. Tasks of equal priority come
/// out in the order they were pushed.
///
/// The queue itself is not synchronized; executors keep it behind their own
/// lock together with the rest of their state.
pub(crate) struct TaskQueue {
    heap: BinaryHeap<Entry>,

    /// Next sequence number to hand out.
    next_seq: u64,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Pushes a task with the given priority.
    pub(crate) fn push(&mut self, priority: Priority, task: Box<dyn Runnable>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.heap.push(Entry {
            priority,
            seq,
            task,
        });
    }

    /// Pops the highest-priority, earliest-submitted task.
    pub(crate) fn pop(&mut self) -> Option<Box<dyn Runnable>> {
        self.heap.pop().map(|entry| entry.task)
    }

    /// Removes every queued task, highest priority first.
    pub(crate) fn drain(&mut self) -> Vec<Box<dyn Runnable>> {
        let mut tasks = Vec::with_capacity(self.heap.len());

        while let Some(task) = self.pop() {
            tasks.push(task);
        }

        tasks
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}
