//! In-memory deadline queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::Task;

/// Wrapper ordering tasks by deadline, earliest first.
///
/// Ties between equal deadlines are left to the heap.
struct DeadlineEntry {
    task: Task,
}

impl PartialEq for DeadlineEntry {
    fn eq(&self, other: &Self) -> bool {
        self.task.next_deadline_ms == other.task.next_deadline_ms
    }
}

impl Eq for DeadlineEntry {}

impl PartialOrd for DeadlineEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeadlineEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for max-heap: the smallest deadline sits on top.
        other
            .task
            .next_deadline_ms
            .cmp(&self.task.next_deadline_ms)
    }
}

/// Min-heap of tasks keyed by `next_deadline_ms`.
/// O(log n) push and pop, O(1) peek.
#[derive(Default)]
pub struct DeadlineQueue {
    tasks: BinaryHeap<DeadlineEntry>,
}

impl DeadlineQueue {
    /// Create an empty queue with room for `capacity` tasks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: BinaryHeap::with_capacity(capacity.min(1024)),
        }
    }

    /// Insert a task.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(DeadlineEntry { task });
    }

    /// Deadline of the earliest task, if any.
    #[must_use]
    pub fn peek_deadline(&self) -> Option<u64> {
        self.tasks.peek().map(|e| e.task.next_deadline_ms)
    }

    /// Remove and return the earliest task.
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop().map(|e| e.task)
    }

    /// Remove every task matching `pred` and return how many were dropped.
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Task) -> bool,
    {
        let before = self.tasks.len();
        let tasks: Vec<_> = self.tasks.drain().collect();
        self.tasks = tasks.into_iter().filter(|e| !pred(&e.task)).collect();
        before.saturating_sub(self.tasks.len())
    }

    /// Remove all tasks without running them.
    pub fn drain(&mut self) -> Vec<Task> {
        self.tasks.drain().map(|e| e.task).collect()
    }

    /// Current depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
