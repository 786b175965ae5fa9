use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use specs::Entity;

use crate::error::SchedulerError;

/// Ticks between two turns of an actor moving at `speed`. Speeds below 1 are
/// treated as 1; actor construction rejects them before they get here.
pub fn turn_delay(speed: i32) -> u64 {
    (1000 / speed.max(1)) as u64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTurn<A = Entity> {
    pub actor: A,
    /// Absolute tick at which the actor acts.
    pub priority: u64,
}

#[derive(Clone, Copy, Debug)]
struct QueueEntry<A> {
    priority: u64,
    sequence: u64,
    actor: A,
}

impl<A> PartialEq for QueueEntry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<A> Eq for QueueEntry<A> {}

impl<A> PartialOrd for QueueEntry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for QueueEntry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Min-queue of actors keyed by the tick they next act on. Equal priorities come
/// out in insertion order, and each actor holds at most one entry.
#[derive(Clone, Debug)]
pub struct TurnScheduler<A = Entity> {
    heap: BinaryHeap<Reverse<QueueEntry<A>>>,
    next_sequence: u64,
}

impl<A> Default for TurnScheduler<A> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<A: Copy + Eq> TurnScheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `actor` at `priority`, replacing any entry it already had.
    pub fn insert(&mut self, actor: A, priority: u64) {
        self.remove(actor);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(QueueEntry {
            priority,
            sequence,
            actor,
        }));
    }

    pub fn extract_min(&mut self) -> Result<ScheduledTurn<A>, SchedulerError> {
        self.heap
            .pop()
            .map(|Reverse(entry)| ScheduledTurn {
                actor: entry.actor,
                priority: entry.priority,
            })
            .ok_or(SchedulerError::Empty)
    }

    pub fn peek(&self) -> Option<ScheduledTurn<A>> {
        self.heap.peek().map(|Reverse(entry)| ScheduledTurn {
            actor: entry.actor,
            priority: entry.priority,
        })
    }

    /// Drops the actor's entry; false when it had none.
    pub fn remove(&mut self, actor: A) -> bool {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| entry.actor != actor);
        self.heap.len() != before
    }

    pub fn reschedule(&mut self, actor: A, priority: u64) {
        self.insert(actor, priority);
    }

    pub fn contains(&self, actor: A) -> bool {
        self.heap.iter().any(|Reverse(entry)| entry.actor == actor)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lowest_priority_first() {
        let mut queue = TurnScheduler::new();
        queue.insert('a', 30);
        queue.insert('b', 10);
        queue.insert('c', 20);
        let order: Vec<char> = (0..3).map(|_| queue.extract_min().unwrap().actor).collect();
        assert_eq!(order, vec!['b', 'c', 'a']);
        assert!(matches!(queue.extract_min(), Err(SchedulerError::Empty)));
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut queue = TurnScheduler::new();
        for actor in [4u32, 1, 3, 2] {
            queue.insert(actor, 100);
        }
        let order: Vec<u32> = (0..4).map(|_| queue.extract_min().unwrap().actor).collect();
        assert_eq!(order, vec![4, 1, 3, 2]);
    }

    #[test]
    fn reinsert_replaces_existing_entry() {
        let mut queue = TurnScheduler::new();
        queue.insert(1u32, 5);
        queue.insert(2u32, 7);
        queue.reschedule(1, 50);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek().map(|turn| turn.actor), Some(2));
        assert!(queue.remove(2));
        assert!(!queue.remove(2));
        assert!(!queue.contains(2));
        assert_eq!(
            queue.extract_min().unwrap(),
            ScheduledTurn {
                actor: 1,
                priority: 50
            }
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn delay_follows_speed() {
        assert_eq!(turn_delay(10), 100);
        assert_eq!(turn_delay(30), 33);
        assert_eq!(turn_delay(0), 1000);
        assert_eq!(turn_delay(-4), 1000);
    }

    proptest! {
        #[test]
        fn extract_min_never_skips_a_smaller_priority(
            priorities in prop::collection::vec(0u64..1_000, 1..64)
        ) {
            let mut queue = TurnScheduler::new();
            for (actor, &priority) in priorities.iter().enumerate() {
                queue.insert(actor, priority);
            }
            let mut last = 0;
            let mut extracted = 0;
            while let Ok(turn) = queue.extract_min() {
                prop_assert!(turn.priority >= last);
                last = turn.priority;
                extracted += 1;
            }
            prop_assert_eq!(extracted, priorities.len());
            prop_assert!(queue.is_empty());
        }
    }
}
