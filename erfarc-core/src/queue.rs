//! Fixed-capacity ring queue.
//!
//! [`Queue`] stores at most `max_length` elements in a circular buffer. The
//! oldest element sits at the `tail` slot and the logical order is
//! `[tail, tail + 1, ...]` modulo `max_length`. Pushing into a full queue is
//! rejected rather than overwriting the oldest element.
//!
//! Indices accepted by [`Queue::get`] and [`Queue::set`] are logical
//! positions and wrap from the end when negative, like [`crate::Array`].

/// A bounded FIFO queue over a circular buffer.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    /// Slot storage; `None` marks an unused slot.
    buffer: Vec<Option<T>>,
    /// Slot of the logically first element.
    tail: usize,
    /// Number of elements currently queued.
    length: usize,
}

impl<T> Queue<T> {
    /// Create an empty queue holding at most `max_length` elements.
    pub fn new(max_length: usize) -> Self {
        Self {
            buffer: (0..max_length).map(|_| None).collect(),
            tail: 0,
            length: 0,
        }
    }

    /// Maximum number of elements.
    pub fn max_length(&self) -> usize {
        self.buffer.len()
    }

    /// Number of queued elements.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Check if the queue is full.
    pub fn is_full(&self) -> bool {
        self.length == self.buffer.len()
    }

    /// Map a logical position to a buffer slot.
    fn slot(&self, index: usize) -> usize {
        (index + self.tail) % self.buffer.len()
    }

    /// Resolve a possibly negative logical index.
    fn resolve(&self, index: isize) -> Option<usize> {
        let len = self.length as isize;
        let index = if index < 0 { index + len } else { index };
        if (0..len).contains(&index) {
            Some(self.slot(index as usize))
        } else {
            None
        }
    }

    /// Append `value` at the back.
    ///
    /// Returns 1 if accepted, 0 if the queue is full.
    pub fn push(&mut self, value: T) -> usize {
        if self.is_full() {
            return 0;
        }
        let slot = self.slot(self.length);
        self.buffer[slot] = Some(value);
        self.length += 1;
        1
    }

    /// Insert `value` at the front.
    ///
    /// Returns 1 if accepted, 0 if the queue is full.
    pub fn push_front(&mut self, value: T) -> usize {
        if self.is_full() {
            return 0;
        }
        let capacity = self.buffer.len();
        self.tail = (self.tail + capacity - 1) % capacity;
        self.buffer[self.tail] = Some(value);
        self.length += 1;
        1
    }

    /// Remove and return the front element.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.buffer[self.tail].take();
        self.tail = (self.tail + 1) % self.buffer.len();
        self.length -= 1;
        value
    }

    /// Remove and return the back element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let slot = self.slot(self.length - 1);
        self.length -= 1;
        self.buffer[slot].take()
    }

    /// Peek at the front element.
    pub fn peek(&self) -> Option<&T> {
        self.get(0)
    }

    /// Get the element at logical position `index`.
    pub fn get(&self, index: isize) -> Option<&T> {
        self.resolve(index).and_then(|slot| self.buffer[slot].as_ref())
    }

    /// Get a mutable reference to the element at logical position `index`.
    pub fn get_mut(&mut self, index: isize) -> Option<&mut T> {
        self.resolve(index)
            .and_then(|slot| self.buffer[slot].as_mut())
    }

    /// Replace the element at logical position `index` in place.
    ///
    /// Returns 1 if an element was replaced, 0 if `index` is out of range.
    pub fn set(&mut self, index: isize, value: T) -> usize {
        match self.resolve(index) {
            Some(slot) => {
                let _old = self.buffer[slot].replace(value);
                1
            }
            None => 0,
        }
    }

    /// Drop every queued element.
    pub fn clear(&mut self) {
        for slot in &mut self.buffer {
            *slot = None;
        }
        self.tail = 0;
        self.length = 0;
    }

    /// Iterate from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.length).filter_map(move |i| self.buffer[self.slot(i)].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_fifo() {
        let mut queue = Queue::new(4);
        for value in ["a", "b", "c", "d"] {
            assert_eq!(queue.push(value), 1);
        }
        assert!(queue.is_full());

        let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, vec!["a", "b", "c", "d"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_rejects_overflow() {
        let mut queue = Queue::new(2);
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.push(3), 0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some(&1));
    }

    #[test]
    fn test_queue_wrap() {
        let mut queue = Queue::new(3);
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));

        // Tail has advanced; new elements wrap to the front slots.
        queue.push(4);
        queue.push(5);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(queue.get(-1), Some(&5));
        assert_eq!(queue.get(0), Some(&3));
        assert_eq!(queue.get(3), None);
    }

    #[test]
    fn test_queue_set_in_place() {
        let mut queue = Queue::new(3);
        queue.push(String::from("x"));
        queue.push(String::from("y"));
        assert_eq!(queue.set(-1, String::from("z")), 1);
        assert_eq!(queue.set(2, String::from("w")), 0);
        assert_eq!(queue.pop_back().as_deref(), Some("z"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_push_front() {
        let mut queue = Queue::new(3);
        queue.push(2);
        queue.push_front(1);
        queue.push(3);
        assert_eq!(queue.push_front(0), 0);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_zero_capacity_queue() {
        let mut queue: Queue<u8> = Queue::new(0);
        assert_eq!(queue.push(1), 0);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.get(0), None);
    }
}
