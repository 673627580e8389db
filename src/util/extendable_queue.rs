//! A queue that can be extended while it is being drained.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// A shared queue that can be extended while it is being drained.
///
/// Clones share the same underlying queue, so a producer holding one clone can push
/// while a consumer pops from another. The build uses it to render scripts that are
/// defined while other scripts render.
#[derive(Debug)]
pub struct ExtendableQueue<T> {
    queue: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Clone for ExtendableQueue<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
        }
    }
}

impl<T> Default for ExtendableQueue<T> {
    fn default() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl<T, V> From<V> for ExtendableQueue<T>
where
    V: Into<VecDeque<T>>,
{
    fn from(value: V) -> Self {
        Self {
            queue: Rc::new(RefCell::new(value.into())),
        }
    }
}

impl<T> ExtendableQueue<T> {
    /// Add an element to the back of the queue.
    pub fn push(&self, value: T) {
        self.queue.borrow_mut().push_back(value);
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Get and remove the next item without needing mutable access.
    ///
    /// The borrow is released before returning, so the caller may push while
    /// processing the item.
    #[must_use]
    pub fn pop_front(&self) -> Option<T> {
        self.queue.borrow_mut().pop_front()
    }
}

impl<A> Extend<A> for ExtendableQueue<A> {
    fn extend<T: IntoIterator<Item = A>>(&mut self, iter: T) {
        self.queue.borrow_mut().extend(iter);
    }
}

impl<T> Iterator for ExtendableQueue<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue() {
        let mut queue = ExtendableQueue::default();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        let mut count = 0;

        while let Some(el) = queue.next() {
            count += el;

            if el == 1 {
                queue.extend(vec![4, 5, 6]);
            }
        }

        assert_eq!(count, 21);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_shared_clone() {
        let consumer = ExtendableQueue::from(vec![1]);
        let producer = consumer.clone();

        let mut seen = Vec::new();
        while let Some(el) = consumer.pop_front() {
            seen.push(el);
            if el < 3 {
                producer.push(el + 1);
            }
        }

        assert_eq!(seen, vec![1, 2, 3]);
    }
}
