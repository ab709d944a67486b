//! Growable array with wrap-around indexing.
//!
//! [`Array`] is the owning sequence used for entry tables, key arrays and
//! subresource lists. It behaves like a `Vec` with two differences:
//!
//! - Every index argument is an `isize`. Negative indices wrap from the end
//!   (`-1` is the last element), so `get(-1)` is `get(len - 1)`.
//! - Mutating operations never panic on bad input. They clamp ranges to what
//!   remains and return the number of elements actually processed, which is
//!   `0` for a no-op.
//!
//! An optional comparison function drives [`Array::find`] and
//! [`Array::sort`]. Without one, `find` falls back to `PartialEq` and `sort`
//! does nothing.
//!
//! Element destructors run automatically when elements are overwritten,
//! removed or truncated; replacement always places the new value before the
//! old one is dropped.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

/// Comparison callback used by [`Array::find`] and [`Array::sort`].
pub type CompareFn<T> = fn(&T, &T) -> Ordering;

/// Growable array with negative-index wrapping and clamped ranges.
#[derive(Debug, Clone)]
pub struct Array<T> {
    items: Vec<T>,
    compare: Option<CompareFn<T>>,
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Array<T> {
    /// Create an empty array without a comparison function.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            compare: None,
        }
    }

    /// Create an empty array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            compare: None,
        }
    }

    /// Attach a comparison function used by `find` and `sort`.
    pub fn with_compare(mut self, compare: CompareFn<T>) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the array is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Translate a possibly negative index into a position inside the array.
    fn resolve(&self, index: isize) -> Option<usize> {
        let len = self.items.len() as isize;
        let index = if index < 0 { index + len } else { index };
        if (0..len).contains(&index) {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Translate an insertion index, clamping into `0..=len`.
    fn resolve_insert(&self, index: isize) -> usize {
        let len = self.items.len() as isize;
        let index = if index < 0 { index + len } else { index };
        index.clamp(0, len) as usize
    }

    /// Get a reference to the element at `index`.
    pub fn get(&self, index: isize) -> Option<&T> {
        self.resolve(index).map(|i| &self.items[i])
    }

    /// Get a mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: isize) -> Option<&mut T> {
        self.resolve(index).map(|i| &mut self.items[i])
    }

    /// Get the first element.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Get the last element.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Replace the element at `index`.
    ///
    /// Returns 1 if an element was replaced, 0 if `index` is out of range
    /// (in which case `value` is dropped).
    pub fn set(&mut self, index: isize, value: T) -> usize {
        match self.resolve(index) {
            Some(i) => {
                let _old = std::mem::replace(&mut self.items[i], value);
                1
            }
            None => 0,
        }
    }

    /// Insert `value` before `index`.
    ///
    /// A wrapped index below 0 inserts at the front; at or past the end it
    /// appends. Always returns 1.
    pub fn insert(&mut self, index: isize, value: T) -> usize {
        let i = self.resolve_insert(index);
        self.items.insert(i, value);
        1
    }

    /// Insert every element of `values` before `index`, keeping their order.
    ///
    /// Returns the number of elements inserted.
    pub fn extend_at<I: IntoIterator<Item = T>>(&mut self, index: isize, values: I) -> usize {
        let i = self.resolve_insert(index);
        let before = self.items.len();
        let tail = self.items.split_off(i);
        self.items.extend(values);
        let inserted = self.items.len() - before;
        self.items.extend(tail);
        inserted
    }

    /// Append `value` to the end. Always returns 1.
    pub fn append(&mut self, value: T) -> usize {
        self.items.push(value);
        1
    }

    /// Remove up to `count` elements starting at `index`.
    ///
    /// The count is clamped to the elements remaining after `index`. Returns
    /// the number of elements removed.
    pub fn remove(&mut self, index: isize, count: usize) -> usize {
        let Some(start) = self.resolve(index) else {
            return 0;
        };
        let end = start + count.min(self.items.len() - start);
        self.items.drain(start..end);
        end - start
    }

    /// Remove and return the element at `index`.
    pub fn remove_one(&mut self, index: isize) -> Option<T> {
        self.resolve(index).map(|i| self.items.remove(i))
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Swap the elements at `a` and `b`.
    ///
    /// Returns 1 on success, 0 if either index is out of range.
    pub fn swap(&mut self, a: isize, b: isize) -> usize {
        match (self.resolve(a), self.resolve(b)) {
            (Some(a), Some(b)) => {
                self.items.swap(a, b);
                1
            }
            _ => 0,
        }
    }

    /// Reverse up to `count` elements starting at `index`.
    ///
    /// Returns the number of elements in the reversed range.
    pub fn reverse(&mut self, index: isize, count: usize) -> usize {
        let Some(start) = self.resolve(index) else {
            return 0;
        };
        let end = start + count.min(self.items.len() - start);
        self.items[start..end].reverse();
        end - start
    }

    /// Sort in place with the comparison function.
    ///
    /// Selection sort driven by pairwise swaps; not stable. Returns the
    /// number of elements sorted, or 0 when no comparison function is set.
    pub fn sort(&mut self) -> usize {
        let Some(compare) = self.compare else {
            return 0;
        };
        let n = self.items.len();
        for i in 0..n {
            let mut min = i;
            for j in (i + 1)..n {
                if compare(&self.items[j], &self.items[min]) == Ordering::Less {
                    min = j;
                }
            }
            if min != i {
                self.items.swap(i, min);
            }
        }
        n
    }

    /// Shorten the array to `len` elements, dropping the rest.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// View the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably over the elements.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Consume the array, returning its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> Array<T> {
    /// Overwrite elements starting at `index` with clones of `values`.
    ///
    /// The copy is clamped to the elements remaining after `index`; the array
    /// never grows. Returns the number of elements overwritten.
    pub fn set_slice(&mut self, index: isize, values: &[T]) -> usize {
        let Some(start) = self.resolve(index) else {
            return 0;
        };
        let count = values.len().min(self.items.len() - start);
        self.items[start..start + count].clone_from_slice(&values[..count]);
        count
    }
}

impl<T: PartialEq> Array<T> {
    /// Find the position of `value`.
    ///
    /// Uses the comparison function when one is set, `==` otherwise. With
    /// `reverse` the scan runs from the end and returns the last match.
    pub fn find(&self, value: &T, reverse: bool) -> Option<usize> {
        let matches = |item: &T| match self.compare {
            Some(compare) => compare(item, value) == Ordering::Equal,
            None => item == value,
        };
        if reverse {
            self.items.iter().rposition(matches)
        } else {
            self.items.iter().position(matches)
        }
    }

    /// Check whether `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value, false).is_some()
    }
}

impl<T> Index<usize> for Array<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for Array<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            compare: None,
        }
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for Array<T> {}
