// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! Bounded ring buffer
//!
//! Fixed-capacity circular queue indexed by two cursors. One slot is
//! always left unused to distinguish an empty buffer (`front == back`)
//! from a full buffer (`front == next(back)`), i.e. a buffer with `N`
//! slots holds at most `N - 1` items.
//!
//! Overflow never evicts pending items. New items that do not fit are
//! dropped. Callers that need to enqueue a multi-item unit atomically
//! must check [`RingBuffer::has_space_for()`] first or use
//! [`RingBuffer::push_all()`].
//!
//! Mutation requires exclusive access. A buffer shared between a
//! producer and a consumer context must be owned by a single component
//! that mediates both roles.

use std::fmt;

/// Cursor type of a [`RingBuffer`]
///
/// Small index types keep cursor updates within the atomic access
/// width of small targets.
pub trait FifoIndex: Copy + Eq + fmt::Debug {
    const MAX: usize;

    /// Truncating conversion, only invoked with values `<= Self::MAX`.
    fn from_usize(value: usize) -> Self;

    fn to_usize(self) -> usize;
}

macro_rules! impl_fifo_index {
    ($($index:ty),+) => {
        $(
            impl FifoIndex for $index {
                #[allow(clippy::cast_possible_truncation)]
                const MAX: usize = <$index>::MAX as usize;

                #[allow(clippy::cast_possible_truncation)]
                fn from_usize(value: usize) -> Self {
                    debug_assert!(value <= <Self as FifoIndex>::MAX);
                    value as Self
                }

                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )+
    };
}

impl_fifo_index!(u8, u16, u32, usize);

#[derive(Debug, Clone)]
pub struct RingBuffer<T, I, const N: usize> {
    items: [T; N],
    front: I,
    back: I,
}

impl<T, I, const N: usize> RingBuffer<T, I, N>
where
    T: Copy + Default,
    I: FifoIndex,
{
    const VALID_CAPACITY: () = assert!(
        N >= 2 && N - 1 <= I::MAX,
        "capacity must be at least 2 and all cursor positions must fit into the index type"
    );

    #[must_use]
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;
        Self {
            items: [T::default(); N],
            front: I::from_usize(0),
            back: I::from_usize(0),
        }
    }

    /// Maximum number of items, i.e. `N - 1`.
    #[must_use]
    pub fn capacity(&self) -> I {
        I::from_usize(N - 1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front == self.back
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.front == Self::next(self.back)
    }

    /// Number of items, i.e. `(back - front + N) mod N`.
    #[must_use]
    pub fn len(&self) -> I {
        I::from_usize(self.occupied())
    }

    /// Checks if `n` more items could be pushed without loss.
    #[must_use]
    pub fn has_space_for(&self, n: I) -> bool {
        self.vacant() >= n.to_usize()
    }

    /// The front item, if any.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        Some(self.items[self.front.to_usize()])
    }

    /// Discard the front item, if any.
    pub fn advance(&mut self) {
        if self.is_empty() {
            return;
        }
        self.front = Self::next(self.front);
    }

    /// Remove and return the front item, if any.
    pub fn pop(&mut self) -> Option<T> {
        let item = self.peek()?;
        self.advance();
        Some(item)
    }

    /// Append an item at the back.
    ///
    /// Returns `false` if the buffer is full and `item` has been dropped.
    pub fn push(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items[self.back.to_usize()] = item;
        self.back = Self::next(self.back);
        true
    }

    /// Append either all or none of `items`.
    ///
    /// Returns `false` if not enough space was available and nothing
    /// has been appended.
    pub fn push_all(&mut self, items: &[T]) -> bool {
        if self.vacant() < items.len() {
            return false;
        }
        for item in items {
            let pushed = self.push(*item);
            debug_assert!(pushed);
        }
        true
    }

    /// Discard all items.
    pub fn clear(&mut self) {
        self.front = self.back;
    }

    fn occupied(&self) -> usize {
        (self.back.to_usize() + N - self.front.to_usize()) % N
    }

    fn vacant(&self) -> usize {
        N - 1 - self.occupied()
    }

    fn next(index: I) -> I {
        I::from_usize((index.to_usize() + 1) % N)
    }
}

impl<T, I, const N: usize> Default for RingBuffer<T, I, N>
where
    T: Copy + Default,
    I: FifoIndex,
{
    fn default() -> Self {
        Self::new()
    }
}
