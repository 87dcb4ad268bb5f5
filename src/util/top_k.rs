/*
 * MIT License
 *
 * Copyright (c) 2025 The wordle-suggest Authors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use std::cmp::Ordering;

///
/// Keeps the best `capacity` items seen so far, in order, under a caller
/// supplied comparator.
///
/// The items vector is always sorted best-first, so pushing is a binary search
/// plus an insert into a vector that never grows beyond capacity + 1. For the
/// small capacities this crate uses (a handful of suggestions) that beats
/// sorting the full candidate list every time a partial result is merged.
///
/// The comparator follows the std convention: Ordering::Less means the first
/// argument ranks earlier (is better).
///
pub struct TopK<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    items: Vec<E>,
    capacity: usize,
    rank: F,
}

impl<E, F> TopK<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    pub fn new(capacity: usize, rank: F) -> Self {
        Self {
            items: Vec::with_capacity(capacity.saturating_add(1)),
            capacity,
            rank,
        }
    }

    pub fn push(&mut self, item: E) {
        if self.capacity == 0 {
            return;
        }

        let idx = match self.items.binary_search_by(|other| (self.rank)(other, &item)) {
            // insert after an equal run so that earlier pushes win ties
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };

        if idx >= self.capacity {
            return;
        }

        self.items.insert(idx, item);
        self.items.truncate(self.capacity);
    }

    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = E>,
    {
        for item in items {
            self.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The current ranking, best first.
    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    pub fn into_sorted_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E, F> TopK<E, F>
where
    E: Clone,
    F: Fn(&E, &E) -> Ordering,
{
    /// A snapshot of the current ranking, best first.
    pub fn to_sorted_vec(&self) -> Vec<E> {
        self.items.clone()
    }
}
