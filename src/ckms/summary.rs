//! The ordered tuple chain at the heart of the sketch.
//!
//! The summary is a singly-linked chain of `(v, g, delta)` tuples sorted
//! by `v`, each owning its successor. Three walks operate on it, all
//! forward-only and all sharing the same running-rank bookkeeping:
//!
//!  * `merge` splices a sorted batch in with a cursor that sweeps each
//!    position at most once per flush, so a flush is linear in the batch
//!    plus the summary;
//!  * `compress` collapses a tuple into its right neighbor whenever the
//!    combined `g + delta` still fits under the invariant at the local
//!    rank;
//!  * `query` walks until the invariant window around the requested rank
//!    is straddled.
//!
//! After every flush the chain satisfies: sorted order on `v`, Σg equal
//! to the merged observation count, `g + delta <= f(r, n)` at every
//! position, and zero delta on both ends.

use crate::ckms::recycler::Recycler;
use crate::ckms::tuple::Tuple;
use crate::invariant::Invariant;

#[derive(Debug)]
pub(crate) struct Summary<F> {
    head: Option<Box<Tuple>>,
    items: usize,
    /// Observations merged through the last flush. Σg over the chain.
    count: u64,
    invariant: F,
    recycler: Recycler,
}

/// Reuse a recycled record when one is available.
fn draw(recycler: &mut Recycler, v: f64) -> Box<Tuple> {
    match recycler.take() {
        Some(mut tuple) => {
            tuple.v = v;
            tuple.g = 1;
            tuple
        }
        None => Box::new(Tuple::new(v)),
    }
}

impl<F: Invariant> Summary<F> {
    pub fn new(invariant: F, recycler_capacity: usize) -> Summary<F> {
        Summary {
            head: None,
            items: 0,
            count: 0,
            invariant,
            recycler: Recycler::new(recycler_capacity),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn items(&self) -> usize {
        self.items
    }

    /// Splice a sorted batch into the chain.
    ///
    /// The batch must be sorted ascending. Because both the batch and the
    /// chain are sorted, a single cursor sweeps forward across the whole
    /// flush: equal or larger batch values always land at or after the
    /// tuple spliced in before them.
    pub fn merge(&mut self, batch: &[f64]) {
        if batch.is_empty() {
            return;
        }

        let mut idx = 0;
        if self.head.is_none() {
            self.head = Some(draw(&mut self.recycler, batch[0]));
            self.count += 1;
            self.items += 1;
            idx = 1;
        } else if self.head.as_deref().map_or(false, |front| batch[0] < front.v) {
            // A new minimum. Only the first batch value can take this
            // path: everything after it is at least the new front.
            let mut tuple = draw(&mut self.recycler, batch[0]);
            tuple.next = self.head.take();
            self.head = Some(tuple);
            self.count += 1;
            self.items += 1;
            idx = 1;
        }
        if idx >= batch.len() {
            return;
        }

        let mut r: u64 = 0;
        let Some(mut cur) = self.head.as_deref_mut() else {
            return;
        };
        for &v in &batch[idx..] {
            while cur.next.as_deref().map_or(false, |next| next.v < v) {
                r += cur.g;
                cur = cur.next.as_deref_mut().unwrap();
            }

            self.count += 1;
            let delta = match cur.next.as_deref() {
                // An interior splice can be off by one less than the
                // allowed error at the local rank.
                Some(_) => self.invariant.allowed(r, self.count).saturating_sub(1),
                // A new maximum has exact rank.
                None => 0,
            };

            let mut tuple = draw(&mut self.recycler, v);
            tuple.delta = delta;
            tuple.next = cur.next.take();
            cur.next = Some(tuple);
            self.items += 1;

            r += cur.g;
            cur = cur.next.as_deref_mut().unwrap();
        }
    }

    /// Single left-to-right pass collapsing tuples into their right
    /// neighbors wherever the invariant still holds at the local rank.
    ///
    /// A merge keeps the right neighbor's value and delta but leaves the
    /// cursor and running rank in place, so a freshly widened tuple can
    /// immediately absorb its new neighbor too. The front tuple's rank is
    /// exact, so it keeps a zero delta no matter what it absorbs.
    pub fn compress(&mut self) {
        let mut r: u64 = 0;
        let mut at_front = true;
        let Some(mut cur) = self.head.as_deref_mut() else {
            return;
        };

        loop {
            let fits = match cur.next.as_deref() {
                Some(next) => {
                    cur.g + next.g + next.delta <= self.invariant.allowed(r, self.count)
                }
                None => break,
            };
            if fits {
                let mut gone = cur.next.take().unwrap();
                cur.v = gone.v;
                cur.g += gone.g;
                cur.delta = if at_front { 0 } else { gone.delta };
                cur.next = gone.next.take();
                self.items -= 1;
                self.recycler.give(gone);
            } else {
                r += cur.g;
                at_front = false;
                cur = cur.next.as_deref_mut().unwrap();
            }
        }
    }

    /// Walk the chain for the value whose rank straddles ⌊φ·n⌋ within
    /// the invariant's window.
    ///
    /// The running rank accumulates the current tuple's `g` before the
    /// window test, matching the compressor's accounting.
    pub fn query(&self, phi: f64) -> f64 {
        let Some(front) = self.head.as_deref() else {
            return 0.0;
        };

        let want = (phi * self.count as f64) as u64;
        let ceiling = want + self.invariant.allowed(want, self.count) / 2;

        let mut r: u64 = 0;
        let mut cur = front;
        while let Some(next) = cur.next.as_deref() {
            r += cur.g;
            if r + next.g + next.delta > ceiling {
                return cur.v;
            }
            cur = next;
        }
        cur.v
    }

    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl<F> Drop for Summary<F> {
    // Unlink iteratively; a recursive drop would recurse chain-deep.
    fn drop(&mut self) {
        let mut cur = self.head.take();
        while let Some(mut tuple) = cur {
            cur = tuple.next.take();
        }
    }
}

#[cfg(test)]
pub(crate) struct Iter<'a> {
    next: Option<&'a Tuple>,
}

#[cfg(test)]
impl<'a> Iterator for Iter<'a> {
    type Item = &'a Tuple;

    fn next(&mut self) -> Option<&'a Tuple> {
        let cur = self.next?;
        self.next = cur.next.as_deref();
        Some(cur)
    }
}
