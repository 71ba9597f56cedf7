//! Ordered merge of two ranked sources.

use std::cmp::Ordering;
use std::iter::Peekable;

/// Merges two sources that are each already ordered by `cmp` into one
/// ordered sequence, looking ahead by a single item on either side.
///
/// When both heads rank equal, the head of `b` is yielded and the head of
/// `a` is dropped, so an item present in both sources is emitted once.
pub struct RankMerge<A: Iterator, B: Iterator<Item = A::Item>, F> {
    a: Peekable<A>,
    b: Peekable<B>,
    cmp: F,
}

impl<A, B, F> RankMerge<A, B, F>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
    F: FnMut(&A::Item, &A::Item) -> Ordering,
{
    /// Merge `a` and `b`.
    pub fn new(a: A, b: B, cmp: F) -> Self {
        Self {
            a: a.peekable(),
            b: b.peekable(),
            cmp,
        }
    }
}

impl<A, B, F> Iterator for RankMerge<A, B, F>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
    F: FnMut(&A::Item, &A::Item) -> Ordering,
{
    type Item = A::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let ord = match (self.a.peek(), self.b.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => (self.cmp)(a, b),
        };
        match ord {
            Ordering::Less => self.a.next(),
            Ordering::Greater => self.b.next(),
            Ordering::Equal => {
                self.a.next();
                self.b.next()
            }
        }
    }
}
