//! Iteration over a single pair's slots.

use std::iter::FusedIterator;

use crate::language::{Pair, Value};

/// Yields a pair's head, then its tail, then stops. It does not walk the
/// tail chain. The reference to the pair is released once both slots have
/// been produced.
pub struct PairIter {
    pair: Option<Pair>,
    index: u8,
}

impl PairIter {
    pub(crate) fn new(pair: Pair) -> Self {
        PairIter {
            pair: Some(pair),
            index: 0,
        }
    }

    /// The iterator handed out for nil.
    pub(crate) fn empty() -> Self {
        PairIter {
            pair: None,
            index: 2,
        }
    }

    /// Whether the iterator still holds its source pair.
    pub fn is_exhausted(&self) -> bool {
        self.pair.is_none()
    }
}

impl Iterator for PairIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let pair = self.pair.as_ref()?;
        if self.index == 0 {
            self.index = 1;
            Some(pair.head())
        } else {
            self.index = 2;
            self.pair.take().map(|pair| pair.tail())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.pair.is_some() {
            2 - self.index as usize
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PairIter {}

impl FusedIterator for PairIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{NIL, pair};

    #[test]
    fn test_yields_head_then_tail() {
        let p = Pair::new(Value::Int(1), Value::Int(2));
        let items: Vec<Value> = p.iter().collect();
        assert_eq!(items, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_does_not_walk_the_chain() {
        let l = pair(Value::Int(1), pair(Value::Int(2), NIL));
        let mut it = l.iter().unwrap();
        assert_eq!(it.next().unwrap(), Value::Int(1));
        assert!(it.next().unwrap().is_pair());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_releases_pair_when_done() {
        let p = Pair::new(Value::Int(1), NIL);
        let weak = p.downgrade();
        let mut it = p.into_iter();
        assert_eq!(it.len(), 2);
        it.next();
        assert!(weak.upgrade().is_some());
        it.next();
        assert!(it.is_exhausted());
        assert!(weak.upgrade().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_nil_iterator_is_empty() {
        let mut it = PairIter::empty();
        assert_eq!(it.len(), 0);
        assert!(it.is_exhausted());
        assert!(it.next().is_none());
    }
}
