//! The iteration state machine a section walks over.
//!
//! `Iter` is built once per section entry with one-element lookahead
//! so `truthy()` can answer "does this section have a body to render"
//! without consuming the first item — mirroring how a peekable
//! iterator decides emptiness without advancing.

use crate::context::Context;

pub enum Iter<'a> {
    /// Nothing to iterate: a missing value, an empty sequence, or a
    /// null. `{{#x}}` skips its body, `{{^x}}` renders its body.
    Empty,
    /// A single non-sequence truthy value rendered exactly once with
    /// the stack unchanged (scalar, lambda, or object section body).
    Single(&'a dyn Context),
    /// A sequence of child contexts, one stack frame pushed per item.
    Sequence(SequenceState<'a>),
}

pub enum SequenceState<'a> {
    Fetching {
        item: &'a dyn Context,
        rest: Box<dyn Iterator<Item = &'a dyn Context> + 'a>,
    },
    Finished,
}

impl<'a> Iter<'a> {
    pub fn from_contexts<I>(mut items: I) -> Self
    where
        I: Iterator<Item = &'a dyn Context> + 'a,
    {
        match items.next() {
            Some(item) => Iter::Sequence(SequenceState::Fetching {
                item,
                rest: Box::new(items),
            }),
            None => Iter::Empty,
        }
    }

    /// Whether this shape has a body to render for `{{#x}}`. The
    /// inverse, used by `{{^x}}`, is simply `!truthy()`.
    pub fn truthy(&self) -> bool {
        !matches!(self, Iter::Empty)
    }

    /// Pull the next element to push as a stack frame, advancing the
    /// lookahead by one. Returns `None` once the sequence is spent.
    pub fn advance(&mut self) -> Option<&'a dyn Context> {
        match self {
            Iter::Empty => None,
            Iter::Single(ctx) => {
                let item = *ctx;
                *self = Iter::Empty;
                Some(item)
            }
            Iter::Sequence(state) => match std::mem::replace(state, SequenceState::Finished) {
                SequenceState::Fetching { item, mut rest } => {
                    *state = match rest.next() {
                        Some(next) => SequenceState::Fetching { item: next, rest },
                        None => SequenceState::Finished,
                    };
                    Some(item)
                }
                SequenceState::Finished => None,
            },
        }
    }
}
