//! The `Context` abstraction and the invoker that resolves dotted
//! paths against a stack of them.
//!
//! `Context` is a capability trait, not a type check: any Rust value
//! can back a render by implementing `get`/`iterator`/`is_truthy`/
//! `as_scalar`, the way [`crate::value::Value`] and
//! `serde_json::Value` both do.

use crate::error::LambdaError;
use crate::iter::Iter;
use std::borrow::Cow;

/// A user-defined callable re-entering the renderer at the point it
/// was referenced. Implementors receive the raw template text spanned
/// by the section body (empty string for a non-section interpolation)
/// and return replacement mustache source to compile and render in
/// the caller's place.
pub trait Lambda {
    fn call(&self, inner_text: &str) -> Result<String, LambdaError>;
}

/// Outcome of looking up one path segment in one `Context` frame.
///
/// Only `NotFoundInContext` permits the invoker to retry the lookup in
/// an enclosing frame. Every other outcome — including a broken chain
/// or a consumed iterator — halts resolution where it stands.
pub enum Resolution<'a> {
    /// The name does not exist in this frame; try the parent frame.
    NotFoundInContext,
    /// A prior segment resolved to something that cannot be indexed
    /// further (a scalar, a lambda, or a missing intermediate field).
    /// Does not fall back to an enclosing frame.
    ChainBroken,
    /// The path targets an iterator that has already been fully
    /// walked by its owning section.
    IteratorConsumed,
    /// Found, and is a user lambda.
    Lambda(&'a dyn Lambda),
    /// Found, and is an ordinary field.
    Field(&'a dyn Context),
    /// Found, and is a synthesized value with no place in the source
    /// tree to borrow from (e.g. a sequence's `len` pseudo-field).
    Owned(Box<dyn Context>),
}

pub trait Context {
    /// Look up an immediate (non-dotted) field name in this context.
    fn get(&self, name: &str) -> Resolution<'_>;

    /// The iteration shape of this context when entered as a section.
    fn iterator(&self) -> Iter<'_>;

    /// Whether this context is truthy on its own (used for the
    /// implicit-iterator-current-element and lambda cases, where
    /// `iterator()` alone cannot express the answer cheaply).
    fn is_truthy(&self) -> bool;

    /// The scalar text this context interpolates to, if it is a
    /// scalar (string/number/bool). `None` for records, sequences,
    /// lambdas, and null.
    fn as_scalar(&self) -> Option<Cow<'_, str>>;

    fn as_lambda(&self) -> Option<&dyn Lambda> {
        None
    }
}

/// A LIFO spine of `Context` frames, one pushed per active section,
/// strictly scoped to that section's body (Invariant 1: a frame never
/// outlives the section that pushed it).
pub struct ContextStack<'a> {
    frames: Vec<&'a dyn Context>,
}

impl<'a> ContextStack<'a> {
    pub fn new(root: &'a dyn Context) -> Self {
        ContextStack { frames: vec![root] }
    }

    pub fn push(&mut self, ctx: &'a dyn Context) {
        self.frames.push(ctx);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> &'a dyn Context {
        *self.frames.last().expect("context stack is never empty")
    }

    /// Resolve a dotted path. The first segment walks up the stack on
    /// `NotFoundInContext`; every subsequent segment is looked up only
    /// on the previous segment's result — a broken chain never
    /// resumes the walk at an outer frame.
    pub fn resolve(&self, path: &str) -> Resolution<'a> {
        if path == "." {
            return Resolution::Field(self.current());
        }

        let mut segments = path.split('.');
        let head = segments.next().unwrap_or("");
        let mut current = self.resolve_head(head);

        for segment in segments {
            current = match current {
                Resolution::Field(ctx) => ctx.get(segment),
                Resolution::Owned(_) | Resolution::Lambda(_) => Resolution::ChainBroken,
                Resolution::NotFoundInContext | Resolution::ChainBroken => {
                    Resolution::ChainBroken
                }
                Resolution::IteratorConsumed => Resolution::IteratorConsumed,
            };
        }

        current
    }

    fn resolve_head(&self, name: &str) -> Resolution<'a> {
        for ctx in self.frames.iter().rev() {
            match ctx.get(name) {
                Resolution::NotFoundInContext => continue,
                other => return other,
            }
        }
        Resolution::NotFoundInContext
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn map(pairs: Vec<(&str, Value)>) -> Value {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn basic_access() {
        let root = map(vec![("name", Value::Str("world".into()))]);
        let stack = ContextStack::new(&root);
        match stack.resolve("name") {
            Resolution::Field(ctx) => assert_eq!(ctx.as_scalar().as_deref(), Some("world")),
            _ => panic!("expected field"),
        }
    }

    #[test]
    fn not_found_walks_up_the_stack() {
        let root = map(vec![("name", Value::Str("world".into()))]);
        let child = map(vec![("other", Value::Bool(true))]);
        let mut stack = ContextStack::new(&root);
        stack.push(&child);
        match stack.resolve("name") {
            Resolution::Field(ctx) => assert_eq!(ctx.as_scalar().as_deref(), Some("world")),
            _ => panic!("expected backtrack to find name"),
        }
    }

    #[test]
    fn broken_chain_does_not_backtrack() {
        let root = map(vec![("obj", Value::Str("scalar".into()))]);
        let stack = ContextStack::new(&root);
        assert!(matches!(stack.resolve("obj.part1"), Resolution::ChainBroken));
    }

    #[test]
    fn dotted_path_after_backtrack() {
        let root = map(vec![("obj", map(vec![("inner", Value::Str("v".into()))]))]);
        let child = map(vec![("unrelated", Value::Bool(true))]);
        let mut stack = ContextStack::new(&root);
        stack.push(&child);
        match stack.resolve("obj.inner") {
            Resolution::Field(ctx) => assert_eq!(ctx.as_scalar().as_deref(), Some("v")),
            _ => panic!("expected resolution through backtrack then dotted descent"),
        }
    }

    #[test]
    fn missing_name_is_not_found_not_error() {
        let root = map(vec![]);
        let stack = ContextStack::new(&root);
        assert!(matches!(stack.resolve("missing"), Resolution::NotFoundInContext));
    }
}
