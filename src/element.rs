//! The flat instruction stream a parsed template compiles to.
//!
//! Sections do not nest as a tree; a `Section` element is followed
//! immediately by its `len` child elements, the way a line count lets
//! a reader skip a block without descending into it. This keeps the
//! render walk an iteration over a slice rather than a tree
//! traversal, and lets the engine skip an entire falsey section body
//! in one step.

use crate::options::Delimiters;

/// One instruction in a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Literal bytes copied to the output verbatim.
    Text(String),
    /// `{{name}}` — interpolated with HTML escaping applied.
    Escaped { path: String, delimiters: Delimiters },
    /// `{{{name}}}` or `{{&name}}` — interpolated without escaping.
    Unescaped { path: String, delimiters: Delimiters },
    /// `{{#name}}...{{/name}}` or `{{^name}}...{{/name}}`.
    Section {
        path: String,
        /// Number of elements immediately following that make up the body.
        len: usize,
        inverted: bool,
        /// Raw template text spanned by the body, handed to lambdas
        /// as their `inner_text` argument.
        text: String,
        delimiters: Delimiters,
    },
    /// `{{>name}}`. `indent` is the whitespace that preceded the tag
    /// on its own line, to be reapplied to every line the partial emits.
    Partial { name: String, indent: String },
}
