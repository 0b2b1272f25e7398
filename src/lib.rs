//! # mustache_core
//!
//! A Mustache render engine core: a `Context` data model, a path/
//! iteration invoker, a flat-element render walk, a lambda subsystem,
//! and an escape/indentation writer. Template parsing, partial
//! lookup, and the data a render runs against are all pluggable —
//! this crate only owns the walk and its supporting machinery.
//!
//! ## Quick start
//!
//! ```
//! use mustache_core::{render, value::Value};
//!
//! let mut fields = std::collections::HashMap::new();
//! fields.insert("name".to_string(), Value::Str("world".to_string()));
//! let data = Value::Map(fields);
//!
//! let output = render("Hello, {{name}}!", &data).unwrap();
//! assert_eq!(output, "Hello, world!");
//! ```
//!
//! ## Modules
//!
//! - [`context`]: the `Context` trait, `Resolution`, and `ContextStack`
//! - [`value`]: the built-in general-purpose `Context` backend
//! - [`json_context`]: `Context` for `serde_json::Value`
//! - [`iter`]: the section iteration state machine
//! - [`partials`]: the partials lookup the engine consults
//! - [`writer`]: the escape/indentation output writer
//! - [`error`]: `RenderError` and `LambdaError`
//! - [`options`]: delimiters and render feature flags

pub mod context;
pub mod element;
pub mod error;
mod engine;
pub mod iter;
pub mod json_context;
mod options;
mod parser;
pub mod partials;
pub mod value;
pub mod writer;

pub use options::{Delimiters, RenderConfig};

use context::{Context, ContextStack};
use element::Element;
use engine::RenderEngine;
use error::RenderError;
use partials::Partials;
use std::path::Path;
use writer::{IoSink, Sink};

/// Where a template's element stream comes from.
pub enum TemplateSource {
    /// Already-compiled elements, e.g. shared across renders.
    Parsed(Vec<Element>),
    /// Raw mustache source, parsed with the default delimiters.
    Text(String),
    /// A template file, read and parsed on the spot.
    File(std::path::PathBuf),
}

/// A compiled template, ready to render against any number of data
/// values and partial sets.
pub struct Template {
    elements: Vec<Element>,
}

impl Template {
    /// Parse mustache source with the default `{{ }}` delimiters.
    pub fn compile(source: &str) -> Result<Template, RenderError> {
        let elements = parser::parse(source, Delimiters::default())
            .map_err(|message| RenderError::parse("<template>", 0, message))?;
        Ok(Template { elements })
    }

    /// Read and parse a template from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Template, RenderError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Template::compile(&source)
    }

    /// Build a template from any of the supported sources.
    pub fn from_source(source: TemplateSource) -> Result<Template, RenderError> {
        match source {
            TemplateSource::Parsed(elements) => Ok(Template { elements }),
            TemplateSource::Text(text) => Template::compile(&text),
            TemplateSource::File(path) => Template::from_file(path),
        }
    }

    /// The compiled element stream, for callers that want to inspect
    /// or cache it themselves.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn render(
        &self,
        data: &dyn Context,
        partials: &dyn Partials,
        config: RenderConfig,
        sink: &mut dyn Sink,
    ) -> Result<(), RenderError> {
        let mut stack = ContextStack::new(data);
        let mut engine = RenderEngine::with_config(
            partials,
            config.lambdas,
            config.preserve_line_breaks_and_indentation,
        );
        engine.render(&self.elements, &mut stack, sink)
    }

    pub fn render_to_string(
        &self,
        data: &dyn Context,
        partials: &dyn Partials,
        config: RenderConfig,
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render(data, partials, config, &mut out)?;
        Ok(out)
    }
}

/// Parse and render `source` against `data` with no partials and the
/// default feature flags — the common case for a one-off render.
pub fn render(source: &str, data: &dyn Context) -> Result<String, RenderError> {
    let template = Template::compile(source)?;
    template.render_to_string(data, &(), RenderConfig::default())
}

/// Like [`render`], but with a partials set available to `{{>name}}`.
pub fn render_with_partials(
    source: &str,
    data: &dyn Context,
    partials: &dyn Partials,
) -> Result<String, RenderError> {
    let template = Template::compile(source)?;
    template.render_to_string(data, partials, RenderConfig::default())
}

/// Parse and render `source`, writing directly to an `io::Write`
/// sink rather than buffering the whole output in memory.
pub fn render_to_writer<W: std::io::Write>(
    source: &str,
    data: &dyn Context,
    partials: &dyn Partials,
    writer: W,
) -> Result<(), RenderError> {
    let template = Template::compile(source)?;
    let mut sink = IoSink(writer);
    template.render(data, partials, RenderConfig::default(), &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::collections::HashMap;

    fn map(pairs: Vec<(&str, Value)>) -> Value {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn renders_plain_interpolation() {
        let data = map(vec![("name", Value::Str("Ada".into()))]);
        assert_eq!(render("Hello, {{name}}!", &data).unwrap(), "Hello, Ada!");
    }

    #[test]
    fn escapes_html_by_default() {
        let data = map(vec![("name", Value::Str("<b>".into()))]);
        assert_eq!(render("{{name}}", &data).unwrap(), "&lt;b&gt;");
    }

    #[test]
    fn triple_mustache_is_unescaped() {
        let data = map(vec![("name", Value::Str("<b>".into()))]);
        assert_eq!(render("{{{name}}}", &data).unwrap(), "<b>");
    }

    #[test]
    fn section_over_array_repeats_body() {
        let data = map(vec![(
            "items",
            Value::Array(vec![Value::Str("a".into()), Value::Str("b".into())]),
        )]);
        assert_eq!(
            render("{{#items}}({{.}}){{/items}}", &data).unwrap(),
            "(a)(b)"
        );
    }

    #[test]
    fn inverted_section_renders_when_falsey() {
        let data = map(vec![("items", Value::Array(vec![]))]);
        assert_eq!(
            render("{{^items}}none{{/items}}", &data).unwrap(),
            "none"
        );
    }

    #[test]
    fn missing_name_renders_empty_not_error() {
        let data = map(vec![]);
        assert_eq!(render("[{{missing}}]", &data).unwrap(), "[]");
    }

    #[test]
    fn partials_are_consulted_by_name() {
        let mut partials = HashMap::new();
        partials.insert(
            "greeting".to_string(),
            vec![Element::Text("hi ".into()), Element::Escaped {
                path: "name".into(),
                delimiters: Delimiters::default(),
            }],
        );
        let data = map(vec![("name", Value::Str("Grace".into()))]);
        assert_eq!(
            render_with_partials("{{>greeting}}!", &data, &partials).unwrap(),
            "hi Grace!"
        );
    }

    #[test]
    fn from_file_reads_and_compiles_a_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeting.mustache");
        std::fs::write(&path, "Hi, {{name}}!").unwrap();

        let template = Template::from_file(&path).unwrap();
        let data = map(vec![("name", Value::Str("Linus".into()))]);
        assert_eq!(
            template.render_to_string(&data, &(), RenderConfig::default()).unwrap(),
            "Hi, Linus!"
        );
    }

    #[test]
    fn from_source_covers_all_three_variants() {
        let data = map(vec![("name", Value::Str("Ada".into()))]);

        let text = Template::from_source(TemplateSource::Text("{{name}}".into())).unwrap();
        assert_eq!(text.render_to_string(&data, &(), RenderConfig::default()).unwrap(), "Ada");

        let parsed = Template::from_source(TemplateSource::Parsed(text.elements().to_vec())).unwrap();
        assert_eq!(parsed.render_to_string(&data, &(), RenderConfig::default()).unwrap(), "Ada");
    }

    #[test]
    fn lambda_is_invoked_fresh_on_every_reference() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let data = map(vec![(
            "count",
            Value::lambda(move |_| {
                counter.set(counter.get() + 1);
                Ok(counter.get().to_string())
            }),
        )]);
        assert_eq!(render("{{count}}-{{count}}", &data).unwrap(), "1-2");
    }
}
