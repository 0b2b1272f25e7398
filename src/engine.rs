//! The render walk: consumes a flat `Element` stream against a
//! `ContextStack`, writing output through the escape/indentation
//! writer. This is the crate's core — everything else exists to feed
//! or be called from it.

use crate::context::{ContextStack, Lambda, Resolution};
use crate::element::Element;
use crate::error::RenderError;
use crate::options::Delimiters;
use crate::parser::parse;
use crate::partials::Partials;
use crate::writer::{write_through, IndentationQueue, Sink};

const MAX_PARTIAL_DEPTH: usize = 64;

pub struct RenderEngine<'p> {
    partials: &'p dyn Partials,
    lambdas_enabled: bool,
    preserve_indentation: bool,
    partial_depth: usize,
}

impl<'p> RenderEngine<'p> {
    pub fn new(partials: &'p dyn Partials, lambdas_enabled: bool) -> Self {
        RenderEngine::with_config(partials, lambdas_enabled, true)
    }

    pub fn with_config(
        partials: &'p dyn Partials,
        lambdas_enabled: bool,
        preserve_indentation: bool,
    ) -> Self {
        RenderEngine {
            partials,
            lambdas_enabled,
            preserve_indentation,
            partial_depth: 0,
        }
    }

    pub fn render(
        &mut self,
        elements: &[Element],
        stack: &mut ContextStack,
        sink: &mut dyn Sink,
    ) -> Result<(), RenderError> {
        let mut queue = IndentationQueue::new();
        self.walk(elements, stack, sink, &mut queue)
    }

    fn walk(
        &mut self,
        elements: &[Element],
        stack: &mut ContextStack,
        sink: &mut dyn Sink,
        queue: &mut IndentationQueue,
    ) -> Result<(), RenderError> {
        let mut i = 0;
        while i < elements.len() {
            match &elements[i] {
                Element::Text(text) => {
                    write_through(sink, text, false, Some(queue))?;
                    i += 1;
                }
                Element::Escaped { path, delimiters } => {
                    self.render_variable(path, delimiters, true, stack, sink, queue)?;
                    i += 1;
                }
                Element::Unescaped { path, delimiters } => {
                    self.render_variable(path, delimiters, false, stack, sink, queue)?;
                    i += 1;
                }
                Element::Partial { name, indent } => {
                    self.render_partial(name, indent, stack, sink, queue)?;
                    i += 1;
                }
                Element::Section {
                    path,
                    len,
                    inverted,
                    text,
                    delimiters,
                } => {
                    let body = &elements[i + 1..i + 1 + len];
                    self.render_section(
                        path, *inverted, text, delimiters, body, stack, sink, queue,
                    )?;
                    i += 1 + len;
                }
            }
        }
        Ok(())
    }

    fn render_variable(
        &mut self,
        path: &str,
        delimiters: &Delimiters,
        escape: bool,
        stack: &mut ContextStack,
        sink: &mut dyn Sink,
        queue: &mut IndentationQueue,
    ) -> Result<(), RenderError> {
        match stack.resolve(path) {
            Resolution::Field(ctx) => {
                if let Some(scalar) = ctx.as_scalar() {
                    write_through(sink, &scalar, escape, Some(queue))?;
                }
                Ok(())
            }
            Resolution::Owned(ctx) => {
                if let Some(scalar) = ctx.as_scalar() {
                    write_through(sink, &scalar, escape, Some(queue))?;
                }
                Ok(())
            }
            Resolution::Lambda(lambda) if self.lambdas_enabled => {
                let rendered = self.expand_lambda(lambda, "", delimiters, stack)?;
                write_through(sink, &rendered, escape, Some(queue))
            }
            _ => Ok(()),
        }
    }

    fn render_partial(
        &mut self,
        name: &str,
        indent: &str,
        stack: &mut ContextStack,
        sink: &mut dyn Sink,
        queue: &mut IndentationQueue,
    ) -> Result<(), RenderError> {
        if self.partials.is_empty() {
            return Ok(());
        }
        let Some(body) = self.partials.get(name) else {
            return Ok(());
        };
        if self.partial_depth >= MAX_PARTIAL_DEPTH {
            return Err(RenderError::Writer(format!(
                "partial recursion exceeded {MAX_PARTIAL_DEPTH} levels rendering '{name}'"
            )));
        }

        let pushed = self.preserve_indentation && !indent.is_empty();
        if pushed {
            queue.push(indent);
        }
        self.partial_depth += 1;
        let result = self.walk(body, stack, sink, queue);
        self.partial_depth -= 1;
        if pushed {
            queue.pop(indent);
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn render_section(
        &mut self,
        path: &str,
        inverted: bool,
        text: &str,
        delimiters: &Delimiters,
        body: &[Element],
        stack: &mut ContextStack,
        sink: &mut dyn Sink,
        queue: &mut IndentationQueue,
    ) -> Result<(), RenderError> {
        match stack.resolve(path) {
            Resolution::Lambda(lambda) if self.lambdas_enabled && !inverted => {
                let rendered = self.expand_lambda(lambda, text, delimiters, stack)?;
                write_through(sink, &rendered, false, Some(queue))
            }
            Resolution::Lambda(_) => Ok(()),
            Resolution::Field(ctx) => {
                let mut iter = ctx.iterator();
                let truthy = iter.truthy();
                if inverted {
                    if !truthy {
                        self.walk(body, stack, sink, queue)?;
                    }
                    return Ok(());
                }
                if !truthy {
                    return Ok(());
                }
                while let Some(item) = iter.advance() {
                    stack.push(item);
                    let result = self.walk(body, stack, sink, queue);
                    stack.pop();
                    result?;
                }
                Ok(())
            }
            // Synthesized scalar, owned for the call — no place in the
            // source tree to push as a frame, so the body renders
            // against the enclosing context rather than gaining one.
            Resolution::Owned(ctx) => {
                let truthy = ctx.is_truthy();
                if inverted {
                    if !truthy {
                        self.walk(body, stack, sink, queue)?;
                    }
                    return Ok(());
                }
                if truthy {
                    self.walk(body, stack, sink, queue)?;
                }
                Ok(())
            }
            Resolution::NotFoundInContext | Resolution::ChainBroken | Resolution::IteratorConsumed => {
                if inverted {
                    self.walk(body, stack, sink, queue)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn expand_lambda(
        &mut self,
        lambda: &dyn Lambda,
        inner_text: &str,
        delimiters: &Delimiters,
        stack: &mut ContextStack,
    ) -> Result<String, RenderError> {
        let source = match lambda.call(inner_text) {
            Ok(source) => source,
            Err(_) => return Ok(String::new()),
        };
        let elements = parse(&source, delimiters.clone())
            .map_err(|e| RenderError::parse("<lambda>", 0, e))?;
        let mut buf = String::new();
        let mut queue = IndentationQueue::new();
        self.walk(&elements, stack, &mut buf, &mut queue)?;
        Ok(buf)
    }
}
