//! Output sink plus the escape/indentation pass every rendered byte
//! goes through.

use crate::error::RenderError;

/// Where rendered bytes go. Implemented for the common Rust output
/// targets so callers aren't forced through a `String` buffer.
pub trait Sink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), RenderError>;
}

impl Sink for Vec<u8> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl Sink for String {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RenderError::Writer(e.to_string()))?;
        self.push_str(text);
        Ok(())
    }
}

/// Adapts any `std::io::Write` into a `Sink`.
pub struct IoSink<W: std::io::Write>(pub W);

impl<W: std::io::Write> Sink for IoSink<W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.0
            .write_all(bytes)
            .map_err(|e| RenderError::Writer(e.to_string()))
    }
}

/// A sink over a caller-owned fixed-capacity buffer; refuses to write
/// past `buf.len()` rather than growing.
pub struct FixedBuf<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> FixedBuf<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        FixedBuf { buf, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl<'a> Sink for FixedBuf<'a> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        if self.written + bytes.len() > self.buf.len() {
            return Err(RenderError::BufferExhausted);
        }
        self.buf[self.written..self.written + bytes.len()].copy_from_slice(bytes);
        self.written += bytes.len();
        Ok(())
    }
}

/// A sink over a caller-owned fixed-capacity buffer that keeps its
/// written region NUL-terminated, the way a C string buffer is used
/// over FFI. Refuses to write if there isn't room left for both the
/// bytes and the trailing NUL.
pub struct ZeroTerminatedBuf<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> ZeroTerminatedBuf<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        if let Some(first) = buf.first_mut() {
            *first = 0;
        }
        ZeroTerminatedBuf { buf, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl<'a> Sink for ZeroTerminatedBuf<'a> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        if self.written + bytes.len() + 1 > self.buf.len() {
            return Err(RenderError::BufferExhausted);
        }
        self.buf[self.written..self.written + bytes.len()].copy_from_slice(bytes);
        self.written += bytes.len();
        self.buf[self.written] = 0;
        Ok(())
    }
}

/// Ordered list of pending line prefixes awaiting the next non-newline
/// byte. Partial indentation nests: entering a partial inside a
/// partial pushes another prefix, rendering multiple levels of indent
/// on one line once a non-newline byte arrives.
#[derive(Default)]
pub struct IndentationQueue {
    pending: Vec<String>,
    has_pending: bool,
}

impl IndentationQueue {
    pub fn new() -> Self {
        IndentationQueue::default()
    }

    pub fn push(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }
        self.pending.push(prefix.to_owned());
        self.has_pending = true;
    }

    pub fn pop(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }
        if let Some(pos) = self.pending.iter().rposition(|p| p == prefix) {
            self.pending.remove(pos);
        }
    }

    fn combined(&self) -> String {
        self.pending.concat()
    }
}

fn escape_html(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\0' => out.push('\u{FFFD}'),
            other => out.push(other),
        }
    }
}

/// Write `text` to `sink`, optionally HTML-escaping it and applying
/// any pending indentation from `queue` at the start of each line.
/// A single code path handles all four escape×indent combinations;
/// `queue` is `None` when the active template has no partials, eliding
/// the per-byte bookkeeping entirely.
pub fn write_through(
    sink: &mut dyn Sink,
    text: &str,
    escape: bool,
    queue: Option<&mut IndentationQueue>,
) -> Result<(), RenderError> {
    let Some(queue) = queue else {
        return write_plain(sink, text, escape);
    };

    if queue.pending.is_empty() {
        return write_plain(sink, text, escape);
    }

    for line in split_keep_newlines(text) {
        if queue.has_pending && !line.is_empty() && line != "\n" {
            let prefix = queue.combined();
            sink.write_all(prefix.as_bytes())?;
            queue.has_pending = false;
        }
        write_plain(sink, line, escape)?;
        if line.ends_with('\n') {
            queue.has_pending = true;
        }
    }
    Ok(())
}

fn write_plain(sink: &mut dyn Sink, text: &str, escape: bool) -> Result<(), RenderError> {
    if escape {
        let mut escaped = String::with_capacity(text.len());
        escape_html(text, &mut escaped);
        sink.write_all(escaped.as_bytes())
    } else {
        sink.write_all(text.as_bytes())
    }
}

/// Splits `text` into chunks each ending in at most one `\n`, so the
/// indentation pass can decide per-line whether a prefix is due.
fn split_keep_newlines(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            out.push(&text[start..=i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
