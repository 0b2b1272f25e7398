//! Compiles mustache source into the flat `Element` stream the engine
//! walks. The render engine core treats this as a pre-solved external
//! collaborator; it lives here so the crate is self-contained and its
//! behavior is directly testable.

use crate::element::Element;
use crate::options::Delimiters;

enum TagKind {
    Escaped,
    Unescaped,
    SectionStart { inverted: bool },
    SectionEnd,
    Comment,
    Partial,
    SetDelimiters,
}

struct RawTag {
    kind: TagKind,
    content: String,
    delimiters: Delimiters,
    tag_start: usize,
    tag_end: usize,
    indent: Option<String>,
}

enum RawItem {
    Text(String),
    Tag(RawTag),
}

pub(crate) fn parse(source: &str, initial: Delimiters) -> Result<Vec<Element>, String> {
    let items = tokenize(source, initial)?;
    let items = trim_standalone_lines(items);
    build(items, source)
}

fn tokenize(source: &str, initial: Delimiters) -> Result<Vec<RawItem>, String> {
    let mut items = Vec::new();
    let mut delims = initial;
    let mut pos = 0usize;
    let mut text_start = 0usize;

    while pos < source.len() {
        let Some(rel) = source[pos..].find(delims.open.as_str()) else {
            break;
        };
        let tag_open = pos + rel;
        if tag_open > text_start {
            items.push(RawItem::Text(source[text_start..tag_open].to_string()));
        }

        let after_open = tag_open + delims.open.len();

        if delims.open == "{{" && source[after_open..].starts_with('{') {
            let name_start = after_open + 1;
            let Some(close_rel) = source[name_start..].find("}}}") else {
                return Err("unterminated {{{ tag".to_string());
            };
            let name_end = name_start + close_rel;
            let tag_end = name_end + 3;
            items.push(RawItem::Tag(RawTag {
                kind: TagKind::Unescaped,
                content: source[name_start..name_end].trim().to_string(),
                delimiters: delims.clone(),
                tag_start: tag_open,
                tag_end,
                indent: None,
            }));
            pos = tag_end;
            text_start = tag_end;
            continue;
        }

        let Some(close_rel) = source[after_open..].find(delims.close.as_str()) else {
            return Err("unterminated tag".to_string());
        };
        let content_end = after_open + close_rel;
        let tag_end = content_end + delims.close.len();
        let raw = &source[after_open..content_end];

        let (kind, content) = classify(raw, &mut delims)?;
        items.push(RawItem::Tag(RawTag {
            kind,
            content,
            delimiters: delims.clone(),
            tag_start: tag_open,
            tag_end,
            indent: None,
        }));
        pos = tag_end;
        text_start = tag_end;
    }

    if text_start < source.len() {
        items.push(RawItem::Text(source[text_start..].to_string()));
    }

    Ok(items)
}

fn classify(raw: &str, delims: &mut Delimiters) -> Result<(TagKind, String), String> {
    if let Some(rest) = raw.strip_prefix('#') {
        Ok((TagKind::SectionStart { inverted: false }, rest.trim().to_string()))
    } else if let Some(rest) = raw.strip_prefix('^') {
        Ok((TagKind::SectionStart { inverted: true }, rest.trim().to_string()))
    } else if let Some(rest) = raw.strip_prefix('/') {
        Ok((TagKind::SectionEnd, rest.trim().to_string()))
    } else if let Some(rest) = raw.strip_prefix('!') {
        Ok((TagKind::Comment, rest.trim().to_string()))
    } else if let Some(rest) = raw.strip_prefix('>') {
        Ok((TagKind::Partial, rest.trim().to_string()))
    } else if let Some(rest) = raw.strip_prefix('&') {
        Ok((TagKind::Unescaped, rest.trim().to_string()))
    } else if raw.trim().len() >= 2 && raw.trim().starts_with('=') && raw.trim().ends_with('=') {
        let trimmed = raw.trim();
        let inner = &trimmed[1..trimmed.len() - 1];
        let mut parts = inner.split_whitespace();
        let open = parts.next().ok_or("malformed delimiter tag")?;
        let close = parts.next().ok_or("malformed delimiter tag")?;
        delims.open = open.to_string();
        delims.close = close.to_string();
        Ok((TagKind::SetDelimiters, String::new()))
    } else {
        Ok((TagKind::Escaped, raw.trim().to_string()))
    }
}

fn is_block_tag(kind: &TagKind) -> bool {
    matches!(
        kind,
        TagKind::SectionStart { .. }
            | TagKind::SectionEnd
            | TagKind::Comment
            | TagKind::Partial
            | TagKind::SetDelimiters
    )
}

/// Strips the surrounding blank line from a tag that sits alone on
/// its own line, and (for partials) records the whitespace that
/// preceded it as the indent to reapply to every emitted line.
fn trim_standalone_lines(mut items: Vec<RawItem>) -> Vec<RawItem> {
    let last_index = items.len().saturating_sub(1);

    for i in 0..items.len() {
        let eligible = matches!(&items[i], RawItem::Tag(t) if is_block_tag(&t.kind));
        if !eligible {
            continue;
        }

        let before_ok = if i == 0 {
            true
        } else {
            match &items[i - 1] {
                RawItem::Tag(_) => true,
                RawItem::Text(s) => only_whitespace_since_last_newline(s),
            }
        };
        if !before_ok {
            continue;
        }

        let consumed = if i + 1 >= items.len() {
            Some(0)
        } else {
            match &items[i + 1] {
                RawItem::Tag(_) => None,
                RawItem::Text(s) => leading_trim(s, i + 1 == last_index),
            }
        };
        let Some(consumed) = consumed else {
            continue;
        };

        let indent = if i > 0 {
            match &items[i - 1] {
                RawItem::Text(s) => trailing_whitespace_since_last_newline(s).to_string(),
                RawItem::Tag(_) => String::new(),
            }
        } else {
            String::new()
        };

        if i > 0 {
            if let RawItem::Text(s) = &mut items[i - 1] {
                let cut = s.len() - trailing_whitespace_since_last_newline(s).len();
                s.truncate(cut);
            }
        }
        if i + 1 < items.len() {
            if let RawItem::Text(s) = &mut items[i + 1] {
                *s = s[consumed..].to_string();
            }
        }
        if let RawItem::Tag(t) = &mut items[i] {
            if matches!(t.kind, TagKind::Partial) {
                t.indent = Some(indent);
            }
        }
    }

    items
}

fn trailing_segment_since_last_newline(s: &str) -> &str {
    match s.rfind('\n') {
        Some(idx) => &s[idx + 1..],
        None => s,
    }
}

fn only_whitespace_since_last_newline(s: &str) -> bool {
    trailing_segment_since_last_newline(s)
        .chars()
        .all(|c| c == ' ' || c == '\t')
}

fn trailing_whitespace_since_last_newline(s: &str) -> &str {
    let seg = trailing_segment_since_last_newline(s);
    if seg.chars().all(|c| c == ' ' || c == '\t') {
        seg
    } else {
        ""
    }
}

/// Returns the byte length of a leading whitespace+newline run, or
/// (when `is_last_item` and the whole chunk is whitespace) the whole
/// chunk, permitting an unterminated final line to be standalone too.
fn leading_trim(s: &str, is_last_item: bool) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() && (bytes[idx] == b' ' || bytes[idx] == b'\t') {
        idx += 1;
    }
    if idx < bytes.len() && bytes[idx] == b'\n' {
        Some(idx + 1)
    } else if idx == bytes.len() && is_last_item {
        Some(idx)
    } else {
        None
    }
}

struct OpenSection {
    index: usize,
    path: String,
    inverted: bool,
    delimiters: Delimiters,
    body_start: usize,
}

fn build(items: Vec<RawItem>, source: &str) -> Result<Vec<Element>, String> {
    let mut elements = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();

    for item in items {
        match item {
            RawItem::Text(t) => {
                if !t.is_empty() {
                    elements.push(Element::Text(t));
                }
            }
            RawItem::Tag(tag) => match tag.kind {
                TagKind::Escaped => elements.push(Element::Escaped {
                    path: tag.content,
                    delimiters: tag.delimiters,
                }),
                TagKind::Unescaped => elements.push(Element::Unescaped {
                    path: tag.content,
                    delimiters: tag.delimiters,
                }),
                TagKind::Comment | TagKind::SetDelimiters => {}
                TagKind::Partial => elements.push(Element::Partial {
                    name: tag.content,
                    indent: tag.indent.unwrap_or_default(),
                }),
                TagKind::SectionStart { inverted } => {
                    let index = elements.len();
                    elements.push(Element::Section {
                        path: tag.content.clone(),
                        len: 0,
                        inverted,
                        text: String::new(),
                        delimiters: tag.delimiters.clone(),
                    });
                    stack.push(OpenSection {
                        index,
                        path: tag.content,
                        inverted,
                        delimiters: tag.delimiters,
                        body_start: tag.tag_end,
                    });
                }
                TagKind::SectionEnd => {
                    let open = stack.pop().ok_or_else(|| {
                        format!(
                            "unexpected section close '{}' with no matching open",
                            tag.content
                        )
                    })?;
                    if open.path != tag.content {
                        return Err(format!(
                            "mismatched section close: expected '{}', found '{}'",
                            open.path, tag.content
                        ));
                    }
                    let len = elements.len() - open.index - 1;
                    let text = source[open.body_start..tag.tag_start].to_string();
                    elements[open.index] = Element::Section {
                        path: open.path,
                        len,
                        inverted: open.inverted,
                        text,
                        delimiters: open.delimiters,
                    };
                }
            },
        }
    }

    if let Some(open) = stack.pop() {
        return Err(format!("unclosed section '{}'", open.path));
    }

    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(source: &str) -> Vec<Element> {
        parse(source, Delimiters::default()).expect("should parse")
    }

    #[test]
    fn plain_text_is_one_element() {
        let elements = parse_default("hello world");
        assert_eq!(elements, vec![Element::Text("hello world".into())]);
    }

    #[test]
    fn escaped_and_unescaped_interpolation() {
        let elements = parse_default("{{name}} {{{raw}}} {{&also_raw}}");
        assert!(matches!(&elements[0], Element::Escaped { path, .. } if path == "name"));
        assert!(matches!(&elements[2], Element::Unescaped { path, .. } if path == "raw"));
        assert!(matches!(&elements[4], Element::Unescaped { path, .. } if path == "also_raw"));
    }

    #[test]
    fn comments_are_dropped() {
        let elements = parse_default("a{{! not rendered }}b");
        assert_eq!(
            elements,
            vec![Element::Text("a".into()), Element::Text("b".into())]
        );
    }

    #[test]
    fn section_records_its_body_length_and_text() {
        let elements = parse_default("{{#items}}x{{name}}y{{/items}}");
        match &elements[0] {
            Element::Section { path, len, text, inverted, .. } => {
                assert_eq!(path, "items");
                assert_eq!(*len, 3);
                assert!(!inverted);
                assert_eq!(text, "x{{name}}y");
            }
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn standalone_section_tags_consume_their_blank_line() {
        let elements = parse_default("before\n{{#items}}\ninside\n{{/items}}\nafter");
        assert_eq!(
            elements,
            vec![
                Element::Text("before\n".into()),
                Element::Section {
                    path: "items".into(),
                    len: 1,
                    inverted: false,
                    text: "\ninside\n".into(),
                    delimiters: Delimiters::default(),
                },
                Element::Text("inside\n".into()),
                Element::Text("after".into()),
            ]
        );
    }

    #[test]
    fn standalone_partial_captures_indent() {
        let elements = parse_default("  {{>footer}}\n");
        match &elements[0] {
            Element::Partial { name, indent } => {
                assert_eq!(name, "footer");
                assert_eq!(indent, "  ");
            }
            other => panic!("expected partial, got {other:?}"),
        }
    }

    #[test]
    fn inline_partial_has_no_indent() {
        let elements = parse_default("Hi {{>footer}}!");
        match &elements[1] {
            Element::Partial { indent, .. } => assert_eq!(indent, ""),
            other => panic!("expected partial, got {other:?}"),
        }
    }

    #[test]
    fn custom_delimiters_apply_until_changed() {
        let elements = parse_default("{{=<% %>=}}<%name%>{{literal}}");
        assert!(matches!(&elements[0], Element::Escaped { path, .. } if path == "name"));
        assert!(matches!(&elements[1], Element::Text(t) if t == "{{literal}}"));
    }

    #[test]
    fn mismatched_section_close_is_an_error() {
        assert!(parse("{{#a}}x{{/b}}", Delimiters::default()).is_err());
    }

    #[test]
    fn unclosed_section_is_an_error() {
        assert!(parse("{{#a}}x", Delimiters::default()).is_err());
    }
}
