//! HTML tokenization and tree construction over the arena DOM.

use fw_core::WikiResult;
use fw_dom::Document;
use fw_dom::NodeId;

/// Elements that never take children and never appear on the open stack.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parses raw HTML into a DOM document.
///
/// Parsing is best effort: malformed markup degrades to whatever tree the
/// scanner can recover, it never aborts the page.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> WikiResult<Document> {
        let mut document = Document::new();
        let root = document.create_element("html");
        document.set_root(root)?;

        let bytes = input.as_bytes();
        let mut stack: Vec<(String, NodeId)> = vec![("html".to_owned(), root)];
        let mut idx = 0_usize;

        while idx < bytes.len() {
            if bytes[idx] != b'<' {
                let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
                append_text(&mut document, &stack, &input[idx..next])?;
                idx = next;
                continue;
            }

            if starts_with(bytes, idx, b"<!--") {
                idx = skip_comment(bytes, idx);
                continue;
            }

            if starts_with(bytes, idx, b"<!") {
                idx = skip_to_gt(bytes, idx.saturating_add(2));
                continue;
            }

            if starts_with(bytes, idx, b"<?") {
                idx = skip_processing_instruction(bytes, idx);
                continue;
            }

            let Some((tag, next_idx)) = parse_tag(bytes, idx) else {
                idx = idx.saturating_add(1);
                continue;
            };

            if tag.is_end {
                close_open_tag(&mut stack, &tag.name);
                idx = next_idx;
                continue;
            }

            if tag.name == "html" {
                // An explicit <html> contributes attributes to the implicit root.
                for (name, value) in &tag.attributes {
                    document.set_attribute(root, name, value)?;
                }
                idx = next_idx;
                continue;
            }

            if tag.name == "title" {
                let (raw_title, after_title) = read_raw_text_until_end_tag(input, next_idx, "title");
                let element = open_element(&mut document, &stack, &tag)?;
                append_text_to(&mut document, element, raw_title)?;
                if document.title.is_empty() {
                    document.title = collapse_whitespace(raw_title);
                }
                idx = after_title;
                continue;
            }

            if !tag.self_closing && (tag.name == "script" || tag.name == "style") {
                // Raw text is dropped; the page controllers never read it.
                let (_, after_raw) = read_raw_text_until_end_tag(input, next_idx, &tag.name);
                idx = after_raw;
                continue;
            }

            let element = open_element(&mut document, &stack, &tag)?;
            if !tag.self_closing && !is_void_element(&tag.name) {
                stack.push((tag.name, element));
            }
            idx = next_idx;
        }

        Ok(document)
    }
}

fn open_element(
    document: &mut Document,
    stack: &[(String, NodeId)],
    tag: &ParsedTag,
) -> WikiResult<NodeId> {
    let element = document.create_element(&tag.name);
    for (name, value) in &tag.attributes {
        document.set_attribute(element, name, value)?;
    }

    if let Some((_, parent)) = stack.last() {
        document.append_child(*parent, element)?;
    }

    Ok(element)
}

fn close_open_tag(stack: &mut Vec<(String, NodeId)>, name: &str) {
    // Pop to the nearest matching open tag; unmatched end tags are ignored
    // and the implicit root is never popped.
    if let Some(pos) = stack.iter().rposition(|(open, _)| open == name) {
        stack.truncate(pos.max(1));
    }
}

fn append_text(document: &mut Document, stack: &[(String, NodeId)], raw: &str) -> WikiResult<()> {
    let Some((_, parent)) = stack.last() else {
        return Ok(());
    };

    append_text_to(document, *parent, raw)
}

fn append_text_to(document: &mut Document, parent: NodeId, raw: &str) -> WikiResult<()> {
    if raw.chars().all(char::is_whitespace) {
        return Ok(());
    }

    let decoded = decode_entities(raw);
    let text = document.create_text(&decoded);
    document.append_child(parent, text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    attributes: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

fn parse_tag(bytes: &[u8], start: usize) -> Option<(ParsedTag, usize)> {
    if bytes.get(start).copied() != Some(b'<') {
        return None;
    }

    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    idx = skip_spaces(bytes, idx);
    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }

    if idx == name_start {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[name_start..idx]).to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attributes,
                        is_end,
                        self_closing,
                    },
                    idx.saturating_add(1),
                ));
            }
            Some(b'/') => {
                if bytes.get(idx.saturating_add(1)).copied() == Some(b'>') {
                    self_closing = true;
                }
                idx = idx.saturating_add(1);
            }
            Some(_) => {
                let Some(next_idx) = parse_attribute(bytes, idx, &mut attributes) else {
                    idx = idx.saturating_add(1);
                    continue;
                };
                idx = next_idx;
            }
        }
    }
}

fn parse_attribute(
    bytes: &[u8],
    start: usize,
    attributes: &mut Vec<(String, String)>,
) -> Option<usize> {
    let mut idx = start;
    while idx < bytes.len() && !is_attr_boundary(bytes[idx]) {
        idx = idx.saturating_add(1);
    }

    if idx == start {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[start..idx]).to_ascii_lowercase();
    idx = skip_spaces(bytes, idx);

    if bytes.get(idx).copied() != Some(b'=') {
        // Bare boolean attribute.
        attributes.push((name, String::new()));
        return Some(idx);
    }

    idx = skip_spaces(bytes, idx.saturating_add(1));
    let value = match bytes.get(idx).copied() {
        Some(quote @ (b'"' | b'\'')) => {
            idx = idx.saturating_add(1);
            let value_start = idx;
            while idx < bytes.len() && bytes[idx] != quote {
                idx = idx.saturating_add(1);
            }
            let raw = String::from_utf8_lossy(&bytes[value_start..idx]).into_owned();
            if idx < bytes.len() {
                idx = idx.saturating_add(1);
            }
            raw
        }
        _ => {
            let value_start = idx;
            while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>' {
                idx = idx.saturating_add(1);
            }
            String::from_utf8_lossy(&bytes[value_start..idx]).into_owned()
        }
    };

    attributes.push((name, decode_entities(&value)));
    Some(idx)
}

fn read_raw_text_until_end_tag<'a>(
    input: &'a str,
    start: usize,
    tag_name: &str,
) -> (&'a str, usize) {
    let bytes = input.as_bytes();
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx.saturating_add(2), tag_bytes)
            && tag_name_boundary(bytes, idx.saturating_add(2 + tag_bytes.len()))
        {
            if let Some((_, end_idx)) = parse_tag(bytes, idx) {
                return (&input[start..idx], end_idx);
            }
        }

        idx = idx.saturating_add(1);
    }

    (&input[start..], bytes.len())
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }

    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&apos;", '\''),
    ];

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let mut matched = false;
        for (entity, decoded) in ENTITIES {
            if rest.starts_with(entity) {
                out.push(*decoded);
                rest = &rest[entity.len()..];
                matched = true;
                break;
            }
        }

        if !matched {
            out.push('&');
            rest = &rest[1..];
        }
    }

    out.push_str(rest);
    out
}

fn collapse_whitespace(input: &str) -> String {
    input
        .split_whitespace()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    find_subslice(bytes, start.saturating_add(4), b"-->")
        .map(|end| end.saturating_add(3))
        .unwrap_or(bytes.len())
}

fn skip_processing_instruction(bytes: &[u8], start: usize) -> usize {
    if let Some(end) = find_subslice(bytes, start.saturating_add(2), b"?>") {
        return end.saturating_add(2);
    }

    skip_to_gt(bytes, start.saturating_add(2))
}

fn skip_to_gt(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() {
        if bytes[idx] == b'>' {
            return idx.saturating_add(1);
        }
        idx = idx.saturating_add(1);
    }

    bytes.len()
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attr_boundary(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/')
}

fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    if end > bytes.len() {
        return false;
    }

    bytes[idx..end]
        .iter()
        .zip(pattern.iter())
        .all(|(left, right)| left.eq_ignore_ascii_case(right))
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }

    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}
