//! Record extraction from listing-page markup.
//!
//! Each item lives in an `<article class="product_pod">` block. The title is
//! the `title` attribute of the link inside the block's `<h3>`, the price is
//! the text of `<p class="price_color">`. Scanning is local to each block and
//! ASCII case-insensitive on tag and attribute names; no document tree is
//! built.

use crate::error::{Result, ShelfError};
use crate::scrape::record::BookRecord;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const CONTAINER_TAG: &str = "article";
const CONTAINER_CLASS: &str = "product_pod";
const HEADING_TAG: &str = "h3";
const LINK_TAG: &str = "a";
const TITLE_ATTRIBUTE: &str = "title";
const PRICE_TAG: &str = "p";
const PRICE_CLASS: &str = "price_color";

/// Entities longer than this are left as literal text.
const MAX_ENTITY_LEN: usize = 10;

/// Extract every well-formed item on the page, in document order. A block
/// missing its title or price is logged and skipped; its siblings are kept.
pub fn parse_records(content: &str) -> Vec<BookRecord> {
    let containers = find_elements(content, CONTAINER_TAG, Some(CONTAINER_CLASS));
    let mut records = Vec::with_capacity(containers.len());

    for (index, container) in containers.iter().enumerate() {
        match extract_record(container.inner) {
            Ok(record) => records.push(record),
            Err(err) => log_warn!("Skipping item {} on page: {err}", index + 1),
        }
    }

    log_debug!(
        "Extracted {} of {} item containers",
        records.len(),
        containers.len()
    );
    records
}

/// Pull one record out of the inner markup of an item container.
pub fn extract_record(container: &str) -> Result<BookRecord> {
    let heading = find_element(container, 0, HEADING_TAG, None)
        .ok_or_else(|| ShelfError::parse("item has no <h3> heading"))?;
    let link = find_open_tag(heading.inner, 0, LINK_TAG)
        .ok_or_else(|| ShelfError::parse("item heading has no link"))?;
    let title = attribute(link.tag, TITLE_ATTRIBUTE)
        .ok_or_else(|| ShelfError::parse("item link has no title attribute"))?;

    let price_element = find_element(container, 0, PRICE_TAG, Some(PRICE_CLASS))
        .ok_or_else(|| ShelfError::parse("item has no price element"))?;
    let price = text_content(price_element.inner);
    if price.is_empty() {
        return Err(ShelfError::parse(format!("item '{title}' has an empty price")));
    }

    Ok(BookRecord { title, price })
}

struct OpenTag<'a> {
    /// The whole `<name ...>` text.
    tag: &'a str,
    /// Byte offset just past the closing `>`.
    end: usize,
}

struct Element<'a> {
    inner: &'a str,
    /// Byte offset just past the closing tag, or the end of input if unclosed.
    end: usize,
}

fn find_elements<'a>(html: &'a str, name: &str, class: Option<&str>) -> Vec<Element<'a>> {
    let mut elements = Vec::new();
    let mut cursor = 0;
    while let Some(element) = find_element(html, cursor, name, class) {
        cursor = element.end;
        elements.push(element);
    }
    elements
}

fn find_element<'a>(
    html: &'a str,
    from: usize,
    name: &str,
    class: Option<&str>,
) -> Option<Element<'a>> {
    let mut cursor = from;
    loop {
        let open = find_open_tag(html, cursor, name)?;
        cursor = open.end;

        if let Some(class) = class {
            if !has_class(open.tag, class) {
                continue;
            }
        }

        let (inner_end, end) = match find_close_tag(html, open.end, name) {
            Some(close_start) => {
                let close_end = html[close_start..]
                    .find('>')
                    .map(|offset| close_start + offset + 1)
                    .unwrap_or(html.len());
                (close_start, close_end)
            }
            None => (html.len(), html.len()),
        };

        return Some(Element {
            inner: &html[open.end..inner_end],
            end,
        });
    }
}

fn find_open_tag<'a>(html: &'a str, from: usize, name: &str) -> Option<OpenTag<'a>> {
    let bytes = html.as_bytes();
    let mut cursor = from;
    while cursor < html.len() {
        let start = cursor + html[cursor..].find('<')?;
        let name_start = start + 1;
        let name_end = name_start + name.len();

        if name_end <= html.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            && is_name_boundary(bytes.get(name_end).copied())
        {
            let close = tag_end(html, name_end)?;
            return Some(OpenTag {
                tag: &html[start..=close],
                end: close + 1,
            });
        }
        cursor = name_start;
    }
    None
}

fn find_close_tag(html: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut cursor = from;
    while cursor < html.len() {
        let start = cursor + html[cursor..].find("</")?;
        let name_start = start + 2;
        let name_end = name_start + name.len();

        if name_end <= html.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            && is_name_boundary(bytes.get(name_end).copied())
        {
            return Some(start);
        }
        cursor = name_start;
    }
    None
}

/// Offset of the `>` closing a tag, ignoring any `>` inside quoted values.
fn tag_end(html: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, &byte) in html.as_bytes()[from..].iter().enumerate() {
        match quote {
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if byte == b'>' => return Some(from + offset),
            None => {}
        }
    }
    None
}

fn is_name_boundary(byte: Option<u8>) -> bool {
    match byte {
        None => true,
        Some(b) => b == b'>' || b == b'/' || b.is_ascii_whitespace(),
    }
}

fn has_class(open_tag: &str, class: &str) -> bool {
    attribute(open_tag, "class")
        .is_some_and(|value| value.split_whitespace().any(|candidate| candidate == class))
}

/// Decoded value of attribute `name` in an open tag. Valueless attributes
/// read as the empty string.
fn attribute(open_tag: &str, name: &str) -> Option<String> {
    let bytes = open_tag.as_bytes();
    let len = bytes.len();

    let mut i = 1;
    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }

    loop {
        while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' {
            return None;
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        let attr_name = &open_tag[name_start..i];

        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = "";
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                value = &open_tag[value_start..i];
                i = (i + 1).min(len);
            } else {
                let value_start = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = &open_tag[value_start..i];
            }
        }

        if attr_name.eq_ignore_ascii_case(name) {
            return Some(decode_entities(value));
        }
    }
}

/// Text of a fragment with tags dropped, entities decoded and outer
/// whitespace trimmed.
fn text_content(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        match tag_end(rest, start) {
            Some(end) => rest = &rest[end + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    text.push_str(rest);
    decode_entities(&text).trim().to_string()
}

pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
