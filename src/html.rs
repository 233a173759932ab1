//! Minimal edits on server-rendered pages: locate an element by `id` or a
//! form control by `name`, replace its contents, insert markup in front of
//! it, or rewrite attributes on its opening tag.
//!
//! This is not an HTML parser. It understands well-formed static pages,
//! which is all the site ships.

use std::ops::Range;
use std::sync::LazyLock;

use askama::filters::{Escaper, Html};
use regex::{Captures, Regex};

/// Any opening or closing tag. Group 1 is the slash, group 2 the tag name.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)\b[^>]*>").unwrap());

/// One attribute inside a tag: name, then a double-quoted, single-quoted or
/// bare value. Boolean attributes have no value group.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .unwrap()
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Byte ranges of an element located in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// The whole element, from `<` of the opening tag to `>` of the closing tag.
    pub outer: Range<usize>,
    /// Everything between the opening and the closing tag.
    pub inner: Range<usize>,
}

impl Element {
    /// The opening tag alone. For void elements this is the whole element.
    pub fn open_tag(&self) -> Range<usize> {
        self.outer.start..self.inner.start
    }
}

struct OpenTag<'a> {
    name: &'a str,
    text: &'a str,
    range: Range<usize>,
}

fn open_tags(page: &str) -> impl Iterator<Item = OpenTag<'_>> {
    TAG_RE.captures_iter(page).filter_map(|caps| {
        if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            return None;
        }
        let whole = caps.get(0)?;
        Some(OpenTag {
            name: caps.get(2)?.as_str(),
            text: whole.as_str(),
            range: whole.range(),
        })
    })
}

fn element_at(page: &str, open: OpenTag<'_>) -> Option<Element> {
    let start = open.range.start;
    let end = open.range.end;

    let is_void = VOID_ELEMENTS
        .iter()
        .any(|v| open.name.eq_ignore_ascii_case(v));
    if is_void || open.text.ends_with("/>") {
        return Some(Element {
            outer: start..end,
            inner: end..end,
        });
    }

    // Walk nested tags of the same name until the matching close tag.
    let mut depth = 1usize;
    for caps in TAG_RE.captures_iter(&page[end..]) {
        if !caps
            .get(2)
            .is_some_and(|name| name.as_str().eq_ignore_ascii_case(open.name))
        {
            continue;
        }
        let whole = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|c| !c.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some(Element {
                    outer: start..end + whole.end(),
                    inner: end..end + whole.start(),
                });
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    None
}

/// Find the element whose `id` attribute equals `id`.
pub fn find_element(page: &str, id: &str) -> Option<Element> {
    let open = open_tags(page).find(|tag| attr(tag.text, "id") == Some(id))?;
    element_at(page, open)
}

/// Find the first `tag` element whose `name` attribute equals `name`.
pub fn find_named(page: &str, tag: &str, name: &str) -> Option<Element> {
    let open = open_tags(page)
        .find(|t| t.name.eq_ignore_ascii_case(tag) && attr(t.text, "name") == Some(name))?;
    element_at(page, open)
}

/// Value of `name` on an opening tag. Boolean attributes yield `""`.
pub fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    ATTR_RE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str())
        })
}

/// Drop `name` from an opening tag.
pub fn remove_attr(tag: &str, name: &str) -> String {
    match ATTR_RE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(0))
    {
        Some(found) => format!("{}{}", &tag[..found.start()], &tag[found.end()..]),
        None => tag.to_string(),
    }
}

/// Set `name` on an opening tag, replacing any previous value. The value is
/// escaped; `None` writes a bare boolean attribute.
pub fn set_attr(tag: &str, name: &str, value: Option<&str>) -> String {
    let stripped = remove_attr(tag, name);
    let Some(head) = stripped
        .strip_suffix("/>")
        .or_else(|| stripped.strip_suffix('>'))
    else {
        return stripped;
    };
    let close = &stripped[head.len()..];
    let head = head.trim_end();

    match value {
        Some(value) => format!(r#"{head} {name}="{}"{close}"#, escape(value)),
        None => format!("{head} {name}{close}"),
    }
}

/// Run every opening `tag` in `markup` through `rewrite`.
pub fn rewrite_open_tags(
    markup: &str,
    tag: &str,
    mut rewrite: impl FnMut(&str) -> String,
) -> String {
    TAG_RE
        .replace_all(markup, |caps: &Captures<'_>| {
            let opening = caps.get(1).is_some_and(|slash| slash.as_str().is_empty());
            if opening && caps[2].eq_ignore_ascii_case(tag) {
                rewrite(&caps[0])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// HTML-escape text for use in an attribute or between tags.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = Html.write_escaped_str(&mut out, text);
    out
}

/// Replace `range` of `page` with `content`.
pub fn splice(page: &str, range: Range<usize>, content: &str) -> String {
    let mut out = String::with_capacity(page.len() + content.len());
    out.push_str(&page[..range.start]);
    out.push_str(content);
    out.push_str(&page[range.end..]);
    out
}

/// Replace everything inside the element with `id`. Returns `None` when the
/// element is missing.
pub fn replace_inner(page: &str, id: &str, content: &str) -> Option<String> {
    let element = find_element(page, id)?;
    Some(splice(page, element.inner, content))
}

/// Insert `content` immediately before the element with `id`.
pub fn insert_before(page: &str, id: &str, content: &str) -> Option<String> {
    let element = find_element(page, id)?;
    let at = element.outer.start;
    Some(splice(page, at..at, content))
}
