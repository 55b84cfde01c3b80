use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path};

use super::DirectoryEntry;

/// Bytes escaped inside one path segment of an href.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Escapes every occurrence of the five HTML-significant characters.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Absolute URL path for `path`, relative to the document root, with every
/// segment percent-encoded.
pub fn href_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut href = String::from("/");
    let segments = relative.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy()),
        _ => None,
    });
    for (i, segment) in segments.enumerate() {
        if i > 0 {
            href.push('/');
        }
        href.extend(utf8_percent_encode(&segment, SEGMENT));
    }
    href
}

/// Renders a directory listing page. `pathname` goes into the title and
/// heading verbatim; entry labels are escaped and hrefs percent-encoded.
pub fn render(root: &Path, pathname: &Path, entries: &[DirectoryEntry]) -> String {
    let pathname = pathname.display();
    let list: String = entries
        .iter()
        .map(|entry| {
            format!(
                "<li><a href=\"{}\">{}</a></li>",
                href_for(root, &entry.full_path),
                escape_html(&entry.base_name)
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html><html>\
         <head><meta charset='utf-8'><title>{pathname}</title></head>\
         <body><h1>{pathname}</h1><ul>{list}</ul></body>\
         </html>"
    )
}
