//! Title and `og:image` extraction from a fetched HTML page.
//!
//! This is deliberately shallow: a couple of regexes over the raw markup,
//! not a DOM. Pages that hide their metadata behind scripts yield nothing.

use crate::domain::model::Metadata;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("valid title regex"));

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\b[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.-]+)"#)
        .expect("valid meta charset regex")
});

/// Decodes a page body to text.
///
/// The Content-Type charset wins, then a charset declared in a `<meta>` tag,
/// then UTF-8. Labels `encoding_rs` does not know fall through to the next source.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(bytes))
        .unwrap_or(UTF_8);

    tracing::debug!("Decoding page body as {}", encoding.name());
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Page body had bytes invalid for {}", encoding.name());
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

// Charset labels are ASCII, so a lossy UTF-8 view is enough to find them.
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(4096)]);
    let caps = META_CHARSET_RE.captures(&head)?;
    Encoding::for_label(caps[1].as_bytes())
}

pub fn extract_metadata(html: &str, page_url: &str) -> Metadata {
    let title = TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
        .filter(|t| !t.is_empty());

    let image_url = find_og_image(html).and_then(|raw| normalize_image_url(&raw, page_url));

    Metadata { title, image_url }
}

fn find_og_image(html: &str) -> Option<String> {
    META_RE.find_iter(html).find_map(|tag| {
        let mut is_og_image = false;
        let mut content = None;
        for caps in ATTR_RE.captures_iter(tag.as_str()) {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or("");
            match name.as_str() {
                "property" | "name" if value.eq_ignore_ascii_case("og:image") => {
                    is_og_image = true
                }
                "content" => content = Some(decode_entities(value)),
                _ => {}
            }
        }
        if is_og_image {
            content
        } else {
            None
        }
    })
}

/// Absolute http(s) URLs are kept, protocol-relative ones get `https:`,
/// anything else is resolved against the page URL.
pub fn normalize_image_url(raw: &str, page_url: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("//") {
        return Some(format!("https:{}", raw));
    }
    if let Ok(url) = Url::parse(raw) {
        return matches!(url.scheme(), "http" | "https").then(|| raw.to_string());
    }
    Url::parse(page_url)
        .and_then(|base| base.join(raw))
        .ok()
        .map(|u| u.to_string())
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
