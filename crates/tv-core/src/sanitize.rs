//! # Sanitizer
//!
//! Post bodies are untrusted HTML. Everything shown to a reader goes through
//! [`Sanitizer::sanitize`], which runs up to three passes:
//!
//! 1. an allow-list clean (ammonia) that drops unknown tags and attributes,
//!    keeping their text, and drops `script`/`style` together with their text;
//! 2. optionally, removal of line-break elements from the cleaned markup;
//! 3. optionally, a second clean with an empty allow-list, leaving plain text.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// Which markup survives sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Elements kept as markup.
    pub tags: HashSet<&'static str>,
    /// Attributes kept, per element.
    pub tag_attributes: HashMap<&'static str, HashSet<&'static str>>,
    /// Elements removed together with everything inside them.
    pub content_tags: HashSet<&'static str>,
    /// Elements removed when line breaks are not wanted.
    pub break_tags: Vec<&'static str>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        let tags = [
            "b", "i", "u", "em", "strong", "p", "ul", "ol", "li", "blockquote", "code", "pre",
            "br", "a", "img",
        ];
        let tag_attributes = HashMap::from([
            ("a", HashSet::from(["href", "title"])),
            ("code", HashSet::from(["class"])),
            ("img", HashSet::from(["src", "alt", "title", "width", "height"])),
        ]);

        Self {
            tags: tags.into_iter().collect(),
            tag_attributes,
            content_tags: HashSet::from(["script", "style"]),
            break_tags: vec!["br"],
        }
    }
}

/// Allow-list HTML cleaner. Build once, share freely (`Send + Sync`).
pub struct Sanitizer {
    allow: Builder<'static>,
    strip_all: Builder<'static>,
    break_tags: Vec<&'static str>,
}

impl Sanitizer {
    pub fn new(policy: SanitizePolicy) -> Self {
        let mut allow = Builder::default();
        allow
            .tags(policy.tags)
            .tag_attributes(policy.tag_attributes)
            .generic_attributes(HashSet::new())
            .clean_content_tags(policy.content_tags)
            .link_rel(None);

        Self {
            allow,
            strip_all: Builder::empty(),
            break_tags: policy.break_tags,
        }
    }

    /// Cleans `html`. Never fails: broken markup comes back as whatever text
    /// the HTML parser could recover from it.
    pub fn sanitize(&self, html: &str, remove_breaks: bool, remove_links: bool) -> String {
        let mut cleaned = self.allow.clean(html).to_string();

        if remove_breaks {
            cleaned = strip_elements(&cleaned, &self.break_tags);
        }

        if remove_links {
            cleaned = self.strip_all.clean(&cleaned).to_string();
        }

        cleaned
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizePolicy::default())
    }
}

/// Removes every opening, closing or self-closing tag named in `names`
/// (ASCII case-insensitive), copying all other tags and text unchanged.
///
/// Works on serialized HTML in a single forward scan. Quoted attribute values
/// may contain `>`; an unterminated tag runs to the end of the input.
pub fn strip_elements(html: &str, names: &[&str]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tag_end(tail).unwrap_or(tail.len());
        let tag = &tail[..end];

        let name = tag_name(tag);
        if !names.iter().any(|n| name.eq_ignore_ascii_case(n)) {
            out.push_str(tag);
        }
        rest = &tail[end..];
    }

    out.push_str(rest);
    out
}

/// Byte offset just past the `>` closing the tag that starts `tag`.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tag.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

fn tag_name(tag: &str) -> &str {
    let body = tag[1..].trim_start_matches('/');
    let len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    &body[..len]
}
