//! HTML simplification with a byte-level transformation record
//!
//! The simplified text drops tags, comments, scripts and styles, decodes
//! entities and collapses whitespace. Block-level tags become line breaks.
//! Every piece of the original is accounted for by a [`Fragment`], so any
//! simplified offset can be traced back to the original HTML.

use crate::patterns::CommonPatterns;
use std::ops::Range;

/// Elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements rendered on their own line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose content is never text
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn is_block_element(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Lower-case element name
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    /// The tag exactly as written in the original
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentKind {
    /// Copied verbatim: offsets map linearly
    Text,
    /// Entity, collapsed whitespace or line break: maps as a whole
    Replaced,
    /// Markup, empty in the simplified text
    Tag(TagInfo),
    /// Dropped content (comment, script, link)
    Removed,
    /// Previously injected highlight, kept as text but never matched again
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub simplified: Range<usize>,
    pub original: Range<usize>,
    pub kind: FragmentKind,
}

/// Ordered fragments covering the whole original, in both coordinate spaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformationRecord {
    pub fragments: Vec<Fragment>,
}

impl TransformationRecord {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Simplified ranges covered by existing highlights
    pub fn highlighted(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.fragments
            .iter()
            .filter(|fragment| fragment.kind == FragmentKind::Highlight)
            .map(|fragment| fragment.simplified.clone())
    }

    /// Length of the simplified text
    pub fn simplified_len(&self) -> usize {
        self.fragments
            .last()
            .map_or(0, |fragment| fragment.simplified.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Drop `<a href>` elements and their content
    pub remove_links: bool,
    /// Turn previously injected highlight buttons into opaque text
    pub remove_highlights: bool,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            remove_links: true,
            remove_highlights: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplifiedHtml {
    pub text: String,
    pub record: TransformationRecord,
}

struct Builder {
    text: String,
    fragments: Vec<Fragment>,
}

impl Builder {
    fn new() -> Self {
        Self {
            text: String::new(),
            fragments: Vec::new(),
        }
    }

    fn push(&mut self, original: Range<usize>, replacement: &str, kind: FragmentKind) {
        let start = self.text.len();
        self.text.push_str(replacement);
        self.fragments.push(Fragment {
            simplified: start..self.text.len(),
            original,
            kind,
        });
    }

    fn push_text(&mut self, original: Range<usize>, content: &str) {
        let start = self.text.len();
        if let Some(last) = self.fragments.last_mut() {
            if last.kind == FragmentKind::Text
                && last.original.end == original.start
                && last.simplified.end == start
            {
                self.text.push_str(content);
                last.original.end = original.end;
                last.simplified.end = self.text.len();
                return;
            }
        }
        self.push(original, content, FragmentKind::Text);
    }

    fn ends_with_space(&self) -> bool {
        self.text.is_empty() || self.text.ends_with([' ', '\n'])
    }

    fn push_whitespace(&mut self, original: Range<usize>) {
        let replacement = if self.ends_with_space() { "" } else { " " };
        self.push(original, replacement, FragmentKind::Replaced);
    }

    /// Line break before a block tag starting at `at`
    fn push_break(&mut self, at: usize) {
        if self.text.is_empty() || self.text.ends_with('\n') {
            return;
        }
        if self.text.ends_with(' ') {
            self.text.pop();
            self.text.push('\n');
            return;
        }
        self.push(at..at, "\n", FragmentKind::Replaced);
    }

    fn finish(self) -> SimplifiedHtml {
        SimplifiedHtml {
            text: self.text,
            record: TransformationRecord {
                fragments: self.fragments,
            },
        }
    }
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }

    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "thinsp" => '\u{2009}',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "laquo" => '«',
        "raquo" => '»',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "euro" => '€',
        "deg" => '°',
        "sect" => '§',
        "agrave" => 'à',
        "acirc" => 'â',
        "ccedil" => 'ç',
        "eacute" => 'é',
        "egrave" => 'è',
        "ecirc" => 'ê',
        "euml" => 'ë',
        "icirc" => 'î',
        "iuml" => 'ï',
        "ocirc" => 'ô',
        "ugrave" => 'ù',
        "ucirc" => 'û',
        "uuml" => 'ü',
        "oelig" => 'œ',
        "Agrave" => 'À',
        "Ccedil" => 'Ç',
        "Eacute" => 'É',
        "Egrave" => 'È',
        "Ecirc" => 'Ê',
        "OElig" => 'Œ',
        _ => return None,
    })
}

/// Entity starting at `at` (which holds `&`): its length and decoded character
fn entity_at(html: &str, at: usize) -> Option<(usize, char)> {
    let rest = &html[at + 1..];
    let end = rest.find(';')?;
    let name = &rest[..end];
    if name.is_empty() || name.len() > 10 || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'#') {
        return None;
    }
    Some((end + 2, decode_entity(name)?))
}

fn tag_name_at(html: &str, at: usize) -> &str {
    let rest = &html[at..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
        .unwrap_or(rest.len());
    &rest[..end]
}

/// End (exclusive) of the tag whose attributes start at `from`, skipping quoted values
fn tag_end(html: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, byte) in html.as_bytes()[from..].iter().enumerate() {
        match (quote, byte) {
            (Some(q), b) if *b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(*byte),
            (None, b'>') => return Some(from + offset + 1),
            (None, _) => {}
        }
    }
    None
}

/// End (exclusive) of the first `</name>` at or after `from`
fn closing_tag_end(lower: &str, from: usize, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    let mut search = from;
    while let Some(offset) = lower[search..].find(&needle) {
        let after = search + offset + needle.len();
        match lower.as_bytes().get(after) {
            Some(b'>') => return Some(after + 1),
            Some(b) if b.is_ascii_whitespace() => {
                return lower[after..].find('>').map(|end| after + end + 1);
            }
            _ => search = after,
        }
    }
    None
}

/// Simplify an HTML fragment, recording where every piece comes from
pub fn simplify_html(html: &str, options: &SimplifyOptions) -> SimplifiedHtml {
    let lower = html.to_ascii_lowercase();
    let mut builder = Builder::new();
    let mut at = 0;

    while at < html.len() {
        let rest = &html[at..];

        if rest.starts_with("<!--") {
            let end = rest[4..].find("-->").map_or(html.len(), |end| at + 4 + end + 3);
            builder.push(at..end, "", FragmentKind::Removed);
            at = end;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').map_or(html.len(), |end| at + end + 1);
            builder.push(at..end, "", FragmentKind::Removed);
            at = end;
            continue;
        }

        if let Some(after_bracket) = rest.strip_prefix('<') {
            let closing = after_bracket.starts_with('/');
            let name_at = at + 1 + usize::from(closing);
            let name = tag_name_at(html, name_at);

            if !name.is_empty() && name.as_bytes()[0].is_ascii_alphabetic() {
                if let Some(end) = tag_end(html, name_at + name.len()) {
                    let name = name.to_ascii_lowercase();
                    let raw = &html[at..end];

                    if !closing
                        && options.remove_highlights
                        && name == "button"
                        && CommonPatterns::data_params_attribute().is_match(raw)
                    {
                        if let Some(subtree_end) = closing_tag_end(&lower, end, &name) {
                            let inner_end = lower[..subtree_end].rfind("</button").unwrap_or(end);
                            let inner = simplify_html(&html[end..inner_end], options);
                            builder.push(at..subtree_end, inner.text.trim(), FragmentKind::Highlight);
                            at = subtree_end;
                            continue;
                        }
                    }

                    if !closing {
                        let subtree_end = if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                            Some(closing_tag_end(&lower, end, &name).unwrap_or(html.len()))
                        } else if options.remove_links
                            && name == "a"
                            && CommonPatterns::href_attribute().is_match(raw)
                        {
                            closing_tag_end(&lower, end, &name)
                        } else {
                            None
                        };

                        if let Some(subtree_end) = subtree_end {
                            builder.push(at..subtree_end, "", FragmentKind::Removed);
                            at = subtree_end;
                            continue;
                        }
                    }

                    if is_block_element(&name) {
                        builder.push_break(at);
                    }
                    let info = TagInfo {
                        self_closing: !closing && raw.ends_with("/>"),
                        name,
                        closing,
                        raw: raw.to_string(),
                    };
                    builder.push(at..end, "", FragmentKind::Tag(info));
                    at = end;
                    continue;
                }
            }
        }

        if rest.starts_with('&') {
            if let Some((len, decoded)) = entity_at(html, at) {
                if decoded.is_whitespace() {
                    builder.push_whitespace(at..at + len);
                } else {
                    let mut buffer = [0; 4];
                    builder.push(at..at + len, decoded.encode_utf8(&mut buffer), FragmentKind::Replaced);
                }
                at += len;
                continue;
            }
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        if c.is_whitespace() {
            let run = rest.len() - rest.trim_start_matches(char::is_whitespace).len();
            builder.push_whitespace(at..at + run);
            at += run;
        } else {
            // Plain text up to the next markup, entity or whitespace
            let run = rest
                .char_indices()
                .skip(1)
                .find(|(_, c)| matches!(c, '<' | '&') || c.is_whitespace())
                .map_or(rest.len(), |(index, _)| index);
            builder.push_text(at..at + run, &rest[..run]);
            at += run;
        }
    }

    builder.finish()
}
