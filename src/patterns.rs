//! Common regex patterns
//!
//! Pre-compiled patterns shared by the indexer, the link rewriter and the
//! document highlighter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Common patterns used across modules
pub struct CommonPatterns;

impl CommonPatterns {
    /// Legal text identifiers: LEGIARTI, JORFARTI, LEGITEXT, JORFTEXT followed by digits
    pub fn legal_identifier() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?:LEGIARTI|JORFARTI|LEGITEXT|JORFTEXT)\d+")
                .expect("Valid legal identifier regex")
        });
        &PATTERN
    }

    /// Internal reference links: `<a ... href='...article=ID...'>...</a>`
    ///
    /// Group 1 is the identifier. Markup is matched case-insensitively, the
    /// identifier prefix is not.
    pub fn reference_link() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?is)<a\s+[^>]*href='[^']*article=((?-i:LEGITEXT|LEGIARTI|JORFTEXT|JORFARTI)[^'&#]*)[^']*'[^>]*>.*?</a>",
            )
            .expect("Valid reference link regex")
        });
        &PATTERN
    }

    /// External legal links produced by the bill converter.
    ///
    /// Group 1 is the linked document (identifier, possibly with `.md`),
    /// group 2 the link content.
    pub fn external_legal_link() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r#"<a\s+class="lien_(?:article|division|texte)_externe"\s+href="https://(?:git\.)?tricoteuses\.fr/legifrance/(?:sections|articles|textes)/([^"]*)"[^>]*>([\s\S]*?)</a>"#,
            )
            .expect("Valid external legal link regex")
        });
        &PATTERN
    }

    /// `href` attribute inside a start tag
    pub fn href_attribute() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)\shref\s*=").expect("Valid href attribute regex")
        });
        &PATTERN
    }

    /// `data-params` attribute inside a start tag (injected highlight buttons)
    pub fn data_params_attribute() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)\sdata-params\s*=").expect("Valid data-params attribute regex")
        });
        &PATTERN
    }
}
