//! Rewriting of external legal links into internal reference links
//!
//! Bills arrive with links to the legal text repository. They are turned
//! into the internal form scanned by the document highlighter:
//!
//! ```text
//! <a class='law-article-link' href='{link_base}?article=ID'><law-link-text>TEXT</law-link-text></a>
//! ```

use crate::highlight::HighlightSettings;
use crate::patterns::CommonPatterns;
use crate::references::ReferenceIndex;
use regex::Captures;

/// Rewrites external legal links of a raw bill
#[derive(Debug, Clone, Copy)]
pub struct LinkRewriter<'a> {
    index: &'a ReferenceIndex,
    settings: &'a HighlightSettings,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(index: &'a ReferenceIndex, settings: &'a HighlightSettings) -> Self {
        Self { index, settings }
    }

    /// Title listing the labels of the parameters citing `identifier`
    fn title(&self, identifier: &str) -> Option<String> {
        if !self.settings.show_parameter_labels {
            return None;
        }
        let parameters = self.index.get(identifier)?;
        let labels: Vec<String> = parameters
            .iter()
            .map(|parameter| {
                let metadata = parameter.metadata();
                metadata
                    .short_label
                    .as_deref()
                    .unwrap_or(&metadata.name)
                    .replace('\'', " ")
            })
            .collect();
        Some(labels.join("|"))
    }

    fn rewrite_link(&self, captures: &Captures) -> String {
        let identifier = captures[1].strip_suffix(".md").unwrap_or(&captures[1]);
        let text = &captures[2];
        let href = format!("{}?article={}", self.settings.link_base, identifier);

        match self.title(identifier) {
            Some(title) => format!(
                "<a title='{}' class='law-article-link' href='{}'><law-link-text>{}</law-link-text>*</a>",
                title, href, text
            ),
            None => format!(
                "<a class='law-article-link' href='{}'><law-link-text>{}</law-link-text></a>",
                href, text
            ),
        }
    }

    pub fn rewrite(&self, html: &str) -> String {
        CommonPatterns::external_legal_link()
            .replace_all(html, |captures: &Captures| self.rewrite_link(captures))
            .into_owned()
    }
}

/// Rewrite every external legal link of `html`
pub fn rewrite_reference_links(
    html: &str,
    index: &ReferenceIndex,
    settings: &HighlightSettings,
) -> String {
    LinkRewriter::new(index, settings).rewrite(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterTree;

    fn index() -> ReferenceIndex {
        let tree = ParameterTree::from_json(
            r#"{"class": "Node", "children": {
                "seuil": {"class": "Value", "short_label": "Seuil d'exonération",
                    "reference": {"2024-01-01": [{"href": "LEGIARTI000012345678"}]}, "values": {}},
                "taux": {"class": "Value",
                    "reference": {"2024-01-01": [{"href": "LEGIARTI000012345678"}]}, "values": {}}
            }}"#,
        )
        .unwrap();
        ReferenceIndex::build(tree.root())
    }

    const RAW: &str = r#"voir <a class="lien_article_externe" href="https://git.tricoteuses.fr/legifrance/articles/LEGIARTI000012345678.md" target="_blank">l'article 1</a>."#;

    #[test]
    fn test_rewrite_plain() {
        let settings = HighlightSettings::default().with_link_base("/pjl/PRJLANR5L17B0324");
        let output = rewrite_reference_links(RAW, &index(), &settings);
        assert_eq!(
            output,
            "voir <a class='law-article-link' href='/pjl/PRJLANR5L17B0324?article=LEGIARTI000012345678'><law-link-text>l'article 1</law-link-text></a>."
        );
    }

    #[test]
    fn test_rewrite_with_labels() {
        let settings = HighlightSettings::default()
            .with_link_base("/pjl/x")
            .with_parameter_labels(true);
        let output = rewrite_reference_links(RAW, &index(), &settings);
        assert!(output.starts_with("voir <a title='Seuil d exonération|taux' class='law-article-link'"));
        assert!(output.ends_with("</law-link-text>*</a>."));
    }

    #[test]
    fn test_rewritten_links_are_scanned() {
        let settings = HighlightSettings::default().with_link_base("/pjl/x");
        let output = rewrite_reference_links(RAW, &index(), &settings);
        let captures = CommonPatterns::reference_link().captures(&output).unwrap();
        assert_eq!(&captures[1], "LEGIARTI000012345678");
    }
}
