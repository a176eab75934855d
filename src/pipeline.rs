//! Bill annotation pipeline
//!
//! [`AnnotationContext`] holds the data loaded once per process and shared
//! read-only between documents. [`annotate_bill`] runs the per-document
//! steps: rename resolution, link rewriting, then highlighting.

use crate::config::BillmarkConfig;
use crate::error::Result;
use crate::highlight::{DocumentHighlighter, HighlightSettings};
use crate::links::rewrite_reference_links;
use crate::parameters::{ParameterTree, UnitTable};
use crate::references::{resolve_current_identifiers, ReferenceIndex, RenameLookup};
use crate::variables::VariableIndex;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

/// Process-wide immutable data
#[derive(Debug)]
pub struct AnnotationContext {
    pub tree: ParameterTree,
    pub units: UnitTable,
    pub variables: VariableIndex,
    pub index: ReferenceIndex,
}

impl AnnotationContext {
    /// Build the context, indexing the references of `tree`
    pub fn new(tree: ParameterTree, units: UnitTable, variables: VariableIndex) -> Self {
        let index = ReferenceIndex::build(tree.root());
        Self {
            tree,
            units,
            variables,
            index,
        }
    }

    /// Load every data file named by the configuration
    pub fn load(config: &BillmarkConfig) -> Result<Arc<Self>> {
        let data = &config.data;
        let tree = ParameterTree::load(&data.parameters)?;
        let units = UnitTable::load(&data.units)?;
        let variables = VariableIndex::load(&data.variables, data.customizations.as_deref())?;

        let context = Self::new(tree, units, variables);
        info!(
            "Annotation context ready: {} legal identifiers indexed",
            context.index.len()
        );
        Ok(Arc::new(context))
    }
}

/// An annotated bill and the index it was annotated with
#[derive(Debug, Clone)]
pub struct AnnotatedBill {
    pub html: String,
    /// Parameters per identifier, with identifiers current at the bill date
    pub index: ReferenceIndex,
}

/// Annotate a raw bill at `date`
pub async fn annotate_bill(
    context: &AnnotationContext,
    raw_html: &str,
    date: NaiveDate,
    lookup: &dyn RenameLookup,
    settings: &HighlightSettings,
) -> Result<AnnotatedBill> {
    let index = resolve_current_identifiers(&context.index, lookup, date).await;
    debug!("{} identifiers current at {}", index.len(), date);

    let with_links = rewrite_reference_links(raw_html, &index, settings);
    let html = DocumentHighlighter::new(&index, &context.units, &context.variables, date)
        .with_settings(settings.clone())
        .highlight(&with_links)?;

    Ok(AnnotatedBill { html, index })
}
