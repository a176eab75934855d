//! Billmark - fiscal parameter highlighting for legislative bills
//!
//! Annotates the HTML of a bill so that every numeric value matching a
//! fiscal parameter cited by the surrounding legal reference becomes an
//! interactive highlight carrying the variables that depend on it.
//!
//! # Architecture
//!
//! - **Parameters**: the parameter tree, units, and values in force at a date
//! - **Text forms**: digit and French word renderings of a value
//! - **References**: legal identifier → parameters index, rename resolution
//! - **Simplify**: HTML → plain text with a byte-level transformation record
//! - **Highlight**: literal matching, coordinate remapping, injection
//! - **Pipeline**: process-wide context and the per-bill entry point
//!
//! # Example
//!
//! ```ignore
//! use billmark_core::{annotate_bill, AnnotationContext, BillmarkConfig, NoRenames};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BillmarkConfig::load(Some("billmark.toml".as_ref()))?;
//!     let context = AnnotationContext::load(&config)?;
//!     let date = config.bill_date("PRJLANR5L17B0324")?;
//!
//!     let raw = std::fs::read_to_string("bill.html")?;
//!     let bill = annotate_bill(&context, &raw, date, &NoRenames, &config.highlight).await?;
//!     println!("{}", bill.html);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod highlight;
pub mod links;
pub mod parameters;
pub mod patterns;
pub mod payload;
pub mod pipeline;
pub mod references;
pub mod simplify;
pub mod text_forms;
pub mod variables;

pub use config::BillmarkConfig;
pub use error::{BillmarkError, Result};
pub use highlight::{
    DocumentHighlighter, HighlightAnnotation, HighlightInjector, HighlightSettings, Interval,
    MappedInterval, RemapCursor, RemapError,
};
pub use parameters::{Parameter, ParameterTree, UnitTable, UnitValue};
pub use pipeline::{annotate_bill, AnnotatedBill, AnnotationContext};
pub use references::{
    resolve_current_identifiers, NoRenames, ReferenceIndex, RenameLookup, VersionTable,
};
pub use simplify::{simplify_html, SimplifiedHtml, SimplifyOptions, TransformationRecord};
pub use text_forms::text_forms;
pub use variables::VariableIndex;
