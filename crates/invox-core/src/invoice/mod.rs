//! Invoice field extraction module.

mod fields;
mod pipeline;
pub mod rules;
mod table;

pub use fields::{FieldExtractor, HeaderFields};
pub use pipeline::ExtractionPipeline;
pub use rules::PatternSet;
pub use table::{LineItemTableParser, TableState};
