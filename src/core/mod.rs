pub mod engine;
pub mod invoice;
pub mod merge;
pub mod pipeline;

pub use crate::domain::model::{InvoiceGroup, MergedRow, RunReport, SheetTable};
pub use crate::domain::ports::{
    DocumentCopier, Pipeline, TableFetcher, TextReplacer, TransformOutcome,
};
pub use crate::utils::error::Result;
