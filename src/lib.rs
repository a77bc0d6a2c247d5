pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{
    GoogleDocsClient, GoogleDriveClient, GoogleSheetsClient, ServiceAccountAuth,
    ServiceAccountKey, StaticTokenProvider, TokenProvider,
};
pub use config::{CliArgs, JobConfig, UnmatchedContentPolicy};
pub use core::{engine::InvoiceEngine, pipeline::InvoicePipeline};
pub use domain::model::RunReport;
pub use utils::error::{InvoiceError, Result};
