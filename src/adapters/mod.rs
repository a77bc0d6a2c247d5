// Adapters layer: concrete implementations for the external Google APIs.

pub mod auth;
pub mod docs;
pub mod drive;
pub mod sheets;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, StaticTokenProvider, TokenProvider};
pub use docs::GoogleDocsClient;
pub use drive::GoogleDriveClient;
pub use sheets::GoogleSheetsClient;
