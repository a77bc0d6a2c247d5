//! Google Drive API v3 client, scoped to copying the template document.

use crate::adapters::auth::TokenProvider;
use crate::domain::ports::DocumentCopier;
use crate::utils::error::{InvoiceError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Deserialize)]
struct CopiedFile {
    id: String,
}

/// Client for the Drive v3 REST API.
pub struct GoogleDriveClient<A: TokenProvider> {
    base_url: String,
    client: Client,
    auth: A,
}

impl<A: TokenProvider> GoogleDriveClient<A> {
    pub fn new(auth: A) -> Self {
        Self::with_base_url(auth, DEFAULT_BASE_URL)
    }

    /// Point the client at a custom base URL (useful for testing).
    pub fn with_base_url(auth: A, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl<A: TokenProvider> DocumentCopier for GoogleDriveClient<A> {
    async fn copy_document(
        &self,
        template_id: &str,
        name: &str,
        folder_id: &str,
    ) -> Result<String> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files/{}/copy", self.base_url, template_id);
        let body = json!({
            "name": name,
            "parents": [folder_id],
        });

        debug!(url = %url, name = %name, "copying template document");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InvoiceError::RemoteApiError {
                service: "drive".to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let copied: CopiedFile = response.json().await?;
        Ok(copied.id)
    }
}
