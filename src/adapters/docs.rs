//! Google Docs API v1 client, scoped to batch text replacement.

use crate::adapters::auth::TokenProvider;
use crate::domain::ports::TextReplacer;
use crate::utils::error::{InvoiceError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://docs.googleapis.com/v1";

/// Client for the Docs v1 REST API.
pub struct GoogleDocsClient<A: TokenProvider> {
    base_url: String,
    client: Client,
    auth: A,
}

impl<A: TokenProvider> GoogleDocsClient<A> {
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

/// Build one `replaceAllText` request per substitution. `containsText` does
/// literal matching, so replacement values carrying delimiter or regex
/// characters need no escaping.
pub(crate) fn build_requests(substitutions: &[(String, String)]) -> serde_json::Value {
    let requests: Vec<serde_json::Value> = substitutions
        .iter()
        .map(|(search, replace)| {
            json!({
                "replaceAllText": {
                    "containsText": {
                        "text": search,
                        "matchCase": true,
                    },
                    "replaceText": replace,
                }
            })
        })
        .collect();
    json!({ "requests": requests })
}

#[async_trait]
impl<A: TokenProvider> TextReplacer for GoogleDocsClient<A> {
    async fn replace_text(
        &self,
        document_id: &str,
        substitutions: &[(String, String)],
    ) -> Result<()> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/documents/{}:batchUpdate", self.base_url, document_id);
        let body = build_requests(substitutions);

        debug!(
            url = %url,
            count = substitutions.len(),
            "issuing batch text replacement"
        );

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
                service: "docs".to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requests_shape() {
        let subs = vec![
            ("{{Customer_Name}}".to_string(), "Alice".to_string()),
            ("{{Total_Amount}}".to_string(), "12.75".to_string()),
        ];

        let body = build_requests(&subs);
        let requests = body["requests"].as_array().unwrap();

        assert_eq!(requests.len(), 2);
        let first = &requests[0]["replaceAllText"];
        assert_eq!(first["containsText"]["text"], "{{Customer_Name}}");
        assert_eq!(first["containsText"]["matchCase"], true);
        assert_eq!(first["replaceText"], "Alice");
    }

    #[test]
    fn test_build_requests_values_stay_literal() {
        let subs = vec![(
            "{{Items}}".to_string(),
            "line with {{braces}} and $1 regex refs".to_string(),
        )];

        let body = build_requests(&subs);
        assert_eq!(
            body["requests"][0]["replaceAllText"]["replaceText"],
            "line with {{braces}} and $1 regex refs"
        );
    }
}
