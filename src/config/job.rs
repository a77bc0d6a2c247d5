use crate::utils::error::{InvoiceError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Job configuration loaded from a TOML file. `${VAR}` references are
/// substituted from the process environment before parsing, which is how the
/// service-account credential path is normally supplied
/// (`credentials_path = "${GCP_CLIENT_SECRET}"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub source: SourceConfig,
    pub template: TemplateConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub spreadsheet_id: String,
    #[serde(default = "default_meta_range")]
    pub meta_range: String,
    #[serde(default = "default_contents_range")]
    pub contents_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub document_id: String,
    pub folder_id: String,
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub credentials_path: String,
}

/// What to do with content rows whose package number has no metadata row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedContentPolicy {
    /// Produce a best-effort invoice with blank customer fields.
    #[default]
    Degrade,
    /// Record the package as failed with a data error.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub unmatched_content: UnmatchedContentPolicy,
    /// When false, the first failed package aborts the remaining groups.
    #[serde(default = "default_true")]
    pub continue_on_error: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            unmatched_content: UnmatchedContentPolicy::default(),
            continue_on_error: true,
        }
    }
}

/// Base-URL overrides for the three Google APIs. Production runs leave these
/// unset; tests point them at local mock servers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub sheets_url: Option<String>,
    pub drive_url: Option<String>,
    pub docs_url: Option<String>,
    pub token_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
}

fn default_meta_range() -> String {
    "Package_Meta".to_string()
}

fn default_contents_range() -> String {
    "Package_Contents".to_string()
}

fn default_name_prefix() -> String {
    "Invoice_".to_string()
}

fn default_true() -> bool {
    true
}

impl JobConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InvoiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| InvoiceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute `${VAR_NAME}` references from the environment. Unknown
    /// variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl Validate for JobConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("source.spreadsheet_id", &self.source.spreadsheet_id)?;
        validation::validate_non_empty_string("source.meta_range", &self.source.meta_range)?;
        validation::validate_non_empty_string("source.contents_range", &self.source.contents_range)?;
        validation::validate_non_empty_string("template.document_id", &self.template.document_id)?;
        validation::validate_non_empty_string("template.folder_id", &self.template.folder_id)?;
        validation::validate_path("auth.credentials_path", &self.auth.credentials_path)?;

        if self.auth.credentials_path.starts_with("${") {
            return Err(InvoiceError::MissingConfigError {
                field: "auth.credentials_path (environment variable not set)".to_string(),
            });
        }

        if let Some(url) = &self.endpoints.sheets_url {
            validation::validate_url("endpoints.sheets_url", url)?;
        }
        if let Some(url) = &self.endpoints.drive_url {
            validation::validate_url("endpoints.drive_url", url)?;
        }
        if let Some(url) = &self.endpoints.docs_url {
            validation::validate_url("endpoints.docs_url", url)?;
        }
        if let Some(url) = &self.endpoints.token_url {
            validation::validate_url("endpoints.token_url", url)?;
        }

        Ok(())
    }
}
