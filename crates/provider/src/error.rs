//! Error types for provider configuration and resource operations.

use burwood_api::PortalError;
use thiserror::Error;

/// Failure of a resource, data source or configuration step.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A portal call failed. `context` names the operation.
    #[error("{context}: {source}")]
    Portal {
        context: String,
        #[source]
        source: PortalError,
    },

    /// Credentials were supplied but the portal refused them.
    #[error("unable to authenticate user for authenticated Burwood client: {0}")]
    Authentication(#[source] PortalError),

    /// The `latestbudget` block may hold at most one budget.
    #[error("can't specify multiple budgets: latestbudget has {count} entries")]
    MultipleBudgets { count: usize },

    /// Required attributes are absent from a configuration block.
    #[error("{block}: missing required attributes: {}", .names.join(", "))]
    MissingAttributes { block: String, names: Vec<String> },

    /// Attributes are present but unusable (wrong kind, unknown, computed).
    #[error("{block}: {}", .problems.join("; "))]
    InvalidAttributes { block: String, problems: Vec<String> },

    /// A manifest could not be read or parsed.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Config file I/O failure.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file (de)serialization failure.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    pub(crate) fn portal(context: impl Into<String>, source: PortalError) -> Self {
        Self::Portal {
            context: context.into(),
            source,
        }
    }

    /// The underlying portal error, when the failure came from the API.
    pub fn portal_error(&self) -> Option<&PortalError> {
        match self {
            Self::Portal { source, .. } | Self::Authentication(source) => Some(source),
            _ => None,
        }
    }
}
