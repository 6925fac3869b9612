//! Burwood Portal resources and data sources.
//!
//! This crate translates declarative configuration blocks into portal
//! requests and portal responses back into resource state. It provides:
//!
//! - [`config`]: host and credential resolution
//! - [`schema`]: attribute tables used for validation and documentation
//! - [`resources`]: the project and group hierarchy resources
//! - [`data_source`]: the read-only hierarchy data source
//! - [`manifest`]: YAML/JSON manifests of resource blocks
//! - [`plan`]: request plans for dry runs
//!
//! Start from [`Provider::configure`], then reach resources through the
//! provider.

pub mod config;
pub mod data_source;
mod error;
pub mod manifest;
pub mod plan;
pub mod resources;
pub mod schema;

use burwood_api::PortalClient;
use chrono::Utc;
use tracing::{debug, warn};

pub use config::ProviderConfig;
pub use data_source::HierarchyDataSource;
pub use error::ProviderError;
pub use manifest::{Manifest, load_manifest, parse_manifest};
pub use resources::{GroupHierarchyResource, HierarchyState, ProjectResource, ProjectState};

/// Resource type names served by the provider.
pub const RESOURCE_TYPES: &[&str] = &[ProjectResource::TYPE_NAME, GroupHierarchyResource::TYPE_NAME];
/// Data source type names served by the provider.
pub const DATA_SOURCE_TYPES: &[&str] = &[HierarchyDataSource::TYPE_NAME];

/// A configured portal client plus access to every resource.
#[derive(Debug, Clone)]
pub struct Provider {
    client: PortalClient,
}

impl Provider {
    /// Build the portal client from configuration.
    ///
    /// With both username and password present the client signs in and
    /// fails if the portal refuses. Otherwise an anonymous client is built.
    pub async fn configure(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let host = config.host();
        let credentials = config.credentials();

        let client = if credentials.is_complete() {
            PortalClient::connect(host, &credentials)
                .await
                .map_err(ProviderError::Authentication)?
        } else {
            warn!(host, "portal credentials not configured; using anonymous client");
            PortalClient::anonymous(host).map_err(|error| ProviderError::portal("unable to create anonymous Burwood client", error))?
        };
        debug!(?client, "provider configured");

        Ok(Self { client })
    }

    pub fn from_client(client: PortalClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    pub fn projects(&self) -> ProjectResource<'_> {
        ProjectResource::new(&self.client)
    }

    pub fn group_hierarchy(&self) -> GroupHierarchyResource<'_> {
        GroupHierarchyResource::new(&self.client)
    }

    pub fn hierarchy_data_source(&self) -> HierarchyDataSource<'_> {
        HierarchyDataSource::new(&self.client)
    }

    /// Apply a manifest: the hierarchy first, then each project in order.
    ///
    /// Every project block is validated before the first request, so a
    /// manifest with an invalid block sends nothing.
    pub async fn apply_manifest(&self, manifest: &Manifest) -> Result<AppliedManifest, ProviderError> {
        for project in &manifest.projects {
            project.budget_to_add()?;
        }

        let hierarchy = match &manifest.hierarchy {
            Some(config) => Some(self.group_hierarchy().apply(config).await?),
            None => None,
        };

        let mut projects = Vec::with_capacity(manifest.projects.len());
        for project in &manifest.projects {
            projects.push(self.projects().create_or_update(project).await?);
        }

        Ok(AppliedManifest { hierarchy, projects })
    }
}

/// Resulting state of [`Provider::apply_manifest`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AppliedManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<HierarchyState>,
    pub projects: Vec<ProjectState>,
}

/// Resource id for always-refreshed resources: the current unix time.
pub(crate) fn timestamp_id() -> String {
    Utc::now().timestamp().to_string()
}
