//! `burwoodportal_hierarchy` data source.

use burwood_api::PortalClient;
use tracing::debug;

use crate::resources::HierarchyState;
use crate::{ProviderError, timestamp_id};

/// Read-only view of the group hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyDataSource<'a> {
    client: &'a PortalClient,
}

impl<'a> HierarchyDataSource<'a> {
    pub const TYPE_NAME: &'static str = "burwoodportal_hierarchy";

    pub fn new(client: &'a PortalClient) -> Self {
        Self { client }
    }

    pub async fn read(&self) -> Result<HierarchyState, ProviderError> {
        let groups = self
            .client
            .group_hierarchy()
            .await
            .map_err(|error| ProviderError::portal("error retrieving groups", error))?;
        debug!(group_count = groups.len(), "hierarchy data source read");

        Ok(HierarchyState {
            id: timestamp_id(),
            groups,
        })
    }
}
