//! Typed wrappers over the portal's REST endpoints.

use burwood_types::{Allowance, Group, Project};
use burwood_util::http::encode_path_segment;
use tracing::debug;

use crate::{PortalClient, PortalError};

/// Whole group → department → project tree.
pub const GROUP_HIERARCHY_ENDPOINT: &str = "api/group_hierarchy";
/// Budget scope for project-level allowances.
pub const PROJECT_SCOPE: &str = "project";

/// `api/project/{id}`
pub fn project_endpoint(project_id: &str) -> String {
    format!("api/project/{}", encode_path_segment(project_id))
}

/// `api/project/{id}/budgets`
pub fn project_budgets_endpoint(project_id: &str) -> String {
    format!("{}/budgets", project_endpoint(project_id))
}

/// `api/{scope}/{id}/add_budget`
pub fn add_budget_endpoint(scope: &str, entity_id: &str) -> String {
    format!(
        "api/{}/{}/add_budget",
        encode_path_segment(scope),
        encode_path_segment(entity_id)
    )
}

impl PortalClient {
    /// Read the full group hierarchy.
    pub async fn group_hierarchy(&self) -> Result<Vec<Group>, PortalError> {
        self.fetch_list(GROUP_HIERARCHY_ENDPOINT).await
    }

    /// Replace the group hierarchy and return the portal's resulting view.
    pub async fn replace_group_hierarchy(&self, groups: &[Group]) -> Result<Vec<Group>, PortalError> {
        debug!(group_count = groups.len(), "posting group hierarchy");
        self.submit(GROUP_HIERARCHY_ENDPOINT, groups).await
    }

    /// Read one project.
    pub async fn project(&self, project_id: &str) -> Result<Project, PortalError> {
        self.fetch_one(&project_endpoint(project_id)).await
    }

    /// Create or update a project keyed by its `project_id`.
    pub async fn upsert_project(&self, project: &Project) -> Result<Project, PortalError> {
        self.submit(&project_endpoint(&project.project_id), project).await
    }

    /// Delete a project, returning the record the portal echoes back.
    pub async fn delete_project(&self, project_id: &str) -> Result<Project, PortalError> {
        self.remove(&project_endpoint(project_id)).await
    }

    /// Every budget attached to a project, oldest first.
    pub async fn project_budgets(&self, project_id: &str) -> Result<Vec<Allowance>, PortalError> {
        self.fetch_list(&project_budgets_endpoint(project_id)).await
    }

    /// The most recently configured budget: the last element of the budget
    /// list, or `None` when the project has no budgets.
    pub async fn latest_project_budget(&self, project_id: &str) -> Result<Option<Allowance>, PortalError> {
        let mut budgets = self.project_budgets(project_id).await?;
        Ok(budgets.pop())
    }

    /// Append a budget to the entity `entity_id` within `scope`.
    pub async fn add_budget(&self, scope: &str, entity_id: &str, allowance: &Allowance) -> Result<(), PortalError> {
        debug!(scope, entity_id, amount = allowance.amount, "adding budget");
        self.submit_discarding(&add_budget_endpoint(scope, entity_id), allowance).await
    }
}
