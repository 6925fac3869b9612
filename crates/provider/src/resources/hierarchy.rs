//! `burwoodportal_group_hierarchy` resource.
//!
//! The portal endpoint is a nesting doll: groups hold departments, which hold
//! project references. The whole tree is posted at once.

use burwood_api::PortalClient;
use burwood_types::{Department, Group, Project};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::schema::GROUP_HIERARCHY_SCHEMA;
use crate::{ProviderError, timestamp_id};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HierarchyConfig {
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    #[serde(rename = "groupid", default)]
    pub group_id: String,
    #[serde(default)]
    pub departments: Vec<DepartmentConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepartmentConfig {
    #[serde(rename = "departmentid", default)]
    pub department_id: String,
    #[serde(default)]
    pub projects: Vec<ProjectRefConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRefConfig {
    #[serde(rename = "projectid")]
    pub project_id: String,
}

impl HierarchyConfig {
    /// Validate a raw configuration block against the schema and decode it.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        GROUP_HIERARCHY_SCHEMA.validate(&value)?;
        serde_json::from_value(value).map_err(|error| ProviderError::InvalidAttributes {
            block: GROUP_HIERARCHY_SCHEMA.name.to_string(),
            problems: vec![error.to_string()],
        })
    }

    /// Request body for `POST /api/group_hierarchy`, order preserved.
    pub fn to_groups(&self) -> Vec<Group> {
        self.groups
            .iter()
            .map(|group| Group {
                group_name: String::new(),
                group_id: group.group_id.clone(),
                departments: group
                    .departments
                    .iter()
                    .map(|department| Department {
                        department_name: String::new(),
                        department_id: department.department_id.clone(),
                        projects: department
                            .projects
                            .iter()
                            .map(|project| Project::reference(project.project_id.clone()))
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// The hierarchy as last seen, keyed by a timestamp id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyState {
    /// Unix timestamp of the operation. Changes on every call so the
    /// resource is always re-applied.
    pub id: String,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Copy)]
pub struct GroupHierarchyResource<'a> {
    client: &'a PortalClient,
}

impl<'a> GroupHierarchyResource<'a> {
    pub const TYPE_NAME: &'static str = "burwoodportal_group_hierarchy";

    pub fn new(client: &'a PortalClient) -> Self {
        Self { client }
    }

    /// Post the configured tree; create and update are the same call.
    pub async fn apply(&self, config: &HierarchyConfig) -> Result<HierarchyState, ProviderError> {
        let groups = config.to_groups();
        let result = self
            .client
            .replace_group_hierarchy(&groups)
            .await
            .map_err(|error| ProviderError::portal("error posting group hierarchy", error))?;
        info!(group_count = groups.len(), "group hierarchy applied");

        Ok(HierarchyState {
            id: timestamp_id(),
            groups: result,
        })
    }

    pub async fn read(&self) -> Result<HierarchyState, ProviderError> {
        let groups = self
            .client
            .group_hierarchy()
            .await
            .map_err(|error| ProviderError::portal("error retrieving groups", error))?;

        Ok(HierarchyState {
            id: timestamp_id(),
            groups,
        })
    }

    /// The portal has no delete for the hierarchy; nothing is sent.
    pub fn delete(&self) {
        info!("group hierarchy delete is a no-op");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_blocks_become_dtos_in_order() {
        let config = HierarchyConfig::from_value(json!({
            "groups": [
                {
                    "groupid": "1",
                    "departments": [
                        { "departmentid": "12", "projects": [{ "projectid": "p-1" }, { "projectid": "p-2" }] },
                        { "departmentid": "13" }
                    ]
                },
                { "groupid": "2" }
            ]
        }))
        .expect("config");

        let groups = config.to_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, "1");
        assert_eq!(groups[0].departments[0].department_id, "12");
        let ids: Vec<_> = groups[0].departments[0]
            .projects
            .iter()
            .map(|project| project.project_id.as_str())
            .collect();
        assert_eq!(ids, ["p-1", "p-2"]);
        assert!(groups[0].departments[1].projects.is_empty());
        assert!(groups[1].departments.is_empty());
    }

    #[test]
    fn groups_are_required() {
        let error = HierarchyConfig::from_value(json!({})).expect_err("no groups");
        assert!(matches!(error, ProviderError::MissingAttributes { .. }));
    }
}
