//! `burwoodportal_projects` resource.

use burwood_api::{PROJECT_SCOPE, PortalClient};
use burwood_types::{Allowance, Project};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ProviderError;
use crate::schema::PROJECT_SCHEMA;

pub const DEFAULT_AFTER_CREDITS: &str = "Suspend";
pub const DEFAULT_BUDGET_STATE: &str = "Future";

fn default_after_credits() -> String {
    DEFAULT_AFTER_CREDITS.to_string()
}

fn default_budget_state() -> String {
    DEFAULT_BUDGET_STATE.to_string()
}

/// Configuration block of a project resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(rename = "projectid")]
    pub project_id: String,
    #[serde(rename = "projectname", default)]
    pub project_name: String,
    #[serde(rename = "primarycontactemail", default)]
    pub primary_contact_email: String,
    #[serde(rename = "billingcontactemail", default)]
    pub billing_contact_email: String,
    #[serde(rename = "aftercredits", default = "default_after_credits")]
    pub after_credits: String,
    #[serde(rename = "aftercreditsaccount", default)]
    pub after_credits_account: String,
    #[serde(rename = "aftercreditspo", default)]
    pub after_credits_po: String,
    #[serde(rename = "paidbillingaccount", default)]
    pub paid_billing_account: String,
    #[serde(rename = "recurringbudget", default)]
    pub recurring_budget: bool,
    #[serde(rename = "departmentid")]
    pub department_id: String,
    /// Kept as a list to mirror the block syntax; at most one entry is
    /// accepted.
    #[serde(rename = "latestbudget", default)]
    pub latest_budget: Vec<BudgetConfig>,
}

/// A budget block inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    #[serde(rename = "ponumber", default)]
    pub po_number: String,
    #[serde(default)]
    pub grant: String,
    pub amount: i64,
    #[serde(rename = "billingaccountid")]
    pub billing_account_id: String,
    #[serde(rename = "expirationdate", default)]
    pub expiration_date: String,
    #[serde(default = "default_budget_state")]
    pub state: String,
    #[serde(default)]
    pub recurring: bool,
}

impl ProjectConfig {
    /// Validate a raw configuration block against the schema and decode it.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        PROJECT_SCHEMA.validate(&value)?;
        serde_json::from_value(value).map_err(|error| ProviderError::InvalidAttributes {
            block: PROJECT_SCHEMA.name.to_string(),
            problems: vec![error.to_string()],
        })
    }

    /// Request body for `POST /api/project/{id}`.
    pub fn to_project(&self) -> Project {
        Project {
            project_id: self.project_id.clone(),
            project_name: self.project_name.clone(),
            primary_contact_email: self.primary_contact_email.clone(),
            billing_contact_email: self.billing_contact_email.clone(),
            after_credits: self.after_credits.clone(),
            after_credits_account: self.after_credits_account.clone(),
            after_credits_po: self.after_credits_po.clone(),
            paid_billing_account: self.paid_billing_account.clone(),
            total_budget: String::new(),
            recurring_budget: self.recurring_budget,
            department_id: self.department_id.clone(),
            department_name: String::new(),
        }
    }

    /// The single budget to append, if any.
    ///
    /// More than one budget block is rejected: the portal has no notion of
    /// adding several budgets in one update.
    pub fn budget_to_add(&self) -> Result<Option<Allowance>, ProviderError> {
        match self.latest_budget.as_slice() {
            [] => Ok(None),
            [budget] => Ok(Some(budget.to_allowance())),
            budgets => Err(ProviderError::MultipleBudgets { count: budgets.len() }),
        }
    }
}

impl BudgetConfig {
    pub fn to_allowance(&self) -> Allowance {
        Allowance {
            po_number: self.po_number.clone(),
            grant: self.grant.clone(),
            amount: self.amount,
            billing_account_id: self.billing_account_id.clone(),
            expiration_date: self.expiration_date.clone(),
            state: self.state.clone(),
            recurring: self.recurring,
            ..Allowance::default()
        }
    }
}

/// Observed state of a project after an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectState {
    /// Resource id; the GCP project id.
    pub id: String,
    pub project: Project,
    #[serde(rename = "latestbudget")]
    pub latest_budget: Option<Allowance>,
}

impl ProjectState {
    /// The portal answered with a real record rather than an empty one.
    pub fn exists(&self) -> bool {
        !self.project.project_id.is_empty()
    }
}

/// Create, read, update and delete callbacks for projects.
#[derive(Debug, Clone, Copy)]
pub struct ProjectResource<'a> {
    client: &'a PortalClient,
}

impl<'a> ProjectResource<'a> {
    pub const TYPE_NAME: &'static str = "burwoodportal_projects";

    pub fn new(client: &'a PortalClient) -> Self {
        Self { client }
    }

    /// Post the project, then append its budget block if one is given.
    ///
    /// Local validation happens before any request. If the budget post fails
    /// the project has already been written and is left as is.
    pub async fn create_or_update(&self, config: &ProjectConfig) -> Result<ProjectState, ProviderError> {
        let budget = config.budget_to_add()?;
        let project_id = config.project_id.as_str();

        let project = self
            .client
            .upsert_project(&config.to_project())
            .await
            .map_err(|error| ProviderError::portal(format!("error creating project {project_id}"), error))?;
        info!(project_id, "project written");

        if let Some(allowance) = &budget {
            self.client
                .add_budget(PROJECT_SCOPE, project_id, allowance)
                .await
                .map_err(|error| {
                    warn!(project_id, "budget post failed after project was written");
                    ProviderError::portal(format!("error creating budget for project {project_id}"), error)
                })?;
            info!(project_id, amount = allowance.amount, "budget added");
        }

        Ok(ProjectState {
            id: project_id.to_string(),
            project,
            latest_budget: budget,
        })
    }

    /// Read a project and, when it exists, its latest budget.
    pub async fn read(&self, project_id: &str) -> Result<ProjectState, ProviderError> {
        let project = self
            .client
            .project(project_id)
            .await
            .map_err(|error| ProviderError::portal(format!("error retrieving project {project_id}"), error))?;

        let mut state = ProjectState {
            id: project_id.to_string(),
            project,
            latest_budget: None,
        };
        if !state.exists() {
            warn!(project_id, "portal returned an empty project record");
            return Ok(state);
        }

        state.latest_budget = self
            .client
            .latest_project_budget(project_id)
            .await
            .map_err(|error| ProviderError::portal(format!("error retrieving latest budget for project {project_id}"), error))?;
        Ok(state)
    }

    /// Every budget of a project, oldest first.
    pub async fn budgets(&self, project_id: &str) -> Result<Vec<Allowance>, ProviderError> {
        self.client
            .project_budgets(project_id)
            .await
            .map_err(|error| ProviderError::portal(format!("error retrieving budgets for project {project_id}"), error))
    }

    /// Delete a project and return the record the portal echoes.
    pub async fn delete(&self, project_id: &str) -> Result<Project, ProviderError> {
        let deleted = self
            .client
            .delete_project(project_id)
            .await
            .map_err(|error| ProviderError::portal(format!("error deleting project {project_id}"), error))?;
        info!(project_id, "project deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_applied() {
        let config = ProjectConfig::from_value(json!({
            "projectid": "p-1",
            "departmentid": "12",
            "latestbudget": [{ "amount": 100, "billingaccountid": "0000-AAAA" }]
        }))
        .expect("config");

        assert_eq!(config.after_credits, "Suspend");
        assert!(!config.recurring_budget);
        let budget = config.budget_to_add().expect("one budget").expect("some");
        assert_eq!(budget.state, "Future");
        assert!(!budget.recurring);
        assert_eq!(budget.amount, 100);
    }

    #[test]
    fn multiple_budgets_are_rejected() {
        let config = ProjectConfig::from_value(json!({
            "projectid": "p-1",
            "departmentid": "12",
            "latestbudget": [
                { "amount": 100, "billingaccountid": "a" },
                { "amount": 200, "billingaccountid": "b" }
            ]
        }))
        .expect("config");

        assert!(matches!(config.budget_to_add(), Err(ProviderError::MultipleBudgets { count: 2 })));
    }

    #[test]
    fn project_body_leaves_computed_fields_empty() {
        let config = ProjectConfig::from_value(json!({
            "projectid": "p-1",
            "projectname": "Genomics",
            "departmentid": "12",
            "aftercredits": "Bill",
            "recurringbudget": true
        }))
        .expect("config");

        let project = config.to_project();
        assert_eq!(project.project_name, "Genomics");
        assert_eq!(project.after_credits, "Bill");
        assert!(project.recurring_budget);
        assert!(project.total_budget.is_empty());
        assert!(project.department_name.is_empty());
    }

    #[test]
    fn empty_record_does_not_exist() {
        let state = ProjectState {
            id: "p-1".into(),
            project: Project::default(),
            latest_budget: None,
        };
        assert!(!state.exists());
    }
}
