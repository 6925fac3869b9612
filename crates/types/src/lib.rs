//! Shared data transfer objects for the Burwood Portal REST API.
//!
//! Every struct here mirrors the JSON shape the portal sends and accepts.
//! Field names on the wire are lowercase concatenations (`groupname`,
//! `projectid`, ...), so each field carries an explicit `rename`.
//!
//! The portal omits empty collections or sends them as `null`, and leaves
//! out fields it has no value for. All types therefore default missing
//! fields instead of failing to decode.

use serde::{Deserialize, Deserializer, Serialize};

/// A top-level portal group. Groups own departments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    #[serde(rename = "groupname")]
    pub group_name: String,
    #[serde(rename = "groupid")]
    pub group_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub departments: Vec<Department>,
}

/// A department inside a group. Departments own projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Department {
    #[serde(rename = "departmentname")]
    pub department_name: String,
    #[serde(rename = "departmentid")]
    pub department_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
}

/// A GCP project as tracked by the portal.
///
/// Inside the group hierarchy only `project_id` is meaningful; the full
/// record is returned by the project endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(rename = "projectid")]
    pub project_id: String,
    #[serde(rename = "projectname")]
    pub project_name: String,
    #[serde(rename = "primarycontactemail")]
    pub primary_contact_email: String,
    #[serde(rename = "billingcontactemail")]
    pub billing_contact_email: String,
    /// Post-credit billing policy, `"Bill"` or `"Suspend"`.
    #[serde(rename = "aftercredits")]
    pub after_credits: String,
    #[serde(rename = "aftercreditsaccount")]
    pub after_credits_account: String,
    #[serde(rename = "aftercreditspo")]
    pub after_credits_po: String,
    #[serde(rename = "paidbillingaccount")]
    pub paid_billing_account: String,
    /// String-encoded currency amount computed by the portal.
    #[serde(rename = "totalbudget")]
    pub total_budget: String,
    #[serde(rename = "recurringbudget")]
    pub recurring_budget: bool,
    #[serde(rename = "departmentid")]
    pub department_id: String,
    #[serde(rename = "departmentname")]
    pub department_name: String,
}

impl Project {
    /// A hierarchy entry that only references a project by id.
    pub fn reference(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }
}

/// A budget grant ("allowance") attached to a project or account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allowance {
    #[serde(rename = "ponumber")]
    pub po_number: String,
    pub grant: String,
    pub amount: i64,
    #[serde(rename = "billingaccountid")]
    pub billing_account_id: String,
    #[serde(rename = "expirationdate")]
    pub expiration_date: String,
    #[serde(rename = "datesuspended")]
    pub date_suspended: String,
    #[serde(rename = "dateactivated")]
    pub date_activated: String,
    #[serde(rename = "dateissued")]
    pub date_issued: String,
    /// `"Active"` or `"Future"`.
    pub state: String,
    pub recurring: bool,
    #[serde(rename = "actualspend")]
    pub actual_spend: f64,
}

/// Body returned by `POST /token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Deserialize `null` as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
