//! Request plans for dry runs.
//!
//! A plan lists the calls an operation would make, in order, without
//! touching the network. Local validation still runs, so a plan fails
//! exactly where the real operation would fail before its first request.

use burwood_api::{GROUP_HIERARCHY_ENDPOINT, PROJECT_SCOPE, add_budget_endpoint, project_endpoint};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::ProviderError;
use crate::manifest::Manifest;
use crate::resources::{HierarchyConfig, ProjectConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

impl PlannedCall {
    fn post(endpoint: String, body: &impl Serialize) -> Result<Self, ProviderError> {
        Ok(Self {
            method: Method::POST,
            endpoint,
            body: Some(serde_json::to_value(body)?),
        })
    }
}

/// Calls made by a project create or update.
pub fn plan_project(config: &ProjectConfig) -> Result<Vec<PlannedCall>, ProviderError> {
    let budget = config.budget_to_add()?;
    let mut calls = vec![PlannedCall::post(project_endpoint(&config.project_id), &config.to_project())?];
    if let Some(allowance) = budget {
        calls.push(PlannedCall::post(
            add_budget_endpoint(PROJECT_SCOPE, &config.project_id),
            &allowance,
        )?);
    }
    Ok(calls)
}

/// Calls made by a hierarchy apply.
pub fn plan_hierarchy(config: &HierarchyConfig) -> Result<Vec<PlannedCall>, ProviderError> {
    Ok(vec![PlannedCall::post(GROUP_HIERARCHY_ENDPOINT.to_string(), &config.to_groups())?])
}

/// Calls made by applying a whole manifest: hierarchy first, then projects.
pub fn plan_manifest(manifest: &Manifest) -> Result<Vec<PlannedCall>, ProviderError> {
    let mut calls = Vec::new();
    if let Some(hierarchy) = &manifest.hierarchy {
        calls.extend(plan_hierarchy(hierarchy)?);
    }
    for project in &manifest.projects {
        calls.extend(plan_project(project)?);
    }
    Ok(calls)
}
