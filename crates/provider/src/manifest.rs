//! Declarative manifests listing resource blocks.
//!
//! A manifest is a YAML (or JSON, which YAML accepts) document:
//!
//! ```yaml
//! projects:
//!   - projectid: my-gcp-project
//!     departmentid: "12"
//!     latestbudget:
//!       - amount: 500
//!         billingaccountid: 0000-AAAA
//! hierarchy:
//!   groups:
//!     - groupid: "1"
//!       departments:
//!         - departmentid: "12"
//!           projects: [{ projectid: my-gcp-project }]
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::ProviderError;
use crate::resources::{HierarchyConfig, ProjectConfig};

const TOP_LEVEL_KEYS: &[&str] = &["projects", "hierarchy"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub projects: Vec<ProjectConfig>,
    pub hierarchy: Option<HierarchyConfig>,
}

impl Manifest {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.hierarchy.is_none()
    }
}

/// Read and parse a manifest file.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest, ProviderError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|error| ProviderError::Manifest(format!("failed to read {}: {error}", path.display())))?;
    parse_manifest(&content)
}

/// Parse manifest text. Every block is checked against its schema.
pub fn parse_manifest(content: &str) -> Result<Manifest, ProviderError> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|error| ProviderError::Manifest(error.to_string()))?;
    let document: Value =
        serde_json::to_value(document).map_err(|error| ProviderError::Manifest(error.to_string()))?;

    let Value::Object(mut top_level) = document else {
        return Err(ProviderError::Manifest(
            "expected a mapping with 'projects' and/or 'hierarchy'".to_string(),
        ));
    };

    if let Some(unknown) = top_level.keys().find(|key| !TOP_LEVEL_KEYS.contains(&key.as_str())) {
        return Err(ProviderError::Manifest(format!("unknown top-level key '{unknown}'")));
    }

    let projects = match top_level.remove("projects") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(blocks)) => blocks
            .into_iter()
            .map(ProjectConfig::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ProviderError::Manifest("'projects' must be a list".to_string())),
    };

    let hierarchy = match top_level.remove("hierarchy") {
        None | Some(Value::Null) => None,
        Some(block) => Some(HierarchyConfig::from_value(block)?),
    };

    Ok(Manifest { projects, hierarchy })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
projects:
  - projectid: my-gcp-project
    departmentid: "12"
    latestbudget:
      - amount: 500
        billingaccountid: 0000-AAAA
hierarchy:
  groups:
    - groupid: "1"
      departments:
        - departmentid: "12"
          projects: [{ projectid: my-gcp-project }]
"#;

    #[test]
    fn parses_projects_and_hierarchy() {
        let manifest = parse_manifest(SAMPLE).expect("manifest");
        assert_eq!(manifest.projects.len(), 1);
        assert_eq!(manifest.projects[0].latest_budget[0].amount, 500);
        let hierarchy = manifest.hierarchy.expect("hierarchy");
        assert_eq!(hierarchy.groups[0].departments[0].projects[0].project_id, "my-gcp-project");
    }

    #[test]
    fn json_documents_are_accepted() {
        let manifest = parse_manifest(r#"{"projects": [{"projectid": "p-1", "departmentid": "12"}]}"#).expect("json");
        assert_eq!(manifest.projects[0].project_id, "p-1");
        assert!(manifest.hierarchy.is_none());
    }

    #[test]
    fn missing_required_attributes_are_reported_per_block() {
        let error = parse_manifest("projects:\n  - projectname: orphan\n").expect_err("missing ids");
        assert_eq!(
            error.to_string(),
            "burwoodportal_projects: missing required attributes: projectid, departmentid"
        );
    }

    #[test]
    fn unknown_top_level_keys_are_rejected() {
        let error = parse_manifest("budgets: []\n").expect_err("unknown key");
        assert!(error.to_string().contains("unknown top-level key 'budgets'"));
    }

    #[test]
    fn empty_document_sections_are_empty() {
        let manifest = parse_manifest("projects: null\n").expect("manifest");
        assert!(manifest.is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("portal.yaml");
        fs::write(&path, SAMPLE).expect("write");
        let manifest = load_manifest(&path).expect("load");
        assert_eq!(manifest.projects[0].department_id, "12");

        let missing = load_manifest(dir.path().join("absent.yaml")).expect_err("absent");
        assert!(matches!(missing, ProviderError::Manifest(_)));
    }
}
