//! Attribute schemas for resources and data sources.
//!
//! Each resource block is described by a static [`BlockSchema`]. The tables
//! serve two purposes: checking a configuration block before any request is
//! sent, and rendering reference documentation.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ProviderError;

/// JSON kind an attribute value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Int,
    Bool,
    List,
}

impl AttributeKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::List => value.is_array(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::List => "list",
        }
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    Required,
    Optional,
    /// Set by the portal; configuration may not supply it.
    Computed,
}

impl AttributeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Computed => "computed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub mode: AttributeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    pub description: &'static str,
    /// Element schema of a `List` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<&'static BlockSchema>,
}

#[derive(Debug, Serialize)]
pub struct BlockSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub attributes: &'static [AttributeSpec],
}

const fn attr(name: &'static str, kind: AttributeKind, mode: AttributeMode, description: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        kind,
        mode,
        default: None,
        description,
        block: None,
    }
}

const fn with_default(spec: AttributeSpec, default: &'static str) -> AttributeSpec {
    AttributeSpec {
        default: Some(default),
        ..spec
    }
}

const fn list_of(name: &'static str, mode: AttributeMode, block: &'static BlockSchema, description: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        kind: AttributeKind::List,
        mode,
        default: None,
        description,
        block: Some(block),
    }
}

use AttributeKind::{Bool, Int, String as Str};
use AttributeMode::{Computed, Optional, Required};

pub const BUDGET_SCHEMA: BlockSchema = BlockSchema {
    name: "latestbudget",
    description: "Budget appended to a project.",
    attributes: &[
        attr(
            "ponumber",
            Str,
            Optional,
            "PO to use for this budget (the portal UI may call this field e.g. ChartField).",
        ),
        attr("grant", Str, Optional, "Grant to use for this budget."),
        attr("amount", Int, Required, "Dollar amount to use for the budget."),
        attr(
            "billingaccountid",
            Str,
            Required,
            "GCP billing account ID to use for consumption on this budget.",
        ),
        attr(
            "expirationdate",
            Str,
            Optional,
            "YYYY-MM-DD. Date after which the budget is marked consumed regardless of spend.",
        ),
        attr("dateissued", Str, Computed, "YYYY-MM-DD. Budget issue date, used in budget alerting emails."),
        attr(
            "dateactivated",
            Str,
            Computed,
            "Date on which the budget activated its billing account and started tracking consumption.",
        ),
        attr("datesuspended", Str, Computed, "Date on which the budget was deactivated and marked consumed."),
        with_default(
            attr(
                "state",
                Str,
                Optional,
                "'Active' or 'Future'. WARNING: 'Active' marks existing active budgets as consumed and sets the GCP project's billing account to billingaccountid.",
            ),
            "Future",
        ),
        with_default(
            attr("recurring", Bool, Optional, "Whether the budget recurs monthly."),
            "false",
        ),
    ],
};

pub const PROJECT_SCHEMA: BlockSchema = BlockSchema {
    name: "burwoodportal_projects",
    description: "A GCP project managed in the portal, optionally with a new budget.",
    attributes: &[
        attr("projectid", Str, Required, "GCP project ID."),
        attr("projectname", Str, Optional, "Project name as shown in the portal."),
        attr("primarycontactemail", Str, Optional, "The project primary contact email address."),
        attr("billingcontactemail", Str, Optional, "Primary billing contact email."),
        with_default(
            attr(
                "aftercredits",
                Str,
                Optional,
                "'Bill' or 'Suspend'. Only set to 'Bill' if post-budget free spend is desired.",
            ),
            "Suspend",
        ),
        attr(
            "aftercreditsaccount",
            Str,
            Optional,
            "GCP billing account for post-credit consumption. Only applies when aftercredits is 'Suspend'.",
        ),
        attr("aftercreditspo", Str, Optional, "Purchase order for post-credit consumption."),
        attr(
            "paidbillingaccount",
            Str,
            Optional,
            "The project GCP billing account ID. WARNING: changes the project's billing account in GCP.",
        ),
        attr("totalbudget", Str, Computed, "Total budget dollar amount on the project."),
        with_default(
            attr("recurringbudget", Bool, Optional, "Whether project budgets recur monthly."),
            "false",
        ),
        attr(
            "departmentid",
            Str,
            Required,
            "Department ID for the project. Unknown IDs place the project in 'Unaffiliated Projects'.",
        ),
        attr("departmentname", Str, Computed, "Department name that the project is under."),
        list_of(
            "latestbudget",
            Optional,
            &BUDGET_SCHEMA,
            "Most recently added budget. When given, a new budget is appended to the project.",
        ),
    ],
};

pub const HIERARCHY_PROJECT_SCHEMA: BlockSchema = BlockSchema {
    name: "projects",
    description: "Project reference inside a department.",
    attributes: &[attr("projectid", Str, Required, "GCP project ID.")],
};

pub const HIERARCHY_DEPARTMENT_SCHEMA: BlockSchema = BlockSchema {
    name: "departments",
    description: "Department inside a group.",
    attributes: &[
        attr("departmentname", Str, Computed, "Department name as it appears in the portal."),
        attr("departmentid", Str, Optional, "Unique department ID."),
        list_of("projects", Optional, &HIERARCHY_PROJECT_SCHEMA, "Projects in the department."),
    ],
};

pub const HIERARCHY_GROUP_SCHEMA: BlockSchema = BlockSchema {
    name: "groups",
    description: "Top-level group.",
    attributes: &[
        attr("groupname", Str, Computed, "Group name as it appears in the portal."),
        attr("groupid", Str, Optional, "Unique group ID."),
        list_of("departments", Optional, &HIERARCHY_DEPARTMENT_SCHEMA, "Departments in the group."),
    ],
};

pub const GROUP_HIERARCHY_SCHEMA: BlockSchema = BlockSchema {
    name: "burwoodportal_group_hierarchy",
    description: "The full group → department → project tree, replaced on every apply.",
    attributes: &[list_of("groups", Required, &HIERARCHY_GROUP_SCHEMA, "Groups to post.")],
};

pub const DS_PROJECT_SCHEMA: BlockSchema = BlockSchema {
    name: "projects",
    description: "Project listed under a department.",
    attributes: &[attr("projectid", Str, Computed, "GCP project id")],
};

pub const DS_DEPARTMENT_SCHEMA: BlockSchema = BlockSchema {
    name: "departments",
    description: "Department listed under a group.",
    attributes: &[
        attr("departmentname", Str, Computed, "Department name as it appears in the portal."),
        attr(
            "departmentid",
            Str,
            Computed,
            "Unique department ID used under the hood to relate the department to projects and groups.",
        ),
        list_of("projects", Computed, &DS_PROJECT_SCHEMA, "List of projects. See project schema."),
    ],
};

pub const DS_GROUP_SCHEMA: BlockSchema = BlockSchema {
    name: "groups",
    description: "Group as reported by the portal.",
    attributes: &[
        attr("groupname", Str, Computed, "Group name as it appears in the portal."),
        attr(
            "groupid",
            Str,
            Computed,
            "Unique group ID used under the hood to relate groups to departments.",
        ),
        list_of(
            "departments",
            Computed,
            &DS_DEPARTMENT_SCHEMA,
            "List of departments. Projects are nested underneath departments. See department schema.",
        ),
    ],
};

pub const HIERARCHY_DATA_SOURCE_SCHEMA: BlockSchema = BlockSchema {
    name: "burwoodportal_hierarchy",
    description: "Read-only view of the group hierarchy.",
    attributes: &[list_of(
        "groups",
        Computed,
        &DS_GROUP_SCHEMA,
        "Groups with their departments and projects.",
    )],
};

/// Every top-level schema, resources first.
pub const ALL_SCHEMAS: &[&BlockSchema] = &[&PROJECT_SCHEMA, &GROUP_HIERARCHY_SCHEMA, &HIERARCHY_DATA_SOURCE_SCHEMA];

/// Look up a top-level schema by its type name.
pub fn schema_by_name(name: &str) -> Option<&'static BlockSchema> {
    ALL_SCHEMAS.iter().copied().find(|schema| schema.name == name)
}

impl BlockSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Check a configuration block before it is decoded.
    ///
    /// Missing required attributes are reported together. Otherwise the first
    /// batch of unusable attributes (unknown, computed, wrong kind) is
    /// reported. Nested list blocks are checked recursively and named by
    /// path, e.g. `latestbudget[0].amount`.
    pub fn validate(&self, value: &Value) -> Result<(), ProviderError> {
        let mut missing = Vec::new();
        let mut problems = Vec::new();

        match value {
            Value::Object(object) => self.collect_problems(object, "", &mut missing, &mut problems),
            other => problems.push(format!("expected a mapping, got {}", value_kind(other))),
        }

        if !missing.is_empty() {
            return Err(ProviderError::MissingAttributes {
                block: self.name.to_string(),
                names: missing,
            });
        }
        if !problems.is_empty() {
            return Err(ProviderError::InvalidAttributes {
                block: self.name.to_string(),
                problems,
            });
        }
        Ok(())
    }

    fn collect_problems(&self, object: &Map<String, Value>, prefix: &str, missing: &mut Vec<String>, problems: &mut Vec<String>) {
        for key in object.keys() {
            if self.attribute(key).is_none() {
                problems.push(format!("{prefix}{key}: unknown attribute"));
            }
        }

        for attribute in self.attributes {
            let path = format!("{prefix}{}", attribute.name);
            let value = object.get(attribute.name).filter(|value| !value.is_null());

            let Some(value) = value else {
                if attribute.mode == AttributeMode::Required {
                    missing.push(path);
                }
                continue;
            };

            if attribute.mode == AttributeMode::Computed {
                problems.push(format!("{path}: computed by the portal and cannot be set"));
                continue;
            }
            if !attribute.kind.matches(value) {
                problems.push(format!(
                    "{path}: expected {}, got {}",
                    attribute.kind.as_str(),
                    value_kind(value)
                ));
                continue;
            }

            if let (Some(block), Value::Array(items)) = (attribute.block, value) {
                for (index, item) in items.iter().enumerate() {
                    let item_prefix = format!("{path}[{index}].");
                    match item {
                        Value::Object(item_object) => block.collect_problems(item_object, &item_prefix, missing, problems),
                        other => problems.push(format!("{path}[{index}]: expected a mapping, got {}", value_kind(other))),
                    }
                }
            }
        }
    }

    /// Plain-text attribute table, nested blocks indented.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n  {}\n", self.name, self.description);
        render_attributes(self.attributes, 1, &mut out);
        out
    }
}

fn render_attributes(attributes: &[AttributeSpec], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for attribute in attributes {
        out.push_str(&format!(
            "{indent}{} ({}, {})",
            attribute.name,
            attribute.kind.as_str(),
            attribute.mode.as_str()
        ));
        if let Some(default) = attribute.default {
            out.push_str(&format!(" [default: {default}]"));
        }
        out.push_str(&format!("\n{indent}  {}\n", attribute.description));
        if let Some(block) = attribute.block {
            render_attributes(block.attributes, depth + 2, out);
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
