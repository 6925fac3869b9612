//! Managed resources.

mod hierarchy;
mod project;

pub use hierarchy::{DepartmentConfig, GroupConfig, GroupHierarchyResource, HierarchyConfig, HierarchyState, ProjectRefConfig};
pub use project::{
    BudgetConfig, DEFAULT_AFTER_CREDITS, DEFAULT_BUDGET_STATE, ProjectConfig, ProjectResource, ProjectState,
};
