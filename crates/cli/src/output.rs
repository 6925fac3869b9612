//! Text and JSON rendering of command results.

use anyhow::Result;
use burwood_provider::{AppliedManifest, HierarchyState, ProjectState};
use burwood_types::{Allowance, Project};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print `value` as pretty JSON, or as the text produced by `text`.
pub fn emit<T: Serialize + ?Sized>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub fn hierarchy_text(state: &HierarchyState) -> String {
    if state.groups.is_empty() {
        return "no groups\n".to_string();
    }
    let mut out = String::new();
    for group in &state.groups {
        out.push_str(&format!("{} ({})\n", or_dash(&group.group_name), group.group_id));
        for department in &group.departments {
            out.push_str(&format!(
                "  {} ({})\n",
                or_dash(&department.department_name),
                department.department_id
            ));
            for project in &department.projects {
                out.push_str(&format!("    {}\n", project.project_id));
            }
        }
    }
    out
}

fn project_lines(project: &Project, out: &mut String) {
    let fields = [
        ("projectid", project.project_id.as_str()),
        ("projectname", project.project_name.as_str()),
        ("departmentid", project.department_id.as_str()),
        ("departmentname", project.department_name.as_str()),
        ("primarycontactemail", project.primary_contact_email.as_str()),
        ("billingcontactemail", project.billing_contact_email.as_str()),
        ("aftercredits", project.after_credits.as_str()),
        ("aftercreditsaccount", project.after_credits_account.as_str()),
        ("aftercreditspo", project.after_credits_po.as_str()),
        ("paidbillingaccount", project.paid_billing_account.as_str()),
        ("totalbudget", project.total_budget.as_str()),
    ];
    for (name, value) in fields {
        out.push_str(&format!("{name:<20} {}\n", or_dash(value)));
    }
    out.push_str(&format!("{:<20} {}\n", "recurringbudget", project.recurring_budget));
}

fn budget_line(budget: &Allowance) -> String {
    format!(
        "{} {} account={} po={} expires={} spent={:.2}{}\n",
        budget.amount,
        or_dash(&budget.state),
        or_dash(&budget.billing_account_id),
        or_dash(&budget.po_number),
        or_dash(&budget.expiration_date),
        budget.actual_spend,
        if budget.recurring { " recurring" } else { "" }
    )
}

pub fn project_text(state: &ProjectState) -> String {
    if !state.exists() {
        return format!("project {} not found\n", state.id);
    }
    let mut out = String::new();
    project_lines(&state.project, &mut out);
    match &state.latest_budget {
        Some(budget) => out.push_str(&format!("{:<20} {}", "latestbudget", budget_line(budget))),
        None => out.push_str(&format!("{:<20} -\n", "latestbudget")),
    }
    out
}

pub fn budgets_text(budgets: &[Allowance]) -> String {
    if budgets.is_empty() {
        return "no budgets\n".to_string();
    }
    budgets.iter().map(budget_line).collect()
}

pub fn applied_text(applied: &AppliedManifest) -> String {
    let mut out = String::new();
    if let Some(hierarchy) = &applied.hierarchy {
        out.push_str(&format!("applied group hierarchy ({} groups)\n", hierarchy.groups.len()));
    }
    for state in &applied.projects {
        match &state.latest_budget {
            Some(budget) => out.push_str(&format!("applied project {} with budget {}\n", state.id, budget.amount)),
            None => out.push_str(&format!("applied project {}\n", state.id)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use burwood_types::{Department, Group};

    fn budget(amount: i64) -> Allowance {
        Allowance {
            amount,
            state: "Active".into(),
            billing_account_id: "0000-AAAA".into(),
            actual_spend: 12.5,
            ..Allowance::default()
        }
    }

    #[test]
    fn hierarchy_is_indented_by_level() {
        let state = HierarchyState {
            id: "1".into(),
            groups: vec![Group {
                group_name: "Research".into(),
                group_id: "1".into(),
                departments: vec![Department {
                    department_name: String::new(),
                    department_id: "12".into(),
                    projects: vec![Project::reference("p-1")],
                }],
            }],
        };
        assert_eq!(hierarchy_text(&state), "Research (1)\n  - (12)\n    p-1\n");
    }

    #[test]
    fn missing_project_is_reported() {
        let state = ProjectState {
            id: "ghost".into(),
            project: Project::default(),
            latest_budget: None,
        };
        assert_eq!(project_text(&state), "project ghost not found\n");
    }

    #[test]
    fn project_text_lists_latest_budget() {
        let state = ProjectState {
            id: "p-1".into(),
            project: Project::reference("p-1"),
            latest_budget: Some(budget(500)),
        };
        let text = project_text(&state);
        assert!(text.starts_with("projectid            p-1\n"), "{text}");
        assert!(text.contains("latestbudget         500 Active account=0000-AAAA po=- expires=- spent=12.50\n"), "{text}");
    }

    #[test]
    fn budgets_one_per_line() {
        assert_eq!(budgets_text(&[]), "no budgets\n");
        let text = budgets_text(&[budget(1), budget(2)]);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn applied_summary_names_each_project() {
        let applied = AppliedManifest {
            hierarchy: None,
            projects: vec![ProjectState {
                id: "p-1".into(),
                project: Project::reference("p-1"),
                latest_budget: Some(budget(500)),
            }],
        };
        assert_eq!(applied_text(&applied), "applied project p-1 with budget 500\n");
    }
}
