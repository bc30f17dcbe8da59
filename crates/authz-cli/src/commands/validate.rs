use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use authz_core::AuthzModel;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_success, print_warning};

pub fn validate(file: &Path, format: OutputFormat) -> Result<()> {
    let model = AuthzModel::from_path(file)
        .with_context(|| format!("Failed to load model: {}", file.display()))?;
    let summary = model.summary();
    let external = external_references(&model);

    match format {
        OutputFormat::Json => print_json(&json!({
            "summary": summary,
            "external_references": external,
        }))?,
        OutputFormat::Table => {
            println!("{}: {}", "Applications".cyan(), summary.applications);
            println!("{}: {}", "Permissions".cyan(), summary.permissions);
            println!("{}: {}", "Roles".cyan(), summary.roles);
            println!("{}: {}", "Groups".cyan(), summary.groups);
            println!("{}: {}", "Nested references".cyan(), summary.nested_refs);
            for reference in &external {
                print_warning(&format!("{reference} must already exist in the store"));
            }
            print_success(&format!("{} is valid", file.display().to_string().cyan()));
        }
    }
    Ok(())
}

/// References the model itself does not satisfy: role permissions missing from
/// their application's permission list, and nested groups not declared by an
/// earlier group. Provisioning resolves these against the store.
pub fn external_references(model: &AuthzModel) -> Vec<String> {
    let mut external = Vec::new();

    for app in &model.applications {
        let declared: HashSet<&str> = app.permissions.iter().map(String::as_str).collect();
        for role in &app.roles {
            for name in role.permissions.iter().filter(|p| !declared.contains(p.as_str())) {
                external.push(format!(
                    "permission '{name}' of role '{}' ({})",
                    role.name,
                    app.display_name()
                ));
            }
        }
    }

    let mut earlier: HashSet<&str> = HashSet::new();
    for group in &model.groups {
        earlier.insert(group.name.as_str());
        for nested in group.nested.iter().filter(|n| !earlier.contains(n.name.as_str())) {
            external.push(format!("group '{}' nested in '{}'", nested.name, group.name));
        }
    }

    external
}
