use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use authz_core::{Group, Permission, Role};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_table(header: &[&str], rows: Vec<Vec<String>>, empty: &str) {
    if rows.is_empty() {
        println!("{empty}");
        return;
    }
    let total = rows.len();
    let mut builder = Builder::default();
    builder.push_record(header.iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!("Total: {total}");
}

pub fn print_permissions(permissions: &[Permission]) {
    let rows = permissions
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.application_id.clone(),
                p.name.clone(),
                p.description.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "Application", "Name", "Description"],
        rows,
        "No permissions found.",
    );
}

pub fn print_roles(roles: &[Role]) {
    let rows = roles
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.application_id.clone(),
                r.name.clone(),
                r.permissions.len().to_string(),
                r.description.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "Application", "Name", "Permissions", "Description"],
        rows,
        "No roles found.",
    );
}

pub fn print_groups(groups: &[Group]) {
    let rows = groups
        .iter()
        .map(|g| {
            vec![
                g.id.clone(),
                g.name.clone(),
                g.nested.len().to_string(),
                g.description.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "Name", "Nested", "Description"], rows, "No groups found.");
}
