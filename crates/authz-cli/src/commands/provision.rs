use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use authz_core::{AuthzModel, PassReport, Provisioner};

use crate::cli::OutputFormat;
use crate::commands::connect;
use crate::config::Settings;
use crate::output::{print_json, print_success};

pub async fn provision(settings: &Settings, file: &Path, format: OutputFormat) -> Result<()> {
    // Parse before authenticating so a broken file costs no network round trip.
    let model = AuthzModel::from_path(file)
        .with_context(|| format!("Failed to load model: {}", file.display()))?;
    let client = connect(settings).await?;

    let report = Provisioner::new(&client).provision(&model).await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_pass("Permissions", &report.permissions, "attached");
            print_pass("Roles", &report.roles, "permission sets attached");
            print_pass("Groups", &report.groups, "nesting lists attached");
            print_success(&format!(
                "Provisioned {} ({} created)",
                file.display().to_string().cyan(),
                report.total_created()
            ));
        }
    }
    Ok(())
}

fn print_pass(label: &str, pass: &PassReport, attached_label: &str) {
    let mut line = format!(
        "{}: {} created, {} existing",
        label.cyan(),
        pass.created,
        pass.existing
    );
    if pass.attached > 0 {
        line.push_str(&format!(", {} {attached_label}", pass.attached));
    }
    println!("{line}");
}
