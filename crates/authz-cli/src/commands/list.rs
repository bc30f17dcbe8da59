use anyhow::Result;

use authz_core::DirectoryStore;

use crate::cli::{EntityType, OutputFormat};
use crate::commands::connect;
use crate::config::Settings;
use crate::output::{print_groups, print_json, print_permissions, print_roles};

pub async fn list(settings: &Settings, entity: EntityType, format: OutputFormat) -> Result<()> {
    let client = connect(settings).await?;

    match entity {
        EntityType::Permissions => {
            let permissions = client.list_permissions().await?;
            match format {
                OutputFormat::Json => print_json(&permissions)?,
                OutputFormat::Table => print_permissions(&permissions),
            }
        }
        EntityType::Roles => {
            let roles = client.list_roles().await?;
            match format {
                OutputFormat::Json => print_json(&roles)?,
                OutputFormat::Table => print_roles(&roles),
            }
        }
        EntityType::Groups => {
            let groups = client.list_groups().await?;
            match format {
                OutputFormat::Json => print_json(&groups)?,
                OutputFormat::Table => print_groups(&groups),
            }
        }
    }
    Ok(())
}
