mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real env vars and flags still apply.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    if let Err(e) = run(&cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let profile = &cli.profile;
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Provision(args) => {
            let settings = resolve(cli)?;
            commands::provision::provision(&settings, &args.file, format).await?;
        }
        Commands::Validate(args) => {
            commands::validate::validate(&args.file, format)?;
        }
        Commands::List(args) => {
            let settings = resolve(cli)?;
            commands::list::list(&settings, args.entity, format).await?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let config_path = config::config_path()?;
                let cfg = config::load_profile(&config_path, profile)?;
                let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".into());
                println!("{}: {}", "Profile".cyan(), profile);
                println!("{}: {}", "API URL".cyan(), show(&cfg.api_url));
                println!("{}: {}", "Domain".cyan(), show(&cfg.domain));
                println!("{}: {}", "Audience".cyan(), show(&cfg.audience));
                println!("{}: {}", "Client ID".cyan(), show(&cfg.client_id));
            }
            cli::ConfigCommands::Set(set_args) => {
                let config_path = config::config_path()?;
                let mut cfg = config::load_profile(&config_path, profile)?;
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(&config_path, profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(())
}

fn resolve(cli: &Cli) -> Result<config::Settings> {
    let profile = config::load_profile(&config::config_path()?, &cli.profile)?;
    config::resolve_settings(cli, &profile)
}
