//! Config command - manage configuration.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use envoy_core::Carrier;
use envoy_store::{Config, OutputFormat};
use tracing::info;

use super::Session;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration with secrets masked.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
///
/// `init` does not read the existing file, so it can replace a corrupt one.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(&Session::load(cli)?)?,
        ConfigAction::Path => show_paths(&Session::load(cli)?)?,
        ConfigAction::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            init_config(&path, *force)?;
        }
    }
    Ok(ExitCode::Success)
}

fn show_config(session: &Session) -> Result<()> {
    let masked = session.config.masked();
    let credentials = session.credentials();

    match session.format {
        OutputFormat::Text => {
            println!("Envoy Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Database:        {}", masked.database_path.display());
            println!("Default format:  {}", masked.default_format);
            println!("Max concurrent:  {}", masked.max_concurrent_requests);
            println!(
                "HTTP timeouts:   {}s request, {}s connect, {}s idle",
                masked.http.timeout_secs,
                masked.http.connect_timeout_secs,
                masked.http.pool_idle_timeout_secs
            );
            println!();
            println!("Credentials:");
            for carrier in Carrier::all().iter().filter(|c| c.is_trackable()) {
                let status = match (masked.credentials.get(*carrier), credentials.contains_key(carrier)) {
                    (Some(entry), _) => format!("{} / {}", entry.client_id, entry.client_secret),
                    (None, true) => "from environment".to_string(),
                    (None, false) => "not configured".to_string(),
                };
                println!("  • {:<6} {status}", carrier.display_name());
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format(&masked)?),
    }

    Ok(())
}

fn show_paths(session: &Session) -> Result<()> {
    let config_path = &session.config_path;
    let database_path = &session.config.database_path;

    match session.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file: {}", config_path.display());
            println!("Database:    {}", database_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": config_path.display().to_string(),
                "database": database_path.display().to_string(),
            });
            println!("{}", JsonFormatter::format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default()
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Configuration initialized");
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        init_config(&path, false).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }
}
