use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use agriwise_infrastructure::{AgriwisePaths, ConfigService};

mod commands;
mod logging;

use commands::session::{SessionCommand, SessionContext};

#[derive(Parser)]
#[command(name = "agriwise")]
#[command(about = "AgriWise CLI - inspect and drive the persisted session", long_about = None)]
struct Cli {
    /// Directory holding config.toml and the session record
    #[arg(long, global = true, env = "AGRIWISE_HOME")]
    home: Option<PathBuf>,

    /// Log filter (overrides AGRIWISE_LOG and config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Session(SessionCommand),
    /// Manage config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = AgriwisePaths::new(cli.home.as_deref());
    let config_service = ConfigService::new(&paths)?;
    let loaded = config_service.load();
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => Default::default(),
    };

    logging::init(cli.log_level.as_deref(), &config.logging.level);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "[Config] Invalid config file, using defaults");
    }

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(&config_service, force)?,
            ConfigAction::Show => commands::config::show(&config)?,
        },
        Commands::Session(command) => {
            let ctx = SessionContext::open(&paths, &config)?;
            let outcome = command.run(&ctx);
            // Flush even when the command failed so earlier writes land.
            ctx.finish().await?;
            outcome?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login_with_profile() {
        let cli = Cli::try_parse_from([
            "agriwise", "--home", "/tmp/aw", "login", "--id", "1", "--name", "Amina", "--token",
            "tok", "--crops", "maize,kale", "--language", "luo",
        ])
        .unwrap();

        assert_eq!(cli.home.as_deref(), Some(std::path::Path::new("/tmp/aw")));
        let Commands::Session(SessionCommand::Login(args)) = cli.command else {
            panic!("expected login");
        };
        assert_eq!(args.profile.crops.unwrap(), vec!["maize", "kale"]);
    }

    #[test]
    fn test_parse_rejects_unknown_language() {
        let result = Cli::try_parse_from([
            "agriwise", "login", "--id", "1", "--name", "A", "--token", "t", "--language", "klingon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_bool_setters() {
        let cli = Cli::try_parse_from(["agriwise", "set-notifications", "false"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Session(SessionCommand::SetNotifications { enabled: false })
        ));
    }
}
