use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod notifier;

use context::AppContext;

#[derive(Parser, Debug)]
#[command(name = "panel")]
#[command(about = "Panel - multi-persona document review", long_about = None)]
struct Cli {
    /// Root directory of the document vault
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to secret.json (defaults to the platform config directory)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review a document with its personas and save the artifact
    Review {
        /// Vault-relative path of the document
        document: String,
    },
    /// Print the stored review of a document
    Show {
        /// Vault-relative path of the document
        document: String,
    },
    /// List the personas that would review a document
    Personas {
        /// Vault-relative path of the document
        document: String,
    },
    /// Send a short prompt to the configured backend
    TestConnection,
    /// Write configuration templates
    Init,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let ctx = AppContext::new(cli.vault, cli.config, cli.secrets);

    match cli.command {
        Commands::Review { document } => commands::review::run(&ctx, &document).await?,
        Commands::Show { document } => commands::show::run(&ctx, &document).await?,
        Commands::Personas { document } => commands::personas::run(&ctx, &document)?,
        Commands::TestConnection => commands::connection::run(&ctx).await?,
        Commands::Init => commands::init::run(&ctx)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "panel",
            "review",
            "notes/Plan.md",
            "--vault",
            "/tmp/vault",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(cli.vault, PathBuf::from("/tmp/vault"));
        assert!(cli.verbose);
        assert!(!cli.log_json);
        assert!(matches!(cli.command, Commands::Review { document } if document == "notes/Plan.md"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["panel", "test-connection"]).unwrap();
        assert_eq!(cli.vault, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::TestConnection));
    }

    #[test]
    fn test_document_is_required() {
        assert!(Cli::try_parse_from(["panel", "show"]).is_err());
    }
}
