use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hostinger_dns::ChallengeHandler;
use tracing_subscriber::EnvFilter;

mod config;
mod hook;

use config::{HookConfig, Overrides};

/// Log filter used when `RUST_LOG` is unset or invalid
const DEFAULT_LOG_FILTER: &str = "certbot_hostinger=info,hostinger_dns=info";

/// Certbot DNS-01 hooks for Hostinger DNS
#[derive(Parser, Debug)]
#[command(name = "certbot-hostinger")]
#[command(about = "Answer certbot DNS-01 challenges with Hostinger DNS TXT records")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hostinger credentials INI file
    #[arg(long, global = true)]
    credentials: Option<String>,

    /// Seconds to wait for DNS changes to propagate
    #[arg(long, global = true)]
    propagation_seconds: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish the challenge TXT record (--manual-auth-hook)
    Auth(ChallengeArgs),
    /// Remove the challenge TXT record (--manual-cleanup-hook)
    Cleanup(ChallengeArgs),
    /// Describe this plugin
    Info,
}

#[derive(Args, Debug)]
struct ChallengeArgs {
    /// Domain being validated
    #[arg(long, env = "CERTBOT_DOMAIN")]
    domain: String,

    /// Validation token to publish
    #[arg(long, env = "CERTBOT_VALIDATION")]
    validation: String,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Hook stdout is read by certbot, log to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (challenge, is_auth) = match cli.command {
        Command::Info => {
            let handler = ChallengeHandler::new(Default::default());
            println!("{}", hostinger_dns::DESCRIPTION);
            println!("{}", handler.more_info());
            return Ok(());
        }
        Command::Auth(args) => (args, true),
        Command::Cleanup(args) => (args, false),
    };

    let config_path = cli
        .config
        .or_else(HookConfig::default_path)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load and resolve configuration (loads the credentials)
    let config = HookConfig::load_and_resolve(
        &config_path,
        Overrides {
            credentials: cli.credentials,
            propagation_seconds: cli.propagation_seconds,
        },
    )
    .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let mut handler = ChallengeHandler::new(config.client).with_ttl(config.ttl);
    handler.setup_credentials(config.credentials);

    if is_auth {
        hook::auth(
            &handler,
            &challenge.domain,
            &challenge.validation,
            config.propagation,
        )
        .await
    } else {
        hook::cleanup(&handler, &challenge.domain, &challenge.validation).await
    }
}
