//! Certification daemon: entry point for running a node.

use std::net::IpAddr;
use std::path::PathBuf;

use accredit_node::{verify_chain_offline, AccreditNode, Environment, NodeConfig};
use accredit_utils::{init_logging, LogFormat};
use anyhow::{bail, Context};
use clap::Parser;

#[derive(Parser)]
#[command(name = "accredit-daemon", about = "Achievement certification service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ACCREDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "ACCREDIT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address to bind the HTTP API to.
    #[arg(long, env = "ACCREDIT_BIND_ADDRESS")]
    bind_address: Option<IpAddr>,

    /// HTTP API port.
    #[arg(long, env = "ACCREDIT_HTTP_PORT")]
    http_port: Option<u16>,

    /// "development" or "production". Production hides error detail.
    #[arg(long, env = "ACCREDIT_ENVIRONMENT")]
    environment: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ACCREDIT_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ACCREDIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable the external fraud classifier.
    #[arg(long, env = "ACCREDIT_CLASSIFIER_ENABLED")]
    classifier: Option<bool>,

    /// Webhook receiving workflow notifications.
    #[arg(long, env = "ACCREDIT_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Run,
    /// Certificate chain tools.
    Chain {
        #[command(subcommand)]
        action: ChainAction,
    },
    /// Configuration tools.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum ChainAction {
    /// Walk the chain in the data directory and report every defect.
    Verify {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Dump,
}

impl Cli {
    fn effective_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NodeConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(addr) = self.bind_address {
            config.bind_address = addr;
        }
        if let Some(port) = self.http_port {
            config.http_port = port;
        }
        if let Some(env) = &self.environment {
            config.environment = Environment::parse(env)
                .with_context(|| format!("unknown environment {env:?}"))?;
        }
        if let Some(format) = &self.log_format {
            config.log_format = LogFormat::parse(format)
                .with_context(|| format!("unknown log format {format:?}"))?;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(enabled) = self.classifier {
            config.classifier.enabled = enabled;
        }
        if let Some(url) = &self.webhook_url {
            config.notifications.webhook_url = Some(url.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;

    match cli.command {
        Command::Config {
            action: ConfigAction::Dump,
        } => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Chain {
            action: ChainAction::Verify { json },
        } => {
            init_logging(config.log_format, &config.log_level);
            let report = verify_chain_offline(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("chain length: {}", report.length);
                println!("head:         {}", report.head);
                for issue in &report.issues {
                    println!("issue:        {issue:?}");
                }
            }
            if !report.is_intact() {
                bail!("certificate chain has {} issue(s)", report.issues.len());
            }
            Ok(())
        }
        Command::Run => {
            init_logging(config.log_format, &config.log_level);
            let node = AccreditNode::open(config)?;
            node.run().await?;
            Ok(())
        }
    }
}
