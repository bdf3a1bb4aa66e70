//! CLI for the RESTCONF client.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use restconf_core::config::{self, ClientConfig};
use restconf_core::{Client, Method};
use std::path::PathBuf;

use commands::{run_capabilities, run_data};

/// Top-level CLI for the RESTCONF client.
#[derive(Debug, Parser)]
#[command(name = "restconf")]
#[command(about = "restconf: resilient RESTCONF client for network devices", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub device: DeviceArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Connection settings; each one overrides the config file.
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device base URL, e.g. https://10.0.0.1.
    #[arg(long, global = true)]
    pub url: Option<String>,
    #[arg(long, global = true)]
    pub username: Option<String>,
    #[arg(long, global = true)]
    pub password: Option<String>,
    /// Skip TLS certificate verification.
    #[arg(long, global = true)]
    pub insecure: bool,
    /// Config file to use instead of ~/.config/restconf/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments shared by data operations.
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Resource path below {root}/data/, e.g. Cisco-IOS-XE-native:native/hostname.
    pub path: String,
    /// Query parameter (repeatable).
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_query)]
    pub query: Vec<(String, String)>,
    /// Per-attempt timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments of state-changing operations.
#[derive(Debug, Args)]
pub struct WriteArgs {
    #[command(flatten)]
    pub target: DataArgs,
    /// JSON payload, or @FILE to read it from a file.
    #[arg(long, value_name = "JSON|@FILE")]
    pub data: Option<String>,
    /// Wait for datastore locks to clear after the write.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read data.
    Get(DataArgs),
    /// Create a data resource.
    Post(WriteArgs),
    /// Create or replace a data resource.
    Put(WriteArgs),
    /// Merge into a data resource.
    Patch(WriteArgs),
    /// Delete a data resource.
    Delete(WriteArgs),
    /// Discover the RESTCONF root and list device capabilities.
    Capabilities,
}

fn parse_query(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

impl DeviceArgs {
    /// Config file (explicit or default) with command-line overrides applied.
    fn client_config(&self) -> Result<ClientConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        if let Some(url) = &self.url {
            cfg.url = url.clone();
        }
        if let Some(username) = &self.username {
            cfg.username = username.clone();
        }
        if let Some(password) = &self.password {
            cfg.password = password.clone();
        }
        if self.insecure {
            cfg.insecure = true;
        }
        Ok(cfg)
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.device.client_config()?;
        tracing::debug!(url = %cfg.url, username = %cfg.username, "loaded config");
        let client = Client::new(&cfg).with_context(|| format!("connecting to {}", cfg.url))?;

        match cli.command {
            CliCommand::Get(args) => run_data(&client, Method::Get, &args, None, false)?,
            CliCommand::Post(w) => run_data(&client, Method::Post, &w.target, w.data.as_deref(), w.wait)?,
            CliCommand::Put(w) => run_data(&client, Method::Put, &w.target, w.data.as_deref(), w.wait)?,
            CliCommand::Patch(w) => run_data(&client, Method::Patch, &w.target, w.data.as_deref(), w.wait)?,
            CliCommand::Delete(w) => run_data(&client, Method::Delete, &w.target, w.data.as_deref(), w.wait)?,
            CliCommand::Capabilities => run_capabilities(&client)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
