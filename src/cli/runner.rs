//! CLI runner - executes commands

use crate::api::Api;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::types::Method;
use anyhow::{Context as _, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        self.run_with_env(|name| std::env::var(name).ok()).await
    }

    /// Run the CLI command, reading overrides from `lookup` instead of the
    /// process environment
    pub async fn run_with_env<F>(&self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = self.load_config(lookup)?;

        if let Commands::Auth = self.cli.command {
            return self.auth(&config);
        }

        let api = Api::from_config(&config).context("failed to build API client")?;
        let ctx = self.context();

        match &self.cli.command {
            Commands::User => self.user(&api, &ctx).await,
            Commands::Get { path } => self.get(&api, &ctx, path).await,
            Commands::List { path, per_page } => self.list(&api, &ctx, path, *per_page).await,
            Commands::Auth => self.auth(&config),
        }
    }

    /// Load the profile file, if any, then apply environment overrides
    fn load_config<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("failed to load profile {}", path.display()))?,
            None => ClientConfig::default(),
        };
        config
            .with_overrides(lookup)
            .context("invalid environment configuration")
    }

    /// Context for the whole command, cancelled on Ctrl-C
    fn context(&self) -> RequestContext {
        let mut ctx = RequestContext::background();
        if let Some(secs) = self.cli.timeout {
            ctx = ctx.with_timeout(Duration::from_secs(secs));
        }

        let (ctx, handle) = ctx.with_cancel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling");
                handle.cancel();
            }
        });
        ctx
    }

    async fn user(&self, api: &Api, ctx: &RequestContext) -> Result<()> {
        let user = api
            .user_details(ctx)
            .await
            .context("failed to fetch user details")?;
        self.output(&user)
    }

    async fn get(&self, api: &Api, ctx: &RequestContext, path: &str) -> Result<()> {
        let body = api
            .request(ctx, Method::GET, path, None)
            .await
            .with_context(|| format!("GET {path} failed"))?;

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => self.output(&value),
            Err(_) => {
                println!("{}", String::from_utf8_lossy(&body));
                Ok(())
            }
        }
    }

    async fn list(&self, api: &Api, ctx: &RequestContext, path: &str, per_page: u32) -> Result<()> {
        let listing = api
            .list_all::<Value>(ctx, path, per_page)
            .await
            .with_context(|| format!("listing {path} failed"))?;

        if !listing.consistent {
            warn!(
                path,
                pages = listing.pages_fetched,
                "pagination info was inconsistent, listing may be incomplete"
            );
        }

        self.output(&json!({
            "items": listing.items,
            "pages": listing.pages_fetched,
            "consistent": listing.consistent,
        }))
    }

    fn auth(&self, config: &ClientConfig) -> Result<()> {
        let credentials = config
            .credentials()
            .context("no usable credentials configured")?;
        self.output(&json!({ "auth_type": credentials.auth_type() }))
    }

    /// Output a value
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", self.render(value)?);
        Ok(())
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        Ok(rendered)
    }
}
