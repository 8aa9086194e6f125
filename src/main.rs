use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use release_sync::config::SyncConfig;
use release_sync::docker::DockerEngine;
use release_sync::events::TracingObserver;
use release_sync::render::{render_diff, render_sync_summary, render_yank};
use release_sync::skip::load_skip_map;
use release_sync::sync::{
    BuildDispatcher, BuildSettings, ReplaceMode, run_diff, run_sync, yank_image,
};
use release_sync::version::credentials::{ChainTokenProvider, TokenProvider};
use release_sync::version::registries::{DockerHubRegistry, GitHubRegistry};
use release_sync::version::{Reconciler, Version};

#[derive(Parser)]
#[command(name = "release-sync")]
#[command(
    version,
    about = "Build and push images for upstream releases missing from Docker Hub"
)]
struct Cli {
    /// JSON file with settings; flags below take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Upstream GitHub repository (owner/name)
    #[arg(long, global = true)]
    upstream: Option<String>,

    /// Docker Hub repository (namespace/name)
    #[arg(long, global = true)]
    image: Option<String>,

    /// Build context directory
    #[arg(long, global = true)]
    context: Option<PathBuf>,

    /// Skip configuration file
    #[arg(long, global = true)]
    skip_config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show which releases are missing from Docker Hub
    Diff {
        /// Use this baseline instead of the oldest published tag
        #[arg(long)]
        baseline: Option<Version>,
    },
    /// Build and push missing images
    Sync {
        /// `all` to rebuild every release, or a single version to rebuild
        #[arg(long)]
        replace: Option<String>,
    },
    /// Remove a locally built image
    Yank { version: Version },
}

impl Cli {
    fn sync_config(&self) -> anyhow::Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => SyncConfig::default(),
        };

        if let Some(upstream) = &self.upstream {
            config.upstream_repo = upstream.clone();
        }
        if let Some(image) = &self.image {
            config.image_repo = image.clone();
        }
        if let Some(context) = &self.context {
            config.build_context = context.clone();
        }
        if let Some(skip_config) = &self.skip_config {
            config.skip_config = skip_config.clone();
        }
        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok(),
    };
}

async fn run(cli: Cli, github_token: Option<String>) -> anyhow::Result<()> {
    let config = cli.sync_config()?;
    let observer = Arc::new(TracingObserver);

    match cli.command {
        Command::Diff { baseline } => {
            let skip = load_skip_map(&config.skip_config, observer.as_ref());
            let releases = GitHubRegistry::default().with_token(github_token);
            let tags = DockerHubRegistry::default();
            let reconciler = Reconciler::new(
                &releases,
                &config.upstream_repo,
                &tags,
                &config.image_repo,
                observer.as_ref(),
            );

            let report = run_diff(&reconciler, &skip, baseline).await;
            println!("{}", render_diff(&report));
        }
        Command::Sync { replace } => {
            let mode = ReplaceMode::from_arg(replace.as_deref())?;
            let skip = load_skip_map(&config.skip_config, observer.as_ref());
            let releases = GitHubRegistry::default().with_token(github_token);
            let tags = DockerHubRegistry::default();
            let reconciler = Reconciler::new(
                &releases,
                &config.upstream_repo,
                &tags,
                &config.image_repo,
                observer.as_ref(),
            );
            let dispatcher = BuildDispatcher::new(
                Arc::new(DockerEngine::new(&config)),
                BuildSettings::from(&config),
                observer.clone(),
            )
            .with_max_concurrent(config.max_concurrent_builds);

            let report = run_sync(&reconciler, &skip, mode, &dispatcher).await?;
            println!("{}", render_sync_summary(&report));
        }
        Command::Yank { version } => {
            let dispatcher = BuildDispatcher::new(
                Arc::new(DockerEngine::new(&config)),
                BuildSettings::from(&config),
                observer.clone(),
            );

            let outcome = yank_image(&dispatcher, &version).await;
            println!("{}", render_yank(&outcome));
        }
    }

    Ok(())
}

/// Only commands that list GitHub releases need a token
fn github_token(command: &Command, provider: &dyn TokenProvider) -> Option<String> {
    match command {
        Command::Yank { .. } => None,
        Command::Diff { .. } | Command::Sync { .. } => provider.resolve_token(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    // Resolved outside the runtime: `gh auth token` blocks.
    let github_token = github_token(&cli.command, &ChainTokenProvider::default());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, github_token))
}
