//! Control plane CLI: process bootstrap, configuration, and the `serve`
//! entrypoint for the HTTP facade over `ctlplane-handlers`/`ctlplane-runtime`.

mod config;
mod http;
mod paths;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ctlplane_catalog::{CatalogManager, NamespaceManager, ResourceManager, VariantManager, ViewManager};
use ctlplane_core::{InMemoryObjectStore, Validators};
use ctlplane_handlers::HandlerRegistry;
use ctlplane_runtime::{BrokerConfig, EchoJsRuntime, Runner, SandboxRunner, SessionBroker};
use ctlplane_skillset::{SkillSetManager, SyntacticTransformValidator};
use self::config::{load_config, parse_duration, AppConfig};
use paths::{paths_from_env, CtlplanePaths};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "ctlplane")]
#[command(about = "Policy-driven control plane for agent/tool invocation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to the system config directory).
    #[arg(short, long)]
    config: Option<String>,

    /// Data directory (overrides config and system default).
    #[arg(long, env = "CTLPLANE_DATA_DIR")]
    data_dir: Option<String>,

    /// Log level.
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the on-disk layout (data/config/cache/logs directories) and a
    /// default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP facade.
    Serve {
        /// Overrides `server.host:server.port` from the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print resolved paths.
    Paths,
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Precedence: CLI args > environment variables > system defaults.
fn resolve_paths(cli: &Cli) -> Result<CtlplanePaths> {
    let mut overrides = paths_from_env();
    if let Some(ref data_dir) = cli.data_dir {
        overrides.data_dir = Some(data_dir.into());
    }
    let base = CtlplanePaths::new().context("failed to resolve system paths")?;
    Ok(overrides.apply_to(base))
}

fn config_path(cli: &Cli, paths: &CtlplanePaths) -> std::path::PathBuf {
    cli.config.as_ref().map(std::path::PathBuf::from).unwrap_or_else(|| paths.default_config_file())
}

/// The handlers and the session broker must share the same `ViewManager`/
/// `SkillSetManager` instances: views and skillsets created through the
/// CRUD surface have to be visible to session creation.
struct Backend {
    handlers: Arc<HandlerRegistry>,
    broker: Arc<SessionBroker>,
}

fn build_backend(config: &AppConfig) -> Result<Backend> {
    let validators = Arc::new(Validators::new());
    let views = Arc::new(ViewManager::new(validators.clone()));
    let skillsets = Arc::new(SkillSetManager::new(validators.clone(), Arc::new(SyntacticTransformValidator)));

    let handlers = Arc::new(HandlerRegistry::new(
        Arc::new(CatalogManager::new(validators.clone())),
        Arc::new(VariantManager::new(validators.clone())),
        Arc::new(NamespaceManager::new(validators.clone())),
        Arc::new(ResourceManager::new(validators.clone(), InMemoryObjectStore::arc())),
        skillsets.clone(),
        views.clone(),
    ));

    let runner: Arc<dyn Runner> =
        Arc::new(SandboxRunner::new("shell", vec!["shell".into()], StdDuration::from_millis(500)));
    let broker_config = BrokerConfig {
        max_variables: config.session.max_variables,
        session_expiration: parse_duration(&config.session.expiration_time)
            .context("invalid session.expiration_time")?,
        transform_timeout: StdDuration::from_millis(500),
        working_dir: std::env::current_dir().unwrap_or_else(|_| ".".into()),
        single_user_mode: config.single_user_mode,
    };
    let broker =
        Arc::new(SessionBroker::new(broker_config, validators, views, skillsets, vec![runner], Arc::new(EchoJsRuntime)));

    Ok(Backend { handlers, broker })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let paths = resolve_paths(&cli)?;
    let config = load_config(Some(&config_path(&cli, &paths))).context("failed to load configuration")?;

    match cli.command {
        Commands::Init { force } => {
            if paths.config_dir.exists() && !force {
                info!("{} already initialized; pass --force to overwrite", paths.config_dir.display());
                return Ok(());
            }
            paths.ensure_directories()?;
            let config_file = paths.default_config_file();
            if !config_file.exists() || force {
                let rendered = toml::to_string_pretty(&AppConfig::default())
                    .context("failed to render default config")?;
                std::fs::write(&config_file, rendered)
                    .with_context(|| format!("failed to write {}", config_file.display()))?;
            }
            println!("{}", paths.display());
        }
        Commands::Paths => {
            println!("{}", paths.display());
        }
        Commands::Serve { bind } => {
            paths.ensure_directories()?;
            let bind = bind.unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

            let backend = build_backend(&config)?;
            let app = http::router(http::AppState { handlers: backend.handlers, broker: backend.broker });

            let listener = tokio::net::TcpListener::bind(&bind).await.with_context(|| format!("failed to bind {bind}"))?;
            info!("ctlplane HTTP facade listening on {bind}");

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("shutting down");
                })
                .await
                .context("HTTP server error")?;
        }
    }

    Ok(())
}
