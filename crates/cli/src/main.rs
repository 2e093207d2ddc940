use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use catalog_db::{BookStore, MemoryStore};
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[derive(Parser)]
#[command(name = "catalog", version, about = "Library catalog book service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
        /// Seed the in-memory store with a demo catalog
        #[arg(long)]
        seed_demo: bool,
    },
    /// Print the effective configuration as JSON and exit
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load catalog settings")?;

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        seed_demo: false,
    }) {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Serve { port, seed_demo } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            settings.store.seed_demo |= seed_demo;
            serve(settings).await
        }
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    catalog_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        seed_demo = settings.store.seed_demo,
        "catalog bootstrap starting"
    );

    let store: Arc<dyn BookStore> = if settings.store.seed_demo {
        Arc::new(MemoryStore::demo())
    } else {
        Arc::new(MemoryStore::new())
    };

    let mut registry = ModuleRegistry::new();
    catalog_app::register_all(&mut registry, store, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!(modules = registry.module_count(), "catalog bootstrap complete");

    let served = catalog_http::start_server(&registry, &settings).await;
    registry.stop_modules().await?;
    served
}
