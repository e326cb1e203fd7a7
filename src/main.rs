use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mom_notes::{api, config::ServerConfig, db, service::NotesService};

#[derive(Parser)]
#[command(name = "momnotes")]
#[command(about = "Research notes with emoji tags, organised into shareable dashboards")]
struct Cli {
    /// Database file (overrides config and MOMNOTES_DB_PATH)
    #[arg(long, global = true)]
    db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides config and MOMNOTES_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Delete notes, versions and shares whose parent record is gone
    Sweep,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "mom_notes=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_service(config: &ServerConfig) -> anyhow::Result<NotesService> {
    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(NotesService::new(db))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let service = open_service(&config)?;

    // Clean up after any cascade delete that was interrupted last run.
    service.sweep_orphans()?;

    let app = api::create_router_with_config(service, &config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!("Mom Notes listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ServerConfig::load();
    if let Some(path) = cli.db {
        config.db_path = Some(path);
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Some(Commands::Sweep) => {
            let service = open_service(&config)?;
            let report = service.sweep_orphans()?;
            println!(
                "Removed {} notes, {} versions, {} shares",
                report.notes_removed, report.versions_removed, report.shares_removed
            );
        }
        None => serve(config).await?,
    }

    Ok(())
}
