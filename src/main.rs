use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phasewatch::{api, phase, FeatureStore, Notifier, NotifyConfig, Workspace};

#[derive(Parser)]
#[command(name = "phasewatch")]
#[command(about = "Phase progress tracking and change notifications for feature-driven builds")]
struct Cli {
    /// Project workspace containing features.db
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Webhook for progress notifications (overrides PROGRESS_WEBHOOK_URL)
    #[arg(long, global = true)]
    webhook_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print progress and notify the webhook if it increased
    Status {
        /// Only count features in this phase
        #[arg(short, long)]
        phase: Option<u32>,
    },
    /// Print the currently active phase
    Phase,
    /// Print completion of every started phase
    Phases,
    /// Serve the progress API for the workspace
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

/// Initialize tracing on stderr so stdout only carries progress output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "phasewatch=info,tower_http=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = NotifyConfig::from_env();
    if let Some(url) = cli.webhook_url {
        config.endpoint = Some(url).filter(|u| !u.trim().is_empty());
    }

    let workspace = Workspace::new(cli.project_dir);
    let store = FeatureStore::new(workspace.clone());
    let notifier = Notifier::new(workspace, config);

    match cli.command.unwrap_or(Commands::Status { phase: None }) {
        Commands::Status { phase } => {
            let report = notifier.report_progress(&store, phase).await;
            println!("{}", report.summary_line());
        }
        Commands::Phase => {
            let current = phase::current_phase_status(&store);
            if current.complete {
                println!("Phase {} (complete)", current.phase);
            } else {
                println!("Phase {}", current.phase);
            }
        }
        Commands::Phases => {
            let phases = phase::phase_overview(&store);
            if phases.is_empty() {
                println!("No features in database yet");
            }
            for status in phases {
                let marker = if status.complete { "done" } else { "active" };
                println!(
                    "Phase {}: {}/{} passing [{}]",
                    status.phase, status.passing, status.total, marker
                );
            }
        }
        Commands::Serve { port } => {
            let app = api::create_router(api::AppState::new(store, notifier));

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("phasewatch listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
