use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_server::config::Config;
use recipe_server::{api, build_router, db, telemetry, users, AppState};

#[derive(Parser)]
#[command(name = "recipe-server")]
#[command(about = "Recipe API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and serve HTTP (default)
    Serve,
    /// Poll the database until it accepts connections
    WaitForDb {
        /// Give up after this many attempts
        #[arg(long, default_value_t = 30)]
        attempts: u32,
    },
    /// Create an administrator account
    CreateSuperuser {
        #[arg(long, env = "SUPERUSER_EMAIL")]
        email: String,
        #[arg(long, env = "SUPERUSER_PASSWORD")]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Print the OpenAPI document and exit
    Openapi,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Openapi) = cli.command {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    telemetry::init_telemetry();

    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::WaitForDb { attempts } => {
            let url = config.database_url.clone();
            tokio::task::spawn_blocking(move || {
                db::wait_for_db(&url, attempts, Duration::from_secs(1))
            })
            .await??;
            Ok(())
        }
        Commands::CreateSuperuser {
            email,
            password,
            name,
        } => {
            let pool = db::create_pool(&config.database_url, 1)?;
            let mut conn = pool.get()?;
            let user = users::create_superuser(&mut conn, &email, &password, &name)?;
            println!("Created superuser {}", user);
            Ok(())
        }
        Commands::Openapi => Ok(()),
    }
}

async fn serve(config: Config) -> Result<()> {
    let bind_addr = config.bind_addr.clone();

    let state = AppState::from_config(config).context("Failed to open database")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
