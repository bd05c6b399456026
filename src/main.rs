use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use todo_api::{
    auth::AuthService,
    database,
    ip_filter::IpAllowList,
    jwt::{JwtConfig, JwtService},
    repositories::{TodoRepository, UserRepository},
    routes, seed,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting todo API service");

    // A missing signing secret aborts startup before anything else runs.
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(&jwt_config);

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    seed::init_schema(&pool).await?;

    let user_repository = UserRepository::new(pool.clone());
    let todo_repository = TodoRepository::new(pool.clone());
    seed::seed(&user_repository, &todo_repository).await?;

    let auth_service = AuthService::new(user_repository.clone(), jwt_service.clone());
    let allow_list = IpAllowList::from_env();

    let app_state = AppState {
        db_pool: pool,
        todo_repository,
        user_repository,
        auth_service,
        jwt_service,
        allow_list,
    };

    // Start the web server. ConnectInfo carries each caller's remote
    // address into the IP filter.
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Todo API listening on {}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Install the process-wide tracing subscriber. Logs go to the console by
/// default, or to the file named by `LOG_FILE` when set.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = std::fs::File::options()
                .create(true)
                .append(true)
                .open(&path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        Err(_) => {
            let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
