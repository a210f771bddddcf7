use dashboard_portal::{
    AppState,
    access::RoleAccessTable,
    config::{AppConfig, Env},
    create_router,
    identity::SupabaseCredentialValidator,
    navigation::Navigator,
    registry::{CatalogPageLoader, PageLoader},
    repository::PostgresRoleResolver,
    store::{InMemorySessionStore, SessionStore, SessionStoreState},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, logging, the access table, the page registry and the
/// identity collaborators, then serves the navigation API.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dashboard_portal=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Role access table
    let table = match &config.role_access_file {
        Some(path) => RoleAccessTable::from_json_file(path)
            .expect("FATAL: ROLE_ACCESS_FILE could not be loaded"),
        None => RoleAccessTable::standard(),
    };
    tracing::info!(roles = table.roles().len(), "role access table ready");

    // 4. Page registry. A loader failure is rendered to users, not fatal.
    let loader = match &config.pages_file {
        Some(path) => CatalogPageLoader::from_file(path.clone()),
        None => CatalogPageLoader::built_in(),
    };
    let pages = loader.load();

    // 5. Identity collaborators
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&config.db_url)
        .expect("FATAL: invalid DATABASE_URL.");
    let resolver = Arc::new(PostgresRoleResolver::new(pool));
    let validator = Arc::new(SupabaseCredentialValidator::new(
        &config.supabase_url,
        &config.supabase_key,
    ));

    let navigator = Arc::new(Navigator::new(Arc::new(table), pages, validator, resolver));

    // 6. Session store + idle purge
    let store = Arc::new(InMemorySessionStore::new());
    let sessions = store.clone() as SessionStoreState;
    let max_idle = chrono::Duration::seconds(config.session_ttl_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            store.purge_idle(max_idle).await;
        }
    });

    // 7. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        sessions,
        navigator,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: could not bind listener");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}
