use rusty_lending::{
    adapters::http::stock_client::HttpStockClient,
    adapters::kafka::event_publisher::KafkaEventPublisher,
    adapters::memory::{
        book_catalog::InMemoryBookCatalog, user_directory::InMemoryUserDirectory,
    },
    adapters::postgres::loan_store::PostgresLoanStore,
    api::{handlers::AppState, router::create_router},
    application::loan::{ServiceDependencies, run_overdue_scan, run_reminder_scan},
    scheduler::Scheduler,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_lending=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = env_or("DATABASE_URL", "postgres://localhost/lending");
    let stock_service_url = env_or("STOCK_SERVICE_URL", "http://localhost:8081");
    let kafka_brokers = env_or("KAFKA_BROKERS", "localhost:9092");
    let loan_events_topic = env_or("LOAN_EVENTS_TOPIC", "loan-events");

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Initialize adapters
    let loan_store = Arc::new(PostgresLoanStore::new(pool.clone()));
    let stock_client = Arc::new(
        HttpStockClient::new(stock_service_url, Duration::from_secs(3))
            .expect("Failed to build stock service client"),
    );
    let event_publisher = Arc::new(
        KafkaEventPublisher::new(&kafka_brokers, loan_events_topic)
            .expect("Failed to build Kafka producer"),
    );
    // User directory and book catalog integrations land with the identity
    // service rollout; in-memory stand-ins until then.
    let user_directory = Arc::new(InMemoryUserDirectory::new());
    let book_catalog = Arc::new(InMemoryBookCatalog::new());

    // Create service dependencies
    let service_deps = ServiceDependencies {
        stock_client,
        loan_store,
        user_directory,
        book_catalog,
        event_publisher,
    };

    // Start the scanners. Each job owns a run slot, so a slow scan delays
    // the next tick instead of overlapping with it.
    let overdue_period = env_or("OVERDUE_SCAN_SECS", "60")
        .parse()
        .map(Duration::from_secs)
        .expect("OVERDUE_SCAN_SECS must be an integer");
    let reminder_period = env_or("REMINDER_SCAN_SECS", "86400")
        .parse()
        .map(Duration::from_secs)
        .expect("REMINDER_SCAN_SECS must be an integer");

    let mut scheduler = Scheduler::new();

    let overdue_deps = service_deps.clone();
    scheduler.spawn_repeating("overdue-scan", overdue_period, move || {
        let deps = overdue_deps.clone();
        async move {
            match run_overdue_scan(&deps, chrono::Utc::now().date_naive()).await {
                Ok(count) if count > 0 => {
                    tracing::info!(count, "overdue scan transitioned loans");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "overdue scan failed"),
            }
        }
    });

    let reminder_deps = service_deps.clone();
    scheduler.spawn_repeating("reminder-scan", reminder_period, move || {
        let deps = reminder_deps.clone();
        async move {
            match run_reminder_scan(&deps, chrono::Utc::now().date_naive()).await {
                Ok(count) if count > 0 => {
                    tracing::info!(count, "reminder scan emitted events");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "reminder scan failed"),
            }
        }
    });

    // Create application state and router
    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    // Server configuration
    let port = env_or("PORT", "3000");
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server; stop scanners once it exits
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    scheduler.shutdown();
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c");
    tracing::info!("Shutdown signal received");
}
