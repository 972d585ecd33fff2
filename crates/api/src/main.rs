use std::net::SocketAddr;
use std::sync::Arc;

use arogya_core::ports::{NotificationPort, Summarizer};
use arogya_delivery::{
    GeminiSummarizer, LogNotifier, SmsConfig, SummarizerConfig, TwilioNotifier,
    UnconfiguredSummarizer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arogya_api::config::ServerConfig;
use arogya_api::router::build_app_router;
use arogya_api::seed::DemoSeed;
use arogya_api::state::{AppState, Stores};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arogya_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        otp_ttl_secs = config.access.otp_ttl_secs,
        "Loaded server configuration"
    );
    let demo_seed = DemoSeed::from_env();

    // --- Persistence ---
    let stores = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = arogya_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            arogya_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            arogya_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            if let Some(seed) = &demo_seed {
                seed.apply_postgres(&pool)
                    .await
                    .expect("Failed to seed demo data");
            }
            Stores::postgres(pool)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on exit)");
            let (stores, owners, users) = Stores::memory();
            if let Some(seed) = &demo_seed {
                seed.apply_memory(&owners, &users)
                    .await
                    .expect("Failed to seed demo data");
            }
            stores
        }
    };

    // --- Delivery adapters ---
    let notifier: Arc<dyn NotificationPort> = match SmsConfig::from_env() {
        Some(sms) => {
            tracing::info!("Twilio SMS delivery enabled");
            Arc::new(TwilioNotifier::new(sms).expect("Failed to build SMS HTTP client"))
        }
        None => {
            tracing::warn!("TWILIO_SID not set; OTPs will be logged instead of sent");
            Arc::new(LogNotifier)
        }
    };

    let summarizer: Arc<dyn Summarizer> = match SummarizerConfig::from_env() {
        Some(ai) => {
            tracing::info!(model = %ai.model, "Gemini summarization enabled");
            Arc::new(GeminiSummarizer::new(ai).expect("Failed to build summarizer HTTP client"))
        }
        None => {
            tracing::warn!("GEMINI_KEY not set; summaries will report the missing key");
            Arc::new(UnconfiguredSummarizer)
        }
    };

    // --- App state + router ---
    let state = AppState::new(stores, notifier, summarizer, config.clone());
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
