use alertwatch::{ AppError, Config, Result };
use migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{ cors::CorsLayer, trace::TraceLayer };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

use alertwatch::alert_checker::AlertChecker;
use alertwatch::api::{ self, AppState };
use alertwatch::checkers::CheckerRegistry;
use alertwatch::db::{ AlertRepository, NewsRepository };
use alertwatch::scheduler::Scheduler;
use alertwatch::services::{ AlertRuleService, CoinGeckoClient };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "alertwatch=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!(
        interval_secs = config.alert_check_interval_secs,
        cooldown_secs = config.alert_cooldown_secs,
        scheduler_enabled = config.scheduler_enabled,
        "Starting alertwatch"
    );

    // Initialize database connection
    let db = sea_orm::Database::connect(&config.database_url).await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations completed successfully");

    let alert_store = Arc::new(AlertRepository::new(db.clone()));
    let news_store = Arc::new(NewsRepository::new(db));
    let market_data = Arc::new(CoinGeckoClient::new(&config)?);

    let registry = CheckerRegistry::standard(market_data, news_store, config.fetch_timeout());
    tracing::info!(kinds = ?registry.kinds(), "Rule checkers registered");
    let checker = Arc::new(
        AlertChecker::new(alert_store.clone(), registry, config.alert_cooldown())
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = if config.scheduler_enabled {
        let scheduler = Scheduler::new(checker, config.check_interval());
        Some(tokio::spawn(scheduler.start(shutdown_rx)))
    } else {
        tracing::info!("Alert scheduler disabled");
        None
    };

    let app_state = AppState::new(Arc::new(AlertRuleService::new(alert_store)));

    let app = api
        ::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    axum
        ::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Alert scheduler task failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
