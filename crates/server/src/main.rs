//! Shoutly server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use shoutly_api::{AppState, middleware::auth_middleware, router as api_router};
use shoutly_common::{
    AuthTokens, Config,
    storage::{StorageConfig, build_backend},
};
use shoutly_core::{
    ActivityLogService, AdminService, BotCheckService, CatalogService, CreatorService,
    NowPaymentsProvider, OrderService, PaymentProvider, SettingsService, UserService,
    WithdrawalService, spawn_retention_task,
};
use shoutly_db::repositories::{
    ActivityLogRepository, AdminRepository, CreatorRepository, OrderRepository,
    ShoutoutRepository, ShoutoutTypeRepository, SiteSettingRepository, UserRepository,
    WithdrawalRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoutly=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting shoutly server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = shoutly_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    shoutly_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let creator_repo = CreatorRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));
    let shoutout_repo = ShoutoutRepository::new(Arc::clone(&db));
    let type_repo = ShoutoutTypeRepository::new(Arc::clone(&db));
    let withdrawal_repo = WithdrawalRepository::new(Arc::clone(&db));
    let admin_repo = AdminRepository::new(Arc::clone(&db));
    let setting_repo = SiteSettingRepository::new(Arc::clone(&db));

    // Shared infrastructure services
    let activity = ActivityLogService::new(ActivityLogRepository::new(Arc::clone(&db)));
    let bot_check = BotCheckService::new(&config.bot_check);
    let storage = build_backend(&StorageConfig::from_settings(&config.storage)?)?;
    let provider: Arc<dyn PaymentProvider> =
        Arc::new(NowPaymentsProvider::new(&config.payment, &config.server.url));

    // Initialize domain services
    let user_service = UserService::new(
        user_repo.clone(),
        activity.clone(),
        bot_check.clone(),
        Arc::clone(&storage),
        &config,
    );
    let creator_service = CreatorService::new(
        creator_repo.clone(),
        order_repo.clone(),
        shoutout_repo.clone(),
        withdrawal_repo.clone(),
        activity.clone(),
        bot_check,
        Arc::clone(&storage),
        &config,
    );
    let catalog_service = CatalogService::new(
        shoutout_repo.clone(),
        type_repo.clone(),
        creator_repo.clone(),
        activity.clone(),
    );
    let order_service = OrderService::new(
        Arc::clone(&db),
        order_repo.clone(),
        shoutout_repo.clone(),
        type_repo,
        user_repo.clone(),
        creator_repo.clone(),
        activity.clone(),
        provider,
        storage,
        &config,
    );
    let withdrawal_service = WithdrawalService::new(
        Arc::clone(&db),
        withdrawal_repo.clone(),
        creator_repo.clone(),
        activity.clone(),
    );
    let admin_service = AdminService::new(
        admin_repo,
        user_repo,
        creator_repo,
        order_repo,
        shoutout_repo,
        withdrawal_repo,
        activity.clone(),
        &config,
    );
    let settings_service = SettingsService::new(setting_repo, activity.clone());

    // Seed the catalog type table and the first admin account
    catalog_service.seed_default_types().await?;
    if let Some(email) = config.bootstrap.admin_email.as_deref()
        && let Some(password) = config.bootstrap.admin_password.as_deref()
        && admin_service.bootstrap(email, password).await?
    {
        info!(email, "Bootstrapped initial admin account");
    }

    // Background pruning of the activity log
    let _retention = spawn_retention_task(activity, config.retention);

    // Create app state
    let state = AppState {
        user_service,
        creator_service,
        catalog_service,
        order_service,
        withdrawal_service,
        admin_service,
        settings_service,
        tokens: AuthTokens::new(&config.auth),
    };

    // Build router. Uploads go directly to object storage via presigned
    // URLs, so a small request-body cap is enough for the JSON API.
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
