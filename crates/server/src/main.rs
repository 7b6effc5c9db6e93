//! Tweeter server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweeter_api::{AppState, CookieSettings};
use tweeter_common::{Config, LocalStorage};
use tweeter_core::{
    AccountService, LikeService, MediaService, NotificationService, ProfileService,
    SessionService, TweetService,
};
use tweeter_db::repositories::{
    LikeRepository, NotificationRepository, SessionRepository, TweetRepository,
    UserProfileRepository, UserRepository,
};

/// Slack on top of the upload limit for the rest of a multipart body.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-csrftoken"),
        ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tweeter=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting tweeter server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = tweeter_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    tweeter_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = UserProfileRepository::new(Arc::clone(&db));
    let tweet_repo = TweetRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));

    // Initialize services
    let session_service = SessionService::new(
        session_repo,
        user_repo.clone(),
        config.session.max_age_secs,
    );
    let purged = session_service.purge_expired().await?;
    if purged > 0 {
        info!(count = purged, "Purged expired sessions");
    }

    let storage = LocalStorage::new(
        config.media.base_path.clone(),
        config.media.base_url.clone(),
    );
    let media_service = MediaService::new(Arc::new(storage), config.media.max_upload_bytes);

    let state = AppState {
        account_service: AccountService::new(user_repo.clone(), profile_repo.clone()),
        session_service,
        tweet_service: TweetService::new(
            tweet_repo.clone(),
            like_repo.clone(),
            user_repo.clone(),
            profile_repo.clone(),
        ),
        like_service: LikeService::new(
            like_repo.clone(),
            tweet_repo.clone(),
            notification_repo.clone(),
        ),
        notification_service: NotificationService::new(
            notification_repo,
            tweet_repo.clone(),
            user_repo.clone(),
            profile_repo.clone(),
        ),
        profile_service: ProfileService::new(user_repo, profile_repo, tweet_repo, like_repo),
        media_service,
        cookies: CookieSettings::from_config(&config.session)?,
    };

    // Build router
    let body_limit = config.media.max_upload_bytes + BODY_LIMIT_SLACK;
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(tweeter_api::app(state));

    // Absolute media URLs point at another host
    let mount = config.media.base_url.trim_end_matches('/');
    if mount.starts_with('/') {
        app = app.nest_service(mount, ServeDir::new(&config.media.base_path));
        info!(path = %config.media.base_path.display(), mount, "Serving media files");
    }

    let app = app
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
