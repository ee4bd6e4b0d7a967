//! Microloan API server
//!
//! Main entry point for the microloan backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microloan_api::{AppState, create_router};
use microloan_core::application::ApplicationService;
use microloan_core::payment::{PaymentGateway, StripeGateway};
use microloan_db::{ApplicationRepository, connect_with};
use microloan_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microloan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let gateway: Option<Arc<dyn PaymentGateway>> =
        match StripeGateway::from_config(&config.payments)? {
            Some(gateway) => {
                info!(
                    api_base = %config.payments.api_base,
                    currency = %config.payments.currency,
                    "Payment gateway configured"
                );
                Some(Arc::new(gateway))
            }
            None => {
                warn!("No payment secret key configured; card payments are disabled");
                None
            }
        };

    let applications = ApplicationService::new(
        Arc::new(ApplicationRepository::new(db)),
        gateway,
        config.payments.clone(),
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .context("access token expiry out of range")?,
    });

    let state = AppState {
        applications,
        jwt_service: Arc::new(jwt_service),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
