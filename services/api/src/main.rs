use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod gateway;
mod jobs;
mod jwt;
mod mailer;
mod middleware;
mod models;
mod pagination;
mod policy;
mod repositories;
mod routes;
mod state;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool};

use crate::config::AppConfig;
use crate::gateway::{GatewayConfig, PaymentGateway};
use crate::jwt::{JwtConfig, JwtService};
use crate::mailer::{Mailer, MailerConfig};
use crate::repositories::{
    CourseRepository, LessonRepository, PaymentRepository, SubscriptionRepository, UserRepository,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting CourseHub API service");

    let config = AppConfig::from_env();

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = Arc::new(JwtService::new(&jwt_config)?);

    let gateway = PaymentGateway::new(GatewayConfig::from_env());
    let mailer = Mailer::new(MailerConfig::from_env())?;

    let state = AppState {
        db_pool: pool.clone(),
        config: config.clone(),
        user_repository: UserRepository::new(pool.clone()),
        course_repository: CourseRepository::new(pool.clone()),
        lesson_repository: LessonRepository::new(pool.clone()),
        subscription_repository: SubscriptionRepository::new(pool.clone()),
        payment_repository: PaymentRepository::new(pool),
        jwt_service,
        gateway,
        mailer,
    };

    let _scheduler = jobs::start_scheduler(state.clone()).await?;

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
