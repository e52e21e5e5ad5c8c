//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::gateway::PaymentGateway;
use crate::jwt::JwtService;
use crate::mailer::Mailer;
use crate::repositories::{
    CourseRepository, LessonRepository, PaymentRepository, SubscriptionRepository, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: AppConfig,
    pub user_repository: UserRepository,
    pub course_repository: CourseRepository,
    pub lesson_repository: LessonRepository,
    pub subscription_repository: SubscriptionRepository,
    pub payment_repository: PaymentRepository,
    pub jwt_service: Arc<JwtService>,
    pub gateway: PaymentGateway,
    pub mailer: Mailer,
}
