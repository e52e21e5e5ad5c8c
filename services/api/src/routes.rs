//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::gateway::GatewayError;
use crate::jobs;
use crate::jwt::TokenType;
use crate::middleware::actor_middleware;
use crate::models::{
    CheckoutResponse, CourseListResponse, CreateCourseRequest, CreateLessonRequest,
    CreatePaymentRequest, LessonListResponse, LoginRequest, PaymentListQuery, PaymentListResponse,
    RegisterRequest, UpdateCourseRequest, UpdateLessonRequest, UserResponse,
};
use crate::pagination::{Page, PageQuery};
use crate::policy::{self, Action, Actor};
use crate::state::AppState;
use crate::validation;

/// Response for token issuance
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request for token refresh
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/token/refresh/", post(refresh_token))
        .route("/courses/", get(list_courses).post(create_course))
        .route(
            "/courses/:id/",
            get(get_course)
                .put(update_course)
                .patch(update_course)
                .delete(delete_course),
        )
        .route("/courses/:id/subscribe/", post(subscribe))
        .route("/courses/:id/unsubscribe/", delete(unsubscribe))
        .route("/lessons/create/", post(create_lesson))
        .route("/lessons/", get(list_lessons))
        .route("/lessons/:id/", get(get_lesson))
        .route("/lessons/update/:id/", patch(update_lesson).put(update_lesson))
        .route("/lessons/delete/:id/", delete(delete_lesson))
        .route("/payments/", get(list_payments))
        .route("/payments/history/", get(list_payments))
        .route("/payments/create/", post(create_payment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            actor_middleware,
        ))
        .with_state(state)
}

/// Health check endpoint; reports database connectivity
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .is_ok();

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "coursehub-api",
        "database": database
    }))
}

/// Translate a policy denial: anonymous callers get 401, everyone else 403
fn ensure(actor: &Actor, action: Action) -> ApiResult<()> {
    if policy::allows(actor, action) {
        return Ok(());
    }
    match actor {
        Actor::Anonymous => Err(ApiError::Unauthorized),
        _ => Err(ApiError::Forbidden),
    }
}

/// Object-level counterpart of [`ensure`]
fn ensure_object(actor: &Actor, action: Action, owner_id: Uuid) -> ApiResult<()> {
    if policy::allows_object(actor, action, owner_id) {
        return Ok(());
    }
    match actor {
        Actor::Anonymous => Err(ApiError::Unauthorized),
        _ => Err(ApiError::Forbidden),
    }
}

/// The calling user's id, or 401 for anonymous callers
fn require_user(actor: &Actor) -> ApiResult<Uuid> {
    actor.user_id().ok_or(ApiError::Unauthorized)
}

/// Status and message for a subscribe call: a fresh subscription reports
/// Created, a repeated one succeeds idempotently
fn subscribe_status(created: bool) -> (StatusCode, &'static str) {
    if created {
        (StatusCode::CREATED, "subscribed")
    } else {
        (StatusCode::OK, "already subscribed")
    }
}

/// Status for an unsubscribe call: only the first call finds a row to
/// delete, a repeated one is NotFound
fn unsubscribe_status(deleted: bool) -> ApiResult<StatusCode> {
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Subscription not found".to_string()))
    }
}

/// Whether a repository error is a unique-constraint violation.
///
/// A concurrent duplicate insert can slip past any existence pre-check and
/// surface here through the database constraint instead.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.code().as_deref() == Some("23505"))
}

fn internal(context: &str) -> impl Fn(anyhow::Error) -> ApiError + '_ {
    move |e| {
        error!("{}: {}", context, e);
        ApiError::InternalServerError
    }
}

// --- Accounts ---

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_email(&payload.email).map_err(ApiError::Validation)?;
    validation::validate_password(&payload.password).map_err(ApiError::Validation)?;
    if payload.username.trim().is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }

    let existing = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(internal("Failed to look up user"))?;
    if existing.is_some() {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    // A concurrent registration with the same email can get past the
    // pre-check; the unique constraint reports it like the sequential case
    let user = state.user_repository.create(&payload).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Validation("Email already registered".to_string())
        } else {
            internal("Failed to create user")(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Issue access and refresh tokens for valid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(internal("Failed to look up user"))?
        .ok_or(ApiError::Unauthorized)?;

    if !user.is_active {
        return Err(ApiError::Unauthorized);
    }

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(internal("Failed to verify password"))?;
    if !valid {
        return Err(ApiError::Unauthorized);
    }

    state
        .user_repository
        .touch_last_login(user.id)
        .await
        .map_err(internal("Failed to record login"))?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(internal("Failed to generate access token"))?;
    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&user)
        .map_err(internal("Failed to generate refresh token"))?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized);
    }

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(internal("Failed to look up user"))?
        .ok_or(ApiError::Unauthorized)?;

    if !user.is_active {
        return Err(ApiError::Unauthorized);
    }

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(internal("Failed to generate access token"))?;

    Ok(Json(RefreshTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

// --- Courses ---

/// List courses visible to the caller
pub async fn list_courses(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = Page::from(query);
    let scope = policy::course_scope(&actor);

    if scope == policy::Scope::Nothing {
        return Ok(Json(CourseListResponse {
            items: vec![],
            page: page.number,
            page_size: page.size,
            total: 0,
        }));
    }

    let (items, total) = state
        .course_repository
        .list(scope.owner_filter(), page)
        .await
        .map_err(internal("Failed to list courses"))?;

    Ok(Json(CourseListResponse {
        items,
        page: page.number,
        page_size: page.size,
        total,
    }))
}

/// Create a course owned by the caller
pub async fn create_course(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateCourseRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure(&actor, Action::Create)?;
    let owner_id = require_user(&actor)?;

    let course = state
        .course_repository
        .create(owner_id, &payload)
        .await
        .map_err(internal("Failed to create course"))?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Course detail with lesson count and subscription status
pub async fn get_course(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let detail = state
        .course_repository
        .detail(id, actor.user_id())
        .await
        .map_err(internal("Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    if !policy::course_scope(&actor).permits(detail.course.owner_id) {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    Ok(Json(detail))
}

/// Update a course and notify its subscribers
pub async fn update_course(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> ApiResult<impl IntoResponse> {
    let course = state
        .course_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    ensure_object(&actor, Action::Update, course.owner_id)?;

    let updated = state
        .course_repository
        .update(id, &payload)
        .await
        .map_err(internal("Failed to update course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    // Fan out update emails off the request path
    tokio::spawn(jobs::send_course_update_emails(state.clone(), id));

    Ok(Json(updated))
}

/// Delete a course; its lessons and subscriptions cascade away
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let course = state
        .course_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    ensure_object(&actor, Action::Delete, course.owner_id)?;

    state
        .course_repository
        .delete(id)
        .await
        .map_err(internal("Failed to delete course"))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Subscriptions ---

/// Subscribe the caller to a course; idempotent
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user_id = require_user(&actor)?;

    state
        .course_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let created = state
        .subscription_repository
        .subscribe(user_id, id)
        .await
        .map_err(internal("Failed to subscribe"))?;

    let (status, message) = subscribe_status(created);
    Ok((status, Json(json!({"message": message}))))
}

/// Unsubscribe the caller from a course
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user_id = require_user(&actor)?;

    let deleted = state
        .subscription_repository
        .unsubscribe(user_id, id)
        .await
        .map_err(internal("Failed to unsubscribe"))?;

    unsubscribe_status(deleted)
}

// --- Lessons ---

/// Create a lesson owned by the caller
pub async fn create_lesson(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure(&actor, Action::Create)?;
    let owner_id = require_user(&actor)?;

    if let Some(url) = &payload.video_url {
        validation::validate_video_url(url).map_err(ApiError::Validation)?;
    }

    state
        .course_repository
        .find_by_id(payload.course_id)
        .await
        .map_err(internal("Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let lesson = state
        .lesson_repository
        .create(owner_id, &payload)
        .await
        .map_err(internal("Failed to create lesson"))?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// List lessons visible to the caller; anonymous callers get an empty list
pub async fn list_lessons(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = Page::from(query);
    let scope = policy::lesson_scope(&actor);

    if scope == policy::Scope::Nothing {
        return Ok(Json(LessonListResponse {
            items: vec![],
            page: page.number,
            page_size: page.size,
            total: 0,
        }));
    }

    let (items, total) = state
        .lesson_repository
        .list(scope.owner_filter(), page)
        .await
        .map_err(internal("Failed to list lessons"))?;

    Ok(Json(LessonListResponse {
        items,
        page: page.number,
        page_size: page.size,
        total,
    }))
}

/// Lesson detail
pub async fn get_lesson(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let lesson = state
        .lesson_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    if !policy::lesson_scope(&actor).permits(lesson.owner_id) {
        return Err(ApiError::NotFound("Lesson not found".to_string()));
    }

    Ok(Json(lesson))
}

/// Update a lesson
pub async fn update_lesson(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    let lesson = state
        .lesson_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    ensure_object(&actor, Action::Update, lesson.owner_id)?;

    if let Some(url) = &payload.video_url {
        validation::validate_video_url(url).map_err(ApiError::Validation)?;
    }

    let updated = state
        .lesson_repository
        .update(id, &payload)
        .await
        .map_err(internal("Failed to update lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a lesson; moderators are denied
pub async fn delete_lesson(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let lesson = state
        .lesson_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    ensure_object(&actor, Action::Delete, lesson.owner_id)?;

    state
        .lesson_repository
        .delete(id)
        .await
        .map_err(internal("Failed to delete lesson"))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Payments ---

/// List payments with date/method/course/lesson filters
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaymentListQuery>,
) -> ApiResult<impl IntoResponse> {
    require_user(&actor)?;

    let page = Page::from(query.page_query());
    let scope = policy::payment_scope(&actor);

    let (items, total) = state
        .payment_repository
        .list(&query, scope.owner_filter(), page)
        .await
        .map_err(internal("Failed to list payments"))?;

    Ok(Json(PaymentListResponse {
        items,
        page: page.number,
        page_size: page.size,
        total,
    }))
}

fn gateway_failure(payment_id: Uuid, err: GatewayError) -> ApiError {
    warn!("Gateway call failed for payment {}: {}", payment_id, err);
    ApiError::from(err)
}

/// Record a payment and open a gateway checkout session.
///
/// The payment row is persisted before the gateway is involved; a gateway
/// failure leaves it in place without a session URL and surfaces as 503.
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = require_user(&actor)?;

    if payload.amount.is_sign_negative() {
        return Err(ApiError::Validation(
            "Amount must be non-negative".to_string(),
        ));
    }

    let product_name = match (payload.paid_course_id, payload.paid_lesson_id) {
        (Some(course_id), _) => {
            let course = state
                .course_repository
                .find_by_id(course_id)
                .await
                .map_err(internal("Failed to load course"))?
                .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
            format!("Course: {}", course.title)
        }
        (None, Some(lesson_id)) => {
            let lesson = state
                .lesson_repository
                .find_by_id(lesson_id)
                .await
                .map_err(internal("Failed to load lesson"))?
                .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
            format!("Lesson: {}", lesson.title)
        }
        (None, None) => "CourseHub payment".to_string(),
    };

    let payment = state
        .payment_repository
        .create(user_id, &payload)
        .await
        .map_err(internal("Failed to create payment"))?;

    let product_id = state
        .gateway
        .create_product(&product_name)
        .await
        .map_err(|e| gateway_failure(payment.id, e))?;

    let price_id = state
        .gateway
        .create_price(&product_id, payment.amount)
        .await
        .map_err(|e| gateway_failure(payment.id, e))?;

    let session_url = state
        .gateway
        .create_checkout_session(&price_id)
        .await
        .map_err(|e| gateway_failure(payment.id, e))?;

    state
        .payment_repository
        .attach_session_url(payment.id, &session_url)
        .await
        .map_err(internal("Failed to store session URL"))?;

    info!("Payment {} checkout session created", payment.id);

    Ok((StatusCode::CREATED, Json(CheckoutResponse { url: session_url })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn first_subscribe_reports_created() {
        assert_eq!(
            subscribe_status(true),
            (StatusCode::CREATED, "subscribed")
        );
    }

    #[test]
    fn repeated_subscribe_succeeds_idempotently() {
        assert_eq!(
            subscribe_status(false),
            (StatusCode::OK, "already subscribed")
        );
    }

    #[test]
    fn first_unsubscribe_reports_no_content() {
        assert!(matches!(
            unsubscribe_status(true),
            Ok(StatusCode::NO_CONTENT)
        ));
    }

    #[test]
    fn repeated_unsubscribe_is_not_found() {
        assert!(matches!(
            unsubscribe_status(false),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn payment_filters_parse_from_query_values() {
        let query: PaymentListQuery = serde_json::from_value(json!({
            "min_date": "2024-01-01",
            "max_date": "2024-06-30",
            "payment_method": "cash",
            "course": "8e2f0c80-54a7-4f6e-9f2e-0a4dbb9f6c11",
            "page": 2,
            "page_size": 25
        }))
        .unwrap();

        assert_eq!(
            query.min_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(
            query.max_date,
            Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
        );
        assert_eq!(query.payment_method, Some(crate::models::PaymentMethod::Cash));
        assert!(query.course.is_some());
        assert_eq!(query.lesson, None);

        let page = Page::from(query.page_query());
        assert_eq!(page.number, 2);
        assert_eq!(page.size, 25);
    }

    #[test]
    fn empty_payment_filters_default_cleanly() {
        let query: PaymentListQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.min_date, None);
        assert_eq!(query.payment_method, None);

        let page = Page::from(query.page_query());
        assert_eq!(page.number, 1);
        assert_eq!(page.size, 10);
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&anyhow::anyhow!("boom")));
        assert!(!is_unique_violation(&anyhow::Error::from(
            sqlx::Error::RowNotFound
        )));
    }
}
