pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod schemas;
pub mod stripe;
pub mod validation;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AllowedOrigins, CheckoutUrls};
use crate::schemas::CategoryEvent;
use crate::stripe::StripeClient;

/// Shared collaborators, constructed once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub stripe: StripeClient,
    pub checkout: CheckoutUrls,
    pub category_events: broadcast::Sender<CategoryEvent>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::payments::create_payment,
        handlers::payments::confirm_payment,
        handlers::payments::get_donators,
        handlers::payments::get_donations_by_user,
        handlers::category::get_categories,
        handlers::category::add_category,
        handlers::category::update_category,
        handlers::category::delete_category,
    ),
    components(schemas(
        handlers::HealthStatus,
        handlers::DbPoolStats,
        handlers::payments::CreatePaymentRequest,
        handlers::payments::ConfirmPaymentRequest,
        handlers::category::CategoryRequest,
        db::models::Donor,
        db::models::Category,
    )),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Payments", description = "Checkout session creation and confirmation"),
        (name = "Categories", description = "Donation categories with real-time broadcast"),
    )
)]
pub struct ApiDoc;

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    match origins {
        AllowedOrigins::Any => CorsLayer::permissive(),
        AllowedOrigins::List(list) => {
            let parsed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(parsed)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
    }
}

pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/payments/create-payment",
            post(handlers::payments::create_payment),
        )
        .route(
            "/api/payments/confirm-payment",
            post(handlers::payments::confirm_payment),
        )
        .route(
            "/api/payments/get-donators",
            get(handlers::payments::get_donators),
        )
        .route(
            "/api/payments/get-donations-by-user",
            get(handlers::payments::get_donations_by_user),
        )
        .route("/api/category/get", get(handlers::category::get_categories))
        .route("/api/category/add", post(handlers::category::add_category))
        .route(
            "/api/category/update/:id",
            put(handlers::category::update_category),
        )
        .route(
            "/api/category/delete/:id",
            delete(handlers::category::delete_category),
        )
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/update-profile", put(handlers::auth::update_profile))
        .route("/api/auth/users", get(handlers::auth::get_users))
        .route("/api/auth/logout/:user_id", get(handlers::auth::logout))
        .route("/api/prayer/get", get(handlers::prayer::get_prayers))
        .route(
            "/api/prayer/addPrayerTime",
            post(handlers::prayer::add_prayer_time),
        )
        .route(
            "/api/prayer/updatePrayerTime",
            put(handlers::prayer::update_prayer_time),
        )
        .route(
            "/api/prayer/getPrayerTimes",
            get(handlers::prayer::get_prayer_times),
        )
        .route("/api/prayer/:id", delete(handlers::prayer::delete_prayer))
        .route("/ws", get(handlers::ws::ws_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}
