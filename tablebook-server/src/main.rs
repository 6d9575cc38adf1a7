mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::db::{MemoryStore, PgStore, Store};
use crate::services::token::TokenKeys;

#[derive(Clone)]
pub struct AppState {
    /// Shared store handle; services borrow it per call.
    pub store: Arc<dyn Store>,
    pub keys: TokenKeys,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::register,
        routes::auth::login,
        routes::auth::profile,
        routes::auth::user_id,
        routes::users::list_users,
        routes::users::get_user,
        routes::users::create_user,
        routes::users::update_user,
        routes::users::delete_user,
        routes::restaurants::list_restaurants,
        routes::restaurants::get_restaurant,
        routes::restaurants::create_restaurant,
        routes::restaurants::update_restaurant,
        routes::restaurants::delete_restaurant,
        routes::reservations::list_reservations,
        routes::reservations::get_reservation,
        routes::reservations::create_reservation,
        routes::reservations::update_reservation,
        routes::reservations::delete_reservation,
        routes::health::health,
    ),
    components(schemas(
        error::ErrorBody,
        models::MessageResponse,
        models::user::RegisterRequest,
        models::user::RegisterResponse,
        models::user::LoginRequest,
        models::user::LoginResponse,
        models::user::UserIdResponse,
        models::user::UserResponse,
        models::user::UserProfile,
        models::restaurant::Restaurant,
        models::restaurant::RestaurantRequest,
        models::restaurant::RestaurantCreated,
        models::reservation::Reservation,
        models::reservation::ProfileReservation,
        models::reservation::ReservationRequest,
        models::reservation::ReservationCreated,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and the caller's profile"),
        (name = "Users", description = "User accounts"),
        (name = "Restaurants", description = "Restaurant catalogue"),
        (name = "Reservations", description = "Table bookings owned by the caller"),
        (name = "Health", description = "Liveness")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                ),
            ),
        );
    }
}

async fn open_store(config: &config::Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(&config.database_url, config.db_max_connections).await?;
    store.migrate().await?;
    store.ping().await?;
    tracing::info!("Connected to database");
    Ok(Arc::new(store))
}

fn cors_layer(origins: &str) -> CorsLayer {
    if origins.is_empty() || origins == "*" {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(tower_http::cors::Any)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    let store = open_store(&config).await?;

    let state = AppState {
        store,
        keys: TokenKeys::new(&config.jwt_secret, config.token_ttl_secs),
    };

    let app = routes::api_router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Listening on {}", config.listen_addr);
    tracing::info!("Swagger UI at http://{}/docs/", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tablebook_server=debug,tower_http=debug")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/register",
            "/auth/login",
            "/auth/profile",
            "/auth/userid",
            "/auth/users/{id}",
            "/auth/restaurants/{id}",
            "/auth/reservations/{id}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
