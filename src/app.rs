use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Uri},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{Argon2PasswordService, HashError, PasswordService, TokenService};
use crate::config::AppConfig;
use crate::database::{CredentialStore, EntryStore, MemoryStore, PgStore};
use crate::error::ApiError;
use crate::handlers::{protected, public, system};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AccountService, AuthService, EntryService};

/// The two store ports, usually backed by the same database.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn CredentialStore>,
    pub entries: Arc<dyn EntryStore>,
}

impl Stores {
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            entries: Arc::new(store),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = PgStore::new(pool);
        Self {
            users: Arc::new(store.clone()),
            entries: Arc::new(store),
        }
    }
}

/// Shared, immutable request-handling state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn CredentialStore>,
    pub auth: Arc<AuthService>,
    pub entries: Arc<EntryService>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Wire the services with Argon2id hashing sized from `config.security`.
    pub fn new(config: AppConfig, stores: Stores) -> Result<Self, HashError> {
        let passwords = Arc::new(Argon2PasswordService::from_config(&config.security)?);
        Ok(Self::with_passwords(config, stores, passwords))
    }

    pub fn with_passwords(config: AppConfig, stores: Stores, passwords: Arc<dyn PasswordService>) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.security));

        Self {
            auth: Arc::new(AuthService::new(stores.users.clone(), passwords, tokens.clone())),
            entries: Arc::new(EntryService::new(stores.entries)),
            accounts: Arc::new(AccountService::new(stores.users.clone())),
            users: stores.users,
            tokens,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = public_routes()
        .merge(protected_routes(state.clone()));

    let mut app = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security.cors_origins));

    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{account, entries};

    Router::new()
        .route(
            "/entries",
            get(entries::collection::list).post(entries::collection::create),
        )
        .route(
            "/entries/:id",
            get(entries::record::get)
                .put(entries::record::update)
                .delete(entries::record::delete),
        )
        .route(
            "/account/reminder",
            get(account::reminder::get).put(account::reminder::put),
        )
        // route_layer: runs before body extraction, and unmatched paths still 404
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state(store: MemoryStore) -> AppState {
        test_state_with(store, &[])
    }

    fn test_state_with(store: MemoryStore, overrides: &[(&str, &str)]) -> AppState {
        let config = AppConfig::from_lookup(|name| {
            if let Some((_, value)) = overrides.iter().find(|(key, _)| *key == name) {
                return Some(value.to_string());
            }
            match name {
                "JWT_SECRET" => Some("router-test-secret".to_string()),
                "SECURITY_HASH_MEMORY_KIB" => Some("1024".to_string()),
                "SECURITY_HASH_ITERATIONS" => Some("1".to_string()),
                "API_ENABLE_REQUEST_LOGGING" => Some("false".to_string()),
                _ => None,
            }
        })
        .unwrap();
        AppState::new(config, Stores::memory(store)).unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let request = Request::get("/api/v1/nope").body(Body::empty()).unwrap();
        let (status, body) = send(test_state(MemoryStore::new()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn auth_runs_before_body_parsing() {
        let request = Request::post("/api/v1/entries")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(test_state(MemoryStore::new()), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn health_reflects_store() {
        let store = MemoryStore::new();
        let state = test_state(store.clone());

        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(state.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");

        store.set_offline(true);
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, _) = send(state, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn malformed_json_is_422() {
        let state = test_state(MemoryStore::new());
        let request = Request::post("/api/v1/auth/login")
            .header("content-type", "application/json")
            .body(Body::from("{\"email\":"))
            .unwrap();
        let (status, body) = send(state, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["field_errors"]["body"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let state = test_state_with(MemoryStore::new(), &[("API_MAX_REQUEST_SIZE_BYTES", "64")]);
        let payload = serde_json::json!({
            "email": "big@example.com",
            "password": "x".repeat(256),
        });
        let request = Request::post("/api/v1/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send(state, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn undecodable_id_is_json_422() {
        let state = test_state(MemoryStore::new());
        let token = state.tokens.issue(1).unwrap().token;
        let request = Request::get("/api/v1/entries/%FF")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(state, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["field_errors"]["id"].is_string());
    }
}
