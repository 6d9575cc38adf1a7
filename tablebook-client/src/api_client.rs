use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::{API_TIMEOUT, MAX_PARTY, MIN_PARTY};
use crate::error::ClientError;
use crate::session::{is_token_live, SessionStore};
use crate::types::*;

pub struct ApiClient<S> {
    client: Client,
    base_url: String,
    session: S,
}

impl<S: SessionStore> ApiClient<S> {
    pub fn new(base_url: &str, session: S) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, session, API_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, session: S, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Session ─────────────────────────────────────────────────────────

    /// True when a token is stored and has not yet expired.
    pub fn is_authenticated(&self) -> bool {
        match self.session.token() {
            Ok(Some(token)) => is_token_live(&token, chrono::Utc::now().timestamp()),
            _ => false,
        }
    }

    /// The stored token, if still live. A lapsed token is dropped so the
    /// caller lands on login without a wasted round trip.
    fn live_token(&self) -> Result<String, ClientError> {
        let token = self.session.token()?;
        match token {
            Some(token) if is_token_live(&token, chrono::Utc::now().timestamp()) => Ok(token),
            Some(_) => {
                log::info!("Stored token has expired, clearing session");
                self.session.clear()?;
                Err(ClientError::AuthRequired)
            }
            None => Err(ClientError::AuthRequired),
        }
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()
    }

    // ── Auth ────────────────────────────────────────────────────────────

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let resp = self
            .client
            .post(self.url("/register"))
            .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        let body: RegisterResponse = read_json(resp).await?;
        self.session.save_user_id(body.user_id)?;
        Ok(body)
    }

    /// Log in, persist the token, then resolve and persist the user id. If the
    /// id cannot be resolved the session is cleared again.
    pub async fn login(&self, email: &str, password: &str) -> Result<i64, ClientError> {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: LoginResponse = read_json(resp).await?;
        self.session.save_token(&body.token)?;

        let user_id = match self.user_id().await {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Could not resolve user id after login: {}", e);
                self.session.clear()?;
                return Err(e);
            }
        };
        if let Err(e) = self.session.save_user_id(user_id) {
            self.session.clear()?;
            return Err(e);
        }
        log::info!("Logged in as user {}", user_id);
        Ok(user_id)
    }

    pub async fn user_id(&self) -> Result<i64, ClientError> {
        let body: UserIdResponse = self.authed(self.client.get(self.url("/userid"))).await?;
        Ok(body.user_id)
    }

    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        self.authed(self.client.get(self.url("/profile"))).await
    }

    // ── Restaurants ─────────────────────────────────────────────────────

    pub async fn restaurants(&self) -> Result<Vec<Restaurant>, ClientError> {
        let resp = self.client.get(self.url("/restaurants")).send().await?;
        read_json(resp).await
    }

    pub async fn restaurant(&self, id: i64) -> Result<Restaurant, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/restaurants/{}", id)))
            .send()
            .await?;
        read_json(resp).await
    }

    // ── Reservations ────────────────────────────────────────────────────

    pub async fn book(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        people_count: i32,
    ) -> Result<ReservationCreated, ClientError> {
        let body = reservation_body(restaurant_id, date, time, people_count)?;
        self.authed(self.client.post(self.url("/reservations")).json(&body))
            .await
    }

    pub async fn update_reservation(
        &self,
        id: i64,
        restaurant_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        people_count: i32,
    ) -> Result<MessageResponse, ClientError> {
        let body = reservation_body(restaurant_id, date, time, people_count)?;
        self.authed(
            self.client
                .put(self.url(&format!("/reservations/{}", id)))
                .json(&body),
        )
        .await
    }

    pub async fn cancel_reservation(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.authed(self.client.delete(self.url(&format!("/reservations/{}", id))))
            .await
    }

    /// Send with the bearer token. 401 and 403 both end the session.
    async fn authed<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let token = self.live_token()?;
        let resp = req.bearer_auth(token).send().await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                self.session.clear()?;
                Err(ClientError::AuthRequired)
            }
            StatusCode::FORBIDDEN => {
                log::info!("Server rejected token, clearing session");
                self.session.clear()?;
                Err(ClientError::AuthExpired)
            }
            _ => read_json(resp).await,
        }
    }
}

fn reservation_body(
    restaurant_id: i64,
    date: NaiveDate,
    time: NaiveTime,
    people_count: i32,
) -> Result<ReservationRequest, ClientError> {
    if !(MIN_PARTY..=MAX_PARTY).contains(&people_count) {
        return Err(ClientError::InvalidInput(format!(
            "Party size must be between {} and {}",
            MIN_PARTY, MAX_PARTY
        )));
    }
    Ok(ReservationRequest {
        restaurant_id,
        date: date.format("%Y/%m/%d").to_string(),
        time: time.format("%H:%M").to_string(),
        people_count,
    })
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: extract_error(&body),
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

fn extract_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{unsigned_token, MemorySessionStore};
    use axum::{http::StatusCode as AxumStatus, routing::get, routing::post, Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/auth", addr)
    }

    fn live_token() -> String {
        unsigned_token(chrono::Utc::now().timestamp() + 3600)
    }

    #[tokio::test]
    async fn login_persists_token_and_user_id() {
        let token = live_token();
        let issued = token.clone();
        let app = Router::new()
            .route(
                "/auth/login",
                post(move || {
                    let issued = issued.clone();
                    async move { Json(json!({ "message": "Login successful", "token": issued })) }
                }),
            )
            .route("/auth/userid", get(|| async { Json(json!({ "userId": 7 })) }));
        let client = ApiClient::new(&serve(app).await, MemorySessionStore::new()).unwrap();

        assert_eq!(client.login("a@x.com", "secret1").await.unwrap(), 7);
        assert_eq!(client.session().token().unwrap(), Some(token));
        assert_eq!(client.session().user_id().unwrap(), Some(7));
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn failed_user_id_lookup_rolls_back_login() {
        let app = Router::new()
            .route(
                "/auth/login",
                post(|| async { Json(json!({ "message": "Login successful", "token": live_token() })) }),
            )
            .route(
                "/auth/userid",
                get(|| async {
                    (
                        AxumStatus::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": "Database error" })),
                    )
                }),
            );
        let client = ApiClient::new(&serve(app).await, MemorySessionStore::new()).unwrap();

        let err = client.login("a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert_eq!(client.session().token().unwrap(), None);
        assert_eq!(client.session().user_id().unwrap(), None);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn forbidden_clears_session_and_reports_expiry() {
        let app = Router::new().route(
            "/auth/profile",
            get(|| async {
                (
                    AxumStatus::FORBIDDEN,
                    Json(json!({ "message": "Invalid or expired token" })),
                )
            }),
        );
        let session = MemorySessionStore::new();
        session.save_token(&live_token()).unwrap();
        session.save_user_id(7).unwrap();
        let client = ApiClient::new(&serve(app).await, session).unwrap();

        let err = client.profile().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthExpired));
        assert!(err.needs_login());
        assert_eq!(client.session().token().unwrap(), None);
        assert_eq!(client.session().user_id().unwrap(), None);
    }

    #[tokio::test]
    async fn expired_local_token_never_hits_the_network() {
        let session = MemorySessionStore::new();
        session
            .save_token(&unsigned_token(chrono::Utc::now().timestamp() - 10))
            .unwrap();
        // Nothing listens on the discard port; a request would fail as Network.
        let client = ApiClient::new("http://127.0.0.1:9/auth", session).unwrap();

        let err = client.profile().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired));
        assert_eq!(client.session().token().unwrap(), None);
    }

    #[tokio::test]
    async fn server_message_is_surfaced_on_failure() {
        let app = Router::new().route(
            "/auth/register",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({ "message": "User with this email already exists" })),
                )
            }),
        );
        let client = ApiClient::new(&serve(app).await, MemorySessionStore::new()).unwrap();

        match client.register("Alice", "a@x.com", "secret1").await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "User with this email already exists");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let app = Router::new().route(
            "/auth/restaurants",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([]))
            }),
        );
        let client = ApiClient::with_timeout(
            &serve(app).await,
            MemorySessionStore::new(),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = client.restaurants().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
        assert!(!err.needs_login());
    }

    #[tokio::test]
    async fn booking_outside_party_bounds_is_rejected_locally() {
        let session = MemorySessionStore::new();
        session.save_token(&live_token()).unwrap();
        let client = ApiClient::new("http://127.0.0.1:9/auth", session).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

        for people in [0, 11] {
            let err = client.book(1, date, time, people).await.unwrap_err();
            assert!(matches!(err, ClientError::InvalidInput(_)));
        }
    }

    #[test]
    fn reservation_body_uses_wire_formats() {
        let body = reservation_body(
            3,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            4,
        )
        .unwrap();
        assert_eq!(body.date, "2025/06/01");
        assert_eq!(body.time, "09:05");
    }
}
