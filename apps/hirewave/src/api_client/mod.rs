//! HireWave REST client. Every backend call in the CLI goes through here.
//!
//! The bearer header is read from the `Session` on each request, so a login
//! or logout performed through one clone is seen by all of them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::blog::{BlogCategory, BlogComment, BlogPost, Listing, NewComment};
use crate::models::job::{BookmarkResponse, Job, JobPage, JobQuery, JobUpdate, SavedJob};
use crate::models::user::{Ack, AuthResponse, RegisterRequest, User};
use crate::session::Session;
use crate::table::remote::JobSource;

/// Referral code sent on signup when the user leaves the field empty.
pub const DEFAULT_REFERRAL_CODE: &str = "NEW";

#[derive(Debug, Serialize)]
struct VerifyOtpRequest<'a> {
    email: &'a str,
    otp: &'a str,
    #[serde(rename = "referralCode", skip_serializing_if = "Option::is_none")]
    referral_code: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

#[derive(Clone)]
pub struct HireWaveClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl HireWaveClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Session,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and maps any non-2xx answer to `ClientError::Api`.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response(status, &body);
        if status.is_server_error() {
            warn!("HireWave API returned {status}: {err}");
        } else {
            debug!("HireWave API returned {status}: {err}");
        }
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.send(builder).await.map(|_| ())
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    pub async fn request_otp(&self, email: &str) -> Result<Ack, ClientError> {
        let req = self
            .request(Method::POST, "/auth/request-otp/")
            .json(&json!({ "email": email }));
        self.send_json(req).await
    }

    /// Returns the tokens and user; persisting them is the caller's job.
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        referral_code: Option<&str>,
    ) -> Result<AuthResponse, ClientError> {
        let body = VerifyOtpRequest {
            email,
            otp,
            referral_code: referral_code.filter(|c| !c.trim().is_empty()),
        };
        let req = self.request(Method::POST, "/auth/verify-otp/").json(&body);
        self.send_json(req).await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<Ack, ClientError> {
        let req = self
            .request(Method::POST, "/auth/resend-otp/")
            .json(&json!({ "email": email }));
        self.send_json(req).await
    }

    pub async fn register(&self, mut request: RegisterRequest) -> Result<Ack, ClientError> {
        if request.referral_code.trim().is_empty() {
            request.referral_code = DEFAULT_REFERRAL_CODE.to_string();
        }
        let req = self.request(Method::POST, "/auth/register/").json(&request);
        self.send_json(req).await
    }

    /// Exchanges the stored refresh token for a new access token.
    /// Any failure wipes the session and yields `false`.
    pub async fn refresh_token(&self) -> Result<bool, ClientError> {
        let Some(refresh) = self.session.refresh_token() else {
            debug!("No refresh token stored");
            return Ok(false);
        };

        let req = self
            .client
            .post(self.url("/auth/token/refresh/"))
            .json(&json!({ "refresh": refresh }));

        match self.send_json::<RefreshResponse>(req).await {
            Ok(RefreshResponse {
                access: Some(access),
            }) => {
                self.session.update_access_token(&access)?;
                Ok(true)
            }
            Ok(_) => {
                warn!("Token refresh answered without an access token");
                self.session.clear()?;
                Ok(false)
            }
            Err(e) => {
                warn!("Token refresh failed: {e}");
                self.session.clear()?;
                Ok(false)
            }
        }
    }

    /// Trades the refresh token for a new bearer when the stored one has
    /// expired. Must run before `Session::is_logged_in`, which wipes an
    /// expired session.
    pub async fn refresh_if_expired(&self, now: DateTime<Utc>) -> Result<bool, ClientError> {
        if !self.session.token_expired(now) {
            return Ok(false);
        }
        debug!("Access token expired, trying refresh");
        self.refresh_token().await
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        if self.session.token().is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.send_json(self.request(Method::GET, "/auth/profile/")).await
    }

    /// Tells the backend to blacklist the refresh token. Local state is
    /// cleared whatever the backend says.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh) = self.session.refresh_token() {
            let req = self
                .request(Method::POST, "/auth/logout/")
                .json(&json!({ "refresh": refresh }));
            if let Err(e) = self.send_empty(req).await {
                warn!("Logout request failed, clearing local session anyway: {e}");
            }
        }
        self.session.clear()
    }

    // ─── Jobs ────────────────────────────────────────────────────────────────

    pub async fn list_jobs(
        &self,
        page: usize,
        limit: usize,
        query: &JobQuery,
    ) -> Result<JobPage, ClientError> {
        let req = self
            .request(Method::GET, "/jobs/")
            .query(&[("page", page), ("limit", limit)])
            .query(query);
        self.send_json(req).await
    }

    pub async fn get_job(&self, id: i64) -> Result<Job, ClientError> {
        self.send_json(self.request(Method::GET, &format!("/jobs/{id}/")))
            .await
    }

    pub async fn update_job(&self, id: i64, update: &JobUpdate) -> Result<Job, ClientError> {
        let req = self
            .request(Method::PATCH, &format!("/jobs/{id}/"))
            .json(update);
        self.send_json(req).await
    }

    pub async fn delete_job(&self, id: i64) -> Result<(), ClientError> {
        self.send_empty(self.request(Method::DELETE, &format!("/jobs/{id}/")))
            .await
    }

    /// Toggles the bookmark on a job. Requires a session.
    pub async fn bookmark_job(&self, id: i64) -> Result<BookmarkResponse, ClientError> {
        self.require_token()?;
        self.send_json(self.request(Method::POST, &format!("/jobs/{id}/bookmark/")))
            .await
    }

    // ─── Saved jobs ──────────────────────────────────────────────────────────

    pub async fn saved_jobs(&self) -> Result<Vec<SavedJob>, ClientError> {
        self.require_token()?;
        let listing: Listing<SavedJob> = self
            .send_json(self.request(Method::GET, "/saved-jobs/"))
            .await?;
        Ok(listing.into_vec())
    }

    pub async fn save_job(&self, job_id: i64) -> Result<SavedJob, ClientError> {
        self.require_token()?;
        let req = self
            .request(Method::POST, "/saved-jobs/")
            .json(&json!({ "job": job_id }));
        self.send_json(req).await
    }

    pub async fn remove_saved_job(&self, saved_job_id: i64) -> Result<(), ClientError> {
        self.require_token()?;
        self.send_empty(self.request(Method::DELETE, &format!("/saved-jobs/{saved_job_id}/")))
            .await
    }

    pub async fn is_job_saved(&self, job_id: i64) -> Result<bool, ClientError> {
        Ok(self.saved_jobs().await?.iter().any(|s| s.refers_to(job_id)))
    }

    /// Removes the saved entry for `job_id` if there is one, otherwise saves
    /// it. Returns whether the job is saved afterwards.
    pub async fn toggle_saved_job(&self, job_id: i64) -> Result<bool, ClientError> {
        let saved = self.saved_jobs().await?;
        match saved.iter().find(|s| s.refers_to(job_id)) {
            Some(entry) => {
                self.remove_saved_job(entry.id).await?;
                Ok(false)
            }
            None => {
                self.save_job(job_id).await?;
                Ok(true)
            }
        }
    }

    // ─── Blog ────────────────────────────────────────────────────────────────

    pub async fn list_posts(&self, category: Option<&str>) -> Result<Vec<BlogPost>, ClientError> {
        let mut req = self.request(Method::GET, "/blog/posts/");
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }
        let listing: Listing<BlogPost> = self.send_json(req).await?;
        Ok(listing.into_vec())
    }

    pub async fn get_post(&self, slug: &str) -> Result<BlogPost, ClientError> {
        self.send_json(self.request(Method::GET, &format!("/blog/posts/{slug}/")))
            .await
    }

    pub async fn increment_post_view(&self, slug: &str) -> Result<(), ClientError> {
        let req = self
            .request(Method::POST, &format!("/blog/posts/{slug}/increment_view/"))
            .json(&json!({}));
        self.send_empty(req).await
    }

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<BlogComment>, ClientError> {
        let req = self
            .request(Method::GET, "/blog/comments/")
            .query(&[("post", post_id)]);
        let listing: Listing<BlogComment> = self.send_json(req).await?;
        Ok(listing.into_vec())
    }

    pub async fn create_comment(&self, comment: &NewComment) -> Result<BlogComment, ClientError> {
        self.require_token()?;
        if comment.content.trim().is_empty() {
            return Err(ClientError::Validation("Comment cannot be empty".to_string()));
        }
        let req = self.request(Method::POST, "/blog/comments/").json(comment);
        self.send_json(req).await
    }

    pub async fn list_categories(&self) -> Result<Vec<BlogCategory>, ClientError> {
        let listing: Listing<BlogCategory> = self
            .send_json(self.request(Method::GET, "/blog/categories/"))
            .await?;
        Ok(listing.into_vec())
    }

    fn require_token(&self) -> Result<(), ClientError> {
        match self.session.token() {
            Some(_) => Ok(()),
            None => Err(ClientError::NotAuthenticated),
        }
    }
}

#[async_trait]
impl JobSource for HireWaveClient {
    async fn fetch_jobs(
        &self,
        page: usize,
        limit: usize,
        query: &JobQuery,
    ) -> Result<JobPage, ClientError> {
        self.list_jobs(page, limit, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::Value;

    use crate::models::user::Role;
    use crate::session::token::unsigned_token;
    use crate::session::{MemoryStore, SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/")
    }

    fn client(base: &str, session: Session) -> HireWaveClient {
        HireWaveClient::new(base, Duration::from_secs(5), session).unwrap()
    }

    fn job_json(id: i64) -> Value {
        serde_json::json!({"id": id, "title": format!("Job {id}"), "company": "Acme"})
    }

    #[tokio::test]
    async fn test_verify_otp_sends_referral_code() {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/api/auth/verify-otp/",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(serde_json::json!({
                        "access": "a.b.c",
                        "refresh": "r",
                        "user": {
                            "id": "7d5c4c1e-9a43-4f3f-8f0e-0d3a0f6f1b11",
                            "email": "ada@example.com",
                            "user_type": "recruiter"
                        }
                    }))
                }
            }),
        );
        let base = serve(app).await;

        let auth = client(&base, Session::in_memory())
            .verify_otp("ada@example.com", "123456", Some("FRIEND01"))
            .await
            .unwrap();

        assert_eq!(auth.bearer(), Some("a.b.c"));
        assert_eq!(auth.user.unwrap().user_type, Role::Recruiter);
        assert_eq!(
            seen.lock().unwrap().clone().unwrap(),
            serde_json::json!({"email": "ada@example.com", "otp": "123456", "referralCode": "FRIEND01"})
        );
    }

    #[tokio::test]
    async fn test_invalid_otp_maps_backend_error() {
        let app = Router::new().route(
            "/api/auth/verify-otp/",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "Invalid OTP"})),
                )
            }),
        );
        let base = serve(app).await;

        let err = client(&base, Session::in_memory())
            .verify_otp("ada@example.com", "000000", None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), "Invalid OTP");
    }

    #[tokio::test]
    async fn test_request_otp_unknown_email_is_not_found() {
        let app = Router::new().route(
            "/api/auth/request-otp/",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "No account found with this email. Please sign up first."})),
                )
            }),
        );
        let base = serve(app).await;

        let err = client(&base, Session::in_memory())
            .request_otp("nobody@example.com")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_register_defaults_referral_code() {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/api/auth/register/",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(serde_json::json!({"message": "OTP sent", "email": "ada@example.com"}))
                }
            }),
        );
        let base = serve(app).await;

        let request = RegisterRequest {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            dob: None,
            college: None,
            year_of_passing: None,
            status: None,
            referral_code: String::new(),
            user_type: Role::Recruiter,
        };
        client(&base, Session::in_memory())
            .register(request)
            .await
            .unwrap();

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["referralCode"], "NEW");
        assert_eq!(body["user_type"], "recruiter");
        assert_eq!(body["firstName"], "Ada");
    }

    #[tokio::test]
    async fn test_list_jobs_sends_paging_and_filters() {
        let app = Router::new().route(
            "/api/jobs/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("page").map(String::as_str), Some("2"));
                assert_eq!(params.get("limit").map(String::as_str), Some("6"));
                assert_eq!(params.get("search").map(String::as_str), Some("rust"));
                assert!(!params.contains_key("location"));
                Json(serde_json::json!({
                    "results": [job_json(7), job_json(8)],
                    "total": 8,
                    "has_more": false
                }))
            }),
        );
        let base = serve(app).await;

        let query = JobQuery {
            search: Some("rust".to_string()),
            ..Default::default()
        };
        let page = client(&base, Session::in_memory())
            .fetch_jobs(2, 6, &query)
            .await
            .unwrap();
        assert_eq!(page.count, 8);
        assert_eq!(page.results.len(), 2);
    }

    #[tokio::test]
    async fn test_bearer_header_comes_from_session() {
        let app = Router::new().route(
            "/api/auth/profile/",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth != "Bearer live-token" {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Ok(Json(serde_json::json!({
                    "id": "7d5c4c1e-9a43-4f3f-8f0e-0d3a0f6f1b11",
                    "email": "ada@example.com",
                    "user_type": "admin"
                })))
            }),
        );
        let base = serve(app).await;

        let session = Session::in_memory();
        let api = client(&base, session.clone());
        assert!(matches!(api.profile().await, Err(ClientError::NotAuthenticated)));

        session.update_access_token("live-token").unwrap();
        assert_eq!(api.profile().await.unwrap().user_type, Role::Admin);
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_backend_fails() {
        let app = Router::new().route(
            "/api/auth/logout/",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = serve(app).await;

        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "t").unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").unwrap();
        let api = client(&base, Session::new(store.clone()));

        api.logout().await.unwrap();
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(REFRESH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_token_updates_or_clears() {
        let app = Router::new().route(
            "/api/auth/token/refresh/",
            post(|Json(body): Json<Value>| async move {
                if body["refresh"] == "good" {
                    Ok(Json(serde_json::json!({"access": "new-access"})))
                } else {
                    Err((
                        StatusCode::UNAUTHORIZED,
                        Json(serde_json::json!({"detail": "Token is invalid or expired"})),
                    ))
                }
            }),
        );
        let base = serve(app).await;

        let store = Arc::new(MemoryStore::new());
        store.set(REFRESH_TOKEN_KEY, "good").unwrap();
        let api = client(&base, Session::new(store.clone()));
        assert!(api.refresh_token().await.unwrap());
        assert_eq!(api.session().token().as_deref(), Some("new-access"));

        store.set(REFRESH_TOKEN_KEY, "bad").unwrap();
        assert!(!api.refresh_token().await.unwrap());
        assert!(api.session().token().is_none());
        assert!(!api.refresh_token().await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_access_token_is_refreshed_before_login_check() {
        let fresh = unsigned_token(
            &serde_json::json!({"exp": (Utc::now() + chrono::Duration::hours(1)).timestamp()}),
        );
        let issued = fresh.clone();
        let app = Router::new().route(
            "/api/auth/token/refresh/",
            post(move |Json(body): Json<Value>| {
                let issued = issued.clone();
                async move {
                    assert_eq!(body["refresh"], "still-valid-refresh");
                    Json(serde_json::json!({ "access": issued }))
                }
            }),
        );
        let base = serve(app).await;

        let expired = unsigned_token(
            &serde_json::json!({"exp": (Utc::now() - chrono::Duration::minutes(5)).timestamp()}),
        );
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, &expired).unwrap();
        store.set(REFRESH_TOKEN_KEY, "still-valid-refresh").unwrap();
        store
            .set(
                USER_KEY,
                r#"{"id":"7d5c4c1e-9a43-4f3f-8f0e-0d3a0f6f1b11","email":"ada@example.com","user_type":"jobseeker"}"#,
            )
            .unwrap();
        let api = client(&base, Session::new(store.clone()));

        let now = Utc::now();
        assert!(api.session().token_expired(now));
        assert!(api.refresh_if_expired(now).await.unwrap());
        assert_eq!(api.session().token(), Some(fresh));
        assert!(api.session().is_logged_in(now));
        assert_eq!(
            api.session().refresh_token().as_deref(),
            Some("still-valid-refresh")
        );

        // A live token needs no refresh
        assert!(!api.refresh_if_expired(now).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_saved_job_removes_existing_entry() {
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let deleted_log = deleted.clone();
        let app = Router::new()
            .route(
                "/api/saved-jobs/",
                get(|| async {
                    Json(serde_json::json!([
                        {"id": 40, "user": null, "job": 9, "job_details": null, "created_at": null}
                    ]))
                })
                .post(|Json(body): Json<Value>| async move {
                    Json(serde_json::json!({
                        "id": 41, "user": null, "job": body["job"], "job_details": null, "created_at": null
                    }))
                }),
            )
            .route(
                "/api/saved-jobs/:id/",
                delete(move |Path(id): Path<i64>| {
                    let deleted_log = deleted_log.clone();
                    async move {
                        deleted_log.lock().unwrap().push(id);
                        StatusCode::NO_CONTENT
                    }
                }),
            );
        let base = serve(app).await;

        let session = Session::in_memory();
        session.update_access_token("t").unwrap();
        let api = client(&base, session);

        assert!(!api.toggle_saved_job(9).await.unwrap());
        assert_eq!(*deleted.lock().unwrap(), vec![40]);
        assert!(api.toggle_saved_job(10).await.unwrap());
        assert!(api.is_job_saved(9).await.unwrap());
    }

    #[tokio::test]
    async fn test_saved_jobs_requires_session() {
        let api = client("http://127.0.0.1:9/api", Session::in_memory());
        assert!(matches!(api.saved_jobs().await, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_blog_listing_accepts_paged_and_plain_bodies() {
        let app = Router::new()
            .route(
                "/api/blog/posts/",
                get(|| async {
                    Json(serde_json::json!({"results": [
                        {"id": 1, "title": "Hello", "slug": "hello", "content": "..."}
                    ]}))
                }),
            )
            .route(
                "/api/blog/comments/",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("post").map(String::as_str), Some("1"));
                    Json(serde_json::json!([
                        {"id": 5, "post": 1, "content": "Nice", "is_approved": true}
                    ]))
                }),
            );
        let base = serve(app).await;

        let api = client(&base, Session::in_memory());
        let posts = api.list_posts(None).await.unwrap();
        assert_eq!(posts[0].slug, "hello");
        let comments = api.list_comments(1).await.unwrap();
        assert_eq!(comments[0].content, "Nice");
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected_locally() {
        let session = Session::in_memory();
        session.update_access_token("t").unwrap();
        let api = client("http://127.0.0.1:9/api", session);
        let err = api
            .create_comment(&NewComment {
                post: 1,
                content: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
