//! Shared test harness: an app over a fresh in-memory database

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use library_catalog_server::{
    api,
    config::AppConfig,
    models::{
        author::AuthorForm,
        book::BookForm,
        book_instance::{BookInstanceForm, LoanStatus},
        User, UserClaims,
    },
    policy::Capability,
    repository::Repository,
    services::Services,
    AppState,
};

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub repository: Repository,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("No Location header")
    }

    /// Messages attached to `field` in a form error body
    pub fn field_messages(&self, field: &str) -> Vec<String> {
        self.body["fields"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter(|f| f["field"] == field)
                    .filter_map(|f| f["message"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub async fn spawn_app() -> TestApp {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();

    let repository = Repository::connect(&config.database)
        .await
        .expect("Failed to open in-memory database");
    let services = Services::new(repository.clone(), &config);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    TestApp {
        app: api::router(state.clone()),
        state,
        repository,
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date")
}

impl TestApp {
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send("POST", uri, token, Some(body)).await
    }

    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Failed to parse response")
        };

        TestResponse { status, headers, body }
    }

    /// Create an account holding `capabilities` and return it with a valid token
    pub async fn user(&self, username: &str, capabilities: &[Capability], is_superuser: bool) -> (User, String) {
        let user = self
            .repository
            .users
            .create(username, "Test", "User", "not-a-real-hash", is_superuser)
            .await
            .expect("Failed to create user");
        self.repository
            .users
            .set_capabilities(user.id, capabilities, is_superuser)
            .await
            .expect("Failed to set capabilities");

        let now = Utc::now().timestamp();
        let token = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser,
            capabilities: capabilities.to_vec(),
            exp: now + 3600,
            iat: now,
        }
        .create_token(&self.state.config.auth.jwt_secret)
        .expect("Failed to create token");

        (user, token)
    }

    pub async fn author(&self, first_name: &str, last_name: &str) -> i64 {
        let form = AuthorForm {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..Default::default()
        };
        self.repository
            .authors
            .create(&form)
            .await
            .expect("Failed to create author")
            .id
    }

    pub async fn book(&self, title: &str, isbn: &str, author_id: Option<i64>) -> i64 {
        let form = BookForm {
            title: title.to_string(),
            summary: format!("Summary of {}", title),
            isbn: isbn.to_string(),
            author_id,
            ..Default::default()
        };
        self.repository
            .books
            .create(&form)
            .await
            .expect("Failed to create book")
            .id
    }

    pub async fn instance(
        &self,
        book_id: i64,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i64>,
    ) -> Uuid {
        let form = BookInstanceForm {
            book_id: Some(book_id),
            imprint: "Test imprint, 2024".to_string(),
            publisher_id: None,
            due_back,
            status,
            borrower_id,
        };
        self.repository
            .instances
            .create(&form)
            .await
            .expect("Failed to create book instance")
    }
}
