//! API handlers for the catalog endpoints

pub mod accounts;
pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod index;
pub mod instances;
pub mod languages;
pub mod loans;
pub mod openapi;
pub mod publishers;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequestParts, OriginalUri, Path,
    },
    http::request::Parts,
    routing::get,
    Json, RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::errors::ErrorKind;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    policy::{authorize, login_redirect, Access, Operation},
    AppState,
};

/// Caller identity, if a bearer token was presented, plus what is needed to
/// send an anonymous caller to login and back.
pub struct Session {
    pub claims: Option<UserClaims>,
    next: String,
    login_url: String,
}

impl Session {
    /// Authorize `operation`, returning the caller's claims when allowed
    pub fn require(&self, operation: Operation) -> AppResult<&UserClaims> {
        match (authorize(self.claims.as_ref(), operation), self.claims.as_ref()) {
            (Access::Allow, Some(claims)) => Ok(claims),
            (Access::Forbidden, Some(claims)) => {
                tracing::debug!("User {} denied {:?}", claims.user_id, operation);
                Err(AppError::Authorization(
                    "You do not have permission to perform this action".to_string(),
                ))
            }
            _ => Err(AppError::LoginRequired(login_redirect(&self.login_url, &self.next))),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let next = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let next = next
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| next.path().to_string());

        // A missing header or an expired token is an anonymous session; any other bad token is an error
        let claims = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => {
                match UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret) {
                    Ok(claims) => Some(claims),
                    Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                        tracing::debug!("Expired token treated as anonymous");
                        None
                    }
                    Err(e) => return Err(AppError::Authentication(e.to_string())),
                }
            }
            Err(_) => None,
        };

        Ok(Session {
            claims,
            next,
            login_url: state.config.auth.login_url.clone(),
        })
    }
}

/// JSON form body. Extracted last so authorization runs before the body is parsed.
pub type FormBody<T> = Result<Json<T>, JsonRejection>;

pub(crate) fn form<T>(body: FormBody<T>) -> AppResult<T> {
    Ok(body?.0)
}

/// Row identifier taken from the path. Parsed after authorization; a malformed
/// identifier names no row and is reported as not found.
pub type IdPath<T> = Result<Path<T>, PathRejection>;

pub(crate) fn path_id<T>(path: IdPath<T>) -> AppResult<T> {
    Ok(path?.0)
}

/// Query string extractor whose rejections use the catalog error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home page counts
        .route("/", get(index::index))
        // Books
        .route("/books/", get(books::list_books))
        .route("/book/create", get(books::create_book_form).post(books::create_book))
        .route("/book/:id", get(books::get_book))
        .route("/book/:id/update", get(books::update_book_form).post(books::update_book))
        .route("/book/:id/delete", get(books::delete_book_form).post(books::delete_book))
        .route("/book/:id/renew/", get(loans::renew_form).post(loans::renew))
        // Authors
        .route("/authors/", get(authors::list_authors))
        .route("/author/create", get(authors::create_author_form).post(authors::create_author))
        .route("/author/:id", get(authors::get_author))
        .route("/author/:id/update", get(authors::update_author_form).post(authors::update_author))
        .route("/author/:id/delete", get(authors::delete_author_form).post(authors::delete_author))
        // Genres
        .route("/genres/", get(genres::list_genres))
        .route("/genre/create", get(genres::create_genre_form).post(genres::create_genre))
        .route("/genre/:id", get(genres::get_genre))
        .route("/genre/:id/edit", get(genres::update_genre_form).post(genres::update_genre))
        .route("/genre/:id/delete", get(genres::delete_genre_form).post(genres::delete_genre))
        // Languages
        .route("/languages/", get(languages::list_languages))
        .route("/language/create", get(languages::create_language_form).post(languages::create_language))
        .route("/language/:id", get(languages::get_language))
        // Publishers
        .route("/publishers/", get(publishers::list_publishers))
        .route("/publisher/create", get(publishers::create_publisher_form).post(publishers::create_publisher))
        .route("/publisher/:id", get(publishers::get_publisher))
        .route("/publisher/:id/update", get(publishers::update_publisher_form).post(publishers::update_publisher))
        .route("/publisher/:id/delete", get(publishers::delete_publisher_form).post(publishers::delete_publisher))
        // Book instances
        .route("/instances/", get(instances::list_instances))
        .route("/instance/create", get(instances::create_instance_form).post(instances::create_instance))
        .route("/instance/:id", get(instances::get_instance))
        .route("/instance/:id/update", get(instances::update_instance_form).post(instances::update_instance))
        .route("/instance/:id/delete", get(instances::delete_instance_form).post(instances::delete_instance))
        // Loans
        .route("/mybooks/", get(loans::my_borrowed))
        .route("/borrowed/", get(loans::all_borrowed))
        // Accounts
        .route("/accounts/login/", get(accounts::login_form).post(accounts::login))
        .route("/accounts/signup/", get(accounts::sign_up_form).post(accounts::sign_up))
        .route("/accounts/me", get(accounts::me))
        .route(
            "/accounts/:id/capabilities",
            get(accounts::get_capabilities).post(accounts::set_capabilities),
        )
        .with_state(state);

    routes
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
