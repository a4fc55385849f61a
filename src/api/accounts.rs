//! Account endpoints: login, sign-up, identity and capability grants

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::user::{CapabilitiesForm, LoginRequest, LoginResponse, SignUpForm, UserInfo},
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

/// Return target carried through the login redirect
#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoginPage {
    /// Path (and query) to go back to after logging in
    pub next: Option<String>,
}

/// Login entry point; echoes the return target
#[utoipa::path(
    get,
    path = "/accounts/login/",
    tag = "accounts",
    params(LoginPage),
    responses(
        (status = 200, description = "Login form data", body = LoginPage)
    )
)]
pub async fn login_form(Query(page): Query<LoginPage>) -> Json<LoginPage> {
    Json(page)
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/accounts/login/",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: FormBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let request = form(body)?;
    let response = state
        .services
        .users
        .authenticate(&request.username, &request.password, request.next)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/accounts/signup/",
    tag = "accounts",
    responses(
        (status = 200, description = "Empty sign-up form", body = SignUpForm)
    )
)]
pub async fn sign_up_form() -> Json<SignUpForm> {
    Json(SignUpForm::default())
}

/// Register a reader account
#[utoipa::path(
    post,
    path = "/accounts/signup/",
    tag = "accounts",
    request_body = SignUpForm,
    responses(
        (status = 201, description = "Account created", body = UserInfo),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    body: FormBody<SignUpForm>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    let user = state.services.users.sign_up(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/accounts/me",
    tag = "accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 302, description = "Login required")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<UserInfo>> {
    let claims = session.require(Operation::ViewProfile)?;
    let user = state.services.users.get_info(claims.user_id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/accounts/{id}/capabilities",
    tag = "accounts",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User and their capabilities", body = UserInfo),
        (status = 302, description = "Login required"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_capabilities(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<UserInfo>> {
    session.require(Operation::ManageCapabilities)?;
    let id = path_id(path)?;
    let user = state.services.users.get_info(id).await?;
    Ok(Json(user))
}

/// Replace a user's capabilities. Takes effect at their next login.
#[utoipa::path(
    post,
    path = "/accounts/{id}/capabilities",
    tag = "accounts",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = CapabilitiesForm,
    responses(
        (status = 200, description = "Capabilities updated", body = UserInfo),
        (status = 302, description = "Login required"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_capabilities(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
    body: FormBody<CapabilitiesForm>,
) -> AppResult<Json<UserInfo>> {
    session.require(Operation::ManageCapabilities)?;
    let id = path_id(path)?;
    let user = state.services.users.set_capabilities(id, form(body)?).await?;
    Ok(Json(user))
}
