//! Loan endpoints: renewal and borrowed lists

use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetails, RenewBookForm, RenewBookPage},
        pagination::{Page, PageQuery},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

/// Renewal form for a copy, with the default proposed date (today + 3 weeks)
#[utoipa::path(
    get,
    path = "/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy and proposed renewal date", body = RenewBookPage),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<Uuid>,
) -> AppResult<Json<RenewBookPage>> {
    session.require(Operation::RenewInstance)?;
    let id = path_id(path)?;
    let page = state
        .services
        .loans
        .renewal_form(id, Utc::now().date_naive())
        .await?;
    Ok(Json(page))
}

/// Set a new due-back date on a copy
#[utoipa::path(
    post,
    path = "/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookForm,
    responses(
        (status = 200, description = "Copy renewed", body = BookInstanceDetails),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid renewal date", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<Uuid>,
    body: FormBody<RenewBookForm>,
) -> AppResult<Json<BookInstanceDetails>> {
    session.require(Operation::RenewInstance)?;
    let id = path_id(path)?;
    let renewal = form(body)?;
    let instance = state
        .services
        .loans
        .renew(id, &renewal, Utc::now().date_naive())
        .await?;
    Ok(Json(instance))
}

/// Copies on loan to the caller, soonest due first
#[utoipa::path(
    get,
    path = "/mybooks/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "One page of the caller's loans", body = Page<BookInstanceDetails>),
        (status = 302, description = "Login required"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn my_borrowed(
    State(state): State<AppState>,
    session: Session,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    let claims = session.require(Operation::ViewMyBorrowed)?;
    let loans = state.services.loans.my_borrowed(claims.user_id, &page).await?;
    Ok(Json(loans))
}

/// Every copy on loan, soonest due first
#[utoipa::path(
    get,
    path = "/borrowed/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "One page of loans", body = Page<BookInstanceDetails>),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    session: Session,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    session.require(Operation::ViewAllBorrowed)?;
    let loans = state.services.loans.all_borrowed(&page).await?;
    Ok(Json(loans))
}
