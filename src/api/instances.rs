//! Book instance (copy) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetails, BookInstanceForm, InstanceFilter},
        pagination::{Page, PageQuery},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

/// List copies, optionally filtered by status
#[utoipa::path(
    get,
    path = "/instances/",
    tag = "instances",
    params(InstanceFilter, PageQuery),
    responses(
        (status = 200, description = "One page of copies", body = Page<BookInstanceDetails>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_instances(
    State(state): State<AppState>,
    Query(filter): Query<InstanceFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    let instances = state.services.loans.list_instances(&filter, &page).await?;
    Ok(Json(instances))
}

#[utoipa::path(
    get,
    path = "/instance/{id}",
    tag = "instances",
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetails),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_instance(
    State(state): State<AppState>,
    path: IdPath<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    let id = path_id(path)?;
    let instance = state.services.loans.get_instance(id).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    get,
    path = "/instance/create",
    tag = "instances",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form data", body = BookInstanceForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing add_bookinstance capability")
    )
)]
pub async fn create_instance_form(session: Session) -> AppResult<Json<BookInstanceForm>> {
    session.require(Operation::CreateInstance)?;
    Ok(Json(BookInstanceForm::default()))
}

#[utoipa::path(
    post,
    path = "/instance/create",
    tag = "instances",
    security(("bearer_auth" = [])),
    request_body = BookInstanceForm,
    responses(
        (status = 201, description = "Copy created", body = BookInstanceDetails),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing add_bookinstance capability")
    )
)]
pub async fn create_instance(
    State(state): State<AppState>,
    session: Session,
    body: FormBody<BookInstanceForm>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    session.require(Operation::CreateInstance)?;
    let instance = state.services.loans.create_instance(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

#[utoipa::path(
    get,
    path = "/instance/{id}/update",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Initial form data", body = BookInstanceForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing change_bookinstance capability"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_instance_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<Uuid>,
) -> AppResult<Json<BookInstanceForm>> {
    session.require(Operation::UpdateInstance)?;
    let id = path_id(path)?;
    let form = state.services.loans.instance_form(id).await?;
    Ok(Json(form))
}

/// Update a copy: status, borrower, due-back date, imprint, publisher
#[utoipa::path(
    post,
    path = "/instance/{id}/update",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = BookInstanceForm,
    responses(
        (status = 200, description = "Copy updated", body = BookInstanceDetails),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing change_bookinstance capability"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_instance(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<Uuid>,
    body: FormBody<BookInstanceForm>,
) -> AppResult<Json<BookInstanceDetails>> {
    session.require(Operation::UpdateInstance)?;
    let id = path_id(path)?;
    let instance = state.services.loans.update_instance(id, form(body)?).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    get,
    path = "/instance/{id}/delete",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy to confirm", body = BookInstanceDetails),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_bookinstance capability"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_instance_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    session.require(Operation::DeleteInstance)?;
    let id = path_id(path)?;
    let instance = state.services.loans.get_instance(id).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    post,
    path = "/instance/{id}/delete",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_bookinstance capability"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_instance(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<Uuid>,
) -> AppResult<StatusCode> {
    session.require(Operation::DeleteInstance)?;
    let id = path_id(path)?;
    state.services.loans.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
