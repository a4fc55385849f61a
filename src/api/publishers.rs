//! Publisher endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        pagination::{Page, PageQuery},
        publisher::{Publisher, PublisherDetail, PublisherForm},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

#[utoipa::path(
    get,
    path = "/publishers/",
    tag = "publishers",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of publishers", body = Page<Publisher>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_publishers(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Publisher>>> {
    let publishers = state.services.catalog.list_publishers(&page).await?;
    Ok(Json(publishers))
}

/// Get a publisher and the copies it printed
#[utoipa::path(
    get,
    path = "/publisher/{id}",
    tag = "publishers",
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    responses(
        (status = 200, description = "Publisher details", body = PublisherDetail),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn get_publisher(
    State(state): State<AppState>,
    path: IdPath<i64>,
) -> AppResult<Json<PublisherDetail>> {
    let id = path_id(path)?;
    let publisher = state.services.catalog.get_publisher(id).await?;
    Ok(Json(publisher))
}

#[utoipa::path(
    get,
    path = "/publisher/create",
    tag = "publishers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form data", body = PublisherForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing add_publisher capability")
    )
)]
pub async fn create_publisher_form(session: Session) -> AppResult<Json<PublisherForm>> {
    session.require(Operation::CreatePublisher)?;
    Ok(Json(PublisherForm::default()))
}

#[utoipa::path(
    post,
    path = "/publisher/create",
    tag = "publishers",
    security(("bearer_auth" = [])),
    request_body = PublisherForm,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing add_publisher capability")
    )
)]
pub async fn create_publisher(
    State(state): State<AppState>,
    session: Session,
    body: FormBody<PublisherForm>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    session.require(Operation::CreatePublisher)?;
    let publisher = state.services.catalog.create_publisher(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

#[utoipa::path(
    get,
    path = "/publisher/{id}/update",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    responses(
        (status = 200, description = "Initial form data", body = PublisherForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing change_publisher capability"),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn update_publisher_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<PublisherForm>> {
    session.require(Operation::UpdatePublisher)?;
    let id = path_id(path)?;
    let form = state.services.catalog.publisher_form(id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/publisher/{id}/update",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    request_body = PublisherForm,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing change_publisher capability"),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn update_publisher(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
    body: FormBody<PublisherForm>,
) -> AppResult<Json<Publisher>> {
    session.require(Operation::UpdatePublisher)?;
    let id = path_id(path)?;
    let publisher = state.services.catalog.update_publisher(id, form(body)?).await?;
    Ok(Json(publisher))
}

#[utoipa::path(
    get,
    path = "/publisher/{id}/delete",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    responses(
        (status = 200, description = "Publisher to confirm", body = PublisherDetail),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_publisher capability"),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn delete_publisher_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<PublisherDetail>> {
    session.require(Operation::DeletePublisher)?;
    let id = path_id(path)?;
    let publisher = state.services.catalog.get_publisher(id).await?;
    Ok(Json(publisher))
}

/// Delete a publisher; its copies keep their imprint
#[utoipa::path(
    post,
    path = "/publisher/{id}/delete",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Publisher ID")
    ),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_publisher capability"),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn delete_publisher(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<StatusCode> {
    session.require(Operation::DeletePublisher)?;
    let id = path_id(path)?;
    state.services.catalog.delete_publisher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
