//! Author endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail, AuthorForm},
        pagination::{Page, PageQuery},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

/// List authors, ordered by last then first name
#[utoipa::path(
    get,
    path = "/authors/",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of authors", body = Page<Author>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Author>>> {
    let authors = state.services.catalog.list_authors(&page).await?;
    Ok(Json(authors))
}

/// Get an author and their books
#[utoipa::path(
    get,
    path = "/author/{id}",
    tag = "authors",
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    path: IdPath<i64>,
) -> AppResult<Json<AuthorDetail>> {
    let id = path_id(path)?;
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Empty author form
#[utoipa::path(
    get,
    path = "/author/create",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form data", body = AuthorForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing can_mark_returned capability")
    )
)]
pub async fn create_author_form(session: Session) -> AppResult<Json<AuthorForm>> {
    session.require(Operation::CreateAuthor)?;
    Ok(Json(AuthorForm::default()))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/author/create",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing can_mark_returned capability")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    session: Session,
    body: FormBody<AuthorForm>,
) -> AppResult<(StatusCode, Json<Author>)> {
    session.require(Operation::CreateAuthor)?;
    let author = state.services.catalog.create_author(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Current values of an author, for editing
#[utoipa::path(
    get,
    path = "/author/{id}/update",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Initial form data", body = AuthorForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<AuthorForm>> {
    session.require(Operation::UpdateAuthor)?;
    let id = path_id(path)?;
    let form = state.services.catalog.author_form(id).await?;
    Ok(Json(form))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/author/{id}/update",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
    body: FormBody<AuthorForm>,
) -> AppResult<Json<Author>> {
    session.require(Operation::UpdateAuthor)?;
    let id = path_id(path)?;
    let author = state.services.catalog.update_author(id, form(body)?).await?;
    Ok(Json(author))
}

/// The author about to be deleted
#[utoipa::path(
    get,
    path = "/author/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author to confirm", body = AuthorDetail),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<AuthorDetail>> {
    session.require(Operation::DeleteAuthor)?;
    let id = path_id(path)?;
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Delete an author; their books lose the author reference
#[utoipa::path(
    post,
    path = "/author/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing can_mark_returned capability"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<StatusCode> {
    session.require(Operation::DeleteAuthor)?;
    let id = path_id(path)?;
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
