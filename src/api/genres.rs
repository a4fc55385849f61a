//! Genre endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        genre::{Genre, GenreDetail, GenreForm},
        pagination::{Page, PageQuery},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

#[utoipa::path(
    get,
    path = "/genres/",
    tag = "genres",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of genres", body = Page<Genre>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Genre>>> {
    let genres = state.services.catalog.list_genres(&page).await?;
    Ok(Json(genres))
}

#[utoipa::path(
    get,
    path = "/genre/{id}",
    tag = "genres",
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre and its books", body = GenreDetail),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    path: IdPath<i64>,
) -> AppResult<Json<GenreDetail>> {
    let id = path_id(path)?;
    let genre = state.services.catalog.get_genre(id).await?;
    Ok(Json(genre))
}

#[utoipa::path(
    get,
    path = "/genre/create",
    tag = "genres",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form data", body = GenreForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing add_genre capability")
    )
)]
pub async fn create_genre_form(session: Session) -> AppResult<Json<GenreForm>> {
    session.require(Operation::CreateGenre)?;
    Ok(Json(GenreForm::default()))
}

#[utoipa::path(
    post,
    path = "/genre/create",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = GenreForm,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing add_genre capability")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    session: Session,
    body: FormBody<GenreForm>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    session.require(Operation::CreateGenre)?;
    let genre = state.services.catalog.create_genre(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

#[utoipa::path(
    get,
    path = "/genre/{id}/edit",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Initial form data", body = GenreForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing change_genre capability"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<GenreForm>> {
    session.require(Operation::UpdateGenre)?;
    let id = path_id(path)?;
    let form = state.services.catalog.genre_form(id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/genre/{id}/edit",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    request_body = GenreForm,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing change_genre capability"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
    body: FormBody<GenreForm>,
) -> AppResult<Json<Genre>> {
    session.require(Operation::UpdateGenre)?;
    let id = path_id(path)?;
    let genre = state.services.catalog.update_genre(id, form(body)?).await?;
    Ok(Json(genre))
}

#[utoipa::path(
    get,
    path = "/genre/{id}/delete",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre to confirm", body = GenreDetail),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_genre capability"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<GenreDetail>> {
    session.require(Operation::DeleteGenre)?;
    let id = path_id(path)?;
    let genre = state.services.catalog.get_genre(id).await?;
    Ok(Json(genre))
}

/// Delete a genre; books keep their other genres
#[utoipa::path(
    post,
    path = "/genre/{id}/delete",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_genre capability"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<StatusCode> {
    session.require(Operation::DeleteGenre)?;
    let id = path_id(path)?;
    state.services.catalog.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
