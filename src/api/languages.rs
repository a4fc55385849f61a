//! Language endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        language::{Language, LanguageDetail, LanguageForm},
        pagination::{Page, PageQuery},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

#[utoipa::path(
    get,
    path = "/languages/",
    tag = "languages",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of languages", body = Page<Language>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_languages(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Language>>> {
    let languages = state.services.catalog.list_languages(&page).await?;
    Ok(Json(languages))
}

#[utoipa::path(
    get,
    path = "/language/{id}",
    tag = "languages",
    params(
        ("id" = i64, Path, description = "Language ID")
    ),
    responses(
        (status = 200, description = "Language and the books written in it", body = LanguageDetail),
        (status = 404, description = "Language not found")
    )
)]
pub async fn get_language(
    State(state): State<AppState>,
    path: IdPath<i64>,
) -> AppResult<Json<LanguageDetail>> {
    let id = path_id(path)?;
    let language = state.services.catalog.get_language(id).await?;
    Ok(Json(language))
}

#[utoipa::path(
    get,
    path = "/language/create",
    tag = "languages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form data", body = LanguageForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing add_language capability")
    )
)]
pub async fn create_language_form(session: Session) -> AppResult<Json<LanguageForm>> {
    session.require(Operation::CreateLanguage)?;
    Ok(Json(LanguageForm::default()))
}

#[utoipa::path(
    post,
    path = "/language/create",
    tag = "languages",
    security(("bearer_auth" = [])),
    request_body = LanguageForm,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing add_language capability")
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    session: Session,
    body: FormBody<LanguageForm>,
) -> AppResult<(StatusCode, Json<Language>)> {
    session.require(Operation::CreateLanguage)?;
    let language = state.services.catalog.create_language(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(language)))
}
