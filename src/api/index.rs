//! Catalog home page

use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, services::stats::CatalogCounts, AppState};

use super::Query;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndexQuery {
    /// Also count genres whose name contains this term (case-sensitive)
    pub genre_contains: Option<String>,
}

/// Counts of books, copies, available copies, authors and genres
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    params(IndexQuery),
    responses(
        (status = 200, description = "Catalog counts", body = CatalogCounts)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> AppResult<Json<CatalogCounts>> {
    let counts = state
        .services
        .stats
        .counts(query.genre_contains.as_deref())
        .await?;
    Ok(Json(counts))
}
