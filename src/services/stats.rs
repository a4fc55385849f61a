//! Statistics service: the counts shown on the catalog home page

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::book_instance::LoanStatus, repository::Repository};

/// Home page counts. Each one is computed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status Available
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Genres whose name contains the `genre_contains` term, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_genres_matching: Option<i64>,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self, genre_contains: Option<&str>) -> AppResult<CatalogCounts> {
        let num_genres_matching = match genre_contains.filter(|term| !term.is_empty()) {
            Some(term) => Some(self.repository.genres.count_name_contains(term).await?),
            None => None,
        };

        Ok(CatalogCounts {
            num_books: self.repository.books.count_all().await?,
            num_instances: self.repository.instances.count_all().await?,
            num_instances_available: self
                .repository
                .instances
                .count_with_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.genres.count().await?,
            num_genres_matching,
        })
    }
}
