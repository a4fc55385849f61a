//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    book::BookSummary,
    validation::{clean, FormErrors},
};
use crate::error::FieldError;

/// Book genre (e.g. Science Fiction)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GenreForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
}

impl GenreForm {
    pub fn clean(&mut self) -> Vec<FieldError> {
        clean(&mut self.name);
        let mut errors = FormErrors::from_rules(self);
        errors.require("name", &self.name);
        errors.into_vec()
    }
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
        }
    }
}
