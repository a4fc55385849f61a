//! Language model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{book::BookSummary, validation::{clean_opt, FormErrors}};
use crate::error::FieldError;

/// Language a book is written in. The name may be left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i64,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguageDetail {
    pub language: Language,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LanguageForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: Option<String>,
}

impl LanguageForm {
    pub fn clean(&mut self) -> Vec<FieldError> {
        clean_opt(&mut self.name);
        FormErrors::from_rules(self).into_vec()
    }
}
