//! Book model and related types
//!
//! A book is the bibliographic record; the borrowable copies are
//! [`BookInstanceDetails`]s.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    author::Author,
    book_instance::BookInstanceDetails,
    genre::Genre,
    language::Language,
    validation::{clean, FormErrors},
};
use crate::error::FieldError;

pub const DUPLICATE_ISBN: &str = "Book with this ISBN already exists.";

/// Number of genre names shown by [`display_genre`]
const DISPLAY_GENRE_LIMIT: usize = 3;

/// Book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i64>,
    /// "Last, First" of the author, if any
    pub author_name: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub display_genre: String,
}

/// Book page with everything related to it
#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    pub display_genre: String,
    pub instances: Vec<BookInstanceDetails>,
}

/// Optional filters for the book list
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookFilter {
    /// Substring of the title
    pub title: Option<String>,
}

/// Create / update book form
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub title: String,
    #[validate(length(max = 1000, message = "Ensure this value has at most 1000 characters."))]
    pub summary: String,
    /// 13 character ISBN number
    #[validate(length(max = 13, message = "Ensure this value has at most 13 characters."))]
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
    pub genre_ids: Vec<i64>,
}

impl BookForm {
    /// Normalize the submitted values and collect the errors that need no
    /// database lookup. Reference and uniqueness checks happen in the service.
    pub fn clean(&mut self) -> Vec<FieldError> {
        clean(&mut self.title);
        clean(&mut self.summary);
        clean(&mut self.isbn);
        self.genre_ids.sort_unstable();
        self.genre_ids.dedup();

        let mut errors = FormErrors::from_rules(self);
        errors.require("title", &self.title);
        errors.require("summary", &self.summary);
        errors.require("isbn", &self.isbn);
        errors.into_vec()
    }

    pub fn from_book(book: &Book, genres: &[Genre]) -> Self {
        Self {
            title: book.title.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            author_id: book.author_id,
            language_id: book.language_id,
            genre_ids: genres.iter().map(|g| g.id).collect(),
        }
    }
}

/// Render the first three genre names of a book, comma-joined
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(DISPLAY_GENRE_LIMIT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
