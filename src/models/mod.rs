//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod pagination;
pub mod publisher;
pub mod user;
pub mod validation;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookSummary};
pub use book_instance::{BookInstanceDetails, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use pagination::{Page, PageQuery, PageWindow};
pub use publisher::Publisher;
pub use user::{User, UserClaims};
