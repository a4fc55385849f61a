//! Books repository for database operations

use sqlx::{Pool, Sqlite, Transaction};

use super::{is_foreign_key_violation, is_unique_violation};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{display_genre, Book, BookFilter, BookForm, BookSummary, DUPLICATE_ISBN},
        genre::Genre,
    },
};

const SUMMARY_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.author_id,
           CASE WHEN a.id IS NULL THEN NULL ELSE a.last_name || ', ' || a.first_name END AS author_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check whether an ISBN is taken by a book other than `exclude_id`
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2 IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Genres of a book, in the order they were created
    pub async fn genres_of(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    // =========================================================================
    // LISTS
    // =========================================================================

    pub async fn count(&self, filter: &BookFilter) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE ($1 IS NULL OR instr(lower(title), lower($1)) > 0)",
        )
        .bind(filter.title.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// One page of books, ordered by title
    pub async fn list(&self, filter: &BookFilter, limit: i64, offset: i64) -> AppResult<Vec<BookSummary>> {
        let sql = format!(
            "{} WHERE ($1 IS NULL OR instr(lower(b.title), lower($1)) > 0) ORDER BY b.title, b.id LIMIT $2 OFFSET $3",
            SUMMARY_SELECT
        );
        let books = sqlx::query_as::<_, BookSummary>(&sql)
            .bind(filter.title.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        self.with_genres(books).await
    }

    pub async fn list_by_author(&self, author_id: i64) -> AppResult<Vec<BookSummary>> {
        let sql = format!("{} WHERE b.author_id = $1 ORDER BY b.title, b.id", SUMMARY_SELECT);
        let books = sqlx::query_as::<_, BookSummary>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        self.with_genres(books).await
    }

    pub async fn list_by_genre(&self, genre_id: i64) -> AppResult<Vec<BookSummary>> {
        let sql = format!(
            "{} JOIN book_genres bg ON bg.book_id = b.id WHERE bg.genre_id = $1 ORDER BY b.title, b.id",
            SUMMARY_SELECT
        );
        let books = sqlx::query_as::<_, BookSummary>(&sql)
            .bind(genre_id)
            .fetch_all(&self.pool)
            .await?;
        self.with_genres(books).await
    }

    pub async fn list_by_language(&self, language_id: i64) -> AppResult<Vec<BookSummary>> {
        let sql = format!("{} WHERE b.language_id = $1 ORDER BY b.title, b.id", SUMMARY_SELECT);
        let books = sqlx::query_as::<_, BookSummary>(&sql)
            .bind(language_id)
            .fetch_all(&self.pool)
            .await?;
        self.with_genres(books).await
    }

    async fn with_genres(&self, mut books: Vec<BookSummary>) -> AppResult<Vec<BookSummary>> {
        for book in books.iter_mut() {
            let genres = self.genres_of(book.id).await?;
            book.display_genre = display_genre(&genres);
        }
        Ok(books)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a book and its genre links in one transaction
    pub async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, summary, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&form.title)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.author_id)
        .bind(form.language_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        link_genres(&mut tx, book.id, &form.genre_ids).await?;
        tx.commit().await?;

        Ok(book)
    }

    /// Replace a book's fields and genre links
    pub async fn update(&self, id: i64, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, summary = $2, isbn = $3, author_id = $4, language_id = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&form.title)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.author_id)
        .bind(form.language_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_genres(&mut tx, id, &form.genre_ids).await?;
        tx.commit().await?;

        Ok(book)
    }

    /// Delete a book. Refused while copies of it exist.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let copies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if copies > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} still has copies ({}) and cannot be deleted",
                id, copies
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(format!("Book {} still has copies and cannot be deleted", id))
                } else {
                    AppError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        self.count(&BookFilter::default()).await
    }
}

async fn link_genres(tx: &mut Transaction<'_, Sqlite>, book_id: i64, genre_ids: &[i64]) -> AppResult<()> {
    for genre_id in genre_ids {
        sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

/// Constraint failures that slipped past validation become field errors
fn map_write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::field("isbn", DUPLICATE_ISBN)
    } else if is_foreign_key_violation(&err) {
        AppError::BadRequest("Referenced author or language does not exist".to_string())
    } else {
        AppError::Database(err)
    }
}
