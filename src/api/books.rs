//! Book endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetail, BookFilter, BookForm, BookSummary},
        pagination::{Page, PageQuery},
    },
    policy::Operation,
    AppState,
};

use super::{form, path_id, FormBody, IdPath, Query, Session};

/// List books, ordered by title
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    params(BookFilter, PageQuery),
    responses(
        (status = 200, description = "One page of books", body = Page<BookSummary>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(filter): Query<BookFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<BookSummary>>> {
    let books = state.services.catalog.list_books(&filter, &page).await?;
    Ok(Json(books))
}

/// Get a book with its author, language, genres and copies
#[utoipa::path(
    get,
    path = "/book/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    path: IdPath<i64>,
) -> AppResult<Json<BookDetail>> {
    let id = path_id(path)?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Empty book form
#[utoipa::path(
    get,
    path = "/book/create",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form data", body = BookForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing add_book capability")
    )
)]
pub async fn create_book_form(session: Session) -> AppResult<Json<BookForm>> {
    session.require(Operation::CreateBook)?;
    Ok(Json(BookForm::default()))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/book/create",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing add_book capability")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    session: Session,
    body: FormBody<BookForm>,
) -> AppResult<(StatusCode, Json<Book>)> {
    session.require(Operation::CreateBook)?;
    let book = state.services.catalog.create_book(form(body)?).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Current values of a book, for editing
#[utoipa::path(
    get,
    path = "/book/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Initial form data", body = BookForm),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing change_book capability"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<BookForm>> {
    session.require(Operation::UpdateBook)?;
    let id = path_id(path)?;
    let form = state.services.catalog.book_form(id).await?;
    Ok(Json(form))
}

/// Update a book
#[utoipa::path(
    post,
    path = "/book/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing change_book capability"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
    body: FormBody<BookForm>,
) -> AppResult<Json<Book>> {
    session.require(Operation::UpdateBook)?;
    let id = path_id(path)?;
    let book = state.services.catalog.update_book(id, form(body)?).await?;
    Ok(Json(book))
}

/// The book about to be deleted
#[utoipa::path(
    get,
    path = "/book/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book to confirm", body = BookDetail),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_book capability"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_form(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<Json<BookDetail>> {
    session.require(Operation::DeleteBook)?;
    let id = path_id(path)?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Delete a book that has no copies
#[utoipa::path(
    post,
    path = "/book/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 302, description = "Login required"),
        (status = 403, description = "Missing delete_book capability"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    session: Session,
    path: IdPath<i64>,
) -> AppResult<StatusCode> {
    session.require(Operation::DeleteBook)?;
    let id = path_id(path)?;
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
