//! Catalog management service: authors, books, genres, languages, publishers

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail, AuthorForm},
        book::{display_genre, Book, BookDetail, BookFilter, BookForm, BookSummary, DUPLICATE_ISBN},
        genre::{Genre, GenreDetail, GenreForm},
        language::{Language, LanguageDetail, LanguageForm},
        pagination::{Page, PageQuery, PageWindow},
        publisher::{Publisher, PublisherDetail, PublisherForm},
        validation::{invalid_choice, FormErrors},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    page_size: i64,
}

impl CatalogService {
    pub fn new(repository: Repository, page_size: i64) -> Self {
        Self { repository, page_size }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, filter: &BookFilter, page: &PageQuery) -> AppResult<Page<BookSummary>> {
        let total = self.repository.books.count(filter).await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let books = self
            .repository
            .books
            .list(filter, window.limit(), window.offset())
            .await?;
        Ok(window.wrap(books, total))
    }

    /// Book with its author, language, genres and copies
    pub async fn get_book(&self, id: i64) -> AppResult<BookDetail> {
        let book = self.repository.books.get_by_id(id).await?;
        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => Some(self.repository.languages.get_by_id(language_id).await?),
            None => None,
        };
        let genres = self.repository.books.genres_of(id).await?;
        let instances = self.repository.instances.list_for_book(id).await?;

        Ok(BookDetail {
            display_genre: display_genre(&genres),
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    /// Initial data for the book update form
    pub async fn book_form(&self, id: i64) -> AppResult<BookForm> {
        let book = self.repository.books.get_by_id(id).await?;
        let genres = self.repository.books.genres_of(id).await?;
        Ok(BookForm::from_book(&book, &genres))
    }

    pub async fn create_book(&self, mut form: BookForm) -> AppResult<Book> {
        self.validate_book(&mut form, None).await?;
        let book = self.repository.books.create(&form).await?;
        tracing::info!("Created book {} ({})", book.id, book.isbn);
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, mut form: BookForm) -> AppResult<Book> {
        // Missing books are reported before any field error
        self.repository.books.get_by_id(id).await?;
        self.validate_book(&mut form, Some(id)).await?;
        let book = self.repository.books.update(id, &form).await?;
        tracing::info!("Updated book {}", id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    async fn validate_book(&self, form: &mut BookForm, exclude_id: Option<i64>) -> AppResult<()> {
        let mut errors = FormErrors::from(form.clean());

        if let Some(author_id) = form.author_id {
            if !self.repository.authors.exists(author_id).await? {
                errors.push("author_id", invalid_choice(author_id));
            }
        }
        if let Some(language_id) = form.language_id {
            if !self.repository.languages.exists(language_id).await? {
                errors.push("language_id", invalid_choice(language_id));
            }
        }
        let missing = self.repository.genres.missing(&form.genre_ids).await?;
        if let Some(genre_id) = missing.first() {
            errors.push("genre_ids", invalid_choice(*genre_id));
        }
        if !form.isbn.is_empty() && self.repository.books.isbn_exists(&form.isbn, exclude_id).await? {
            errors.push("isbn", DUPLICATE_ISBN);
        }

        errors.into_result()
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: &PageQuery) -> AppResult<Page<Author>> {
        let total = self.repository.authors.count().await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let authors = self.repository.authors.list(window.limit(), window.offset()).await?;
        Ok(window.wrap(authors, total))
    }

    pub async fn get_author(&self, id: i64) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub async fn author_form(&self, id: i64) -> AppResult<AuthorForm> {
        let author = self.repository.authors.get_by_id(id).await?;
        Ok(AuthorForm::from(&author))
    }

    pub async fn create_author(&self, mut form: AuthorForm) -> AppResult<Author> {
        FormErrors::from(form.clean()).into_result()?;
        let author = self.repository.authors.create(&form).await?;
        tracing::info!("Created author {} ({})", author.id, author);
        Ok(author)
    }

    pub async fn update_author(&self, id: i64, mut form: AuthorForm) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await?;
        FormErrors::from(form.clean()).into_result()?;
        let author = self.repository.authors.update(id, &form).await?;
        tracing::info!("Updated author {}", id);
        Ok(author)
    }

    /// Delete an author; their books stay in the catalog without one
    pub async fn delete_author(&self, id: i64) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self, page: &PageQuery) -> AppResult<Page<Genre>> {
        let total = self.repository.genres.count().await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let genres = self.repository.genres.list(window.limit(), window.offset()).await?;
        Ok(window.wrap(genres, total))
    }

    pub async fn get_genre(&self, id: i64) -> AppResult<GenreDetail> {
        let genre = self.repository.genres.get_by_id(id).await?;
        let books = self.repository.books.list_by_genre(id).await?;
        Ok(GenreDetail { genre, books })
    }

    pub async fn genre_form(&self, id: i64) -> AppResult<GenreForm> {
        let genre = self.repository.genres.get_by_id(id).await?;
        Ok(GenreForm::from(&genre))
    }

    pub async fn create_genre(&self, mut form: GenreForm) -> AppResult<Genre> {
        FormErrors::from(form.clean()).into_result()?;
        let genre = self.repository.genres.create(&form).await?;
        tracing::info!("Created genre {} ({})", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i64, mut form: GenreForm) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await?;
        FormErrors::from(form.clean()).into_result()?;
        let genre = self.repository.genres.update(id, &form).await?;
        tracing::info!("Updated genre {}", id);
        Ok(genre)
    }

    pub async fn delete_genre(&self, id: i64) -> AppResult<()> {
        self.repository.genres.delete(id).await?;
        tracing::info!("Deleted genre {}", id);
        Ok(())
    }

    // =========================================================================
    // LANGUAGES
    // =========================================================================

    pub async fn list_languages(&self, page: &PageQuery) -> AppResult<Page<Language>> {
        let total = self.repository.languages.count().await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let languages = self.repository.languages.list(window.limit(), window.offset()).await?;
        Ok(window.wrap(languages, total))
    }

    pub async fn get_language(&self, id: i64) -> AppResult<LanguageDetail> {
        let language = self.repository.languages.get_by_id(id).await?;
        let books = self.repository.books.list_by_language(id).await?;
        Ok(LanguageDetail { language, books })
    }

    pub async fn create_language(&self, mut form: LanguageForm) -> AppResult<Language> {
        FormErrors::from(form.clean()).into_result()?;
        let language = self.repository.languages.create(&form).await?;
        tracing::info!("Created language {}", language.id);
        Ok(language)
    }

    // =========================================================================
    // PUBLISHERS
    // =========================================================================

    pub async fn list_publishers(&self, page: &PageQuery) -> AppResult<Page<Publisher>> {
        let total = self.repository.publishers.count().await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let publishers = self.repository.publishers.list(window.limit(), window.offset()).await?;
        Ok(window.wrap(publishers, total))
    }

    pub async fn get_publisher(&self, id: i64) -> AppResult<PublisherDetail> {
        let publisher = self.repository.publishers.get_by_id(id).await?;
        let instances = self.repository.instances.list_for_publisher(id).await?;
        Ok(PublisherDetail { publisher, instances })
    }

    pub async fn publisher_form(&self, id: i64) -> AppResult<PublisherForm> {
        let publisher = self.repository.publishers.get_by_id(id).await?;
        Ok(PublisherForm::from(&publisher))
    }

    pub async fn create_publisher(&self, mut form: PublisherForm) -> AppResult<Publisher> {
        FormErrors::from(form.clean()).into_result()?;
        let publisher = self.repository.publishers.create(&form).await?;
        tracing::info!("Created publisher {} ({})", publisher.id, publisher.name);
        Ok(publisher)
    }

    pub async fn update_publisher(&self, id: i64, mut form: PublisherForm) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await?;
        FormErrors::from(form.clean()).into_result()?;
        let publisher = self.repository.publishers.update(id, &form).await?;
        tracing::info!("Updated publisher {}", id);
        Ok(publisher)
    }

    pub async fn delete_publisher(&self, id: i64) -> AppResult<()> {
        self.repository.publishers.delete(id).await?;
        tracing::info!("Deleted publisher {}", id);
        Ok(())
    }
}
