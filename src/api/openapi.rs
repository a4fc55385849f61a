//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, authors, books, genres, health, index, instances, languages, loans, publishers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Catalog API",
        version = "0.1.0",
        description = "Books, authors, genres, languages, publishers, copies and loans"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        index::index,
        // Books
        books::list_books,
        books::get_book,
        books::create_book_form,
        books::create_book,
        books::update_book_form,
        books::update_book,
        books::delete_book_form,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author_form,
        authors::create_author,
        authors::update_author_form,
        authors::update_author,
        authors::delete_author_form,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre_form,
        genres::create_genre,
        genres::update_genre_form,
        genres::update_genre,
        genres::delete_genre_form,
        genres::delete_genre,
        // Languages
        languages::list_languages,
        languages::get_language,
        languages::create_language_form,
        languages::create_language,
        // Publishers
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher_form,
        publishers::create_publisher,
        publishers::update_publisher_form,
        publishers::update_publisher,
        publishers::delete_publisher_form,
        publishers::delete_publisher,
        // Book instances
        instances::list_instances,
        instances::get_instance,
        instances::create_instance_form,
        instances::create_instance,
        instances::update_instance_form,
        instances::update_instance,
        instances::delete_instance_form,
        instances::delete_instance,
        // Loans
        loans::renew_form,
        loans::renew,
        loans::my_borrowed,
        loans::all_borrowed,
        // Accounts
        accounts::login_form,
        accounts::login,
        accounts::sign_up_form,
        accounts::sign_up,
        accounts::me,
        accounts::get_capabilities,
        accounts::set_capabilities,
    ),
    components(
        schemas(
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetail,
            crate::models::book::BookForm,
            crate::models::genre::Genre,
            crate::models::genre::GenreDetail,
            crate::models::genre::GenreForm,
            crate::models::language::Language,
            crate::models::language::LanguageDetail,
            crate::models::language::LanguageForm,
            crate::models::publisher::Publisher,
            crate::models::publisher::PublisherDetail,
            crate::models::publisher::PublisherForm,
            // Copies and loans
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstanceDetails,
            crate::models::book_instance::BookInstanceForm,
            crate::models::book_instance::RenewBookForm,
            crate::models::book_instance::RenewBookPage,
            // Accounts
            crate::models::user::UserInfo,
            crate::models::user::SignUpForm,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::CapabilitiesForm,
            crate::policy::Capability,
            accounts::LoginPage,
            // Home
            crate::services::stats::CatalogCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog home page"),
        (name = "books", description = "Book management"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "languages", description = "Language management"),
        (name = "publishers", description = "Publisher management"),
        (name = "instances", description = "Book copy management"),
        (name = "loans", description = "Renewals and borrowed copies"),
        (name = "accounts", description = "Login, sign-up and capabilities")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
