//! Catalog endpoints: lists, pagination, book and author lifecycle, home counts

use serde_json::json;
use uuid::Uuid;

use library_catalog_server::{
    models::{
        book::DUPLICATE_ISBN,
        book_instance::LoanStatus,
        genre::GenreForm,
        validation::{invalid_choice, REQUIRED},
    },
    policy::Capability,
};

use crate::common::{spawn_app, today};

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["status"], "healthy");

    let response = app.get("/ready", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["status"], "ready");
}

#[tokio::test]
async fn test_author_list_paginates_by_ten() {
    let app = spawn_app().await;
    for i in 0..13 {
        app.author("Jane", &format!("Author{:02}", i)).await;
    }

    let page1 = app.get("/authors/", None).await;
    assert_eq!(page1.status, 200);
    assert_eq!(page1.body["items"].as_array().unwrap().len(), 10);
    assert_eq!(page1.body["total"], 13);
    assert_eq!(page1.body["num_pages"], 2);
    assert_eq!(page1.body["is_paginated"], true);
    assert_eq!(page1.body["items"][0]["last_name"], "Author00");

    let page2 = app.get("/authors/?page=2", None).await;
    assert_eq!(page2.status, 200);
    assert_eq!(page2.body["items"].as_array().unwrap().len(), 3);
    assert_eq!(page2.body["items"][2]["last_name"], "Author12");

    let last = app.get("/authors/?page=last", None).await;
    assert_eq!(last.body["page"], 2);

    assert_eq!(app.get("/authors/?page=3", None).await.status, 404);
    assert_eq!(app.get("/authors/?page=0", None).await.status, 404);
    assert_eq!(app.get("/authors/?page=abc", None).await.status, 404);
}

#[tokio::test]
async fn test_empty_list_has_a_first_page() {
    let app = spawn_app().await;

    let response = app.get("/genres/", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["total"], 0);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["is_paginated"], false);

    assert_eq!(app.get("/genres/?page=2", None).await.status, 404);
}

#[tokio::test]
async fn test_book_title_filter() {
    let app = spawn_app().await;
    app.book("The Hobbit", "9780261102217", None).await;
    app.book("Dune", "9780441172719", None).await;

    let response = app.get("/books/?title=hob", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["items"][0]["title"], "The Hobbit");
}

#[tokio::test]
async fn test_create_book_requires_login_then_capability() {
    let app = spawn_app().await;
    let book = json!({ "title": "Dune", "summary": "Spice", "isbn": "9780441172719" });

    let anonymous = app.post("/book/create", None, book.clone()).await;
    assert_eq!(anonymous.status, 302);
    assert_eq!(anonymous.location(), "/accounts/login/?next=%2Fbook%2Fcreate");

    let (_, reader) = app.user("reader", &[], false).await;
    let forbidden = app.post("/book/create", Some(&reader), book).await;
    assert_eq!(forbidden.status, 403);

    assert_eq!(app.get("/books/", None).await.body["total"], 0);
}

#[tokio::test]
async fn test_duplicate_isbn_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.user("cataloguer", &[Capability::AddBook], false).await;
    let book = json!({ "title": "Dune", "summary": "Spice", "isbn": "9780441172719" });

    let created = app.post("/book/create", Some(&token), book.clone()).await;
    assert_eq!(created.status, 201);
    assert_eq!(created.body["isbn"], "9780441172719");

    let duplicate = app.post("/book/create", Some(&token), book).await;
    assert_eq!(duplicate.status, 400);
    assert_eq!(duplicate.field_messages("isbn"), vec![DUPLICATE_ISBN.to_string()]);
}

#[tokio::test]
async fn test_book_form_reports_every_missing_field() {
    let app = spawn_app().await;
    let (_, token) = app.user("cataloguer", &[Capability::AddBook], false).await;

    let response = app
        .post("/book/create", Some(&token), json!({ "author_id": 999, "isbn": "97804411727190" }))
        .await;
    assert_eq!(response.status, 400);
    assert_eq!(response.field_messages("title"), vec![REQUIRED.to_string()]);
    assert_eq!(response.field_messages("summary"), vec![REQUIRED.to_string()]);
    assert_eq!(response.field_messages("isbn").len(), 1);
    assert_eq!(response.field_messages("author_id").len(), 1);
}

#[tokio::test]
async fn test_book_detail_shows_three_genres() {
    let app = spawn_app().await;
    let mut genre_ids = Vec::new();
    for name in ["Fantasy", "Adventure", "Classic", "Children"] {
        let genre = app
            .repository
            .genres
            .create(&GenreForm { name: name.to_string() })
            .await
            .expect("Failed to create genre");
        genre_ids.push(genre.id);
    }
    let (_, token) = app.user("cataloguer", &[Capability::AddBook], false).await;

    let created = app
        .post(
            "/book/create",
            Some(&token),
            json!({
                "title": "The Hobbit",
                "summary": "There and back again",
                "isbn": "9780261102217",
                "genre_ids": genre_ids
            }),
        )
        .await;
    assert_eq!(created.status, 201);

    let detail = app.get(&format!("/book/{}", created.body["id"]), None).await;
    assert_eq!(detail.status, 200);
    assert_eq!(detail.body["genres"].as_array().unwrap().len(), 4);
    assert_eq!(detail.body["display_genre"], "Fantasy, Adventure, Classic");
}

#[tokio::test]
async fn test_deleting_author_keeps_their_books() {
    let app = spawn_app().await;
    let author_id = app.author("Frank", "Herbert").await;
    let book_id = app.book("Dune", "9780441172719", Some(author_id)).await;
    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;

    let before = app.get(&format!("/book/{}", book_id), None).await;
    assert_eq!(before.body["author"]["last_name"], "Herbert");

    let deleted = app
        .post(&format!("/author/{}/delete", author_id), Some(&librarian), json!({}))
        .await;
    assert_eq!(deleted.status, 204);

    let after = app.get(&format!("/book/{}", book_id), None).await;
    assert_eq!(after.status, 200);
    assert!(after.body["book"]["author_id"].is_null());
    assert!(after.body["author"].is_null());

    assert_eq!(app.get(&format!("/author/{}", author_id), None).await.status, 404);
}

#[tokio::test]
async fn test_book_with_copies_cannot_be_deleted() {
    let app = spawn_app().await;
    let book_id = app.book("Dune", "9780441172719", None).await;
    app.instance(book_id, LoanStatus::Available, None, None).await;
    let (_, token) = app.user("cataloguer", &[Capability::DeleteBook], false).await;

    let response = app
        .post(&format!("/book/{}/delete", book_id), Some(&token), json!({}))
        .await;
    assert_eq!(response.status, 409);

    let detail = app.get(&format!("/book/{}", book_id), None).await;
    assert_eq!(detail.status, 200);
    assert_eq!(detail.body["instances"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_and_delete_publisher() {
    let app = spawn_app().await;
    let (_, token) = app
        .user(
            "cataloguer",
            &[Capability::AddPublisher, Capability::ChangePublisher, Capability::DeletePublisher],
            false,
        )
        .await;

    let created = app
        .post("/publisher/create", Some(&token), json!({ "name": "Chilton" }))
        .await;
    assert_eq!(created.status, 201);
    let id = created.body["id"].clone();

    let updated = app
        .post(&format!("/publisher/{}/update", id), Some(&token), json!({ "name": "Chilton Books" }))
        .await;
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body["name"], "Chilton Books");

    let form = app.get(&format!("/publisher/{}/update", id), Some(&token)).await;
    assert_eq!(form.body["name"], "Chilton Books");

    let deleted = app
        .post(&format!("/publisher/{}/delete", id), Some(&token), json!({}))
        .await;
    assert_eq!(deleted.status, 204);
    assert_eq!(app.get(&format!("/publisher/{}", id), None).await.status, 404);
}

#[tokio::test]
async fn test_genre_name_is_required() {
    let app = spawn_app().await;
    let (_, token) = app.user("cataloguer", &[Capability::AddGenre], false).await;

    let response = app.post("/genre/create", Some(&token), json!({ "name": "   " })).await;
    assert_eq!(response.status, 400);
    assert_eq!(response.field_messages("name"), vec![REQUIRED.to_string()]);
}

#[tokio::test]
async fn test_index_counts_are_independent() {
    let app = spawn_app().await;
    let author_id = app.author("Frank", "Herbert").await;
    let dune = app.book("Dune", "9780441172719", Some(author_id)).await;
    let messiah = app.book("Dune Messiah", "9780441172696", Some(author_id)).await;
    app.instance(dune, LoanStatus::Available, None, None).await;
    app.instance(dune, LoanStatus::Available, None, None).await;
    app.instance(messiah, LoanStatus::OnLoan, Some(today()), None).await;
    for name in ["Fantasy", "Science Fiction"] {
        app.repository
            .genres
            .create(&GenreForm { name: name.to_string() })
            .await
            .expect("Failed to create genre");
    }

    let response = app.get("/?genre_contains=Fic", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["num_books"], 2);
    assert_eq!(response.body["num_instances"], 3);
    assert_eq!(response.body["num_instances_available"], 2);
    assert_eq!(response.body["num_authors"], 1);
    assert_eq!(response.body["num_genres"], 2);
    assert_eq!(response.body["num_genres_matching"], 1);

    let plain = app.get("/", None).await;
    assert!(plain.body.get("num_genres_matching").is_none());
}

#[tokio::test]
async fn test_malformed_ids_are_not_found() {
    let app = spawn_app().await;
    let (_, cataloguer) = app.user("cataloguer", &[Capability::ChangeBook], false).await;

    let book = app.get("/book/abc", None).await;
    assert_eq!(book.status, 404);
    assert_eq!(book.body["error"], "NoSuchData");

    assert_eq!(app.get("/instance/not-a-uuid", None).await.status, 404);
    assert_eq!(app.get("/author/1.5", None).await.status, 404);

    let anonymous = app.get("/book/abc/update", None).await;
    assert_eq!(anonymous.status, 302);
    assert_eq!(anonymous.location(), "/accounts/login/?next=%2Fbook%2Fabc%2Fupdate");

    let (_, reader) = app.user("reader", &[], false).await;
    assert_eq!(app.get("/book/abc/update", Some(&reader)).await.status, 403);
    assert_eq!(app.get("/book/abc/update", Some(&cataloguer)).await.status, 404);
}

#[tokio::test]
async fn test_bad_query_value_uses_error_body() {
    let app = spawn_app().await;

    let response = app.get("/instances/?status=x", None).await;
    assert_eq!(response.status, 400);
    assert_eq!(response.body["error"], "BadValue");

    let available = app.get("/instances/?status=a", None).await;
    assert_eq!(available.status, 200);
}

#[tokio::test]
async fn test_instance_crud_and_default_status() {
    let app = spawn_app().await;
    let book_id = app.book("Dune", "9780441172719", None).await;
    let (_, adder) = app.user("adder", &[Capability::AddBookinstance], false).await;
    let (_, changer) = app.user("changer", &[Capability::ChangeBookinstance], false).await;
    let (_, deleter) = app.user("deleter", &[Capability::DeleteBookinstance], false).await;
    let copy = json!({ "book_id": book_id, "imprint": "Ace, 1990" });

    assert_eq!(app.post("/instance/create", None, copy.clone()).await.status, 302);
    assert_eq!(app.post("/instance/create", Some(&changer), copy.clone()).await.status, 403);

    let created = app.post("/instance/create", Some(&adder), copy).await;
    assert_eq!(created.status, 201);
    assert_eq!(created.body["status"], "m");
    assert_eq!(created.body["book_title"], "Dune");
    let id: Uuid = created.body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("Copy id should be a UUID");

    let update_uri = format!("/instance/{}/update", id);
    let update = json!({ "book_id": book_id, "imprint": "Ace, 1990", "status": "a" });
    assert_eq!(app.post(&update_uri, Some(&adder), update.clone()).await.status, 403);
    let updated = app.post(&update_uri, Some(&changer), update).await;
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body["status"], "a");

    let delete_uri = format!("/instance/{}/delete", id);
    assert_eq!(app.post(&delete_uri, Some(&changer), json!({})).await.status, 403);
    assert_eq!(app.post(&delete_uri, Some(&deleter), json!({})).await.status, 204);
    assert_eq!(app.get(&format!("/instance/{}", id), None).await.status, 404);
}

#[tokio::test]
async fn test_instance_references_must_exist() {
    let app = spawn_app().await;
    let (_, adder) = app.user("adder", &[Capability::AddBookinstance], false).await;

    let response = app
        .post(
            "/instance/create",
            Some(&adder),
            json!({ "book_id": 999, "imprint": "Ace, 1990", "publisher_id": 998, "borrower_id": 997 }),
        )
        .await;
    assert_eq!(response.status, 400);
    assert_eq!(response.field_messages("book_id"), vec![invalid_choice(999)]);
    assert_eq!(response.field_messages("publisher_id"), vec![invalid_choice(998)]);
    assert_eq!(response.field_messages("borrower_id"), vec![invalid_choice(997)]);
    assert_eq!(app.get("/instances/", None).await.body["total"], 0);
}

#[tokio::test]
async fn test_genre_edit_and_delete_capabilities() {
    let app = spawn_app().await;
    let genre = app
        .repository
        .genres
        .create(&GenreForm { name: "SciFi".to_string() })
        .await
        .expect("Failed to create genre");
    let (_, editor) = app.user("editor", &[Capability::ChangeGenre], false).await;
    let (_, remover) = app.user("remover", &[Capability::DeleteGenre], false).await;
    let edit_uri = format!("/genre/{}/edit", genre.id);
    let delete_uri = format!("/genre/{}/delete", genre.id);

    let rename = json!({ "name": "Science Fiction" });
    assert_eq!(app.post(&edit_uri, Some(&remover), rename.clone()).await.status, 403);
    let edited = app.post(&edit_uri, Some(&editor), rename).await;
    assert_eq!(edited.status, 200);
    assert_eq!(edited.body["name"], "Science Fiction");

    assert_eq!(app.post(&delete_uri, Some(&editor), json!({})).await.status, 403);
    assert_eq!(app.post(&delete_uri, Some(&remover), json!({})).await.status, 204);
    assert_eq!(app.get(&format!("/genre/{}", genre.id), None).await.status, 404);
}

#[tokio::test]
async fn test_author_update_requires_librarian() {
    let app = spawn_app().await;
    let author_id = app.author("Frank", "Herbert").await;
    let (_, reader) = app.user("reader", &[], false).await;
    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;
    let uri = format!("/author/{}/update", author_id);
    let form = json!({ "first_name": "Frank", "last_name": "Herbert Jr", "date_of_birth": "1920-10-08" });

    assert_eq!(app.post(&uri, Some(&reader), form.clone()).await.status, 403);

    let updated = app.post(&uri, Some(&librarian), form).await;
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body["last_name"], "Herbert Jr");
    assert_eq!(updated.body["date_of_birth"], "1920-10-08");
}

#[tokio::test]
async fn test_undated_copies_list_last() {
    let app = spawn_app().await;
    let book_id = app.book("Dune", "9780441172719", None).await;
    let undated = app.instance(book_id, LoanStatus::Available, None, None).await;
    let dated = app.instance(book_id, LoanStatus::OnLoan, Some(today()), None).await;

    let response = app.get("/instances/", None).await;
    assert_eq!(response.body["items"][0]["id"], dated.to_string());
    assert_eq!(response.body["items"][1]["id"], undated.to_string());
}
