//! Sign-up, login and capability management

use serde_json::json;

use library_catalog_server::{models::user::DUPLICATE_USERNAME, policy::Capability};

use crate::common::spawn_app;

fn sign_up_body(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "first_name": "Ada",
        "last_name": "Reader",
        "password1": "correct horse battery",
        "password2": "correct horse battery"
    })
}

#[tokio::test]
async fn test_sign_up_then_login() {
    let app = spawn_app().await;

    let created = app.post("/accounts/signup/", None, sign_up_body("ada")).await;
    assert_eq!(created.status, 201);
    assert_eq!(created.body["username"], "ada");
    assert_eq!(created.body["capabilities"], json!([]));
    assert!(created.body.get("password_hash").is_none());

    let login = app
        .post(
            "/accounts/login/",
            None,
            json!({ "username": "ada", "password": "correct horse battery", "next": "/mybooks/" }),
        )
        .await;
    assert_eq!(login.status, 200);
    assert_eq!(login.body["token_type"], "Bearer");
    assert_eq!(login.body["expires_in"], 24 * 3600);
    assert_eq!(login.body["next"], "/mybooks/");
    let token = login.body["token"].as_str().expect("No token").to_string();

    let me = app.get("/accounts/me", Some(&token)).await;
    assert_eq!(me.status, 200);
    assert_eq!(me.body["username"], "ada");
    assert_eq!(me.body["first_name"], "Ada");

    let borrowed = app.get("/mybooks/", Some(&token)).await;
    assert_eq!(borrowed.status, 200);
    assert_eq!(borrowed.body["total"], 0);
}

#[tokio::test]
async fn test_sign_up_rejects_duplicates_and_mismatch() {
    let app = spawn_app().await;
    assert_eq!(app.post("/accounts/signup/", None, sign_up_body("ada")).await.status, 201);

    let duplicate = app.post("/accounts/signup/", None, sign_up_body("ada")).await;
    assert_eq!(duplicate.status, 400);
    assert_eq!(
        duplicate.field_messages("username"),
        vec![DUPLICATE_USERNAME.to_string()]
    );

    let mut mismatch = sign_up_body("grace");
    mismatch["password2"] = json!("something else entirely");
    let response = app.post("/accounts/signup/", None, mismatch).await;
    assert_eq!(response.status, 400);
    assert_eq!(response.field_messages("password2").len(), 1);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    app.post("/accounts/signup/", None, sign_up_body("ada")).await;

    let response = app
        .post("/accounts/login/", None, json!({ "username": "ada", "password": "guess" }))
        .await;
    assert_eq!(response.status, 401);

    let unknown = app
        .post("/accounts/login/", None, json!({ "username": "nobody", "password": "guess" }))
        .await;
    assert_eq!(unknown.status, 401);
}

#[tokio::test]
async fn test_login_form_echoes_next() {
    let app = spawn_app().await;

    let response = app.get("/accounts/login/?next=%2Fbook%2Fcreate", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["next"], "/book/create");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = spawn_app().await;

    let response = app.get("/accounts/me", Some("not-a-jwt")).await;
    assert_eq!(response.status, 401);

    let anonymous = app.get("/accounts/me", None).await;
    assert_eq!(anonymous.status, 302);
}

#[tokio::test]
async fn test_superuser_grants_capabilities() {
    let app = spawn_app().await;
    let (_, admin) = app.user("admin", &[], true).await;
    let (reader, reader_token) = app.user("reader", &[], false).await;
    let uri = format!("/accounts/{}/capabilities", reader.id);
    let grant = json!({ "capabilities": ["add_book", "can_mark_returned", "add_book"], "is_superuser": false });

    let forbidden = app.post(&uri, Some(&reader_token), grant.clone()).await;
    assert_eq!(forbidden.status, 403);

    let granted = app.post(&uri, Some(&admin), grant).await;
    assert_eq!(granted.status, 200);
    assert_eq!(
        granted.body["capabilities"],
        json!(["add_book", "can_mark_returned"])
    );

    let stored = app
        .repository
        .users
        .capabilities(reader.id)
        .await
        .expect("Failed to read capabilities");
    assert_eq!(stored, vec![Capability::AddBook, Capability::CanMarkReturned]);

    let listed = app.get(&uri, Some(&admin)).await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body["username"], "reader");

    let missing = app
        .post("/accounts/9999/capabilities", Some(&admin), json!({ "capabilities": [] }))
        .await;
    assert_eq!(missing.status, 404);
}
