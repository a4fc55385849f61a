//! Loan renewal and borrowed lists

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use library_catalog_server::{
    models::{
        book_instance::{LoanStatus, RenewBookForm, RenewalError},
        validation::REQUIRED,
        UserClaims,
    },
    policy::Capability,
    AppError,
};

use crate::common::{date, spawn_app, today, TestApp};

async fn copy_on_loan(app: &TestApp) -> Uuid {
    let book_id = app.book("Dune", "9780441172719", None).await;
    app.instance(book_id, LoanStatus::OnLoan, Some(today()), None).await
}

#[tokio::test]
async fn test_renew_form_access() {
    let app = spawn_app().await;
    let id = copy_on_loan(&app).await;
    let uri = format!("/book/{}/renew/", id);

    let anonymous = app.get(&uri, None).await;
    assert_eq!(anonymous.status, 302);
    assert_eq!(
        anonymous.location(),
        format!("/accounts/login/?next=%2Fbook%2F{}%2Frenew%2F", id)
    );

    let (_, reader) = app.user("reader", &[], false).await;
    assert_eq!(app.get(&uri, Some(&reader)).await.status, 403);

    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;
    let form = app.get(&uri, Some(&librarian)).await;
    assert_eq!(form.status, 200);
    assert_eq!(
        form.body["renewal_date"],
        (today() + Duration::weeks(3)).to_string()
    );
    assert_eq!(form.body["instance"]["id"], id.to_string());
}

#[tokio::test]
async fn test_renewal_date_validation() {
    let app = spawn_app().await;
    let id = copy_on_loan(&app).await;
    let uri = format!("/book/{}/renew/", id);
    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;

    let past = app
        .post(&uri, Some(&librarian), json!({ "renewal_date": today() - Duration::days(1) }))
        .await;
    assert_eq!(past.status, 400);
    assert_eq!(past.field_messages("renewal_date"), vec![RenewalError::InPast.to_string()]);

    let too_far = app
        .post(&uri, Some(&librarian), json!({ "renewal_date": today() + Duration::days(29) }))
        .await;
    assert_eq!(too_far.status, 400);
    assert_eq!(
        too_far.field_messages("renewal_date"),
        vec![RenewalError::TooFarAhead.to_string()]
    );

    let missing = app.post(&uri, Some(&librarian), json!({})).await;
    assert_eq!(missing.status, 400);
    assert_eq!(missing.field_messages("renewal_date"), vec![REQUIRED.to_string()]);

    let unchanged = app.get(&format!("/instance/{}", id), None).await;
    assert_eq!(unchanged.body["due_back"], today().to_string());

    let last_day = today() + Duration::days(28);
    let renewed = app
        .post(&uri, Some(&librarian), json!({ "renewal_date": last_day }))
        .await;
    assert_eq!(renewed.status, 200);
    assert_eq!(renewed.body["due_back"], last_day.to_string());
    assert_eq!(renewed.body["status"], "o");
}

#[tokio::test]
async fn test_renewal_of_overdue_copy() {
    let app = spawn_app().await;
    let book_id = app.book("Dune", "9780441172719", None).await;
    let id = app
        .instance(book_id, LoanStatus::OnLoan, Some(date(2024, 1, 10)), None)
        .await;

    let form = RenewBookForm {
        renewal_date: Some(date(2024, 1, 12)),
    };
    let renewed = app
        .state
        .services
        .loans
        .renew(id, &form, date(2024, 1, 5))
        .await
        .expect("Renewal should be accepted");
    assert_eq!(renewed.due_back, Some(date(2024, 1, 12)));
    assert_eq!(renewed.status, LoanStatus::OnLoan);
}

#[tokio::test]
async fn test_renew_unknown_copy() {
    let app = spawn_app().await;
    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;

    let response = app
        .post(
            &format!("/book/{}/renew/", Uuid::new_v4()),
            Some(&librarian),
            json!({ "renewal_date": today() }),
        )
        .await;
    assert_eq!(response.status, 404);

    let result = app
        .state
        .services
        .loans
        .renew(Uuid::new_v4(), &RenewBookForm::default(), today())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_my_borrowed_lists_only_own_loans() {
    let app = spawn_app().await;
    let (reader, token) = app.user("reader", &[], false).await;
    let (other, _) = app.user("other", &[], false).await;
    let book_id = app.book("Dune", "9780441172719", None).await;

    for days in (0..12).rev() {
        app.instance(
            book_id,
            LoanStatus::OnLoan,
            Some(today() + Duration::days(days)),
            Some(reader.id),
        )
        .await;
    }
    app.instance(book_id, LoanStatus::Available, None, Some(reader.id)).await;
    app.instance(book_id, LoanStatus::OnLoan, Some(today()), Some(other.id))
        .await;

    let page1 = app.get("/mybooks/", Some(&token)).await;
    assert_eq!(page1.status, 200);
    assert_eq!(page1.body["total"], 12);
    let items = page1.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["due_back"], today().to_string());

    let due: Vec<&str> = items.iter().map(|i| i["due_back"].as_str().unwrap()).collect();
    let mut sorted = due.clone();
    sorted.sort();
    assert_eq!(due, sorted);
    assert!(items
        .iter()
        .all(|i| i["borrower_id"] == reader.id && i["status"] == "o"));

    let page2 = app.get("/mybooks/?page=2", Some(&token)).await;
    assert_eq!(page2.body["items"].as_array().unwrap().len(), 2);

    let anonymous = app.get("/mybooks/", None).await;
    assert_eq!(anonymous.status, 302);
    assert_eq!(anonymous.location(), "/accounts/login/?next=%2Fmybooks%2F");
}

#[tokio::test]
async fn test_all_borrowed_requires_librarian() {
    let app = spawn_app().await;
    let (reader, reader_token) = app.user("reader", &[], false).await;
    let (other, _) = app.user("other", &[], false).await;
    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;
    let book_id = app.book("Dune", "9780441172719", None).await;
    app.instance(book_id, LoanStatus::OnLoan, Some(today()), Some(reader.id)).await;
    app.instance(book_id, LoanStatus::OnLoan, Some(today()), Some(other.id)).await;
    app.instance(book_id, LoanStatus::Reserved, None, None).await;

    assert_eq!(app.get("/borrowed/", Some(&reader_token)).await.status, 403);

    let all = app.get("/borrowed/", Some(&librarian)).await;
    assert_eq!(all.status, 200);
    assert_eq!(all.body["total"], 2);
    assert_eq!(all.body["items"][0]["book_title"], "Dune");
}

#[tokio::test]
async fn test_overdue_flag() {
    let app = spawn_app().await;
    let book_id = app.book("Dune", "9780441172719", None).await;
    let late = app
        .instance(book_id, LoanStatus::OnLoan, Some(today() - Duration::days(1)), None)
        .await;
    let on_time = app.instance(book_id, LoanStatus::OnLoan, Some(today()), None).await;

    let late = app.get(&format!("/instance/{}", late), None).await;
    assert_eq!(late.body["is_overdue"], true);

    let on_time = app.get(&format!("/instance/{}", on_time), None).await;
    assert_eq!(on_time.body["is_overdue"], false);
}

#[tokio::test]
async fn test_renew_malformed_copy_id() {
    let app = spawn_app().await;
    let uri = "/book/not-a-uuid/renew/";

    let anonymous = app.get(uri, None).await;
    assert_eq!(anonymous.status, 302);
    assert_eq!(
        anonymous.location(),
        "/accounts/login/?next=%2Fbook%2Fnot-a-uuid%2Frenew%2F"
    );

    let (_, reader) = app.user("reader", &[], false).await;
    assert_eq!(app.get(uri, Some(&reader)).await.status, 403);

    let (_, librarian) = app.user("librarian", &[Capability::CanMarkReturned], false).await;
    let response = app
        .post(uri, Some(&librarian), json!({ "renewal_date": today() }))
        .await;
    assert_eq!(response.status, 404);
    assert_eq!(response.body["error"], "NoSuchData");
}

#[tokio::test]
async fn test_expired_session_is_sent_to_login() {
    let app = spawn_app().await;
    let (reader, _) = app.user("reader", &[], false).await;

    let issued = Utc::now().timestamp() - 7200;
    let expired = UserClaims {
        sub: reader.username.clone(),
        user_id: reader.id,
        is_superuser: false,
        capabilities: Vec::new(),
        exp: issued + 3600,
        iat: issued,
    }
    .create_token(&app.state.config.auth.jwt_secret)
    .expect("Failed to create token");

    let response = app.get("/mybooks/", Some(&expired)).await;
    assert_eq!(response.status, 302);
    assert_eq!(response.location(), "/accounts/login/?next=%2Fmybooks%2F");
}
