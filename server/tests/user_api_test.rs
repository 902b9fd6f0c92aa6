mod common;

use axum::http::StatusCode;
use common::{TestApp, TestRequest, PASSWORD};
use diesel::prelude::*;
use recipe_server::auth::verify_password;
use recipe_server::models::User;
use recipe_server::schema::users;
use serde_json::json;

fn find_user(app: &TestApp, email: &str) -> Option<User> {
    users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(&mut app.conn())
        .optional()
        .unwrap()
}

#[tokio::test]
async fn test_create_valid_user_success() {
    let app = TestApp::new();

    let res = app
        .send(TestRequest::post("/user/create/").json(&json!({
            "email": "test@example.com",
            "password": "testpass",
            "name": "Test name",
        })))
        .await
        .assert_status(StatusCode::CREATED);

    let body = res.json();
    assert_eq!(body, json!({ "email": "test@example.com", "name": "Test name" }));
    assert!(body.get("password").is_none());

    let user = find_user(&app, "test@example.com").expect("user should exist");
    assert!(verify_password("testpass", &user.password_hash));
}

#[tokio::test]
async fn test_user_exists() {
    let app = TestApp::new();
    app.create_user("test@example.com");

    let res = app
        .send(TestRequest::post("/user/create/").json(&json!({
            "email": "test@example.com",
            "password": "testpass",
            "name": "Test",
        })))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(res.json()["fields"]["email"].is_array());
}

#[tokio::test]
async fn test_password_too_short() {
    let app = TestApp::new();

    let res = app
        .send(TestRequest::post("/user/create/").json(&json!({
            "email": "test@example.com",
            "password": "pw",
            "name": "Test",
        })))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(res.json()["fields"]["password"].is_array());
    assert!(find_user(&app, "test@example.com").is_none());
}

#[tokio::test]
async fn test_create_user_rejects_invalid_email_and_missing_name() {
    let app = TestApp::new();

    let res = app
        .send(TestRequest::post("/user/create/").json(&json!({
            "email": "not-an-email",
            "password": "testpass",
        })))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let fields = &res.json()["fields"];
    assert!(fields["email"].is_array());
    assert_eq!(fields["name"][0], "This field is required.");
}

#[tokio::test]
async fn test_create_user_normalizes_email_domain() {
    let app = TestApp::new();

    let res = app
        .send(TestRequest::post("/user/create/").json(&json!({
            "email": "Cook@EXAMPLE.com",
            "password": "testpass",
            "name": "Cook",
        })))
        .await
        .assert_status(StatusCode::CREATED);

    assert_eq!(res.json()["email"], "Cook@example.com");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let res = app
        .send(TestRequest::post("/user/create/").header("content-type", "application/json"))
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());
}

#[tokio::test]
async fn test_create_token_for_user() {
    let app = TestApp::new();
    app.create_user("test@example.com");

    let res = app
        .send(TestRequest::post("/user/token/").json(&json!({
            "email": "test@example.com",
            "password": PASSWORD,
        })))
        .await
        .assert_status(StatusCode::OK);

    let token = res.json()["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // The issued token authenticates
    let me = app
        .send(TestRequest::get("/user/me/").bearer(&token))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(me.json()["email"], "test@example.com");

    let user = find_user(&app, "test@example.com").unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn test_create_token_bad_credentials() {
    let app = TestApp::new();
    app.create_user("test@example.com");

    let res = app
        .send(TestRequest::post("/user/token/").json(&json!({
            "email": "test@example.com",
            "password": "wrongpass",
        })))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let body = res.json();
    assert!(body.get("token").is_none());
    assert_eq!(
        body["fields"]["non_field_errors"][0],
        "Unable to authenticate with provided credentials."
    );
}

#[tokio::test]
async fn test_create_token_unknown_email() {
    let app = TestApp::new();

    let res = app
        .send(TestRequest::post("/user/token/").json(&json!({
            "email": "nobody@example.com",
            "password": PASSWORD,
        })))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(res.json().get("token").is_none());
}

#[tokio::test]
async fn test_create_token_blank_password() {
    let app = TestApp::new();
    app.create_user("test@example.com");

    let res = app
        .send(TestRequest::post("/user/token/").json(&json!({
            "email": "test@example.com",
            "password": "",
        })))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(
        res.json()["fields"]["password"][0],
        "This field may not be blank."
    );
}

#[tokio::test]
async fn test_retrieve_user_unauthorized() {
    let app = TestApp::new();

    app.send(TestRequest::get("/user/me/"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.send(TestRequest::get("/user/me/").bearer("not-a-real-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_scheme_accepted() {
    let app = TestApp::new();
    let (_, token) = app.login("test@example.com");

    app.send(TestRequest::get("/user/me/").header("authorization", &format!("Token {}", token)))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_retrieve_profile_success() {
    let app = TestApp::new();
    let (_, token) = app.login("test@example.com");

    let res = app
        .send(TestRequest::get("/user/me/").bearer(&token))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(
        res.json(),
        json!({ "email": "test@example.com", "name": "Test Name" })
    );
}

#[tokio::test]
async fn test_post_me_not_allowed() {
    let app = TestApp::new();
    let (_, token) = app.login("test@example.com");

    app.send(TestRequest::post("/user/me/").bearer(&token).json(&json!({})))
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_update_user_profile() {
    let app = TestApp::new();
    let (user, token) = app.login("test@example.com");

    let res = app
        .send(
            TestRequest::patch("/user/me/")
                .bearer(&token)
                .json(&json!({ "name": "Updated name", "password": "newpassword123" })),
        )
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(res.json()["name"], "Updated name");

    let stored = find_user(&app, &user.email).unwrap();
    assert_eq!(stored.name, "Updated name");
    assert!(verify_password("newpassword123", &stored.password_hash));
}

#[tokio::test]
async fn test_put_me_requires_all_fields() {
    let app = TestApp::new();
    let (_, token) = app.login("test@example.com");

    let res = app
        .send(
            TestRequest::put("/user/me/")
                .bearer(&token)
                .json(&json!({ "name": "Only name" })),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let fields = &res.json()["fields"];
    assert!(fields["email"].is_array());
    assert!(fields["password"].is_array());
}

#[tokio::test]
async fn test_change_email_to_taken_address() {
    let app = TestApp::new();
    app.create_user("taken@example.com");
    let (_, token) = app.login("test@example.com");

    let res = app
        .send(
            TestRequest::patch("/user/me/")
                .bearer(&token)
                .json(&json!({ "email": "taken@example.com" })),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(res.json()["fields"]["email"].is_array());
}
