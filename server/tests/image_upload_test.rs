mod common;

use axum::http::StatusCode;
use common::{png_bytes, TestApp, TestRequest};
use diesel::prelude::*;
use recipe_server::api::recipes::serializer::RecipeFields;
use recipe_server::api::recipes::store::insert_recipe;
use recipe_server::models::{Recipe, User};
use recipe_server::schema::recipes;

fn upload_url(id: i32) -> String {
    format!("/recipe_app/recipes/{}/upload-image/", id)
}

fn sample_recipe(app: &TestApp, user: &User) -> Recipe {
    let fields = RecipeFields {
        title: Some("Sample recipe".to_string()),
        time_minutes: Some(10),
        price: Some("5.00".to_string()),
        ..Default::default()
    };
    insert_recipe(&mut app.conn(), user.id, &fields).unwrap()
}

fn stored_image(app: &TestApp, id: i32) -> Option<String> {
    recipes::table
        .find(id)
        .select(recipes::image)
        .first(&mut app.conn())
        .unwrap()
}

#[tokio::test]
async fn test_upload_image_to_recipe() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let recipe = sample_recipe(&app, &user);

    let body = app
        .send(
            TestRequest::post(&upload_url(recipe.id))
                .bearer(&token)
                .multipart("image", "photo.jpg", &png_bytes()),
        )
        .await
        .assert_status(StatusCode::OK)
        .json();

    let path = stored_image(&app, recipe.id).expect("image path should be saved");
    // Extension follows the detected format, not the client's file name
    assert!(path.starts_with("uploads/recipe/"));
    assert!(path.ends_with(".png"));
    assert!(app.media_root().join(&path).exists());

    assert_eq!(body["id"], recipe.id);
    assert_eq!(body["image"], format!("/media/{}", path));

    // The detail view links the same file, and it is served
    let detail = app
        .send(TestRequest::get(&format!("/recipe_app/recipes/{}/", recipe.id)).bearer(&token))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(detail["image"], body["image"]);

    let served = app
        .send(TestRequest::get(&format!("/media/{}", path)))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(served.bytes(), png_bytes().as_slice());
}

#[tokio::test]
async fn test_upload_image_bad_request() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let recipe = sample_recipe(&app, &user);

    let res = app
        .send(
            TestRequest::post(&upload_url(recipe.id))
                .bearer(&token)
                .multipart("image", "notimage.png", b"notimage"),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(res.json()["fields"]["image"].is_array());
    assert!(stored_image(&app, recipe.id).is_none());
}

#[tokio::test]
async fn test_upload_without_image_field() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let recipe = sample_recipe(&app, &user);

    let res = app
        .send(
            TestRequest::post(&upload_url(recipe.id))
                .bearer(&token)
                .multipart("file", "photo.png", &png_bytes()),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(res.json()["fields"]["image"][0], "No file was submitted.");
}

#[tokio::test]
async fn test_reupload_replaces_previous_file() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let recipe = sample_recipe(&app, &user);

    for _ in 0..2 {
        app.send(
            TestRequest::post(&upload_url(recipe.id))
                .bearer(&token)
                .multipart("image", "photo.png", &png_bytes()),
        )
        .await
        .assert_status(StatusCode::OK);
    }

    let path = stored_image(&app, recipe.id).unwrap();
    let files: Vec<_> = std::fs::read_dir(app.media_root().join("uploads/recipe"))
        .unwrap()
        .collect();
    assert_eq!(files.len(), 1);
    assert!(app.media_root().join(&path).exists());
}

#[tokio::test]
async fn test_upload_to_other_users_recipe_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.login("user@example.com");
    let other = app.create_user("other@example.com");
    let recipe = sample_recipe(&app, &other);

    app.send(
        TestRequest::post(&upload_url(recipe.id))
            .bearer(&token)
            .multipart("image", "photo.png", &png_bytes()),
    )
    .await
    .assert_status(StatusCode::NOT_FOUND);

    assert!(stored_image(&app, recipe.id).is_none());
}

#[tokio::test]
async fn test_delete_recipe_removes_image_file() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let recipe = sample_recipe(&app, &user);

    app.send(
        TestRequest::post(&upload_url(recipe.id))
            .bearer(&token)
            .multipart("image", "photo.png", &png_bytes()),
    )
    .await
    .assert_status(StatusCode::OK);
    let path = stored_image(&app, recipe.id).unwrap();

    app.send(TestRequest::delete(&format!("/recipe_app/recipes/{}/", recipe.id)).bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(!app.media_root().join(&path).exists());
}
