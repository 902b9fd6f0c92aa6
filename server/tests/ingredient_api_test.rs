mod common;

use axum::http::StatusCode;
use common::{ids, names, TestApp, TestRequest};
use diesel::prelude::*;
use recipe_server::api::recipes::serializer::RecipeFields;
use recipe_server::api::recipes::store::{get_or_create_ingredient, insert_recipe};
use recipe_server::models::{Ingredient, User};
use recipe_server::schema::ingredients;
use serde_json::json;

const INGREDIENTS_URL: &str = "/recipe_app/ingredients/";

fn detail_url(id: i32) -> String {
    format!("/recipe_app/ingredients/{}/", id)
}

fn recipe_with_ingredients(app: &TestApp, user: &User, title: &str, names: &[&str]) {
    let fields = RecipeFields {
        title: Some(title.to_string()),
        time_minutes: Some(8),
        price: Some("4.00".to_string()),
        ingredients: Some(names.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    };
    insert_recipe(&mut app.conn(), user.id, &fields).unwrap();
}

fn load_ingredient(app: &TestApp, id: i32) -> Option<Ingredient> {
    ingredients::table
        .find(id)
        .select(Ingredient::as_select())
        .first(&mut app.conn())
        .optional()
        .unwrap()
}

#[tokio::test]
async fn test_auth_required() {
    let app = TestApp::new();

    app.send(TestRequest::get(INGREDIENTS_URL))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_ingredients() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    get_or_create_ingredient(&mut app.conn(), user.id, "Kale").unwrap();
    get_or_create_ingredient(&mut app.conn(), user.id, "Vanilla").unwrap();

    let body = app
        .send(TestRequest::get(INGREDIENTS_URL).bearer(&token))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(names(&body), vec!["Vanilla", "Kale"]);
}

#[tokio::test]
async fn test_ingredients_limited_to_user() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let other = app.create_user("other@example.com");
    get_or_create_ingredient(&mut app.conn(), other.id, "Salt").unwrap();
    let pepper = get_or_create_ingredient(&mut app.conn(), user.id, "Pepper").unwrap();

    let body = app
        .send(TestRequest::get(INGREDIENTS_URL).bearer(&token))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body, json!([{ "id": pepper.id, "name": "Pepper" }]));
}

#[tokio::test]
async fn test_update_ingredient() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let ingredient = get_or_create_ingredient(&mut app.conn(), user.id, "Cilantro").unwrap();

    app.send(
        TestRequest::patch(&detail_url(ingredient.id))
            .bearer(&token)
            .json(&json!({ "name": "Coriander" })),
    )
    .await
    .assert_status(StatusCode::OK);

    assert_eq!(
        load_ingredient(&app, ingredient.id).unwrap().name,
        "Coriander"
    );
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let ingredient = get_or_create_ingredient(&mut app.conn(), user.id, "Lettuce").unwrap();

    let res = app
        .send(
            TestRequest::put(&detail_url(ingredient.id))
                .bearer(&token)
                .json(&json!({ "name": "   " })),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(
        res.json()["fields"]["name"][0],
        "This field may not be blank."
    );
}

#[tokio::test]
async fn test_delete_ingredient() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    let ingredient = get_or_create_ingredient(&mut app.conn(), user.id, "Lettuce").unwrap();

    app.send(TestRequest::delete(&detail_url(ingredient.id)).bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(load_ingredient(&app, ingredient.id).is_none());
}

#[tokio::test]
async fn test_delete_other_users_ingredient_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.login("user@example.com");
    let other = app.create_user("other@example.com");
    let ingredient = get_or_create_ingredient(&mut app.conn(), other.id, "Saffron").unwrap();

    app.send(TestRequest::delete(&detail_url(ingredient.id)).bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(load_ingredient(&app, ingredient.id).is_some());
}

#[tokio::test]
async fn test_filter_ingredients_assigned_to_recipes() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    recipe_with_ingredients(&app, &user, "Apple Crumble", &["Apples"]);
    let turkey = get_or_create_ingredient(&mut app.conn(), user.id, "Turkey").unwrap();
    let apples = get_or_create_ingredient(&mut app.conn(), user.id, "Apples").unwrap();

    let body = app
        .send(TestRequest::get(&format!("{}?assigned_only=1", INGREDIENTS_URL)).bearer(&token))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(ids(&body), vec![apples.id as i64]);
    assert!(!ids(&body).contains(&(turkey.id as i64)));
}

#[tokio::test]
async fn test_filtered_ingredients_unique() {
    let app = TestApp::new();
    let (user, token) = app.login("user@example.com");
    recipe_with_ingredients(&app, &user, "Eggs Benedict", &["Eggs"]);
    recipe_with_ingredients(&app, &user, "Herb Eggs", &["Eggs"]);
    get_or_create_ingredient(&mut app.conn(), user.id, "Lentils").unwrap();

    let body = app
        .send(TestRequest::get(&format!("{}?assigned_only=1", INGREDIENTS_URL)).bearer(&token))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(names(&body), vec!["Eggs"]);
}
