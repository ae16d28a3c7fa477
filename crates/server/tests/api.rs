use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

const STRONG_PASSWORD: &str = "test@134Pass";

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::app(engine)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn registration(username: &str, user_type: &str) -> Value {
    json!({
        "username": username,
        "password": STRONG_PASSWORD,
        "user_type": user_type,
        "phone_number": "01712345678",
        "address": "1 Main Street",
    })
}

/// Register `username` and return a fresh token.
async fn sign_up(app: &Router, username: &str, user_type: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/registration",
        None,
        Some(registration(username, user_type)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"username": username, "password": STRONG_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Company plus one restaurant owned by the token's user.
async fn restaurant(app: &Router, token: &str, company: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/companies",
        Some(token),
        Some(json!({"name": company})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/restaurants",
        Some(token),
        Some(json!({
            "company": body["id"],
            "name": name,
            "phone_number": "01712345678",
            "address": "2 Harbour Road",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn section(app: &Router, token: &str, kind: &str, restaurant: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        &format!("/{kind}"),
        Some(token),
        Some(json!({"restaurant": restaurant, "name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn registration_login_and_user_detail() {
    let app = test_app().await;
    let token = sign_up(&app, "carla", "customer").await;

    let (status, body) = send(&app, "GET", "/user-detail", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carla");
    assert_eq!(body["user_type"], "customer");
    assert!(body.get("password").is_none());
    assert!(!body["last_login"].is_null());

    // Logging in again hands back the same token.
    let (_, again) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "carla", "password": STRONG_PASSWORD})),
    )
    .await;
    assert_eq!(again["token"], token.as_str());
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/companies", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/companies", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn weak_password_and_bad_credentials_are_400() {
    let app = test_app().await;

    let mut body = registration("weak", "customer");
    body["password"] = json!("test");
    let (status, body) = send(&app, "POST", "/registration", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["password"].is_array());

    sign_up(&app, "olivia", "owner").await;
    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "olivia", "password": "Wrong@1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = test_app().await;
    let token = sign_up(&app, "ethan", "employee").await;

    let (status, body) = send(&app, "POST", "/logout", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Successfully logged out.");

    let (status, _) = send(&app, "POST", "/logout", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_create_companies() {
    let app = test_app().await;
    let token = sign_up(&app, "carla", "customer").await;

    let (status, _) = send(
        &app,
        "POST",
        "/companies",
        Some(token.as_str()),
        Some(json!({"name": "Acme Foods"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn put_requires_every_field_but_patch_does_not() {
    let app = test_app().await;
    let token = sign_up(&app, "olivia", "owner").await;

    let (_, company) = send(
        &app,
        "POST",
        "/companies",
        Some(token.as_str()),
        Some(json!({"name": "Acme Foods"})),
    )
    .await;
    let uri = format!("/companies/{}", company["id"]);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(token.as_str()),
        Some(json!({"description": "Family business"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["name"].is_array());

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(token.as_str()),
        Some(json!({"description": "Family business"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme Foods");
    assert_eq!(body["description"], "Family business");

    let (status, body) = send(&app, "DELETE", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    let (status, _) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_prices_are_validated_and_returned_as_strings() {
    let app = test_app().await;
    let token = sign_up(&app, "olivia", "owner").await;
    let diner = restaurant(&app, &token, "Acme Foods", "ABC Diner").await;
    let menu = section(&app, &token, "menus", diner, "Lunch").await;
    let category = section(&app, &token, "categories", diner, "Mains").await;

    let (status, body) = send(
        &app,
        "POST",
        "/items",
        Some(token.as_str()),
        Some(json!({"menu": menu, "category": category, "name": "Burger", "price": "-1.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["price"].is_array());

    let (status, body) = send(
        &app,
        "POST",
        "/items",
        Some(token.as_str()),
        Some(json!({"menu": menu, "category": category, "name": "Burger", "price": 9.5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], "9.50");
    assert_eq!(body["restaurant"], diner);
    assert_eq!(body["is_available"], true);

    let (status, list) = send(
        &app,
        "GET",
        &format!("/items?menu={menu}"),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["name"], "Burger");
}

#[tokio::test]
async fn employees_only_see_their_restaurant() {
    let app = test_app().await;
    let owner = sign_up(&app, "olivia", "owner").await;
    let staff = sign_up(&app, "ethan", "employee").await;
    let diner = restaurant(&app, &owner, "Acme Foods", "ABC Diner").await;
    let bistro = restaurant(&app, &owner, "Bistro Group", "Corner Bistro").await;
    section(&app, &owner, "menus", diner, "Lunch").await;
    let foreign_menu = section(&app, &owner, "menus", bistro, "Dinner").await;

    let (_, me) = send(&app, "GET", "/user-detail", Some(staff.as_str()), None).await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/restaurants/{diner}/employees"),
        Some(owner.as_str()),
        Some(json!({"user": me["id"], "designation": "Chef"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["restaurant"], diner);
    assert_eq!(body["designation"], "Chef");

    let (status, list) = send(&app, "GET", "/menus", Some(staff.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["name"], "Lunch");

    // Reading another restaurant's menu is allowed, changing it is not.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/menus/{foreign_menu}"),
        Some(staff.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dinner");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/menus/{foreign_menu}"),
        Some(staff.as_str()),
        Some(json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff cannot manage the roster.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/restaurants/{diner}/employees"),
        Some(staff.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/restaurants/{diner}/employees/{}", me["id"]),
        Some(owner.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(&app, "GET", "/menus", Some(staff.as_str()), None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn orders_get_a_reference_and_lines_need_a_quantity() {
    let app = test_app().await;
    let owner = sign_up(&app, "olivia", "owner").await;
    let guest = sign_up(&app, "carla", "customer").await;
    let diner = restaurant(&app, &owner, "Acme Foods", "ABC Diner").await;
    let menu = section(&app, &owner, "menus", diner, "Lunch").await;
    let category = section(&app, &owner, "categories", diner, "Mains").await;
    let (_, item) = send(
        &app,
        "POST",
        "/items",
        Some(owner.as_str()),
        Some(json!({"menu": menu, "category": category, "name": "Burger", "price": "9.50"})),
    )
    .await;

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(guest.as_str()),
        Some(json!({
            "restaurant": diner,
            "address": "4 Elm Street",
            "total_amount": "19.00",
            "payment_method": "card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(order["order_id"].as_str().unwrap().starts_with("ORD-AD-"));
    assert_eq!(order["total_amount"], "19.00");
    assert_eq!(order["is_paid"], false);

    // The reference is server-side only; a client value is ignored.
    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/orders/{}", order["id"]),
        Some(guest.as_str()),
        Some(json!({"order_id": "ORD-XX-000000", "is_paid": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["order_id"], order["order_id"]);
    assert_eq!(patched["is_paid"], true);

    let line = |quantity: i64| {
        json!({
            "order": order["id"],
            "item": item["id"],
            "quantity": quantity,
            "price": "9.50",
        })
    };
    let (status, body) = send(&app, "POST", "/order-items", Some(guest.as_str()), Some(line(0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["quantity"].is_array());

    let (status, body) = send(&app, "POST", "/order-items", Some(guest.as_str()), Some(line(2))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 2);

    let (_, lines) = send(
        &app,
        "GET",
        &format!("/order-items?order={}", order["id"]),
        Some(guest.as_str()),
        None,
    )
    .await;
    assert_eq!(lines["count"], 1);
}

#[tokio::test]
async fn page_zero_is_rejected() {
    let app = test_app().await;
    let token = sign_up(&app, "carla", "customer").await;

    let (status, _) = send(&app, "GET", "/restaurants?page=0", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/restaurants?page=3", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["results"], json!([]));
}
