//! HTTP contract tests for the hoot routes.
//!
//! The MongoDB client below is never connected: the driver only dials out
//! once an operation runs. Every request in this file must therefore be
//! settled before any store access happens.

use actix_web::body::to_bytes;
use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App, Error, HttpResponse};
use bson::oid::ObjectId;
use chrono::Duration;
use hoot_service::db::HootStore;
use hoot_service::handlers;
use hoot_service::middleware::JwtAuth;
use jwt_auth::Identity;
use mongodb::Client;

const SECRET: &str = "contract-test-secret";

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Hoot API is running!" }))
}

async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "err": "Route not found" }))
}

async fn test_store() -> HootStore {
    let client = Client::with_uri_str("mongodb://localhost:27017")
        .await
        .unwrap();
    HootStore::new(&client.database("hoot-contract-test"))
}

fn token_for(username: &str) -> String {
    let identity = Identity {
        id: ObjectId::new().to_hex(),
        username: username.to_string(),
    };
    jwt_auth::issue_token(&identity, SECRET, Duration::hours(1)).unwrap()
}

/// Same route table as the bootstrap wires up.
macro_rules! hoot_app {
    () => {{
        let store = test_store().await;
        test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .route("/", web::get().to(index))
                .service(
                    web::scope("/hoots")
                        .wrap(JwtAuth::new(SECRET.to_string()))
                        .service(
                            web::resource("")
                                .route(web::post().to(handlers::create_hoot))
                                .route(web::get().to(handlers::list_hoots)),
                        )
                        .service(
                            web::resource("/{hoot_id}")
                                .route(web::get().to(handlers::get_hoot))
                                .route(web::put().to(handlers::update_hoot))
                                .route(web::delete().to(handlers::delete_hoot)),
                        )
                        .route(
                            "/{hoot_id}/comments",
                            web::post().to(handlers::create_comment),
                        ),
                )
                .default_service(web::route().to(route_not_found)),
        )
        .await
    }};
}

async fn assert_unauthorized(err: Error, expected: &str) {
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["err"], expected);
}

#[actix_web::test]
async fn health_check_is_unauthenticated() {
    let app = hoot_app!();

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["message"], "Hoot API is running!");
}

#[actix_web::test]
async fn unmatched_routes_return_json_404() {
    let app = hoot_app!();

    let req = test::TestRequest::get().uri("/owls").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["err"], "Route not found");
}

#[actix_web::test]
async fn protected_routes_reject_missing_tokens_before_store_access() {
    let app = hoot_app!();
    let id = ObjectId::new().to_hex();

    let routes = [
        (Method::POST, "/hoots".to_string()),
        (Method::GET, "/hoots".to_string()),
        (Method::GET, format!("/hoots/{id}")),
        (Method::PUT, format!("/hoots/{id}")),
        (Method::DELETE, format!("/hoots/{id}")),
        (Method::POST, format!("/hoots/{id}/comments")),
    ];

    for (method, uri) in routes {
        let req = test::TestRequest::default()
            .method(method.clone())
            .uri(&uri)
            .to_request();

        let err = test::try_call_service(&app, req)
            .await
            .err()
            .unwrap_or_else(|| panic!("{method} {uri} must not reach the handler"));
        assert_unauthorized(err, "Authorization header required.").await;
    }
}

#[actix_web::test]
async fn non_bearer_scheme_is_rejected() {
    let app = hoot_app!();

    let req = test::TestRequest::get()
        .uri("/hoots")
        .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
        .to_request();

    let err = test::try_call_service(&app, req).await.expect_err("scheme");
    assert_unauthorized(err, "Authorization header required.").await;
}

#[actix_web::test]
async fn stale_token_is_rejected() {
    let app = hoot_app!();
    let identity = Identity {
        id: ObjectId::new().to_hex(),
        username: "owlfred".to_string(),
    };
    let token = jwt_auth::issue_token(&identity, SECRET, Duration::hours(-1)).unwrap();

    let req = test::TestRequest::get()
        .uri("/hoots")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let err = test::try_call_service(&app, req).await.expect_err("expiry");
    assert_unauthorized(err, "Invalid token.").await;
}

#[actix_web::test]
async fn malformed_hoot_id_reads_as_not_found() {
    let app = hoot_app!();

    let req = test::TestRequest::get()
        .uri("/hoots/not-an-id")
        .insert_header(("Authorization", format!("Bearer {}", token_for("owlfred"))))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["err"], "Hoot not found.");
}
