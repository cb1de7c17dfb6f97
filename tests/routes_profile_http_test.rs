// ABOUTME: HTTP integration tests for the edit-profile route
// ABOUTME: Covers partial password changes, validation failures that write nothing and session refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_context, create_test_user, TestContext, GOOD_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use nutrifind::constants::{error_messages, success_messages};
use nutrifind::database::DatabaseProvider;
use serde_json::Value;

async fn login_cookie(ctx: &TestContext, username: &str, password: &str) -> String {
    let response = AxumTestRequest::post("/login")
        .form(&[("username", username), ("password", password)])
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200, "login failed: {}", response.text());
    response.cookie_pair().unwrap()
}

fn edit_form<'a>(name: &'a str, password: &'a str, age: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("name", name),
        ("password", password),
        ("weight", "72.5"),
        ("height", "180"),
        ("age", age),
    ]
}

#[tokio::test]
async fn test_edit_profile_requires_login() {
    let ctx = create_test_context().await;

    let response = AxumTestRequest::post("/edit_profile")
        .form(&edit_form("jane", "", "31"))
        .send(ctx.router())
        .await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_edit_profile_keeps_password_when_blank() {
    let ctx = create_test_context().await;
    create_test_user(&ctx, "jane01").await;
    let cookie = login_cookie(&ctx, "jane01", GOOD_PASSWORD).await;
    let before = ctx
        .database
        .find_user_by_username("jane01")
        .await
        .unwrap()
        .unwrap();

    let response = AxumTestRequest::post("/edit_profile")
        .cookie(&cookie)
        .form(&edit_form("jane smith", "", "31"))
        .send(ctx.router())
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], success_messages::PROFILE_UPDATED);
    assert_eq!(body["page"], "profile");
    assert_eq!(body["profile"]["name"], "Jane Smith");
    assert_eq!(body["profile"]["age"], 31);

    let after = ctx
        .database
        .find_user_by_username("jane01")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.password_hash, before.password_hash);
    assert!((after.weight - 72.5).abs() < f64::EPSILON);
    assert_eq!(after.username, "jane01");

    login_cookie(&ctx, "jane01", GOOD_PASSWORD).await;
}

#[tokio::test]
async fn test_edit_profile_changes_password() {
    let ctx = create_test_context().await;
    create_test_user(&ctx, "jane01").await;
    let cookie = login_cookie(&ctx, "jane01", GOOD_PASSWORD).await;

    let response = AxumTestRequest::post("/edit_profile")
        .cookie(&cookie)
        .form(&edit_form("jane", "Newpass9#", "30"))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);

    let old = AxumTestRequest::post("/login")
        .form(&[("username", "jane01"), ("password", GOOD_PASSWORD)])
        .send(ctx.router())
        .await;
    assert_eq!(old.status(), 401);
    login_cookie(&ctx, "jane01", "Newpass9#").await;
}

#[tokio::test]
async fn test_edit_profile_invalid_submission_writes_nothing() {
    let ctx = create_test_context().await;
    create_test_user(&ctx, "jane01").await;
    let cookie = login_cookie(&ctx, "jane01", GOOD_PASSWORD).await;
    let before = ctx
        .database
        .find_user_by_username("jane01")
        .await
        .unwrap()
        .unwrap();

    let bad_name = AxumTestRequest::post("/edit_profile")
        .cookie(&cookie)
        .form(&edit_form("jane 2", "", "31"))
        .send(ctx.router())
        .await;
    assert_eq!(bad_name.status(), 400);
    let body: Value = bad_name.json();
    assert_eq!(body["error"]["message"], error_messages::NAME_LETTERS_ONLY);

    let bad_password = AxumTestRequest::post("/edit_profile")
        .cookie(&cookie)
        .form(&edit_form("jane", "short", "31"))
        .send(ctx.router())
        .await;
    assert_eq!(bad_password.status(), 400);
    let body: Value = bad_password.json();
    assert_eq!(body["error"]["message"], error_messages::PASSWORD_POLICY);

    let bad_age = AxumTestRequest::post("/edit_profile")
        .cookie(&cookie)
        .form(&edit_form("jane", "", "500"))
        .send(ctx.router())
        .await;
    assert_eq!(bad_age.status(), 400);

    let after = ctx
        .database
        .find_user_by_username("jane01")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_edit_profile_refreshes_pages() {
    let ctx = create_test_context().await;
    create_test_user(&ctx, "jane01").await;
    let cookie = login_cookie(&ctx, "jane01", GOOD_PASSWORD).await;

    AxumTestRequest::post("/edit_profile")
        .cookie(&cookie)
        .form(&edit_form("jane smith", "", "44"))
        .send(ctx.router())
        .await;

    let edit_page = AxumTestRequest::get("/?page=edit_profile")
        .cookie(&cookie)
        .send(ctx.router())
        .await;
    let view: Value = edit_page.json();
    assert_eq!(view["page"], "edit_profile");
    assert_eq!(view["name"], "Jane Smith");
    assert_eq!(view["age"], 44);

    let snapshot = ctx
        .resources
        .sessions
        .get(cookie.split_once('=').unwrap().1)
        .await
        .unwrap();
    assert_eq!(snapshot.user_info.unwrap().age, 44);
}
