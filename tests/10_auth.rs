mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{spawn_app, PASSWORD};

#[tokio::test]
async fn signup_returns_token_and_message() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": PASSWORD,
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration Successful");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn signup_accepts_legacy_fullname_key() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({
            "fullname": "Ada Lovelace",
            "email": "ada@example.com",
            "password": PASSWORD,
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn signup_with_missing_fields_is_422() -> Result<()> {
    let app = spawn_app().await?;

    for payload in [
        json!({}),
        json!({ "email": "ada@example.com", "password": PASSWORD }),
        json!({ "full_name": "Ada", "password": PASSWORD }),
        json!({ "full_name": "Ada", "email": "ada@example.com" }),
    ] {
        let res = app
            .client
            .post(app.url("/api/v1/auth/signup"))
            .json(&payload)
            .send()
            .await?;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", payload);
        let body: Value = res.json().await?;
        assert!(body["error"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn same_email_twice_conflicts() -> Result<()> {
    let app = spawn_app().await?;
    app.signup("twice@example.com").await?;

    let res = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({
            "full_name": "Someone Else",
            "email": "Twice@Example.com",
            "password": PASSWORD,
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn store_failure_is_500() -> Result<()> {
    let app = spawn_app().await?;
    app.store.set_offline(true);

    let signup = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({
            "full_name": "Ada",
            "email": "ada@example.com",
            "password": PASSWORD,
        }))
        .send()
        .await?;
    assert_eq!(signup.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let login = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "ada@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(login.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn login_outcomes() -> Result<()> {
    let app = spawn_app().await?;
    app.signup("grace@example.com").await?;

    let wrong_password = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "grace@example.com", "password": "wrong-password-1" }))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let missing = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "grace@example.com" }))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let ok = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": " GRACE@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());
    assert_eq!(body["message"], "Login Successful");
    assert!(body["expires_in"].as_i64().unwrap_or_default() > 0);

    // the login token opens protected routes
    let entries = app
        .client
        .get(app.url("/api/v1/entries"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(entries.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_json_body_is_422() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .header("content-type", "text/plain")
        .body("email=ada@example.com")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}
