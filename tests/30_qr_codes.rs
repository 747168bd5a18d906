mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn generate_returns_link_and_image() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;

    let res = app
        .post(
            "/api/qr-codes",
            Some(&token),
            json!({ "title": "  Certificate 01 ", "clientName": "PT. Client", "commodity": "Coal" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let data = &res.json()["data"];
    let id = data["id"].as_str().unwrap();
    assert_eq!(
        data["verification_url"],
        format!("https://verify.example.com/verify/{}", id)
    );
    assert!(data["qr_code_image"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(data["qr_code"]["title"], "Certificate 01");
    assert_eq!(data["qr_code"]["is_active"], true);
    assert_eq!(data["qr_code"]["data"]["commodity"], "Coal");
    Ok(())
}

#[tokio::test]
async fn origin_falls_back_to_request_host() -> Result<()> {
    let mut config = common::test_config();
    config.server.public_origin = None;
    let app = TestApp::with_config(config);
    let token = app.login_as("ops@example.com").await?;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/qr-codes")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-host", "certs.example.org")
        .body(axum::body::Body::from(
            json!({ "title": "T", "clientName": "C" }).to_string(),
        ))?;
    let res = app.send(request).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.json()["data"]["verification_url"]
        .as_str()
        .unwrap()
        .starts_with("https://certs.example.org/verify/"));
    Ok(())
}

#[tokio::test]
async fn blank_required_fields_are_rejected_before_writing() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;

    let res = app
        .post("/api/qr-codes", Some(&token), json!({ "title": "", "clientName": "Client" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["field_errors"]["title"].is_string());

    let res = app
        .post("/api/qr-codes", Some(&token), json!({ "title": "Cert", "clientName": "   " }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["field_errors"]["clientName"].is_string());

    let res = app.get("/api/qr-codes", Some(&token)).await?;
    assert_eq!(res.json()["data"].as_array().unwrap().len(), 0);
    Ok(())
}

#[tokio::test]
async fn list_and_fetch() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let id = app.create_certificate(&token, "Cert A").await?;
    app.create_certificate(&token, "Cert B").await?;

    let res = app.get("/api/qr-codes", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let rows = res.json()["data"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["verification_count"] == 0));

    let res = app.get(&format!("/api/qr-codes/{}", id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["title"], "Cert A");
    assert_eq!(res.json()["data"]["data"]["vessel"], "TB Maju Jaya");

    let res = app.get("/api/qr-codes/not-a-uuid", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .get("/api/qr-codes/00000000-0000-0000-0000-000000000000", Some(&token))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn png_download() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let id = app.create_certificate(&token, "Cert A").await?;

    let res = app.get(&format!("/api/qr-codes/{}/qr.png", id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header(header::CONTENT_TYPE), "image/png");
    assert_eq!(
        res.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"QR-Cert A.png\""
    );
    assert_eq!(&res.body[..4], b"\x89PNG");
    Ok(())
}
