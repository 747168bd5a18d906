mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};

use common::TestApp;
use qrverify_api::store::Store;

const INVALID: &str = "QR code is not valid or is no longer active";

async fn verification_count(app: &TestApp) -> Result<i64> {
    Ok(app.store.count_verifications().await?)
}

#[tokio::test]
async fn active_code_renders_page_and_records_one_row() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let id = app.create_certificate(&token, "Cert A").await?;

    let request = Request::builder()
        .uri(format!("/verify/{}", id))
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.2")
        .header(header::USER_AGENT, "ScannerApp/2.0")
        .body(Body::empty())?;
    let res = app.send(request).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header(header::CONTENT_TYPE).starts_with("text/html"));
    let page = res.text();
    assert!(page.contains("VALID VERIFICATION CODE"));
    assert!(page.contains("PT TRIYASA PIRSA UTAMA"));
    assert!(page.contains("TB Maju Jaya"));
    assert!(page.contains("PARAMETER RESULT"));

    assert_eq!(verification_count(&app).await?, 1);
    let rows = app.store.list_verifications(None).await?;
    assert_eq!(rows[0].qr_id.to_string(), id);
    assert_eq!(rows[0].ip_address, "203.0.113.5");
    assert_eq!(rows[0].user_agent, "ScannerApp/2.0");
    assert_eq!(rows[0].status, "verified");
    Ok(())
}

#[tokio::test]
async fn each_visit_appends_exactly_one_row() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let id = app.create_certificate(&token, "Cert A").await?;

    for expected in 1..=3 {
        let res = app.get(&format!("/api/verify/{}", id), None).await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(verification_count(&app).await?, expected);
    }

    let res = app.get(&format!("/api/verify/{}", id), None).await?;
    let data = &res.json()["data"];
    assert_eq!(data["client_name"], "PT. Client");
    assert!(data["qr_code_image"].is_null());
    Ok(())
}

#[tokio::test]
async fn inactive_code_is_an_error_without_audit() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let id = app.create_certificate(&token, "Cert A").await?;

    let res = app
        .call(Method::POST, &format!("/api/qr-codes/{}/toggle", id), Some(&token), None)
        .await?;
    assert_eq!(res.json()["data"]["is_active"], false);

    let res = app.get(&format!("/verify/{}", id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.text().contains(INVALID));

    let res = app.get(&format!("/api/verify/{}", id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["message"], INVALID);

    assert_eq!(verification_count(&app).await?, 0);
    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_ids_are_errors() -> Result<()> {
    let app = TestApp::new();

    for path in [
        "/verify/00000000-0000-0000-0000-000000000000",
        "/verify/not-a-uuid",
        "/api/verify/00000000-0000-0000-0000-000000000000",
        "/api/verify/not-a-uuid",
    ] {
        let res = app.get(path, None).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", path);
    }
    assert_eq!(verification_count(&app).await?, 0);
    Ok(())
}
