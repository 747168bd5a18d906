mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};

use common::TestApp;
use qrverify_api::store::Store;

#[tokio::test]
async fn stats_reflect_codes_and_scans() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let a = app.create_certificate(&token, "A").await?;
    let b = app.create_certificate(&token, "B").await?;

    app.get(&format!("/verify/{}", a), None).await?;
    app.get(&format!("/verify/{}", a), None).await?;
    app.call(Method::POST, &format!("/api/qr-codes/{}/toggle", b), Some(&token), None)
        .await?;

    let res = app.get("/api/dashboard/stats", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let stats = &res.json()["data"];
    assert_eq!(stats["total_qr_codes"], 2);
    assert_eq!(stats["active_qr_codes"], 1);
    assert_eq!(stats["total_verifications"], 2);
    assert_eq!(stats["today_verifications"], 2);

    let res = app.get("/api/qr-codes", Some(&token)).await?;
    let rows = res.json()["data"].as_array().unwrap().clone();
    let count_for = |id: &str| {
        rows.iter()
            .find(|r| r["id"] == id)
            .map(|r| r["verification_count"].as_i64().unwrap())
            .unwrap()
    };
    assert_eq!(count_for(&a), 2);
    assert_eq!(count_for(&b), 0);
    Ok(())
}

#[tokio::test]
async fn toggle_flips_exactly_the_target() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let ids = [
        app.create_certificate(&token, "A").await?,
        app.create_certificate(&token, "B").await?,
        app.create_certificate(&token, "C").await?,
    ];

    let res = app
        .call(Method::POST, &format!("/api/qr-codes/{}/toggle", ids[1]), Some(&token), None)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["id"], ids[1].as_str());
    assert_eq!(res.json()["data"]["is_active"], false);

    for (i, id) in ids.iter().enumerate() {
        let res = app.get(&format!("/api/qr-codes/{}", id), Some(&token)).await?;
        assert_eq!(res.json()["data"]["is_active"], i != 1, "{}", id);
    }

    let res = app
        .call(
            Method::POST,
            "/api/qr-codes/00000000-0000-0000-0000-000000000000/toggle",
            Some(&token),
            None,
        )
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn csv_export_has_one_line_per_verification() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let a = app.create_certificate(&token, "Coal, grade A").await?;
    let b = app.create_certificate(&token, "B").await?;
    for id in [&a, &a, &b, &a, &b] {
        app.get(&format!("/verify/{}", id), None).await?;
    }

    let res = app.get("/api/verifications/export", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header(header::CONTENT_TYPE).starts_with("text/csv"));
    assert!(res
        .header(header::CONTENT_DISPOSITION)
        .starts_with("attachment; filename=\"verifications-"));

    let csv = res.text();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,QR Title,Client Name,IP Address,Status");
    assert_eq!(lines.len() - 1, app.store.count_verifications().await? as usize);
    assert_eq!(lines.len() - 1, 5);
    assert!(csv.contains("\"Coal, grade A\""));
    Ok(())
}

#[tokio::test]
async fn recent_verifications_and_overview() -> Result<()> {
    let app = TestApp::new();
    let token = app.login_as("ops@example.com").await?;
    let a = app.create_certificate(&token, "A").await?;
    for _ in 0..4 {
        app.get(&format!("/verify/{}", a), None).await?;
    }

    let res = app.get("/api/verifications?limit=2", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let rows = res.json()["data"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["qr_title"], "A");
    assert_eq!(rows[0]["qr_client_name"], "PT. Client");

    let res = app.get("/api/verifications", Some(&token)).await?;
    assert_eq!(res.json()["data"].as_array().unwrap().len(), 4);

    let res = app.get("/api/dashboard", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.json()["data"];
    assert_eq!(data["stats"]["total_verifications"], 4);
    assert_eq!(data["qr_codes"].as_array().unwrap().len(), 1);
    assert_eq!(data["verifications"].as_array().unwrap().len(), 4);
    Ok(())
}
