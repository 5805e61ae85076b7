use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::{
    matchers::{any, header_exists, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::TestApp;

fn provider_accepts(id: &str) -> Mock {
    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
}

#[tokio::test]
async fn api_subscribe_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    provider_accepts("abc123")
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .post_subscribe(&json!({ "email": "alex@example.com", "firstName": "Alex" }))
        .await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({ "message": "Subscription successful", "id": "abc123" })
    );

    Ok(())
}

#[tokio::test]
async fn api_subscribe_sends_expected_email() -> Result<()> {
    let app = TestApp::spawn().await?;

    provider_accepts("abc123")
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_subscribe(&json!({ "email": "alex@example.com", "firstName": "Alex" }))
        .await?;

    let sent = app.sent_emails().await?;
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email["from"], "Publisher <newsletter@yourdomain.com>");
    assert_eq!(email["to"], json!(["alex@example.com"]));
    assert_eq!(email["subject"], "Welcome to the Newsletter!");
    let html = email["html"].as_str().unwrap_or_default();
    assert!(html.contains("Hi Alex,"), "html: {html}");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_without_first_name_greets_reader() -> Result<()> {
    let app = TestApp::spawn().await?;

    provider_accepts("abc123")
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_subscribe(&json!({ "email": "alex@example.com" }))
        .await?;

    let sent = app.sent_emails().await?;
    let html = sent[0]["html"].as_str().unwrap_or_default();
    assert!(html.contains("Hi Reader,"), "html: {html}");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_400_when_email_is_missing() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let cases = [
        (json!({ "firstName": "Alex" }), "Missing email"),
        (json!({ "email": "", "firstName": "Alex" }), "Empty email"),
        (json!({}), "Empty json"),
    ];

    for (body, description) in cases {
        let res = app.post_subscribe(&body).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "The API did not return a 400 BAD REQUEST when the payload was {description}."
        );
        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "error": "Email is required" }));
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_500_when_provider_fails() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "id": "leaked" })))
        // No retry
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .post_subscribe(&json!({ "email": "alex@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Failed to send email" }));

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_500_when_provider_times_out() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "late" }))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .post_subscribe(&json!({ "email": "alex@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_same_email_twice_sends_two_emails() -> Result<()> {
    let app = TestApp::spawn().await?;

    provider_accepts("first")
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.email_server)
        .await;
    provider_accepts("second")
        .expect(1)
        .mount(&app.email_server)
        .await;

    let body = json!({ "email": "alex@example.com" });
    let first: Value = app.post_subscribe(&body).await?.json().await?;
    let second: Value = app.post_subscribe(&body).await?.json().await?;

    assert_eq!(first["id"], "first");
    assert_eq!(second["id"], "second");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_allows_any_origin() -> Result<()> {
    let app = TestApp::spawn().await?;

    provider_accepts("abc123").mount(&app.email_server).await;

    let res = app
        .http_client
        .post(format!("http://{}/api/subscribe", app.addr))
        .header("Origin", "https://blog.example.com")
        .json(&json!({ "email": "alex@example.com" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(res.headers().contains_key("x-request-id"));

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_json_400_for_unusable_bodies() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let url = format!("http://{}/api/subscribe", app.addr);
    let cases = [
        (app.http_client.post(&url), "Email is required", "No body"),
        (
            app.http_client
                .post(&url)
                .header("Content-Type", "application/json")
                .body("{ not json"),
            "Invalid request body",
            "Broken JSON",
        ),
    ];

    for (req, error, description) in cases {
        let res = req.send().await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "The API did not return a 400 BAD REQUEST for: {description}."
        );
        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "error": error }));
    }

    Ok(())
}
