//! Public site pages and the newsletter form.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use brightline_integration_tests::{FakeApi, browser, spawn_site};

#[tokio::test]
async fn test_static_pages_render() {
    let api = FakeApi::start().await;
    let site = spawn_site(&api).await;
    let browser = browser();

    for path in [
        "/",
        "/about",
        "/services",
        "/electrical",
        "/networking",
        "/contact",
        "/news",
        "/resources",
        "/membership",
    ] {
        let response = browser.get(format!("{site}{path}")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert!(response.headers().contains_key("x-request-id"), "{path}");
    }
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let api = FakeApi::start().await;
    let site = spawn_site(&api).await;

    let response = browser()
        .get(format!("{site}/solar-panels"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_products_page_is_public() {
    let api = FakeApi::start().await;
    let networking = api.seed_category("Networking", None);
    api.seed_product("Cat6 Patch Cable", "12.50", Some(&networking));
    api.seed_product("LED Floodlight", "89.00", None);
    let site = spawn_site(&api).await;

    let html = browser()
        .get(format!("{site}/products"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Cat6 Patch Cable"));
    assert!(html.contains("$89.00"));
    assert_eq!(api.count("GET", "products"), 1);
    assert!(api.calls().iter().all(|call| call.authorization.is_none()));
}

#[tokio::test]
async fn test_products_page_shows_api_error() {
    let api = FakeApi::start().await;
    api.fail_with(StatusCode::SERVICE_UNAVAILABLE, r#"{"message": "Catalog offline"}"#);
    let site = spawn_site(&api).await;

    let response = browser().get(format!("{site}/products")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Catalog offline"));
}

#[tokio::test]
async fn test_home_survives_api_outage() {
    let api = FakeApi::start().await;
    api.fail_with(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let site = spawn_site(&api).await;

    let response = browser().get(format!("{site}/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_newsletter_subscribe() {
    let api = FakeApi::start().await;
    let site = spawn_site(&api).await;
    let browser = browser();

    let response = browser
        .post(format!("{site}/newsletter/subscribe"))
        .form(&[("email", "Reader@Example.com")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("is now subscribed"));
    assert_eq!(api.count("POST", "newsletter/subscribe"), 1);
    assert_eq!(api.subscribers().len(), 1);

    let again = browser
        .post(format!("{site}/newsletter/subscribe"))
        .form(&[("email", "reader@example.com")])
        .send()
        .await
        .unwrap();
    assert!(again.text().await.unwrap().contains("This email is already subscribed"));
}

#[tokio::test]
async fn test_invalid_newsletter_email_stays_local() {
    let api = FakeApi::start().await;
    let site = spawn_site(&api).await;

    let response = browser()
        .post(format!("{site}/newsletter/subscribe"))
        .form(&[("email", "not-an-email")])
        .send()
        .await
        .unwrap();

    assert!(response.text().await.unwrap().contains("valid email"));
    assert!(api.calls().is_empty());
}
