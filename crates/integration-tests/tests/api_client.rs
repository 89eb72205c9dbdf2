//! `ApiClient` and `CrudPage` against the in-process fake API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use brightline_api::{
    Categories, Confirmation, CrudPage, DeleteOutcome, ListState, Products, SaveOutcome,
    Subscribers, TokenStore,
};
use brightline_core::{
    Category, CategoryDraft, CategoryId, Credentials, ImageInput, ProductDraft, ProductId,
};
use brightline_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, FakeApi};

fn product_draft() -> ProductDraft {
    ProductDraft {
        name: "Outdoor Junction Box".to_string(),
        description: "IP66 rated, 6 knockouts".to_string(),
        price: "24.90".to_string(),
        category_id: None,
        image: ImageInput::Url("https://cdn.brightline.example/box.jpg".to_string()),
    }
}

async fn logged_in(api: &FakeApi) -> TokenStore {
    let session = TokenStore::new();
    let credentials = Credentials::from_input(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    api.client().login(&session, &credentials).await.unwrap();
    session
}

#[tokio::test]
async fn test_login_stores_only_token() {
    let api = FakeApi::start().await;
    let client = api.client();
    let session = TokenStore::new();
    let credentials = Credentials::from_input(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();

    client.login(&session, &credentials).await.unwrap();

    assert_eq!(api.count("POST", "auth/login"), 1);
    assert_eq!(api.calls().len(), 1);
    // Login is public: no bearer header is sent.
    assert!(api.calls()[0].authorization.is_none());

    let stored = format!("{session:?}");
    assert!(session.is_authenticated());
    assert!(!stored.contains(ADMIN_PASSWORD));
}

#[tokio::test]
async fn test_login_rejected_keeps_session_empty() {
    let api = FakeApi::start().await;
    let session = TokenStore::new();
    let credentials = Credentials::from_input(ADMIN_EMAIL, "wrong-password").unwrap();

    let err = api.client().login(&session, &credentials).await.unwrap_err();

    assert_eq!(err.user_message("Login failed"), "Invalid email or password");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.clear_calls();
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    page.list().await.unwrap();

    let expected = format!("Bearer {}", api.token());
    assert_eq!(api.calls()[0].authorization.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_valid_create_posts_once_then_refetches_once() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.clear_calls();
    let client = api.client();

    let mut page = CrudPage::<Products>::new(&client, &session);
    let outcome = page.create(product_draft()).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(api.count("POST", "products"), 1);
    assert_eq!(api.count("GET", "products"), 1);
    assert_eq!(api.calls().len(), 2);
    assert_eq!(api.calls()[0].method, "POST");
    assert!(!page.modal().show);
    assert_eq!(page.records().len(), 1);
    assert_eq!(page.records()[0].name, "Outdoor Junction Box");
    assert_eq!(
        page.records()[0].image.as_deref(),
        Some("https://cdn.brightline.example/box.jpg")
    );
}

#[tokio::test]
async fn test_invalid_create_makes_no_calls() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.clear_calls();
    let client = api.client();

    let mut page = CrudPage::<Products>::new(&client, &session);
    let draft = ProductDraft {
        price: "0".to_string(),
        ..product_draft()
    };
    let outcome = page.create(draft).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Invalid);
    assert!(api.calls().is_empty());
    assert!(page.modal().error.is_some());
    assert!(page.modal().show);
}

#[tokio::test]
async fn test_create_without_image_is_invalid() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.clear_calls();
    let client = api.client();

    let mut page = CrudPage::<Products>::new(&client, &session);
    let draft = ProductDraft {
        image: ImageInput::None,
        ..product_draft()
    };

    assert_eq!(page.create(draft).await.unwrap(), SaveOutcome::Invalid);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_update_without_image_keeps_current_image() {
    let api = FakeApi::start().await;
    let id = api.seed_product("Cat6 Patch Cable", "12.50", None);
    let session = logged_in(&api).await;
    let client = api.client();

    let mut page = CrudPage::<Products>::new(&client, &session);
    let draft = ProductDraft {
        name: "Cat6 Patch Cable 5m".to_string(),
        image: ImageInput::None,
        ..product_draft()
    };
    let outcome = page.update(ProductId::new(id.clone()), draft).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(api.count("PUT", &format!("products/{id}")), 1);
    let product = page.find(&ProductId::new(id.clone())).unwrap();
    assert_eq!(product.name, "Cat6 Patch Cable 5m");
    assert_eq!(
        product.image.as_deref(),
        Some(format!("https://cdn.brightline.example/{id}.jpg").as_str())
    );
}

#[tokio::test]
async fn test_list_is_idempotent() {
    let api = FakeApi::start().await;
    api.seed_category("Electrical", Some("Breakers, panels and wiring"));
    api.seed_category("Networking", None);
    api.seed_category("Lighting", Some("Indoor and outdoor fixtures"));
    let session = logged_in(&api).await;
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    page.list().await.unwrap();
    let first = page.records().to_vec();
    page.list().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(page.records(), first.as_slice());
}

#[tokio::test]
async fn test_close_modal_loads_list_only_once() {
    let api = FakeApi::start().await;
    api.seed_category("Electrical", None);
    let session = logged_in(&api).await;
    api.clear_calls();
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    page.open_create();
    page.close_modal().await.unwrap();
    assert!(!page.modal().show);
    assert!(page.fetched());
    assert_eq!(api.count("GET", "category"), 1);

    page.open_create();
    page.close_modal().await.unwrap();
    assert_eq!(api.count("GET", "category"), 1);
}

#[tokio::test]
async fn test_typed_json_wrappers() {
    let api = FakeApi::start().await;
    let id = api.seed_category("Networking", None);
    let session = logged_in(&api).await;
    let client = api.client();

    let categories: Vec<Category> = client.get_json(&session, "category").await.unwrap();
    assert_eq!(categories.len(), 1);

    let updated: Option<Category> = client
        .put_json(
            &session,
            &format!("category/{id}"),
            &serde_json::json!({"name": "Networking & Data"}),
        )
        .await
        .unwrap();
    assert_eq!(updated.unwrap().name, "Networking & Data");
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let api = FakeApi::start().await;
    let id = api.seed_category("Obsolete", None);
    let session = logged_in(&api).await;
    api.clear_calls();
    let client = api.client();
    let path = format!("category/{id}");

    let mut page = CrudPage::<Categories>::new(&client, &session);
    let pending = page
        .delete(&CategoryId::new(id.clone()), Confirmation::Pending)
        .await
        .unwrap();
    assert_eq!(pending, DeleteOutcome::AwaitingConfirmation);
    assert_eq!(api.count("DELETE", &path), 0);
    assert!(api.calls().is_empty());

    let confirmed = page
        .delete(&CategoryId::new(id.clone()), Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed, DeleteOutcome::Deleted);
    assert_eq!(api.count("DELETE", &path), 1);
    assert_eq!(api.count("GET", "category"), 1);
    assert_eq!(api.calls()[0].method, "DELETE");
    assert!(page.records().is_empty());
}

#[tokio::test]
async fn test_failed_delete_reports_server_message() {
    let api = FakeApi::start().await;
    let category = api.seed_category("Networking", None);
    api.seed_product("Cat6 Patch Cable", "12.50", Some(&category));
    let session = logged_in(&api).await;
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    let outcome = page
        .delete(&CategoryId::new(category), Confirmation::Confirmed)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Failed);
    assert_eq!(page.action_error(), Some("Category is in use by products"));
}

#[tokio::test]
async fn test_solar_category_round_trip() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    let outcome = page
        .create(CategoryDraft {
            name: "Solar".to_string(),
            description: "Solar equipment".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Saved);

    page.list().await.unwrap();
    let solar = page
        .records()
        .iter()
        .find(|c| c.name == "Solar")
        .unwrap();
    assert_eq!(solar.description.as_deref(), Some("Solar equipment"));
    assert!(!solar.id.as_str().is_empty());
}

#[tokio::test]
async fn test_server_message_is_shown_verbatim() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.fail_with(StatusCode::BAD_REQUEST, r#"{"message": "X"}"#);
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    page.list().await.unwrap();

    assert_eq!(page.state(), &ListState::Error("X".to_string()));
}

#[tokio::test]
async fn test_unparseable_error_body_gets_generic_message() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.fail_with(StatusCode::BAD_GATEWAY, "<html>upstream timed out</html>");
    let client = api.client();

    let mut page = CrudPage::<Products>::new(&client, &session);
    page.list().await.unwrap();

    let message = page.state().error().unwrap();
    assert!(!message.is_empty());
    assert!(!message.contains("<html>"));
}

#[tokio::test]
async fn test_unparseable_success_body_falls_back() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.fail_with(StatusCode::OK, "not json at all");
    let client = api.client();

    let mut page = CrudPage::<Subscribers>::new(&client, &session);
    page.list().await.unwrap();

    assert_eq!(page.state().error(), Some("Failed to load subscribers"));
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let api = FakeApi::start().await;
    let session = logged_in(&api).await;
    api.expire_token();
    let client = api.client();

    let mut page = CrudPage::<Categories>::new(&client, &session);
    let result = page.list().await;

    assert!(result.is_err());
    assert!(!session.is_authenticated());
    assert_eq!(page.state(), &ListState::Idle);
}

#[tokio::test]
async fn test_public_products_skip_auth() {
    let api = FakeApi::start().await;
    api.seed_product("LED Floodlight", "89.00", None);

    let products = api.client().public_products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert!(api.calls()[0].authorization.is_none());
}
