//! CRUD collection schemas.
//!
//! A [`Resource`] names a collection on the API and the record type it returns.
//! An [`EditableResource`] also knows how to validate a form draft and encode it
//! as a request body. [`CrudPage`](crate::CrudPage) is generic over these.

use std::fmt::{Debug, Display};

use brightline_core::{
    Category, CategoryDraft, CategoryId, FormMode, ImageInput, ImageUpload, Product, ProductDraft,
    ProductId, Subscriber, SubscriberId, ValidationError,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::client::RequestBody;

/// A collection exposed by the API at `/{COLLECTION}`.
pub trait Resource {
    /// Path segment of the collection, e.g. `category`.
    const COLLECTION: &'static str;
    /// Singular noun used in messages, e.g. `category`.
    const NOUN: &'static str;
    /// Plural noun used in messages, e.g. `categories`.
    const PLURAL: &'static str;

    type Id: Clone + PartialEq + Display + Debug + Send + Sync;
    type Record: DeserializeOwned + Clone + Debug + Send + Sync;
    type Draft: Clone + Default + Debug + Send;

    /// Identifier of a record.
    fn record_id(record: &Self::Record) -> &Self::Id;

    /// Path of one record.
    fn member_path(id: &Self::Id) -> String {
        format!("{}/{id}", Self::COLLECTION)
    }
}

/// A collection the admin can create, update and delete records in.
pub trait EditableResource: Resource {
    /// Prefill the edit form from a record.
    fn draft_from(record: &Self::Record) -> Self::Draft;

    /// Validate a draft and encode it as the request body.
    ///
    /// # Errors
    ///
    /// Returns the first validation rule the draft violates.
    fn encode(draft: &Self::Draft, mode: FormMode) -> Result<RequestBody, ValidationError>;
}

/// `/products`, sent as multipart so an image file can be attached.
#[derive(Debug, Clone, Copy)]
pub struct Products;

impl Resource for Products {
    const COLLECTION: &'static str = "products";
    const NOUN: &'static str = "product";
    const PLURAL: &'static str = "products";

    type Id = ProductId;
    type Record = Product;
    type Draft = ProductDraft;

    fn record_id(record: &Product) -> &ProductId {
        &record.id
    }
}

impl EditableResource for Products {
    fn draft_from(record: &Product) -> ProductDraft {
        ProductDraft::from_product(record)
    }

    fn encode(draft: &ProductDraft, mode: FormMode) -> Result<RequestBody, ValidationError> {
        let payload = draft.validate(mode)?;

        let mut form = Form::new()
            .text("name", payload.name)
            .text("description", payload.description)
            .text("price", payload.price.amount().to_string());

        if let Some(category_id) = payload.category_id {
            form = form.text("category_id", category_id.to_string());
        }

        form = match payload.image {
            ImageInput::None => form,
            ImageInput::Url(url) => form.text("image_url", url),
            ImageInput::Upload(upload) => form.part("image", image_part(&upload)),
        };

        Ok(RequestBody::Multipart(form))
    }
}

/// File part for an uploaded image.
///
/// A content type the browser sent but `mime` cannot parse is dropped rather
/// than failing the upload.
fn image_part(upload: &ImageUpload) -> Part {
    let part = || Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
    match upload.content_type.as_deref() {
        Some(content_type) => part().mime_str(content_type).unwrap_or_else(|_| part()),
        None => part(),
    }
}

/// `/category`, sent as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Categories;

impl Resource for Categories {
    const COLLECTION: &'static str = "category";
    const NOUN: &'static str = "category";
    const PLURAL: &'static str = "categories";

    type Id = CategoryId;
    type Record = Category;
    type Draft = CategoryDraft;

    fn record_id(record: &Category) -> &CategoryId {
        &record.id
    }
}

impl EditableResource for Categories {
    fn draft_from(record: &Category) -> CategoryDraft {
        CategoryDraft::from_category(record)
    }

    fn encode(draft: &CategoryDraft, mode: FormMode) -> Result<RequestBody, ValidationError> {
        let payload = draft.validate(mode)?;

        let mut body = Map::new();
        body.insert("name".to_owned(), Value::String(payload.name));
        if let Some(description) = payload.description {
            body.insert("description".to_owned(), Value::String(description));
        }

        Ok(RequestBody::Json(Value::Object(body)))
    }
}

/// `/newsletter`, read-only from the admin.
#[derive(Debug, Clone, Copy)]
pub struct Subscribers;

impl Resource for Subscribers {
    const COLLECTION: &'static str = "newsletter";
    const NOUN: &'static str = "subscriber";
    const PLURAL: &'static str = "subscribers";

    type Id = SubscriberId;
    type Record = Subscriber;
    type Draft = ();

    fn record_id(record: &Subscriber) -> &SubscriberId {
        &record.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_member_paths() {
        assert_eq!(Products::member_path(&ProductId::from(7)), "products/7");
        assert_eq!(Categories::member_path(&CategoryId::new("c-1")), "category/c-1");
    }

    #[test]
    fn test_category_body_is_json() {
        let draft = CategoryDraft {
            name: "Solar".to_string(),
            description: "Solar equipment".to_string(),
        };
        let body = Categories::encode(&draft, FormMode::Create).unwrap();
        let RequestBody::Json(value) = body else {
            panic!("expected a JSON body");
        };
        assert_eq!(
            value,
            serde_json::json!({"name": "Solar", "description": "Solar equipment"})
        );
    }

    #[test]
    fn test_category_blank_description_not_sent() {
        let draft = CategoryDraft {
            name: "Lighting".to_string(),
            description: "  ".to_string(),
        };
        let RequestBody::Json(value) = Categories::encode(&draft, FormMode::Update).unwrap() else {
            panic!("expected a JSON body");
        };
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_product_body_is_multipart() {
        let draft = ProductDraft {
            name: "Surge Protector".to_string(),
            description: "8-way".to_string(),
            price: "24.99".to_string(),
            category_id: None,
            image: ImageInput::Upload(ImageUpload {
                file_name: "surge.png".to_string(),
                content_type: Some("not a mime type".to_string()),
                bytes: vec![1, 2, 3],
            }),
        };
        let body = Products::encode(&draft, FormMode::Create).unwrap();
        assert!(matches!(body, RequestBody::Multipart(_)));
    }

    #[test]
    fn test_invalid_product_is_rejected_before_encoding() {
        let draft = ProductDraft::default();
        assert_eq!(
            Products::encode(&draft, FormMode::Create).unwrap_err(),
            ValidationError::Required { field: "Name" }
        );
    }

    #[test]
    fn test_draft_from_category() {
        let category = Category {
            id: CategoryId::from(3),
            name: "Networking".to_string(),
            description: None,
        };
        let draft = Categories::draft_from(&category);
        assert_eq!(draft.name, "Networking");
        assert!(draft.description.is_empty());
    }
}
