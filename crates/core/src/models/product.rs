//! Product records and the product form draft.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};
use crate::validation::{FormMode, ValidationError, require};

/// A product as returned by `GET /products`.
///
/// The API has historically returned the image reference as either `image` or
/// `image_url`; both are accepted and `image` wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductWire")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub description: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    /// Denormalized, read-only.
    pub category_name: Option<String>,
}

#[derive(Deserialize)]
struct ProductWire {
    id: ProductId,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    price: Price,
    #[serde(default)]
    category_id: Option<CategoryId>,
    #[serde(default)]
    category_name: Option<String>,
}

impl From<ProductWire> for Product {
    fn from(wire: ProductWire) -> Self {
        let image = wire
            .image
            .filter(|s| !s.is_empty())
            .or(wire.image_url)
            .filter(|s| !s.is_empty());

        Self {
            id: wire.id,
            name: wire.name,
            image,
            description: wire.description.unwrap_or_default(),
            price: wire.price,
            category_id: wire.category_id,
            category_name: wire.category_name,
        }
    }
}

/// Uploaded image file from the product form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Image source selected in the product form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageInput {
    /// Nothing selected (keeps the current image on update).
    #[default]
    None,
    /// Link to an already-hosted image.
    Url(String),
    /// A file uploaded through the form.
    Upload(ImageUpload),
}

impl ImageInput {
    fn is_none(&self) -> bool {
        match self {
            Self::None => true,
            Self::Url(url) => url.trim().is_empty(),
            Self::Upload(upload) => upload.bytes.is_empty(),
        }
    }
}

/// Raw product form input, as typed by the admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category_id: Option<CategoryId>,
    pub image: ImageInput,
}

impl ProductDraft {
    /// Prefill a draft from an existing product (edit modal).
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            category_id: product.category_id.clone(),
            image: ImageInput::None,
        }
    }

    /// Validate the draft and produce the payload sent to the API.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates: name and description are
    /// required, the price must be greater than zero, and an image is required
    /// when creating.
    pub fn validate(&self, mode: FormMode) -> Result<ProductPayload, ValidationError> {
        let name = require("Name", &self.name)?;
        let description = require("Description", &self.description)?;

        let price = Price::parse(&self.price).map_err(|_| ValidationError::InvalidPrice)?;
        if !price.is_positive() {
            return Err(ValidationError::InvalidPrice);
        }

        if mode == FormMode::Create && self.image.is_none() {
            return Err(ValidationError::ImageRequired);
        }

        let image = match &self.image {
            ImageInput::Url(url) if !url.trim().is_empty() => ImageInput::Url(url.trim().to_owned()),
            ImageInput::Upload(upload) if !upload.bytes.is_empty() => {
                ImageInput::Upload(upload.clone())
            }
            _ => ImageInput::None,
        };

        Ok(ProductPayload {
            name,
            description,
            price,
            category_id: self.category_id.clone(),
            image,
        })
    }
}

/// A validated product, ready to be encoded as a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub image: ImageInput,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            name: "Cat6 Patch Cable".to_string(),
            description: "3m shielded patch cable".to_string(),
            price: "12.50".to_string(),
            category_id: Some(CategoryId::from(2)),
            image: ImageInput::Url("https://cdn.example.com/cat6.jpg".to_string()),
        }
    }

    #[test]
    fn test_deserialize_accepts_image_url_alias() {
        let json = r#"{"id": 1, "name": "Breaker", "image_url": "/img/b.png",
                       "description": "20A", "price": "19.99", "category_id": 3}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "1");
        assert_eq!(product.image.as_deref(), Some("/img/b.png"));
        assert_eq!(product.category_id, Some(CategoryId::from(3)));
    }

    #[test]
    fn test_deserialize_prefers_image_over_image_url() {
        let json = r#"{"id": "p1", "name": "Switch", "image": "/a.png", "image_url": "/b.png",
                       "price": 99}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.image.as_deref(), Some("/a.png"));
        assert_eq!(product.description, "");
        assert_eq!(product.category_id, None);
    }

    #[test]
    fn test_validate_valid_create() {
        let payload = valid_draft().validate(FormMode::Create).unwrap();
        assert_eq!(payload.name, "Cat6 Patch Cable");
        assert_eq!(payload.price.to_string(), "$12.50");
    }

    #[test]
    fn test_validate_trims_fields() {
        let mut draft = valid_draft();
        draft.name = "  Conduit  ".to_string();
        let payload = draft.validate(FormMode::Create).unwrap();
        assert_eq!(payload.name, "Conduit");
    }

    #[test]
    fn test_validate_requires_name_and_description() {
        let mut draft = valid_draft();
        draft.name = "   ".to_string();
        assert_eq!(
            draft.validate(FormMode::Create),
            Err(ValidationError::Required { field: "Name" })
        );

        let mut draft = valid_draft();
        draft.description = String::new();
        assert_eq!(
            draft.validate(FormMode::Update),
            Err(ValidationError::Required {
                field: "Description"
            })
        );
    }

    #[test]
    fn test_validate_price_must_be_positive() {
        for price in ["0", "-5", "ten", ""] {
            let mut draft = valid_draft();
            draft.price = price.to_string();
            assert_eq!(
                draft.validate(FormMode::Create),
                Err(ValidationError::InvalidPrice),
                "price {price:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_image_required_only_on_create() {
        let mut draft = valid_draft();
        draft.image = ImageInput::None;
        assert_eq!(
            draft.validate(FormMode::Create),
            Err(ValidationError::ImageRequired)
        );
        assert!(draft.validate(FormMode::Update).is_ok());

        draft.image = ImageInput::Url("   ".to_string());
        assert_eq!(
            draft.validate(FormMode::Create),
            Err(ValidationError::ImageRequired)
        );
    }

    #[test]
    fn test_validate_accepts_upload() {
        let mut draft = valid_draft();
        draft.image = ImageInput::Upload(ImageUpload {
            file_name: "cable.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        });
        let payload = draft.validate(FormMode::Create).unwrap();
        assert!(matches!(payload.image, ImageInput::Upload(_)));
    }

    #[test]
    fn test_from_product_prefills_draft() {
        let product: Product = serde_json::from_str(
            r#"{"id": 5, "name": "Router", "image": "/r.png", "description": "Dual band",
                "price": "149.00", "category_id": "9"}"#,
        )
        .unwrap();
        let draft = ProductDraft::from_product(&product);
        assert_eq!(draft.name, "Router");
        assert_eq!(draft.price, "149.00");
        assert_eq!(draft.category_id, Some(CategoryId::new("9")));
        assert_eq!(draft.image, ImageInput::None);
    }
}
