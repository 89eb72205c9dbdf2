//! Product categories.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;
use crate::validation::{FormMode, ValidationError, require};

/// A category as returned by `GET /category`.
///
/// Products reference categories softly; deleting a category does not touch
/// the products that point at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw category form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

impl CategoryDraft {
    /// Prefill a draft from an existing category (edit modal).
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }

    /// Validate the draft and produce the JSON body sent to the API.
    ///
    /// Categories validate the same way on create and update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the name is blank.
    pub fn validate(&self, _mode: FormMode) -> Result<CategoryPayload, ValidationError> {
        let name = require("Name", &self.name)?;
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        Ok(CategoryPayload { name, description })
    }
}

/// JSON body for `POST /category` and `PUT /category/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name() {
        let draft = CategoryDraft {
            name: " ".to_string(),
            description: "Anything".to_string(),
        };
        assert_eq!(
            draft.validate(FormMode::Create),
            Err(ValidationError::Required { field: "Name" })
        );
    }

    #[test]
    fn test_blank_description_is_omitted() {
        let draft = CategoryDraft {
            name: "Solar".to_string(),
            description: "   ".to_string(),
        };
        let payload = draft.validate(FormMode::Create).unwrap();
        assert_eq!(payload.description, None);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"name": "Solar"})
        );
    }

    #[test]
    fn test_payload_with_description() {
        let draft = CategoryDraft {
            name: "Solar".to_string(),
            description: "Solar equipment".to_string(),
        };
        let payload = draft.validate(FormMode::Update).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"name": "Solar", "description": "Solar equipment"})
        );
    }

    #[test]
    fn test_deserialize_without_description() {
        let category: Category = serde_json::from_str(r#"{"id": 3, "name": "Cabling"}"#).unwrap();
        assert_eq!(category.description, None);
        assert_eq!(CategoryDraft::from_category(&category).description, "");
    }
}
