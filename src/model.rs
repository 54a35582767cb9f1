//! The `Item` entity and its mutable-field input type.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named item in the `items` table.
///
/// Identity is the `id`, assigned by the database on create. Everything
/// else is mutable through `update`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Auto-increment primary key.
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Marks the item as a valid service; drives the `ValidOnly` view.
    #[serde(default)]
    #[sqlx(default)]
    pub valid_service: bool,
}

/// Mutable fields of an [`Item`], as submitted on create/update.
///
/// # Example
///
/// ```
/// use crud_kit::model::ItemDraft;
///
/// let draft = ItemDraft::new("EC2", "Compute").valid_service(true);
/// assert!(draft.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    /// Defaults to false when the field is absent (unchecked checkbox).
    #[serde(default)]
    pub valid_service: bool,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        ItemDraft {
            name: name.into(),
            description: description.into(),
            valid_service: false,
        }
    }

    pub fn valid_service(mut self, valid: bool) -> Self {
        self.valid_service = valid;
        self
    }

    /// Reject drafts with missing required fields.
    ///
    /// Runs before any Store call; whitespace-only values count as missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationError("name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(Error::ValidationError(
                "description is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_builder() {
        let draft = ItemDraft::new("EC2", "Compute").valid_service(true);
        assert_eq!(draft.name, "EC2");
        assert_eq!(draft.description, "Compute");
        assert!(draft.valid_service);
    }

    #[test]
    fn test_draft_defaults_invalid_service() {
        let draft = ItemDraft::new("S3", "Storage");
        assert!(!draft.valid_service);
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        let draft = ItemDraft::new("EC2", "Compute");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let draft = ItemDraft::new("   ", "Compute");
        let err = draft.validate().expect_err("Empty name must be rejected");
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[test]
    fn test_validate_rejects_empty_description() {
        let draft = ItemDraft::new("EC2", "");
        let err = draft
            .validate()
            .expect_err("Empty description must be rejected");
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[test]
    fn test_item_maps_from_mysql_rows() {
        fn assert_from_row<T: for<'r> sqlx::FromRow<'r, sqlx::mysql::MySqlRow>>() {}
        assert_from_row::<Item>();
    }

    #[test]
    fn test_item_serde_roundtrip() {
        let item = Item {
            id: 7,
            name: "EC2".to_string(),
            description: "Compute".to_string(),
            valid_service: true,
        };

        let json = serde_json::to_string(&item).expect("Failed to serialize");
        let back: Item = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(item, back);
    }

    #[test]
    fn test_item_missing_valid_service_defaults_false() {
        // The unfiltered schema variant has no valid_service column.
        let json = r#"{"id":1,"name":"EC2","description":"Compute"}"#;
        let item: Item = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(!item.valid_service);
    }
}
