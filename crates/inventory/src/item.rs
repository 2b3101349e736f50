use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, FieldError, RecordId};

/// Business key of an inventory record.
///
/// Compared exactly (case-sensitive, no normalisation). The stored value is
/// the caller's string verbatim; only blank names are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemName(String);

impl ItemName {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::invalid_field(FieldError::new(
                ["item"],
                "item cannot be empty",
                "string_too_short",
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input of the create-or-replace operation.
///
/// Carries no id and no timestamp: both are assigned at write time, and an
/// existing record under the same name is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    item: ItemName,
    quantity: i64,
    notes: String,
}

impl NewRecord {
    pub fn new(item: ItemName, quantity: i64, notes: Option<String>) -> Self {
        Self {
            item,
            quantity,
            notes: notes.unwrap_or_default(),
        }
    }

    pub fn item(&self) -> &ItemName {
        &self.item
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// One row of the inventory table, as returned by the list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: RecordId,
    pub item: String,
    pub quantity: i64,
    pub notes: String,
    pub last_updated: String,
}
