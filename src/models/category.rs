use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

// ---------------------------------------------------------------------------
// Category: public shape (code + name, no surrogate key)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// CategoryRecord: row of the categories table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl From<CategoryRecord> for Category {
    fn from(r: CategoryRecord) -> Self {
        Self {
            code: r.code,
            name: r.name,
        }
    }
}

// ---------------------------------------------------------------------------
// NewCategory: create request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl NewCategory {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Trim both fields and require them to be non-empty.
    pub fn validated(&self) -> Result<NewCategory> {
        let code = self.code.trim();
        let name = self.name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(CatalogError::invalid("code and name are required"));
        }
        Ok(NewCategory::new(code, name))
    }
}
