//! Activity categories: a display name and a color for calendar blocks.

use serde::{Deserialize, Serialize};

/// Reference data shared by many sessions; never deleted through a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color_hex: String,
}

/// Input data for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub color_hex: String,
}

impl Category {
    pub const DEFAULT_COLOR: &'static str = "#808080";
    pub const DEFAULT_LABEL: &'static str = "Uncategorized";

    pub fn color_or_default(category: Option<&Category>) -> &str {
        category.map_or(Self::DEFAULT_COLOR, |c| c.color_hex.as_str())
    }

    pub fn label_or_default(category: Option<&Category>) -> &str {
        category.map_or(Self::DEFAULT_LABEL, |c| c.name.as_str())
    }
}
