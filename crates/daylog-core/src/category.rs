//! Categories and per-user category visibility.
//!
//! Visibility is display metadata: hiding a category filters the events and
//! todos tagged with it out of calendar views, but never touches the items.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Color used when neither an item nor its category carries one.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// A user-defined category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Server-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Category color (CSS hex string).
    pub color: Option<String>,
    /// Whether items in this category are rendered.
    pub visible: bool,
}

impl Category {
    /// Creates a visible category without a color.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            visible: true,
        }
    }

    /// Builder method to set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder method to set visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// A category reference embedded in an event or todo.
///
/// The backend embeds a trimmed copy of the category in each item; only the
/// id is authoritative, the rest may be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryRef {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: None,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A per-user visibility record for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityRecord {
    pub category_id: i64,
    pub visible: bool,
}

/// Merges visibility records into a category list.
///
/// Categories without a record are visible.
pub fn merge_visibility(mut categories: Vec<Category>, records: &[VisibilityRecord]) -> Vec<Category> {
    let by_id: HashMap<i64, bool> = records.iter().map(|r| (r.category_id, r.visible)).collect();
    for category in &mut categories {
        category.visible = by_id.get(&category.id).copied().unwrap_or(true);
    }
    categories
}

/// Lookup table over the current category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex<'a> {
    by_id: HashMap<i64, &'a Category>,
}

impl<'a> CategoryIndex<'a> {
    /// Builds an index over `categories`.
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            by_id: categories.iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Returns the category with the given id.
    pub fn get(&self, id: i64) -> Option<&'a Category> {
        self.by_id.get(&id).copied()
    }

    /// Returns true if an item tagged with `category` should be rendered.
    ///
    /// Untagged items and items whose category is unknown are always shown.
    pub fn is_visible(&self, category: Option<&CategoryRef>) -> bool {
        category
            .and_then(|r| self.get(r.id))
            .is_none_or(|c| c.visible)
    }

    /// Resolves the display color for an item.
    ///
    /// Order: the item's own color, the indexed category's color, the color
    /// embedded in the item's category reference, then [`DEFAULT_COLOR`].
    pub fn resolve_color(&self, own: Option<&str>, category: Option<&CategoryRef>) -> String {
        non_blank(own)
            .or_else(|| {
                category.and_then(|r| {
                    self.get(r.id)
                        .and_then(|c| non_blank(c.color.as_deref()))
                        .or_else(|| non_blank(r.color.as_deref()))
                })
            })
            .unwrap_or(DEFAULT_COLOR)
            .to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
