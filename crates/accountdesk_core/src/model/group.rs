//! Permission group model with explicit display ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;

/// Named account group. Listings sort by `(sort_order, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub sort_order: u32,
}

impl Group {
    /// Creates a group with the default `sort_order` of 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sort_order: 0,
        }
    }

    pub fn with_sort_order(mut self, sort_order: u32) -> Self {
        self.sort_order = sort_order;
        self
    }
}
