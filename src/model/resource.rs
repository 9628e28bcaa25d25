use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware category of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    /// Hardware core (file code 1, displayed as `HC`)
    Core = 1,
    /// Processing element (file code 2, displayed as `PE`)
    Processing = 2,
}

impl ResourceCategory {
    /// Numeric code used in the text file format
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Core),
            2 => Some(Self::Processing),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Core => "HC",
            Self::Processing => "PE",
        }
    }
}

/// Identity of a resource within a pool: category then id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub category: Option<ResourceCategory>,
    pub id: u32,
}

/// A hardware or worker unit tasks can be assigned to.
///
/// Immutable once built. Resources without a category are plain workers.
/// Ordering is by category, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Resource {
    category: Option<ResourceCategory>,
    id: u32,
    base_cost: u32,
}

impl Resource {
    /// Create a categorized hardware resource
    pub fn new(base_cost: u32, category: ResourceCategory, id: u32) -> Self {
        Self {
            category: Some(category),
            id,
            base_cost,
        }
    }

    /// Create an uncategorized worker
    pub fn worker(base_cost: u32, id: u32) -> Self {
        Self {
            category: None,
            id,
            base_cost,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn base_cost(&self) -> u32 {
        self.base_cost
    }

    pub fn category(&self) -> Option<ResourceCategory> {
        self.category
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            category: self.category,
            id: self.id,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(category) => write!(f, "{}{}", category.prefix(), self.id),
            None => write!(f, "W{}", self.id),
        }
    }
}
