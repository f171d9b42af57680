use serde::{Deserialize, Serialize};

const DEFAULT_INDEX: u64 = 1;
const DEFAULT_SIZE: u64 = 10;
const MAX_SIZE: u64 = 100;

/// `?index=&size=` query, 1-based.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Pagination {
    #[serde(default = "default_index")]
    pub index: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_index() -> u64 {
    DEFAULT_INDEX
}

fn default_size() -> u64 {
    DEFAULT_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self { index: DEFAULT_INDEX, size: DEFAULT_SIZE }
    }
}

impl Pagination {
    pub fn offset(&self) -> u64 {
        self.index.saturating_sub(1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    /// Invalid values fall back to the first page; oversized pages are clamped.
    pub fn check(&self) -> Self {
        if self.index < 1 || self.size < 1 {
            return Self::default();
        }
        let size = self.size.min(MAX_SIZE);
        // the offset must fit the i64 that SQLite binds
        match (self.index - 1).checked_mul(size) {
            Some(offset) if offset <= i64::MAX as u64 => Self { index: self.index, size },
            _ => Self::default(),
        }
    }
}
