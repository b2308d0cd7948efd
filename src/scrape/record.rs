use serde::{Deserialize, Serialize};

/// One `(title, price)` pair pulled from a listing page. The price keeps its
/// currency symbol and is never parsed into a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub price: String,
}

impl BookRecord {
    pub fn new(title: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
        }
    }
}
