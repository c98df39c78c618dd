use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNKNOWN_TITLE: &str = "Unknown Item";
pub const UNKNOWN_PRICE: &str = "Unknown Price";
pub const MISSING_LINK: &str = "#";

/// Price as reported by a source. Sources disagree on the format, so numbers
/// and free text are both kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Amount(serde_json::Number),
    Label(String),
    Unknown,
}

impl Price {
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Price::Unknown,
            Some(serde_json::Value::Number(n)) => Price::Amount(n.clone()),
            Some(serde_json::Value::String(s)) => Price::Label(s.clone()),
            Some(other) => Price::Label(other.to_string()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(n) => write!(f, "{}", n),
            Price::Label(s) => f.write_str(s),
            Price::Unknown => f.write_str(UNKNOWN_PRICE),
        }
    }
}

/// One deal found by a query. `Display` gives the line used in the digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealResult {
    pub title: String,
    pub price: Price,
    pub link: String,
}

impl DealResult {
    pub fn new(title: impl Into<String>, price: Price, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price,
            link: link.into(),
        }
    }
}

impl fmt::Display for DealResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "💸 {} - ${} → [Link]({})", self.title, self.price, self.link)
    }
}

/// Everything one run collected, in source-major, term-minor order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    pub deals: Vec<DealResult>,
    pub queries_attempted: usize,
    pub queries_failed: usize,
}

impl RunResult {
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.deals.iter().map(ToString::to_string).collect()
    }
}
