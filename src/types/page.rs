// src/types/page.rs
//! Classification of raw page payloads returned by paged data sources

use serde_json::Value;
use tracing::warn;

use super::record::Record;

/// Shape of one page response, decided once per call
#[derive(Debug, Clone, PartialEq)]
pub enum PageShape {
    /// `{ "items": [...], ... }` envelope
    Paginated { items: Vec<Record>, received: usize },
    /// Bare array holding the complete result
    Direct { items: Vec<Record>, received: usize },
    Unknown,
}

impl PageShape {
    #[cfg(test)]
    pub(crate) fn items(&self) -> &[Record] {
        match self {
            Self::Paginated { items, .. } | Self::Direct { items, .. } => items,
            Self::Unknown => &[],
        }
    }

    pub fn into_items(self) -> Vec<Record> {
        match self {
            Self::Paginated { items, .. } | Self::Direct { items, .. } => items,
            Self::Unknown => Vec::new(),
        }
    }

    /// Raw element count of the page, including skipped non-object entries.
    /// Page-size comparisons use this count.
    pub fn received(&self) -> usize {
        match self {
            Self::Paginated { received, .. } | Self::Direct { received, .. } => *received,
            Self::Unknown => 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Paginated { .. } => "paginated",
            Self::Direct { .. } => "direct",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify a page payload. An object with an `items` array is paginated,
/// a bare array is direct, anything else is unknown.
pub fn classify_page(payload: Value) -> PageShape {
    match payload {
        Value::Object(mut envelope) => match envelope.remove("items") {
            Some(Value::Array(items)) => PageShape::Paginated {
                received: items.len(),
                items: into_records(items),
            },
            _ => PageShape::Unknown,
        },
        Value::Array(items) => PageShape::Direct {
            received: items.len(),
            items: into_records(items),
        },
        _ => PageShape::Unknown,
    }
}

fn into_records(items: Vec<Value>) -> Vec<Record> {
    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();

    if records.len() != total {
        warn!(
            "Skipped {} non-object item(s) in page payload",
            total - records.len()
        );
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_paginated_envelope() {
        let shape = classify_page(json!({"items": [{"id": 1}, {"id": 2}], "total": 2}));
        assert_eq!(shape.kind(), "paginated");
        assert_eq!(shape.items().len(), 2);
    }

    #[test]
    fn test_classify_direct_array() {
        let shape = classify_page(json!([{"id": 1}]));
        assert_eq!(shape.kind(), "direct");
        assert_eq!(shape.into_items()[0]["id"], json!(1));
    }

    #[test]
    fn test_classify_unknown_shapes() {
        assert_eq!(classify_page(json!({"data": []})), PageShape::Unknown);
        assert_eq!(classify_page(json!({"items": "nope"})), PageShape::Unknown);
        assert_eq!(classify_page(json!("text")), PageShape::Unknown);
        assert_eq!(classify_page(Value::Null), PageShape::Unknown);
    }

    #[test]
    fn test_non_object_items_are_skipped() {
        let shape = classify_page(json!([{"id": 1}, 7, null, {"id": 2}]));
        assert_eq!(shape.items().len(), 2);
        assert_eq!(shape.received(), 4);
    }
}
