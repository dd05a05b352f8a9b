// src/export/aggregator.rs
//! Drains a paged data source into one ordered sequence of records

use anyhow::Result;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::types::{classify_page, PageShape, Record};

pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Fetch pages in order until the source is exhausted.
///
/// `fetch_page(page_number, page_size)` is awaited one call at a time, starting at
/// page 1. A direct (bare array) response ends aggregation after the first call.
/// A paginated response continues only while pages come back exactly full.
/// Unrecognized payloads count as an empty page, which ends aggregation.
///
/// Any error from `fetch_page` is returned as-is and the partial result is dropped.
pub async fn aggregate<F, Fut>(mut fetch_page: F, page_size: u32) -> Result<Vec<Record>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    if page_size == 0 {
        anyhow::bail!("Page size must be greater than zero");
    }

    let mut page: u32 = 1;
    let mut all_items: Vec<Record> = Vec::new();
    let mut has_more = true;

    while has_more {
        let payload = fetch_page(page, page_size).await?;
        let shape = classify_page(payload);
        let received = shape.received();

        has_more = match &shape {
            PageShape::Direct { .. } => false,
            PageShape::Paginated { .. } => received == page_size as usize,
            PageShape::Unknown => {
                warn!(
                    "Page {} matched neither the paginated nor the direct shape, treating it as empty",
                    page
                );
                false
            }
        };

        debug!(
            "Page {} ({}): {} item(s), continue={}",
            page,
            shape.kind(),
            received,
            has_more
        );

        all_items.extend(shape.into_items());
        page += 1;
    }

    info!(
        "Aggregated {} record(s) across {} page(s)",
        all_items.len(),
        page - 1
    );

    Ok(all_items)
}
