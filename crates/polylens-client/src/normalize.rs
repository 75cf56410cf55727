//! Payload normalization at the client boundary.
//!
//! Upstream fields arrive inconsistently shaped: arrays sometimes
//! JSON-encoded as strings, numbers sometimes quoted, ids sometimes
//! numeric. Each payload type goes through exactly one normalization
//! function returning a strict typed record. A malformed sub-field degrades
//! to empty/`None` for that field; it never aborts a multi-item payload.

use chrono::{DateTime, Utc};
use polylens_core::{
    BookLevel, FetchError, FetchResult, MarketItem, OrderBook, OutcomeQuote, PricePoint,
    TopicCatalogEntry,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

/// Decode the topic catalog. Entries missing an id or slug are skipped.
pub fn parse_tags(value: &Value) -> FetchResult<Vec<TopicCatalogEntry>> {
    let entries = value
        .as_array()
        .ok_or_else(|| FetchError::InvalidShape("tag catalog is not an array".to_string()))?;
    Ok(entries
        .iter()
        .filter_map(|entry| match parse_tag_entry(entry) {
            Some(tag) => Some(tag),
            None => {
                debug!("skipping catalog entry without id or slug");
                None
            }
        })
        .collect())
}

/// Decode one tag from the direct lookup endpoint.
pub fn parse_tag(value: &Value) -> FetchResult<TopicCatalogEntry> {
    parse_tag_entry(value)
        .ok_or_else(|| FetchError::InvalidShape("tag entry missing id or slug".to_string()))
}

fn parse_tag_entry(value: &Value) -> Option<TopicCatalogEntry> {
    let id = u64_field(value, "id")?;
    let slug = str_field(value, "slug")?.to_string();
    let label = str_field(value, "label").unwrap_or(&slug).to_string();
    Some(TopicCatalogEntry { id, slug, label })
}

/// Decode a market listing page. Entries without an id are skipped with a
/// warning; every other malformed field degrades per-field.
pub fn parse_markets(value: &Value) -> FetchResult<Vec<MarketItem>> {
    let entries = value
        .as_array()
        .ok_or_else(|| FetchError::InvalidShape("market listing is not an array".to_string()))?;
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_market(entry) {
            Some(item) => items.push(item),
            None => warn!("skipping market entry without an id"),
        }
    }
    Ok(items)
}

/// Decode one market entry; `None` when the stable id itself is missing.
pub fn parse_market(value: &Value) -> Option<MarketItem> {
    let id = id_field(value)?;

    let outcome_labels = string_list(value.get("outcomes"));
    let outcome_prices = string_list(value.get("outcomePrices"));
    let outcomes = outcome_labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| OutcomeQuote {
            label,
            price: outcome_prices.get(i).and_then(|p| Decimal::from_str(p).ok()),
        })
        .collect();

    Some(MarketItem {
        id,
        question: str_field(value, "question").unwrap_or_default().to_string(),
        slug: str_field(value, "slug").unwrap_or_default().to_string(),
        volume: decimal_field(value, "volume").or_else(|| decimal_field(value, "volumeNum")),
        liquidity: decimal_field(value, "liquidity")
            .or_else(|| decimal_field(value, "liquidityNum")),
        outcomes,
        clob_token_ids: string_list(value.get("clobTokenIds")),
        end_date: str_field(value, "endDate")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc)),
        active: value.get("active").and_then(Value::as_bool).unwrap_or(true),
        closed: value.get("closed").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Decode one outcome's order book. A missing or malformed side degrades to
/// an empty side.
pub fn parse_order_book(value: &Value) -> FetchResult<OrderBook> {
    if !value.is_object() {
        return Err(FetchError::InvalidShape(
            "order book is not an object".to_string(),
        ));
    }
    Ok(OrderBook {
        bids: parse_levels(value.get("bids")),
        asks: parse_levels(value.get("asks")),
    })
}

fn parse_levels(value: Option<&Value>) -> Vec<BookLevel> {
    match value.and_then(Value::as_array) {
        Some(levels) => levels
            .iter()
            .filter_map(|level| {
                Some(BookLevel {
                    price: decimal_field(level, "price")?,
                    size: decimal_field(level, "size")?,
                })
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Decode a price-history response: `{"history": [{"t": ..., "p": ...}]}`.
/// Malformed samples are dropped.
pub fn parse_price_history(value: &Value) -> FetchResult<Vec<PricePoint>> {
    let points = value
        .get("history")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FetchError::InvalidShape("price history missing history array".to_string())
        })?;
    Ok(points
        .iter()
        .filter_map(|point| {
            Some(PricePoint {
                t: point.get("t").and_then(Value::as_i64)?,
                p: decimal_field(point, "p")?,
            })
        })
        .collect())
}

/// Stable id: accepted as a JSON string or number.
fn id_field(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Numeric field that upstream serves either as a number or a quoted string.
fn decimal_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

/// String list that upstream serves either as a JSON array or as a
/// JSON-encoded string of one. Garbage degrades to empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => match serde_json::from_str::<Vec<String>>(s) {
            Ok(list) => list,
            Err(_) => {
                debug!("string-encoded list failed to decode, degrading to empty");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_tags_mixed_id_shapes() {
        let value = json!([
            {"id": 1, "slug": "bitcoin", "label": "Bitcoin"},
            {"id": "2", "slug": "ethereum"},
            {"slug": "no-id"},
        ]);
        let tags = parse_tags(&value).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].id, 1);
        assert_eq!(tags[1].id, 2);
        // Label falls back to the slug when absent.
        assert_eq!(tags[1].label, "ethereum");
    }

    #[test]
    fn test_parse_tags_rejects_non_array() {
        let result = parse_tags(&json!({"data": []}));
        assert!(matches!(result, Err(FetchError::InvalidShape(_))));
    }

    #[test]
    fn test_parse_market_array_shaped_fields() {
        let value = json!({
            "id": "m1",
            "question": "Will BTC close above 100k?",
            "slug": "btc-100k",
            "volume": "500000.5",
            "outcomes": ["Yes", "No"],
            "outcomePrices": ["0.62", "0.38"],
            "clobTokenIds": ["tok-yes", "tok-no"],
            "endDate": "2026-12-31T00:00:00Z",
            "active": true,
            "closed": false,
        });
        let item = parse_market(&value).unwrap();
        assert_eq!(item.volume, Some(dec!(500000.5)));
        assert_eq!(item.outcomes.len(), 2);
        assert_eq!(item.outcomes[0].price, Some(dec!(0.62)));
        assert_eq!(item.clob_token_ids, vec!["tok-yes", "tok-no"]);
        assert!(item.end_date.is_some());
    }

    #[test]
    fn test_parse_market_string_encoded_fields() {
        let value = json!({
            "id": "m2",
            "volume": 12345.0,
            "outcomes": "[\"Yes\", \"No\"]",
            "outcomePrices": "[\"0.5\", \"0.5\"]",
            "clobTokenIds": "[\"a\", \"b\"]",
        });
        let item = parse_market(&value).unwrap();
        assert_eq!(item.volume, Some(dec!(12345)));
        assert_eq!(item.outcomes.len(), 2);
        assert_eq!(item.clob_token_ids.len(), 2);
    }

    #[test]
    fn test_parse_market_garbage_fields_degrade() {
        let value = json!({
            "id": "m3",
            "volume": "not-a-number",
            "outcomes": "not-json",
            "outcomePrices": 42,
            "endDate": "yesterday",
        });
        let item = parse_market(&value).unwrap();
        assert_eq!(item.volume, None);
        assert!(item.outcomes.is_empty());
        assert!(item.end_date.is_none());
    }

    #[test]
    fn test_parse_markets_skips_entries_without_id() {
        let value = json!([
            {"id": "m1"},
            {"question": "orphan"},
            {"id": 99},
        ]);
        let items = parse_markets(&value).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "99");
    }

    #[test]
    fn test_parse_order_book() {
        let value = json!({
            "bids": [
                {"price": "0.44", "size": "100"},
                {"price": "0.45", "size": "50"},
                {"price": "oops", "size": "1"},
            ],
            "asks": [{"price": "0.47", "size": "30"}],
        });
        let book = parse_order_book(&value).unwrap();
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.best_bid(), Some(dec!(0.45)));
        assert_eq!(book.best_ask(), Some(dec!(0.47)));
    }

    #[test]
    fn test_parse_order_book_missing_sides_degrade() {
        let book = parse_order_book(&json!({})).unwrap();
        assert!(book.is_empty());
        assert!(matches!(
            parse_order_book(&json!([1, 2])),
            Err(FetchError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_parse_price_history() {
        let value = json!({"history": [
            {"t": 1700000000, "p": 0.41},
            {"t": 1700003600, "p": "0.43"},
            {"p": 0.5},
        ]});
        let points = parse_price_history(&value).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].p, dec!(0.43));
        assert!(matches!(
            parse_price_history(&json!([])),
            Err(FetchError::InvalidShape(_))
        ));
    }
}
