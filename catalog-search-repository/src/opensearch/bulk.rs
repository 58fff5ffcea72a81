//! Bulk request construction and per-item response parsing.

use std::collections::HashMap;

use catalog_search_shared::SearchDocument;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary};

/// HTTP status the engine reports for a write whose external version is not newer.
pub const VERSION_CONFLICT_STATUS: u64 = 409;

/// Build the action/source line pairs of a bulk index request.
///
/// With `version_fencing`, documents carrying an `updatedAt` are written with
/// it as an external version so an older snapshot cannot replace a newer one.
pub fn build_bulk_body(
    index: &str,
    documents: &[SearchDocument],
    version_fencing: bool,
) -> Result<Vec<Value>, SearchIndexError> {
    let mut body = Vec::with_capacity(documents.len() * 2);

    for doc in documents {
        let mut action = json!({
            "_index": index,
            "_id": doc.document_id(),
        });
        if version_fencing {
            if let Some(version) = doc.version() {
                action["version"] = json!(version);
                action["version_type"] = json!("external");
            }
        }

        let source = serde_json::to_value(doc).map_err(|e| {
            SearchIndexError::serialization(format!("product {}: {}", doc.id, e))
        })?;

        body.push(json!({ "index": action }));
        body.push(source);
    }

    Ok(body)
}

/// Inspect a bulk response item by item.
///
/// Items are matched to documents by position and checked against `_id`,
/// falling back to an `_id` lookup if the positions disagree. A document with
/// no matching item is reported failed rather than silently dropped.
pub fn parse_bulk_response(
    response: &Value,
    documents: &[SearchDocument],
    version_fencing: bool,
) -> BatchOperationSummary {
    let items = response["items"].as_array().map(Vec::as_slice).unwrap_or(&[]);

    let by_id: HashMap<&str, &Value> = items
        .iter()
        .filter_map(|item| {
            let op = item_operation(item)?;
            op["_id"].as_str().map(|id| (id, op))
        })
        .collect();

    let results = documents
        .iter()
        .enumerate()
        .map(|(position, doc)| {
            let doc_id = doc.document_id();
            let positional = items
                .get(position)
                .and_then(item_operation)
                .filter(|op| op["_id"].as_str() == Some(doc_id.as_str()));

            match positional.or_else(|| by_id.get(doc_id.as_str()).copied()) {
                Some(op) => item_result(doc.id, op, version_fencing),
                None => BatchOperationResult::failed(
                    doc.id,
                    SearchIndexError::parse("no item for document in bulk response"),
                ),
            }
        })
        .collect();

    BatchOperationSummary::from_results(results)
}

fn item_operation(item: &Value) -> Option<&Value> {
    item.get("index")
        .or_else(|| item.get("create"))
        .or_else(|| item.get("update"))
}

fn item_result(product_id: i64, op: &Value, version_fencing: bool) -> BatchOperationResult {
    let status = op["status"].as_u64().unwrap_or(0);

    if op.get("error").is_none() && (200..300).contains(&status) {
        return BatchOperationResult::succeeded(product_id);
    }

    if version_fencing && status == VERSION_CONFLICT_STATUS {
        debug!(product_id, "Skipped stale document version");
        return BatchOperationResult::succeeded(product_id);
    }

    let error = &op["error"];
    let reason = match (error["type"].as_str(), error["reason"].as_str()) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (None, Some(reason)) => reason.to_string(),
        (Some(kind), None) => kind.to_string(),
        (None, None) => format!("status {}", status),
    };

    BatchOperationResult::failed(product_id, SearchIndexError::bulk_index(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn doc(id: i64) -> SearchDocument {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Product {}", id),
            "slug": null,
            "sku": null,
            "description": null,
            "price": 0.0,
            "priceUSD": 10.0,
            "priceEUR": 9.0,
            "priceUAH": 400.0,
            "currency": "USD",
            "status": "available",
            "views": 0,
            "createdAt": null,
            "updatedAt": null,
            "publishedAt": null,
            "attributes": null,
            "available": true,
            "condition": "new",
            "videoUrl": null,
            "category": null,
            "categoryId": null,
            "categoryName": null,
            "categorySlug": null,
            "parentCategoryId": null,
            "parentCategoryName": null,
            "parentCategorySlug": null,
            "seller": null,
            "sellerId": null,
            "sellerCompanyName": null
        }))
        .unwrap()
    }

    fn ok_item(id: i64) -> Value {
        json!({ "index": { "_index": "products", "_id": id.to_string(), "status": 200 } })
    }

    #[test]
    fn test_build_bulk_body_pairs_actions_and_sources() {
        let body = build_bulk_body("products", &[doc(1), doc(2)], false).unwrap();

        assert_eq!(body.len(), 4);
        assert_eq!(body[0]["index"]["_index"], "products");
        assert_eq!(body[0]["index"]["_id"], "1");
        assert!(body[0]["index"].get("version").is_none());
        assert_eq!(body[1]["id"], 1);
        assert_eq!(body[3]["priceEUR"], 9.0);
    }

    #[test]
    fn test_build_bulk_body_attaches_external_version() {
        let mut fenced = doc(7);
        fenced.updated_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        let body = build_bulk_body("products", &[fenced, doc(8)], true).unwrap();

        assert_eq!(body[0]["index"]["version"], 1_714_564_800_000_i64);
        assert_eq!(body[0]["index"]["version_type"], "external");
        // No updatedAt, no fence.
        assert!(body[2]["index"].get("version").is_none());
    }

    #[test]
    fn test_parse_partial_failure_keeps_siblings() {
        let response = json!({
            "errors": true,
            "items": [
                ok_item(1),
                { "index": {
                    "_id": "2",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [priceUSD]" }
                } },
                ok_item(3)
            ]
        });

        let summary = parse_bulk_response(&response, &[doc(1), doc(2), doc(3)], false);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed_ids(), vec![2]);
        let error = summary.results[1].error.as_ref().unwrap().to_string();
        assert!(error.contains("mapper_parsing_exception"));
    }

    #[test]
    fn test_parse_matches_by_id_when_positions_disagree() {
        let response = json!({ "errors": false, "items": [ok_item(2), ok_item(1)] });

        let summary = parse_bulk_response(&response, &[doc(1), doc(2)], false);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.results[0].product_id, 1);
    }

    #[test]
    fn test_parse_missing_item_is_reported_failed() {
        let response = json!({ "errors": false, "items": [ok_item(1)] });

        let summary = parse_bulk_response(&response, &[doc(1), doc(2)], false);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed_ids(), vec![2]);
    }

    #[test]
    fn test_parse_version_conflict_depends_on_fencing() {
        let response = json!({
            "errors": true,
            "items": [{ "index": {
                "_id": "5",
                "status": 409,
                "error": { "type": "version_conflict_engine_exception", "reason": "current version is higher" }
            } }]
        });

        let fenced = parse_bulk_response(&response, &[doc(5)], true);
        assert_eq!(fenced.succeeded, 1);

        let unfenced = parse_bulk_response(&response, &[doc(5)], false);
        assert_eq!(unfenced.failed, 1);
    }
}
