//! Scan-result discrepancy classification.
//!
//! Deterministic, pure logic. No IO. Two entry points: [`classify_scan`] runs
//! the incremental, best-effort preview applied after each accepted scan;
//! [`rebuild_discrepancies`] is the canonical, authoritative rebuild run on
//! session close.

use chrono::{DateTime, Utc};
use serde_json::json;

#[derive(Debug, Clone, Copy)]
pub struct ExpectedItemFacts {
    pub item_id: i64,
    pub expected_location_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ScanFacts {
    pub item_id: Option<i64>,
    pub barcode_value: Option<String>,
    pub found_location_id: i64,
    pub scan_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemResultOutcome {
    Found,
    FoundInPlace,
}

/// What the incremental classifier thinks the ItemResult for `s.item_id`
/// should become, given the matching expected-location (if known).
pub fn item_result_outcome(expected_location_id: Option<i64>, found_location_id: i64) -> ItemResultOutcome {
    match expected_location_id {
        Some(exp) if exp == found_location_id => ItemResultOutcome::FoundInPlace,
        _ => ItemResultOutcome::Found,
    }
}

/// A discrepancy as the classifier produces it, before it is given an id and
/// persisted. `item_id`/`barcode_value` follow the discriminator the DB
/// upsert key is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyDraft {
    pub discrepancy_type: aud_schemas::DiscrepancyType,
    pub item_id: Option<i64>,
    pub barcode_value: Option<String>,
    pub expected_location_id: Option<i64>,
    pub found_location_id: Option<i64>,
    pub resolution_payload: Option<serde_json::Value>,
}

/// Incremental, per-accepted-scan classification. Returns `None` when the
/// scan resolves cleanly (expected item found in its expected place).
pub fn classify_scan(expected: Option<&ExpectedItemFacts>, scan: &ScanFacts) -> Option<DiscrepancyDraft> {
    match scan.item_id {
        Some(item_id) => match expected {
            None => Some(DiscrepancyDraft {
                discrepancy_type: aud_schemas::DiscrepancyType::Unexpected,
                item_id: Some(item_id),
                barcode_value: None,
                expected_location_id: None,
                found_location_id: Some(scan.found_location_id),
                resolution_payload: None,
            }),
            Some(exp) => match exp.expected_location_id {
                Some(exp_loc) if exp_loc != scan.found_location_id => Some(DiscrepancyDraft {
                    discrepancy_type: aud_schemas::DiscrepancyType::Misplaced,
                    item_id: Some(item_id),
                    barcode_value: None,
                    expected_location_id: Some(exp_loc),
                    found_location_id: Some(scan.found_location_id),
                    resolution_payload: None,
                }),
                _ => None,
            },
        },
        None => scan.barcode_value.as_ref().filter(|b| !b.is_empty()).map(|barcode| DiscrepancyDraft {
            discrepancy_type: aud_schemas::DiscrepancyType::UnknownBarcode,
            item_id: None,
            barcode_value: Some(barcode.clone()),
            expected_location_id: None,
            found_location_id: Some(scan.found_location_id),
            resolution_payload: None,
        }),
    }
}

/// Canonical rebuild: set-theoretic comparison of the expected snapshot and
/// the full scan stream for a session. Order-independent in its result set;
/// emitted in `missing, duplicate, unexpected, misplaced, unknown_barcode`
/// order so repeated rebuilds of identical inputs produce byte-identical
/// insert sequences.
pub fn rebuild_discrepancies(expected: &[ExpectedItemFacts], scans: &[ScanFacts]) -> Vec<DiscrepancyDraft> {
    use std::collections::BTreeMap;

    let mut scans_by_item: BTreeMap<i64, Vec<&ScanFacts>> = BTreeMap::new();
    for s in scans {
        if let Some(id) = s.item_id {
            scans_by_item.entry(id).or_default().push(s);
        }
    }

    let mut out = Vec::new();

    // missing: expected item_id never scanned.
    for exp in expected {
        if !scans_by_item.contains_key(&exp.item_id) {
            out.push(DiscrepancyDraft {
                discrepancy_type: aud_schemas::DiscrepancyType::Missing,
                item_id: Some(exp.item_id),
                barcode_value: None,
                expected_location_id: exp.expected_location_id,
                found_location_id: None,
                resolution_payload: None,
            });
        }
    }

    // duplicate: scanned item_id count > 1.
    for (item_id, hits) in &scans_by_item {
        if hits.len() > 1 {
            out.push(DiscrepancyDraft {
                discrepancy_type: aud_schemas::DiscrepancyType::Duplicate,
                item_id: Some(*item_id),
                barcode_value: None,
                expected_location_id: None,
                found_location_id: None,
                resolution_payload: Some(json!({ "count": hits.len() })),
            });
        }
    }

    let expected_by_id: BTreeMap<i64, &ExpectedItemFacts> =
        expected.iter().map(|e| (e.item_id, e)).collect();

    // unexpected: scanned item_id not in expected set.
    for item_id in scans_by_item.keys() {
        if !expected_by_id.contains_key(item_id) {
            out.push(DiscrepancyDraft {
                discrepancy_type: aud_schemas::DiscrepancyType::Unexpected,
                item_id: Some(*item_id),
                barcode_value: None,
                expected_location_id: None,
                found_location_id: None,
                resolution_payload: None,
            });
        }
    }

    // misplaced: expected item scanned somewhere other than its expected
    // location. Records the location of the *last* scan (by scan_time).
    for (item_id, exp) in &expected_by_id {
        let Some(exp_loc) = exp.expected_location_id else { continue };
        let Some(hits) = scans_by_item.get(item_id) else { continue };
        let last = hits.iter().max_by_key(|s| s.scan_time).expect("non-empty hits");
        if last.found_location_id != exp_loc {
            out.push(DiscrepancyDraft {
                discrepancy_type: aud_schemas::DiscrepancyType::Misplaced,
                item_id: Some(*item_id),
                barcode_value: None,
                expected_location_id: Some(exp_loc),
                found_location_id: Some(last.found_location_id),
                resolution_payload: None,
            });
        }
    }

    // unknown_barcode: scan with item_id=null and non-empty barcode_value.
    for s in scans {
        if s.item_id.is_none() {
            if let Some(barcode) = s.barcode_value.as_ref().filter(|b| !b.is_empty()) {
                out.push(DiscrepancyDraft {
                    discrepancy_type: aud_schemas::DiscrepancyType::UnknownBarcode,
                    item_id: None,
                    barcode_value: Some(barcode.clone()),
                    expected_location_id: None,
                    found_location_id: Some(s.found_location_id),
                    resolution_payload: None,
                });
            }
        }
    }

    out
}
