use crate::types::AppSnapshot;
use tracing::warn;

/// Serialize a snapshot to the persisted document format.
///
/// Graph nodes are keyed by a sorted map, so the same snapshot always encodes
/// to the same text.
pub fn encode(snapshot: &AppSnapshot) -> Result<String, serde_json::Error> {
    snapshot.to_json_pretty()
}

/// Parse a persisted document. Unknown keys are ignored.
pub fn decode(document: &str) -> Result<AppSnapshot, serde_json::Error> {
    AppSnapshot::from_json(document)
}

/// Decode whatever storage handed back, never failing.
///
/// A missing document is a fresh install. A document that does not parse is
/// logged and treated the same way.
pub fn decode_or_default(document: Option<&str>) -> AppSnapshot {
    let Some(document) = document else {
        return AppSnapshot::default();
    };
    match decode(document) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "discarding unreadable snapshot document");
            AppSnapshot::default()
        }
    }
}
