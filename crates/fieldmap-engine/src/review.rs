//! Manual-review flags for key fields.

use tracing::warn;

use fieldmap_model::{ResolutionResult, ReviewItem};

/// Key fields resolved below `threshold`, in result order.
///
/// Read-only: the result is never changed and unmapped headers are not
/// reported here.
pub fn review_key_fields<S: AsRef<str>>(
    result: &ResolutionResult,
    key_fields: &[S],
    threshold: f32,
) -> Vec<ReviewItem> {
    let items: Vec<ReviewItem> = result
        .mapped()
        .filter(|(_, assignment)| {
            key_fields
                .iter()
                .any(|key| key.as_ref() == assignment.field_code)
        })
        .filter(|(_, assignment)| assignment.confidence < threshold)
        .map(|(header, assignment)| ReviewItem {
            header: header.to_string(),
            field_code: assignment.field_code.clone(),
            confidence: assignment.confidence,
        })
        .collect();

    if !items.is_empty() {
        warn!(
            domain = %result.data_domain,
            count = items.len(),
            threshold,
            "key fields need manual review"
        );
    }
    items
}
