//! Response envelopes returned by store mutations.

use serde::Deserialize;

/// Answer to `POST /books` and `POST /borrow`.
#[derive(Debug, Deserialize)]
pub(crate) struct InsertResponse {
    #[serde(rename = "insertedId", alias = "_id")]
    pub(crate) inserted_id: String,
}

/// Answer to `DELETE /borrow/{id}`.
///
/// A missing count is read as zero, which the coordinator reports as an
/// inconsistent delete.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteResponse {
    #[serde(rename = "deletedCount", default)]
    pub(crate) deleted_count: u64,
}

/// Body of an error answer; either field may carry the reason.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

const MAX_RAW_ERROR_LEN: usize = 200;

/// Extracts a human-readable reason from an error response body.
///
/// Falls back to the raw body when it is short plain text, then to
/// `fallback` (usually the status reason phrase).
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed
            .error
            .or(parsed.message)
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| fallback.to_string());
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= MAX_RAW_ERROR_LEN && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    fallback.to_string()
}
