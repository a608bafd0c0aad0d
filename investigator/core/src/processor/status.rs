//! Status text helpers: extraction, dedup keys, completion markers and source
//! labels.

use crate::events::PayloadRecord;

/// Statuses the backend uses to mark a step as complete
const COMPLETED_STATUSES: &[&str] = &["completed", "complete", "done", "finished", "success"];

/// Extract the human-readable status from a progress payload
///
/// Takes the text between the outermost parentheses when both are present,
/// otherwise the whole payload.
pub(crate) fn extract_status(payload: &str) -> String {
    if let (Some(open), Some(close)) = (payload.find('('), payload.rfind(')')) {
        if open < close {
            return payload[open + 1..close].trim().to_string();
        }
    }
    payload.trim().to_string()
}

/// Dedup key for a status line
///
/// Messages that differ only by counts collapse to the same key, so
/// "Found 2 results" and "Found 5 results" are considered the same message.
pub(crate) fn normalize_status(status: &str) -> String {
    let mut key = String::with_capacity(status.len());
    let mut in_digits = false;
    let mut pending_space = false;

    for ch in status.chars() {
        if ch.is_ascii_digit() {
            if !in_digits {
                if pending_space && !key.is_empty() {
                    key.push(' ');
                }
                pending_space = false;
                key.push('#');
                in_digits = true;
            }
            continue;
        }
        in_digits = false;

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !key.is_empty() {
            key.push(' ');
        }
        pending_space = false;
        key.extend(ch.to_lowercase());
    }

    key.trim_end_matches(['.', '…']).trim_end().to_string()
}

/// Whether a record status marks the step as complete
pub(crate) fn is_completed(status: &str) -> bool {
    let status = status.trim();
    COMPLETED_STATUSES
        .iter()
        .any(|candidate| status.eq_ignore_ascii_case(candidate))
}

/// Display label for a source fragment
///
/// Prefers the title. Identifiers lose any namespace prefix before the last
/// `/` or `:`.
pub(crate) fn source_label(record: &PayloadRecord) -> String {
    let title = record.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }

    let id = if record.id.trim().is_empty() {
        record.investigation.trim()
    } else {
        record.id.trim()
    };
    id.rsplit(['/', ':'])
        .find(|part| !part.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_status_parentheses() {
        assert_eq!(extract_status("Progress(Searching logs)"), "Searching logs");
        assert_eq!(
            extract_status("Update(Found (3) matches)"),
            "Found (3) matches"
        );
        assert_eq!(extract_status("  plain status  "), "plain status");
        assert_eq!(extract_status(") odd ("), ") odd (");
    }

    #[test]
    fn test_normalize_merges_counts() {
        assert_eq!(
            normalize_status("Found 2 results"),
            normalize_status("Found 5 results")
        );
        assert_eq!(normalize_status("Found 120 results"), "found # results");
        assert_ne!(
            normalize_status("Found 2 results"),
            normalize_status("Found 2 errors")
        );
    }

    #[test]
    fn test_normalize_whitespace_and_trailing_dots() {
        assert_eq!(normalize_status("Searching   logs..."), "searching logs");
        assert_eq!(normalize_status("Searching logs…"), "searching logs");
        assert_eq!(normalize_status("  Step 3 of 10 "), "step # of #");
    }

    #[test]
    fn test_is_completed() {
        assert!(is_completed("completed"));
        assert!(is_completed("COMPLETED"));
        assert!(is_completed(" done "));
        assert!(!is_completed("in_progress"));
        assert!(!is_completed(""));
    }

    #[test]
    fn test_source_label_prefers_title() {
        let record = PayloadRecord::default()
            .with_title("Service Runbook")
            .with_id("docs/runbooks:svc");
        assert_eq!(source_label(&record), "Service Runbook");
    }

    #[test]
    fn test_source_label_strips_namespace() {
        let record = PayloadRecord::default().with_id("logs:prod/api-gateway");
        assert_eq!(source_label(&record), "api-gateway");

        let record = PayloadRecord::default().with_id("plain-id");
        assert_eq!(source_label(&record), "plain-id");

        let record = PayloadRecord::default().with_id("trailing/");
        assert_eq!(source_label(&record), "trailing");
    }

    #[test]
    fn test_source_label_from_raw_payload() {
        let record = PayloadRecord::decode("metrics:cpu");
        assert_eq!(source_label(&record), "cpu");
        assert_eq!(source_label(&PayloadRecord::default()), "");
    }
}
