//! Size arithmetic for encoded images.
//!
//! Two small pure helpers: estimating the decoded byte length of a data URL's
//! base64 payload, and rendering byte counts as human-readable strings.

/// Unit labels for [`format_bytes`], in increasing powers of 1024.
const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Estimates the decoded byte length of a data URL's base64 payload.
///
/// Only the payload after the first comma is measured; base64 expands raw
/// bytes by 4/3, so the estimate is `payload_len * 0.75` minus one byte per
/// trailing `=` padding character.
///
/// Input without a comma is treated as if the comma sat just before index 0,
/// yielding a nonsensical but non-panicking number. Callers always pass
/// well-formed data URLs, so this stays an accepted edge case.
pub fn estimated_payload_bytes(data_url: &str) -> f64 {
    let comma = data_url.find(',').map(|i| i as i64).unwrap_or(-1);
    let payload_len = data_url.len() as i64 - comma - 1;

    let padding = if data_url.ends_with("==") {
        2.0
    } else if data_url.ends_with('=') {
        1.0
    } else {
        0.0
    };

    payload_len as f64 * 0.75 - padding
}

/// Formats a byte count as a human-readable magnitude string.
///
/// Zero renders as `"0 Bytes"`. Other values pick the largest unit from
/// {Bytes, KB, MB, GB, TB} not exceeding the value and round to `decimals`
/// places, trimming trailing zeros (`1536 -> "1.5 KB"`, `1048576 -> "1 MB"`).
/// Values beyond the unit table clamp to TB.
pub fn format_bytes(bytes: f64, decimals: usize) -> String {
    if bytes == 0.0 {
        return "0 Bytes".to_string();
    }

    let magnitude = (bytes.ln() / 1024_f64.ln()).floor();
    let index = (magnitude.max(0.0) as usize).min(UNITS.len() - 1);
    let value = bytes / 1024_f64.powi(index as i32);

    let mut rendered = format!("{value:.decimals$}");
    if rendered.contains('.') {
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
    }

    format!("{} {}", rendered, UNITS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes_is_literal() {
        assert_eq!(format_bytes(0.0, 2), "0 Bytes");
    }

    #[test]
    fn kilobytes_trim_trailing_zeros() {
        assert_eq!(format_bytes(1536.0, 2), "1.5 KB");
    }

    #[test]
    fn whole_megabyte_has_no_decimals() {
        assert_eq!(format_bytes(1048576.0, 2), "1 MB");
    }

    #[test]
    fn sub_kilobyte_stays_in_bytes() {
        assert_eq!(format_bytes(512.0, 2), "512 Bytes");
    }

    #[test]
    fn huge_values_clamp_to_largest_unit() {
        let formatted = format_bytes(1024_f64.powi(6), 2);
        assert!(formatted.ends_with("TB"), "got {formatted}");
    }

    #[test]
    fn estimate_subtracts_single_padding() {
        // Payload "iVBORw0KGgo=" is 12 characters with one '=' of padding.
        let estimate = estimated_payload_bytes("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(estimate, 12.0 * 0.75 - 1.0);
    }

    #[test]
    fn estimate_subtracts_double_padding() {
        let estimate = estimated_payload_bytes("data:image/png;base64,iVBORw0KGg==");
        assert_eq!(estimate, 12.0 * 0.75 - 2.0);
    }

    #[test]
    fn estimate_without_padding() {
        let estimate = estimated_payload_bytes("data:image/png;base64,aGVsbG8h");
        assert_eq!(estimate, 8.0 * 0.75);
    }

    #[test]
    fn estimate_on_malformed_input_does_not_panic() {
        // No comma: the whole string counts as payload. Accepted edge case.
        let estimate = estimated_payload_bytes("not-a-data-url");
        assert_eq!(estimate, 14.0 * 0.75);
    }
}
