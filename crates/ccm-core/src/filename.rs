// SPDX-License-Identifier: BUSL-1.1
//! # Filename Sanitation
//!
//! Display filenames come straight from uploads, which means they can carry
//! path separators, traversal segments, and control characters. Every
//! filename persisted into a file state goes through
//! [`sanitize_filename()`] first.

/// Sanitize an uploaded filename for safe storage and display.
///
/// Rules:
/// - only the final path component is kept (`/` and `\` both split);
/// - characters outside `[A-Za-z0-9._-]` become `_`, whitespace included;
/// - leading dots and dashes are stripped, which kills `..` traversal
///   segments and hidden-file names;
/// - a non-empty input never sanitizes to an empty name — the fallback is
///   `"file"`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    let trimmed = out.trim_start_matches(['.', '-']).trim_end_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
