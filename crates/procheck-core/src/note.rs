//! The note side-channel.
//!
//! Event notes carry free text plus space/comma-separated `key=value`
//! tokens (`interval_min=12`, `target_min=30`, audit markers like
//! `auto_stop=1`). All composition and extraction goes through this one
//! module; nothing else in the crate scans note strings.

/// Extract an integer `key=value` token from a note.
///
/// Tokens are space or comma separated. The first matching token wins; a
/// token whose value fails to parse yields `None`.
pub fn extract(note: &str, key: &str) -> Option<i64> {
    if note.is_empty() {
        return None;
    }
    for part in note.replace(',', " ").split_whitespace() {
        if let Some(value) = part.strip_prefix(key) {
            if let Some(raw) = value.strip_prefix('=') {
                return raw.parse().ok();
            }
        }
    }
    None
}

/// Compose a note from an optional free-text reason plus the standard
/// `key=value` tokens. The reason (whitespace-collapsed) and the token
/// block are joined with ` | `.
pub fn compose(
    reason: Option<&str>,
    target_min: Option<u32>,
    interval_min: Option<u32>,
    extra: Option<&str>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(reason) = reason {
        let collapsed = reason.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            parts.push(collapsed);
        }
    }

    let mut kv: Vec<String> = Vec::new();
    if let Some(t) = target_min {
        if t > 0 {
            kv.push(format!("target_min={t}"));
        }
    }
    if let Some(i) = interval_min {
        if i > 0 {
            kv.push(format!("interval_min={i}"));
        }
    }
    if let Some(extra) = extra {
        let trimmed = extra.trim();
        if !trimmed.is_empty() {
            kv.push(trimmed.to_string());
        }
    }
    if !kv.is_empty() {
        parts.push(kv.join(" "));
    }

    parts.join(" | ")
}

/// Strip internal tokens (`interval_min=<n>`, `auto_stop=1`) from a note
/// for display in event listings, normalizing separators and whitespace.
pub fn clean_for_display(note: &str) -> String {
    if note.is_empty() {
        return String::new();
    }

    let kept: Vec<&str> = note
        .split_whitespace()
        .filter(|tok| {
            let bare = tok.trim_matches(',');
            if bare == "auto_stop=1" {
                return false;
            }
            match bare.strip_prefix("interval_min=") {
                Some(rest) => rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()),
                None => true,
            }
        })
        .collect();

    let mut out = kept.join(" ");
    while out.contains("| |") {
        out = out.replace("| |", "|");
    }
    out.trim().trim_matches('|').trim().to_string()
}
