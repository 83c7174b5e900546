//! File-name sanitization for exported artifacts.

/// Characters that are unsafe in file names on at least one target platform.
const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Longest file stem we emit; sanitized names are cut after replacement.
const MAX_STEM_CHARS: usize = 100;

/// Map a display name to a filesystem-safe file stem.
///
/// Reserved characters become `_`, each run of whitespace collapses to a
/// single `_`, and the result is truncated to 100 characters. Total and
/// idempotent: sanitizing an already-sanitized name is a no-op.
pub fn sanitize_file_name(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut pending_gap = false;

    for ch in name.chars() {
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }
        if pending_gap {
            stem.push('_');
            pending_gap = false;
        }
        stem.push(if RESERVED.contains(&ch) { '_' } else { ch });
    }
    if pending_gap {
        stem.push('_');
    }

    if stem.chars().count() > MAX_STEM_CHARS {
        stem = stem.chars().take(MAX_STEM_CHARS).collect();
    }
    stem
}
