//! Input normalization — reversing transport-level percent-encoding.
//!
//! Clients crossing a URL transport are expected to percent-encode reserved
//! characters (notably `#`, which a browser would otherwise strip as a
//! fragment) exactly once. This module reverses that encoding so the
//! classifier sees the string the user typed. Decoding never fails a
//! request: malformed input falls back to the original string.

use std::borrow::Cow;

/// Decode percent-escapes in `raw`, exactly once, idempotently.
///
/// Guarantees `normalize(normalize(s)) == normalize(s)` for every string:
/// - input without `%` is returned as-is;
/// - input with a malformed escape (a `%` not followed by two hex digits)
///   is returned unchanged and flagged via `tracing` — the request still
///   proceeds on the raw bytes;
/// - input whose decoded form could decode *again* (double-encoded, e.g.
///   `%2523`) is returned unchanged. One decode of such input cannot be
///   idempotent, and clients are contracted to encode exactly once.
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }

    if !every_percent_escaped(raw) {
        tracing::warn!(input = raw, "malformed percent-escape, searching raw bytes");
        return Cow::Borrowed(raw);
    }

    match urlencoding::decode(raw) {
        Ok(decoded) => {
            if decoded.contains('%') && every_percent_escaped(&decoded) {
                tracing::debug!(input = raw, "double-encoded input left untouched");
                return Cow::Borrowed(raw);
            }
            decoded
        }
        Err(e) => {
            tracing::warn!(input = raw, error = %e, "percent-decode produced invalid UTF-8, searching raw bytes");
            Cow::Borrowed(raw)
        }
    }
}

/// True when every `%` in `s` starts a valid two-hex-digit escape.
fn every_percent_escaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match (bytes.get(i + 1), bytes.get(i + 2)) {
                (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
