//! Helpers for digging JSON out of raw model text.
//!
//! Providers are asked for bare JSON but routinely wrap the payload in markdown
//! code fences or surround it with prose. `strip_code_fences` handles the fence
//! case; `find_json_slices` scans for balanced objects/arrays (string- and
//! escape-aware) so a payload embedded in chatter can still be recovered.

use tracing::debug;

/// Byte range of a balanced JSON structure within a larger text.
/// `end` is the inclusive index of the closing bracket or brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonSlice {
    pub start: usize,
    pub end: usize,
}

impl JsonSlice {
    pub fn of<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

/// Remove fenced code-block markers surrounding the payload, if any.
///
/// Handles ```json / ``` fences with or without a language tag; text that is not
/// fenced comes back trimmed but otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Find all top-level balanced JSON objects and arrays in the text.
///
/// The scanner tracks string and escape state so braces inside string literals do
/// not confuse it. Unbalanced closers are ignored.
pub fn find_json_slices(text: &str) -> Vec<JsonSlice> {
    let bytes = text.as_bytes();
    let mut results = Vec::new();
    let mut stack: Vec<(usize, u8)> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => stack.push((i, b)),
            b'}' | b']' => {
                let opener = if b == b'}' { b'{' } else { b'[' };
                match stack.pop() {
                    Some((start, kind)) if kind == opener => {
                        if stack.is_empty() {
                            results.push(JsonSlice { start, end: i });
                        }
                    }
                    other => {
                        // Mismatched or stray closer: restore any popped frame.
                        if let Some(frame) = other {
                            stack.push(frame);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    debug!(target: "dquest::json_text", count = results.len(), "found root structures");
    results
}

/// Extract the first value of `T` found in the text: direct parse first, then each
/// balanced structure in discovery order.
pub fn extract_first<T: serde::de::DeserializeOwned>(text: &str) -> Option<T> {
    if let Ok(v) = serde_json::from_str::<T>(text) {
        return Some(v);
    }
    for slice in find_json_slices(text) {
        if let Ok(v) = serde_json::from_str::<T>(slice.of(text)) {
            return Some(v);
        }
    }
    None
}
