//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Remove Markdown code-fence artifacts wrapped around an oracle reply.
///
/// Handles ```` ```json ````, ```` ```plan ````, bare ```` ``` ```` fences and
/// stray trailing fences. Text without fences is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string (`json`, `plan`, ...) up to the first newline
        body = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    body = body.trim_end();
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Extract the outermost `{ ... }` span from text that mixes prose and JSON.
///
/// Returns `None` when there is no opening brace followed by a closing one.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_no_op_when_short() {
        assert_eq!(truncate_str("hi", 10), "hi");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        let s = "あのね"; // 9 bytes: 3+3+3
        assert_eq!(truncate_str(s, 4), "あ");
        assert_eq!(truncate_str(s, 6), "あの");
    }

    #[test]
    fn strip_json_fence() {
        let text = "```json\n{\"goal\": \"g\"}\n```";
        assert_eq!(strip_code_fences(text), "{\"goal\": \"g\"}");
    }

    #[test]
    fn strip_bare_fence_with_whitespace() {
        let text = "  \n```\n{\"a\": 1}\n```  \n";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn strip_single_line_fence() {
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn strip_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  not json "), "not json");
    }

    #[test]
    fn strip_trailing_fence_only() {
        assert_eq!(strip_code_fences("{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn extract_object_from_prose() {
        let text = "Sure! Here is the plan: {\"goal\": \"x\"} Hope that helps.";
        assert_eq!(extract_json_object(text), Some("{\"goal\": \"x\"}"));
    }

    #[test]
    fn extract_object_missing_braces() {
        assert_eq!(extract_json_object("not json"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
