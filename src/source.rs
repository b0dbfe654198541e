//! Routine source preparation.
//!
//! A routine definition carries its Python body as captured source text,
//! which may still start with the registration decorator line (and any
//! decorators stacked below it). Before embedding the text into a stored
//! routine, the decorator span is removed and the remainder dedented to
//! column zero so it is valid at the top level of a PL/Python block.

/// Decorator marker stripped from plain-function sources.
pub const FUNCTION_MARKER: &str = "plfunction";

/// Decorator marker stripped from trigger-function sources.
pub const TRIGGER_MARKER: &str = "pltrigger";

/// Remove the span from `@name` up to (not including) the `def` line.
///
/// Returns the source unchanged when the marker is not present, so a
/// re-extraction after a previous strip is a no-op. Decorator lines that
/// precede the marker are kept verbatim.
pub fn strip_decorator(source: &str, name: &str) -> String {
    let marker = format!("@{}", name);
    let Some(start) = source.find(&marker) else {
        return source.to_string();
    };
    match source.find("def") {
        Some(end) => format!("{}{}", &source[..start], &source[end..]),
        None => source.to_string(),
    }
}

/// Remove the longest common leading whitespace from all non-blank lines.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - trimmed.len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => {
                let mut end = 0;
                for ((i, a), b) in current.char_indices().zip(indent.chars()) {
                    if a != b {
                        break;
                    }
                    end = i + a.len_utf8();
                }
                &current[..end]
            }
        });
    }

    let margin = margin.unwrap_or("");
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.trim_start().is_empty() {
            out.push_str(line.strip_prefix(margin).unwrap_or(line));
        }
        out.push('\n');
    }
    if !text.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Prepare a captured source block for embedding: strip the named
/// decorator, dedent to column zero, and drop trailing whitespace.
///
/// Idempotent: applying it twice yields the same text as applying it once.
pub fn extract_body(source: &str, decorator_name: &str) -> String {
    dedent(&strip_decorator(source, decorator_name))
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DECORATED: &str = "\
    @plfunction
    def pl_max(a, b):
        if a > b:
            return a
        return b";

    #[test]
    fn test_strip_removes_marker_span() {
        let stripped = strip_decorator(DECORATED, "plfunction");
        assert!(!stripped.contains("@plfunction"));
        assert!(stripped.contains("def pl_max"));
    }

    #[test]
    fn test_strip_without_marker_is_unchanged() {
        let source = "def pl_max(a, b):\n    return a";
        assert_eq!(strip_decorator(source, "plfunction"), source);
    }

    #[test]
    fn test_strip_keeps_preceding_decorators() {
        let source = "@wraps(f)\n@plfunction\ndef pl_max(a, b):\n    return a";
        let stripped = strip_decorator(source, "plfunction");
        assert!(stripped.starts_with("@wraps(f)\n"));
        assert!(!stripped.contains("@plfunction"));
    }

    #[test]
    fn test_dedent_to_column_zero() {
        let body = "    def f():\n        return 1\n";
        assert_eq!(dedent(body), "def f():\n    return 1\n");
    }

    #[test]
    fn test_dedent_ignores_blank_lines() {
        let body = "    def f():\n\n        return 1";
        assert_eq!(dedent(body), "def f():\n\n    return 1");
    }

    #[test]
    fn test_extract_body() {
        let body = extract_body(DECORATED, "plfunction");
        assert_eq!(body, "def pl_max(a, b):\n    if a > b:\n        return a\n    return b");
    }

    #[test]
    fn test_extract_body_is_idempotent() {
        let once = extract_body(DECORATED, "plfunction");
        let twice = extract_body(&once, "plfunction");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extract_only_strips_the_named_marker() {
        let source = "@pltrigger(event=\"INSERT\")\ndef pl_trigger(td, plpy):\n    pass";
        let body = extract_body(source, "plfunction");
        assert!(body.contains("@pltrigger"));
    }
}
