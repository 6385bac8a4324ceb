//! Text normalization shared by every matching stage.

/// Lowercases `text`, replaces every character that is neither an ASCII word
/// character (`[A-Za-z0-9_]`) nor whitespace with a space, collapses whitespace
/// runs to a single space and trims the result.
///
/// Total and idempotent: `None` normalizes to `""`, and
/// `normalize(normalize(x).as_str()) == normalize(x)`.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            // punctuation and whitespace both collapse into one separator
            pending_space = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_missing_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(None::<&str>), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize("   \t\n "), "");
        assert_eq!(normalize("!?.,;"), "");
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("I know Python, and Git!"), "i know python and git");
        assert_eq!(normalize("Node.js/React"), "node js react");
        assert_eq!(normalize("snake_case stays"), "snake_case stays");
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(normalize("  Data\t\tStructures \n and   Algorithms  "), "data structures and algorithms");
    }

    #[test]
    fn test_non_ascii_letters_become_separators() {
        assert_eq!(normalize("café résumé"), "caf r sum");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "Hello, World!",
            "C++ / C# developer -- 5 yrs",
            "  EDUCATION\nB.Tech (CSE), 2021 ",
            "Kelvin \u{212A} sign and ＦＵＬＬ width",
            "tabs\tand\u{00A0}nbsp",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(once.as_str()), once, "not idempotent for {s:?}");
        }
    }
}
