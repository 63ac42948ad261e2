//! Comment wrapping for rendered schema text

use super::render::RenderError;

/// Narrowest line length the wrapper accepts
pub const MIN_WRAP_WIDTH: usize = 3;

const COMMENT_PREFIX: &str = "# ";

/// Wrap a `# ` comment to `width` columns.
///
/// Breaks at the last space before the limit. A token longer than the limit
/// is never split: it stays whole on its own line and the break happens at
/// the next space after it. Every continuation line is re-prefixed with
/// `# `.
pub fn wrap_comment(comment: &str, width: usize) -> Result<Vec<String>, RenderError> {
    if width < MIN_WRAP_WIDTH {
        return Err(RenderError::WrapWidth {
            width: width as isize,
        });
    }
    if !comment.starts_with(COMMENT_PREFIX) {
        return Err(RenderError::NotAComment(comment.to_string()));
    }

    let mut lines = Vec::new();
    let mut remaining = comment.to_string();

    while remaining.len() >= width {
        let bytes = remaining.as_bytes();

        // Never break inside the prefix itself.
        let before = (2..width).rev().find(|&i| bytes[i] == b' ');
        let after = (width - 1..bytes.len()).find(|&i| bytes[i] == b' ');

        let split = match (before, after) {
            (Some(i), _) => i,
            (None, Some(i)) => i,
            (None, None) => break,
        };

        lines.push(remaining[..split].trim().to_string());
        remaining = format!("{}{}", COMMENT_PREFIX, &remaining[split + 1..]);
    }

    lines.push(remaining.trim().to_string());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "# namespaces <array>: namespaces is a list of namespace names. If defined, a constraint only applies to resources in a listed namespace.  Namespaces also supports a prefix-based glob.  For example, namespaces: [kube-*] matches both kube-system and kube-public.";

    #[test]
    fn test_short_comment_is_unchanged() {
        let lines = wrap_comment("# pizza foo bar", 1000).unwrap();
        assert_eq!(lines, vec!["# pizza foo bar"]);
    }

    #[test]
    fn test_long_comment_wraps_at_last_space() {
        let lines = wrap_comment(LONG, 80).unwrap();
        assert_eq!(
            lines,
            vec![
                "# namespaces <array>: namespaces is a list of namespace names. If defined, a",
                "# constraint only applies to resources in a listed namespace.  Namespaces also",
                "# supports a prefix-based glob.  For example, namespaces: [kube-*] matches both",
                "# kube-system and kube-public.",
            ]
        );
        assert!(lines.iter().all(|l| l.len() < 80));
    }

    #[test]
    fn test_overlong_token_keeps_its_own_line() {
        let url = "https://example.com/policy-library/docs/constraints/templates/a-very-long-path-segment-that-cannot-be-split";
        let comment = format!("# refs <string>: see {} for details", url);
        let lines = wrap_comment(&comment, 40).unwrap();
        assert_eq!(
            lines,
            vec![
                "# refs <string>: see".to_string(),
                format!("# {}", url),
                "# for details".to_string(),
            ]
        );
    }

    #[test]
    fn test_unbreakable_comment_is_returned_whole() {
        let comment = format!("# {}", "x".repeat(100));
        let lines = wrap_comment(&comment, 20).unwrap();
        assert_eq!(lines, vec![comment]);
    }

    #[test]
    fn test_pound_characters_inside_text_are_kept() {
        let comment = "# namespaces <array>: namespaces is a list of # namespace names. If #defined, a constraint only applies";
        let lines = wrap_comment(comment, 80).unwrap();
        assert_eq!(
            lines,
            vec![
                "# namespaces <array>: namespaces is a list of # namespace names. If #defined, a",
                "# constraint only applies",
            ]
        );
    }

    #[test]
    fn test_wrapped_words_reconstruct_the_original() {
        let comment = "# a single spaced sentence that keeps going well past the configured width of the column budget";
        let lines = wrap_comment(comment, 30).unwrap();
        let rebuilt = lines
            .iter()
            .map(|l| l.trim_start_matches("# "))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(format!("# {}", rebuilt), comment);
        assert!(lines.len() > 1);
    }

    #[test]
    fn test_width_below_minimum_is_rejected() {
        assert!(matches!(
            wrap_comment("# x", 2),
            Err(RenderError::WrapWidth { width: 2 })
        ));
        assert!(matches!(
            wrap_comment("# x", 0),
            Err(RenderError::WrapWidth { .. })
        ));
    }

    #[test]
    fn test_input_must_be_a_comment() {
        assert!(matches!(
            wrap_comment("plain text", 100),
            Err(RenderError::NotAComment(_))
        ));
    }
}
