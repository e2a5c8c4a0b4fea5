/// Truncate a string to at most `limit` characters.
///
/// Counts characters, not bytes, so multi-byte text never splits inside a
/// code point. The result is always a prefix of the input.
pub fn truncate_chars(input: &str, limit: usize) -> String {
    input.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_shorter_than_limit() {
        assert_eq!(truncate_chars("short", 160), "short");
    }

    #[test]
    fn test_truncate_exact_limit() {
        let input = "a".repeat(200);
        let truncated = truncate_chars(&input, 160);
        assert_eq!(truncated.chars().count(), 160);
        assert!(input.starts_with(&truncated));
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let input = "é".repeat(10);
        let truncated = truncate_chars(&input, 4);
        assert_eq!(truncated, "éééé");
    }
}
