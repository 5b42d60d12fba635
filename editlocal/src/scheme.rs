//! The editlocal:// URL scheme.

use anyhow::{Context, Result};

/// Prefix a dispatched URL must carry.
pub const SCHEME_PREFIX: &str = "editlocal://";

/// Strip the scheme prefix, or None when the argument is not an
/// editlocal URL.
pub fn strip_scheme(arg: &str) -> Option<&str> {
    arg.strip_prefix(SCHEME_PREFIX)
}

/// Percent-decode the path component of a dispatched URL.
pub fn decode(raw: &str) -> Result<String> {
    let decoded = urlencoding::decode(raw)
        .with_context(|| format!("URL argument is not valid UTF-8 once decoded: {}", raw))?;

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- strip_scheme ---

    #[test]
    fn strips_scheme_prefix() {
        assert_eq!(
            strip_scheme("editlocal://a%2Fb%2Fc.txt"),
            Some("a%2Fb%2Fc.txt")
        );
    }

    #[test]
    fn rejects_missing_prefix() {
        assert_eq!(strip_scheme("file:///tmp/notes.txt"), None);
        assert_eq!(strip_scheme("a/b/c.txt"), None);
        assert_eq!(strip_scheme(""), None);
    }

    #[test]
    fn prefix_match_is_exact() {
        assert_eq!(strip_scheme("EDITLOCAL://x"), None);
        assert_eq!(strip_scheme("editlocal:/x"), None);
    }

    // --- decode ---

    #[test]
    fn decodes_escaped_slashes() {
        assert_eq!(decode("a%2Fb%2Fc.txt").unwrap(), "a/b/c.txt");
    }

    #[test]
    fn decodes_spaces() {
        assert_eq!(decode("my%20notes.txt").unwrap(), "my notes.txt");
    }

    #[test]
    fn passes_through_plain_paths() {
        assert_eq!(decode("notes.txt").unwrap(), "notes.txt");
    }

    // --- dispatch shape ---

    #[test]
    fn url_is_decoded_before_invocation() {
        let raw = strip_scheme("editlocal://a%2Fb%2Fc.txt").unwrap();
        assert_eq!(decode(raw).unwrap(), "a/b/c.txt");
    }
}
