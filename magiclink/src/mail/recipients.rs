//! Recipient-list normalization.
//!
//! Targets store their addresses as typed by the author, separated by `;`
//! or `,`. This is normalization only; address syntax is never checked.

/// Split an address list on `;` or `,`, trimming each piece and dropping
/// pieces that are empty.
pub fn split_recipients(email: &str) -> Vec<&str> {
    email
        .split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalize an address list to the comma-joined form used in mail URIs.
pub fn normalize_recipients(email: &str) -> String {
    split_recipients(email).join(",")
}

/// A target is a group when it resolves to more than one recipient.
pub fn is_group(email: &str) -> bool {
    split_recipients(email).len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mixed_separators() {
        assert_eq!(
            normalize_recipients(" a@x.com ; b@y.com,  c@z.com "),
            "a@x.com,b@y.com,c@z.com"
        );
    }

    #[test]
    fn test_normalize_drops_empty_pieces() {
        assert_eq!(normalize_recipients("a@x.com;; ,b@y.com;"), "a@x.com,b@y.com");
        assert_eq!(normalize_recipients("   "), "");
        assert_eq!(normalize_recipients(""), "");
    }

    #[test]
    fn test_normalize_passes_malformed_through() {
        assert_eq!(normalize_recipients("not an address ; @@"), "not an address,@@");
    }

    #[test]
    fn test_is_group() {
        assert!(!is_group("a@x.com"));
        assert!(is_group("a@x.com;b@y.com"));
        assert!(is_group("a@x.com, b@y.com"));
        assert!(!is_group("a@x.com;"));
        assert!(!is_group(""));
    }
}
