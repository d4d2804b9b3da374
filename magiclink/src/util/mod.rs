//! Small shared helpers.

/// Longest prefix of `s` with at most `max_bytes` bytes that ends on a char
/// boundary. Used to keep logged payload previews short.
pub fn preview(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
