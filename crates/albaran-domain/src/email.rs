//! Email shape check.

/// Returns `true` when `email` has the `local@domain.tld` shape.
///
/// The local part and the domain must be non-empty and free of whitespace and
/// `@`. The domain must contain a dot with at least one character on each side.
/// No further RFC 5322 rules are applied.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || !is_plain_segment(local) || !is_plain_segment(domain) {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn is_plain_segment(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c == '@' || c.is_whitespace())
}
