use std::sync::LazyLock;

use regex::Regex;

/// Values copied from the sample `.env` that ships with the contact form.
///
/// The second alternative is already covered by the first; both are kept so
/// the pattern reads the same as the documented deployment template.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)your-email|smtp\.your-email-provider\.com")
        .expect("placeholder regex is valid")
});

/// Returns `true` if a configuration value should be treated as unset.
///
/// A value is unset when it is absent, empty, or still holds one of the
/// template placeholders (`your-email...`, `smtp.your-email-provider.com`).
/// Whitespace is significant: `" "` is a (broken) value, not a placeholder.
///
/// # Examples
///
/// ```
/// use formrelay_core::is_placeholder;
///
/// assert!(is_placeholder(None));
/// assert!(is_placeholder(Some("")));
/// assert!(is_placeholder(Some("you@your-email.com")));
/// assert!(!is_placeholder(Some("smtp.gmail.com")));
/// ```
pub fn is_placeholder(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_empty() || PLACEHOLDER_RE.is_match(v),
    }
}
