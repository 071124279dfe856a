// common/src/token.rs
//! Helpers for locating a Privy identity token in request metadata.

/// Cookie set by the Privy SDK on the app's origin
pub const PRIVY_TOKEN_COOKIE: &str = "privy-token";

const BEARER_PREFIX: &str = "Bearer ";

/// Token carried by an `Authorization` header value.
///
/// A leading `Bearer ` is stripped; any other value is used verbatim.
pub fn bearer_token(header_value: &str) -> Option<String> {
    let token = header_value.strip_prefix(BEARER_PREFIX).unwrap_or(header_value);
    non_empty(token)
}

/// Value of the named cookie within a `Cookie` header style string
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| non_empty(value))
}

/// Cookie token takes precedence over the header token
pub fn select_token(cookie_token: Option<String>, header_token: Option<String>) -> Option<String> {
    cookie_token
        .and_then(|token| non_empty(&token))
        .or_else(|| header_token.and_then(|token| non_empty(&token)))
}

/// Format a token as an `Authorization` header value
pub fn bearer_header(token: &str) -> String {
    format!("{}{}", BEARER_PREFIX, token)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_prefix_is_stripped() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc".to_string()));
    }

    #[test]
    fn test_header_without_prefix_is_used_verbatim() {
        assert_eq!(bearer_token("abc"), Some("abc".to_string()));
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[test]
    fn test_cookie_value_finds_privy_token() {
        let header = "theme=dark; privy-token=abc; other=1";
        assert_eq!(cookie_value(header, PRIVY_TOKEN_COOKIE), Some("abc".to_string()));
        assert_eq!(cookie_value("theme=dark", PRIVY_TOKEN_COOKIE), None);
        assert_eq!(cookie_value("privy-token=", PRIVY_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let selected = select_token(Some("abc".to_string()), Some("def".to_string()));
        assert_eq!(selected, Some("abc".to_string()));
    }

    #[test]
    fn test_empty_cookie_falls_back_to_header() {
        let selected = select_token(Some(String::new()), Some("def".to_string()));
        assert_eq!(selected, Some("def".to_string()));
        assert_eq!(select_token(None, None), None);
    }
}
