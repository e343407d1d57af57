// security/src/redirect.rs

use url::Url;
use url::form_urlencoded::byte_serialize;

/// Pages a user may be sent back to after login.
pub const ALLOWED_REDIRECT_PREFIXES: [&str; 3] = ["/feed", "/bookmarks", "/your-rides"];

pub const CAS_LOGIN_PATH: &str = "/api/auth/cas-login";
pub const CAS_VALIDATE_PATH: &str = "/api/auth/cas-validate";

/// Percent-encodes `value` for use inside a query string.
pub fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// `?redirect=<encoded>` for a non-empty redirect, otherwise empty.
pub fn redirect_query(redirect: Option<&str>) -> String {
    match redirect.filter(|r| !r.is_empty()) {
        Some(redirect) => format!("?redirect={}", encode_component(redirect)),
        None => String::new(),
    }
}

/// The CAS service URL; it must be identical at login and validation.
pub fn cas_service_url(base_url: &str, redirect: Option<&str>) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        CAS_VALIDATE_PATH,
        redirect_query(redirect)
    )
}

/// Where unauthenticated page requests for `intended` are sent.
pub fn login_redirect_path(intended: &str) -> String {
    format!("{}{}", CAS_LOGIN_PATH, redirect_query(Some(intended)))
}

fn is_allowed(path: &str) -> bool {
    let path_only = path.split(['?', '#']).next().unwrap_or_default();
    ALLOWED_REDIRECT_PREFIXES.iter().any(|prefix| {
        path_only == *prefix
            || path_only
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Resolves a post-login redirect against `base_url`. Anything that is not a
/// local path under an allowed page falls back to the feed.
pub fn resolve_safe_redirect(redirect: Option<&str>, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let fallback = format!("{}/feed", base);

    let Some(path) = redirect else {
        return fallback;
    };
    if !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
        return fallback;
    }
    if !is_allowed(path) {
        return fallback;
    }
    Url::parse(base)
        .and_then(|base| base.join(path))
        .map(String::from)
        .unwrap_or(fallback)
}
