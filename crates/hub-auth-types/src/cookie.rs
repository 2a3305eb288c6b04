//! Session cookie carrying the access token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const HUB_ACCESS_TOKEN: &str = "hub_access_token";

/// Access-token lifetime in seconds (7 days). Also used as the cookie Max-Age.
pub const ACCESS_TOKEN_EXP: u64 = 604800;

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use hub_auth_types::cookie::{set_access_token_cookie, HUB_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(HUB_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((HUB_ACCESS_TOKEN, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(ACCESS_TOKEN_EXP as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Expire the access-token cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use hub_auth_types::cookie::{clear_access_token_cookie, set_access_token_cookie, HUB_ACCESS_TOKEN};
///
/// let jar = set_access_token_cookie(CookieJar::new(), "a".to_string(), "example.com".to_string());
/// let jar = clear_access_token_cookie(jar, "example.com".to_string());
/// assert_eq!(jar.get(HUB_ACCESS_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_access_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((HUB_ACCESS_TOKEN, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
