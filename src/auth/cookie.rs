//! Session cookie names, Cookie header parsing and Set-Cookie builders.

use axum::http::{HeaderMap, HeaderValue, header};

/// Cookie holding the short-lived access token.
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie holding the long-lived refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    // Browsers may send several Cookie headers over HTTP/2.
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            let part = part.trim();
            if let Some((key, value)) = part.split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// Like [`get_cookie`], but an empty value counts as absent.
/// A cookie cleared with `Max-Age=0` can linger as `name=` until the browser drops it.
pub fn get_session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    get_cookie(headers, name).filter(|v| !v.is_empty())
}

/// Set-Cookie value that deletes `name`.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        name, secure
    )
}

/// Append Set-Cookie headers deleting both session cookies.
pub fn clear_session_cookies(headers: &mut HeaderMap, secure: bool) {
    for name in [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME] {
        if let Ok(value) = HeaderValue::from_str(&clear_cookie(name, secure)) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}
