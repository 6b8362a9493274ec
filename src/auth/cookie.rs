use http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, COOKIE};

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "jwt";

/// `Set-Cookie` value storing the refresh token: HTTP-only, same-site strict.
pub fn refresh_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{REFRESH_COOKIE}={token}; HttpOnly{secure}; SameSite=Strict; Path=/"
    ))
}

/// `Set-Cookie` value that makes the browser drop the refresh cookie.
pub fn expired_refresh_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "jwt=\"\"; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/",
    )
}

/// Value of the first cookie called `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_has_hardening_attributes() {
        let value = refresh_cookie("abc.def.ghi", true).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("jwt=abc.def.ghi;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Strict"));

        let insecure = refresh_cookie("t", false).unwrap();
        assert!(!insecure.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; jwt=token-1"));
        headers.append(COOKIE, HeaderValue::from_static("jwt=token-2"));
        assert_eq!(read_cookie(&headers, "jwt"), Some("token-1"));
        assert_eq!(read_cookie(&headers, "theme"), Some("dark"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn cleared_cookie_reads_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("jwt=\"\""));
        assert_eq!(read_cookie(&headers, "jwt"), None);
    }
}
