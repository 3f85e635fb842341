use std::fmt;

pub const ACCESS_TOKEN_COOKIE: &str = "access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";

/// Session token pair carried in the `access-token` / `refresh-token` cookies.
///
/// Token values are opaque: nothing here looks inside them, only at whether
/// they are present. A cookie sent with an empty value still counts as present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    /// Collects the session cookies from one or more `Cookie` header values.
    pub fn from_cookie_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut credentials = Self::default();
        for header in headers {
            for pair in header.split(';') {
                if let Some((name, value)) = split_cookie_pair(pair) {
                    credentials.absorb(name, Some(value));
                }
            }
        }
        credentials
    }

    /// `Cookie` header value forwarded upstream, `None` when no token is held.
    pub fn cookie_header(&self) -> Option<String> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(token) = &self.access_token {
            pairs.push(format!("{}={}", ACCESS_TOKEN_COOKIE, token));
        }
        if let Some(token) = &self.refresh_token {
            pairs.push(format!("{}={}", REFRESH_TOKEN_COOKIE, token));
        }

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Returns a copy updated with the session cookies found in `Set-Cookie` values.
    ///
    /// An empty value is the backend clearing that cookie.
    pub fn rotated<'a, I>(&self, set_cookies: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut credentials = self.clone();
        for set_cookie in set_cookies {
            let name_value = set_cookie.split(';').next().unwrap_or_default();
            if let Some((name, value)) = split_cookie_pair(name_value) {
                credentials.absorb(name, Some(value).filter(|v| !v.is_empty()));
            }
        }
        credentials
    }

    fn absorb(&mut self, name: &str, value: Option<&str>) {
        let value = value.map(str::to_string);
        match name {
            ACCESS_TOKEN_COOKIE => self.access_token = value,
            REFRESH_TOKEN_COOKIE => self.refresh_token = value,
            _ => {}
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |token: &Option<String>| token.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Credentials")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .finish()
    }
}

fn split_cookie_pair(pair: &str) -> Option<(&str, &str)> {
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// Cookie name of a `Set-Cookie` value, for logging without the token itself.
pub fn set_cookie_name(set_cookie: &str) -> &str {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(name, _)| name.trim())
        .unwrap_or("<malformed>")
}
