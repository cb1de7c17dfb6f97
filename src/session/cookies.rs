// ABOUTME: Session cookie parsing and Set-Cookie construction
// ABOUTME: Cookies are HttpOnly with SameSite=Lax and optionally Secure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use axum::http::{header, HeaderMap, HeaderValue};

/// Attributes for one `Set-Cookie` header
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Lifetime in seconds; zero expires the cookie
    pub max_age_secs: u64,
    /// Only send over HTTPS
    pub secure: bool,
}

impl SessionCookieConfig {
    /// Cookie with the given lifetime, not marked `Secure`
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age_secs,
            secure: false,
        }
    }

    /// Set the `Secure` attribute
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Render the header value
    #[must_use]
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.name, self.value, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Append as a `Set-Cookie` header; values that are not valid header text are skipped
    pub fn append_to(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.build()) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

/// Read a cookie from the request `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` that tells the browser to drop the cookie
#[must_use]
pub fn expired_cookie(name: &str, secure: bool) -> SessionCookieConfig {
    SessionCookieConfig::new(name, "", 0).secure(secure)
}
