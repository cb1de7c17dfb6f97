// ABOUTME: Page controller deciding which view a request renders
// ABOUTME: Finite set of pages with an explicit transition table over authentication state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Page Controller
//!
//! Every `GET /?page=<id>` request resolves to exactly one [`Page`]:
//!
//! | auth state      | requested                 | rendered        |
//! |-----------------|---------------------------|-----------------|
//! | any             | absent                    | `login`         |
//! | anonymous       | `signup`                  | `signup`        |
//! | anonymous       | anything else             | `login`         |
//! | authenticated   | recognised identifier     | that page       |
//! | authenticated   | unrecognised identifier   | `app`           |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Views the service can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Login form
    Login,
    /// Account registration form
    Signup,
    /// Read-only profile
    Profile,
    /// Profile edit form
    EditProfile,
    /// Food image analysis
    #[serde(rename = "app")]
    Main,
}

/// Whether the session names a logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No user in the session
    Anonymous,
    /// Session carries a username
    Authenticated,
}

impl AuthState {
    /// Map a session flag to a state
    #[must_use]
    pub const fn from_flag(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

impl Page {
    /// All pages in navigation order
    pub const ALL: [Self; 5] = [
        Self::Login,
        Self::Signup,
        Self::Profile,
        Self::EditProfile,
        Self::Main,
    ];

    /// Identifier used in the `page` query parameter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Profile => "profile",
            Self::EditProfile => "edit_profile",
            Self::Main => "app",
        }
    }

    /// Look up a page by identifier (exact, case-sensitive)
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.as_str() == id)
    }

    /// Pages that need a logged-in session
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        matches!(self, Self::Profile | Self::EditProfile | Self::Main)
    }

    /// Select the page to render for a request
    #[must_use]
    pub fn resolve(requested: Option<&str>, auth: AuthState) -> Self {
        let Some(requested) = requested else {
            return Self::Login;
        };

        match (auth, Self::from_id(requested)) {
            (AuthState::Anonymous, Some(page)) if !page.requires_auth() => page,
            (AuthState::Anonymous, _) => Self::Login,
            (AuthState::Authenticated, Some(page)) => page,
            (AuthState::Authenticated, None) => Self::Main,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_page_defaults_to_login() {
        assert_eq!(Page::resolve(None, AuthState::Anonymous), Page::Login);
        assert_eq!(Page::resolve(None, AuthState::Authenticated), Page::Login);
    }

    #[test]
    fn test_anonymous_can_only_reach_login_and_signup() {
        assert_eq!(
            Page::resolve(Some("signup"), AuthState::Anonymous),
            Page::Signup
        );
        for requested in ["login", "profile", "edit_profile", "app", "bogus", ""] {
            assert_eq!(
                Page::resolve(Some(requested), AuthState::Anonymous),
                Page::Login,
                "requested {requested}"
            );
        }
    }

    #[test]
    fn test_authenticated_honours_known_pages() {
        for page in Page::ALL {
            assert_eq!(
                Page::resolve(Some(page.as_str()), AuthState::Authenticated),
                page
            );
        }
    }

    #[test]
    fn test_authenticated_unknown_page_goes_to_app() {
        assert_eq!(
            Page::resolve(Some("bogus"), AuthState::Authenticated),
            Page::Main
        );
        assert_eq!(
            Page::resolve(Some("Profile"), AuthState::Authenticated),
            Page::Main
        );
    }

    #[test]
    fn test_identifiers_serialize_like_query_values() {
        assert_eq!(
            serde_json::to_string(&Page::EditProfile).unwrap(),
            "\"edit_profile\""
        );
        assert_eq!(serde_json::to_string(&Page::Main).unwrap(), "\"app\"");
        assert!(Page::requires_auth(Page::Main));
        assert!(!Page::requires_auth(Page::Signup));
    }
}
