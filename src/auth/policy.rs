// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! URL-level authorization rules.
//!
//! An ordered [`RuleTable`] maps (path pattern, optional method) to an
//! [`Access`] requirement. The first matching rule decides; requests that
//! match nothing fall back to the table's default.
//!
//! ## Patterns
//!
//! Ant-style, matched segment by segment:
//!
//! - `**` matches zero or more whole segments
//! - `*` matches any run of characters inside one segment
//! - `?` matches exactly one character inside one segment

use axum::http::Method;

use super::{AuthenticatedUser, Role};

/// Access requirement of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No identity needed
    Public,
    /// Any valid identity
    Authenticated,
    /// An identity holding the role (or a role that implies it)
    Role(Role),
}

/// Outcome of evaluating a request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No identity attached where one is required
    Unauthenticated,
    /// Identity attached but lacking the required role
    Forbidden,
}

/// Compiled ant-style path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<String>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: split_path(pattern).map(str::to_string).collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();
        let pattern: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match_segments(&pattern, &path)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => {
            // Try consuming zero, one, two ... path segments.
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((head, rest)) => match path.split_first() {
            Some((segment, path_rest)) => {
                match_segment(head.as_bytes(), segment.as_bytes()) && match_segments(rest, path_rest)
            }
            None => false,
        },
    }
}

fn match_segment(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((b'*', rest)) => (0..=text.len()).any(|skip| match_segment(rest, &text[skip..])),
        Some((b'?', rest)) => !text.is_empty() && match_segment(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && match_segment(rest, &text[1..]),
    }
}

/// One entry of the table.
#[derive(Debug, Clone)]
pub struct Rule {
    patterns: Vec<PathPattern>,
    method: Option<Method>,
    access: Access,
}

impl Rule {
    /// Rule applying to every method.
    pub fn new(patterns: &[&str], access: Access) -> Self {
        Self {
            patterns: patterns.iter().map(|p| PathPattern::new(p)).collect(),
            method: None,
            access,
        }
    }

    /// Rule restricted to one HTTP method.
    pub fn for_method(method: Method, patterns: &[&str], access: Access) -> Self {
        Self {
            method: Some(method),
            ..Self::new(patterns, access)
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(required) = &self.method {
            if required != method {
                return false;
            }
        }
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Ordered authorization rules, first match wins.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    fallback: Access,
}

impl RuleTable {
    pub fn new(fallback: Access) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules for the polling service.
    pub fn polls_default() -> Self {
        Self::new(Access::Authenticated)
            .rule(Rule::new(
                &[
                    "/",
                    "/favicon.ico",
                    "/**/*.png",
                    "/**/*.gif",
                    "/**/*.svg",
                    "/**/*.jpg",
                    "/**/*.html",
                    "/**/*.css",
                    "/**/*.js",
                ],
                Access::Public,
            ))
            .rule(Rule::new(&["/api/auth/**"], Access::Public))
            .rule(Rule::new(
                &[
                    "/api/user/checkUsernameAvailability",
                    "/api/user/checkEmailAvailability",
                ],
                Access::Public,
            ))
            .rule(Rule::for_method(
                Method::GET,
                &["/api/polls/**", "/api/users/**"],
                Access::Public,
            ))
            .rule(Rule::new(
                &["/health", "/health/**", "/docs", "/docs/**", "/api-doc/**"],
                Access::Public,
            ))
            .rule(Rule::new(&["/api/admin/**"], Access::Role(Role::Admin)))
    }

    /// Requirement of the first matching rule, or the fallback.
    pub fn requirement(&self, method: &Method, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(Rule::access)
            .unwrap_or(self.fallback)
    }

    pub fn evaluate(&self, method: &Method, path: &str, user: Option<&AuthenticatedUser>) -> Decision {
        match (self.requirement(method, path), user) {
            (Access::Public, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Access::Authenticated, Some(_)) => Decision::Allow,
            (Access::Role(role), Some(user)) if user.has_role(role) => Decision::Allow,
            (Access::Role(_), Some(_)) => Decision::Forbidden,
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::polls_default()
    }
}
