//! Route pattern compilation.
//!
//! `{name}` placeholders become named groups of one or more ASCII digits; the
//! rest of the pattern matches literally. Compiled matchers are anchored at
//! both ends.

use crate::error::ConfigError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-zA-Z_]+)\}").expect("placeholder regex");
}

#[derive(Clone, Debug)]
pub struct RoutePattern {
    source: String,
    /// `None` for literal patterns.
    matcher: Option<Regex>,
    names: Vec<String>,
}

impl RoutePattern {
    pub fn compile(source: &str) -> Result<Self, ConfigError> {
        let mut names = Vec::new();
        let mut re = String::from("^");
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else { continue };
            re.push_str(&regex::escape(&source[last..whole.start()]));
            re.push_str(&format!("(?P<{}>[0-9]+)", name.as_str()));
            names.push(name.as_str().to_string());
            last = whole.end();
        }
        if names.is_empty() {
            return Ok(RoutePattern {
                source: source.to_string(),
                matcher: None,
                names,
            });
        }
        re.push_str(&regex::escape(&source[last..]));
        re.push('$');
        let matcher = Regex::new(&re).map_err(|e| ConfigError::InvalidRoute {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(RoutePattern {
            source: source.to_string(),
            matcher: Some(matcher),
            names,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_literal(&self) -> bool {
        self.matcher.is_none()
    }

    /// Placeholder names in pattern order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Named captures when the whole path matches. Literal patterns never match here.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.matcher.as_ref()?.captures(path)?;
        Some(
            self.names
                .iter()
                .filter_map(|n| caps.name(n).map(|m| (n.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}
