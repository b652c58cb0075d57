//! Readiness markers and the patterns that fill them.

use regex::Regex;

/// Which endpoint a pattern announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Api,
    Module,
    Admin,
}

/// The three compiled readiness patterns.
#[derive(Debug, Clone)]
pub struct MarkerPatterns {
    patterns: [(Marker, Regex); 3],
}

impl MarkerPatterns {
    pub fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("readiness pattern is valid");
        Self {
            patterns: [
                (Marker::Api, compile(r"Starting API server at: (\S+)")),
                (
                    Marker::Module,
                    compile(r#"Starting module ".+" running at: (\S+)"#),
                ),
                (Marker::Admin, compile(r"Starting admin server at: (\S+)")),
            ],
        }
    }

    /// Test `line` against every pattern, recording new captures into `markers`.
    pub fn apply(&self, line: &str, markers: &mut ReadinessMarkers) {
        for (marker, pattern) in &self.patterns {
            if let Some(url) = pattern.captures(line).and_then(|caps| caps.get(1)) {
                markers.record(*marker, url.as_str());
            }
        }
    }
}

impl Default for MarkerPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Endpoint URLs found so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessMarkers {
    pub api: Option<String>,
    pub module: Option<String>,
    pub admin: Option<String>,
}

impl ReadinessMarkers {
    /// Store `url` for `marker` unless a value was already seen.
    pub fn record(&mut self, marker: Marker, url: &str) {
        let slot = match marker {
            Marker::Api => &mut self.api,
            Marker::Module => &mut self.module,
            Marker::Admin => &mut self.admin,
        };
        if slot.is_none() {
            *slot = Some(url.to_string());
        }
    }

    pub fn is_complete(&self) -> bool {
        self.api.is_some() && self.module.is_some() && self.admin.is_some()
    }
}

/// The three endpoints of a ready dev server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Endpoints {
    pub api_url: String,
    pub module_url: String,
    pub admin_url: String,
}
