//! GitHub token discovery
//!
//! Providers are tried in a fixed order: the `GITHUB_TOKEN` environment
//! variable, then `gh auth token`, then no token at all. Each provider
//! swallows its own failures so a broken helper never blocks the next one.

#[cfg(test)]
use mockall::automock;

use std::process::Command;

use tracing::debug;

use crate::config::GITHUB_TOKEN_ENV;

/// Source of an optional bearer token
#[cfg_attr(test, automock)]
pub trait TokenProvider: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Returns a token, or `None` if this provider has nothing to offer
    fn resolve_token(&self) -> Option<String>;
}

/// Reads a token from an environment variable
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(GITHUB_TOKEN_ENV)
    }
}

impl TokenProvider for EnvTokenProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

/// Asks an authenticated GitHub CLI for its token (`gh auth token`)
pub struct GhCliTokenProvider {
    program: String,
}

impl GhCliTokenProvider {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for GhCliTokenProvider {
    fn default() -> Self {
        Self::new("gh")
    }
}

impl TokenProvider for GhCliTokenProvider {
    fn name(&self) -> &'static str {
        "gh CLI"
    }

    fn resolve_token(&self) -> Option<String> {
        let output = Command::new(&self.program)
            .args(["auth", "token"])
            .output()
            .inspect_err(|e| debug!("Could not run {} auth token: {}", self.program, e))
            .ok()?;

        if !output.status.success() {
            debug!(
                "{} is not authenticated: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!token.is_empty()).then_some(token)
    }
}

/// Tries each provider in order and returns the first token found
pub struct ChainTokenProvider {
    providers: Vec<Box<dyn TokenProvider>>,
}

impl ChainTokenProvider {
    pub fn new(providers: Vec<Box<dyn TokenProvider>>) -> Self {
        Self { providers }
    }
}

impl Default for ChainTokenProvider {
    fn default() -> Self {
        Self::new(vec![
            Box::new(EnvTokenProvider::default()),
            Box::new(GhCliTokenProvider::default()),
        ])
    }
}

impl TokenProvider for ChainTokenProvider {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn resolve_token(&self) -> Option<String> {
        for provider in &self.providers {
            if let Some(token) = provider.resolve_token() {
                debug!("Using GitHub token from {}", provider.name());
                return Some(token);
            }
        }
        debug!("No GitHub token found, using unauthenticated requests");
        None
    }
}
