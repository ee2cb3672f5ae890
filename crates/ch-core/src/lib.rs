//! Shared primitives used across Chromite crates.

use core::fmt;

/// Result alias used across the workspace.
pub type ChromeResult<T> = Result<T, ChromeError>;

/// Top-level error type for the chrome engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeError {
    pub code: &'static str,
    pub message: String,
}

impl ChromeError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ChromeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ChromeError {}

/// Viewport snapshot fed to viewport-sensitive controllers.
///
/// Only the width matters to the chrome rules; narrowness is decided against
/// the configured mobile breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
}

impl Viewport {
    pub fn new(width: u32) -> Self {
        Self { width }
    }

    pub fn is_narrow(self, breakpoint: u32) -> bool {
        self.width <= breakpoint
    }
}

/// Default mobile breakpoint in CSS pixels, matching the site stylesheets.
pub const MOBILE_BREAKPOINT: u32 = 720;
