//! Trigger error types

use thiserror::Error;

/// Resolving the chart library failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The module import was rejected (network, syntax, CSP...)
    #[error("failed to import {url}: {reason}")]
    Import { url: String, reason: String },

    /// The module loaded but does not export a chart constructor
    #[error("module {url} does not export a chart constructor")]
    MissingExport { url: String },
}

/// Constructing a single chart failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("canvas {0} has no 2d context")]
    NoContext(&'static str),

    #[error("{chart} chart could not be constructed: {reason}")]
    Construct { chart: &'static str, reason: String },
}

/// Why a trigger run ended in the failed state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriggerError {
    /// No page region to watch
    #[error("no chart regions to watch")]
    NoTargets,

    #[error("chart library unavailable: {0}")]
    Load(#[from] LoadError),

    #[error("{failed} of {total} charts failed to render")]
    Render { failed: usize, total: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TriggerError::Load(LoadError::Import {
            url: "/static/js/vendor/chart.min.js".to_string(),
            reason: "TypeError: Failed to fetch".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "chart library unavailable: failed to import /static/js/vendor/chart.min.js: TypeError: Failed to fetch"
        );

        let err = TriggerError::Render { failed: 1, total: 2 };
        assert_eq!(err.to_string(), "1 of 2 charts failed to render");
    }
}
