use thiserror::Error;

/// Why the user's position could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation not supported")]
    Unsupported,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// Short text shown in place of the location label.
    pub fn label(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "Geolocation not supported",
            LocationError::PermissionDenied => "Location permission denied",
            LocationError::Timeout => "Location request timed out",
            LocationError::Unavailable(_) => "Location unavailable",
        }
    }
}

/// Failure of any HTTP call made against a weather or geocoding service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_labels_match_display_for_fixed_variants() {
        for err in [
            LocationError::Unsupported,
            LocationError::PermissionDenied,
            LocationError::Timeout,
        ] {
            assert_eq!(err.label(), err.to_string());
        }
    }

    #[test]
    fn unavailable_keeps_reason_in_display_only() {
        let err = LocationError::Unavailable("HTTP 429".into());
        assert_eq!(err.label(), "Location unavailable");
        assert!(err.to_string().contains("HTTP 429"));
    }

    #[test]
    fn status_error_mentions_code() {
        let err = FetchError::Status { status: 502, body: "bad gateway".into() };
        assert!(err.to_string().contains("502"));
    }
}
