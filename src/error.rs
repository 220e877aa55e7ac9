// src/error.rs
//
// Error type for the passlearn core.
//
// The numeric core has no fatal paths; errors only come from the
// configuration boundary (validation, name parsing) and from worker pool
// construction.

/// Errors raised at the configuration boundary of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    ValidationError { field: String, message: String },
    UnknownNoiseMode { value: String },
    UnknownPreferenceModel { value: String },
    ThreadPool { message: String },
}

impl SimError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        SimError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::ValidationError { field, message } => {
                write!(f, "Config validation error in '{}': {}", field, message)
            }
            SimError::UnknownNoiseMode { value } => {
                write!(
                    f,
                    "Unknown noise mode '{}'. Expected: constant | bucket | random",
                    value
                )
            }
            SimError::UnknownPreferenceModel { value } => {
                write!(
                    f,
                    "Unknown preference model '{}'. Expected: 1 | 2 | 3 (or high-angle-long | mid-angle-mid | high-angle-short)",
                    value
                )
            }
            SimError::ThreadPool { message } => {
                write!(f, "Failed to build worker pool: {}", message)
            }
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_field() {
        let err = SimError::validation("num_epochs", "must be >= 1");
        assert_eq!(
            err.to_string(),
            "Config validation error in 'num_epochs': must be >= 1"
        );
    }

    #[test]
    fn unknown_noise_mode_lists_choices() {
        let err = SimError::UnknownNoiseMode {
            value: "loud".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'loud'"));
        assert!(msg.contains("constant | bucket | random"));
    }
}
