//! Error types for host primitives.

use thiserror::Error;

/// Errors raised by the audio context and protected member cells.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Sample rate was zero, negative, or not finite.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// A write was attempted on a member that is currently read-only.
    #[error("'{member}' is read-only")]
    ReadOnly {
        /// Name of the protected member.
        member: &'static str,
    },

    /// The member has already been taken and holds no value.
    #[error("'{member}' has been released")]
    Vacant {
        /// Name of the protected member.
        member: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_display_names_member() {
        let err = CoreError::ReadOnly {
            member: "oscillator",
        };
        assert_eq!(err.to_string(), "'oscillator' is read-only");
    }

    #[test]
    fn vacant_display_names_member() {
        let err = CoreError::Vacant { member: "envelope" };
        assert_eq!(err.to_string(), "'envelope' has been released");
    }

    #[test]
    fn invalid_sample_rate_display() {
        let err = CoreError::InvalidSampleRate(-1.0);
        assert_eq!(err.to_string(), "invalid sample rate: -1");
    }
}
