use std::fmt;

/// Main error type for the Starling membership protocol
#[derive(Debug)]
pub enum StarlingError {
    /// Configuration errors (invalid timeout windows, zero fanout, ...)
    Config(String),

    /// Decode-time structural mismatch: the byte buffer does not hold a
    /// whole message. The offending message is dropped, never retried.
    MalformedMessage(String),

    /// Decode succeeded structurally but the type tag is not recognized.
    UnknownMessageType(u32),

    /// Transport layer errors
    Transport(String),
}

impl fmt::Display for StarlingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarlingError::Config(msg) => write!(f, "Configuration error: {}", msg),
            StarlingError::MalformedMessage(msg) => write!(f, "Malformed message: {}", msg),
            StarlingError::UnknownMessageType(tag) => {
                write!(f, "Unknown message type tag: {}", tag)
            }
            StarlingError::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for StarlingError {}

// Convenient type alias for Results using our error type
pub type Result<T> = std::result::Result<T, StarlingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = StarlingError::Config("t_remove must be >= t_fail".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: t_remove must be >= t_fail"
        );

        let tag_err = StarlingError::UnknownMessageType(9);
        assert_eq!(tag_err.to_string(), "Unknown message type tag: 9");
    }
}
