//! Error types for the validator
//!
//! The coverage engine itself cannot fail. Everything here happens at the
//! process boundary: reading the input document, rejecting malformed rules
//! in strict mode, and writing the verdict.

use std::fmt;
use thiserror::Error;

/// Which rule set of the input a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSide {
    /// The requested rules (`userRules`).
    User,
    /// The reference rules (`referenceRules`).
    Reference,
}

impl RuleSide {
    /// The input field name of this side.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSide::User => "userRules",
            RuleSide::Reference => "referenceRules",
        }
    }
}

impl fmt::Display for RuleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why strict mode rejected a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Both resource-style and nonResourceURL fields are set.
    MixedStyles,
    /// Neither `resources` nor `nonResourceURLs` is set.
    NoTarget,
    /// `resources` is set but `apiGroups` is empty.
    NoApiGroups,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            MalformedReason::MixedStyles => "mixes resource fields with nonResourceURLs",
            MalformedReason::NoTarget => "names neither resources nor nonResourceURLs",
            MalformedReason::NoApiGroups => "names resources without any apiGroups",
        };
        f.write_str(message)
    }
}

/// Validator error types.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Input is not a valid validation document
    #[error("Error decoding input: {0}")]
    Decode(#[source] serde_json::Error),

    /// A rule was rejected by strict mode
    #[error("Malformed rule {side}[{index}]: {reason}")]
    MalformedRule {
        /// Rule set containing the rule.
        side: RuleSide,
        /// Position of the rule within its set.
        index: usize,
        /// What is wrong with it.
        reason: MalformedReason,
    },

    /// The verdict could not be serialized
    #[error("Error encoding output: {0}")]
    Encode(#[source] serde_json::Error),

    /// The verdict could not be written
    #[error("Error writing output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for validator operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

impl ValidatorError {
    /// Check if the error was caused by the caller's input.
    ///
    /// Input errors are reported inside the JSON verdict; output errors
    /// can only be reported on stderr.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ValidatorError::Decode(_) | ValidatorError::MalformedRule { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Get error code for structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidatorError::Decode(_) => "DECODE_ERROR",
            ValidatorError::MalformedRule { .. } => "MALFORMED_RULE",
            ValidatorError::Encode(_) => "ENCODE_ERROR",
            ValidatorError::Io(_) => "IO_ERROR",
        }
    }
}
