use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// An input container does not collapse to a single effective dimension.
    InvalidShape {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// Output/input lengths did not match required shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::InvalidShape { arg, reason } => {
                write!(f, "Invalid shape for `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            ConfigError::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Runtime execution invariant violations for checked kernel entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl ExecInvariantViolation {
    /// `true` when the violation comes from a malformed input shape.
    pub fn is_invalid_shape(&self) -> bool {
        matches!(self, Self::Config(ConfigError::InvalidShape { .. }))
    }
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn invalid_shape_display_and_source() {
        use std::error::Error as _;

        let err = ExecInvariantViolation::from(ConfigError::InvalidShape {
            arg: "f",
            reason: "frequency query must have one non-trivial dimension",
        });
        assert!(err.is_invalid_shape());
        assert_eq!(
            err.to_string(),
            "Invalid shape for `f`: frequency query must have one non-trivial dimension"
        );
        assert!(err.source().is_some());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn config_errors_name_their_argument() {
        let errs = [
            ConfigError::InvalidArgument {
                arg: "abstol",
                reason: "tolerance must not be NaN",
            },
            ConfigError::NonContiguous { arg: "x" },
            ConfigError::LengthMismatch {
                arg: "out",
                expected: 4,
                got: 3,
            },
        ];
        for (err, arg) in errs.iter().zip(["`abstol`", "`x`", "`out`"]) {
            let wrapped = ExecInvariantViolation::from(err.clone());
            assert!(alloc::format!("{wrapped}").contains(arg));
            assert!(!wrapped.is_invalid_shape());
        }
    }

    #[test]
    fn length_mismatch_is_not_a_shape_error() {
        let err = ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: 3,
            got: 2,
        };
        assert!(!err.is_invalid_shape());
    }
}
