use super::ConfigError;
use num_traits::Float;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Reject NaN and negative tolerances.
pub(crate) fn check_tolerance<F: Float>(arg: &'static str, value: F) -> Result<(), ConfigError> {
    if value.is_nan() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "tolerance must not be NaN",
        });
    }
    if value < F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "tolerance must be non-negative",
        });
    }
    Ok(())
}

/// Reject tolerances that are not finite and strictly positive.
pub(crate) fn check_positive_tolerance<F: Float>(
    arg: &'static str,
    value: F,
) -> Result<(), ConfigError> {
    check_tolerance(arg, value)?;
    if !value.is_finite() || value == F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "tolerance must be finite and > 0",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_positive_tolerance, check_tolerance, ConfigError, KernelLifecycle};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct ScaleConfig {
        digits: usize,
        tol: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct ScaleKernel {
        digits: usize,
    }

    impl KernelLifecycle for ScaleKernel {
        type Config = ScaleConfig;

        fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
            check_tolerance("tol", config.tol)?;
            Ok(Self {
                digits: config.digits,
            })
        }
    }

    #[test]
    fn lifecycle_constructor_accepts_valid_config() {
        let kernel = ScaleKernel::try_new(ScaleConfig {
            digits: 4,
            tol: 0.0,
        })
        .expect("valid config");
        assert_eq!(kernel.digits, 4);
    }

    #[test]
    fn lifecycle_constructor_rejects_nan_tolerance() {
        let err = ScaleKernel::try_new(ScaleConfig {
            digits: 4,
            tol: f64::NAN,
        })
        .expect_err("nan tolerance");
        assert_eq!(
            err,
            ConfigError::InvalidArgument {
                arg: "tol",
                reason: "tolerance must not be NaN",
            }
        );
    }

    #[test]
    fn positive_tolerance_rejects_zero_and_infinity() {
        assert!(check_positive_tolerance("lim", 1e-5f64).is_ok());
        assert!(check_positive_tolerance("lim", 0.0f64).is_err());
        assert!(check_positive_tolerance("lim", f64::INFINITY).is_err());
        assert!(check_positive_tolerance("lim", -1e-5f32).is_err());
    }
}
