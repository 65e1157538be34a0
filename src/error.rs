use simple_error::SimpleError;
use thiserror::Error;

/// Failures that abort the trace of a single ray.
///
/// Physical outcomes such as total internal reflection, an exhausted trace budget or a
/// traversal that ran out of steps are never errors; they resolve to a colour where they
/// happen. What ends up here is a surface or medium that was set up wrongly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("surface of \"{0}\" has no (u, v) parameterisation")]
    MissingParameterisation(String),
}

impl From<SimpleError> for TraceError {
    fn from(e: SimpleError) -> Self {
        TraceError::InvalidConfiguration(e.as_str().to_string())
    }
}

pub type TraceResult<T> = Result<T, TraceError>;

/// Shorthand for building an `InvalidConfiguration` error.
pub fn invalid<T>(msg: impl Into<String>) -> TraceResult<T> {
    Err(TraceError::InvalidConfiguration(msg.into()))
}

/// Reflection and transmission coefficients must lie in `[0, 1]`.
pub fn check_coefficient(coefficient: f64) -> TraceResult<f64> {
    if (0. ..=1.).contains(&coefficient) {
        Ok(coefficient)
    } else {
        invalid(format!("coefficient must lie in [0, 1], got {}", coefficient))
    }
}
