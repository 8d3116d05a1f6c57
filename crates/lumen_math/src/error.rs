use thiserror::Error;

/// Errors raised by degenerate geometry.
///
/// These are reported where the degenerate value is used, not where it is
/// built: a singular matrix is a perfectly valid value until somebody asks
/// for its inverse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("cannot normalize a zero-length vector")]
    ZeroLength,

    #[error("matrix is singular and has no inverse")]
    SingularMatrix,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type MathResult<T> = Result<T, MathError>;
