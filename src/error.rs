use thiserror::Error;

/// Errors reported by mesh construction and mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A mesh mutation would break the planar subdivision, or an
    /// algorithm left the mesh in an inconsistent state.
    #[error("topology error: {0}")]
    Topology(String),

    /// The input lacks the general position an algorithm needs
    /// (e.g. all points collinear).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The input is malformed (too few points, zero-length or
    /// non-finite segments).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn topology<S: Into<String>>(msg: S) -> Self {
        Error::Topology(msg.into())
    }

    pub(crate) fn degenerate<S: Into<String>>(msg: S) -> Self {
        Error::DegenerateInput(msg.into())
    }

    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }
}
