use super::Error;

/// Error when an aggregate path is navigated incorrectly.
///
/// This occurs when:
/// - The parent of a root path is requested
/// - A property is appended that the leaf entity does not own
/// - A path is extended through a non-entity leaf
/// - An id property is required where the entity declares none
///
/// These are mapping or programming errors and are surfaced immediately.
#[derive(Debug)]
pub(super) struct InvalidPath {
    message: Box<str>,
}

impl std::error::Error for InvalidPath {}

impl core::fmt::Display for InvalidPath {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid path: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid path error.
    pub fn invalid_path(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidPath(InvalidPath {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is, or wraps, an invalid path error.
    pub fn is_invalid_path(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidPath(_)))
    }
}
