use thiserror::Error;

/// Authorization-boundary failure.
///
/// Messages are deliberately information-free: `Forbidden` must not reveal
/// whether the denied resource exists, nor in which tenant. Decision detail
/// belongs in `tracing` output, not in the error value handed to the
/// boundary.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Credential missing, malformed, or unresolvable. No partial principal
    /// is ever returned alongside this.
    #[error("unauthenticated")]
    Unauthenticated,

    /// A resolved principal was denied the requested action.
    #[error("forbidden")]
    Forbidden,
}
