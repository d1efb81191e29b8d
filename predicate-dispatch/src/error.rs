//! Errors raised while registering candidates or resolving a call.
//!
//! Declines are not errors: a candidate that does not apply returns
//! [`Outcome::Declined`](crate::Outcome::Declined) and resolution moves on.
//! Everything in [`DispatchError`] ends resolution and reaches the caller.

use thiserror::Error;

/// Errors that can occur during registration or dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Registration without a check on an implementation whose first
    /// parameter carries no annotation.
    #[error(
        "cannot register `{implementation}`: pass a check or annotate its first parameter"
    )]
    MissingCheck { implementation: String },

    /// A dispatcher was built with more than one fallback.
    #[error("dispatch takes at most 1 fallback implementation but {given} were given")]
    TooManyFallbacks { given: usize },

    /// No builder of the check compiler accepts the specification.
    #[error("no check builder accepts {spec}")]
    UnsupportedCheck { spec: String },

    /// The synthesized fallback was reached.
    #[error("valid implementation not found in `{dispatcher}` for a value of type {found}")]
    NoImplementation { dispatcher: String, found: String },

    /// A module path could not be loaded.
    #[error("no module named '{path}'")]
    ModuleNotFound { path: String },

    /// A loaded module does not define the requested class.
    #[error("module '{module}' has no attribute '{name}'")]
    AttributeNotFound { module: String, name: String },

    /// Failure raised by a user-supplied predicate or implementation.
    #[error(transparent)]
    Implementation(#[from] anyhow::Error),
}

impl DispatchError {
    /// Whether this error is raised at registration or construction time.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DispatchError::MissingCheck { .. }
                | DispatchError::TooManyFallbacks { .. }
                | DispatchError::UnsupportedCheck { .. }
        )
    }
}
