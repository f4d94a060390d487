//! Error types

/// Errors raised while configuring the animation subsystem
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimateError {
    #[error("Expecting class selector starting with '.' got '{0}'")]
    NotClassSelector(String),

    #[error("Unknown animation event '{0}'")]
    UnknownEvent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Rejection value of an awaited runner that was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("animation was cancelled")]
pub struct AnimationCancelled;
