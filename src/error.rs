use thiserror::Error;

/// Top-level error type for the glidepath motion engine.
#[derive(Debug, Error)]
pub enum MotionError {
    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors raised while fitting an easing curve to control points.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("insufficient data: need {required} distinct time values, got {distinct}")]
    InsufficientData { required: usize, distinct: usize },

    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    #[error("polynomial degree {degree} exceeds the maximum of {max}")]
    DegreeTooHigh { degree: usize, max: usize },

    #[error("invalid control points: {0}")]
    InvalidControlPoints(String),
}

/// Errors related to starting or addressing animations.
#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("animation duration must be positive, got {millis} ms")]
    InvalidDuration { millis: f64 },

    #[error("animation distance must be finite")]
    InvalidDistance,
}

/// Errors related to the tick thread.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to spawn tick thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("motion engine is not running")]
    Stopped,

    #[error("tick thread panicked")]
    TickThreadPanicked,
}

/// Errors related to loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience type alias for results using [`MotionError`].
pub type Result<T> = std::result::Result<T, MotionError>;
