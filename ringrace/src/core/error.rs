use thiserror::Error;

/// ConfigError is returned when a race configuration is rejected at startup. Every variant is an
/// invalid-configuration error: a race built from such parameters never starts ticking.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: waypoint count must be at least 2 (got {0})")]
    WaypointCount(usize),

    #[error("invalid configuration: {name} rectangle must have a positive, finite size (got {w} x {h})")]
    DegenerateRect { name: &'static str, w: f64, h: f64 },

    #[error("invalid configuration: {name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f64 },

    #[error("invalid configuration: {name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("invalid configuration: {name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("invalid configuration: inner and outer track ellipses must share their center")]
    NotConcentric,

    #[error(
        "invalid configuration: inner radii ({inner_rx}, {inner_ry}) must be smaller than outer radii ({outer_rx}, {outer_ry})"
    )]
    InnerNotInsideOuter {
        inner_rx: f64,
        inner_ry: f64,
        outer_rx: f64,
        outer_ry: f64,
    },

    #[error("invalid configuration: could not parse color {value:?} of the {name}")]
    Color { name: &'static str, value: String },

    #[error("invalid configuration: waypoint index {index} is out of range for {len} waypoints")]
    WaypointIndex { index: usize, len: usize },
}

/// check_finite returns an error if `value` is NaN or infinite.
pub fn check_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

/// check_positive returns an error unless `value` is finite and strictly positive.
pub fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// check_non_negative returns an error unless `value` is finite and >= 0.
pub fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
