//! Zone error types.

use thiserror::Error;

/// Zone error type.
///
/// `InvalidRadius` is a configuration error and fails construction. The other
/// variants are usage warnings: they are logged, the call has no effect, and the
/// zone keeps running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    /// Radius is negative or NaN.
    #[error("zone {zone:?}: radius must be a non-negative number, got {radius}")]
    InvalidRadius { zone: String, radius: f64 },

    /// Entity is neither a trackable body nor tracked as a camera.
    #[error("zone {zone:?}: {entity} is not a trackable body")]
    NotTrackable { zone: String, entity: String },

    /// Enter/exit subscription requested for an entity the zone does not track.
    #[error("zone {zone:?}: {entity} is not tracked")]
    NotTracked { zone: String, entity: String },

    /// Operation through a [`ZoneHandle`](crate::ZoneHandle) after teardown.
    #[error("zone {zone:?} has been destroyed")]
    Destroyed { zone: String },
}

/// Result type for zone operations.
pub type ZoneResult<T> = Result<T, ZoneError>;

/// Reject negative and NaN radii.
pub(crate) fn validate_radius(zone: &str, radius: f64) -> ZoneResult<()> {
    if radius.is_nan() || radius < 0.0 {
        return Err(ZoneError::InvalidRadius {
            zone: zone.to_owned(),
            radius,
        });
    }
    Ok(())
}
