//! Arena-specific error types.
//!
//! The tick itself never fails: systems early-return on missing entities and
//! treat absent optional data as neutral.  Errors only surface at the edges of
//! the simulation, where configuration is loaded and validated and where the
//! outside world asks the arena to do something (apply an upgrade) that the
//! current state does not allow.
//!
//! ## Usage
//!
//! ```rust
//! use survivor_arena::error::{ArenaError, ArenaResult};
//!
//! fn pick(index: usize, offered: usize) -> ArenaResult<usize> {
//!     if index >= offered {
//!         return Err(ArenaError::UpgradeIndexOutOfRange { index, offered });
//!     }
//!     Ok(index)
//! }
//! # assert!(pick(3, 3).is_err());
//! ```

use std::fmt;

/// Top-level error enum for the arena simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaError {
    /// A configuration file exists but could not be read.
    ConfigRead {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// A configuration file was read but is not valid TOML for its schema.
    ConfigParse {
        path: String,
        message: String,
    },

    /// A tunable is outside its safe operating range.
    UnsafeTunable {
        /// Name of the tunable (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// The wave schedule has no entries, so the director has nothing to select.
    EmptyWaveSchedule,

    /// Wave entry `index` starts earlier than its predecessor or has a zero
    /// spawn interval.
    MalformedWave {
        index: usize,
        reason: &'static str,
    },

    /// A weapon key referenced by configuration is not in the registry.
    UnknownWeapon {
        key: String,
    },

    /// An upgrade was chosen while no level-up offer is pending.
    NotAwaitingUpgrade,

    /// The chosen offer index does not exist.
    UpgradeIndexOutOfRange {
        index: usize,
        offered: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::ConfigRead { path, message } => {
                write!(f, "failed to read '{}': {}", path, message)
            }
            ArenaError::ConfigParse { path, message } => {
                write!(f, "failed to parse '{}': {}", path, message)
            }
            ArenaError::UnsafeTunable {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "tunable '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            ArenaError::EmptyWaveSchedule => write!(f, "wave schedule has no entries"),
            ArenaError::MalformedWave { index, reason } => {
                write!(f, "wave entry #{} is malformed: {}", index, reason)
            }
            ArenaError::UnknownWeapon { key } => {
                write!(f, "weapon '{}' is not in the registry", key)
            }
            ArenaError::NotAwaitingUpgrade => {
                write!(f, "no level-up is pending; nothing to choose")
            }
            ArenaError::UpgradeIndexOutOfRange { index, offered } => write!(
                f,
                "upgrade index {} is out of range ({} offers available)",
                index, offered
            ),
        }
    }
}

impl std::error::Error for ArenaError {}

/// Convenience alias: a `Result` using `ArenaError` as the error type.
pub type ArenaResult<T> = Result<T, ArenaError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> ArenaResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArenaError::UnsafeTunable {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0.0, 1.0]`.
pub fn validate_fraction(name: &'static str, value: f32) -> ArenaResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ArenaError::UnsafeTunable {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

/// Returns an error if the experience threshold would shrink between levels.
///
/// A growth below 1.0 lets the threshold collapse toward zero, at which point
/// every pickup triggers a level-up.
pub fn validate_threshold_growth(value: f32) -> ArenaResult<()> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(ArenaError::UnsafeTunable {
            name: "xp_threshold_growth",
            value,
            safe_range: "[1.0, ∞)",
        })
    }
}
