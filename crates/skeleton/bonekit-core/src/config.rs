//! Runtime configuration for skeleton instances and the JSON loader.

use serde::{Deserialize, Serialize};

/// Per-skeleton configuration.
///
/// `y_down` replaces a process-wide axis convention: every skeleton carries its
/// own copy and passes it to each bone's world-transform update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen space grows downwards; negates the second row of every bone's
    /// world matrix (independent of the instance `flip_y` flag).
    pub y_down: bool,
    /// Uniform scale applied at load time to bone positions/lengths,
    /// attachment geometry and translate keyframes.
    pub scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            y_down: false,
            scale: 1.0,
        }
    }
}
