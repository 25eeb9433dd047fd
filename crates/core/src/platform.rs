//! Platform limits for hook execution
//!
//! Exposes the command line budget used when splitting long file lists
//! into several hook invocations. Detected once on first access.

use std::sync::LazyLock;

/// Current platform information (cached)
///
/// # Example
/// ```
/// use hookline_core::platform::CURRENT_PLATFORM;
///
/// assert!(CURRENT_PLATFORM.max_command_length > 0);
/// ```
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(Platform::detect);

/// Bytes reserved for the environment and argv pointers
const COMMAND_LENGTH_HEADROOM: usize = 2048;

/// Platform information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Maximum length in bytes of a single command line we are willing to build
    pub max_command_length: usize,
}

impl Platform {
    /// Detect the platform the binary runs on
    #[must_use]
    pub fn detect() -> Self {
        Self {
            max_command_length: Self::detect_max_command_length(),
        }
    }

    const fn detect_max_command_length() -> usize {
        // CreateProcess caps the command line at 32767 UTF-16 units
        #[cfg(windows)]
        {
            (1 << 15) - COMMAND_LENGTH_HEADROOM
        }

        #[cfg(not(windows))]
        {
            (1 << 17) - COMMAND_LENGTH_HEADROOM
        }
    }
}
