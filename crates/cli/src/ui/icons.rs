//! Status markers
//!
//! Plain ASCII so they survive terminals without extended fonts and
//! redirected output.

/// Marker strings
pub struct Icons;

impl Icons {
    pub const STATUS_SUCCESS: &'static str = "[OK]";
    pub const STATUS_WARNING: &'static str = "[!]";
    pub const STATUS_ERROR: &'static str = "[X]";
    pub const STATUS_INFO: &'static str = "[i]";
    pub const STATUS_HOOK: &'static str = "[*]";
}

/// Status icon type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Success,
    Warning,
    Error,
    Info,
    Hook,
}

impl StatusIcon {
    /// Marker text for this status
    #[must_use]
    pub fn get(self) -> &'static str {
        match self {
            Self::Success => Icons::STATUS_SUCCESS,
            Self::Warning => Icons::STATUS_WARNING,
            Self::Error => Icons::STATUS_ERROR,
            Self::Info => Icons::STATUS_INFO,
            Self::Hook => Icons::STATUS_HOOK,
        }
    }
}

impl std::fmt::Display for StatusIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.get())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_markers_are_ascii() {
        for icon in [
            StatusIcon::Success,
            StatusIcon::Warning,
            StatusIcon::Error,
            StatusIcon::Info,
            StatusIcon::Hook,
        ] {
            assert!(icon.get().is_ascii());
            assert_eq!(icon.to_string(), icon.get());
        }
    }
}
