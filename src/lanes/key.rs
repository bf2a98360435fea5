//! # Lane identity.
//!
//! Lanes are keyed either by a caller-defined session (the per-session
//! serialization used for agent turns) or by an explicit name (`"build"`,
//! `"llm"`, ...). Both live in one registry; the key kind only selects the
//! default config a lazily created lane receives.

use std::fmt;
use std::sync::Arc;

/// Registry key of a lane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneKey {
    /// Session-scoped lane (one per external session id).
    Session(Arc<str>),
    /// Explicitly named lane.
    Named(Arc<str>),
}

impl LaneKey {
    /// Name of the lane used when callers don't pick one.
    pub const DEFAULT: &'static str = "default";

    pub fn session(id: impl Into<Arc<str>>) -> Self {
        LaneKey::Session(id.into())
    }

    pub fn named(name: impl Into<Arc<str>>) -> Self {
        LaneKey::Named(name.into())
    }

    /// Raw id or name, without the kind prefix.
    pub fn as_str(&self) -> &str {
        match self {
            LaneKey::Session(s) | LaneKey::Named(s) => s,
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, LaneKey::Session(_))
    }
}

impl Default for LaneKey {
    fn default() -> Self {
        LaneKey::named(Self::DEFAULT)
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKey::Session(id) => write!(f, "session:{id}"),
            LaneKey::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for LaneKey {
    fn from(name: &str) -> Self {
        LaneKey::named(name)
    }
}

impl From<String> for LaneKey {
    fn from(name: String) -> Self {
        LaneKey::named(name)
    }
}

impl From<&LaneKey> for LaneKey {
    fn from(key: &LaneKey) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_and_named_never_collide() {
        assert_ne!(LaneKey::session("abc"), LaneKey::named("abc"));
        assert_eq!(LaneKey::session("abc").as_str(), "abc");
    }

    #[test]
    fn test_display() {
        assert_eq!(LaneKey::session("s1").to_string(), "session:s1");
        assert_eq!(LaneKey::from("build").to_string(), "build");
        assert_eq!(LaneKey::default().to_string(), "default");
    }
}
