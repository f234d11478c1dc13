//! View identity and loading phase

/// Identity of the view instance a request was issued for
///
/// Every effect captures the session current when it was issued. Result
/// actions carry it back, and the reducer drops results whose session is no
/// longer current (the view was torn down and replaced in the meantime).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Session(u64);

impl Session {
    /// The session that replaces this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Generation counter, starting at 0
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Whether the collaborator has its first server answer yet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// A read is in flight (or none has been issued yet)
    #[default]
    Loading,
    /// The last read completed, successfully or not
    Ready,
}
