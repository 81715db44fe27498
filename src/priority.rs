//! Scheduler-assigned priority ("expiration time") for update records.

use std::fmt;

/// An opaque, scheduler-assigned ordinal. Higher values mean higher priority.
///
/// The queue never computes these values itself — it only compares them. Expiration-time
/// computation is an external collaborator's job (`spec.md` §1, "Out of scope").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ExpirationTime(u64);

impl ExpirationTime {
    /// The sentinel value meaning "no remaining work".
    pub const NO_WORK: ExpirationTime = ExpirationTime(0);

    /// Create a priority from a raw ordinal. `0` is reserved for [`Self::NO_WORK`]; callers that
    /// pass `0` get a value that compares equal to it.
    pub const fn new(raw: u64) -> Self {
        ExpirationTime(raw)
    }

    /// The raw ordinal backing this priority.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this priority represents "no remaining work".
    pub const fn is_no_work(self) -> bool {
        self.0 == Self::NO_WORK.0
    }

    /// "Sufficient priority": `self >= render_priority`.
    pub const fn is_sufficient_for(self, render_priority: ExpirationTime) -> bool {
        self.0 >= render_priority.0
    }
}

impl fmt::Debug for ExpirationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_work() {
            write!(f, "ExpirationTime(NoWork)")
        } else {
            write!(f, "ExpirationTime({})", self.0)
        }
    }
}
