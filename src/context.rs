//! Mutable context threaded through [`crate::process_queue`] calls instead of a module-level
//! global (`spec.md` §4.7, §9's design note on reentrancy).

/// Per-processing-pass context: carries the `hasForceUpdate` flag and nothing else.
///
/// A host owns one of these per reconciler instance and threads it through every
/// [`crate::process_queue`] call, rather than relying on a process-wide global — this is what
/// keeps the core reentrant across independent hosts running in the same process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessContext {
    has_force_update: bool,
}

impl ProcessContext {
    /// Create a fresh context with `hasForceUpdate` cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the `hasForceUpdate` flag. Call before processing a node.
    pub fn reset_has_force_update(&mut self) {
        self.has_force_update = false;
    }

    /// Read and clear the `hasForceUpdate` flag. Call immediately after processing a node.
    pub fn consume_has_force_update(&mut self) -> bool {
        std::mem::take(&mut self.has_force_update)
    }

    pub(crate) fn mark_force_update(&mut self) {
        self.has_force_update = true;
    }
}
