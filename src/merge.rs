//! The shallow-merge contract required by [`UpdateTag::UpdateState`](crate::UpdateTag::UpdateState)
//! and [`UpdateTag::CaptureUpdate`](crate::UpdateTag::CaptureUpdate).

use std::collections::BTreeMap;

/// A state type that knows how to shallow-merge a partial update over itself.
///
/// `ReplaceState` and `ForceUpdate` never call this — only `UpdateState` and `CaptureUpdate` do
/// (`spec.md` §4.5). The contract: fields present in `partial` override matching fields in
/// `self`; fields `self` has that `partial` doesn't, keep their value; field order is
/// irrelevant.
pub trait MergeState: Clone {
    /// Merge `partial` over `self`, returning the merged result.
    fn merge(self, partial: Self) -> Self;
}

/// A `BTreeMap` merges like a plain object: the partial's entries win, everything else in the
/// base is kept.
impl<K: Ord + Clone, V: Clone> MergeState for BTreeMap<K, V> {
    fn merge(self, partial: Self) -> Self {
        let mut merged = self;
        merged.extend(partial);
        merged
    }
}

/// A `String` has no fields to merge over, so a partial fully replaces the base — the same
/// degenerate case a scalar or opaque blob payload hits under `UpdateState`/`CaptureUpdate`.
impl MergeState for String {
    fn merge(self, partial: Self) -> Self {
        partial
    }
}
