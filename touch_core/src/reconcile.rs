//! Active-set reconciliation.
//!
//! Each frame the set of hit regions is rebuilt from scratch and compared
//! with the previous frame's set.  Regions that dropped out are reported so
//! their "active" flag can be cleared; the new set then replaces the old
//! one wholesale.

use std::collections::BTreeSet;
use std::iter::FromIterator;

use crate::RegionId;

// ════════════════════════════════════════════════════════════════════════════
// ActiveSet
// ════════════════════════════════════════════════════════════════════════════

/// Set of region ids currently considered hit.  Ordered for stable output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveSet(BTreeSet<RegionId>);

impl ActiveSet {
    pub fn new() -> Self { ActiveSet::default() }

    pub fn contains(&self, id: RegionId) -> bool { self.0.contains(&id) }
    pub fn insert(&mut self, id: RegionId) -> bool { self.0.insert(id) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.0.iter().copied()
    }

    /// Ids in `self` but not in `other`.
    pub fn difference(&self, other: &ActiveSet) -> Vec<RegionId> {
        self.0.difference(&other.0).copied().collect()
    }
}

impl FromIterator<RegionId> for ActiveSet {
    fn from_iter<I: IntoIterator<Item = RegionId>>(iter: I) -> Self {
        ActiveSet(iter.into_iter().collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// reconcile
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one frame's reconciliation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    /// The set to carry into the next frame.
    pub active:      ActiveSet,
    /// Hit now, not hit last frame.
    pub activated:   Vec<RegionId>,
    /// Hit last frame, not hit now; their flags must be cleared.
    pub deactivated: Vec<RegionId>,
}

/// Diff `hits` against `previous`.
pub fn reconcile(previous: &ActiveSet, hits: ActiveSet) -> Reconciliation {
    let deactivated = previous.difference(&hits);
    let activated   = hits.difference(previous);
    Reconciliation { active: hits, activated, deactivated }
}

/// Owns the active set between frames.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    active: ActiveSet,
}

impl Reconciler {
    pub fn new() -> Self { Reconciler::default() }

    /// Last frame's set, used for leading-edge checks before reconciling.
    pub fn active(&self) -> &ActiveSet { &self.active }

    pub fn is_active(&self, id: RegionId) -> bool { self.active.contains(id) }

    /// Reconcile and replace the owned set with `hits`.
    pub fn reconcile(&mut self, hits: ActiveSet) -> Reconciliation {
        let outcome = reconcile(&self.active, hits);
        self.active = outcome.active.clone();
        outcome
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[usize]) -> ActiveSet {
        ids.iter().map(|&i| RegionId(i)).collect()
    }

    #[test]
    fn diff_reports_both_directions() {
        let r = reconcile(&set(&[1, 2, 3]), set(&[2, 4]));
        assert_eq!(r.deactivated, vec![RegionId(1), RegionId(3)]);
        assert_eq!(r.activated,   vec![RegionId(4)]);
        assert_eq!(r.active, set(&[2, 4]));
    }

    #[test]
    fn empty_frame_deactivates_everything() {
        let r = reconcile(&set(&[5, 6]), ActiveSet::new());
        assert_eq!(r.deactivated, vec![RegionId(5), RegionId(6)]);
        assert!(r.active.is_empty());
    }

    #[test]
    fn reconciler_replaces_set() {
        let mut rec = Reconciler::new();
        rec.reconcile(set(&[1, 2]));
        assert!(rec.is_active(RegionId(1)));
        let out = rec.reconcile(set(&[3]));
        assert_eq!(out.deactivated, vec![RegionId(1), RegionId(2)]);
        assert_eq!(rec.active(), &set(&[3]));
    }

    #[test]
    fn duplicate_hits_collapse() {
        let hits: ActiveSet = vec![RegionId(9), RegionId(9), RegionId(9)].into_iter().collect();
        assert_eq!(hits.len(), 1);
    }
}
