//! Membership differ.
//!
//! Memberships are compared as sets of email addresses. `BTreeSet` keeps
//! batches in a stable order so requests are reproducible.

use std::collections::BTreeSet;

use groupsync_connector::operation::AttributeSet;

/// Add/remove sets turning a current membership into a desired one.
///
/// `to_add` never intersects the current members, `to_remove` is a subset of
/// them, and `(current - to_remove) + to_add == desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl MembershipDiff {
    /// Compute `desired - current` and `current - desired`.
    #[must_use]
    pub fn compute(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Self {
        Self {
            to_add: desired.difference(current).cloned().collect(),
            to_remove: current.difference(desired).cloned().collect(),
        }
    }

    /// Diff against an optional desired state; `None` means "unchanged".
    #[must_use]
    pub fn against(current: &BTreeSet<String>, desired: Option<&BTreeSet<String>>) -> Self {
        desired.map_or_else(Self::default, |desired| Self::compute(current, desired))
    }

    /// Whether no membership change is needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply the diff to `current`.
    #[must_use]
    pub fn apply_to(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        current
            .difference(&self.to_remove)
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }
}

/// Read the desired members from a change request.
///
/// Returns `None` when the attribute is absent or null (leave members
/// unchanged) and an empty set when it is an empty list (remove every
/// member). Blank values are ignored.
#[must_use]
pub fn desired_members(attributes: &AttributeSet, key: &str) -> Option<BTreeSet<String>> {
    attributes.get_strings(key).map(|values| {
        values
            .into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
}
