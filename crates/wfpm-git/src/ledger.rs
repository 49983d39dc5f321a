//! Released and in-development package versions derived from git refs

use std::collections::{BTreeMap, BTreeSet};

use wfpm_package::version::sort_descending;

use crate::parse::{parse_package_branch, parse_release_tag};

/// Package versions known to the repository.
///
/// - `releases`: package name to released versions, newest first, from tags
///   `name.vVERSION` / `name.VERSION`
/// - `release_candidates`: package name to versions with a `name@version`
///   branch (local or remote) that are not yet released, newest first
///
/// Packages without any unreleased branch have no candidate entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitLedger {
    releases: BTreeMap<String, Vec<String>>,
    release_candidates: BTreeMap<String, Vec<String>>,
}

impl GitLedger {
    /// Build the ledger from tag names and branch names.
    pub fn from_refs<'a, T, B>(tags: T, branches: B) -> Self
    where
        T: IntoIterator<Item = &'a str>,
        B: IntoIterator<Item = &'a str>,
    {
        let mut released: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for tag in tags {
            match parse_release_tag(tag) {
                Some((name, version)) => {
                    released.entry(name).or_default().insert(version);
                }
                None => tracing::debug!(tag, "Ignoring non-release tag"),
            }
        }

        let mut branched: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for branch in branches {
            if let Some((name, version)) = parse_package_branch(branch) {
                branched.entry(name).or_default().insert(version);
            }
        }

        let mut release_candidates = BTreeMap::new();
        for (name, versions) in branched {
            let unreleased: Vec<String> = match released.get(&name) {
                Some(done) => versions.difference(done).cloned().collect(),
                None => versions.into_iter().collect(),
            };
            if !unreleased.is_empty() {
                release_candidates.insert(name, sort_descending(unreleased));
            }
        }

        let releases = released
            .into_iter()
            .map(|(name, versions)| (name, sort_descending(versions)))
            .collect();

        Self {
            releases,
            release_candidates,
        }
    }

    pub fn releases(&self) -> &BTreeMap<String, Vec<String>> {
        &self.releases
    }

    pub fn release_candidates(&self) -> &BTreeMap<String, Vec<String>> {
        &self.release_candidates
    }

    pub fn is_released(&self, name: &str, version: &str) -> bool {
        self.releases
            .get(name)
            .is_some_and(|v| v.iter().any(|x| x == version))
    }

    pub fn is_candidate(&self, name: &str, version: &str) -> bool {
        self.release_candidates
            .get(name)
            .is_some_and(|v| v.iter().any(|x| x == version))
    }

    /// Candidate versions of one package, newest first.
    pub fn candidates_of(&self, name: &str) -> &[String] {
        self.release_candidates
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every candidate as `name@version`.
    pub fn candidate_fullnames(&self) -> Vec<String> {
        fullnames(&self.release_candidates)
    }

    /// Every release as `name@version`.
    pub fn released_fullnames(&self) -> Vec<String> {
        fullnames(&self.releases)
    }
}

fn fullnames(map: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    map.iter()
        .flat_map(|(name, versions)| versions.iter().map(move |v| format!("{name}@{v}")))
        .collect()
}
