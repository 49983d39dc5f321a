//! Dependency graph between package versions and its install order.
//!
//! Edges point from dependent to dependency: if A declares B, the edge is
//! `A -> B`. [`DependencyGraph::topological_order`] returns dependencies
//! before their dependents, so installing in that order never installs a
//! package before something it needs.
//!
//! # Example
//!
//! ```
//! use wfpm_core::DependencyGraph;
//! use wfpm_package::PackageUri;
//!
//! let root: PackageUri = "github.com/acct/repo/app@1.0.0".parse().unwrap();
//! let b: PackageUri = "github.com/acct/repo/b@1.0.0".parse().unwrap();
//! let c: PackageUri = "github.com/acct/repo/c@1.0.0".parse().unwrap();
//!
//! let mut graph = DependencyGraph::new(root.clone());
//! graph.add_edge(&root, &b).unwrap();
//! graph.add_edge(&b, &c).unwrap();
//!
//! assert_eq!(graph.install_plan().unwrap(), vec![c, b]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use wfpm_package::PackageUri;

use crate::{Error, Result};

/// Directed graph over package identities, rooted at the package whose
/// dependencies are being installed.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    root: PackageUri,
    /// Adjacency list: key depends on each value.
    edges: BTreeMap<PackageUri, BTreeSet<PackageUri>>,
}

impl DependencyGraph {
    pub fn new(root: PackageUri) -> Self {
        let mut edges = BTreeMap::new();
        edges.insert(root.clone(), BTreeSet::new());
        Self { root, edges }
    }

    pub fn root(&self) -> &PackageUri {
        &self.root
    }

    /// Declare that `from` depends on `to`, adding either node if missing.
    ///
    /// # Errors
    ///
    /// [`Error::SelfDependency`] if `from == to`.
    pub fn add_edge(&mut self, from: &PackageUri, to: &PackageUri) -> Result<()> {
        if from == to {
            return Err(Error::SelfDependency {
                package: from.to_string(),
            });
        }
        self.edges.entry(to.clone()).or_default();
        self.edges.entry(from.clone()).or_default().insert(to.clone());
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    fn dependencies_of(&self, uri: &PackageUri) -> impl Iterator<Item = &PackageUri> {
        self.edges.get(uri).into_iter().flatten()
    }

    /// All nodes, dependencies first, using Kahn's algorithm. Ties are broken
    /// by URI order so the result does not depend on insertion order.
    ///
    /// # Errors
    ///
    /// [`Error::DependencyCycle`] naming the packages on the cycle.
    pub fn topological_order(&self) -> Result<Vec<PackageUri>> {
        let mut pending: BTreeMap<&PackageUri, usize> = self
            .edges
            .iter()
            .map(|(node, deps)| (node, deps.len()))
            .collect();

        let mut dependents: BTreeMap<&PackageUri, Vec<&PackageUri>> = BTreeMap::new();
        for (from, deps) in &self.edges {
            for to in deps {
                dependents.entry(to).or_default().push(from);
            }
        }

        let mut ready: BTreeSet<&PackageUri> = pending
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&node, _)| node)
            .collect();

        let mut order = Vec::with_capacity(self.edges.len());
        while let Some(current) = ready.pop_first() {
            order.push(current.clone());
            pending.remove(current);

            for &dependent in dependents.get(current).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if !pending.is_empty() {
            let stuck: BTreeSet<&PackageUri> = pending.keys().copied().collect();
            return Err(Error::DependencyCycle {
                participants: self.cycle_members(stuck),
            });
        }

        Ok(order)
    }

    /// Dependencies in install order, without the root.
    pub fn install_plan(&self) -> Result<Vec<PackageUri>> {
        let mut order = self.topological_order()?;
        order.retain(|uri| uri != &self.root);
        Ok(order)
    }

    /// Check the graph for cycles.
    pub fn ensure_acyclic(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }

    // Nodes Kahn could not order are either on a cycle or depend on one.
    // Peel off those no remaining node depends on until only cycles remain.
    fn cycle_members(&self, mut stuck: BTreeSet<&PackageUri>) -> Vec<String> {
        loop {
            let depended_on: BTreeSet<&PackageUri> = stuck
                .iter()
                .flat_map(|node| self.dependencies_of(node))
                .filter(|dep| stuck.contains(dep))
                .collect();
            let before = stuck.len();
            stuck.retain(|node| depended_on.contains(node));
            if stuck.len() == before {
                break;
            }
        }
        stuck.into_iter().map(|uri| uri.fullname()).collect()
    }
}
