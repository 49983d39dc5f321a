//! Expansion of a manifest's dependencies into a [`DependencyGraph`]

use std::collections::{BTreeMap, BTreeSet};

use wfpm_package::release::manifest_urls;
use wfpm_package::{Manifest, PackageUri};

use crate::fetch::{ReleaseHost, fetch_first};
use crate::graph::DependencyGraph;
use crate::{Error, Result};

/// Where manifests of dependencies come from.
pub trait ManifestSource {
    fn manifest(&self, uri: &PackageUri) -> Result<Manifest>;
}

/// Reads `pkg-release.json` published with each release.
pub struct RemoteManifestSource<'a> {
    host: &'a dyn ReleaseHost,
}

impl<'a> RemoteManifestSource<'a> {
    pub fn new(host: &'a dyn ReleaseHost) -> Self {
        Self { host }
    }
}

impl ManifestSource for RemoteManifestSource<'_> {
    fn manifest(&self, uri: &PackageUri) -> Result<Manifest> {
        let Some((url, bytes)) = fetch_first(self.host, &manifest_urls(uri))? else {
            return Err(Error::NotReleased {
                uri: uri.to_string(),
            });
        };

        let content = String::from_utf8_lossy(&bytes);
        Ok(Manifest::from_json(&url, &content)?)
    }
}

/// Builds dependency graphs, preferring manifests of packages in the local
/// project over released ones.
pub struct DependencyResolver<'a> {
    local: BTreeMap<PackageUri, Manifest>,
    remote: &'a dyn ManifestSource,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(remote: &'a dyn ManifestSource) -> Self {
        Self {
            local: BTreeMap::new(),
            remote,
        }
    }

    /// Use these manifests instead of fetching for matching identities.
    pub fn with_local_manifests(mut self, manifests: impl IntoIterator<Item = Manifest>) -> Self {
        for manifest in manifests {
            self.local.insert(manifest.uri().clone(), manifest);
        }
        self
    }

    pub fn resolve(&self, uri: &PackageUri) -> Result<Manifest> {
        match self.local.get(uri) {
            Some(manifest) => {
                tracing::debug!(package = %uri, "Using local manifest");
                Ok(manifest.clone())
            }
            None => self.remote.manifest(uri),
        }
    }

    /// Build the full dependency graph of `root`.
    pub fn build(&self, root: &Manifest) -> Result<DependencyGraph> {
        let mut visited = BTreeSet::new();
        self.expand(root, &mut visited)
    }

    /// Expand `root` transitively. Packages already in `visited` are not
    /// expanded again; every expanded package is added to it.
    ///
    /// # Errors
    ///
    /// - [`Error::SelfDependency`] if a package lists itself
    /// - [`Error::DependencyCycle`] if the dependencies form a longer cycle
    /// - any error resolving a dependency's manifest
    pub fn expand(
        &self,
        root: &Manifest,
        visited: &mut BTreeSet<PackageUri>,
    ) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new(root.uri().clone());
        let mut stack: Vec<(PackageUri, Manifest)> = vec![(root.uri().clone(), root.clone())];
        let mut queued: BTreeSet<PackageUri> = BTreeSet::new();

        while let Some((uri, manifest)) = stack.pop() {
            if !visited.insert(uri.clone()) {
                continue;
            }
            tracing::debug!(package = %uri, "Expanding dependencies");

            for dep in manifest.all_dependencies() {
                graph.add_edge(&uri, &dep)?;
                if !visited.contains(&dep) && queued.insert(dep.clone()) {
                    let dep_manifest = self.resolve(&dep)?;
                    stack.push((dep, dep_manifest));
                }
            }
        }

        graph.ensure_acyclic()?;
        tracing::debug!(root = %root.uri(), packages = graph.node_count(), "Resolved dependency graph");
        Ok(graph)
    }
}
