//! [`FakeReleaseHost`]: releases served from memory.

use std::collections::HashMap;
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;
use wfpm_core::ReleaseHost;
use wfpm_package::PackageUri;
use wfpm_package::release::{manifest_urls, tarball_urls};

/// Release manifest JSON of `uri` listing `dependencies`.
pub fn release_manifest(uri: &PackageUri, dependencies: &[&str]) -> String {
    let manifest = serde_json::json!({
        "name": uri.name(),
        "version": uri.version(),
        "main": "main.nf",
        "repository": {
            "type": "git",
            "url": format!("https://{}.git", uri.project_fullname()),
        },
        "dependencies": dependencies,
        "devDependencies": [],
    });
    serde_json::to_string_pretty(&manifest).unwrap()
}

/// Gzipped tarball of `files`, given as `(path, content)`.
pub fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Files of a released package: manifest, main script and checker.
pub fn package_files(uri: &PackageUri, dependencies: &[&str]) -> Vec<(String, String)> {
    vec![
        ("pkg.json".into(), release_manifest(uri, dependencies)),
        (
            "main.nf".into(),
            format!("#!/usr/bin/env nextflow\nversion = '{}'\n", uri.version()),
        ),
        (
            "tests/checker.nf".into(),
            format!("#!/usr/bin/env nextflow\nversion = '{}'\n", uri.version()),
        ),
    ]
}

#[derive(Default)]
pub struct FakeReleaseHost {
    assets: Mutex<HashMap<String, Vec<u8>>>,
    errors: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl FakeReleaseHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&self, url: &str, bytes: Vec<u8>) {
        self.assets.lock().unwrap().insert(url.to_string(), bytes);
    }

    fn release(&self, uri: &str, dependencies: &[&str], slot: usize, corrupt: bool) -> &Self {
        let uri = PackageUri::parse(uri).unwrap();
        let files = package_files(&uri, dependencies);
        let files: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        let archive = if corrupt {
            b"definitely not a gzip stream".to_vec()
        } else {
            tarball(&files)
        };

        self.put(&tarball_urls(&uri)[slot], archive);
        self.put(
            &manifest_urls(&uri)[slot],
            release_manifest(&uri, dependencies).into_bytes(),
        );
        self
    }

    /// Publish a release under the `name.vVERSION` tag.
    pub fn publish(&self, uri: &str, dependencies: &[&str]) -> &Self {
        self.release(uri, dependencies, 0, false)
    }

    /// Publish a release under the older `name.VERSION` tag.
    pub fn publish_legacy(&self, uri: &str, dependencies: &[&str]) -> &Self {
        self.release(uri, dependencies, 1, false)
    }

    /// Publish a valid manifest with a tarball that cannot be unpacked.
    pub fn publish_corrupt(&self, uri: &str, dependencies: &[&str]) -> &Self {
        self.release(uri, dependencies, 0, true)
    }

    /// Answer `url` with an HTTP error instead of the asset.
    pub fn fail_url(&self, url: &str, message: &str) -> &Self {
        self.errors
            .lock()
            .unwrap()
            .insert(url.to_string(), message.to_string());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ReleaseHost for FakeReleaseHost {
    fn get(&self, url: &str) -> wfpm_core::Result<Option<Vec<u8>>> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(message) = self.errors.lock().unwrap().get(url) {
            return Err(wfpm_core::Error::Http {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        Ok(self.assets.lock().unwrap().get(url).cloned())
    }
}
