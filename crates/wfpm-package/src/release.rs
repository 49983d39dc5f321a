//! Release asset locations on the artifact host.
//!
//! Every release is published under its tag, e.g.
//! `https://github.com/acct/repo/releases/download/fastqc.v0.2.0/fastqc.v0.2.0.tar.gz`.
//! Older releases used tags without the `v` (`fastqc.0.2.0`); callers try the
//! URLs in the order returned and fall back on a miss.

use wfpm_fs::WfpmPath;

use crate::uri::PackageUri;

fn asset_url(uri: &PackageUri, tag: &str, asset: &str) -> String {
    format!(
        "https://{}/releases/download/{}/{}",
        uri.project_fullname(),
        tag,
        asset
    )
}

/// Candidate URLs for the release tarball, canonical tag first.
pub fn tarball_urls(uri: &PackageUri) -> [String; 2] {
    let tag = uri.release_tag();
    let legacy = uri.legacy_release_tag();
    [
        asset_url(uri, &tag, &format!("{tag}.tar.gz")),
        asset_url(uri, &legacy, &format!("{legacy}.tar.gz")),
    ]
}

/// Candidate URLs for the release manifest, canonical tag first.
pub fn manifest_urls(uri: &PackageUri) -> [String; 2] {
    let asset = WfpmPath::ReleaseManifest.as_str();
    [
        asset_url(uri, &uri.release_tag(), asset),
        asset_url(uri, &uri.legacy_release_tag(), asset),
    ]
}
