//! Package URI parsing and derived names

use proptest::prelude::*;
use rstest::rstest;
use wfpm_package::{Error, PackageUri};

#[rstest]
#[case("github.com/acct/repo")]
#[case("github.com/acct/repo/extra/fastqc@0.1.0")]
#[case("github.com/acct/repo/fastqc")]
#[case("github.com/acct/repo/fastqc@")]
#[case("github.com/acct/repo/@0.1.0")]
#[case("github.com//repo/fastqc@0.1.0")]
#[case("github.com/acct/repo/fastqc@0.1.0@0.2.0")]
fn test_malformed_uris(#[case] uri: &str) {
    let err = PackageUri::parse(uri).unwrap_err();
    assert!(matches!(err, Error::MalformedUri { .. }), "{uri}: {err}");
}

#[rstest]
#[case("github.com/acct/repo/FastQC@0.1.0")]
#[case("github.com/acct/repo/fast_qc@0.1.0")]
#[case("github.com/acct/repo/f@0.1.0")]
fn test_invalid_names(#[case] uri: &str) {
    let err = PackageUri::parse(uri).unwrap_err();
    assert!(matches!(err, Error::InvalidName { .. }), "{uri}: {err}");
}

#[rstest]
#[case("github.com/acct/repo/fastqc@0.1")]
#[case("github.com/acct/repo/fastqc@v0.1.0")]
#[case("github.com/acct/repo/fastqc@0.1.0-RC")]
fn test_invalid_versions(#[case] uri: &str) {
    let err = PackageUri::parse(uri).unwrap_err();
    assert!(matches!(err, Error::InvalidVersion { .. }), "{uri}: {err}");
}

#[test]
fn test_error_message_names_expected_format() {
    let err = PackageUri::parse("fastqc@0.1.0").unwrap_err();
    assert!(
        err.to_string()
            .contains("repo_server/repo_account/repo_name/pkg_name@pkg_version")
    );
}

#[test]
fn test_derived_names() {
    let uri: PackageUri = "github.com/ICGC-ARGO/demo-wfpkgs/demo-utils@1.3.0"
        .parse()
        .unwrap();

    assert_eq!(uri.fullname(), "demo-utils@1.3.0");
    assert_eq!(uri.project_fullname(), "github.com/icgc-argo/demo-wfpkgs");
    assert_eq!(uri.release_tag(), "demo-utils.v1.3.0");
    assert_eq!(uri.legacy_release_tag(), "demo-utils.1.3.0");
}

#[test]
fn test_account_case_does_not_change_identity() {
    let upper = PackageUri::parse("github.com/ACCT/repo/fastqc@0.1.0").unwrap();
    let lower = PackageUri::parse("github.com/acct/repo/fastqc@0.1.0").unwrap();
    assert_eq!(upper, lower);
}

#[test]
fn test_serde_as_string() {
    let uri = PackageUri::parse("github.com/acct/repo/fastqc@0.1.0").unwrap();
    let json = serde_json::to_string(&uri).unwrap();
    assert_eq!(json, "\"github.com/acct/repo/fastqc@0.1.0\"");

    let back: PackageUri = serde_json::from_str(&json).unwrap();
    assert_eq!(back, uri);

    assert!(serde_json::from_str::<PackageUri>("\"not-a-uri\"").is_err());
}

proptest! {
    #[test]
    fn test_display_round_trips(
        host in "[a-z]{1,8}\\.(com|org)",
        account in "[A-Za-z0-9-]{1,10}",
        repo in "[a-z0-9-]{1,10}",
        name in "[a-z][0-9a-z-]{0,8}[0-9a-z]",
        version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}(\\.[0-9]{1,2})?(-[0-9a-z.]{1,6})?",
    ) {
        let raw = format!("{host}/{account}/{repo}/{name}@{version}");
        let parsed = PackageUri::parse(&raw).unwrap();
        let reparsed = PackageUri::parse(&parsed.to_string()).unwrap();

        prop_assert_eq!(&reparsed, &parsed);
        prop_assert_eq!(parsed.account(), account.to_lowercase());
        prop_assert_eq!(parsed.version(), version.as_str());
    }
}
