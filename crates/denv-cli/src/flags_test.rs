// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[derive(Parser)]
struct Harness {
    #[clap(flatten)]
    discovery: DiscoveryFlags,

    #[clap(flatten)]
    platform: PlatformFlags,
}

#[rstest]
fn test_platform_flags_explicit() {
    let harness = Harness::try_parse_from([
        "denv", "--os", "macos", "--arch", "arm64", "-F", "metal", "--feature", "gl",
    ])
    .unwrap();

    let context = harness.platform.context().unwrap();
    assert_eq!(context.os, denv::Os::MacOs);
    assert_eq!(context.arch, denv::Arch::Aarch64);
    assert!(context.has_feature("metal"));
    assert!(context.has_feature("gl"));
}

#[rstest]
fn test_platform_flags_comma_separated_features() {
    let harness =
        Harness::try_parse_from(["denv", "--os", "linux", "--arch", "x86_64", "-F", "wayland, gl,"])
            .unwrap();

    let context = harness.platform.context().unwrap();
    let features: Vec<&str> = context.features.iter().map(String::as_str).collect();
    assert_eq!(features, vec!["gl", "wayland"]);
}

#[rstest]
fn test_platform_flags_reject_unknown_os() {
    assert!(Harness::try_parse_from(["denv", "--os", "plan9"]).is_err());
}

#[rstest]
fn test_discovery_flags_options() {
    let harness = Harness::try_parse_from(["denv", "-n", "-i", "a.yaml", "-i", "b.yaml"]).unwrap();
    let mut flags = harness.discovery;
    flags.env_includes = vec![String::new(), "c.yaml".to_string()];

    let options = flags.options();
    assert!(options.no_inherit);
    assert!(!options.force_inherit);
    assert_eq!(options.cli_includes, vec!["a.yaml", "b.yaml"]);
    assert_eq!(options.env_includes, vec!["c.yaml"]);
}

#[rstest]
fn test_lock_path_beside_spec() {
    let tmp = TempDir::new().unwrap();
    let spec = tmp.path().join(denv::DENV_FILENAME);
    std::fs::write(&spec, "api: denv/v0\n").unwrap();

    let mut flags = DiscoveryFlags {
        file: tmp.path().to_path_buf(),
        ..Default::default()
    };
    let expected = tmp.path().join(denv::DENV_LOCK_FILENAME);
    assert_eq!(flags.lock_path(), expected);

    flags.file = spec;
    assert_eq!(flags.lock_path(), expected);
}

#[rstest]
#[case("1", true)]
#[case("YES", true)]
#[case("on", true)]
#[case("0", false)]
#[case("", false)]
#[case("off", false)]
fn test_truthy(#[case] value: &str, #[case] expected: bool) {
    assert_eq!(truthy(value).unwrap(), expected);
}

#[rstest]
fn test_truthy_rejects_garbage() {
    assert!(truthy("maybe").is_err());
}
