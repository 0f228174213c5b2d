// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::*;
use crate::platform::{Arch, Os, PlatformPredicate};
use crate::variable::{JoinVar, MergeMode, SetVar, TemplateVar};

fn linux_only() -> PlatformPredicate {
    PlatformPredicate {
        os: vec![Os::Linux],
        ..Default::default()
    }
}

fn names(set: &PackageSet) -> Vec<&str> {
    set.names().collect()
}

#[fixture]
fn mac() -> PlatformContext {
    PlatformContext::new(Os::MacOs, Arch::Aarch64)
}

#[fixture]
fn linux() -> PlatformContext {
    PlatformContext::new(Os::Linux, Arch::X86_64)
}

/// The shape of a typical skia/egui shell: shared libraries, one windowing
/// backend per feature, and a compiler whose headers live at a versioned
/// path.
fn declared() -> Vec<PackageRef> {
    let wayland = PlatformPredicate {
        os: vec![Os::Linux],
        features: vec!["wayland".into()],
        ..Default::default()
    };
    let x11 = PlatformPredicate {
        os: vec![Os::Linux],
        features: vec!["x11".into()],
        ..Default::default()
    };
    vec![
        PackageRef::new("fontconfig").with_prefix("/opt/fontconfig"),
        PackageRef::new("freetype").with_prefix("/opt/freetype"),
        PackageRef::new("libxkbcommon")
            .with_prefix("/opt/xkb")
            .when(linux_only()),
        PackageRef::new("wayland")
            .with_prefix("/opt/wayland")
            .when(wayland),
        PackageRef::new("libX11").with_prefix("/opt/x11").when(x11),
        PackageRef::new("libclang")
            .with_version("17.0.6")
            .with_prefix("/opt/llvm"),
    ]
}

fn derived() -> Vec<DerivedSpec> {
    vec![
        DerivedSpec::Join(JoinVar {
            merge: MergeMode::Prepend,
            ..JoinVar::new("LD_LIBRARY_PATH", "lib")
        }),
        DerivedSpec::Template(TemplateVar::new("LIBCLANG_PATH", "libclang", "{lib}")),
        DerivedSpec::Template(TemplateVar::new(
            "BINDGEN_EXTRA_CLANG_ARGS",
            "libclang",
            "-isystem {lib}/clang/{version}/include",
        )),
        DerivedSpec::Set(SetVar::new("RUST_BACKTRACE", "1")),
    ]
}

#[rstest]
fn test_order_preserved_when_filtering(mac: PlatformContext) {
    let declared = vec![
        PackageRef::new("A"),
        PackageRef::new("B").when(linux_only()),
        PackageRef::new("C"),
    ];
    let resolved = resolve_packages(&declared, &mac).unwrap();
    assert_eq!(names(&resolved), vec!["A", "C"]);
}

#[rstest]
fn test_declaration_order_is_not_sorted(linux: PlatformContext) {
    let declared = vec![
        PackageRef::new("zlib"),
        PackageRef::new("cmake"),
        PackageRef::new("libpng"),
    ];
    let resolved = resolve_packages(&declared, &linux).unwrap();
    assert_eq!(names(&resolved), vec!["zlib", "cmake", "libpng"]);
}

#[rstest]
fn test_duplicate_package(linux: PlatformContext) {
    let declared = vec![PackageRef::new("A"), PackageRef::new("B"), PackageRef::new("A")];
    match resolve_packages(&declared, &linux) {
        Err(Error::DuplicatePackage {
            name,
            first,
            second,
        }) => {
            assert_eq!(name, "A");
            assert_eq!((first, second), (0, 2));
        }
        other => panic!("Expected DuplicatePackage, got: {other:?}"),
    }
}

#[rstest]
fn test_duplicate_excluded_by_platform_is_fine(linux: PlatformContext, mac: PlatformContext) {
    let declared = vec![
        PackageRef::new("gl").with_prefix("/opt/mesa").when(linux_only()),
        PackageRef::new("gl")
            .with_prefix("/System/gl")
            .when(PlatformPredicate {
                os: vec![Os::MacOs],
                ..Default::default()
            }),
    ];
    let on_linux = resolve_packages(&declared, &linux).unwrap();
    let on_mac = resolve_packages(&declared, &mac).unwrap();
    assert_eq!(on_linux.get("gl").unwrap().prefix.as_deref(), Some("/opt/mesa"));
    assert_eq!(on_mac.get("gl").unwrap().prefix.as_deref(), Some("/System/gl"));
}

#[rstest]
fn test_empty_fold_is_empty_string() {
    let value = compute_derived_variable(
        "LD_LIBRARY_PATH",
        |_| panic!("fold must not run on an empty set"),
        &PackageSet::default(),
    )
    .unwrap();
    assert_eq!(value, "");
}

#[rstest]
fn test_join_exact_value(linux: PlatformContext) {
    let declared = vec![
        PackageRef::new("A").with_output("lib", "/p/a"),
        PackageRef::new("B").with_output("lib", "/p/b"),
    ];
    let specs = vec![DerivedSpec::Join(JoinVar::new("LIBRARY_PATH", "lib"))];
    let env = resolve(&declared, &linux, &specs).unwrap();
    assert_eq!(env.get("LIBRARY_PATH"), Some("/p/a:/p/b"));
}

#[rstest]
fn test_missing_dependency_when_filtered(mac: PlatformContext) {
    let declared = vec![PackageRef::new("X").with_version("1.0").when(linux_only())];
    let specs = vec![DerivedSpec::Template(TemplateVar::new(
        "X_VERSION",
        "X",
        "{version}",
    ))];
    match resolve(&declared, &mac, &specs) {
        Err(Error::MissingDependency { variable, package }) => {
            assert_eq!(variable, "X_VERSION");
            assert_eq!(package, "X");
        }
        other => panic!("Expected MissingDependency, got: {other:?}"),
    }
}

#[rstest]
fn test_later_failure_discards_earlier_variables(mac: PlatformContext) {
    let declared = declared();
    let specs = vec![
        DerivedSpec::Join(JoinVar::new("LD_LIBRARY_PATH", "lib")),
        DerivedSpec::Set(SetVar::new("RUST_BACKTRACE", "1")),
        DerivedSpec::Template(TemplateVar::new("XKB_ROOT", "libxkbcommon", "{prefix}")),
    ];

    // The join alone succeeds on this platform.
    assert!(resolve(&declared, &mac, &specs[..2]).is_ok());

    match resolve(&declared, &mac, &specs) {
        Err(Error::MissingDependency { variable, package }) => {
            assert_eq!(variable, "XKB_ROOT");
            assert_eq!(package, "libxkbcommon");
        }
        other => panic!("Expected MissingDependency, got: {other:?}"),
    }
}

#[rstest]
fn test_version_dependent_variable(linux: PlatformContext) {
    let resolved = resolve_packages(&declared(), &linux).unwrap();
    let value = compute_version_dependent_variable(
        "CLANG_VERSION",
        "libclang",
        |p| Ok(p.version.clone().unwrap_or_default()),
        &resolved,
    )
    .unwrap();
    assert_eq!(value, "17.0.6");
}

#[rstest]
fn test_duplicate_variable_checked_before_packages(linux: PlatformContext) {
    // Packages are also broken here; the variable error must win since the
    // specs are checked first.
    let declared = vec![PackageRef::new("A"), PackageRef::new("A")];
    let specs = vec![
        DerivedSpec::Set(SetVar::new("FOO", "1")),
        DerivedSpec::Join(JoinVar::new("FOO", "lib")),
    ];
    match resolve(&declared, &linux, &specs) {
        Err(Error::DuplicateVariable(name)) => assert_eq!(name, "FOO"),
        other => panic!("Expected DuplicateVariable, got: {other:?}"),
    }
}

#[rstest]
fn test_full_resolution_wayland(linux: PlatformContext) {
    let ctx = linux.with_feature("wayland");
    let env = resolve(&declared(), &ctx, &derived()).unwrap();

    assert_eq!(env.platform(), "x86_64-linux");
    assert_eq!(
        names(env.packages()),
        vec!["fontconfig", "freetype", "libxkbcommon", "wayland", "libclang"]
    );
    assert_eq!(
        env.get("LD_LIBRARY_PATH"),
        Some("/opt/fontconfig/lib:/opt/freetype/lib:/opt/xkb/lib:/opt/wayland/lib:/opt/llvm/lib")
    );
    assert_eq!(env.get("LIBCLANG_PATH"), Some("/opt/llvm/lib"));
    assert_eq!(
        env.get("BINDGEN_EXTRA_CLANG_ARGS"),
        Some("-isystem /opt/llvm/lib/clang/17.0.6/include")
    );
    assert_eq!(env.var("LD_LIBRARY_PATH").unwrap().merge, MergeMode::Prepend);

    let order: Vec<&str> = env.iter().map(|(k, _)| k).collect();
    assert_eq!(
        order,
        vec!["LD_LIBRARY_PATH", "LIBCLANG_PATH", "BINDGEN_EXTRA_CLANG_ARGS", "RUST_BACKTRACE"]
    );
}

#[rstest]
fn test_full_resolution_mac(mac: PlatformContext) {
    let env = resolve(&declared(), &mac, &derived()).unwrap();
    assert_eq!(
        env.get("LD_LIBRARY_PATH"),
        Some("/opt/fontconfig/lib:/opt/freetype/lib:/opt/llvm/lib")
    );
}

#[rstest]
fn test_no_matching_packages_gives_empty_values(mac: PlatformContext) {
    let declared = vec![PackageRef::new("wayland").with_prefix("/w").when(linux_only())];
    let specs = vec![DerivedSpec::Join(JoinVar::new("LD_LIBRARY_PATH", "lib"))];
    let env = resolve(&declared, &mac, &specs).unwrap();
    assert!(env.packages().is_empty());
    assert_eq!(env.get("LD_LIBRARY_PATH"), Some(""));
}

#[rstest]
fn test_resolve_twice_is_identical(linux: PlatformContext) {
    let ctx = linux.with_feature("x11");
    let first = resolve(&declared(), &ctx, &derived()).unwrap();
    let second = resolve(&declared(), &ctx, &derived()).unwrap();
    assert_eq!(first.pairs(), second.pairs());
    assert_eq!(first.digest(), second.digest());
}

#[rstest]
fn test_digest_depends_on_order(linux: PlatformContext) {
    let forward = vec![
        DerivedSpec::Set(SetVar::new("A", "1")),
        DerivedSpec::Set(SetVar::new("B", "2")),
    ];
    let reversed: Vec<_> = forward.iter().rev().cloned().collect();
    let a = resolve(&[], &linux, &forward).unwrap();
    let b = resolve(&[], &linux, &reversed).unwrap();
    assert_ne!(a.digest(), b.digest());
}

fn arb_package() -> impl Strategy<Value = PackageRef> {
    ("[a-e]", prop::bool::ANY, "/[a-z]{1,6}").prop_map(|(name, gated, prefix)| {
        let pkg = PackageRef::new(name).with_prefix(prefix);
        if gated { pkg.when(linux_only()) } else { pkg }
    })
}

proptest! {
    #[test]
    fn prop_resolution_is_deterministic(
        declared in prop::collection::vec(arb_package(), 0..8),
        on_linux in prop::bool::ANY,
    ) {
        let ctx = if on_linux { linux() } else { mac() };
        let specs = vec![DerivedSpec::Join(JoinVar::new("LD_LIBRARY_PATH", "lib"))];
        let first = resolve(&declared, &ctx, &specs);
        let second = resolve(&declared, &ctx, &specs);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.pairs(), b.pairs()),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "results differ between runs"),
        }
    }

    #[test]
    fn prop_selection_is_an_ordered_subsequence(
        declared in prop::collection::vec(arb_package(), 0..8),
    ) {
        let ctx = mac();
        if let Ok(resolved) = resolve_packages(&declared, &ctx) {
            let expected: Vec<&str> = declared
                .iter()
                .filter(|p| p.applies_to(&ctx))
                .map(|p| p.name.as_str())
                .collect();
            prop_assert_eq!(names(&resolved), expected);
        }
    }
}
