// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn libclang() -> PackageRef {
    PackageRef::new("libclang")
        .with_version("17.0.6")
        .with_prefix("/opt/llvm")
}

#[rstest]
fn test_join_uses_declared_order() {
    let packages = vec![
        PackageRef::new("b").with_prefix("/p/b"),
        PackageRef::new("a").with_prefix("/p/a"),
    ];
    let value = JoinVar::new("LD_LIBRARY_PATH", "lib").fold(&packages).unwrap();
    assert_eq!(value, "/p/b/lib:/p/a/lib");
}

#[rstest]
fn test_join_custom_separator_and_filter() {
    let packages = vec![
        PackageRef::new("a").with_output("include", "/i/a"),
        PackageRef::new("b").with_output("include", "/i/b"),
        PackageRef::new("c").with_output("include", "/i/c"),
    ];
    let var = JoinVar {
        separator: Some(" ".to_string()),
        packages: Some(vec!["c".to_string(), "a".to_string(), "gone".to_string()]),
        ..JoinVar::new("CPATH", "include")
    };
    // Filter order is ignored, resolved order wins.
    assert_eq!(var.fold(&packages).unwrap(), "/i/a /i/c");
}

#[rstest]
fn test_join_does_not_deduplicate() {
    let packages = vec![
        PackageRef::new("a").with_output("lib", "/same"),
        PackageRef::new("b").with_output("lib", "/same"),
    ];
    let value = JoinVar::new("LD_LIBRARY_PATH", "lib").fold(&packages).unwrap();
    assert_eq!(value, "/same:/same");
}

#[rstest]
fn test_join_missing_attribute() {
    let packages = vec![PackageRef::new("pkg-config")];
    let err = JoinVar::new("LD_LIBRARY_PATH", "lib")
        .fold(&packages)
        .unwrap_err();
    match err {
        Error::MissingAttribute {
            variable,
            package,
            attribute,
        } => {
            assert_eq!(variable, "LD_LIBRARY_PATH");
            assert_eq!(package, "pkg-config");
            assert_eq!(attribute, "lib");
        }
        other => panic!("Expected MissingAttribute, got: {other:?}"),
    }
}

#[rstest]
fn test_render_version_dependent_path(libclang: PackageRef) {
    let var = TemplateVar::new(
        "BINDGEN_EXTRA_CLANG_ARGS",
        "libclang",
        "-isystem {lib}/clang/{version}/include",
    );
    assert_eq!(
        var.render(&libclang).unwrap(),
        "-isystem /opt/llvm/lib/clang/17.0.6/include"
    );
}

#[rstest]
fn test_render_escaped_braces(libclang: PackageRef) {
    let var = TemplateVar::new("X", "libclang", "{{{ version }}}");
    assert_eq!(var.render(&libclang).unwrap(), "{17.0.6}");
}

#[rstest]
#[case::unclosed("{version")]
#[case::empty("{}")]
#[case::stray_close("a}b")]
fn test_render_invalid(libclang: PackageRef, #[case] template: &str) {
    let var = TemplateVar::new("X", "libclang", template);
    assert!(matches!(
        var.render(&libclang),
        Err(Error::InvalidTemplate { .. })
    ));
}

#[rstest]
fn test_render_missing_attribute(libclang: PackageRef) {
    let var = TemplateVar::new("X", "libclang", "{man}");
    assert!(matches!(
        var.render(&libclang),
        Err(Error::MissingAttribute { .. })
    ));
}

#[rstest]
fn test_spec_accessors() {
    let spec = DerivedSpec::Join(JoinVar {
        merge: MergeMode::Prepend,
        separator: Some(";".to_string()),
        ..JoinVar::new("PATH", "bin")
    });
    assert_eq!(spec.name(), "PATH");
    assert_eq!(spec.merge(), MergeMode::Prepend);
    assert_eq!(spec.separator(), ";");

    let spec = DerivedSpec::Set(SetVar::new("RUST_BACKTRACE", "1"));
    assert_eq!(spec.merge(), MergeMode::Replace);
    assert_eq!(spec.separator(), DEFAULT_SEPARATOR);
}

#[rstest]
fn test_deserialize_variants() {
    let yaml = r#"
- join: PKG_CONFIG_PATH
  attribute: pkgconfig
- template: LIBCLANG_PATH
  package: libclang
  value: "{lib}"
- set: RUST_LOG
  value: debug
  merge: append
  separator: ","
"#;
    let specs: Vec<DerivedSpec> = serde_yaml::from_str(yaml).unwrap();
    assert!(matches!(&specs[0], DerivedSpec::Join(_)));
    assert!(matches!(&specs[1], DerivedSpec::Template(_)));
    assert!(matches!(&specs[2], DerivedSpec::Set(_)));
    assert_eq!(specs[2].merge(), MergeMode::Append);
    assert_eq!(specs[2].separator(), ",");
}
