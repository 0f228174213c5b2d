// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn cmd(template: Template, packages: &[&str]) -> CmdInit {
    CmdInit {
        path: PathBuf::from("."),
        inherit: false,
        packages: packages.iter().map(|p| p.to_string()).collect(),
        template,
    }
}

#[rstest]
#[case::minimal(Template::Minimal)]
#[case::standard(Template::Standard)]
#[case::full(Template::Full)]
fn test_templates_parse(#[case] template: Template) {
    let spec = denv::EnvSpec::from_yaml(cmd(template, &[]).render()).unwrap();
    assert!(spec.packages.is_empty());
    assert!(!spec.inherit);
}

#[rstest]
#[case::minimal(Template::Minimal)]
#[case::standard(Template::Standard)]
#[case::full(Template::Full)]
fn test_templates_include_packages(#[case] template: Template) {
    let spec = denv::EnvSpec::from_yaml(cmd(template, &["zlib", "openssl"]).render()).unwrap();
    let names: Vec<&str> = spec.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["zlib", "openssl"]);
}

#[rstest]
fn test_init_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    let mut init = CmdInit {
        path: tmp.path().to_path_buf(),
        ..cmd(Template::Minimal, &[])
    };

    assert_eq!(init.run().unwrap(), 0);
    assert!(tmp.path().join(denv::DENV_FILENAME).exists());
    assert!(init.run().is_err());
}
