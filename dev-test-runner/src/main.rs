//! Runs every fixture suite under `fixtures/` through the public API.
//!
//! Each suite is a directory holding `catalog.json` and `cases.json`. A case
//! names a root type, optional known types, and either the expected schema
//! (`expect`) or a substring of the expected error (`expect_error`).
//!
//! Usage: `cargo run -p dev-test-runner [-- <case-name-regex>]`
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use entity_schema::{Catalog, GenerateOptions, SchemaGenerator, TypeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static FIXTURES_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os("FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures"))
});

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    root: String,
    #[serde(default)]
    known: Vec<String>,
    #[serde(default)]
    expand_root: bool,
    #[serde(default)]
    expect: Option<Value>,
    #[serde(default)]
    expect_error: Option<String>,
}

enum Outcome {
    Pass,
    Fail(String),
}

fn main() -> ExitCode {
    let filter = match std::env::args().nth(1).map(|src| Regex::new(&src)).transpose() {
        Ok(f) => f,
        Err(error) => {
            eprintln!("invalid case filter: {error}");
            return ExitCode::FAILURE;
        }
    };

    let suites = match list_suites(&FIXTURES_ROOT) {
        Ok(s) => s,
        Err(error) => {
            eprintln!("cannot read {}: {error}", FIXTURES_ROOT.display());
            return ExitCode::FAILURE;
        }
    };

    let (mut passed, mut failed) = (0usize, 0usize);
    for suite in suites {
        let suite_name = suite.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let (catalog, cases) = match load_suite(&suite) {
            Ok(x) => x,
            Err(error) => {
                eprintln!("❌ {suite_name}: {error}");
                failed += 1;
                continue;
            }
        };
        for case in cases {
            let label = format!("{suite_name}/{}", case.name);
            if filter.as_ref().is_some_and(|rx| !rx.is_match(&label)) {
                continue;
            }
            match run_case(&catalog, &case) {
                Outcome::Pass => {
                    passed += 1;
                    eprintln!("✅ {label}");
                }
                Outcome::Fail(reason) => {
                    failed += 1;
                    eprintln!("❌ {label}: {reason}");
                }
            }
        }
    }

    eprintln!("—— {passed} passed, {failed} failed ——");
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn list_suites(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.join("catalog.json").is_file() && path.join("cases.json").is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

fn load_suite(dir: &Path) -> Result<(Catalog, Vec<Case>), String> {
    let catalog = Catalog::load([dir.join("catalog.json")]).map_err(|e| e.to_string())?;
    let src = std::fs::read_to_string(dir.join("cases.json")).map_err(|e| e.to_string())?;
    let de = &mut serde_json::Deserializer::from_str(&src);
    let cases = serde_path_to_error::deserialize::<_, Vec<Case>>(de)
        .map_err(|err| format!("cases.json at JSON path {} → {}", err.path(), err.inner()))?;
    Ok((catalog, cases))
}

fn run_case(catalog: &Catalog, case: &Case) -> Outcome {
    let mut options = GenerateOptions::with_known(case.known.iter().map(String::as_str));
    if case.expand_root {
        options = options.expand_root();
    }
    let result = SchemaGenerator::new(catalog).generate_with(&TypeRef::new(case.root.as_str()), &options);

    match (result, &case.expect, &case.expect_error) {
        (Ok(schema), Some(expect), _) => {
            let actual = match serde_json::to_value(&schema) {
                Ok(v) => v,
                Err(error) => return Outcome::Fail(format!("cannot serialize schema: {error}")),
            };
            match first_difference(expect, &actual, String::new()) {
                None => Outcome::Pass,
                Some(diff) => Outcome::Fail(diff),
            }
        }
        (Ok(_), None, Some(needle)) => Outcome::Fail(format!("expected an error containing {needle:?}")),
        (Err(error), _, Some(needle)) if error.to_string().contains(needle.as_str()) => Outcome::Pass,
        (Err(error), _, _) => Outcome::Fail(format!("unexpected error: {error}")),
        (Ok(_), None, None) => Outcome::Fail("case has neither `expect` nor `expect_error`".into()),
    }
}

/// JSON pointer of the first place `actual` departs from `expect`, with both values.
fn first_difference(expect: &Value, actual: &Value, at: String) -> Option<String> {
    match (expect, actual) {
        (Value::Object(e), Value::Object(a)) => {
            let ek: Vec<_> = e.keys().collect();
            let ak: Vec<_> = a.keys().collect();
            if ek != ak {
                return Some(format!("{at}: keys {ek:?} != {ak:?}"));
            }
            e.iter().find_map(|(k, ev)| first_difference(ev, &a[k], format!("{at}/{k}")))
        }
        (Value::Array(e), Value::Array(a)) if e.len() == a.len() => e
            .iter()
            .zip(a)
            .enumerate()
            .find_map(|(i, (ev, av))| first_difference(ev, av, format!("{at}/{i}"))),
        _ if expect == actual => None,
        _ => Some(format!("{at}: expected {expect}, got {actual}")),
    }
}
