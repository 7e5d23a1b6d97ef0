//! Minimal CLI: catalog → (schema | batch)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::descriptor::TypeRef;
use crate::generate::{GenerateOptions, SchemaGenerator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate JSON-schema-like descriptors from type catalogs
#[derive(Parser, Debug)]
#[command(name = "entity-schema", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate the schema of one root type
    Schema(SchemaOut),
    /// generate every composite type, referencing the others instead of inlining them
    Batch(BatchOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more catalog files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// jq filter applied to each generated schema before output
    #[arg(long)]
    jq_expr: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// fully qualified name of the root type
    #[arg(long)]
    root: String,

    /// types to emit as back-references instead of inlining (repeatable)
    #[arg(long)]
    known: Vec<String>,

    /// expand the root even when it is listed in --known
    #[arg(long, default_value_t = false)]
    expand_root: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct BatchOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// inline every type instead of referencing the other catalog types
    #[arg(long, default_value_t = false)]
    inline: bool,

    /// write one `<type>.schema.json` per type here (single JSON object on stdout if omitted)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_catalog(&self) -> Result<Catalog> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let catalog = Catalog::load(&source_paths)?;
        if catalog.is_empty() {
            tracing::warn!(inputs = ?self.input, "catalog declares no types; only built-in names resolve");
        }
        tracing::info!(files = source_paths.len(), types = catalog.len(), "catalog ready");
        Ok(catalog)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }

                let catalog = target.input_settings.load_catalog()?;
                let mut options = GenerateOptions::with_known(target.known.iter().map(String::as_str));
                if target.expand_root {
                    options = options.expand_root();
                }
                let root = TypeRef::new(target.root.as_str());
                let schema = SchemaGenerator::new(&catalog)
                    .generate_with(&root, &options)
                    .with_context(|| format!("failed to generate schema for `{root}`"))?;
                let schema = post_process(target.input_settings.jq_expr.as_deref(), serde_json::to_value(&schema)?)?;
                write_json(&schema, target.out.as_deref())
            }
            Command::Batch(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }

                let catalog = target.input_settings.load_catalog()?;
                let results = batch_schemas(&catalog, target.inline, target.input_settings.jq_expr.as_deref())?;
                match target.out_dir.as_ref() {
                    Some(dir) => write_batch_dir(&results, dir),
                    None => write_json(&batch_object(results), None),
                }
            }
        }
    }
}

/// One schema per declared composite type, in declaration order.
///
/// Unless `inline`, every other catalog type is emitted as a back-reference
/// while the root itself is expanded.
fn batch_schemas(catalog: &Catalog, inline: bool, jq_expr: Option<&str>) -> Result<Vec<(TypeRef, Value)>> {
    let roots: Vec<TypeRef> = catalog.composite_types().cloned().collect();
    let options = if inline {
        GenerateOptions::default()
    } else {
        GenerateOptions::with_known(roots.iter().cloned()).expand_root()
    };

    // top-level calls share nothing but the catalog
    let generator = SchemaGenerator::new(catalog);
    roots
        .par_iter()
        .map(|root| -> Result<(TypeRef, Value)> {
            let schema = generator
                .generate_with(root, &options)
                .with_context(|| format!("failed to generate schema for `{root}`"))?;
            let schema = post_process(jq_expr, serde_json::to_value(&schema)?)?;
            Ok((root.clone(), schema))
        })
        .collect()
}

/// Single object keyed by fully qualified type name.
fn batch_object(results: Vec<(TypeRef, Value)>) -> Value {
    Value::Object(results.into_iter().map(|(root, schema)| (root.to_string(), schema)).collect())
}

/// `<dir>/<type>.schema.json` per result. Fails before writing anything if
/// two types map to the same file name.
fn write_batch_dir(results: &[(TypeRef, Value)], dir: &Path) -> Result<()> {
    let mut files = IndexMap::<String, &TypeRef>::new();
    for (root, _) in results {
        let stem = file_stem(root);
        if let Some(other) = files.get(&stem) {
            bail!("`{other}` and `{root}` both map to {stem}.schema.json");
        }
        files.insert(stem, root);
    }
    for ((stem, _), (_, schema)) in files.iter().zip(results) {
        write_json(schema, Some(&dir.join(format!("{stem}.schema.json"))))?;
    }
    tracing::info!(count = results.len(), dir = %dir.display(), "wrote schemas");
    Ok(())
}

/// Apply the optional jq filter; several outputs are wrapped in an array.
fn post_process(jq_expr: Option<&str>, schema: Value) -> Result<Value> {
    let Some(jq_expr) = jq_expr else {
        return Ok(schema);
    };
    let mut outputs = crate::jq_exec::run_filter(jq_expr, &schema)?;
    if outputs.len() == 1 {
        Ok(outputs.remove(0))
    } else {
        Ok(Value::Array(outputs))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_json(value: &Value, out: Option<&Path>) -> Result<()> {
    let src = serde_json::to_string_pretty(value)?;
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(out, &src).with_context(|| format!("failed to write {}", out.display()))?;
    } else {
        println!("{src}");
    }
    Ok(())
}

/// `shop::model::Order` → `shop.model.Order`, safe as a file name.
fn file_stem(ty: &TypeRef) -> String {
    ty.as_str()
        .replace("::", ".")
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn shop() -> Catalog {
        Catalog::from_value(json!({ "types": [
            { "name": "shop.Customer", "fields": [{ "name": "name", "type": "String" }] },
            { "name": "shop.Order", "fields": [
                { "name": "customer", "type": "shop.Customer" },
                { "name": "lines", "type": "java.util.List<shop.Line>", "tags": [{ "name": "OneToMany" }] },
            ]},
            { "name": "shop.Status", "kind": "enumeration", "constants": ["OPEN"] },
            { "name": "shop.Line", "fields": [{ "name": "sku", "type": "String" }] },
        ] })).unwrap()
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("entity-schema-cli-{tag}-{}", std::process::id()))
    }

    #[test]
    fn batch_expands_each_root_and_references_the_rest() {
        let out = batch_object(batch_schemas(&shop(), false, None).unwrap());
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["shop.Customer", "shop.Order", "shop.Line"]);
        assert_eq!(out["shop.Order"], json!({
            "type": "object",
            "properties": {
                "customer": { "type": "object", "@schema": "Customer" },
                "lines": { "type": "array", "items": { "type": "object", "@schema": "Line" } },
            },
        }));
        assert_eq!(out["shop.Customer"], json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
        }));
    }

    #[test]
    fn inline_batch_expands_everything() {
        let out = batch_object(batch_schemas(&shop(), true, None).unwrap());
        assert_eq!(
            out["shop.Order"]["properties"]["customer"],
            json!({ "type": "object", "properties": { "name": { "type": "string" } } })
        );
        assert_eq!(out["shop.Order"]["properties"]["lines"]["items"]["properties"]["sku"], json!({ "type": "string" }));
    }

    #[test]
    fn jq_post_processing_single_and_multiple_outputs() {
        let results = batch_schemas(&shop(), false, Some(".properties | keys")).unwrap();
        assert_eq!(results[1], (TypeRef::from("shop.Order"), json!(["customer", "lines"])));

        let results = batch_schemas(&shop(), false, Some(".type, (.properties | keys | .[])")).unwrap();
        assert_eq!(results[0].1, json!(["object", "name"]));

        assert_eq!(post_process(None, json!({ "type": "string" })).unwrap(), json!({ "type": "string" }));
    }

    #[test]
    fn batch_dir_writes_one_file_per_type() {
        let dir = scratch_dir("out");
        let results = batch_schemas(&shop(), false, None).unwrap();
        write_batch_dir(&results, &dir).unwrap();
        let mut names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["shop.Customer.schema.json", "shop.Line.schema.json", "shop.Order.schema.json"]);
        let line: Value = serde_json::from_str(&std::fs::read_to_string(dir.join("shop.Line.schema.json")).unwrap()).unwrap();
        assert_eq!(line, results[2].1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn batch_dir_rejects_colliding_file_names() {
        let dir = scratch_dir("collide");
        let results = vec![
            (TypeRef::from("a::B"), json!({ "type": "object" })),
            (TypeRef::from("a.B"), json!({ "type": "object" })),
        ];
        let err = write_batch_dir(&results, &dir).unwrap_err();
        assert_eq!(err.to_string(), "`a::B` and `a.B` both map to a.B.schema.json");
        assert!(!dir.exists());
    }

    #[test]
    fn file_stems_are_path_safe() {
        assert_eq!(file_stem(&TypeRef::from("shop::model::Order")), "shop.model.Order");
        assert_eq!(file_stem(&TypeRef::from("Page<T>")), "Page_T_");
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let out = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(out, [PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
        assert!(resolve_file_path_patterns(["/definitely/not/here/*.json"]).is_err());
    }

    #[test]
    fn parses_schema_command() {
        let cli = CommandLineInterface::try_parse_from([
            "entity-schema", "schema", "-i", "types.json", "--root", "shop.Order",
            "--known", "shop.Customer", "--known", "shop.Item", "--expand-root",
        ]).unwrap();
        let Command::Schema(target) = cli.cmd else { panic!("expected schema command") };
        assert_eq!(target.root, "shop.Order");
        assert_eq!(target.known, ["shop.Customer", "shop.Item"]);
        assert!(target.expand_root);
    }
}
