//! jq post-processing of emitted schemas.
use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over `input`, returning every output as JSON.
pub fn run_filter(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(|errs| {
        let msgs: Vec<String> = errs.into_iter().map(|(_, err)| format!("{err:?}")).collect();
        anyhow!("cannot parse jq filter `{filter_src}`: {}", msgs.join("; "))
    })?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| anyhow!("cannot compile jq filter `{filter_src}`: {}", undefined_names(errs)))?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for item in outputs {
        let val = item.map_err(|e| anyhow!("jq filter `{filter_src}` failed: {e:?}"))?;
        let text = val.to_string();
        out.push(serde_json::from_str(&text).with_context(|| format!("jq produced non-JSON output: {text}"))?);
    }
    Ok(out)
}

fn undefined_names(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> String {
    errs.into_iter()
        .flat_map(|(_, list)| list)
        .map(|(name, undef)| format!("undefined `{name}` ({undef:?})"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_property_keys() {
        let schema = json!({ "type": "object", "properties": { "id": { "type": "integer" }, "name": { "type": "string" } } });
        let out = run_filter(".properties | keys", &schema).unwrap();
        assert_eq!(out, vec![json!(["id", "name"])]);
    }

    #[test]
    fn bad_filter_is_an_error() {
        assert!(run_filter(".properties | no_such_fn", &json!({})).is_err());
    }
}
