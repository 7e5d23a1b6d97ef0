use serde::de::DeserializeOwned;

/// Deserialization failure with the JSON path where it happened.
#[derive(Debug, thiserror::Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl From<serde_path_to_error::Error<serde_json::Error>> for PathError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        Self { path, message: err.into_inner().to_string() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, PathError> {
    Ok(serde_path_to_error::deserialize::<_, T>(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Doc {
        #[allow(unused)]
        entries: Vec<Entry>,
    }

    #[derive(Debug, Deserialize)]
    struct Entry {
        #[allow(unused)]
        size: u32,
    }

    #[test]
    fn error_names_the_failing_path() {
        let err = from_str_with_path::<Doc>(r#"{ "entries": [ { "size": 1 }, { "size": "big" } ] }"#).unwrap_err();
        assert_eq!(err.path, "entries[1].size");
        assert!(err.to_string().starts_with("at JSON path entries[1].size"));
    }

    #[test]
    fn values_deserialize_too() {
        let err = from_value_with_path::<Doc>(serde_json::json!({ "entries": [{}] })).unwrap_err();
        assert!(err.path.starts_with("entries[0]"), "{}", err.path);
        assert!(err.message.contains("size"));
    }
}
