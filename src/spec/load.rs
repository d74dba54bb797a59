use crate::error::CliError;
use serde_json::Value;
use std::path::Path;

/// Load an OpenAPI 3.0 document from a YAML or JSON file, selected by
/// extension (`.yaml`/`.yml` vs everything else).
///
/// The document is kept as a generic [`Value`] tree: the only structural
/// requirement enforced here is that the top level is an object carrying a
/// `paths` key. No other OpenAPI 3.0 semantics are validated.
pub fn load_spec(path: impl AsRef<Path>) -> anyhow::Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(CliError::SpecNotFound(path.to_path_buf()))
        } else {
            anyhow::Error::new(e)
        }
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let value: Value = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| CliError::SpecParse {
            path: path.to_path_buf(),
            source: e.into(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| CliError::SpecParse {
            path: path.to_path_buf(),
            source: e.into(),
        })?
    };

    if !value.is_object() || value.get("paths").is_none() {
        return Err(CliError::SpecMissingPaths.into());
    }

    tracing::info!(path = %path.display(), "spec loaded");
    Ok(value)
}
