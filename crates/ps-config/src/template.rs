//! Config template loading and per-instance rendering.

use crate::patch::{resolve, set_at};
use crate::{ConfigError, ConfigResult};
use ps_core::KeyPath;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// On-disk format of a config template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn parse(self, text: &str) -> ConfigResult<Value> {
        let doc = match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(doc)
    }

    pub fn render(self, doc: &Value) -> ConfigResult<String> {
        let text = match self {
            Self::Json => serde_json::to_string_pretty(doc)?,
            Self::Yaml => serde_yaml::to_string(doc)?,
        };
        Ok(text)
    }
}

/// An immutable base document plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigTemplate {
    source_path: PathBuf,
    format: ConfigFormat,
    document: Value,
}

impl ConfigTemplate {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document = format.parse(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), ?format, "loaded config template");

        Ok(Self {
            source_path: path.to_path_buf(),
            format,
            document,
        })
    }

    /// Template from an in-memory document. Relative path fields are rebased
    /// against the parent of `source_path`.
    pub fn from_document(source_path: PathBuf, format: ConfigFormat, document: Value) -> Self {
        Self {
            source_path,
            format,
            document,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn resolve(&self, path: &KeyPath) -> ConfigResult<&Value> {
        resolve(&self.document, path)
    }

    /// Check that every path resolves in the template.
    pub fn check_paths<'a>(&self, paths: impl IntoIterator<Item = &'a KeyPath>) -> ConfigResult<()> {
        for path in paths {
            self.resolve(path)?;
        }
        Ok(())
    }

    /// New document with each override written at its key path.
    pub fn patched<'a>(
        &self,
        overrides: impl IntoIterator<Item = (&'a KeyPath, &'a Value)>,
    ) -> ConfigResult<Value> {
        let mut doc = self.document.clone();
        for (path, value) in overrides {
            set_at(&mut doc, path, value.clone())?;
        }
        Ok(doc)
    }

    /// Rewrite relative path strings at `fields` so they still point at the
    /// same files once the document is written somewhere else.
    pub fn rebase_path_fields(&self, doc: &mut Value, fields: &[KeyPath]) -> ConfigResult<()> {
        let base = self
            .source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        for field in fields {
            let current = resolve(doc, field)?;
            let Some(text) = current.as_str() else {
                return Err(ConfigError::NotAPathString {
                    path: field.dotted(),
                });
            };
            let original = Path::new(text);
            if original.is_absolute() {
                continue;
            }
            let joined = base.join(original);
            let rebased = std::path::absolute(&joined).unwrap_or(joined);
            set_at(
                doc,
                field,
                Value::String(rebased.to_string_lossy().into_owned()),
            )?;
        }
        Ok(())
    }

    /// Write `doc` to `dest` in the template's format.
    pub fn write_document(&self, doc: &Value, dest: &Path) -> ConfigResult<()> {
        let text = self.format.render(doc)?;
        std::fs::write(dest, text).map_err(|e| ConfigError::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("b.YML")).unwrap(), ConfigFormat::Yaml);
        assert!(ConfigFormat::from_path(Path::new("b.toml")).is_err());
    }

    #[test]
    fn patched_leaves_template_untouched() {
        let template = ConfigTemplate::from_document(
            PathBuf::from("base.json"),
            ConfigFormat::Json,
            json!({"solver": {"gamma": 0.7, "beta": 1}}),
        );
        let gamma = KeyPath::parse("solver.gamma").unwrap();
        let value = json!(1.2);
        let doc = template.patched([(&gamma, &value)]).unwrap();
        assert_eq!(doc, json!({"solver": {"gamma": 1.2, "beta": 1}}));
        assert_eq!(template.document()["solver"]["gamma"], json!(0.7));
    }

    #[test]
    fn rebases_relative_path_fields() {
        let template = ConfigTemplate::from_document(
            PathBuf::from("/work/scenes/base.json"),
            ConfigFormat::Json,
            json!({"scenario": {"particles": "data/p.dat", "mesh": "/abs/mesh.obj"}}),
        );
        let mut doc = template.document().clone();
        let fields = [
            KeyPath::parse("scenario.particles").unwrap(),
            KeyPath::parse("scenario.mesh").unwrap(),
        ];
        template.rebase_path_fields(&mut doc, &fields).unwrap();
        assert_eq!(
            Path::new(doc["scenario"]["particles"].as_str().unwrap()),
            Path::new("/work/scenes/data/p.dat")
        );
        assert_eq!(doc["scenario"]["mesh"], json!("/abs/mesh.obj"));
    }

    #[test]
    fn rebase_rejects_non_string_fields() {
        let template = ConfigTemplate::from_document(
            PathBuf::from("base.json"),
            ConfigFormat::Json,
            json!({"n": 3}),
        );
        let mut doc = template.document().clone();
        let err = template
            .rebase_path_fields(&mut doc, &[KeyPath::parse("n").unwrap()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotAPathString { .. }));
    }

    #[test]
    fn yaml_round_trips_through_json_values() {
        let doc = ConfigFormat::Yaml
            .parse("solver:\n  gamma: 0.7\n  name: iisph\n")
            .unwrap();
        assert_eq!(doc, json!({"solver": {"gamma": 0.7, "name": "iisph"}}));
        let text = ConfigFormat::Yaml.render(&doc).unwrap();
        assert!(text.contains("gamma: 0.7"));
    }
}
