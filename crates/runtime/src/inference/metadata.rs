//! Off-chain warrior metadata: personality and move display names.

use std::collections::HashMap;
use std::path::Path;

use arena_core::{Move, WarriorId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid warrior id `{0}` in metadata")]
    InvalidWarrior(String),
}

/// What the orchestrator knows about a warrior beyond its on-chain traits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarriorProfile {
    #[serde(default)]
    pub name: Option<String>,

    /// Free-text personality handed to the inference service.
    #[serde(default)]
    pub personality: Option<String>,

    /// Display names keyed by canonical move token (`strike`, `special_move`, ...).
    #[serde(default)]
    pub moves: HashMap<String, String>,
}

impl WarriorProfile {
    pub fn move_name(&self, mv: Move) -> Option<&str> {
        self.moves.get(mv.token()).map(String::as_str)
    }

    /// Move whose display name is `name`, ignoring case and outer whitespace.
    pub fn move_for_name(&self, name: &str) -> Option<Move> {
        let name = name.trim();
        Move::iter().find(|mv| {
            self.move_name(*mv)
                .is_some_and(|display| display.trim().eq_ignore_ascii_case(name))
        })
    }
}

/// Source of warrior profiles.
///
/// `Ok(None)` means the warrior is unknown to the source; callers fall back to
/// defaults.
#[async_trait]
pub trait WarriorMetadataSource: Send + Sync {
    async fn profile(&self, warrior: WarriorId) -> Result<Option<WarriorProfile>, MetadataError>;
}

/// Source that knows no warriors.
pub struct NoMetadata;

#[async_trait]
impl WarriorMetadataSource for NoMetadata {
    async fn profile(&self, _warrior: WarriorId) -> Result<Option<WarriorProfile>, MetadataError> {
        Ok(None)
    }
}

/// Profiles loaded once from a JSON object keyed by warrior id:
///
/// ```json
/// { "1": { "name": "Ash", "personality": "reckless", "moves": { "strike": "Ember Jab" } } }
/// ```
#[derive(Debug, Default)]
pub struct JsonMetadataSource {
    profiles: HashMap<WarriorId, WarriorProfile>,
}

impl JsonMetadataSource {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&raw).map_err(|err| match err {
            MetadataError::Parse { source, .. } => MetadataError::Parse {
                path: display,
                source,
            },
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, MetadataError> {
        let parsed: HashMap<String, WarriorProfile> =
            serde_json::from_str(raw).map_err(|source| MetadataError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;

        let profiles = parsed
            .into_iter()
            .map(|(key, profile)| {
                let id = key
                    .trim()
                    .trim_start_matches('#')
                    .parse::<u64>()
                    .map_err(|_| MetadataError::InvalidWarrior(key.clone()))?;
                Ok((WarriorId(id), profile))
            })
            .collect::<Result<_, MetadataError>>()?;

        Ok(Self { profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl WarriorMetadataSource for JsonMetadataSource {
    async fn profile(&self, warrior: WarriorId) -> Result<Option<WarriorProfile>, MetadataError> {
        Ok(self.profiles.get(&warrior).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r##"{
        "1": { "name": "Ash", "personality": "reckless", "moves": { "special_move": "Inferno" } },
        "#2": { "personality": "patient" }
    }"##;

    #[tokio::test]
    async fn loads_profiles_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = JsonMetadataSource::from_path(file.path()).unwrap();
        assert_eq!(source.len(), 2);

        let ash = source.profile(WarriorId(1)).await.unwrap().unwrap();
        assert_eq!(ash.move_name(Move::Special), Some("Inferno"));
        assert_eq!(ash.move_name(Move::Strike), None);

        let second = source.profile(WarriorId(2)).await.unwrap().unwrap();
        assert_eq!(second.personality.as_deref(), Some("patient"));
        assert!(source.profile(WarriorId(3)).await.unwrap().is_none());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonMetadataSource::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }

    #[test]
    fn non_numeric_keys_are_rejected() {
        let err = JsonMetadataSource::from_json(r#"{ "ash": {} }"#).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidWarrior(key) if key == "ash"));
    }
}
