//! Decoding of raw file content into typed configuration.

use crate::core::File;
use crate::error::{Result, WatcherError};
use serde::de::DeserializeOwned;

/// Structured-text format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.yml` / `.yaml`
    Yaml,
    /// `.json`
    Json,
}

impl Format {
    /// Map a file extension (with leading dot) to its format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".yml" | ".yaml" => Some(Self::Yaml),
            ".json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Decode a file's content into `T` using the parser matching its extension.
///
/// # Errors
///
/// - [`WatcherError::UnsupportedExtension`] for anything but YAML or JSON
/// - [`WatcherError::Decode`] if the content does not parse into `T`
pub fn decode<T: DeserializeOwned>(file: &File) -> Result<T> {
    let format = Format::from_extension(&file.extension).ok_or_else(|| {
        WatcherError::UnsupportedExtension {
            id: file.id.clone(),
            extension: file.extension.clone(),
        }
    })?;

    let decoded = match format {
        Format::Yaml => serde_yaml::from_str(&file.content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(&file.content).map_err(|e| e.to_string()),
    };

    decoded.map_err(|message| WatcherError::Decode {
        id: file.id.clone(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Member {
        name: String,
        role: String,
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension(".yml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension(".yaml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension(".json"), Some(Format::Json));
        assert_eq!(Format::from_extension(".toml"), None);
        assert_eq!(Format::from_extension(""), None);
    }

    #[test]
    fn test_decode_yaml() {
        let file = File::from_entry("member.yml", "oid", "name: oklahomer\nrole: member\n");
        let member: Member = decode(&file).unwrap();
        assert_eq!(member.name, "oklahomer");
        assert_eq!(member.role, "member");
    }

    #[test]
    fn test_decode_json() {
        let file = File::from_entry("member.json", "oid", r#"{"name":"oklahomer","role":"owner"}"#);
        let member: Member = decode(&file).unwrap();
        assert_eq!(member.role, "owner");
    }

    #[test]
    fn test_decode_unsupported_extension() {
        let file = File::from_entry("member.txt", "oid", "name: x");
        let err = decode::<Member>(&file).unwrap_err();
        match err {
            WatcherError::UnsupportedExtension { id, extension } => {
                assert_eq!(id, "member");
                assert_eq!(extension, ".txt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed() {
        let file = File::from_entry("member.json", "oid", "{not json");
        assert!(matches!(
            decode::<Member>(&file),
            Err(WatcherError::Decode { .. })
        ));
    }
}
