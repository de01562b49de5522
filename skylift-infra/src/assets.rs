//! The deployment assets document produced by the upstream generation
//! stage. The orchestrator treats both members as opaque text: they are
//! written verbatim (after placeholder substitution) and never parsed.

use indexmap::IndexMap;
use serde::Deserialize;
use skylift_core::error::{DeployError, Result};

/// The infrastructure declaration as it arrives from upstream: either a
/// single text blob or a keyed collection of named files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeclarationSource {
    Inline(String),
    Keyed(IndexMap<String, String>),
}

impl DeclarationSource {
    /// Returns the declaration text. The keyed form deterministically
    /// selects the first member; this is a narrow compatibility behavior,
    /// not a multi-file feature.
    pub fn text(&self) -> Result<&str> {
        match self {
            DeclarationSource::Inline(text) => Ok(text),
            DeclarationSource::Keyed(files) => files
                .values()
                .next()
                .map(String::as_str)
                .ok_or_else(|| {
                    DeployError::Config("Declaration file collection is empty".to_string())
                }),
        }
    }
}

/// Immutable pair of generated artifacts plus the upstream analysis
/// reference (the exposed network port).
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentAssets {
    #[serde(rename = "terraform_code")]
    pub declaration: DeclarationSource,
    #[serde(rename = "deployment_script")]
    pub bootstrap_script: String,
    #[serde(default)]
    pub exposed_port: Option<u16>,
}

impl DeploymentAssets {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_declaration_round_trips() -> anyhow::Result<()> {
        let assets = DeploymentAssets::from_json(
            r##"{
                "terraform_code": "resource \"x\" \"y\" {}",
                "deployment_script": "#!/bin/bash\necho hi",
                "exposed_port": 5000
            }"##,
        )?;
        assert_eq!(assets.declaration.text()?, "resource \"x\" \"y\" {}");
        assert_eq!(assets.exposed_port, Some(5000));
        Ok(())
    }

    #[test]
    fn keyed_declaration_selects_first_member() -> anyhow::Result<()> {
        let assets = DeploymentAssets::from_json(
            r#"{
                "terraform_code": {"main": "first file", "extra": "second file"},
                "deployment_script": "echo"
            }"#,
        )?;
        assert_eq!(assets.declaration.text()?, "first file");
        Ok(())
    }

    #[test]
    fn empty_keyed_declaration_is_a_config_error() {
        let source = DeclarationSource::Keyed(IndexMap::new());
        assert!(matches!(source.text(), Err(DeployError::Config(_))));
    }

    #[test]
    fn exposed_port_is_optional() -> anyhow::Result<()> {
        let assets = DeploymentAssets::from_json(
            r#"{"terraform_code": "x", "deployment_script": "y"}"#,
        )?;
        assert_eq!(assets.exposed_port, None);
        Ok(())
    }
}
