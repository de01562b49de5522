//! Terraform CLI driver.
//!
//! Sequences the engine through init, apply (or destroy) and structured
//! output queries inside the workspace. Runtime values reach the engine in
//! two ways: the project id is substituted into the declaration text
//! before it is written, and the public key travels as a typed input
//! variable so key material never lands in the declaration file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use skylift_core::command_stream::{capture_command, is_tool_installed, stream_command};
use skylift_core::error::{DeployError, Result};
use tracing::info;

use crate::Engine;

pub const ENGINE_BINARY: &str = "terraform";

/// Fixed filenames inside the workspace.
pub const DECLARATION_FILE: &str = "main.tf";
pub const BOOTSTRAP_SCRIPT_FILE: &str = "deploy.sh";

/// Input variable carrying the generated public key into the declaration.
pub const PUBLIC_KEY_VAR: &str = "ssh_public_key";

/// Output exposing the provisioned host's externally routable address.
pub const HOST_ADDRESS_OUTPUT: &str = "nat_ip";

/// Placeholder tokens the generation stage leaves in the declaration.
pub const PROJECT_ID_PLACEHOLDERS: [&str; 2] = ["YOUR_GCP_PROJECT_ID", "YOUR_GOOGLE_PROJECT_ID"];

/// Replaces every well-known placeholder with the real project id. The
/// declaration is never applied with a placeholder still present.
pub fn substitute_project_id(declaration: &str, project_id: &str) -> String {
    PROJECT_ID_PLACEHOLDERS
        .iter()
        .fold(declaration.to_string(), |text, placeholder| {
            text.replace(placeholder, project_id)
        })
}

/// One entry of `terraform output -json`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputValue {
    pub value: Value,
}

pub(crate) fn parse_outputs(json: &str) -> Result<IndexMap<String, OutputValue>> {
    Ok(serde_json::from_str(json)?)
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The real engine. Construction fails early when the binary is absent.
pub struct TerraformCli {
    workdir: PathBuf,
}

impl TerraformCli {
    pub fn new(workdir: &Path) -> Result<Self> {
        if !is_tool_installed(ENGINE_BINARY) {
            return Err(DeployError::ToolNotFound(ENGINE_BINARY.to_string()));
        }
        Ok(Self {
            workdir: workdir.to_path_buf(),
        })
    }
}

impl Engine for TerraformCli {
    fn initialize(&self) -> Result<()> {
        stream_command(ENGINE_BINARY, &["init", "-input=false"], &self.workdir)?;
        Ok(())
    }

    fn apply(&self, auto_approve: bool, vars: &[(&str, &str)]) -> Result<()> {
        let mut args = vec!["apply".to_string(), "-input=false".to_string()];
        if auto_approve {
            args.push("-auto-approve".to_string());
        }
        for (name, value) in vars {
            args.push(format!("-var={}={}", name, value));
        }
        stream_command(ENGINE_BINARY, &args, &self.workdir)?;
        info!("Terraform apply complete");
        Ok(())
    }

    fn destroy(&self, auto_approve: bool) -> Result<()> {
        let mut args = vec!["destroy"];
        if auto_approve {
            args.push("-auto-approve");
        }
        stream_command(ENGINE_BINARY, &args, &self.workdir)?;
        Ok(())
    }

    fn output_value(&self, name: &str) -> Result<String> {
        let json = capture_command(ENGINE_BINARY, &["output", "-json"], &self.workdir)?;
        let outputs = parse_outputs(&json)?;
        outputs
            .get(name)
            .map(|output| value_as_string(&output.value))
            .ok_or_else(|| DeployError::MissingOutput(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_replaces_every_placeholder() {
        let declaration = r#"
            provider "google" { project = "YOUR_GCP_PROJECT_ID" }
            resource "a" "b" { project = "YOUR_GOOGLE_PROJECT_ID" }
            # second mention: YOUR_GCP_PROJECT_ID
        "#;
        let substituted = substitute_project_id(declaration, "acme-prod-1234");
        for placeholder in PROJECT_ID_PLACEHOLDERS {
            assert!(!substituted.contains(placeholder));
        }
        assert_eq!(substituted.matches("acme-prod-1234").count(), 3);
    }

    #[test]
    fn substitution_without_placeholders_is_identity() {
        let declaration = "resource \"x\" \"y\" {}";
        assert_eq!(substitute_project_id(declaration, "p"), declaration);
    }

    #[test]
    fn outputs_parsing_extracts_value_wrapper() -> anyhow::Result<()> {
        let outputs = parse_outputs(
            r#"{"nat_ip": {"value": "203.0.113.5", "type": "string", "sensitive": false}}"#,
        )?;
        let nat_ip = outputs.get("nat_ip").expect("nat_ip present");
        assert_eq!(value_as_string(&nat_ip.value), "203.0.113.5");
        Ok(())
    }

    #[test]
    fn non_string_output_values_are_rendered_as_json() -> anyhow::Result<()> {
        let outputs = parse_outputs(r#"{"port": {"value": 5000}}"#)?;
        assert_eq!(value_as_string(&outputs["port"].value), "5000");
        Ok(())
    }
}
