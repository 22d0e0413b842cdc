//! Compiled contract artifacts (truffle build files)

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use crate::error::{ClientError, ClientResult};

/// ABI and creation bytecode of a contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    pub abi: Arc<Abi>,
    #[serde(default)]
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Read and parse a build file
    pub async fn load<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|source| {
            ClientError::ArtifactRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> ClientResult<Self> {
        let artifact: ContractArtifact = serde_json::from_str(content).map_err(|source| {
            ClientError::ArtifactParse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!(
            path = %path.display(),
            contract = artifact.contract_name.as_deref().unwrap_or("<unnamed>"),
            bytecode_len = artifact.bytecode.len(),
            "Loaded contract artifact"
        );

        Ok(artifact)
    }

    /// Name used in log lines
    pub fn display_name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or("contract")
    }
}
