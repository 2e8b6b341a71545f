use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use ethers::{
    abi::{Abi, Token},
    types::{Address, Bytes, U256},
};
use serde::Deserialize;

pub const CORE_CONTRACT: &str = "SoundSphereCore";

/// Chainlink router the core contract reads from.
pub const DEFAULT_ROUTER: &str = "0x0bf3de8c5d3e8a2b34d2beeb17abfcebaf363a59";
pub const DEFAULT_MINIMUM_VALUE: u64 = 1;
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;

/// A compiled contract as emitted by Hardhat (`hh-sol-artifact-1`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: Option<String>,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read artifact {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse artifact {}", path.display()))
    }

    /// Finds `<name>.json` under the artifacts directory and loads it.
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self> {
        let path = locate(artifacts_dir, name)?;
        log::info!("using artifact {}", path.display());

        let artifact = Self::from_file(&path)?;
        if artifact.contract_name != name {
            bail!(
                "artifact {} describes {}, expected {}",
                path.display(),
                artifact.contract_name,
                name
            );
        }
        if artifact.bytecode.is_empty() {
            bail!("{} has no creation bytecode (abstract contract or interface?)", name);
        }
        log::debug!(
            "{} compiled from {}, {} bytes of creation code",
            name,
            artifact.source_name.as_deref().unwrap_or("unknown source"),
            artifact.bytecode.len()
        );
        Ok(artifact)
    }

    /// Checks constructor arguments against the ABI before anything is sent.
    pub fn check_constructor_args(&self, args: &[Token]) -> Result<()> {
        let inputs = match self.abi.constructor() {
            Some(constructor) => constructor.inputs.as_slice(),
            None if args.is_empty() => return Ok(()),
            None => bail!(
                "{} has no constructor but {} arguments were given",
                self.contract_name,
                args.len()
            ),
        };

        if inputs.len() != args.len() {
            bail!(
                "{} constructor takes {} arguments, got {}",
                self.contract_name,
                inputs.len(),
                args.len()
            );
        }
        for (param, arg) in inputs.iter().zip(args) {
            if !arg.type_check(&param.kind) {
                bail!(
                    "constructor argument `{}` expects {}, got {:?}",
                    param.name,
                    param.kind,
                    arg
                );
            }
        }
        Ok(())
    }
}

fn locate(artifacts_dir: &Path, name: &str) -> Result<PathBuf> {
    let file_name = format!("{name}.json");
    let mut found = Vec::new();
    collect(artifacts_dir, &file_name, &mut found)
        .with_context(|| format!("failed to scan {}", artifacts_dir.display()))?;

    match found.len() {
        0 => Err(anyhow!(
            "artifact for {} not found under {} (compile the contracts first)",
            name,
            artifacts_dir.display()
        )),
        1 => Ok(found.remove(0)),
        _ => Err(anyhow!(
            "artifact name {} is ambiguous: {}",
            name,
            found
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn collect(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            found.push(path);
        }
    }
    Ok(())
}

/// Constructor arguments of `SoundSphereCore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreArgs {
    pub router: Address,
    pub minimum_value: u64,
    pub interval_seconds: u64,
}

impl CoreArgs {
    pub fn tokens(&self) -> Vec<Token> {
        vec![
            Token::Address(self.router),
            Token::Uint(U256::from(self.minimum_value)),
            Token::Uint(U256::from(self.interval_seconds)),
        ]
    }
}
