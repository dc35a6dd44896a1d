//! Contract interface descriptions for the token being served.
//!
//! This crate provides:
//! - The ERC20 JSON ABI artifact, embedded at compile time
//! - A loader for ABI artifacts supplied at runtime
//! - `sol!` declarations of the read-only ERC20 calls (selectors and typed encoding)
//!
//! The connector treats the JSON ABI as an opaque schema and only resolves
//! functions by name, so any token exposing the ERC20 read surface works.

pub mod token;

use alloy_json_abi::JsonAbi;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Standard ERC20 ABI shipped with the crate.
pub const ERC20_ABI_JSON: &str = include_str!("../abi/erc20.json");

#[derive(Error, Debug)]
pub enum AbiError {
    /// ABI file could not be read
    #[error("Failed to read ABI file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ABI content is not a valid JSON ABI
    #[error("Invalid ABI JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse the embedded ERC20 ABI.
pub fn erc20_abi() -> Result<JsonAbi, AbiError> {
    parse_abi(ERC20_ABI_JSON)
}

/// Parse a JSON ABI from a string.
pub fn parse_abi(json: &str) -> Result<JsonAbi, AbiError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a JSON ABI artifact from disk.
pub fn load_abi(path: impl AsRef<Path>) -> Result<JsonAbi, AbiError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| AbiError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_abi(&contents)
}
