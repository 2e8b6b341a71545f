use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use ethers::{
    signers::LocalWallet,
    types::Address,
    utils::{hex, to_checksum},
};

/// Parses a 20-byte hex address. Mixed-case input must be a valid EIP-55 checksum.
pub fn parse_address(s: &str) -> Result<Address> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid address {s}: expected 40 hex digits");
    }

    let address = Address::from_str(digits).map_err(|e| anyhow!("invalid address {s}: {e}"))?;

    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case && &to_checksum(&address, None)[2..] != digits {
        bail!("invalid address {s}: bad checksum");
    }
    Ok(address)
}

pub fn parse_wallet(sk: &str) -> Result<LocalWallet> {
    let bytes = hex::decode(sk.strip_prefix("0x").unwrap_or(sk))
        .map_err(|_| anyhow!("private key is not valid hex"))?;
    if bytes.len() != 32 {
        bail!("private key must be 32 bytes, got {}", bytes.len());
    }
    LocalWallet::from_bytes(&bytes).map_err(|e| anyhow!("invalid private key: {e}"))
}

pub fn display_address(address: Address) -> String {
    to_checksum(&address, None)
}
