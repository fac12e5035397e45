// src/blockchain/wallet.rs

use std::fmt;

use thiserror::Error;

use crate::utils::address_preview;

/// Length of a decoded ed25519 public key.
pub const PUBKEY_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid wallet address provided")]
    Missing,
    #[error("Ethereum address detected: {0}. Please connect a Solana wallet instead.")]
    EvmAddress(String),
    #[error("Invalid Solana address format: {address}. Error: {reason}")]
    InvalidFormat { address: String, reason: String },
}

impl WalletError {
    /// Short tag for logs; never includes the address.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::Missing => "missing",
            WalletError::EvmAddress(_) => "evm_address",
            WalletError::InvalidFormat { .. } => "invalid_format",
        }
    }
}

/// A Solana public key in base58 form that decodes to exactly 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletIdentity(String);

impl WalletIdentity {
    pub fn parse(address: &str) -> Result<Self, WalletError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(WalletError::Missing);
        }
        if address.starts_with("0x") {
            return Err(WalletError::EvmAddress(address.to_string()));
        }

        let decoded = bs58::decode(address)
            .into_vec()
            .map_err(|e| WalletError::InvalidFormat {
                address: address.to_string(),
                reason: e.to_string(),
            })?;
        if decoded.len() != PUBKEY_LEN {
            return Err(WalletError::InvalidFormat {
                address: address.to_string(),
                reason: format!("expected {} bytes, decoded {}", PUBKEY_LEN, decoded.len()),
            });
        }

        Ok(Self(address.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn preview(&self) -> String {
        address_preview(&self.0)
    }
}

impl fmt::Display for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
