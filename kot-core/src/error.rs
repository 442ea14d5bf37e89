//! Error types for Kot Core
//!
//! Error taxonomy for address, key and derivation operations.

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Kot Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network parameter error (unknown scheme, unrecognized header, ...)
    #[error(transparent)]
    Params(#[from] kot_params::Error),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Well-formed data belonging to a different network
    #[error("Wrong network: {0}")]
    WrongNetwork(String),

    /// Base58check checksum mismatch
    #[error("Invalid checksum: {0}")]
    InvalidChecksum(String),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid mnemonic
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Key derivation error
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Invalid derivation path
    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Check if error is a user-facing error (vs internal error)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_)
                | Error::WrongNetwork(_)
                | Error::InvalidChecksum(_)
                | Error::InvalidKey(_)
                | Error::InvalidMnemonic(_)
                | Error::InvalidPath(_)
                | Error::Params(kot_params::Error::UnknownScheme(_))
                | Error::Params(kot_params::Error::UnrecognizedVersion(_))
        )
    }

    /// Whether the input was rejected because it belongs to another network
    pub fn is_foreign_network(&self) -> bool {
        matches!(
            self,
            Error::WrongNetwork(_) | Error::Params(kot_params::Error::UnrecognizedVersion(_))
        )
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidAddress(_) | Error::InvalidChecksum(_) => {
                "The address is invalid. Please check and try again.".to_string()
            }
            Error::WrongNetwork(_) => {
                "This belongs to a different network than the one currently selected.".to_string()
            }
            Error::Params(kot_params::Error::UnrecognizedVersion(_)) => {
                "This extended key is not valid on the selected network.".to_string()
            }
            Error::Params(kot_params::Error::UnknownScheme(tag)) => {
                format!("'{tag}' is not a supported script type.")
            }
            Error::InvalidKey(_) => "The key is invalid. Please check and try again.".to_string(),
            Error::InvalidMnemonic(_) => {
                "The recovery phrase is invalid. Please check and try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidAddress(_) | Error::InvalidChecksum(_) => ErrorCategory::Address,
            Error::WrongNetwork(_) => ErrorCategory::Network,
            Error::InvalidKey(_)
            | Error::InvalidMnemonic(_)
            | Error::KeyDerivation(_)
            | Error::InvalidPath(_) => ErrorCategory::Keys,
            Error::Params(kot_params::Error::UnrecognizedVersion(_)) => ErrorCategory::Network,
            Error::Params(kot_params::Error::UnknownScheme(_)) => ErrorCategory::Keys,
            Error::Params(_) => ErrorCategory::Params,
            Error::Other(_) => ErrorCategory::Internal,
        }
    }
}

impl From<bip32::Error> for Error {
    fn from(e: bip32::Error) -> Self {
        Error::KeyDerivation(e.to_string())
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::InvalidKey(e.to_string())
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Address-related errors
    Address,
    /// Key-related errors
    Keys,
    /// Input from a different network
    Network,
    /// Network parameter errors
    Params,
    /// Internal/system errors
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Address => write!(f, "Address"),
            ErrorCategory::Keys => write!(f, "Keys"),
            ErrorCategory::Network => write!(f, "Network"),
            ErrorCategory::Params => write!(f, "Params"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}
