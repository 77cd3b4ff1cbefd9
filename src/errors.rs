use thiserror::Error;

/// All errors that can occur in CredVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed: wrong key or tampered data")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault state errors ---
    #[error("Vault is locked")]
    VaultLocked,

    #[error("Invalid master password")]
    InvalidPassword,

    #[error("Vault is already initialized")]
    AlreadyInitialized,

    #[error("Vault has not been created yet")]
    NotInitialized,

    #[error("Vault setup was cancelled")]
    SetupCancelled,

    #[error("Vault unlock was cancelled")]
    UnlockCancelled,

    #[error("Credential '{0}' is corrupted and cannot be decrypted; re-enter it")]
    CorruptRecord(String),

    #[error("Vault reset requires explicit confirmation")]
    ResetNotConfirmed,

    #[error("Invalid credential id: {0}")]
    InvalidCredentialId(String),

    #[error("No credential stored under '{0}'")]
    CredentialNotFound(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Coarse grouping of failures, used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The user declined a prompt. Expected; not an application error.
    UserDeclined,
    /// Wrong master password. Recoverable by prompting again.
    Authentication,
    /// Lock-state mismatch. Recoverable through one unlock-and-retry.
    State,
    /// A stored record failed to decrypt. Needs user intervention.
    DataIntegrity,
    /// Anything else: I/O, storage, configuration, crypto plumbing.
    Internal,
}

impl VaultError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SetupCancelled | Self::UnlockCancelled => ErrorCategory::UserDeclined,
            Self::InvalidPassword => ErrorCategory::Authentication,
            Self::VaultLocked | Self::AlreadyInitialized | Self::NotInitialized => {
                ErrorCategory::State
            }
            Self::CorruptRecord(_) => ErrorCategory::DataIntegrity,
            _ => ErrorCategory::Internal,
        }
    }

    /// Returns `true` for the two prompt-declined outcomes.
    pub fn is_cancellation(&self) -> bool {
        self.category() == ErrorCategory::UserDeclined
    }
}

/// Lets the unlock coordinator recognise a "vault is locked" failure
/// inside a caller's own error type without inspecting message text.
pub trait LockAware {
    fn is_vault_locked(&self) -> bool;
}

impl LockAware for VaultError {
    fn is_vault_locked(&self) -> bool {
        matches!(self, Self::VaultLocked)
    }
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
