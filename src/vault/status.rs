use std::fmt;

/// Lock state of the vault.  Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultStatus {
    /// No verifier persisted yet; `create` is the only way forward.
    Uninitialized,
    /// Verifier exists, no key material in memory.
    Locked,
    /// Key material in memory, verifier validated.
    Unlocked,
}

impl VaultStatus {
    pub fn is_unlocked(self) -> bool {
        self == Self::Unlocked
    }
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        };
        f.write_str(label)
    }
}
