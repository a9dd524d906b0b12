//! Credential Vault Adapters

mod file;
mod in_memory;

pub use file::FileCredentialVault;
pub use in_memory::{AccountSeed, InMemoryCredentialVault, load_account_seeds};
