pub mod keys;

pub use keys::{
    require_key, seed_from_settings, ApiKeyKind, FileKeyStore, KeyStore, MemoryKeyStore, MissingApiKey,
};
