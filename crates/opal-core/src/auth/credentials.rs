use keyring::Entry;
use tracing::debug;

use super::{AuthRecord, AuthStore, StoreError};

/// Default keychain service name
pub const SERVICE_NAME: &str = "opal";

/// Keeps the whole auth record as the secret of one OS keychain entry.
pub struct KeychainAuthStore {
    entry: Entry,
    account: String,
}

impl KeychainAuthStore {
    /// Open the keychain entry for `account` under `service`.
    pub fn new(service: &str, account: &str) -> Result<Self, StoreError> {
        let entry = Entry::new(service, account)?;
        Ok(Self {
            entry,
            account: account.to_string(),
        })
    }

    fn location(&self) -> String {
        format!("keychain entry for {}", self.account)
    }

    /// Remove the stored record
    pub fn delete(&self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a record exists
    pub fn has_record(&self) -> bool {
        self.entry.get_password().is_ok()
    }
}

impl AuthStore for KeychainAuthStore {
    fn load(&self) -> Result<AuthRecord, StoreError> {
        let secret = match self.entry.get_password() {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => {
                return Err(StoreError::NotFound {
                    location: self.location(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let record: AuthRecord =
            serde_json::from_str(&secret).map_err(|source| StoreError::Corrupt {
                location: self.location(),
                source,
            })?;
        debug!(account = %self.account, cookies = record.cookies.len(), "Loaded auth record from keychain");
        Ok(record)
    }

    fn save(&self, record: &AuthRecord) -> Result<(), StoreError> {
        let secret = serde_json::to_string(record).map_err(StoreError::Serialize)?;
        self.entry.set_password(&secret)?;
        debug!(account = %self.account, cookies = record.cookies.len(), "Saved auth record to keychain");
        Ok(())
    }
}
