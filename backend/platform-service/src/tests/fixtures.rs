/// Test fixtures and helpers
///
/// In-memory implementations of `CredentialStore` and `ObjectStore` so the
/// rotation and compensation logic can be exercised without PostgreSQL or an
/// object store. The object store fake supports upload failure injection.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::security::password;
use crate::security::tokens::TokenIssuer;
use crate::services::sessions::{CredentialStore, Credentials, SessionService};
use crate::services::storage::{AssetKind, ObjectStore, StoredAsset};

pub const TEST_PASSWORD: &str = "StrongPassw0rd";

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::from_config(&AuthConfig {
        access_token_secret: "access-secret-for-tests".to_string(),
        access_token_ttl_minutes: 15,
        refresh_token_secret: "refresh-secret-for-tests".to_string(),
        refresh_token_ttl_days: 7,
    })
    .expect("test issuer should build")
}

struct AccountRecord {
    credentials: Credentials,
    identifier: String,
    refresh_token: Option<String>,
}

/// In-memory credential store with the same single-slot semantics as the
/// PostgreSQL implementation
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: Mutex<Vec<AccountRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, identifier: &str, password: &str) -> Uuid {
        let account_id = Uuid::new_v4();
        let password_hash = password::hash_password(password).expect("test password should hash");

        self.accounts.lock().unwrap().push(AccountRecord {
            credentials: Credentials {
                account_id,
                password_hash,
            },
            identifier: identifier.to_string(),
            refresh_token: None,
        });

        account_id
    }

    pub fn stored_refresh_token(&self, account_id: Uuid) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.credentials.account_id == account_id)
            .and_then(|account| account.refresh_token.clone())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_login(&self, identifier: &str) -> Result<Option<Credentials>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.identifier == identifier)
            .map(|account| account.credentials.clone()))
    }

    async fn replace_refresh_token(&self, account_id: Uuid, token: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts
            .iter_mut()
            .find(|account| account.credentials.account_id == account_id)
        {
            account.refresh_token = Some(token.to_string());
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        account_id: Uuid,
        presented: &str,
        replacement: &str,
    ) -> Result<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts
            .iter_mut()
            .find(|account| account.credentials.account_id == account_id)
        {
            Some(account) if account.refresh_token.as_deref() == Some(presented) => {
                account.refresh_token = Some(replacement.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, account_id: Uuid) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts
            .iter_mut()
            .find(|account| account.credentials.account_id == account_id)
        {
            account.refresh_token = None;
        }
        Ok(())
    }
}

/// Session service over a fresh in-memory store with one account registered
pub fn session_with_account(identifier: &str) -> (SessionService, Arc<InMemoryCredentialStore>, Uuid) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let account_id = store.add_account(identifier, TEST_PASSWORD);
    let service = SessionService::new(Arc::clone(&store) as Arc<dyn CredentialStore>, test_issuer());
    (service, store, account_id)
}

/// In-memory object store with upload failure injection
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, AssetKind>>,
    uploads_attempted: AtomicUsize,
    fail_uploads_from: usize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::failing_from(usize::MAX)
    }

    /// Uploads with zero-based index >= `n` fail
    pub fn failing_from(n: usize) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            uploads_attempted: AtomicUsize::new(0),
            fail_uploads_from: n,
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn uploads_attempted(&self) -> usize {
        self.uploads_attempted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        _data: bytes::Bytes,
        kind: AssetKind,
        _content_type: &str,
    ) -> Result<StoredAsset> {
        let attempt = self.uploads_attempted.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.fail_uploads_from {
            return Err(AppError::AssetUploadFailed(
                "injected upload failure".to_string(),
            ));
        }

        let key = format!("{}/{}", kind.key_prefix(), Uuid::new_v4());
        self.objects.lock().unwrap().insert(key.clone(), kind);

        Ok(StoredAsset {
            url: format!("https://assets.test/{key}"),
            key,
            kind,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
