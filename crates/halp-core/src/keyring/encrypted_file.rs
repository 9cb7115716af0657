//! Encrypted file backend using AES-256-GCM
//!
//! One file per service under the data directory. The file holds the base64
//! of `nonce || ciphertext`, where the plaintext is a JSON map of entries.
//! The encryption key is derived from the password callback, which halp
//! wires to the PIN already stored in the profile.

use super::backend::BackendKind;
use super::secret_backend::{Item, SecretBackend};
use super::services::ServiceDescriptor;
use crate::error::{Error, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supplies the file password; the argument is the prompt text
pub type PasswordCallback = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

const NONCE_LEN: usize = 12;
const KEY_SALT: &[u8] = b"halp-file-keyring-v1";

/// File-backed keyring for one service
pub struct EncryptedFileBackend {
    service: &'static str,
    path: PathBuf,
    password: PasswordCallback,
}

impl EncryptedFileBackend {
    /// Open the keyring file for a service inside `dir`
    ///
    /// Creates `dir` (owner-only on Unix) but does not touch the file until
    /// the first write.
    pub fn open(dir: &Path, service: &ServiceDescriptor, password: PasswordCallback) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| Error::BackendOpen {
            service: service.name.to_string(),
            message: format!("failed to create {}: {}", dir.display(), e),
        })?;

        // Set directory permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(dir, perms);
        }

        Ok(Self {
            service: service.name,
            path: dir.join(format!("{}.enc", service.name)),
            password,
        })
    }

    /// Path of the keyring file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Derive a 256-bit encryption key from the file password
    fn derive_encryption_key(&self) -> std::result::Result<[u8; 32], String> {
        let prompt = format!("Enter passphrase to unlock {}", self.path.display());
        let password = (self.password)(&prompt).map_err(|e| e.to_string())?;

        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(KEY_SALT);
        let result = hasher.finalize();

        let mut key = [0u8; 32];
        key.copy_from_slice(&result);
        Ok(key)
    }

    fn cipher(&self) -> std::result::Result<Aes256Gcm, String> {
        let key_bytes = self.derive_encryption_key()?;
        Aes256Gcm::new_from_slice(&key_bytes).map_err(|e| format!("Failed to create cipher: {}", e))
    }

    /// Encrypt data using AES-256-GCM
    fn encrypt_data(&self, plaintext: &[u8]) -> std::result::Result<Vec<u8>, String> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| format!("Encryption failed: {}", e))?;

        // Prepend nonce to ciphertext
        let mut result = nonce_bytes.to_vec();
        result.extend(ciphertext);
        Ok(result)
    }

    /// Decrypt data using AES-256-GCM
    fn decrypt_data(&self, encrypted: &[u8]) -> std::result::Result<Vec<u8>, String> {
        if encrypted.len() < NONCE_LEN {
            return Err("Invalid encrypted data".to_string());
        }

        let cipher = self.cipher()?;
        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        // A wrong PIN surfaces here as an authentication failure
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| "Decryption failed (wrong PIN?)".to_string())
    }

    /// Load all entries; a missing file is an empty keyring
    fn load_entries(&self) -> std::result::Result<HashMap<String, Item>, String> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let encrypted_b64 = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read keyring file: {}", e))?;

        let encrypted = BASE64
            .decode(encrypted_b64.trim())
            .map_err(|e| format!("Failed to decode keyring file: {}", e))?;

        let decrypted = self.decrypt_data(&encrypted)?;

        let entries: HashMap<String, Item> = serde_json::from_slice(&decrypted)
            .map_err(|e| format!("Failed to parse keyring file: {}", e))?;

        debug!(count = entries.len(), service = %self.service, "Loaded keyring file");
        Ok(entries)
    }

    /// Save all entries to the encrypted file
    fn save_entries(&self, entries: &HashMap<String, Item>) -> std::result::Result<(), String> {
        let json =
            serde_json::to_vec(entries).map_err(|e| format!("Failed to serialize entries: {}", e))?;

        let encrypted = self.encrypt_data(&json)?;
        let encoded = BASE64.encode(&encrypted);

        std::fs::write(&self.path, encoded)
            .map_err(|e| format!("Failed to write keyring file: {}", e))?;

        // Set file permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        debug!(path = %self.path.display(), "Saved keyring file");
        Ok(())
    }

    fn read_error(&self, message: String) -> Error {
        Error::BackendRead {
            service: self.service.to_string(),
            message,
        }
    }

    fn write_error(&self, message: String) -> Error {
        Error::BackendWrite {
            service: self.service.to_string(),
            message,
        }
    }
}

impl SecretBackend for EncryptedFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn get(&self, key: &str) -> Result<Option<Item>> {
        let mut entries = self.load_entries().map_err(|m| self.read_error(m))?;
        Ok(entries.remove(key))
    }

    fn set(&self, item: Item) -> Result<()> {
        // Never overwrite a file we failed to decrypt
        let mut entries = self.load_entries().map_err(|m| self.write_error(m))?;
        entries.insert(item.key.clone(), item);
        self.save_entries(&entries).map_err(|m| self.write_error(m))?;

        info!(service = %self.service, "Credential stored with AES-256-GCM encryption");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.load_entries().map_err(|m| self.write_error(m))?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.save_entries(&entries).map_err(|m| self.write_error(m))?;

        info!(service = %self.service, "Credential deleted from encrypted storage");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(value: &'static str) -> PasswordCallback {
        Box::new(move |_: &str| Ok(value.to_string()))
    }

    fn item(key: &str, data: &str) -> Item {
        Item::new(key, data, &ServiceDescriptor::TEMPO)
    }

    #[test]
    fn test_roundtrip_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let backend = EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::TEMPO, pin("123456"))
            .unwrap();
        backend.set(item("josh", "1893456000  secret")).unwrap();

        let reopened =
            EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::TEMPO, pin("123456"))
                .unwrap();
        let stored = reopened.get("josh").unwrap().unwrap();
        assert_eq!(stored.data, "1893456000  secret");
        assert_eq!(stored.label, "Tempo Token");
    }

    #[test]
    fn test_file_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let backend = EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::TEMPO, pin("123456"))
            .unwrap();
        backend.set(item("josh", "1893456000  plain-secret")).unwrap();

        let raw = std::fs::read_to_string(backend.path()).unwrap();
        assert!(!raw.contains("plain-secret"));
        assert!(backend
            .path()
            .ends_with("com.keyring.go.tempo.enc"));
    }

    #[test]
    fn test_wrong_pin_fails_to_read() {
        let dir = tempfile::tempdir().unwrap();
        EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::TEMPO, pin("123456"))
            .unwrap()
            .set(item("josh", "1893456000  secret"))
            .unwrap();

        let wrong = EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::TEMPO, pin("654321"))
            .unwrap();
        assert!(matches!(wrong.get("josh"), Err(Error::BackendRead { .. })));
        // The existing file must survive a write with the wrong PIN
        assert!(matches!(
            wrong.set(item("other", "1  x")),
            Err(Error::BackendWrite { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::JIRA, pin("123456"))
            .unwrap();

        assert!(backend.get("josh").unwrap().is_none());
        assert!(!backend.remove("josh").unwrap());
        assert!(!backend.path().exists());
    }

    #[test]
    fn test_remove_entry() {
        let dir = tempfile::tempdir().unwrap();
        let backend = EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::JIRA, pin("123456"))
            .unwrap();
        backend.set(item("josh", "1  a")).unwrap();
        backend.set(item("ann", "1  b")).unwrap();

        assert!(backend.remove("josh").unwrap());
        assert!(backend.get("josh").unwrap().is_none());
        assert!(backend.get("ann").unwrap().is_some());
    }

    #[test]
    fn test_password_callback_error() {
        let dir = tempfile::tempdir().unwrap();
        let failing: PasswordCallback = Box::new(|_| Err(Error::Prompt("no pin".to_string())));
        let backend =
            EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::JIRA, failing).unwrap();

        assert!(matches!(
            backend.set(item("josh", "1  a")),
            Err(Error::BackendWrite { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let backend = EncryptedFileBackend::open(dir.path(), &ServiceDescriptor::JIRA, pin("123456"))
            .unwrap();
        backend.set(item("josh", "1  a")).unwrap();

        let mode = std::fs::metadata(backend.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
