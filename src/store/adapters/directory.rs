//! Directory-backed durable store adapter.

use crate::store::ports::{DurableStore, DurableStoreError, DurableStoreResult};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use sha2::{Digest, Sha256};
use std::io;
use std::sync::Arc;

const VALUE_EXTENSION: &str = ".val";
const STAGING_EXTENSION: &str = ".tmp";
const KEY_LENGTH_BYTES: usize = 4;

/// Durable store keeping one file per key inside a capability-scoped
/// directory.
///
/// Each file is named after the SHA-256 digest of its key, so names stay
/// short and never escape the directory whatever the key looks like. The file
/// holds the key (length-prefixed) followed by the value, which lets `list`
/// recover keys. Values are staged and renamed into place, so a crash
/// mid-write leaves either the old value or the new one.
#[derive(Debug, Clone)]
pub struct DirectoryDurableStore {
    dir: Arc<Dir>,
}

impl DirectoryDurableStore {
    /// Opens (creating when missing) the store directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`DurableStoreError::Persistence`] when the directory cannot be
    /// created or opened.
    pub fn open(root: &Utf8Path) -> DurableStoreResult<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(DurableStoreError::persistence)?;
        let dir =
            Dir::open_ambient_dir(root, ambient_authority()).map_err(DurableStoreError::persistence)?;
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(&self, operation: F) -> DurableStoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || operation(&dir))
            .await
            .map_err(DurableStoreError::persistence)?
            .map_err(DurableStoreError::persistence)
    }
}

fn file_stem(key: &str) -> DurableStoreResult<String> {
    if key.is_empty() {
        return Err(DurableStoreError::InvalidKey(key.to_owned()));
    }
    Ok(format!("{:x}", Sha256::digest(key.as_bytes())))
}

fn encode_record(key: &str, value: &[u8]) -> DurableStoreResult<Vec<u8>> {
    let key_length =
        u32::try_from(key.len()).map_err(|_| DurableStoreError::InvalidKey(key.to_owned()))?;
    let mut record = Vec::with_capacity(KEY_LENGTH_BYTES + key.len() + value.len());
    record.extend_from_slice(&key_length.to_le_bytes());
    record.extend_from_slice(key.as_bytes());
    record.extend_from_slice(value);
    Ok(record)
}

fn decode_record(record: &[u8]) -> Option<(&str, &[u8])> {
    let (length, rest) = record.split_first_chunk::<KEY_LENGTH_BYTES>()?;
    let key_length = usize::try_from(u32::from_le_bytes(*length)).ok()?;
    let (key, value) = rest.split_at_checked(key_length)?;
    Some((std::str::from_utf8(key).ok()?, value))
}

fn malformed(file_name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed store record '{file_name}'"),
    )
}

#[async_trait]
impl DurableStore for DirectoryDurableStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> DurableStoreResult<()> {
        let stem = file_stem(key)?;
        let record = encode_record(key, &bytes)?;
        self.blocking(move |dir| {
            let staged = format!("{stem}{STAGING_EXTENSION}");
            let target = format!("{stem}{VALUE_EXTENSION}");
            dir.write(&staged, &record)?;
            dir.rename(&staged, dir, &target)
        })
        .await
    }

    async fn get(&self, key: &str) -> DurableStoreResult<Option<Vec<u8>>> {
        let file_name = format!("{}{VALUE_EXTENSION}", file_stem(key)?);
        let wanted = key.to_owned();
        self.blocking(move |dir| {
            let record = match dir.read(&file_name) {
                Ok(record) => record,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(err),
            };
            let (stored_key, value) = decode_record(&record).ok_or_else(|| malformed(&file_name))?;
            Ok((stored_key == wanted).then(|| value.to_vec()))
        })
        .await
    }

    async fn delete(&self, key: &str) -> DurableStoreResult<()> {
        let file_name = format!("{}{VALUE_EXTENSION}", file_stem(key)?);
        self.blocking(move |dir| match dir.remove_file(&file_name) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        })
        .await
    }

    async fn list(&self, prefix: &str) -> DurableStoreResult<Vec<String>> {
        let prefix = prefix.to_owned();
        self.blocking(move |dir| {
            let mut keys = Vec::new();
            for entry in dir.entries()? {
                let file_name = entry?.file_name()?;
                if !file_name.ends_with(VALUE_EXTENSION) {
                    continue;
                }
                let record = dir.read(&file_name)?;
                let (key, _) = decode_record(&record).ok_or_else(|| malformed(&file_name))?;
                if key.starts_with(&prefix) {
                    keys.push(key.to_owned());
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }
}
