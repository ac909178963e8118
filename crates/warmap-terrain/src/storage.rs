//! Named byte-blob storage for map files.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

/// Where map buffers come from and go to.
pub trait MapStorage {
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()>;
    fn exists(&self, name: &str) -> bool;
}

/// Files under a root directory.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a stored blob.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl MapStorage for DirStorage {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.path_of(name);
        debug!("reading {}", path.display());
        fs::read(path)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        let path = self.path_of(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("writing {} bytes to {}", data.len(), path.display());
        fs::write(path, data)
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }
}

/// In-memory storage, for tools and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapStorage for MemoryStorage {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no blob named {name}")))
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        self.blobs.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }
}
