//! Scratch-file store backing playable audio handles.
//!
//! Every take the pad holds is a file in a per-process scratch directory.
//! An [`AudioHandle`] owns exactly one of those files and deletes it when
//! dropped, so releasing the last reference to a take also releases its
//! storage. The store itself removes the whole directory on teardown.

use anyhow::{anyhow, Result};
use hound::WavWriter;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Owner of the scratch directory where take audio lives.
///
/// Paths are handed out through [`AudioHandle`]s only; nothing else should
/// create files under the store root.
pub struct HandleStore {
    root: PathBuf,
    next_seq: AtomicU64,
}

impl HandleStore {
    /// Creates a store in the system temp directory, namespaced by process id.
    pub fn new() -> Result<Self> {
        let root = std::env::temp_dir().join(format!("voxpad-{}", std::process::id()));
        Self::at(root)
    }

    /// Creates a store rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| anyhow!("Failed to create scratch directory {}: {e}", root.display()))?;
        tracing::debug!("Scratch directory ready: {}", root.display());
        Ok(Self {
            root,
            next_seq: AtomicU64::new(0),
        })
    }

    /// Returns the scratch directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes mono PCM samples as a WAV file and returns the owning handle.
    ///
    /// # Errors
    /// - If the WAV file cannot be created or written
    pub fn create_wav(&self, samples: &[i16], sample_rate: u32) -> Result<AudioHandle> {
        let path = self.next_path("wav");

        let wav_spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::create(&path, wav_spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        tracing::debug!("WAV handle created: {}", path.display());
        Ok(AudioHandle::new(path))
    }

    /// Copies an external file into the store and returns the owning handle.
    ///
    /// The source keeps its extension so players and exports see the right
    /// container format.
    ///
    /// # Errors
    /// - If the source cannot be read or the copy fails
    pub fn adopt_copy(&self, source: &Path) -> Result<AudioHandle> {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let path = self.next_path(&extension);

        fs::copy(source, &path)
            .map_err(|e| anyhow!("Could not read file {}: {e}", source.display()))?;

        tracing::debug!(
            "Adopted copy of {} as {}",
            source.display(),
            path.display()
        );
        Ok(AudioHandle::new(path))
    }

    fn next_path(&self, extension: &str) -> PathBuf {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!("take-{seq:04}.{extension}"))
    }
}

impl Drop for HandleStore {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.root) {
            tracing::debug!(
                "Failed to remove scratch directory {}: {}",
                self.root.display(),
                e
            );
        }
    }
}

/// Owning reference to one audio file in the scratch store.
///
/// Dropping the handle deletes the file. Clones are deliberately not
/// supported; a take's audio has exactly one owner at a time.
#[derive(Debug)]
pub struct AudioHandle {
    path: PathBuf,
}

impl AudioHandle {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File extension of the backing file, without the dot.
    pub fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
    }

    /// File size in bytes, if the file is still readable.
    pub fn size_bytes(&self) -> Option<u64> {
        fs::metadata(&self.path).map(|m| m.len()).ok()
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::debug!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_wav_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let handle = store.create_wav(&[0i16; 320], 16000).unwrap();
        assert!(handle.path().exists());
        assert_eq!(handle.extension(), "wav");
        assert!(handle.size_bytes().unwrap() > 0);
    }

    #[test]
    fn test_drop_removes_backing_file() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let handle = store.create_wav(&[100i16; 160], 16000).unwrap();
        let path = handle.path().to_path_buf();
        assert!(path.exists());

        drop(handle);
        assert!(!path.exists());
    }

    #[test]
    fn test_adopt_copy_keeps_extension_and_source() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let source = dir.path().join("memo.MP3");
        fs::write(&source, b"not really audio").unwrap();

        let handle = store.adopt_copy(&source).unwrap();
        assert_eq!(handle.extension(), "mp3");
        assert!(handle.path().exists());
        // Source stays untouched; the handle owns a copy.
        assert!(source.exists());

        drop(handle);
        assert!(source.exists());
    }

    #[test]
    fn test_adopt_copy_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let result = store.adopt_copy(&dir.path().join("nope.wav"));
        assert!(result.is_err());
    }

    #[test]
    fn test_store_drop_removes_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("scratch");
        let store = HandleStore::at(&root).unwrap();
        assert!(root.exists());

        drop(store);
        assert!(!root.exists());
    }

    #[test]
    fn test_handles_get_distinct_paths() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let a = store.create_wav(&[0i16; 16], 16000).unwrap();
        let b = store.create_wav(&[0i16; 16], 16000).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
