//! Uniform streaming access to release archives
//!
//! Two container formats are supported: zip and xz-compressed tar. The
//! format is chosen from the file name alone; a path ending in `.zip` is
//! read as zip and anything else as tar.xz.
//!
//! ```no_run
//! use aqua_update::archive::{ArchiveOptions, ArchiveReader};
//! use std::io::Read;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = ArchiveReader::open("release.tar.xz".as_ref(), &ArchiveOptions::default())?;
//! let mut entries = reader.entries()?;
//! while let Some(mut entry) = entries.next_entry()? {
//!     let mut content = Vec::new();
//!     entry.read_to_end(&mut content)?;
//!     println!("{} ({} bytes)", entry.name(), content.len());
//! }
//! drop(entries);
//! reader.close();
//! # Ok(())
//! # }
//! ```

pub mod progress;
mod tar_xz;
mod zip_reader;

pub use progress::{ProgressBarObserver, ProgressObserver, ProgressReader};
pub use tar_xz::{TarXzArchiveReader, TarXzEntries};
pub use zip_reader::{ZipArchiveReader, ZipEntries};

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Default xz decode window (1 MiB)
pub const DEFAULT_DICT_CAPACITY: usize = 1024 * 1024;

/// Default cap on an entry body read into memory (256 MiB)
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// Errors raised while reading an archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to open archive {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] ::zip::result::ZipError),

    #[error("xz decoder error: {0}")]
    Xz(#[from] xz2::stream::Error),

    #[error("archive entry {name} exceeds {limit} bytes")]
    EntryTooLarge { name: String, limit: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reader settings shared by both formats
#[derive(Clone)]
pub struct ArchiveOptions {
    /// Buffer window for the decompressed xz stream
    pub dict_capacity: usize,

    /// Cap for [`ArchiveEntry::read_limited`]
    pub max_entry_bytes: u64,

    /// Receives per-entry extraction progress
    pub observer: Option<Arc<dyn ProgressObserver>>,
}

impl ArchiveOptions {
    pub fn with_dict_capacity(mut self, dict_capacity: usize) -> Self {
        self.dict_capacity = dict_capacity;
        self
    }

    pub fn with_max_entry_bytes(mut self, max_entry_bytes: u64) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            dict_capacity: DEFAULT_DICT_CAPACITY,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            observer: None,
        }
    }
}

impl fmt::Debug for ArchiveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveOptions")
            .field("dict_capacity", &self.dict_capacity)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// A named entry whose content streams from the owning archive.
///
/// The borrow ends when the entry is dropped, so the next call to
/// [`ArchiveEntries::next_entry`] cannot overlap it.
pub struct ArchiveEntry<'a> {
    name: String,
    size: u64,
    reader: Box<dyn Read + 'a>,
}

impl<'a> ArchiveEntry<'a> {
    fn new<R: Read + 'a>(
        name: String,
        size: u64,
        inner: R,
        options: &ArchiveOptions,
    ) -> Self {
        let reader: Box<dyn Read + 'a> = match &options.observer {
            Some(observer) => Box::new(ProgressReader::new(inner, &name, size, observer.clone())),
            None => Box::new(inner),
        };
        Self { name, size, reader }
    }

    /// Entry path as stored in the archive
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size declared by the archive header. Not trusted for allocation.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the whole body, failing once more than `limit` bytes arrive
    pub fn read_limited(&mut self, limit: u64) -> Result<Vec<u8>, ArchiveError> {
        let mut data = Vec::new();
        self.by_ref()
            .take(limit.saturating_add(1))
            .read_to_end(&mut data)?;

        if data.len() as u64 > limit {
            return Err(ArchiveError::EntryTooLarge {
                name: self.name.clone(),
                limit,
            });
        }
        Ok(data)
    }
}

impl Read for ArchiveEntry<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

/// Archive reader over either supported container format
pub enum ArchiveReader {
    Zip(ZipArchiveReader),
    TarXz(TarXzArchiveReader),
}

impl ArchiveReader {
    /// Open `path`, picking the format from its suffix
    pub fn open(path: &Path, options: &ArchiveOptions) -> Result<Self, ArchiveError> {
        if is_zip(path) {
            Ok(Self::Zip(ZipArchiveReader::open(path, options)?))
        } else {
            Ok(Self::TarXz(TarXzArchiveReader::open(path, options)?))
        }
    }

    /// Walk the file entries. A closed reader yields nothing.
    ///
    /// Tar archives stream forward only, so a second walk over the same
    /// tar.xz reader is an error.
    pub fn entries(&mut self) -> Result<ArchiveEntries<'_>, ArchiveError> {
        let entries = match self {
            Self::Zip(reader) => reader.entries().map(ArchiveEntries::Zip),
            Self::TarXz(reader) => reader.entries()?.map(ArchiveEntries::TarXz),
        };
        Ok(entries.unwrap_or(ArchiveEntries::Closed))
    }

    /// Release file handles. Safe to call more than once.
    pub fn close(&mut self) {
        match self {
            Self::Zip(reader) => reader.close(),
            Self::TarXz(reader) => reader.close(),
        }
    }
}

/// Cursor over the file entries of an open archive
pub enum ArchiveEntries<'a> {
    Zip(ZipEntries<'a>),
    TarXz(TarXzEntries<'a>),
    Closed,
}

impl ArchiveEntries<'_> {
    /// Advance to the next file entry. Exhaustion yields `Ok(None)`.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>, ArchiveError> {
        match self {
            Self::Zip(entries) => entries.next_entry(),
            Self::TarXz(entries) => entries.next_entry(),
            Self::Closed => Ok(None),
        }
    }
}

fn is_zip(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".zip")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selection_by_suffix() {
        assert!(is_zip(Path::new("/tmp/aqua-speed-windows-x64.zip")));
        assert!(!is_zip(Path::new("/tmp/aqua-speed-linux-x64.tar.xz")));
        assert!(!is_zip(Path::new("/tmp/archive.zip.tar.xz")));
        assert!(!is_zip(Path::new("/tmp/archive")));
    }

    #[test]
    fn test_options_builder() {
        let options = ArchiveOptions::default()
            .with_dict_capacity(4096)
            .with_max_entry_bytes(10);
        assert_eq!(options.dict_capacity, 4096);
        assert_eq!(options.max_entry_bytes, 10);
        assert!(options.observer.is_none());
    }

    #[test]
    fn test_read_limited() {
        let options = ArchiveOptions::default();
        let mut entry = ArchiveEntry::new("bin".into(), 1 << 50, &b"12345"[..], &options);
        assert_eq!(entry.read_limited(5).unwrap(), b"12345");

        let mut entry = ArchiveEntry::new("bin".into(), 5, &b"123456"[..], &options);
        match entry.read_limited(5).unwrap_err() {
            ArchiveError::EntryTooLarge { name, limit } => {
                assert_eq!(name, "bin");
                assert_eq!(limit, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
