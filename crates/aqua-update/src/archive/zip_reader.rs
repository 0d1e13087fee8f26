//! Zip archive reader

use super::{ArchiveEntry, ArchiveError, ArchiveOptions};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

type ZipFileArchive = ZipArchive<BufReader<File>>;

/// Random-access zip archive; dropped on close
pub struct ZipArchiveReader {
    archive: Option<ZipFileArchive>,
    options: ArchiveOptions,
}

impl ZipArchiveReader {
    pub fn open(path: &Path, options: &ArchiveOptions) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = ZipArchive::new(BufReader::new(file))?;

        Ok(Self {
            archive: Some(archive),
            options: options.clone(),
        })
    }

    /// Entries in central directory order, or `None` once closed
    pub fn entries(&mut self) -> Option<ZipEntries<'_>> {
        let archive = self.archive.as_mut()?;
        Some(ZipEntries {
            archive,
            index: 0,
            options: &self.options,
        })
    }

    pub fn close(&mut self) {
        self.archive = None;
    }
}

/// Walks zip entries by index, skipping directories
pub struct ZipEntries<'a> {
    archive: &'a mut ZipFileArchive,
    index: usize,
    options: &'a ArchiveOptions,
}

impl ZipEntries<'_> {
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>, ArchiveError> {
        while self.index < self.archive.len() {
            let i = self.index;
            self.index += 1;
            if self.archive.by_index_raw(i)?.is_dir() {
                continue;
            }

            let file = self.archive.by_index(i)?;
            let name = file.name().to_string();
            let size = file.size();
            return Ok(Some(ArchiveEntry::new(name, size, file, self.options)));
        }

        Ok(None)
    }
}
