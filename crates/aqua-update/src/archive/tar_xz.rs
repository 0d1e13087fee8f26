//! Streaming reader for xz-compressed tar archives
//!
//! The tar walk is delegated to [`tar::Archive`], which also resolves GNU
//! long names and PAX `path` records and skips whatever a caller left
//! unread of the previous entry.

use super::{ArchiveEntry, ArchiveError, ArchiveOptions};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tar::Archive;
use xz2::read::XzDecoder;
use xz2::stream::Stream;

const FILE_BUFFER_SIZE: usize = 256 * 1024;

/// Smallest buffer over the decompressed stream, one tar block
const MIN_WINDOW: usize = 512;

type XzStream = BufReader<XzDecoder<BufReader<File>>>;

/// Forward-only `.tar.xz` archive; dropped on close
pub struct TarXzArchiveReader {
    archive: Option<Archive<XzStream>>,
    options: ArchiveOptions,
}

impl TarXzArchiveReader {
    pub fn open(path: &Path, options: &ArchiveOptions) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let buffered = BufReader::with_capacity(FILE_BUFFER_SIZE, file);
        let decoder = XzDecoder::new_stream(buffered, Stream::new_stream_decoder(u64::MAX, 0)?);
        let window = options.dict_capacity.max(MIN_WINDOW);

        Ok(Self {
            archive: Some(Archive::new(BufReader::with_capacity(window, decoder))),
            options: options.clone(),
        })
    }

    /// Regular-file entries in stored order, or `None` once closed
    pub fn entries(&mut self) -> Result<Option<TarXzEntries<'_>>, ArchiveError> {
        let Some(archive) = self.archive.as_mut() else {
            return Ok(None);
        };

        Ok(Some(TarXzEntries {
            entries: archive.entries()?,
            options: &self.options,
        }))
    }

    pub fn close(&mut self) {
        self.archive = None;
    }
}

/// Walks tar entries, skipping directories, links and global headers
pub struct TarXzEntries<'a> {
    entries: tar::Entries<'a, XzStream>,
    options: &'a ArchiveOptions,
}

impl TarXzEntries<'_> {
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>, ArchiveError> {
        for entry in self.entries.by_ref() {
            let entry = entry?;
            let kind = entry.header().entry_type();
            if !(kind.is_file() || kind.is_contiguous()) {
                continue;
            }

            let name = entry.path()?.to_string_lossy().into_owned();
            let size = entry.size();
            return Ok(Some(ArchiveEntry::new(name, size, entry, self.options)));
        }

        Ok(None)
    }
}
