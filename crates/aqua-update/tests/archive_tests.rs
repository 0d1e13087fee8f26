//! Archive reader tests over real zip and tar.xz files
//!
//! Tests cover:
//! - Entry iteration for both formats
//! - Directory entries skipped
//! - Long (GNU extension) names in tar
//! - Partial reads followed by next_entry
//! - Checksum/binary extraction and verification via read_archive_contents
//! - Header sizes that lie about the entry body

mod common;

use aqua_update::archive::{ArchiveError, ArchiveOptions, ArchiveReader, ProgressObserver};
use aqua_update::assets::{BinaryMatcher, Platform};
use aqua_update::error::UpdateError;
use aqua_update::read_archive_contents;
use common::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn write_archive(dir: &TempDir, name: &str, bytes: Vec<u8>) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn collect_entries(path: &Path, options: &ArchiveOptions) -> Vec<(String, Vec<u8>)> {
    let mut reader = ArchiveReader::open(path, options).unwrap();
    let mut collected = Vec::new();
    let mut entries = reader.entries().unwrap();
    while let Some(mut entry) = entries.next_entry().unwrap() {
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        collected.push((entry.name().to_string(), data));
    }
    drop(entries);
    reader.close();
    collected
}

fn sample_files() -> Vec<ArchiveFile> {
    vec![
        ArchiveFile::dir("dist"),
        ArchiveFile::new("dist/README.md", README_CONTENT),
        ArchiveFile::new("dist/aqua-speed-linux-x64", BINARY_CONTENT),
    ]
}

#[test]
fn test_zip_entries_skip_directories() {
    let temp = TempDir::new().unwrap();
    let path = write_archive(&temp, "a.zip", build_zip(&sample_files()));

    let entries = collect_entries(&path, &ArchiveOptions::default());
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["dist/README.md", "dist/aqua-speed-linux-x64"]);
    assert_eq!(entries[1].1, BINARY_CONTENT);
}

#[test]
fn test_tar_xz_entries_skip_directories() {
    let temp = TempDir::new().unwrap();
    let path = write_archive(&temp, "a.tar.xz", build_tar_xz(&sample_files()));

    let entries = collect_entries(&path, &ArchiveOptions::default());
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["dist/README.md", "dist/aqua-speed-linux-x64"]);
    assert_eq!(entries[0].1, README_CONTENT);
    assert_eq!(entries[1].1, BINARY_CONTENT);
}

#[test]
fn test_tar_xz_long_names() {
    let temp = TempDir::new().unwrap();
    let long_name = format!("{}/aqua-speed-linux-x64", "nested".repeat(20));
    let files = vec![ArchiveFile::new(&long_name, BINARY_CONTENT)];
    let path = write_archive(&temp, "long.tar.xz", build_tar_xz(&files));

    let entries = collect_entries(&path, &ArchiveOptions::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, long_name);
    assert_eq!(entries[0].1, BINARY_CONTENT);
}

#[test]
fn test_tar_xz_partial_read_then_next() {
    let temp = TempDir::new().unwrap();
    let big = vec![7u8; 5000];
    let files = vec![
        ArchiveFile::new("big.bin", &big),
        ArchiveFile::new("small.txt", b"small"),
    ];
    let path = write_archive(&temp, "partial.tar.xz", build_tar_xz(&files));

    let mut reader = ArchiveReader::open(&path, &ArchiveOptions::default()).unwrap();
    let mut entries = reader.entries().unwrap();
    {
        let mut first = entries.next_entry().unwrap().unwrap();
        assert_eq!(first.size(), 5000);
        let mut head = [0u8; 10];
        first.read_exact(&mut head).unwrap();
    }
    let mut second = entries.next_entry().unwrap().unwrap();
    assert_eq!(second.name(), "small.txt");
    let mut content = String::new();
    second.read_to_string(&mut content).unwrap();
    assert_eq!(content, "small");
    drop(second);
    assert!(entries.next_entry().unwrap().is_none());
}

#[test]
fn test_tar_xz_pax_path() {
    let temp = TempDir::new().unwrap();
    let path = write_archive(
        &temp,
        "pax.tar.xz",
        build_tar_xz_with_pax_path("short", "dist/aqua-speed-linux-x64", BINARY_CONTENT),
    );

    let entries = collect_entries(&path, &ArchiveOptions::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "dist/aqua-speed-linux-x64");
    assert_eq!(entries[0].1, BINARY_CONTENT);
}

#[test]
fn test_small_dict_capacity_still_reads() {
    let temp = TempDir::new().unwrap();
    let path = write_archive(&temp, "a.tar.xz", build_tar_xz(&sample_files()));

    let options = ArchiveOptions::default().with_dict_capacity(1);
    let entries = collect_entries(&path, &options);
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_next_entry_after_close() {
    let temp = TempDir::new().unwrap();
    for (name, bytes) in [
        ("a.zip", build_zip(&sample_files())),
        ("a.tar.xz", build_tar_xz(&sample_files())),
    ] {
        let path = write_archive(&temp, name, bytes);
        let mut reader = ArchiveReader::open(&path, &ArchiveOptions::default()).unwrap();
        reader.close();
        reader.close();
        assert!(reader.entries().unwrap().next_entry().unwrap().is_none());
    }
}

#[test]
fn test_open_missing_file() {
    let err = ArchiveReader::open(Path::new("/nonexistent/a.tar.xz"), &ArchiveOptions::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("failed to open archive"));
}

#[test]
fn test_corrupt_zip_is_error() {
    let temp = TempDir::new().unwrap();
    let path = write_archive(&temp, "bad.zip", b"not a zip at all".to_vec());
    assert!(ArchiveReader::open(&path, &ArchiveOptions::default()).is_err());
}

#[derive(Default)]
struct ByteCounter {
    bytes: AtomicU64,
}

impl ProgressObserver for ByteCounter {
    fn on_progress(&self, _name: &str, read: u64, _total: u64) {
        self.bytes.store(read, Ordering::SeqCst);
    }
}

#[test]
fn test_observer_sees_entry_progress() {
    let temp = TempDir::new().unwrap();
    let files = vec![ArchiveFile::new("aqua-speed-linux-x64", BINARY_CONTENT)];
    let path = write_archive(&temp, "a.zip", build_zip(&files));

    let counter = Arc::new(ByteCounter::default());
    let options = ArchiveOptions::default().with_observer(counter.clone());
    collect_entries(&path, &options);

    assert_eq!(
        counter.bytes.load(Ordering::SeqCst),
        BINARY_CONTENT.len() as u64
    );
}

#[test]
fn test_read_archive_contents_tar_xz() {
    let temp = TempDir::new().unwrap();
    let files = standard_files(LINUX_BINARY, BINARY_CONTENT);
    let path = write_archive(&temp, LINUX_ASSET, build_tar_xz(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let contents = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap();

    assert_eq!(contents.binary, BINARY_CONTENT);
    assert_eq!(contents.checksum, aqua_update::checksum::digest(BINARY_CONTENT));
}

#[test]
fn test_read_archive_contents_windows_zip() {
    let temp = TempDir::new().unwrap();
    let mut files = standard_files(WINDOWS_BINARY, BINARY_CONTENT);
    // A non-exe entry sharing the prefix must not be picked on Windows
    files.insert(0, ArchiveFile::new("aqua-speed-windows-x64.txt", b"notes"));
    let path = write_archive(&temp, WINDOWS_ASSET, build_zip(&files));

    let matcher = BinaryMatcher::new(WINDOWS_BINARY, &Platform::new("windows", "amd64"));
    let contents = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap();
    assert_eq!(contents.binary, BINARY_CONTENT);
}

#[test]
fn test_checksum_entry_never_taken_as_binary() {
    let temp = TempDir::new().unwrap();
    // Named so that it would also satisfy the binary prefix match
    let checksum = format!("{}\n", aqua_update::checksum::digest(BINARY_CONTENT));
    let files = vec![
        ArchiveFile::new("aqua-speed-linux-x64-checksum.txt", checksum.as_bytes()),
        ArchiveFile::new(LINUX_BINARY, BINARY_CONTENT),
    ];
    let path = write_archive(&temp, LINUX_ASSET, build_tar_xz(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let contents = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap();
    assert_eq!(contents.binary, BINARY_CONTENT);
}

#[test]
fn test_read_archive_contents_missing_binary() {
    let temp = TempDir::new().unwrap();
    let files = vec![
        ArchiveFile::new("README.md", README_CONTENT),
        checksum_entry(LINUX_BINARY, BINARY_CONTENT),
    ];
    let path = write_archive(&temp, LINUX_ASSET, build_tar_xz(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let err = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap_err();
    assert!(matches!(err.root(), UpdateError::NoExecutableFound));
}

#[test]
fn test_read_archive_contents_missing_checksum() {
    let temp = TempDir::new().unwrap();
    let files = vec![ArchiveFile::new(LINUX_BINARY, BINARY_CONTENT)];
    let path = write_archive(&temp, LINUX_ASSET, build_tar_xz(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let err = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap_err();
    assert!(matches!(err.root(), UpdateError::ChecksumFileMissing));
}

#[test]
fn test_read_archive_contents_checksum_with_file_name() {
    let temp = TempDir::new().unwrap();
    let line = format!("{}  bin\n", aqua_update::checksum::digest(BINARY_CONTENT));
    let files = vec![
        ArchiveFile::new("checksum.txt", line.as_bytes()),
        ArchiveFile::new(LINUX_BINARY, BINARY_CONTENT),
    ];
    let path = write_archive(&temp, LINUX_ASSET, build_tar_xz(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let contents = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap();
    assert_eq!(contents.checksum, aqua_update::checksum::digest(BINARY_CONTENT));
    assert_eq!(contents.binary, BINARY_CONTENT);
}

#[test]
fn test_read_archive_contents_checksum_mismatch() {
    let temp = TempDir::new().unwrap();
    let files = vec![
        ArchiveFile::new("checksum.txt", b"deadbeef  bin\n"),
        ArchiveFile::new(LINUX_BINARY, BINARY_CONTENT),
    ];
    let path = write_archive(&temp, LINUX_ASSET, build_tar_xz(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let err = read_archive_contents(&path, &matcher, &ArchiveOptions::default()).unwrap_err();
    assert_eq!(err.operations(), vec!["verify checksum"]);
    match err.root() {
        UpdateError::ChecksumMismatch { expected, actual } => {
            assert_eq!(expected, "deadbeef");
            assert_eq!(actual, &aqua_update::checksum::digest(BINARY_CONTENT));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_huge_declared_size_is_an_error() {
    let temp = TempDir::new().unwrap();
    let bytes = build_tar_xz_declaring(
        &[checksum_entry(LINUX_BINARY, BINARY_CONTENT)],
        LINUX_BINARY,
        BINARY_CONTENT,
        1 << 50,
    );
    let path = write_archive(&temp, LINUX_ASSET, bytes);

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let result = read_archive_contents(&path, &matcher, &ArchiveOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_entry_over_limit_is_rejected() {
    let temp = TempDir::new().unwrap();
    let big = vec![1u8; 4096];
    let files = standard_files(LINUX_BINARY, &big);
    let path = write_archive(&temp, "a.zip", build_zip(&files));

    let matcher = BinaryMatcher::new(LINUX_BINARY, &Platform::new("linux", "amd64"));
    let options = ArchiveOptions::default().with_max_entry_bytes(1024);
    let err = read_archive_contents(&path, &matcher, &options).unwrap_err();

    assert_eq!(err.operations(), vec!["read binary file"]);
    assert!(matches!(
        err.root(),
        UpdateError::Archive(ArchiveError::EntryTooLarge { limit: 1024, .. })
    ));
}
