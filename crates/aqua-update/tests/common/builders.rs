//! Archive and release payload builders

use serde_json::{json, Value};
use std::io::{Cursor, Write};
use xz2::write::XzEncoder;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::constants::*;

/// One file placed into a test archive. A name ending in `/` is a directory.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl ArchiveFile {
    pub fn new(name: &str, content: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_vec(),
        }
    }

    pub fn dir(name: &str) -> Self {
        Self::new(&format!("{}/", name.trim_end_matches('/')), &[])
    }

    fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// SHA-1 checksum entry for `content`, in `"{digest}  {file}"` form
pub fn checksum_entry(file_name: &str, content: &[u8]) -> ArchiveFile {
    let line = format!("{}  {}\n", aqua_update::checksum::digest(content), file_name);
    ArchiveFile::new("checksum.txt", line.as_bytes())
}

/// The archive layout a release normally ships
pub fn standard_files(binary_name: &str, content: &[u8]) -> Vec<ArchiveFile> {
    vec![
        ArchiveFile::new("README.md", README_CONTENT),
        checksum_entry(binary_name, content),
        ArchiveFile::new(binary_name, content),
    ]
}

pub fn build_zip(files: &[ArchiveFile]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o755);

    for file in files {
        if file.is_dir() {
            writer.add_directory(file.name.as_str(), options).unwrap();
        } else {
            writer.start_file(file.name.as_str(), options).unwrap();
            writer.write_all(&file.content).unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

pub fn build_tar_xz(files: &[ArchiveFile]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    append_files(&mut builder, files);
    finish_tar_xz(builder)
}

/// Tar.xz whose last entry's header declares `declared_size` bytes while
/// only `content` follows it
pub fn build_tar_xz_declaring(
    files: &[ArchiveFile],
    name: &str,
    content: &[u8],
    declared_size: u64,
) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    append_files(&mut builder, files);

    let mut header = tar::Header::new_gnu();
    header.set_path(name).unwrap();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o755);
    header.set_size(declared_size);
    header.set_cksum();
    builder.append(&header, content).unwrap();

    finish_tar_xz(builder)
}

/// Tar.xz holding one file stored under `stored_name` with a PAX `path`
/// record naming it `pax_name`
pub fn build_tar_xz_with_pax_path(stored_name: &str, pax_name: &str, content: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    let record = pax_record("path", pax_name);
    let mut header = tar::Header::new_ustar();
    header.set_path("PaxHeaders/entry").unwrap();
    header.set_entry_type(tar::EntryType::XHeader);
    header.set_mode(0o644);
    header.set_size(record.len() as u64);
    header.set_cksum();
    builder.append(&header, record.as_bytes()).unwrap();

    append_files(&mut builder, &[ArchiveFile::new(stored_name, content)]);
    finish_tar_xz(builder)
}

/// `"{len} {key}={value}\n"`, where `len` counts the whole record
fn pax_record(key: &str, value: &str) -> String {
    let body = format!(" {}={}\n", key, value);
    let mut len = body.len();
    while (len.to_string().len() + body.len()) != len {
        len = len.to_string().len() + body.len();
    }
    format!("{}{}", len, body)
}

fn append_files(builder: &mut tar::Builder<Vec<u8>>, files: &[ArchiveFile]) {
    for file in files {
        let mut header = tar::Header::new_gnu();
        if file.is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o755);
            header.set_size(file.content.len() as u64);
        }
        header.set_cksum();
        builder
            .append_data(&mut header, file.name.trim_end_matches('/'), file.content.as_slice())
            .unwrap();
    }
}

fn finish_tar_xz(builder: tar::Builder<Vec<u8>>) -> Vec<u8> {
    let tar = builder.into_inner().unwrap();
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&tar).unwrap();
    encoder.finish().unwrap()
}

/// Latest-release API body listing `assets` as `(name, download_url)` pairs
pub fn release_json(tag: &str, assets: &[(&str, String)]) -> Value {
    json!({
        "tag_name": tag,
        "name": format!("aqua-speed {}", tag),
        "draft": false,
        "prerelease": false,
        "assets": assets
            .iter()
            .map(|(name, url)| json!({
                "name": name,
                "browser_download_url": url,
                "size": 0,
            }))
            .collect::<Vec<_>>(),
    })
}
