//! Folder collection and commit payload construction
//!
//! Small text files travel inline in the commit body. Everything the registry
//! asks to store out of band (binary or large content) is uploaded to the
//! large-file store first and referenced from the commit by its sha256.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::{DirEntry, WalkDir};

use super::error::{RegistryError, RegistryResult};

/// Leading bytes sent to the registry so it can pick an upload mode
pub const SAMPLE_BYTES: u64 = 512;

/// Files above this size always go through the large-file store
pub const INLINE_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

/// A local file and its path inside the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub local_path: PathBuf,
    /// Forward-slash separated, relative to the folder root
    pub path_in_repo: String,
    pub size: u64,
}

/// How the registry wants a file transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    Regular,
    Lfs,
}

/// Content address of a file in the large-file store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LfsPointer {
    /// Hex sha256 of the content
    pub oid: String,
    pub size: u64,
}

/// One file operation of a commit
#[derive(Debug, Clone)]
pub enum CommitOperation<'a> {
    /// Content embedded in the commit body as base64
    Inline(&'a UploadFile),
    /// Content already in the large-file store
    Lfs {
        file: &'a UploadFile,
        pointer: LfsPointer,
    },
}

impl CommitOperation<'_> {
    pub fn path_in_repo(&self) -> &str {
        match self {
            CommitOperation::Inline(file) => &file.path_in_repo,
            CommitOperation::Lfs { file, .. } => &file.path_in_repo,
        }
    }
}

/// Every file under `folder`, sorted by repository path.
///
/// Version-control metadata (`.git/`) and the local registry cache
/// (`.cache/huggingface/`) are left out at any depth.
pub fn collect_files(folder: &Path) -> RegistryResult<Vec<UploadFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry.map_err(|e| RegistryError::Io {
            path: e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| folder.display().to_string()),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| RegistryError::Io {
                path: entry.path().display().to_string(),
                source: e.into(),
            })?
            .len();

        let relative = entry
            .path()
            .strip_prefix(folder)
            .unwrap_or_else(|_| entry.path());
        let path_in_repo = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push(UploadFile {
            local_path: entry.path().to_path_buf(),
            path_in_repo,
            size,
        });
    }

    files.sort_by(|a, b| a.path_in_repo.cmp(&b.path_in_repo));
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    if entry.file_name() == ".git" {
        return true;
    }
    entry.file_name() == "huggingface"
        && entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|parent| parent == ".cache")
}

fn open(file: &UploadFile) -> RegistryResult<File> {
    File::open(&file.local_path).map_err(|source| io_error(file, source))
}

fn io_error(file: &UploadFile, source: std::io::Error) -> RegistryError {
    RegistryError::Io {
        path: file.local_path.display().to_string(),
        source,
    }
}

/// Base64 of the first [`SAMPLE_BYTES`] bytes of a file
pub fn read_sample(file: &UploadFile) -> RegistryResult<String> {
    let mut sample = Vec::with_capacity(SAMPLE_BYTES as usize);
    open(file)?
        .take(SAMPLE_BYTES)
        .read_to_end(&mut sample)
        .map_err(|source| io_error(file, source))?;
    Ok(STANDARD.encode(sample))
}

/// Hash a file for the large-file store, streaming its content
pub fn lfs_pointer(file: &UploadFile) -> RegistryResult<LfsPointer> {
    let mut hasher = Sha256::new();
    let size = std::io::copy(&mut open(file)?, &mut hasher)
        .map_err(|source| io_error(file, source))?;

    Ok(LfsPointer {
        oid: format!("{:x}", hasher.finalize()),
        size,
    })
}

#[derive(Serialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
enum CommitLine<'a> {
    Header {
        summary: &'a str,
        description: &'a str,
    },
    File {
        content: String,
        path: &'a str,
        encoding: &'static str,
    },
    LfsFile {
        path: &'a str,
        algo: &'static str,
        oid: &'a str,
        size: u64,
    },
}

/// Build the newline-delimited JSON body of a commit request: one header
/// line with the commit message, then one line per operation.
///
/// Only inline operations carry content, so the body stays bounded by
/// [`INLINE_SIZE_LIMIT`] per inline file.
pub fn commit_payload(
    operations: &[CommitOperation<'_>],
    commit_message: &str,
) -> RegistryResult<Vec<u8>> {
    let mut body = Vec::new();
    write_line(
        &mut body,
        &CommitLine::Header {
            summary: commit_message,
            description: "",
        },
    )?;

    for operation in operations {
        body.push(b'\n');
        match operation {
            CommitOperation::Inline(file) => {
                let mut content = Vec::with_capacity(file.size as usize);
                open(file)?
                    .read_to_end(&mut content)
                    .map_err(|source| io_error(file, source))?;
                write_line(
                    &mut body,
                    &CommitLine::File {
                        content: STANDARD.encode(content),
                        path: &file.path_in_repo,
                        encoding: "base64",
                    },
                )?;
            }
            CommitOperation::Lfs { file, pointer } => write_line(
                &mut body,
                &CommitLine::LfsFile {
                    path: &file.path_in_repo,
                    algo: "sha256",
                    oid: &pointer.oid,
                    size: pointer.size,
                },
            )?,
        }
    }

    Ok(body)
}

fn write_line<W: Write>(writer: &mut W, line: &CommitLine<'_>) -> RegistryResult<()> {
    serde_json::to_writer(writer, line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, rel: &str, bytes: &[u8]) -> UploadFile {
        let path = dir.join(rel);
        std::fs::write(&path, bytes).unwrap();
        UploadFile {
            local_path: path,
            path_in_repo: rel.to_string(),
            size: bytes.len() as u64,
        }
    }

    fn lines(payload: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(payload)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_header_line_shape() {
        let payload = commit_payload(&[], "deploy").unwrap();
        let value = &lines(&payload)[0];
        assert_eq!(value["key"], "header");
        assert_eq!(value["value"]["summary"], "deploy");
    }

    #[test]
    fn test_lfs_operation_carries_pointer_not_content() {
        let dir = TempDir::new().unwrap();
        let text = write_file(dir.path(), "config.json", b"{}");
        let model = write_file(dir.path(), "model.zip", b"PK\x03\x04\x00\xff");
        let pointer = lfs_pointer(&model).unwrap();

        let operations = vec![
            CommitOperation::Inline(&text),
            CommitOperation::Lfs {
                file: &model,
                pointer: pointer.clone(),
            },
        ];
        let payload = lines(&commit_payload(&operations, "deploy").unwrap());

        assert_eq!(payload.len(), 3);
        assert_eq!(payload[1]["key"], "file");
        assert_eq!(payload[1]["value"]["content"], "e30=");
        assert_eq!(payload[2]["key"], "lfsFile");
        assert_eq!(payload[2]["value"]["oid"], pointer.oid.as_str());
        assert_eq!(payload[2]["value"]["size"], 6);
        assert!(payload[2]["value"].get("content").is_none());
    }

    #[test]
    fn test_pointer_is_sha256_of_content() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "hello.txt", b"hello");

        let pointer = lfs_pointer(&file).unwrap();

        assert_eq!(
            pointer.oid,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(pointer.size, 5);
    }

    #[test]
    fn test_sample_is_capped() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "big.bin", &[7u8; 2048]);

        let sample = STANDARD.decode(read_sample(&file).unwrap()).unwrap();

        assert_eq!(sample.len(), SAMPLE_BYTES as usize);
    }
}
