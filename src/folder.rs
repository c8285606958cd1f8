//! 目录级加密/解密流水线（非递归、非打包）
//!
//! 设计要点：
//! - 只处理目录下的直接子文件，子目录一律跳过。
//! - 加密只处理白名单内的图片扩展名，输出为同名 + `.enc`。
//! - 解密按文件名中的 `(数字)` 重新排序，与枚举顺序无关。
//! - 单个文件失败只记录，不中断批次；目录不存在则整体失败。
//! - 取消标志只在文件边界检查，不会打断正在处理的文件。

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, info_span, warn};
use walkdir::WalkDir;

use crate::crypto::key::Key;
use crate::decrypt::decrypt_file;
use crate::encrypt::encrypt_file;
use crate::error::VaultError;
use crate::order::sort_by_ordering_key;
use crate::report::{DecryptionReport, EncryptedFile, EncryptionReport, FileFailure, PlaintextRecord};

/// 加密文件名后缀
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// 允许加密的图片扩展名（大小写不敏感）
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".gif"];

/// 文件名是否以白名单内的图片扩展名结尾。
pub fn is_supported_image(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// 文件名是否以 `.enc` 结尾（大小写不敏感）。
pub fn is_container_name(name: &str) -> bool {
    name.to_lowercase().ends_with(ENCRYPTED_SUFFIX)
}

/// 原文件名 + `.enc`
pub fn container_name_for(name: &OsStr) -> OsString {
    let mut s = name.to_os_string();
    s.push(ENCRYPTED_SUFFIX);
    s
}

/// 将目录中的图片逐个加密到目标目录。
pub fn encrypt_folder(
    key: &Key,
    input_path: &Path,
    output_path: &Path,
) -> Result<EncryptionReport, VaultError> {
    encrypt_folder_cancellable(key, input_path, output_path, &AtomicBool::new(false))
}

/// 同 [`encrypt_folder`]，`cancel` 被置位后在下一个文件之前停止。
pub fn encrypt_folder_cancellable(
    key: &Key,
    input_path: &Path,
    output_path: &Path,
    cancel: &AtomicBool,
) -> Result<EncryptionReport, VaultError> {
    if !input_path.is_dir() {
        return Err(VaultError::SourceNotFound(input_path.to_path_buf()));
    }

    std::fs::create_dir_all(output_path)?;

    let _span = info_span!(
        "encrypt_folder",
        input = %input_path.display(),
        output = %output_path.display()
    )
    .entered();

    let mut report = EncryptionReport::default();

    for entry in list_dir(input_path) {
        if cancel.load(Ordering::Relaxed) {
            info!("encryption cancelled");
            report.cancelled = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.failures.push(walkdir_failure(input_path, err));
                continue;
            }
        };

        let source = entry.path();
        let name = entry.file_name();

        if !source.is_file() || !is_supported_image(&name.to_string_lossy()) {
            debug!(path = %source.display(), "skipping entry");
            report.skipped += 1;
            continue;
        }

        let destination = output_path.join(container_name_for(name));

        match encrypt_file(key, source, &destination) {
            Ok(bytes) => {
                info!(
                    source = %source.display(),
                    destination = %destination.display(),
                    bytes,
                    "encrypted file"
                );
                report.encrypted.push(EncryptedFile {
                    source: source.to_path_buf(),
                    destination,
                });
            }
            Err(error) => {
                warn!(source = %source.display(), %error, "failed to encrypt file");
                report.failures.push(FileFailure {
                    path: source.to_path_buf(),
                    error,
                });
            }
        }
    }

    Ok(report)
}

/// 解密目录中的所有 `.enc` 文件，返回排好序的明文序列。
///
/// 结果只保存在内存中，不写出任何明文。
pub fn decrypt_folder(key: &Key, input_path: &Path) -> Result<DecryptionReport, VaultError> {
    decrypt_folder_cancellable(key, input_path, &AtomicBool::new(false))
}

/// 同 [`decrypt_folder`]，`cancel` 被置位后在下一个文件之前停止。
pub fn decrypt_folder_cancellable(
    key: &Key,
    input_path: &Path,
    cancel: &AtomicBool,
) -> Result<DecryptionReport, VaultError> {
    if !input_path.is_dir() {
        return Err(VaultError::SourceNotFound(input_path.to_path_buf()));
    }

    let _span = info_span!("decrypt_folder", input = %input_path.display()).entered();

    let mut report = DecryptionReport::default();
    let mut candidates = Vec::new();

    for entry in list_dir(input_path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.failures.push(walkdir_failure(input_path, err));
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if !entry.path().is_file() || !is_container_name(&name) {
            debug!(path = %entry.path().display(), "skipping entry");
            continue;
        }

        candidates.push(Candidate {
            name,
            path: entry.into_path(),
        });
    }

    sort_by_ordering_key(&mut candidates, |c| c.name.as_str());

    for Candidate { name, path } in candidates {
        if cancel.load(Ordering::Relaxed) {
            info!("decryption cancelled");
            report.cancelled = true;
            break;
        }

        match decrypt_file(key, &path) {
            Ok(bytes) => {
                info!(name = %name, bytes = bytes.len(), "decrypted file");
                report.records.push(PlaintextRecord { name, bytes });
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to decrypt file");
                report.failures.push(FileFailure { path, error });
            }
        }
    }

    Ok(report)
}

struct Candidate {
    name: String,
    path: PathBuf,
}

fn list_dir(dir: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
}

fn walkdir_failure(root: &Path, err: walkdir::Error) -> FileFailure {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    warn!(path = %path.display(), error = %err, "failed to read directory entry");

    FileFailure {
        path,
        error: VaultError::Io(io::Error::from(err)),
    }
}
