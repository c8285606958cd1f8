//! 批处理结果
//!
//! 单个文件失败只记录到报告中，不会中断整个批次。

use std::fmt;
use std::path::PathBuf;

use crate::error::VaultError;
use crate::folder::ENCRYPTED_SUFFIX;

/// 一个已加密文件：源文件 -> 容器文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// 单个文件的失败记录
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: VaultError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

#[derive(Debug, Default)]
pub struct EncryptionReport {
    pub encrypted: Vec<EncryptedFile>,
    pub failures: Vec<FileFailure>,
    /// 不在图片白名单内而被跳过的条目数
    pub skipped: usize,
    pub cancelled: bool,
}

impl EncryptionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// 解密得到的一张图片（名称 + 明文），只存在于内存中。
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextRecord {
    /// 容器文件名（含 `.enc` 后缀），用于显示
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PlaintextRecord {
    /// 去掉加密后缀后的原始文件名
    pub fn original_name(&self) -> &str {
        let split = self.name.len().saturating_sub(ENCRYPTED_SUFFIX.len());
        match self.name.get(split..) {
            Some(tail) if split > 0 && tail.eq_ignore_ascii_case(ENCRYPTED_SUFFIX) => {
                &self.name[..split]
            }
            _ => &self.name,
        }
    }
}

impl fmt::Debug for PlaintextRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaintextRecord")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct DecryptionReport {
    /// 按排序键排好序、且全部通过认证的图片
    pub records: Vec<PlaintextRecord>,
    pub failures: Vec<FileFailure>,
    pub cancelled: bool,
}

impl DecryptionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// 交给查看器的有序序列
    pub fn into_records(self) -> Vec<PlaintextRecord> {
        self.records
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }
}
