//! 单文件解密流程实现
//!
//! 解密流程（严格顺序）：
//! 1. 读取并拆分容器（长度不足即拒绝）
//! 2. 校验 tag，校验通过后才解出明文
//!
//! 注意：
//! - 明文只返回给调用方，本模块从不写出明文
//! - 任一步骤失败都不会返回部分明文

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::crypto::aead;
use crate::crypto::key::Key;
use crate::error::VaultError;
use crate::format::container::Container;

/// 解密单个容器文件，返回明文。
pub fn decrypt_file(key: &Key, input_path: &Path) -> Result<Vec<u8>, VaultError> {
    let input = File::open(input_path)?;
    let reader = BufReader::new(input);

    let container = Container::read(reader)?;

    aead::decrypt(key, &container)
}
