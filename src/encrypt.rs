//! 单文件加密流程实现
//!
//! 加密流程（严格顺序）：
//! 1. 读取完整明文
//! 2. 生成 nonce 并执行 AES-EAX 加密
//! 3. 以原子方式写出容器（先写临时文件，再替换目标文件）
//!
//! 注意：
//! - 不处理文件夹，见 `folder` 模块
//! - 不做密钥输入

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::crypto::aead;
use crate::crypto::key::Key;
use crate::error::VaultError;
use crate::fs::atomic::write_atomic;

/// 加密单个文件，覆盖已存在的输出文件。
///
/// 返回写出的容器字节数。
pub fn encrypt_file(key: &Key, input_path: &Path, output_path: &Path) -> Result<u64, VaultError> {
    let plaintext = std::fs::read(input_path)?;

    let container = aead::encrypt(key, &plaintext)?;

    write_atomic(output_path, |file| {
        let mut writer = BufWriter::new(file);
        container.write(&mut writer)?;
        writer.flush()
    })?;

    Ok(container.encoded_len() as u64)
}
