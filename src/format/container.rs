//! 加密容器格式实现
//!
//! 每个加密文件就是一个容器，固定布局、无分隔符：
//!
//! ```text
//! [16 bytes: nonce][16 bytes: EAX tag][N bytes: ciphertext]
//! ```
//!
//! 容器不保存明文长度，也不保存原始文件名。
//! 该布局是与既有加密归档互通的唯一约定，读写必须逐字节一致。

use std::io::{Read, Write};

use crate::error::VaultError;

/// nonce 长度（字节），等于 AES 分组大小
pub const NONCE_SIZE: usize = 16;

/// 认证标签长度（字节）
pub const TAG_SIZE: usize = 16;

/// 容器的最小长度：nonce + tag
pub const HEADER_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// 单个加密文件在内存中的表示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

impl Container {
    pub fn new(nonce: [u8; NONCE_SIZE], tag: [u8; TAG_SIZE], ciphertext: Vec<u8>) -> Self {
        Self {
            nonce,
            tag,
            ciphertext,
        }
    }

    /// 容器编码后的总字节数
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.ciphertext.len()
    }

    /// 按固定顺序拼接 nonce、tag、ciphertext。
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// 在固定偏移处拆分容器。
    ///
    /// 长度不足 32 字节时返回 `MalformedContainer`；
    /// 剩余部分（可能为空）即为密文。
    pub fn decode(bytes: &[u8]) -> Result<Self, VaultError> {
        if bytes.len() < HEADER_SIZE {
            return Err(VaultError::MalformedContainer {
                len: bytes.len(),
                min: HEADER_SIZE,
            });
        }

        let (nonce, rest) = bytes.split_at(NONCE_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);

        let mut container = Self::new([0u8; NONCE_SIZE], [0u8; TAG_SIZE], ciphertext.to_vec());
        container.nonce.copy_from_slice(nonce);
        container.tag.copy_from_slice(tag);
        Ok(container)
    }

    /// 将容器写入输出流
    pub fn write<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.nonce)?;
        writer.write_all(&self.tag)?;
        writer.write_all(&self.ciphertext)?;
        Ok(())
    }

    /// 从输入流读取完整容器
    pub fn read<R: Read>(mut reader: R) -> Result<Self, VaultError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }
}
