//! 密钥校验模块
//!
//! 调用方提供的密钥按原样使用，不做任何派生。
//! 本模块只负责：
//! - 校验密钥长度（16 / 24 / 32 字节）
//! - 根据长度选择 AES-128 / AES-192 / AES-256
//! - 在离开作用域后清零密钥材料
//!
//! 密钥永远不会被记录到日志，`Debug` 输出已脱敏。

use std::fmt;

use zeroize::Zeroizing;

use crate::error::VaultError;

/// 允许的密钥长度（字节）
pub const VALID_KEY_LENGTHS: &[usize] = &[16, 24, 32];

/// 由密钥长度决定的 AES 变体。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVariant {
    Aes128,
    Aes192,
    Aes256,
}

impl KeyVariant {
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(Self::Aes128),
            24 => Some(Self::Aes192),
            32 => Some(Self::Aes256),
            _ => None,
        }
    }
}

/// 已校验的对称密钥。
///
/// 只能通过 [`validate`] 构造，因此持有的字节长度一定合法。
pub struct Key {
    bytes: Zeroizing<Vec<u8>>,
    variant: KeyVariant,
}

impl Key {
    pub fn variant(&self) -> KeyVariant {
        self.variant
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("variant", &self.variant)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// 校验候选密钥。
///
/// #### 错误
/// - 长度不是 16 / 24 / 32 时返回 `InvalidKeyLength`
pub fn validate(candidate: &[u8]) -> Result<Key, VaultError> {
    let variant = KeyVariant::from_len(candidate.len())
        .ok_or_else(|| VaultError::invalid_key_length(candidate.len()))?;

    Ok(Key {
        bytes: Zeroizing::new(candidate.to_vec()),
        variant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_aes_key_sizes() {
        for (len, variant) in [
            (16, KeyVariant::Aes128),
            (24, KeyVariant::Aes192),
            (32, KeyVariant::Aes256),
        ] {
            let key = validate(&vec![7u8; len]).expect("valid key");
            assert_eq!(key.variant(), variant);
            assert_eq!(key.as_bytes().len(), len);
        }
    }

    #[test]
    fn rejects_off_by_one_lengths() {
        for len in [0, 1, 15, 17, 23, 25, 31, 33, 64] {
            match validate(&vec![0u8; len]) {
                Err(VaultError::InvalidKeyLength { expected, actual }) => {
                    assert_eq!(expected, VALID_KEY_LENGTHS);
                    assert_eq!(actual, len);
                }
                other => panic!("length {len} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = validate(b"0123456789abcdef").unwrap();
        let shown = format!("{key:?}");
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains("0123456789abcdef"));
    }
}
