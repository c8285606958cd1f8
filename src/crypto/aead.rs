//! AES-EAX 认证加解密模块
//!
//! 功能说明：
//! - 加密：生成随机 nonce，输出 nonce + tag + 密文组成的容器
//! - 解密：先校验 tag（常量时间比较），通过后才解出明文
//! - 解密失败即表示：密钥错误 或 数据被篡改
//!
//! 安全约束：
//! - 每次加密必须使用全新的 nonce，严禁复用
//! - 不允许在未校验通过的情况下输出任何明文
//! - 关联数据（AAD）固定为空，与既有归档保持互通

use aes::cipher::{BlockCipher, BlockEncrypt, KeyInit, consts::U16};
use aes::{Aes128, Aes192, Aes256};
use eax::Eax;
use eax::aead::AeadInPlace;
use eax::aead::generic_array::GenericArray;
use rand::{RngCore, rngs::OsRng};

use crate::crypto::key::{Key, KeyVariant};
use crate::error::VaultError;
use crate::format::container::{Container, NONCE_SIZE, TAG_SIZE};

/// 使用 AES-EAX 加密数据
///
/// #### 返回
/// - Container（包含 nonce、tag 和与明文等长的密文）
///
/// #### 安全说明
/// - 每次调用都会从操作系统 CSPRNG 生成全新的 16 字节 nonce
/// - 空明文同样合法，得到 32 字节的容器
pub fn encrypt(key: &Key, plaintext: &[u8]) -> Result<Container, VaultError> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    encrypt_with_nonce(key, nonce, plaintext)
}

pub(crate) fn encrypt_with_nonce(
    key: &Key,
    nonce: [u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Container, VaultError> {
    let mut buffer = plaintext.to_vec();

    let tag = match key.variant() {
        KeyVariant::Aes128 => seal::<Aes128>(key.as_bytes(), &nonce, &mut buffer)?,
        KeyVariant::Aes192 => seal::<Aes192>(key.as_bytes(), &nonce, &mut buffer)?,
        KeyVariant::Aes256 => seal::<Aes256>(key.as_bytes(), &nonce, &mut buffer)?,
    };

    Ok(Container::new(nonce, tag, buffer))
}

/// 使用 AES-EAX 解密容器
///
/// #### 错误
/// - tag 不匹配（密钥错误、任一字节被改动）时返回 `AuthenticationFailed`
///
/// #### 安全保证
/// - tag 校验在解密之前完成，失败时缓冲区仍是密文并被直接丢弃
pub fn decrypt(key: &Key, container: &Container) -> Result<Vec<u8>, VaultError> {
    let mut buffer = container.ciphertext.clone();

    match key.variant() {
        KeyVariant::Aes128 => open::<Aes128>(key.as_bytes(), container, &mut buffer)?,
        KeyVariant::Aes192 => open::<Aes192>(key.as_bytes(), container, &mut buffer)?,
        KeyVariant::Aes256 => open::<Aes256>(key.as_bytes(), container, &mut buffer)?,
    }

    Ok(buffer)
}

/// 解码原始容器字节并解密，`MalformedContainer` 原样向上传递。
pub fn decrypt_bytes(key: &Key, bytes: &[u8]) -> Result<Vec<u8>, VaultError> {
    let container = Container::decode(bytes)?;
    decrypt(key, &container)
}

fn seal<C>(
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    buffer: &mut [u8],
) -> Result<[u8; TAG_SIZE], VaultError>
where
    C: BlockCipher<BlockSize = U16> + BlockEncrypt + Clone + KeyInit,
{
    let cipher = Eax::<C>::new_from_slice(key)
        .map_err(|_| VaultError::invalid_key_length(key.len()))?;

    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), &[], buffer)
        .map_err(|_| VaultError::Internal)?;

    let mut out = [0u8; TAG_SIZE];
    out.copy_from_slice(&tag);
    Ok(out)
}

fn open<C>(key: &[u8], container: &Container, buffer: &mut [u8]) -> Result<(), VaultError>
where
    C: BlockCipher<BlockSize = U16> + BlockEncrypt + Clone + KeyInit,
{
    let cipher = Eax::<C>::new_from_slice(key)
        .map_err(|_| VaultError::invalid_key_length(key.len()))?;

    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&container.nonce),
            &[],
            buffer,
            GenericArray::from_slice(&container.tag),
        )
        .map_err(|_| VaultError::AuthenticationFailed)
}
