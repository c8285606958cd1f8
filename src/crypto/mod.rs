//! 密钥校验与 AES-EAX 认证加解密。

pub mod aead;
pub mod key;
