//! imgvault: 图片目录的静态加密与有序解密
//!
//! 每个文件独立使用 AES-EAX 加密为容器
//! `[16 字节 nonce][16 字节 tag][密文]`，
//! 解密时先校验认证标签，再按文件名中的 `(数字)` 排序交给查看器。

mod decrypt;
mod encrypt;

pub mod crypto;
pub mod error;
pub mod folder;
pub mod format;
pub mod fs;
pub mod order;
pub mod report;

pub use crypto::aead::{decrypt_bytes, encrypt as encrypt_bytes};
pub use crypto::key::{Key, KeyVariant, validate as validate_key};
pub use decrypt::decrypt_file;
pub use encrypt::encrypt_file;
pub use error::VaultError;
pub use folder::{
    ENCRYPTED_SUFFIX, IMAGE_EXTENSIONS, decrypt_folder, decrypt_folder_cancellable,
    encrypt_folder, encrypt_folder_cancellable, is_container_name, is_supported_image,
};
pub use format::container::Container;
pub use order::{OrderNumber, OrderingKey, ordering_key};
pub use report::{DecryptionReport, EncryptedFile, EncryptionReport, FileFailure, PlaintextRecord};
