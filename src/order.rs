//! 显示顺序
//!
//! 解密后的图片顺序只由文件名中的第一个 `(数字)` 决定，
//! 与文件系统的枚举顺序无关。没有该标记的文件排在最后，
//! 相同键保持原有枚举顺序（稳定排序）。

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static ORDER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]+)\)").expect("排序正则配置错误"));

/// 任意长度的非负十进制整数。
///
/// 内部保存去掉前导零后的数字串（全零记为 `"0"`），
/// 先比较位数再逐位比较，因此不受 `u64` 范围限制。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumber(String);

impl OrderNumber {
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_owned())
        } else {
            Self(trimmed.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for OrderNumber {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Ord for OrderNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for OrderNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 从文件名中解析出的排序键。
///
/// `Numbered` 总是排在 `Unnumbered` 之前。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderingKey {
    Numbered(OrderNumber),
    Unnumbered,
}

/// 提取文件名中第一个括号包裹的整数。
pub fn ordering_key(name: &str) -> OrderingKey {
    match ORDER_TOKEN.captures(name) {
        Some(caps) => OrderingKey::Numbered(OrderNumber::from_digits(&caps[1])),
        None => OrderingKey::Unnumbered,
    }
}

/// 按排序键稳定排序。
pub fn sort_by_ordering_key<T, F>(items: &mut [T], name_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| ordering_key(name_of(item)));
}
