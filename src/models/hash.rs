//! # 内容摘要模型
//!
//! 带算法标签的文件摘要。不同来源提供的摘要算法不同（dat 文件同时给出
//! crc/md5/sha1，archive.org 索引给出 md5/sha1/crc32，目录遍历按需计算），
//! 摘要必须连同算法一起保存，匹配器才能拒绝跨算法比较。
//!
//! ## 依赖关系
//! - 被 `models/entry.rs`, `parsers/`, `matcher/` 使用
//! - 无外部模块依赖

use std::fmt;

/// 摘要算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    Sha1,
    Md5,
    Crc32,
}

impl HashAlgorithm {
    /// 十六进制摘要长度
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Crc32 => 8,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha1 => write!(f, "sha1"),
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Crc32 => write!(f, "crc32"),
        }
    }
}

/// 文件摘要（算法 + 小写十六进制）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHash {
    pub algorithm: HashAlgorithm,
    pub digest: String,
}

impl FileHash {
    /// 从十六进制字符串创建，校验字符集与长度
    ///
    /// CRC32 允许省略前导零（部分 dat 文件如此书写）。
    pub fn from_hex(algorithm: HashAlgorithm, hex_digest: &str) -> Option<Self> {
        let trimmed = hex_digest.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expected = algorithm.hex_len();
        let digest = match algorithm {
            HashAlgorithm::Crc32 if trimmed.len() < expected => {
                format!("{:0>width$}", trimmed, width = expected)
            }
            _ => trimmed.to_string(),
        };

        if digest.len() != expected {
            return None;
        }

        Some(FileHash {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        })
    }

    /// 从原始摘要字节创建
    pub fn from_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> Option<Self> {
        if bytes.len() * 2 != algorithm.hex_len() {
            return None;
        }
        Some(FileHash {
            algorithm,
            digest: hex::encode(bytes),
        })
    }

    /// 匹配键字符串，算法前缀保证不同算法的摘要永不相等
    pub fn key(&self) -> String {
        format!("{}:{}", self.algorithm, self.digest)
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}
