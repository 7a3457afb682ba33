//! # 文件摘要计算
//!
//! 流式计算 SHA-1 / MD5 / CRC32，供目录遍历按需哈希使用。
//!
//! ## 依赖关系
//! - 被 `parsers/directory.rs` 使用
//! - 使用 `sha1`, `md-5`, `crc32fast`, `hex`

use crate::models::{FileHash, HashAlgorithm};
use sha1::Digest;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

/// 计算文件摘要
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> io::Result<FileHash> {
    let file = File::open(path)?;
    hash_reader(file, algorithm)
}

/// 计算任意读取器内容的摘要
pub fn hash_reader<R: Read>(reader: R, algorithm: HashAlgorithm) -> io::Result<FileHash> {
    let raw = match algorithm {
        HashAlgorithm::Sha1 => digest_stream::<sha1::Sha1, _>(reader)?,
        HashAlgorithm::Md5 => digest_stream::<md5::Md5, _>(reader)?,
        HashAlgorithm::Crc32 => {
            let mut hasher = crc32fast::Hasher::new();
            feed(reader, |chunk| hasher.update(chunk))?;
            hasher.finalize().to_be_bytes().to_vec()
        }
    };

    Ok(FileHash {
        algorithm,
        digest: hex::encode(raw),
    })
}

fn digest_stream<D: Digest, R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    feed(reader, |chunk| hasher.update(chunk))?;
    Ok(hasher.finalize().to_vec())
}

fn feed<R: Read>(mut reader: R, mut sink: impl FnMut(&[u8])) -> io::Result<()> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => sink(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
