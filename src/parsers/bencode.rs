//! # bencode 解码器
//!
//! BitTorrent 使用的 bencode 序列化格式的零拷贝解码器。
//!
//! ## 格式说明
//! ```text
//! i42e              整数
//! 4:spam            字节串（长度前缀）
//! l4:spami42ee      列表
//! d3:bar4:spame     字典（键为字节串，按字节序排列）
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/torrent.rs`, `parsers/fastresume.rs` 使用
//! - 无外部模块依赖

use std::collections::BTreeMap;
use std::fmt;

/// 最大嵌套深度，防止恶意输入耗尽栈
const MAX_DEPTH: usize = 64;

/// 解码后的 bencode 值，借用输入缓冲区
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    Int(i64),
    Bytes(&'a [u8]),
    List(Vec<Value<'a>>),
    Dict(BTreeMap<&'a [u8], Value<'a>>),
}

impl<'a> Value<'a> {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bytes(b) => Some(*b),
            _ => None,
        }
    }

    /// 字节串按 UTF-8 解码（非法序列用替换字符）
    pub fn as_string(&self) -> Option<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn as_list(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<&'a [u8], Value<'a>>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// 字典取值
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.as_dict().and_then(|d| d.get(key.as_bytes()))
    }
}

/// 解码错误（带字节偏移）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub offset: usize,
    pub reason: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid bencode at byte {}: {}", self.offset, self.reason)
    }
}

impl std::error::Error for DecodeError {}

/// 解码完整缓冲区；结尾多余数据视为错误
pub fn decode(data: &[u8]) -> Result<Value<'_>, DecodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value(0)?;
    if decoder.pos != data.len() {
        return Err(decoder.error("trailing data after top-level value"));
    }
    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn error(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Result<u8, DecodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of input"))
    }

    fn value(&mut self, depth: usize) -> Result<Value<'a>, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }

        match self.peek()? {
            b'i' => {
                self.pos += 1;
                let n = self.integer(b'e')?;
                Ok(Value::Int(n))
            }
            b'l' => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Value::List(items))
            }
            b'd' => {
                self.pos += 1;
                let mut dict = BTreeMap::new();
                while self.peek()? != b'e' {
                    if !self.peek()?.is_ascii_digit() {
                        return Err(self.error("dictionary key must be a byte string"));
                    }
                    let key = self.bytes()?;
                    let value = self.value(depth + 1)?;
                    dict.insert(key, value);
                }
                self.pos += 1;
                Ok(Value::Dict(dict))
            }
            b'0'..=b'9' => Ok(Value::Bytes(self.bytes()?)),
            other => Err(self.error(format!("unexpected byte 0x{:02x}", other))),
        }
    }

    /// 读取以 `terminator` 结尾的十进制整数
    fn integer(&mut self, terminator: u8) -> Result<i64, DecodeError> {
        let start = self.pos;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == terminator)
            .map(|i| start + i)
            .ok_or_else(|| self.error("unterminated integer"))?;

        let text = std::str::from_utf8(&self.data[start..end])
            .map_err(|_| self.error("integer is not ASCII"))?;

        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error(format!("invalid integer '{}'", text)));
        }
        if (digits.len() > 1 && digits.starts_with('0')) || text == "-0" {
            return Err(self.error(format!("non-canonical integer '{}'", text)));
        }

        let n = text
            .parse::<i64>()
            .map_err(|_| self.error(format!("integer out of range '{}'", text)))?;

        self.pos = end + 1;
        Ok(n)
    }

    fn bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.integer(b':')?;
        let len = usize::try_from(len).map_err(|_| self.error("negative string length"))?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.error(format!("string of length {} exceeds input", len)))?;

        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(b"i42e").unwrap(), Value::Int(42));
        assert_eq!(decode(b"i-7e").unwrap(), Value::Int(-7));
        assert_eq!(decode(b"4:spam").unwrap(), Value::Bytes(b"spam"));
        assert_eq!(decode(b"0:").unwrap(), Value::Bytes(b""));
    }

    #[test]
    fn test_decode_nested() {
        let v = decode(b"d4:infod4:name3:abc6:lengthi10ee4:listli1ei2eee").unwrap();
        let info = v.get("info").unwrap();
        assert_eq!(info.get("name").unwrap().as_string().as_deref(), Some("abc"));
        assert_eq!(info.get("length").unwrap().as_int(), Some(10));
        assert_eq!(v.get("list").unwrap().as_list().unwrap().len(), 2);
    }

    #[test]
    fn test_truncated_input() {
        let err = decode(b"d4:name3:ab").unwrap_err();
        assert!(err.reason.contains("exceeds input"));

        assert!(decode(b"l i1e").is_err());
        assert!(decode(b"li1e").is_err());
        assert!(decode(b"i12").is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn test_invalid_integers() {
        assert!(decode(b"i03e").is_err());
        assert!(decode(b"i-0e").is_err());
        assert!(decode(b"ie").is_err());
        assert!(decode(b"i1x2e").is_err());
    }

    #[test]
    fn test_trailing_data() {
        let err = decode(b"i1ei2e").unwrap_err();
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_non_string_key() {
        assert!(decode(b"di1ei2ee").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut deep = vec![b'l'; MAX_DEPTH + 2];
        deep.extend(vec![b'e'; MAX_DEPTH + 2]);
        assert!(decode(&deep).is_err());
    }
}
