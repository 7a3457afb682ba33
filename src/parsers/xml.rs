//! # XML 解析辅助函数
//!
//! dat 与 archive.org 解析器共用的 `quick-xml` 封装。
//!
//! ## 依赖关系
//! - 被 `parsers/dat.rs`, `parsers/archiveorg.rs` 使用
//! - 使用 `quick-xml`

use quick_xml::events::{BytesEnd, BytesStart};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::BufRead;

/// 创建去除空白文本的流式读取器
pub fn new_reader<R: BufRead>(source: R) -> Reader<R> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);
    reader
}

/// 元素本地名（忽略命名空间前缀）
pub fn start_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

pub fn end_name(element: &BytesEnd<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// 读取元素的全部属性（已反转义）
pub fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, String> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute: {}", e))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid attribute value for '{}': {}", key, e))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// 解析可选的十进制大小字段
pub fn parse_size(raw: Option<&str>, context: &str) -> Result<Option<u64>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| format!("invalid size '{}' for {}", s, context)),
    }
}
