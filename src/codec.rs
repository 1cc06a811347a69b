//! Base-62 短码编解码
//!
//! 短码是 id 的纯函数：字母表 `0-9a-zA-Z`，高位在前，`0` 编码为空串。

use std::fmt;

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE: u64 = 62;

/// `u64::MAX` 的 base-62 表示长度
pub const MAX_CODE_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// 字母表外的字符（位置, 字符）
    InvalidCharacter(usize, char),
    /// 解码结果超出 u64
    Overflow,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidCharacter(pos, ch) => {
                write!(f, "invalid character {:?} at position {}", ch, pos)
            }
            CodecError::Overflow => write!(f, "code exceeds the 64-bit id range"),
        }
    }
}

impl std::error::Error for CodecError {}

#[inline]
fn digit_value(ch: char) -> Option<u64> {
    match ch {
        '0'..='9' => Some(ch as u64 - '0' as u64),
        'a'..='z' => Some(ch as u64 - 'a' as u64 + 10),
        'A'..='Z' => Some(ch as u64 - 'A' as u64 + 36),
        _ => None,
    }
}

/// 将 id 编码为短码
pub fn encode(mut id: u64) -> String {
    let mut buf = Vec::with_capacity(MAX_CODE_LEN);
    while id > 0 {
        buf.push(ALPHABET[(id % BASE) as usize]);
        id /= BASE;
    }
    buf.reverse();
    // 只包含 ASCII 字母表字符
    buf.into_iter().map(char::from).collect()
}

/// 将短码解码为 id
///
/// 遇到字母表外的字符或溢出时直接失败，而不是静默地解出另一个 id。
pub fn decode(code: &str) -> Result<u64, CodecError> {
    code.chars().enumerate().try_fold(0u64, |acc, (pos, ch)| {
        let digit = digit_value(ch).ok_or(CodecError::InvalidCharacter(pos, ch))?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(CodecError::Overflow)
    })
}

/// 路由层的快速校验：非空、长度不超过 u64 的最大短码长度、只含字母表字符
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
