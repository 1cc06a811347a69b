//! Short code codec tests
//!
//! 短码是 id 的纯函数，这里覆盖边界值和一段伪随机 id。

use tinylink::codec::{CodecError, MAX_CODE_LEN, decode, encode, is_valid_code};

/// 固定种子的 xorshift，保证每次运行覆盖同一批 id
fn xorshift_ids(seed: u64, count: usize) -> Vec<u64> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        })
        .collect()
}

#[test]
fn test_boundary_ids() {
    for id in [1u64, 61, 62, 63, 3843, 3844, i64::MAX as u64, u64::MAX - 1, u64::MAX] {
        let code = encode(id);
        assert!(is_valid_code(&code), "{} encoded to invalid code {}", id, code);
        assert_eq!(decode(&code), Ok(id));
    }
}

#[test]
fn test_pseudo_random_sweep() {
    for id in xorshift_ids(0x9E37_79B9_7F4A_7C15, 10_000) {
        let code = encode(id);
        assert!(code.len() <= MAX_CODE_LEN);
        assert_eq!(decode(&code), Ok(id));
    }
}

#[test]
fn test_output_uses_only_alphabet() {
    for id in xorshift_ids(42, 1_000) {
        assert!(encode(id).bytes().all(|b| b.is_ascii_alphanumeric()));
    }
}

#[test]
fn test_length_grows_logarithmically() {
    // 62^n 是第一个 n+1 位的短码
    let mut power = 1u64;
    for len in 1..MAX_CODE_LEN {
        assert_eq!(encode(power).len(), len);
        assert_eq!(encode(power * 62 - 1).len(), len);
        power *= 62;
    }
}

#[test]
fn test_distinct_ids_give_distinct_codes() {
    let mut codes: Vec<String> = (1..5_000u64).map(encode).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 4_999);
}

#[test]
fn test_case_is_significant() {
    assert_ne!(decode("a"), decode("A"));
    assert_eq!(decode("a"), Ok(10));
    assert_eq!(decode("A"), Ok(36));
}

#[test]
fn test_malformed_codes() {
    assert!(matches!(decode("abc!"), Err(CodecError::InvalidCharacter(3, '!'))));
    assert!(matches!(decode(" a"), Err(CodecError::InvalidCharacter(0, ' '))));
    assert_eq!(decode("zzzzzzzzzzzz"), Err(CodecError::Overflow));
}
