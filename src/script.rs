//! CJKV 文字判定。
//!
//! 仅由一张常量 Unicode 区间表驱动。注意假名与谚文刻意不在表内:
//! 假名标签编解码以本表为分组依据，读音文本（假名）本身不得被算作 CJKV。

/// 汉字、喃字及相关部首/叠字符号的 Unicode 区间（闭区间）。
const CJKV_RANGES: &[(u32, u32)] = &[
    (0x2E80, 0x2EFF),   // CJK 部首补充
    (0x2F00, 0x2FDF),   // 康熙部首
    (0x4E00, 0x9FFF),   // CJK 统一表意符号
    (0xF900, 0xFAFF),   // CJK 兼容表意符号
    (0x2F800, 0x2FA1F), // CJK 兼容表意符号补充
    (0x3400, 0x4DBF),   // 扩展 A
    (0x20000, 0x2A6DF), // 扩展 B
    (0x2A700, 0x2B73F), // 扩展 C
    (0x2B740, 0x2B81F), // 扩展 D
    (0x2B820, 0x2CEAF), // 扩展 E
    (0x2CEB0, 0x2EBEF), // 扩展 F
    (0x30000, 0x3134F), // 扩展 G
    (0x31350, 0x323AF), // 扩展 H
    (0x2EBF0, 0x2EE5F), // 扩展 I
    (0xAA60, 0xAA7F),   // 喃字补充
    (0x3007, 0x3007),   // 〇
    (0x3005, 0x3005),   // 々
    (0x303B, 0x303B),   // 〻
    (0x20120, 0x20120), // 𠄠
    (0x16FE3, 0x16FE3), // 𖿣
];

/// 判断单个标量值是否落在任一 CJKV 区间内。
#[must_use]
pub fn char_is_cjkv(c: char) -> bool {
    let code = c as u32;
    CJKV_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}

/// 判断一个字素簇是否整体为 CJKV。
///
/// 空字符串返回 `false`；多标量字素簇要求每个标量值都在区间内。
#[must_use]
pub fn is_cjkv(grapheme: &str) -> bool {
    !grapheme.is_empty() && grapheme.chars().all(char_is_cjkv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideographs_are_cjkv() {
        assert!(is_cjkv("你"));
        assert!(is_cjkv("他"));
        assert!(is_cjkv("覗"));
        // 叠字符号
        assert!(is_cjkv("々"));
        assert!(is_cjkv("〇"));
    }

    #[test]
    fn test_kana_and_latin_are_not_cjkv() {
        // 假名不在区间表内，否则读音会被当作待注音字符
        assert!(!is_cjkv("あ"));
        assert!(!is_cjkv("ア"));
        assert!(!is_cjkv("N"));
        assert!(!is_cjkv("1"));
        assert!(!is_cjkv(" "));
        assert!(!is_cjkv(""));
    }

    #[test]
    fn test_extension_planes() {
        // 扩展 B 区的字符
        assert!(is_cjkv("\u{20000}"));
        assert!(!is_cjkv("\u{1F600}"));
    }
}
