//! 时间标签的语法模式。
//!
//! 四种内置严格程度加一种自定义模式:
//! - strict: 只接受 `[00:00.00]`、`<00:00.00>`
//! - normal: 毫秒允许 2-3 位，秒毫秒分隔符允许 `:` 或 `.`
//! - loose: 分秒毫秒任意位数，毫秒可缺失，但括号不可缺失
//! - very_loose: 在 loose 基础上允许括号缺失（裸时间标签）
//! - custom: 调用方提供正则，必须包含全部 7 个命名捕获组

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::LyricError;

/// 自定义模式必须包含的命名捕获组。
pub const CUSTOM_GROUP_NAMES: [&str; 7] = [
    "left_bracket",
    "minutes",
    "minutes_seconds_separator",
    "seconds",
    "seconds_milliseconds_separator",
    "milliseconds",
    "right_bracket",
];

/// 严格模式时间标签的正则表达式。
static STRICT_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<left_bracket>[\[<])(?P<minutes>\d{2})(?P<minutes_seconds_separator>:)(?P<seconds>\d{2})(?P<seconds_milliseconds_separator>\.)(?P<milliseconds>\d{2})(?P<right_bracket>[\]>])",
    )
    .expect("未能编译 STRICT_TAG_REGEX")
});

/// 普通模式时间标签的正则表达式。
static NORMAL_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<left_bracket>[\[<])(?P<minutes>\d{2})(?P<minutes_seconds_separator>:)(?P<seconds>\d{2})(?P<seconds_milliseconds_separator>[:.])(?P<milliseconds>\d{2,3})(?P<right_bracket>[\]>])",
    )
    .expect("未能编译 NORMAL_TAG_REGEX")
});

/// 宽松模式时间标签的正则表达式。毫秒及其分隔符可缺失。
static LOOSE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<left_bracket>[\[<])(?P<minutes>\d*)(?P<minutes_seconds_separator>:)(?P<seconds>\d*)(?P<seconds_milliseconds_separator>[:.])?(?P<milliseconds>\d*)(?P<right_bracket>[\]>])",
    )
    .expect("未能编译 LOOSE_TAG_REGEX")
});

/// 非常宽松模式时间标签的正则表达式。括号也可缺失，此时捕获组为空串。
static VERY_LOOSE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<left_bracket>[\[<]?)(?P<minutes>\d*)(?P<minutes_seconds_separator>:)(?P<seconds>\d*)(?P<seconds_milliseconds_separator>[:.])?(?P<milliseconds>\d*)(?P<right_bracket>[\]>]?)",
    )
    .expect("未能编译 VERY_LOOSE_TAG_REGEX")
});

/// 枚举：时间标签的语法模式。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TagMode {
    /// 严格模式。
    Strict,
    /// 普通模式。
    #[default]
    Normal,
    /// 宽松模式。
    Loose,
    /// 非常宽松模式。
    VeryLoose,
    /// 自定义模式，语法由调用方提供的正则决定。
    Custom,
}

impl TagMode {
    /// 解析本模式实际使用的正则。
    ///
    /// `Custom` 模式必须提供 `custom`，且其中须包含 [`CUSTOM_GROUP_NAMES`]
    /// 的全部命名捕获组；内置模式若误传了 `custom` 则忽略并记录警告。
    ///
    /// # Errors
    ///
    /// `Custom` 模式缺少模式串或捕获组不全时返回
    /// [`LyricError::MissingCustomPattern`]。
    pub fn resolve_pattern<'a>(
        self,
        custom: Option<&'a Regex>,
    ) -> Result<&'a Regex, LyricError> {
        if self == TagMode::Custom {
            let pattern = custom.ok_or_else(|| {
                LyricError::MissingCustomPattern("custom 模式需要提供模式串".to_string())
            })?;
            validate_custom_pattern(pattern)?;
            return Ok(pattern);
        }

        if custom.is_some() {
            tracing::warn!("模式 {self} 不是 custom，提供的自定义模式串将被忽略");
        }

        Ok(match self {
            TagMode::Strict => &STRICT_TAG_REGEX,
            TagMode::Normal => &NORMAL_TAG_REGEX,
            TagMode::Loose => &LOOSE_TAG_REGEX,
            TagMode::VeryLoose => &VERY_LOOSE_TAG_REGEX,
            TagMode::Custom => unreachable!(),
        })
    }
}

/// 校验自定义模式串是否包含全部必需的命名捕获组。
///
/// # Errors
///
/// 缺少任一捕获组时返回 [`LyricError::MissingCustomPattern`]。
pub fn validate_custom_pattern(pattern: &Regex) -> Result<(), LyricError> {
    let names: Vec<&str> = pattern.capture_names().flatten().collect();
    for required in CUSTOM_GROUP_NAMES {
        if !names.contains(&required) {
            return Err(LyricError::MissingCustomPattern(format!(
                "模式串缺少命名捕获组 {required}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        assert_eq!(TagMode::VeryLoose.to_string(), "very_loose");
        assert_eq!(TagMode::from_str("strict").unwrap(), TagMode::Strict);
        assert_eq!(TagMode::from_str("VERY_LOOSE").unwrap(), TagMode::VeryLoose);
        assert_eq!(TagMode::default(), TagMode::Normal);
    }

    #[test]
    fn test_strict_rejects_three_digit_milliseconds() {
        let pattern = TagMode::Strict.resolve_pattern(None).unwrap();
        assert!(pattern.is_match("[00:00.00]"));
        assert!(pattern.is_match("<01:23.45>"));
        assert!(!pattern.is_match("[00:00.000]"));
        assert!(!pattern.is_match("[00:00:00]"));
    }

    #[test]
    fn test_normal_accepts_colon_separator_and_three_digits() {
        let pattern = TagMode::Normal.resolve_pattern(None).unwrap();
        assert!(pattern.is_match("[00:01:000]"));
        assert!(pattern.is_match("[00:01.00]"));
        assert!(!pattern.is_match("[0:1.0]"));
    }

    #[test]
    fn test_loose_allows_missing_milliseconds_but_not_brackets() {
        let pattern = TagMode::Loose.resolve_pattern(None).unwrap();
        assert!(pattern.is_match("[0:1]"));
        assert!(pattern.is_match("[:]"));
        assert!(!pattern.is_match("0:1"));
    }

    #[test]
    fn test_very_loose_allows_bare_tags() {
        let pattern = TagMode::VeryLoose.resolve_pattern(None).unwrap();
        let caps = pattern.captures("0:1.5").unwrap();
        assert_eq!(&caps["left_bracket"], "");
        assert_eq!(&caps["minutes"], "0");
        assert_eq!(&caps["right_bracket"], "");
    }

    #[test]
    fn test_custom_requires_pattern_with_all_groups() {
        assert!(matches!(
            TagMode::Custom.resolve_pattern(None),
            Err(LyricError::MissingCustomPattern(_))
        ));

        let incomplete = Regex::new(r"(?P<minutes>\d+):(?P<seconds>\d+)").unwrap();
        assert!(matches!(
            TagMode::Custom.resolve_pattern(Some(&incomplete)),
            Err(LyricError::MissingCustomPattern(_))
        ));

        let complete = Regex::new(
            r"(?P<left_bracket>\{)(?P<minutes>\d+)(?P<minutes_seconds_separator>,)(?P<seconds>\d+)(?P<seconds_milliseconds_separator>,)(?P<milliseconds>\d+)(?P<right_bracket>\})",
        )
        .unwrap();
        assert!(TagMode::Custom.resolve_pattern(Some(&complete)).is_ok());
    }
}
