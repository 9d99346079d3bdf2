//! 歌词字符: 一个用户感知字符与可选的逐字时间标签。

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::LyricError;
use crate::script;
use crate::time_tag::{TagStyle, TimeTag};

/// 单个歌词字符。
///
/// 显式的包装类型而不是字符串的子类型: 只暴露需要的操作，
/// 避免切片等会破坏字素簇不变量的字符串接口。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCharacter {
    grapheme: String,
    time_tag: Option<TimeTag>,
}

impl AnnotatedCharacter {
    /// 构造歌词字符。`grapheme` 必须恰好是一个扩展字素簇。
    ///
    /// # Errors
    ///
    /// 输入为空或包含多个字素簇时返回 [`LyricError::InvalidGrapheme`]。
    pub fn new(grapheme: &str, time_tag: Option<TimeTag>) -> Result<Self, LyricError> {
        let mut clusters = grapheme.graphemes(true);
        match (clusters.next(), clusters.next()) {
            (Some(_), None) => Ok(Self {
                grapheme: grapheme.to_string(),
                time_tag,
            }),
            _ => Err(LyricError::InvalidGrapheme(grapheme.to_string())),
        }
    }

    /// 字符文本。
    #[must_use]
    pub fn grapheme(&self) -> &str {
        &self.grapheme
    }

    /// 逐字时间标签。
    #[must_use]
    pub const fn time_tag(&self) -> Option<&TimeTag> {
        self.time_tag.as_ref()
    }

    /// 是否为 CJKV 字符。
    #[must_use]
    pub fn is_cjkv(&self) -> bool {
        script::is_cjkv(&self.grapheme)
    }

    /// 渲染字符。`include_time` 为真且字符带有时间标签时，
    /// 以 `style` 将标签渲染为前缀。
    #[must_use]
    pub fn render(&self, include_time: bool, style: &TagStyle) -> String {
        if include_time
            && let Some(formatted) = self.time_tag.as_ref().and_then(|t| t.format_with(style))
        {
            let mut out = formatted;
            out.push_str(&self.grapheme);
            return out;
        }
        self.grapheme.clone()
    }
}
