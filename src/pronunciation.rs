//! 读音（振假名）标注树。
//!
//! 一个 [`PronunciationGroup`] 把一段连续的歌词字符与它的读音绑定。
//! 读音本身是一列子分组，子分组还可以再带自己的读音，深度不限。
//! 子分组被父分组独占持有，不存在共享或回指，因此是树而不是图。

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::character::AnnotatedCharacter;
use crate::time_tag::TagStyle;

/// 渲染选项。
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct RenderOptions {
    /// 读音递归的最大深度，`None` 表示不限。超出深度时静默停止递归。
    pub max_depth: Option<usize>,
    /// 是否把时间标签渲染为字符前缀。
    pub include_time: bool,
    /// 是否把读音递归渲染为 `(…)` 后缀。
    pub include_reading: bool,
    /// 渲染时间标签使用的样式。
    pub time_style: TagStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_time: true,
            include_reading: false,
            time_style: TagStyle::angle(),
        }
    }
}

impl RenderOptions {
    /// 纯文本渲染: 不带时间标签、不带读音。
    #[must_use]
    pub fn plain() -> Self {
        Self {
            include_time: false,
            ..Self::default()
        }
    }

    /// 带读音的渲染。
    #[must_use]
    pub fn with_readings() -> Self {
        Self {
            include_reading: true,
            ..Self::default()
        }
    }
}

/// 读音标注树的一个节点: 一段字符与可选的读音子分组列表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationGroup {
    base: Vec<AnnotatedCharacter>,
    reading: Option<Vec<PronunciationGroup>>,
}

impl PronunciationGroup {
    /// 构造分组。
    ///
    /// # Panics
    ///
    /// `reading` 为 `Some` 但列表为空时 panic——空读音应当用 `None`
    /// 表达，传入空列表是调用方的编程错误而不是坏输入。
    #[must_use]
    pub fn new(
        base: Vec<AnnotatedCharacter>,
        reading: Option<Vec<PronunciationGroup>>,
    ) -> Self {
        assert!(
            reading.as_ref().is_none_or(|r| !r.is_empty()),
            "存在的读音列表不能为空"
        );
        Self { base, reading }
    }

    /// 不带读音的分组。
    #[must_use]
    pub const fn unannotated(base: Vec<AnnotatedCharacter>) -> Self {
        Self {
            base,
            reading: None,
        }
    }

    /// 分组覆盖的字符。
    #[must_use]
    pub fn base(&self) -> &[AnnotatedCharacter] {
        &self.base
    }

    /// 读音子分组。
    #[must_use]
    pub fn reading(&self) -> Option<&[PronunciationGroup]> {
        self.reading.as_deref()
    }

    /// 字符文本的拼接。
    #[must_use]
    pub fn base_text(&self) -> String {
        self.base
            .iter()
            .map(AnnotatedCharacter::grapheme)
            .collect()
    }

    /// 读音文本: 只拼接直接子分组的 `base_text`，不递归。
    #[must_use]
    pub fn reading_text(&self) -> String {
        self.reading
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(PronunciationGroup::base_text)
            .collect()
    }

    /// 拼接两个分组。缺失的读音按空列表处理；只有两侧都没有读音时
    /// 结果才没有读音。
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut base = self.base.clone();
        base.extend_from_slice(&other.base);

        let reading = if self.reading.is_none() && other.reading.is_none() {
            None
        } else {
            let mut combined = self.reading.clone().unwrap_or_default();
            combined.extend_from_slice(other.reading.as_deref().unwrap_or_default());
            Some(combined)
        };

        Self { base, reading }
    }

    /// 重复分组 `n` 次。读音（若有）也按元素重复 `n` 次，
    /// 与重复后的各段字符保持对齐。`n == 0` 得到空分组。
    #[must_use]
    pub fn repeat(&self, n: usize) -> Self {
        if n == 0 {
            return Self::unannotated(Vec::new());
        }

        let mut base = Vec::with_capacity(self.base.len() * n);
        let mut reading: Option<Vec<PronunciationGroup>> = self.reading.as_ref().map(|r| {
            Vec::with_capacity(r.len() * n)
        });
        for _ in 0..n {
            base.extend_from_slice(&self.base);
            if let (Some(acc), Some(r)) = (reading.as_mut(), self.reading.as_deref()) {
                acc.extend_from_slice(r);
            }
        }
        Self { base, reading }
    }

    /// 基底字符是否全部为 CJKV（空分组不算）。
    #[must_use]
    pub fn is_cjkv(&self) -> bool {
        !self.base.is_empty() && self.base.iter().all(AnnotatedCharacter::is_cjkv)
    }

    /// 基底字符中是否含有 CJKV 字符。
    #[must_use]
    pub fn contains_cjkv(&self) -> bool {
        self.base.iter().any(AnnotatedCharacter::is_cjkv)
    }

    /// 基底字符中 CJKV 字符的数量。
    #[must_use]
    pub fn count_cjkv(&self) -> usize {
        self.base.iter().filter(|c| c.is_cjkv()).count()
    }

    /// 渲染分组。
    ///
    /// 按顺序渲染每个字符（时间标签按选项作为前缀）；若启用读音且
    /// 仍在深度限制内，每个读音子分组递归渲染后以 `(…)` 包裹、
    /// 依次追加在基底文本之后。超出深度只渲染基底，不是错误。
    #[must_use]
    pub fn render(&self, options: &RenderOptions) -> String {
        self.render_at(options, 0)
    }

    fn render_at(&self, options: &RenderOptions, depth: usize) -> String {
        let mut out = String::new();
        for character in &self.base {
            out.push_str(&character.render(options.include_time, &options.time_style));
        }

        if options.include_reading
            && options.max_depth.is_none_or(|max| depth < max)
            && let Some(reading) = self.reading.as_deref()
        {
            for child in reading {
                out.push('(');
                out.push_str(&child.render_at(options, depth + 1));
                out.push(')');
            }
        }
        out
    }
}
