//! 歌词行内容: 扁平字符序列加读音分组列表。
//!
//! 不变量: 按顺序拼接每个分组的基底字符必须精确还原扁平字符序列
//! （分组构成字符序列的一个有序划分，无缺口、无重叠）。

mod kana_tag;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::character::AnnotatedCharacter;
use crate::error::LyricError;
use crate::pronunciation::{PronunciationGroup, RenderOptions};
use crate::time_tag::TagMode;
use crate::tokenizer;

/// 一行歌词的内容。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineContent {
    characters: Vec<AnnotatedCharacter>,
    groups: Vec<PronunciationGroup>,
}

impl LineContent {
    /// 从原始行文本构造: 分词得到字符序列，读音初始化为单个
    /// 覆盖全行的无读音分组。
    ///
    /// # Errors
    ///
    /// 分词失败时原样传出 [`LyricError`]。
    pub fn from_text(
        raw: &str,
        mode: TagMode,
        custom: Option<&Regex>,
    ) -> Result<Self, LyricError> {
        let characters = tokenizer::split_line(raw, mode, custom)?;
        let groups = vec![PronunciationGroup::unannotated(characters.clone())];
        Ok(Self { characters, groups })
    }

    /// 从读音分组列表构造，字符序列由分组展平得到。
    #[must_use]
    pub fn from_groups(groups: Vec<PronunciationGroup>) -> Self {
        let characters = flatten(&groups);
        Self { characters, groups }
    }

    /// 扁平字符序列。
    #[must_use]
    pub fn characters(&self) -> &[AnnotatedCharacter] {
        &self.characters
    }

    /// 读音分组列表。
    #[must_use]
    pub fn groups(&self) -> &[PronunciationGroup] {
        &self.groups
    }

    /// 整体替换读音分组列表。
    ///
    /// # Errors
    ///
    /// 新分组展平后与现有字符序列不一致时返回
    /// [`LyricError::PartitionMismatch`]，行内容保持不变。
    pub fn set_groups(&mut self, groups: Vec<PronunciationGroup>) -> Result<(), LyricError> {
        let flattened = flatten(&groups);
        if flattened != self.characters {
            return Err(LyricError::PartitionMismatch {
                expected: self.plain_text(),
                actual: flattened
                    .iter()
                    .map(AnnotatedCharacter::grapheme)
                    .collect(),
            });
        }
        self.groups = groups;
        Ok(())
    }

    /// 行的纯文本。
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.characters
            .iter()
            .map(AnnotatedCharacter::grapheme)
            .collect()
    }

    /// 行的读音文本: 各分组一层读音的拼接。
    #[must_use]
    pub fn reading_text(&self) -> String {
        self.groups
            .iter()
            .map(PronunciationGroup::reading_text)
            .collect()
    }

    /// 按选项渲染整行: 依次渲染每个读音分组。
    #[must_use]
    pub fn render(&self, options: &RenderOptions) -> String {
        self.groups
            .iter()
            .map(|group| group.render(options))
            .collect()
    }

    /// 拼接两行，字符序列由合并后的分组重新展平。
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut groups = self.groups.clone();
        groups.extend_from_slice(&other.groups);
        Self::from_groups(groups)
    }

    /// 重复本行 `n` 次。
    #[must_use]
    pub fn repeat(&self, n: usize) -> Self {
        let mut groups = Vec::with_capacity(self.groups.len() * n);
        for _ in 0..n {
            groups.extend_from_slice(&self.groups);
        }
        Self::from_groups(groups)
    }

    /// 行内所有 CJKV 字符及其字符下标。
    #[must_use]
    pub fn cjkv_positions(&self) -> Vec<(usize, &str)> {
        self.characters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_cjkv())
            .map(|(index, c)| (index, c.grapheme()))
            .collect()
    }

    /// 把当前读音分组编码为假名标签: 每段 CJKV 对应一个
    /// `(读音)(数量)` 对，非 CJKV 字符不出现在标签中。
    ///
    /// # Errors
    ///
    /// 读音文本含数字时返回 [`LyricError::KanaTagMalformed`]。
    pub fn encode_kana_tag(&self) -> Result<String, LyricError> {
        kana_tag::encode(self)
    }

    /// 按假名标签把字符序列重新分组，返回新的分组列表，不修改本行。
    ///
    /// # Errors
    ///
    /// 标签耗尽时返回 [`LyricError::KanaTagExhausted`]，
    /// 标签格式错误时返回 [`LyricError::KanaTagMalformed`]。
    pub fn decode_kana_tag(
        &self,
        kana_tag: &str,
    ) -> Result<Vec<PronunciationGroup>, LyricError> {
        kana_tag::decode(self, kana_tag)
    }

    /// 用假名标签刷新所有读音，原有读音被整体洗掉。
    ///
    /// # Errors
    ///
    /// 同 [`LineContent::decode_kana_tag`]；失败时行内容保持不变。
    pub fn apply_kana_tag(&mut self, kana_tag: &str) -> Result<(), LyricError> {
        let groups = self.decode_kana_tag(kana_tag)?;
        tracing::debug!("以假名标签 {kana_tag:?} 重建 {} 个读音分组", groups.len());
        self.set_groups(groups)
    }
}

fn flatten(groups: &[PronunciationGroup]) -> Vec<AnnotatedCharacter> {
    groups
        .iter()
        .flat_map(|group| group.base().iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pronunciation::RenderOptions;

    fn chars(text: &str) -> Vec<AnnotatedCharacter> {
        use unicode_segmentation::UnicodeSegmentation;
        text.graphemes(true)
            .map(|g| AnnotatedCharacter::new(g, None).unwrap())
            .collect()
    }

    #[test]
    fn test_from_text_initializes_single_group() {
        let line = LineContent::from_text("<00:01.00>你a", TagMode::Normal, None).unwrap();
        assert_eq!(line.plain_text(), "你a");
        assert_eq!(line.groups().len(), 1);
        assert!(line.groups()[0].reading().is_none());
        assert_eq!(line.characters()[0].time_tag().unwrap().micros(), Some(1_000_000));
    }

    #[test]
    fn test_from_groups_flattens() {
        let groups = vec![
            PronunciationGroup::new(
                chars("你"),
                Some(vec![PronunciationGroup::unannotated(chars("に"))]),
            ),
            PronunciationGroup::unannotated(chars("ab")),
        ];
        let line = LineContent::from_groups(groups);
        assert_eq!(line.plain_text(), "你ab");
        assert_eq!(line.reading_text(), "に");
        assert_eq!(line.characters().len(), 3);
    }

    #[test]
    fn test_set_groups_checks_partition() {
        let mut line = LineContent::from_text("你他", TagMode::Normal, None).unwrap();

        // 划分一致: 替换成功
        let ok = vec![
            PronunciationGroup::unannotated(chars("你")),
            PronunciationGroup::unannotated(chars("他")),
        ];
        line.set_groups(ok).unwrap();
        assert_eq!(line.groups().len(), 2);

        // 划分不一致: 报错且行内容不变
        let bad = vec![PronunciationGroup::unannotated(chars("你"))];
        let err = line.set_groups(bad).unwrap_err();
        assert!(matches!(err, LyricError::PartitionMismatch { .. }));
        assert_eq!(line.groups().len(), 2);
    }

    #[test]
    fn test_render_walks_groups() {
        let groups = vec![
            PronunciationGroup::new(
                chars("你"),
                Some(vec![PronunciationGroup::unannotated(chars("に"))]),
            ),
            PronunciationGroup::unannotated(chars("!")),
        ];
        let line = LineContent::from_groups(groups);
        assert_eq!(line.render(&RenderOptions::plain()), "你!");
        assert_eq!(line.render(&RenderOptions::with_readings()), "你(に)!");
    }

    #[test]
    fn test_concat_and_repeat() {
        let a = LineContent::from_groups(vec![PronunciationGroup::new(
            chars("你"),
            Some(vec![PronunciationGroup::unannotated(chars("に"))]),
        )]);
        let b = LineContent::from_text("x", TagMode::Normal, None).unwrap();

        let joined = a.concat(&b);
        assert_eq!(joined.plain_text(), "你x");
        assert_eq!(joined.reading_text(), "に");

        let repeated = a.repeat(3);
        assert_eq!(repeated.plain_text(), "你你你");
        assert_eq!(repeated.reading_text(), "ににに");
        assert!(a.repeat(0).characters().is_empty());
    }

    #[test]
    fn test_partition_invariant_holds_after_construction() {
        for line in [
            LineContent::from_text("1<00:00.00>あ你他", TagMode::VeryLoose, None).unwrap(),
            LineContent::from_groups(vec![PronunciationGroup::unannotated(chars("abc"))]),
        ] {
            let flattened: String = line
                .groups()
                .iter()
                .map(PronunciationGroup::base_text)
                .collect();
            assert_eq!(flattened, line.plain_text());
        }
    }

    #[test]
    fn test_cjkv_positions() {
        let line = LineContent::from_text("1あ你a他", TagMode::Normal, None).unwrap();
        assert_eq!(line.cjkv_positions(), vec![(2, "你"), (4, "他")]);
    }
}
