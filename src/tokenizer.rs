//! 行级分词: 把原始歌词行拆成 (字素, 可选时间标签) 序列。

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::character::AnnotatedCharacter;
use crate::error::LyricError;
use crate::time_tag::{TagMode, TimeTag};

/// 按模式的语法从左到右扫描时间标签，把行拆成歌词字符序列。
///
/// 每个标签绑定到紧随其右括号之后的那一个字素（若在下一个标签或行尾
/// 之前存在）；其余字素不带标签。标签之后没有可绑定字素时该标签被丢弃。
/// 除标签文本本身外，输入的每个字素在输出中恰好出现一次，顺序不变。
///
/// # Errors
///
/// `Custom` 模式缺少模式串或捕获组不全时返回
/// [`LyricError::MissingCustomPattern`]；标签数值溢出时返回
/// [`LyricError::ArithmeticOverflow`]。
pub fn split_line(
    line: &str,
    mode: TagMode,
    custom: Option<&Regex>,
) -> Result<Vec<AnnotatedCharacter>, LyricError> {
    let pattern = mode.resolve_pattern(custom)?;

    let matches: Vec<_> = pattern.captures_iter(line).collect();
    let mut result = Vec::new();
    let mut cursor = 0usize;

    for (index, caps) in matches.iter().enumerate() {
        let span = caps.get(0).expect("捕获组 0 总是存在").range();

        push_untagged(&line[cursor..span.start], &mut result)?;
        cursor = span.end;

        let tag = TimeTag::from_captures(caps)?;
        let next_start = matches
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(line.len(), |m| m.start());

        // 标签只绑定到下一个标签开始之前的字素
        if let Some(grapheme) = line[span.end..next_start].graphemes(true).next() {
            result.push(AnnotatedCharacter::new(grapheme, Some(tag))?);
            cursor += grapheme.len();
        }
    }

    push_untagged(&line[cursor..], &mut result)?;
    Ok(result)
}

fn push_untagged(segment: &str, result: &mut Vec<AnnotatedCharacter>) -> Result<(), LyricError> {
    for grapheme in segment.graphemes(true) {
        result.push(AnnotatedCharacter::new(grapheme, None)?);
    }
    Ok(())
}
