//! 假名标签编解码。
//!
//! 假名标签是一行读音的紧凑文本表示: 每段连续的 CJKV 字符对应一个
//! `(读音)(数量)` 对，非 CJKV 字符不出现在标签中。例如 `你他` 配读音
//! `にた` 的标签是 `にた2`。语法没有转义，读音文本里不允许出现数字。

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::character::AnnotatedCharacter;
use crate::error::LyricError;
use crate::pronunciation::PronunciationGroup;

use super::LineContent;

static KANA_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<reading>\D*)(?P<count>\d+)").expect("假名标签正则应当有效")
});

/// 把行的读音分组编码为假名标签。
///
/// 含 CJKV 字符的分组写出其一层读音文本与 CJKV 字符数，
/// 其余分组跳过。没有读音的分组只写出数字。
pub(super) fn encode(line: &LineContent) -> Result<String, LyricError> {
    let mut tag = String::new();
    for group in line.groups() {
        let count = group.count_cjkv();
        if count == 0 {
            continue;
        }

        let reading = group.reading_text();
        if reading.chars().any(char::is_numeric) {
            return Err(LyricError::KanaTagMalformed(reading));
        }
        tag.push_str(&reading);
        tag.push_str(&count.to_string());
    }
    Ok(tag)
}

/// 按假名标签把行的字符序列重新划分为读音分组。
///
/// 非 CJKV 字符按连续段收进无读音分组；每遇到一段 CJKV 字符就消耗
/// 一个 `(读音, 数量)` 对，取接下来 `数量` 个字符作为基底。
pub(super) fn decode(
    line: &LineContent,
    kana_tag: &str,
) -> Result<Vec<PronunciationGroup>, LyricError> {
    let mut pairs = parse_pairs(kana_tag)?.into_iter();
    let characters = line.characters();

    let mut groups = Vec::new();
    let mut pending: Vec<AnnotatedCharacter> = Vec::new();
    let mut consumed = 0usize;
    let mut cursor = 0usize;

    while let Some(character) = characters.get(cursor) {
        if !character.is_cjkv() {
            pending.push(character.clone());
            cursor += 1;
            continue;
        }

        if !pending.is_empty() {
            groups.push(PronunciationGroup::unannotated(std::mem::take(&mut pending)));
        }

        let Some((reading, count)) = pairs.next() else {
            return Err(LyricError::KanaTagExhausted { consumed });
        };
        consumed += 1;

        let end = cursor
            .checked_add(count)
            .ok_or_else(|| LyricError::KanaTagMalformed(kana_tag.to_string()))?;
        let base = characters
            .get(cursor..end)
            .filter(|base| base.iter().all(AnnotatedCharacter::is_cjkv))
            .ok_or_else(|| LyricError::KanaTagMalformed(kana_tag.to_string()))?;
        groups.push(PronunciationGroup::new(
            base.to_vec(),
            reading_group(&reading)?,
        ));
        cursor = end;
    }

    if !pending.is_empty() {
        groups.push(PronunciationGroup::unannotated(pending));
    }
    Ok(groups)
}

/// 把标签文本拆成 `(读音, 数量)` 对，要求正好覆盖整个标签。
fn parse_pairs(kana_tag: &str) -> Result<Vec<(String, usize)>, LyricError> {
    let mut pairs = Vec::new();
    let mut covered = 0usize;

    for caps in KANA_TAG_REGEX.captures_iter(kana_tag) {
        let whole = caps.get(0).expect("捕获组 0 总是存在");
        if whole.start() != covered {
            break;
        }
        covered = whole.end();

        let count: usize = caps["count"]
            .parse()
            .map_err(|_| LyricError::KanaTagMalformed(kana_tag.to_string()))?;
        if count == 0 {
            return Err(LyricError::KanaTagMalformed(kana_tag.to_string()));
        }
        pairs.push((caps["reading"].to_string(), count));
    }

    // 尾部残留的非法文本（如没有数量的读音）视为坏标签
    if covered != kana_tag.len() {
        return Err(LyricError::KanaTagMalformed(kana_tag.to_string()));
    }
    Ok(pairs)
}

fn reading_group(reading: &str) -> Result<Option<Vec<PronunciationGroup>>, LyricError> {
    if reading.is_empty() {
        return Ok(None);
    }
    let characters = reading
        .graphemes(true)
        .map(|g| AnnotatedCharacter::new(g, None))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(vec![PronunciationGroup::unannotated(characters)]))
}
