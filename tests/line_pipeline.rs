//! 整行处理流程的集成测试: 分词 → 读音标注 → 假名标签 → 渲染。

use lyric_line_core::{
    LineContent, LyricError, RenderOptions, TagMode, TagStyle, TimeTag,
};

#[test]
fn tokenize_annotate_and_render() {
    let mut line =
        LineContent::from_text("<00:00.50>雨<00:01.20>に<00:02.00>歌う", TagMode::Normal, None)
            .unwrap();
    assert_eq!(line.plain_text(), "雨に歌う");

    line.apply_kana_tag("あめ1うた1").unwrap();
    assert_eq!(line.reading_text(), "あめうた");
    assert_eq!(line.cjkv_positions(), vec![(0, "雨"), (2, "歌")]);

    assert_eq!(line.render(&RenderOptions::plain()), "雨に歌う");
    assert_eq!(
        line.render(&RenderOptions::default()),
        "<00:00.50>雨<00:01.20>に<00:02.00>歌う"
    );
    assert_eq!(
        line.render(&RenderOptions {
            include_time: false,
            include_reading: true,
            ..RenderOptions::default()
        }),
        "雨(あめ)に歌(うた)う"
    );
}

#[test]
fn kana_tag_round_trip_survives_concat() {
    let mut first = LineContent::from_text("你x", TagMode::Normal, None).unwrap();
    first.apply_kana_tag("に1").unwrap();
    let mut second = LineContent::from_text("他", TagMode::Normal, None).unwrap();
    second.apply_kana_tag("た1").unwrap();

    let joined = first.concat(&second);
    assert_eq!(joined.plain_text(), "你x他");
    assert_eq!(joined.encode_kana_tag().unwrap(), "に1た1");

    let rebuilt = LineContent::from_groups(
        joined.decode_kana_tag("に1た1").unwrap(),
    );
    assert_eq!(rebuilt, joined);
}

#[test]
fn failed_kana_tag_leaves_line_untouched() {
    let mut line = LineContent::from_text("你他", TagMode::Normal, None).unwrap();
    line.apply_kana_tag("にた2").unwrap();

    let err = line.apply_kana_tag("に1").unwrap_err();
    assert_eq!(err, LyricError::KanaTagExhausted { consumed: 1 });
    assert_eq!(line.encode_kana_tag().unwrap(), "にた2");
}

#[test]
fn loose_tags_shift_and_reformat() {
    let line = LineContent::from_text("[0:1]あ[0:2.5]い", TagMode::Loose, None).unwrap();
    let shifted: Vec<String> = line
        .characters()
        .iter()
        .filter_map(|c| c.time_tag())
        .map(|tag| {
            let moved = tag.checked_add(&1i64).unwrap();
            moved.with_style(TagStyle::default()).format().unwrap()
        })
        .collect();
    assert_eq!(shifted, ["[00:02.00]", "[00:03.50]"]);
}

#[test]
fn strict_tag_survives_arithmetic_round_trip() {
    let tag = TimeTag::parse("[01:23.45]", TagMode::Strict).unwrap();
    let back = tag.checked_add(&30i64).unwrap().checked_sub(&30i64).unwrap();
    assert_eq!(back.format().unwrap(), "[01:23.45]");
}
