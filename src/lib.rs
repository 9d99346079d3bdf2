//! 卡拉 OK 歌词行级核心类型。
//!
//! 提供逐字时间标签（多种宽严模式的 LRC 语法）、单字素歌词字符、
//! 递归的读音（振假名）标注树、行内容聚合与假名标签编解码，
//! 以及 CJKV 文种判定。

pub mod character;
pub mod error;
pub mod line;
pub mod pronunciation;
pub mod script;
pub mod time_tag;
pub mod tokenizer;

pub use character::AnnotatedCharacter;
pub use error::LyricError;
pub use line::LineContent;
pub use pronunciation::{PronunciationGroup, RenderOptions, RenderOptionsBuilder};
pub use script::{char_is_cjkv, is_cjkv};
pub use time_tag::{FieldWidth, TagMode, TagOperand, TagStyle, TimeFields, TimeTag};
pub use tokenizer::split_line;
