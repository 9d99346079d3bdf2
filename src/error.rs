use thiserror::Error;

use crate::time_tag::TagMode;

/// 定义歌词行解析和处理过程中可能发生的各种错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LyricError {
    /// 时间标签文本不符合所请求模式的语法。
    #[error("无效的时间标签: {text:?} (模式: {mode})")]
    InvalidTimeTag {
        /// 未能匹配的原始文本。
        text: String,
        /// 匹配时使用的语法模式。
        mode: TagMode,
    },
    /// 请求了自定义模式但未提供模式串，或模式串缺少必需的命名捕获组。
    #[error("自定义模式无效: {0}")]
    MissingCustomPattern(String),
    /// 除数或模数的时长为零。
    #[error("时间标签除以零")]
    DivisionByZero,
    /// 与不携带时长的值比较或运算。
    #[error("时间标签不可比较: {0}")]
    NotComparable(String),
    /// 时长运算超出可表示范围。
    #[error("时间标签运算溢出")]
    ArithmeticOverflow,
    /// 输入不是恰好一个用户感知字符。
    #[error("无效的字素簇: {0:?}")]
    InvalidGrapheme(String),
    /// 读音分组没有精确覆盖行内字符序列。
    #[error("读音分组与字符序列不匹配: 分组展平为 {actual:?}, 预期 {expected:?}")]
    PartitionMismatch {
        /// 行内字符序列的纯文本。
        expected: String,
        /// 分组展平后的纯文本。
        actual: String,
    },
    /// 假名标签在所有 CJKV 字符消费完之前耗尽。
    #[error("假名标签在消费 {consumed} 个读音对后耗尽")]
    KanaTagExhausted {
        /// 耗尽时已消费的 (读音, 数量) 对数。
        consumed: usize,
    },
    /// 假名标签本身格式错误。
    #[error("假名标签格式错误: {0}")]
    KanaTagMalformed(String),
}
