//! LRC 时间标签。
//!
//! [`TimeTag`] 是不可变的值类型: 从文本解析、由运算派生或直接从时长构造，
//! 任何"修改"都产生一个新的、校验过的值。解析时捕获到的括号、分隔符与
//! 各字段位数会作为标签的记忆样式保留，供之后按原样重新渲染。

pub mod grammar;

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::LyricError;

pub use grammar::{CUSTOM_GROUP_NAMES, TagMode, validate_custom_pattern};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_MILLI: i64 = 1_000;

/// 字段的最小渲染宽度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldWidth {
    /// 左侧补 `0` 到至少这么多位。
    Fixed(usize),
    /// 不设下限，按数值实际位数渲染。
    Unbounded,
}

impl FieldWidth {
    fn pad_left(self, digits: &str) -> String {
        match self {
            FieldWidth::Fixed(width) if digits.len() < width => {
                let mut padded = "0".repeat(width - digits.len());
                padded.push_str(digits);
                padded
            }
            _ => digits.to_string(),
        }
    }
}

/// 时间标签的文本样式: 括号、分隔符、各字段位数与毫秒截断策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStyle {
    /// 括号对。`None` 表示裸标签（very_loose 模式允许）。
    pub brackets: Option<(char, char)>,
    /// (分秒分隔符, 秒毫秒分隔符)。后者为 `None` 表示标签不带毫秒字段。
    pub separators: (char, Option<char>),
    /// 分钟位最小宽度。
    pub minute_width: FieldWidth,
    /// 秒位最小宽度。
    pub second_width: FieldWidth,
    /// 毫秒位最小宽度。
    pub millisecond_width: FieldWidth,
    /// 毫秒位超出最小宽度时是否截断；否则只补齐、不截断。
    pub cut_off_milliseconds: bool,
}

impl Default for TagStyle {
    fn default() -> Self {
        Self {
            brackets: Some(('[', ']')),
            separators: (':', Some('.')),
            minute_width: FieldWidth::Fixed(2),
            second_width: FieldWidth::Fixed(2),
            millisecond_width: FieldWidth::Fixed(2),
            cut_off_milliseconds: true,
        }
    }
}

impl TagStyle {
    /// 逐字时间标签的惯用样式: `<00:00.00>`。
    #[must_use]
    pub fn angle() -> Self {
        Self {
            brackets: Some(('<', '>')),
            ..Self::default()
        }
    }
}

/// 进位/借位规范化后的时间字段。
///
/// 秒与微秒分量始终落在 `[0, 60)` 与 `[0, 1_000_000)` 内
/// （floor 除法语义）；整体为负的时长只在分钟位携带符号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFields {
    /// 分钟数，可为负。
    pub minutes: i64,
    /// 秒数，`[0, 60)`。
    pub seconds: i64,
    /// 秒以下的微秒余量，`[0, 1_000_000)`。
    pub micros: i64,
}

impl TimeFields {
    /// 将微秒总量拆分为规范化字段。
    #[must_use]
    pub fn from_micros(total: i64) -> Self {
        let minutes = total.div_euclid(MICROS_PER_MINUTE);
        let remainder = total.rem_euclid(MICROS_PER_MINUTE);
        Self {
            minutes,
            seconds: remainder / MICROS_PER_SECOND,
            micros: remainder % MICROS_PER_SECOND,
        }
    }

    /// 还原为微秒总量。
    #[must_use]
    pub fn total_micros(&self) -> i64 {
        self.minutes * MICROS_PER_MINUTE + self.seconds * MICROS_PER_SECOND + self.micros
    }
}

/// 可作为时间标签运算右操作数的类型: 另一个标签、秒数或原始时长。
pub trait TagOperand {
    /// 以微秒为单位返回时长视图。
    ///
    /// # Errors
    ///
    /// 不携带时长时返回 [`LyricError::NotComparable`]，
    /// 超出可表示范围时返回 [`LyricError::ArithmeticOverflow`]。
    fn operand_micros(&self) -> Result<i64, LyricError>;
}

impl TagOperand for TimeTag {
    fn operand_micros(&self) -> Result<i64, LyricError> {
        self.micros()
            .ok_or_else(|| LyricError::NotComparable("操作数没有时间信息".to_string()))
    }
}

impl TagOperand for i64 {
    fn operand_micros(&self) -> Result<i64, LyricError> {
        self.checked_mul(MICROS_PER_SECOND)
            .ok_or(LyricError::ArithmeticOverflow)
    }
}

impl TagOperand for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn operand_micros(&self) -> Result<i64, LyricError> {
        if self.is_finite() {
            micros_from_f64(self * MICROS_PER_SECOND as f64)
        } else {
            Err(LyricError::NotComparable(format!("{self} 不是有效的秒数")))
        }
    }
}

impl TagOperand for Duration {
    fn operand_micros(&self) -> Result<i64, LyricError> {
        i64::try_from(self.as_micros()).map_err(|_| LyricError::ArithmeticOverflow)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Timed {
    micros: i64,
    style: TagStyle,
}

/// LRC 时间标签。
///
/// 不携带时长的标签表示"没有时间信息"，此时也不携带任何括号/字段样式，
/// 所有需要时长的格式化操作返回 `None`。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeTag {
    timed: Option<Timed>,
}

impl TimeTag {
    /// 不携带时间信息的标签。
    #[must_use]
    pub const fn empty() -> Self {
        Self { timed: None }
    }

    /// 从时长构造，样式取默认值。
    ///
    /// # Errors
    ///
    /// 时长超出可表示范围时返回 [`LyricError::ArithmeticOverflow`]。
    pub fn from_duration(duration: Duration) -> Result<Self, LyricError> {
        Ok(Self::from_micros(duration.operand_micros()?))
    }

    /// 从微秒总量构造，样式取默认值。
    #[must_use]
    pub fn from_micros(micros: i64) -> Self {
        Self {
            timed: Some(Timed {
                micros,
                style: TagStyle::default(),
            }),
        }
    }

    /// 按内置模式的语法解析时间标签文本。文本必须整体匹配。
    ///
    /// # Errors
    ///
    /// 文本不匹配时返回 [`LyricError::InvalidTimeTag`]。
    pub fn parse(text: &str, mode: TagMode) -> Result<Self, LyricError> {
        Self::parse_with(text, mode, None)
    }

    /// 同 [`TimeTag::parse`]，但允许为 `Custom` 模式提供模式串。
    ///
    /// # Errors
    ///
    /// 文本不匹配时返回 [`LyricError::InvalidTimeTag`]；模式串缺失或
    /// 缺少捕获组时返回 [`LyricError::MissingCustomPattern`]。
    pub fn parse_with(
        text: &str,
        mode: TagMode,
        custom: Option<&Regex>,
    ) -> Result<Self, LyricError> {
        let pattern = mode.resolve_pattern(custom)?;
        let invalid = || LyricError::InvalidTimeTag {
            text: text.to_string(),
            mode,
        };

        let caps = pattern.captures(text).ok_or_else(invalid)?;
        let whole = caps.get(0).ok_or_else(invalid)?;
        if whole.start() != 0 || whole.end() != text.len() {
            return Err(invalid());
        }
        Self::from_captures(&caps)
    }

    /// 由一次成功的语法匹配构造标签，保留捕获到的样式。
    pub(crate) fn from_captures(caps: &Captures<'_>) -> Result<Self, LyricError> {
        let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());

        let minutes_run = group("minutes");
        let seconds_run = group("seconds");
        let millis_run = group("milliseconds");

        let minutes = parse_digit_run(minutes_run)?;
        let seconds = parse_digit_run(seconds_run)?;
        let sub_micros = fraction_micros(millis_run);

        let micros = minutes
            .checked_mul(MICROS_PER_MINUTE)
            .and_then(|m| m.checked_add(seconds.checked_mul(MICROS_PER_SECOND)?))
            .and_then(|m| m.checked_add(sub_micros))
            .ok_or(LyricError::ArithmeticOverflow)?;

        let left = group("left_bracket").chars().next();
        let right = group("right_bracket").chars().next();
        let second_separator = group("seconds_milliseconds_separator").chars().next();

        let style = TagStyle {
            brackets: left.zip(right),
            separators: (
                group("minutes_seconds_separator")
                    .chars()
                    .next()
                    .unwrap_or(':'),
                second_separator,
            ),
            minute_width: FieldWidth::Fixed(minutes_run.len()),
            second_width: FieldWidth::Fixed(seconds_run.len()),
            millisecond_width: FieldWidth::Fixed(millis_run.len()),
            cut_off_milliseconds: true,
        };

        Ok(Self {
            timed: Some(Timed { micros, style }),
        })
    }

    /// 是否携带时间信息。
    #[must_use]
    pub const fn has_time(&self) -> bool {
        self.timed.is_some()
    }

    /// 微秒总量。运算可能产生负值。
    #[must_use]
    pub fn micros(&self) -> Option<i64> {
        self.timed.map(|t| t.micros)
    }

    /// 非负时长视图。负时长返回 `None`。
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        let micros = self.micros()?;
        u64::try_from(micros).ok().map(Duration::from_micros)
    }

    /// 以秒为单位的时长视图。
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn seconds(&self) -> Option<f64> {
        self.micros().map(|m| m as f64 / MICROS_PER_SECOND as f64)
    }

    /// 解析时记住的文本样式。
    #[must_use]
    pub fn style(&self) -> Option<&TagStyle> {
        self.timed.as_ref().map(|t| &t.style)
    }

    /// 换用另一种样式。对无时间信息的标签不产生任何效果。
    #[must_use]
    pub fn with_style(mut self, style: TagStyle) -> Self {
        if let Some(timed) = self.timed.as_mut() {
            timed.style = style;
        }
        self
    }

    /// 按记忆样式渲染。没有时间信息时返回 `None`。
    #[must_use]
    pub fn format(&self) -> Option<String> {
        self.timed
            .as_ref()
            .map(|t| Self::format_fields(t.micros, &t.style))
    }

    /// 按指定样式渲染。没有时间信息时返回 `None`。
    #[must_use]
    pub fn format_with(&self, style: &TagStyle) -> Option<String> {
        self.micros().map(|m| Self::format_fields(m, style))
    }

    /// 将微秒总量按样式渲染为标签文本。
    ///
    /// 分钟取 floor 商、秒取余（负时长借位后只有分钟位带符号），
    /// 分秒按最小宽度左补 `0`，数值 0 在最小宽度为 0 时渲染为空数字串；
    /// 毫秒取秒小数的最短写法，右补 `0` 到最小宽度后，仅在样式要求
    /// 截断时保留前 N 位。
    #[must_use]
    pub fn format_fields(micros: i64, style: &TagStyle) -> String {
        let fields = TimeFields::from_micros(micros);

        let mut out = String::new();
        if let Some((left, _)) = style.brackets {
            out.push(left);
        }
        if fields.minutes < 0 {
            out.push('-');
        }
        out.push_str(&field_digits(
            fields.minutes.unsigned_abs(),
            style.minute_width,
        ));
        out.push(style.separators.0);
        out.push_str(&field_digits(
            fields.seconds.unsigned_abs(),
            style.second_width,
        ));
        if let Some(separator) = style.separators.1 {
            out.push(separator);
            out.push_str(&millisecond_digits(
                fields.micros,
                style.millisecond_width,
                style.cut_off_milliseconds,
            ));
        }
        if let Some((_, right)) = style.brackets {
            out.push(right);
        }
        out
    }

    /// 时长相加，样式继承左操作数。
    ///
    /// # Errors
    ///
    /// 任一侧没有时长时返回 [`LyricError::NotComparable`]，
    /// 溢出时返回 [`LyricError::ArithmeticOverflow`]。
    pub fn checked_add(&self, rhs: &impl TagOperand) -> Result<Self, LyricError> {
        let (lhs, style) = self.operand_parts()?;
        let micros = lhs
            .checked_add(rhs.operand_micros()?)
            .ok_or(LyricError::ArithmeticOverflow)?;
        Ok(Self::with_parts(micros, style))
    }

    /// 时长相减，样式继承左操作数。结果可为负，渲染前会借位规范化。
    ///
    /// # Errors
    ///
    /// 同 [`TimeTag::checked_add`]。
    pub fn checked_sub(&self, rhs: &impl TagOperand) -> Result<Self, LyricError> {
        let (lhs, style) = self.operand_parts()?;
        let micros = lhs
            .checked_sub(rhs.operand_micros()?)
            .ok_or(LyricError::ArithmeticOverflow)?;
        Ok(Self::with_parts(micros, style))
    }

    /// 按右操作数的秒数值缩放时长。
    ///
    /// # Errors
    ///
    /// 同 [`TimeTag::checked_add`]。
    pub fn checked_mul(&self, rhs: &impl TagOperand) -> Result<Self, LyricError> {
        let (lhs, style) = self.operand_parts()?;
        let factor = seconds_value(rhs.operand_micros()?);
        #[allow(clippy::cast_precision_loss)]
        let micros = micros_from_f64(lhs as f64 * factor)?;
        Ok(Self::with_parts(micros, style))
    }

    /// 按右操作数的秒数值等分时长。
    ///
    /// # Errors
    ///
    /// 除数时长为零时返回 [`LyricError::DivisionByZero`]，
    /// 其余同 [`TimeTag::checked_add`]。
    pub fn checked_div(&self, rhs: &impl TagOperand) -> Result<Self, LyricError> {
        let (lhs, style) = self.operand_parts()?;
        let divisor = rhs.operand_micros()?;
        if divisor == 0 {
            return Err(LyricError::DivisionByZero);
        }
        #[allow(clippy::cast_precision_loss)]
        let micros = micros_from_f64(lhs as f64 / seconds_value(divisor))?;
        Ok(Self::with_parts(micros, style))
    }

    /// 对右操作数的时长取模（floor 语义，结果非负）。
    ///
    /// # Errors
    ///
    /// 模数时长为零时返回 [`LyricError::DivisionByZero`]，
    /// 其余同 [`TimeTag::checked_add`]。
    pub fn checked_rem(&self, rhs: &impl TagOperand) -> Result<Self, LyricError> {
        let (lhs, style) = self.operand_parts()?;
        let modulus = rhs.operand_micros()?;
        if modulus == 0 {
            return Err(LyricError::DivisionByZero);
        }
        let micros = lhs
            .checked_rem_euclid(modulus)
            .ok_or(LyricError::ArithmeticOverflow)?;
        Ok(Self::with_parts(micros, style))
    }

    /// 以右操作数的秒数值为指数，对秒数值取幂。
    ///
    /// # Errors
    ///
    /// 同 [`TimeTag::checked_add`]。
    pub fn checked_pow(&self, rhs: &impl TagOperand) -> Result<Self, LyricError> {
        let (lhs, style) = self.operand_parts()?;
        let result_seconds = seconds_value(lhs).powf(seconds_value(rhs.operand_micros()?));
        #[allow(clippy::cast_precision_loss)]
        let micros = micros_from_f64(result_seconds * MICROS_PER_SECOND as f64)?;
        Ok(Self::with_parts(micros, style))
    }

    /// 按分/秒/毫秒平移时长，样式保持不变。
    ///
    /// # Errors
    ///
    /// 同 [`TimeTag::checked_add`]。
    pub fn shifted(
        &self,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
    ) -> Result<Self, LyricError> {
        let offset = minutes
            .checked_mul(MICROS_PER_MINUTE)
            .and_then(|m| m.checked_add(seconds.checked_mul(MICROS_PER_SECOND)?))
            .and_then(|m| m.checked_add(milliseconds.checked_mul(MICROS_PER_MILLI)?))
            .ok_or(LyricError::ArithmeticOverflow)?;
        let (lhs, style) = self.operand_parts()?;
        let micros = lhs
            .checked_add(offset)
            .ok_or(LyricError::ArithmeticOverflow)?;
        Ok(Self::with_parts(micros, style))
    }

    /// 按时长全序比较。
    ///
    /// # Errors
    ///
    /// 任一侧不携带时长时返回 [`LyricError::NotComparable`]。
    pub fn try_cmp(&self, rhs: &impl TagOperand) -> Result<Ordering, LyricError> {
        let lhs = TagOperand::operand_micros(self)?;
        Ok(lhs.cmp(&rhs.operand_micros()?))
    }

    fn operand_parts(&self) -> Result<(i64, TagStyle), LyricError> {
        self.timed
            .map(|t| (t.micros, t.style))
            .ok_or_else(|| LyricError::NotComparable("操作数没有时间信息".to_string()))
    }

    const fn with_parts(micros: i64, style: TagStyle) -> Self {
        Self {
            timed: Some(Timed { micros, style }),
        }
    }
}

impl PartialEq for TimeTag {
    /// 只按时长比较，忽略文本样式。
    fn eq(&self, other: &Self) -> bool {
        self.micros() == other.micros()
    }
}

impl PartialOrd for TimeTag {
    /// 任一侧不携带时长时不可比较。
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.micros()?.cmp(&other.micros()?))
    }
}

impl fmt::Display for TimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

/// 空数字串按 0 处理。
fn parse_digit_run(run: &str) -> Result<i64, LyricError> {
    if run.is_empty() {
        Ok(0)
    } else {
        run.parse().map_err(|_| LyricError::ArithmeticOverflow)
    }
}

/// 毫秒数字串读作秒的小数部分: 右补到微秒精度，前 3 位是毫秒，
/// 第 4 位起是亚毫秒余量。微秒以下的位数被舍弃。
fn fraction_micros(run: &str) -> i64 {
    let mut micros = 0i64;
    for (index, digit) in run.chars().take(6).enumerate() {
        let value = i64::from(digit.to_digit(10).unwrap_or(0));
        micros += value * 10i64.pow(5 - u32::try_from(index).unwrap_or(0));
    }
    micros
}

/// 渲染分/秒字段。数值 0 在最小宽度为 0 时渲染为空数字串，
/// 使解析出的空数字串按记忆样式重渲染时仍为空。
fn field_digits(value: u64, width: FieldWidth) -> String {
    if value == 0 && width == FieldWidth::Fixed(0) {
        return String::new();
    }
    width.pad_left(&value.to_string())
}

/// 渲染秒以下余量的数字串。
///
/// 先取余量作为秒小数的最短写法（去掉尾随 0，余量为 0 时为空串），
/// 再右补 `0` 到最小宽度；仅在样式要求截断时保留前 N 位。
fn millisecond_digits(sub_micros: i64, width: FieldWidth, cut_off: bool) -> String {
    debug_assert!((0..MICROS_PER_SECOND).contains(&sub_micros));

    let fraction = format!("{sub_micros:06}");
    let mut digits = fraction.trim_end_matches('0').to_string();

    if let FieldWidth::Fixed(width) = width {
        while digits.len() < width {
            digits.push('0');
        }
        if cut_off && digits.len() > width {
            digits.truncate(width);
        }
    }
    digits
}

/// 微秒总量的秒数值视图。
#[allow(clippy::cast_precision_loss)]
fn seconds_value(micros: i64) -> f64 {
    micros as f64 / MICROS_PER_SECOND as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn micros_from_f64(value: f64) -> Result<i64, LyricError> {
    if !value.is_finite() {
        return Err(LyricError::ArithmeticOverflow);
    }
    let rounded = value.round();
    if rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
        Ok(rounded as i64)
    } else {
        Err(LyricError::ArithmeticOverflow)
    }
}
