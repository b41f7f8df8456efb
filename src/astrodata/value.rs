use crate::types::Value;
use hifitime::{Epoch, Unit};
use std::fmt::{self, Display, Formatter, Write};

/// The value of a descriptor.
///
/// `Display` renders the value the way it has always been printed by the
/// data reduction tools: `None`, `True`, `300.0`, `GMOS-N`,
/// `[1.0, None]`, `(0, 2048, 0, 4608)`, `2017-01-01 10:20:30`.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorValue {
    /// No value
    None,
    /// A boolean
    Bool(bool),
    /// An integer
    Int(i64),
    /// A floating point number
    Float(f64),
    /// A string
    Str(String),
    /// A complex number `(real, imaginary)`
    Complex(f64, f64),
    /// A 0-based, end-exclusive section of an array
    Section(Section),
    /// A calendar date
    Date(Date),
    /// A time of day
    Time(Time),
    /// A date and a time of day
    DateTime(DateTime),
    /// A fixed group of values
    Tuple(Vec<DescriptorValue>),
    /// One value per extension, or any other sequence of values
    List(Vec<DescriptorValue>),
}

impl DescriptorValue {
    /// `true` for `DescriptorValue::None`
    pub fn is_none(&self) -> bool {
        matches!(self, DescriptorValue::None)
    }

    /// The number, for integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DescriptorValue::Int(n) => Some(*n as f64),
            DescriptorValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The integer, for integers
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DescriptorValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, for strings
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DescriptorValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The date and time, for datetimes
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            DescriptorValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    fn write_repr<W: Write>(&self, w: &mut W) -> fmt::Result {
        match self {
            DescriptorValue::Str(s) => w.write_str(&quoted(s)),
            DescriptorValue::Date(d) => write!(w, "datetime.date({}, {}, {})", d.year, d.month, d.day),
            DescriptorValue::Time(t) => {
                write!(w, "datetime.time({}, {}{})", t.hour, t.minute, t.repr_seconds())
            }
            DescriptorValue::DateTime(DateTime { date, time }) => write!(
                w,
                "datetime.datetime({}, {}, {}, {}, {}{})",
                date.year,
                date.month,
                date.day,
                time.hour,
                time.minute,
                time.repr_seconds()
            ),
            other => other.write_str(w),
        }
    }

    fn write_str<W: Write>(&self, w: &mut W) -> fmt::Result {
        match self {
            DescriptorValue::None => w.write_str("None"),
            DescriptorValue::Bool(true) => w.write_str("True"),
            DescriptorValue::Bool(false) => w.write_str("False"),
            DescriptorValue::Int(n) => write!(w, "{}", n),
            DescriptorValue::Float(f) => w.write_str(&float_repr(*f)),
            DescriptorValue::Str(s) => w.write_str(s),
            DescriptorValue::Complex(re, im) => w.write_str(&complex_repr(*re, *im)),
            DescriptorValue::Section(s) => write!(w, "{}", s),
            DescriptorValue::Date(d) => write!(w, "{}", d),
            DescriptorValue::Time(t) => write!(w, "{}", t),
            DescriptorValue::DateTime(dt) => write!(w, "{}", dt),
            DescriptorValue::Tuple(values) => {
                w.write_char('(')?;
                write_elements(w, values)?;
                if values.len() == 1 {
                    w.write_char(',')?;
                }
                w.write_char(')')
            }
            DescriptorValue::List(values) => {
                w.write_char('[')?;
                write_elements(w, values)?;
                w.write_char(']')
            }
        }
    }
}

fn write_elements<W: Write>(w: &mut W, values: &[DescriptorValue]) -> fmt::Result {
    for (n, value) in values.iter().enumerate() {
        if n > 0 {
            w.write_str(", ")?;
        }
        value.write_repr(w)?;
    }
    Ok(())
}

impl Display for DescriptorValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_str(f)
    }
}

/// Shortest round-trip representation, with the exponent written as `e-07`/`e+16`.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let debug = format!("{:?}", f);
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => debug,
    }
}

fn complex_repr(re: f64, im: f64) -> String {
    let short = |x: f64| {
        let s = float_repr(x);
        match s.strip_suffix(".0") {
            Some(s) => s.to_string(),
            None => s,
        }
    };
    if re == 0.0 && re.is_sign_positive() {
        return format!("{}j", short(im));
    }
    let im_part = short(im);
    if im_part.starts_with('-') {
        format!("({}{}j)", short(re), im_part)
    } else {
        format!("({}+{}j)", short(re), im_part)
    }
}

fn quoted(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// A 0-based, end-exclusive `(x1, x2, y1, y2)` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// first column
    pub x1: i64,
    /// one past the last column
    pub x2: i64,
    /// first row
    pub y1: i64,
    /// one past the last row
    pub y2: i64,
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.x2, self.y1, self.y2)
    }
}

/// A calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    /// year, 1 to 9999
    pub year: i32,
    /// month, 1 to 12
    pub month: u32,
    /// day of the month, starting at 1
    pub day: u32,
}

impl Date {
    /// A date, if `month` and `day` exist in `year`
    pub fn new(year: i32, month: u32, day: u32) -> Option<Date> {
        let date = Date { year, month, day };
        DateTime::new(date, Time::default()).to_epoch()?;
        Some(date)
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A time of day with microsecond resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time {
    /// hour, 0 to 23
    pub hour: u32,
    /// minute, 0 to 59
    pub minute: u32,
    /// second, 0 to 59
    pub second: u32,
    /// microsecond, 0 to 999999
    pub microsecond: u32,
}

impl Time {
    /// A time, if every field is in range
    pub fn new(hour: u32, minute: u32, second: u32, microsecond: u32) -> Option<Time> {
        if hour > 23 || minute > 59 || second > 59 || microsecond > 999_999 {
            return None;
        }
        Some(Time {
            hour,
            minute,
            second,
            microsecond,
        })
    }

    fn repr_seconds(&self) -> String {
        if self.microsecond != 0 {
            format!(", {}, {}", self.second, self.microsecond)
        } else if self.second != 0 {
            format!(", {}", self.second)
        } else {
            String::new()
        }
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

/// A date and a time of day, without time zone.
///
/// Calendar arithmetic goes through [`hifitime::Epoch`] on the TAI scale, so
/// no leap seconds are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    /// the date
    pub date: Date,
    /// the time of day
    pub time: Time,
}

impl DateTime {
    /// Combine a date and a time
    pub fn new(date: Date, time: Time) -> DateTime {
        DateTime { date, time }
    }

    /// The instant this names, if every field is in range.
    pub fn to_epoch(&self) -> Option<Epoch> {
        let DateTime { date, time } = *self;
        if !(1..=9999).contains(&date.year)
            || !(1..=12).contains(&date.month)
            || date.day == 0
            || Time::new(time.hour, time.minute, time.second, time.microsecond).is_none()
        {
            return None;
        }
        Epoch::maybe_from_gregorian_tai(
            date.year,
            u8::try_from(date.month).ok()?,
            u8::try_from(date.day).ok()?,
            u8::try_from(time.hour).ok()?,
            u8::try_from(time.minute).ok()?,
            u8::try_from(time.second).ok()?,
            time.microsecond * 1000,
        )
        .ok()
    }

    /// The calendar date and time of `epoch`, rounded to the microsecond
    pub fn from_epoch(epoch: Epoch) -> DateTime {
        let (year, month, day, hour, minute, second, nanos) =
            epoch.round(Unit::Microsecond * 1).to_gregorian_tai();
        DateTime {
            date: Date {
                year,
                month: month.into(),
                day: day.into(),
            },
            time: Time {
                hour: hour.into(),
                minute: minute.into(),
                second: second.into(),
                microsecond: nanos / 1000,
            },
        }
    }

    /// Convert a Modified Julian Date
    pub fn from_mjd(mjd: f64) -> Option<DateTime> {
        // years 1 to 9999
        if !(-678_575.0..2_973_484.0).contains(&mjd) {
            return None;
        }
        Some(DateTime::from_epoch(Epoch::from_mjd_tai(mjd)))
    }

    /// The year plus the fraction of it that has passed, e.g. `2017.5`
    pub fn fractional_year(&self) -> Option<f64> {
        let year = self.date.year;
        let start = Epoch::maybe_from_gregorian_tai(year, 1, 1, 0, 0, 0, 0).ok()?;
        let next = Epoch::maybe_from_gregorian_tai(year.checked_add(1)?, 1, 1, 0, 0, 0, 0).ok()?;
        let so_far = (self.to_epoch()? - start).to_seconds();
        let length = (next - start).to_seconds();
        Some(f64::from(year) + so_far / length)
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

impl<'a> From<&Value<'a>> for DescriptorValue {
    fn from(value: &Value<'a>) -> Self {
        match value {
            Value::CharacterString(s) => DescriptorValue::Str(s.to_string()),
            Value::Logical(b) => DescriptorValue::Bool(*b),
            Value::Integer(n) => DescriptorValue::Int(*n),
            Value::Real(f) => DescriptorValue::Float(*f),
            Value::ComplexInteger((re, im)) => DescriptorValue::Complex(*re as f64, *im as f64),
            Value::Complex((re, im)) => DescriptorValue::Complex(*re, *im),
            Value::Undefined => DescriptorValue::None,
        }
    }
}

impl<T: Into<DescriptorValue>> From<Option<T>> for DescriptorValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DescriptorValue::None, Into::into)
    }
}

impl<T: Into<DescriptorValue>> From<Vec<T>> for DescriptorValue {
    fn from(values: Vec<T>) -> Self {
        DescriptorValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<bool> for DescriptorValue {
    fn from(b: bool) -> Self {
        DescriptorValue::Bool(b)
    }
}

impl From<i64> for DescriptorValue {
    fn from(n: i64) -> Self {
        DescriptorValue::Int(n)
    }
}

impl From<f64> for DescriptorValue {
    fn from(f: f64) -> Self {
        DescriptorValue::Float(f)
    }
}

impl From<String> for DescriptorValue {
    fn from(s: String) -> Self {
        DescriptorValue::Str(s)
    }
}

impl From<&str> for DescriptorValue {
    fn from(s: &str) -> Self {
        DescriptorValue::Str(s.to_string())
    }
}

impl From<Section> for DescriptorValue {
    fn from(s: Section) -> Self {
        DescriptorValue::Section(s)
    }
}

impl From<Date> for DescriptorValue {
    fn from(d: Date) -> Self {
        DescriptorValue::Date(d)
    }
}

impl From<Time> for DescriptorValue {
    fn from(t: Time) -> Self {
        DescriptorValue::Time(t)
    }
}

impl From<DateTime> for DescriptorValue {
    fn from(dt: DateTime) -> Self {
        DescriptorValue::DateTime(dt)
    }
}
