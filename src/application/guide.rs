//! Guided value source: values injected by an external controller.
//!
//! Before each request the current [`CallPath`] is written as a `STATE` line;
//! the reply is read as a single line and echoed back as `ACTION <value>`.

use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::application::protocol::{ACTION_TAG, STATE_TAG};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::CallPath;

/// Source of node payloads.
pub trait ValueSource {
    /// Request an integer for the code position described by `path`.
    fn guided_int(&mut self, path: &CallPath) -> ApplicationResult<i64>;

    /// Request a float for the code position described by `path`.
    fn guided_float(&mut self, path: &CallPath) -> ApplicationResult<f32>;
}

/// A value type the guide can request and echo.
pub trait GuidedScalar: FromStr {
    /// Text of the `ACTION` echo.
    fn echo(&self) -> String;
}

impl GuidedScalar for i64 {
    fn echo(&self) -> String {
        self.to_string()
    }
}

impl GuidedScalar for f32 {
    fn echo(&self) -> String {
        format_g(*self)
    }
}

/// Shortest round-trip digits in `%g` layout: exponent form when the decimal
/// exponent is below -4 or at least 6, with a signed two-digit exponent
/// (`1e-07`, `1.5e+06`), plain decimal otherwise (`0.25`, `123456`).
pub fn format_g(value: f32) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.into();
    }

    // `{:e}` yields the shortest digits, e.g. `-1.5e-7` or `0e0`
    let sci = format!("{value:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let (first, rest) = digits.split_at(1);

    if !(-4..6).contains(&exp) {
        let point = if rest.is_empty() { "" } else { "." };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{first}{point}{rest}e{exp_sign}{:02}", exp.abs());
    }

    // position of the decimal point within `digits`
    let point = exp + 1;
    let body = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let point = point as usize;
        if point >= digits.len() {
            format!("{digits}{}", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

/// [`ValueSource`] speaking the line protocol over any reader/writer pair.
///
/// The binaries use locked stdin/stdout; tests use in-memory buffers.
pub struct StdioGuide<R, W> {
    input: R,
    output: W,
    requests: usize,
}

impl<R: BufRead, W: Write> StdioGuide<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            requests: 0,
        }
    }

    /// Number of values requested so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn report_state(&mut self, path: &CallPath) -> ApplicationResult<()> {
        writeln!(self.output, "{} {}", STATE_TAG, path).with_context("write state report")?;
        self.output.flush().with_context("flush state report")
    }

    fn read_value<T>(&mut self, expected: &'static str) -> ApplicationResult<T>
    where
        T: GuidedScalar,
    {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .with_context("read guided value")?;
        if read == 0 {
            return Err(ApplicationError::MissingValue);
        }
        trace!(line = %line.trim_end(), "guided input");

        let value = line
            .trim()
            .parse::<T>()
            .map_err(|_| ApplicationError::MalformedValue {
                line: line.trim_end().to_string(),
                expected,
            })?;

        writeln!(self.output, "{} {}", ACTION_TAG, value.echo()).with_context("write action echo")?;
        self.output.flush().with_context("flush action echo")?;
        Ok(value)
    }

    fn request<T>(&mut self, path: &CallPath, expected: &'static str) -> ApplicationResult<T>
    where
        T: GuidedScalar,
    {
        self.requests += 1;
        debug!(request = self.requests, depth = path.depth(), "requesting guided value");
        self.report_state(path)?;
        self.read_value(expected)
    }
}

impl<R: BufRead, W: Write> ValueSource for StdioGuide<R, W> {
    fn guided_int(&mut self, path: &CallPath) -> ApplicationResult<i64> {
        self.request(path, "an integer")
    }

    fn guided_float(&mut self, path: &CallPath) -> ApplicationResult<f32> {
        self.request(path, "a float")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frame;
    use rstest::rstest;
    use std::io::Cursor;

    fn path() -> CallPath {
        CallPath::new()
            .with(Frame::new("main", 10))
            .with(Frame::new("build", 20))
    }

    fn output_of(guide: StdioGuide<Cursor<&str>, Vec<u8>>) -> String {
        String::from_utf8(guide.into_output()).unwrap()
    }

    #[test]
    fn given_integer_line_when_requesting_then_reports_state_and_echoes() {
        let mut guide = StdioGuide::new(Cursor::new("42\n"), Vec::new());

        let value = guide.guided_int(&path()).unwrap();

        assert_eq!(value, 42);
        assert_eq!(guide.requests(), 1);
        assert_eq!(output_of(guide), "STATE build.20;main.10;\nACTION 42\n");
    }

    #[test]
    fn given_padded_negative_integer_when_requesting_then_parses() {
        let mut guide = StdioGuide::new(Cursor::new("  -3 \r\n"), Vec::new());
        assert_eq!(guide.guided_int(&path()).unwrap(), -3);
    }

    #[test]
    fn given_last_line_without_newline_when_requesting_then_parses() {
        let mut guide = StdioGuide::new(Cursor::new("9"), Vec::new());
        assert_eq!(guide.guided_int(&path()).unwrap(), 9);
    }

    #[test]
    fn given_float_line_when_requesting_float_then_echoes_float() {
        let mut guide = StdioGuide::new(Cursor::new("0.25\n"), Vec::new());

        let value = guide.guided_float(&path()).unwrap();

        assert_eq!(value, 0.25);
        assert!(output_of(guide).ends_with("ACTION 0.25\n"));
    }

    #[rstest]
    #[case(0.25, "0.25")]
    #[case(1.0, "1")]
    #[case(0.0, "0")]
    #[case(-0.5, "-0.5")]
    #[case(123456.0, "123456")]
    #[case(1234567.0, "1.234567e+06")]
    #[case(1e6, "1e+06")]
    #[case(1e-7, "1e-07")]
    #[case(0.0001, "0.0001")]
    #[case(0.00001234, "1.234e-05")]
    #[case(-2.5e10, "-2.5e+10")]
    #[case(f32::INFINITY, "+Inf")]
    fn given_float_when_formatting_then_uses_g_layout(#[case] value: f32, #[case] expected: &str) {
        assert_eq!(format_g(value), expected);
    }

    #[test]
    fn given_tiny_float_line_when_requesting_float_then_echoes_exponent_form() {
        let mut guide = StdioGuide::new(Cursor::new("0.0000001\n"), Vec::new());

        assert_eq!(guide.guided_float(&path()).unwrap(), 1e-7);
        assert!(output_of(guide).ends_with("ACTION 1e-07\n"));
    }

    #[test]
    fn given_non_numeric_line_when_requesting_then_malformed_without_echo() {
        let mut guide = StdioGuide::new(Cursor::new("abc\n"), Vec::new());

        let err = guide.guided_int(&path()).unwrap_err();

        assert!(matches!(err, ApplicationError::MalformedValue { .. }));
        let out = output_of(guide);
        assert!(out.starts_with("STATE "));
        assert!(!out.contains("ACTION"));
    }

    #[test]
    fn given_closed_input_when_requesting_then_missing_value() {
        let mut guide = StdioGuide::new(Cursor::new(""), Vec::new());
        let err = guide.guided_int(&path()).unwrap_err();
        assert!(matches!(err, ApplicationError::MissingValue));
    }

    #[test]
    fn given_float_line_when_requesting_int_then_malformed() {
        let mut guide = StdioGuide::new(Cursor::new("1.5\n"), Vec::new());
        assert!(guide.guided_int(&path()).is_err());
    }
}
