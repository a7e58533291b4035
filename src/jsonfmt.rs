// 🖋️ JSON writers - number and separator styles of the tools that read our output
//
// - HostFormatter: numbers the way the host's JSON.stringify writes them
//   ("2", "0.25", "9460730472580800", "1e+21")
// - PythonFormatter: what macrovision links expect, i.e. json.dumps defaults
//   (", " and ": " separators, float repr, non-ASCII as \uXXXX)

use crate::error::{ExportError, ExportResult};
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter, Serializer};
use std::io;

const INDENT: &[u8] = b"    ";

// ============================================================================
// NUMBER STYLES
// ============================================================================

/// Shortest round-trip digits of a positive finite value, and the position
/// of the decimal point relative to the first digit (value = 0.DIGITS × 10^point)
fn shortest_digits(value: f64) -> (String, i32) {
    let sci = format!("{:e}", value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let exp: i32 = exp.parse().unwrap_or(0);
    (digits, exp + 1)
}

fn scientific(digits: &str, exp: i32, min_exp_width: usize) -> String {
    let mantissa = if digits.len() == 1 {
        digits.to_string()
    } else {
        format!("{}.{}", &digits[..1], &digits[1..])
    };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:0width$}", mantissa, sign, exp.abs(), width = min_exp_width)
}

/// Number.prototype.toString for a finite value
pub fn js_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value < 0.0 {
        return format!("-{}", js_number(-value));
    }

    let (digits, point) = shortest_digits(value);
    let len = digits.len() as i32;

    if len <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        scientific(&digits, point - 1, 1)
    }
}

/// Python's float repr for a finite value
pub fn python_float(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", python_float(-value));
    }

    let (digits, point) = shortest_digits(value);
    let len = digits.len() as i32;
    let exp = point - 1;

    if !(-4..16).contains(&exp) {
        return scientific(&digits, exp, 2);
    }

    if point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else if len <= point {
        format!("{}{}.0", digits, "0".repeat((point - len) as usize))
    } else {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    }
}

// ============================================================================
// HOST FORMATTER
// ============================================================================

/// Wraps a layout formatter and writes floats the way JSON.stringify does
pub struct HostFormatter<F> {
    inner: F,
}

impl<F> HostFormatter<F> {
    pub fn new(inner: F) -> Self {
        HostFormatter { inner }
    }
}

impl HostFormatter<PrettyFormatter<'static>> {
    /// 4-space indentation
    pub fn pretty() -> Self {
        HostFormatter::new(PrettyFormatter::with_indent(INDENT))
    }
}

impl HostFormatter<CompactFormatter> {
    pub fn compact() -> Self {
        HostFormatter::new(CompactFormatter)
    }
}

impl<F: Formatter> Formatter for HostFormatter<F> {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(js_number(value).as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

// ============================================================================
// PYTHON FORMATTER
// ============================================================================

/// json.dumps with default arguments
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(python_float(value).as_bytes())
    }

    /// ensure_ascii: everything outside printable ASCII becomes \uXXXX (UTF-16 units)
    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;

        for (i, c) in fragment.char_indices() {
            if c.is_ascii() && c != '\x7f' {
                continue;
            }

            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }

        writer.write_all(fragment[start..].as_bytes())
    }
}

// ============================================================================
// WRITERS
// ============================================================================

fn write_with<T, F>(value: &T, formatter: F) -> ExportResult<String>
where
    T: ?Sized + Serialize,
    F: Formatter,
{
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| ExportError::Serialize(serde::ser::Error::custom(e)))
}

/// 4-space indented JSON with host number formatting
pub fn to_host_json_pretty<T: ?Sized + Serialize>(value: &T) -> ExportResult<String> {
    write_with(value, HostFormatter::pretty())
}

/// Single-line JSON with host number formatting
pub fn to_host_json<T: ?Sized + Serialize>(value: &T) -> ExportResult<String> {
    write_with(value, HostFormatter::compact())
}

/// JSON as Python's json.dumps writes it
pub fn to_python_json<T: ?Sized + Serialize>(value: &T) -> ExportResult<String> {
    write_with(value, PythonFormatter)
}
