//! Result wrapper rendering.
//!
//! Output text matches Python's `json.dumps` defaults: `", "` and `": "`
//! separators, `ensure_ascii` escaping, `repr`-style floats and integers of
//! any size. Consumers of the relay parse the last stdout line, so the exact
//! bytes are part of the interface.

use crate::utils::error::Result;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io::{self, Write};

#[derive(Debug, Default, Clone, Copy)]
pub struct PythonJsonFormatter;

impl Formatter for PythonJsonFormatter {
    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() && c != '\x7f' {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    /// `Value` 中的數字保留原始文字：整數原樣輸出，浮點數轉成 Python 的表示法
    fn write_number_str<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        writer.write_all(python_number_literal(value).as_bytes())
    }
}

/// JSON 數字文字轉成 Python `json.loads` + `json.dumps` 後的文字
///
/// 整數沒有精度上限（`-0` 變成 `0`）；浮點數超出範圍時成為 `Infinity`。
pub fn python_number_literal(literal: &str) -> String {
    let is_float = literal.contains(['.', 'e', 'E']);

    if !is_float {
        return if literal == "-0" {
            "0".to_string()
        } else {
            literal.to_string()
        };
    }

    match literal.parse::<f64>() {
        Ok(v) if v.is_infinite() && v > 0.0 => "Infinity".to_string(),
        Ok(v) if v.is_infinite() => "-Infinity".to_string(),
        Ok(v) => python_float_repr(v),
        Err(_) => literal.to_string(),
    }
}

/// Python `repr(float)`：最短位數，指數在 [-4, 16) 之間用小數表示，其餘用科學記號
pub fn python_float_repr(value: f64) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if (-4..16).contains(&exponent) {
        let point = exponent + 1;
        let body = if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        } else if digits.len() as i32 <= point {
            format!("{}{}.0", digits, "0".repeat((point - digits.len() as i32) as usize))
        } else {
            let (int_part, frac_part) = digits.split_at(point as usize);
            format!("{}.{}", int_part, frac_part)
        };
        format!("{}{}", sign, body)
    } else {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exponent.abs())
    }
}

/// 將值序列化為單行輸出（含結尾換行）
pub fn render_line<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PythonJsonFormatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}
