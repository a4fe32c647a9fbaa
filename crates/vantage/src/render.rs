//! Width-bounded rendering of namespace values.
//!
//! Produces `repr()`-style text for scalars and pretty-printed layouts for
//! containers: a container renders on a single line when it fits the width
//! available at its nesting level, and otherwise wraps either compactly
//! (packing as many items per line as fit) or one item per line.

use std::fmt::{self, Write as _};

use crate::value::Value;

/// Default width for pretty-printing.
const DEFAULT_WIDTH: usize = 80;

/// Default indent for pretty-printing.
const DEFAULT_INDENT: usize = 1;

/// Hard cap on rendering recursion.
///
/// `Value` trees cannot cycle, but nothing bounds how deeply a host may nest
/// them; rendering past this depth fails instead of overflowing the stack.
const MAX_RENDER_DEPTH: usize = 64;

/// Parameters for pretty-printing.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Spaces of indentation added per nesting level.
    pub indent: usize,
    /// Target line width in characters.
    pub width: usize,
    /// Display depth; containers nested deeper render as placeholders.
    pub depth: Option<usize>,
    /// Pack several items per wrapped line instead of one per line.
    pub compact: bool,
    /// Order dict entries by key repr instead of insertion order.
    pub sort_dicts: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            width: DEFAULT_WIDTH,
            depth: None,
            compact: false,
            sort_dicts: true,
        }
    }
}

/// Error type for value rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The value's nesting exceeds [`MAX_RENDER_DEPTH`].
    DepthExceeded,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthExceeded => write!(f, "value nesting exceeds the rendering depth limit"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Pretty-prints a value with the given layout parameters.
///
/// # Errors
/// Returns [`RenderError::DepthExceeded`] when the value nests deeper than
/// the rendering recursion cap.
pub fn pformat(value: &Value, options: &RenderOptions) -> Result<String, RenderError> {
    format_value(value, options, 0)
}

/// Renders a value as a single-line `repr()` string.
///
/// Dict entries keep insertion order, matching Python `repr` rather than
/// `pprint` conventions.
///
/// # Errors
/// Returns [`RenderError::DepthExceeded`] when the value nests deeper than
/// the rendering recursion cap.
pub fn repr(value: &Value) -> Result<String, RenderError> {
    let options = RenderOptions {
        width: usize::MAX,
        sort_dicts: false,
        ..RenderOptions::default()
    };
    format_value(value, &options, 0)
}

/// Formats a value at the given nesting level.
fn format_value(value: &Value, options: &RenderOptions, level: usize) -> Result<String, RenderError> {
    if level >= MAX_RENDER_DEPTH {
        return Err(RenderError::DepthExceeded);
    }
    if let Some(placeholder) = depth_placeholder(value, options.depth, level) {
        return Ok(placeholder);
    }

    match value {
        Value::List(items) => {
            if items.is_empty() {
                return Ok("[]".to_owned());
            }
            format_sequence(items, "[", "]", options, level)
        }
        Value::Tuple(items) => {
            if items.is_empty() {
                return Ok("()".to_owned());
            }
            if let [only] = items.as_slice() {
                let inner = format_value(only, options, level + 1)?;
                return Ok(format!("({inner},)"));
            }
            format_sequence(items, "(", ")", options, level)
        }
        Value::Set(items) => {
            if items.is_empty() {
                return Ok("set()".to_owned());
            }
            format_set(items, "{", "}", options, level)
        }
        Value::FrozenSet(items) => {
            if items.is_empty() {
                return Ok("frozenset()".to_owned());
            }
            format_set(items, "frozenset({", "})", options, level)
        }
        Value::Dict(pairs) => format_dict(pairs, options, level),
        other => Ok(scalar_repr(other)),
    }
}

/// Returns the placeholder representation for a container past the display depth.
fn depth_placeholder(value: &Value, max_depth: Option<usize>, level: usize) -> Option<String> {
    let max_depth = max_depth?;
    if level < max_depth {
        return None;
    }
    let placeholder = match value {
        Value::List(_) => "[...]",
        Value::Tuple(_) => "(...)",
        Value::Dict(_) | Value::Set(_) => "{...}",
        Value::FrozenSet(_) => "frozenset({...})",
        _ => return None,
    };
    Some(placeholder.to_owned())
}

/// Formats a non-empty list or multi-element tuple.
fn format_sequence(
    items: &[Value],
    open: &str,
    close: &str,
    options: &RenderOptions,
    level: usize,
) -> Result<String, RenderError> {
    let rendered = items
        .iter()
        .map(|item| format_value(item, options, level + 1))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layout_items(&rendered, open, close, options, level))
}

/// Formats a non-empty set or frozenset; entries are ordered by repr.
fn format_set(
    items: &[Value],
    open: &str,
    close: &str,
    options: &RenderOptions,
    level: usize,
) -> Result<String, RenderError> {
    let mut rendered = items
        .iter()
        .map(|item| format_value(item, options, level + 1))
        .collect::<Result<Vec<_>, _>>()?;
    rendered.sort();
    Ok(layout_items(&rendered, open, close, options, level))
}

/// Formats a dict, sorting entries by key repr when requested.
fn format_dict(pairs: &[(Value, Value)], options: &RenderOptions, level: usize) -> Result<String, RenderError> {
    if pairs.is_empty() {
        return Ok("{}".to_owned());
    }

    let mut entries = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let key_repr = format_value(key, options, level + 1)?;
        let value_repr = format_value(value, options, level + 1)?;
        entries.push((key_repr, value_repr));
    }
    if options.sort_dicts {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    }

    let rendered: Vec<String> = entries
        .into_iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();
    Ok(layout_items(&rendered, "{", "}", options, level))
}

/// Lays rendered items out on one line when they fit, wrapping otherwise.
fn layout_items(items: &[String], open: &str, close: &str, options: &RenderOptions, level: usize) -> String {
    let single_line = format!("{open}{}{close}", items.join(", "));
    if display_width(&single_line) <= available_width(options.width, level, options.indent) {
        return single_line;
    }

    let inner_indent = " ".repeat((level + 1) * options.indent);
    let first_item_prefix = " ".repeat(options.indent.saturating_sub(1));
    if options.compact {
        format_compact_items(items, open, close, &inner_indent, options.width, &first_item_prefix)
    } else {
        format_non_compact_items(items, open, close, &inner_indent, &first_item_prefix)
    }
}

/// Builds compact multi-line container output with open/close delimiters.
fn format_compact_items(
    items: &[String],
    open: &str,
    close: &str,
    inner_indent: &str,
    width: usize,
    first_item_prefix: &str,
) -> String {
    let Some((first, rest)) = items.split_first() else {
        return format!("{open}{close}");
    };

    let mut lines = Vec::new();
    let mut current_line = format!("{open}{first_item_prefix}{first}");
    if !rest.is_empty() {
        current_line.push(',');
    }

    for (i, item) in rest.iter().enumerate() {
        let is_last = i == rest.len() - 1;
        let token = if is_last { item.clone() } else { format!("{item},") };
        let needs_space = !current_line.ends_with(' ');

        if display_width(&current_line) + usize::from(needs_space) + display_width(&token) <= width {
            if needs_space {
                current_line.push(' ');
            }
            current_line.push_str(&token);
        } else {
            lines.push(current_line.trim_end().to_owned());
            current_line = format!("{inner_indent}{token}");
        }
        if !is_last {
            current_line.push(' ');
        }
    }

    current_line.push_str(close);
    lines.push(current_line.trim_end().to_owned());
    lines.join("\n")
}

/// Builds non-compact multi-line container output with one item per line.
fn format_non_compact_items(
    items: &[String],
    open: &str,
    close: &str,
    inner_indent: &str,
    first_item_prefix: &str,
) -> String {
    let Some((first, rest)) = items.split_first() else {
        return format!("{open}{close}");
    };

    if rest.is_empty() {
        return format!("{open}{first_item_prefix}{first}{close}");
    }

    let mut lines = Vec::with_capacity(items.len());
    lines.push(format!("{open}{first_item_prefix}{first},"));

    if let Some((last, middle)) = rest.split_last() {
        for item in middle {
            lines.push(format!("{inner_indent}{item},"));
        }
        lines.push(format!("{inner_indent}{last}{close}"));
    }

    lines.join("\n")
}

/// Returns the visible width of a string in code points.
fn display_width(value: &str) -> usize {
    value.chars().count()
}

/// Returns remaining width available at a nesting level.
fn available_width(total_width: usize, level: usize, indent: usize) -> usize {
    total_width.saturating_sub(level.saturating_mul(indent))
}

/// Renders a non-container value as its `repr()` string.
fn scalar_repr(value: &Value) -> String {
    match value {
        Value::None => "None".to_owned(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Int(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::Float(f) => float_repr(*f),
        Value::Str(s) => str_repr(s),
        Value::Bytes(b) => bytes_repr(b),
        Value::Range { start, stop, step } => {
            if *step == 1 {
                format!("range({start}, {stop})")
            } else {
                format!("range({start}, {stop}, {step})")
            }
        }
        Value::Function { qualname, .. } => format!("<function {qualname}>"),
        Value::Instance(data) => data.repr.clone(),
        Value::List(_) | Value::Tuple(_) | Value::Set(_) | Value::FrozenSet(_) | Value::Dict(_) => {
            unreachable!("containers are rendered by format_value")
        }
    }
}

/// Renders a string as a quoted Python literal.
///
/// Single quotes by default; double quotes when the text contains a single
/// quote and no double quote. Control characters escape as `\xNN`.
pub(crate) fn str_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
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

/// Renders bytes as a `b'...'` Python literal.
pub(crate) fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote as u8 => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
    out.push(quote);
    out
}

/// Returns a string representation of a float matching Python's `repr()`.
///
/// `ryu` gives the shortest decimal form that round-trips through `f64`,
/// which is the same choice CPython makes; the exponent spelling and the
/// trailing `.0` for integral floats need fixing up afterwards.
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() {
            "-inf".to_owned()
        } else {
            "inf".to_owned()
        };
    }

    let mut buffer = ryu::Buffer::new();
    fix_float_spelling(buffer.format(value))
}

/// Adjusts ryu output to Python spelling.
///
/// ryu emits `1e20` where Python writes `1e+20` with the exponent padded to
/// two digits, and bare integral mantissas where Python keeps a `.0` suffix.
fn fix_float_spelling(formatted: &str) -> String {
    if let Some(e_pos) = formatted.find('e') {
        let (mantissa, exp_part) = formatted.split_at(e_pos);
        let exp = &exp_part[1..];
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        if digits.len() < 2 {
            return format!("{mantissa}e{sign}0{digits}");
        }
        return format!("{mantissa}e{sign}{digits}");
    }

    if formatted.contains('.') {
        formatted.to_owned()
    } else {
        format!("{formatted}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_repr_matches_python() {
        assert_eq!(float_repr(3.0), "3.0");
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(1e20), "1e+20");
        assert_eq!(float_repr(1e-7), "1e-07");
        assert_eq!(float_repr(f64::NAN), "nan");
        assert_eq!(float_repr(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn str_repr_picks_quotes_like_python() {
        assert_eq!(str_repr("hello"), "'hello'");
        assert_eq!(str_repr("it's"), "\"it's\"");
        assert_eq!(str_repr("both ' and \""), "'both \\' and \"'");
        assert_eq!(str_repr("line\nbreak"), "'line\\nbreak'");
        assert_eq!(str_repr("bell\x07"), "'bell\\x07'");
    }

    #[test]
    fn bytes_repr_escapes_non_printable() {
        assert_eq!(bytes_repr(b"abc"), "b'abc'");
        assert_eq!(bytes_repr(&[0x00, 0xff]), "b'\\x00\\xff'");
    }
}
