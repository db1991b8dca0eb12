//! Native printf-style formatting of console arguments.
//!
//! Follows the placeholder rules of a JavaScript console (`util.format`):
//! `%s %d %i %f %j %o %O %c %%` are substituted left to right when the first
//! argument is a string and more arguments follow. Unused arguments are
//! appended, separated by spaces.

use crate::pretty::{Inspect, PrettyPrinter};
use crate::types::number_to_string;
use crate::{Arg, Result};

/// Format a full argument list into the text a console call emits
pub fn render_args(args: &[Arg], printer: &dyn PrettyPrinter) -> Result<String> {
    let Some(first) = args.first() else {
        return Ok(String::new());
    };

    let mut out = String::new();
    let mut next = 0;

    if let Arg::Str(template) = first {
        next = 1;
        if args.len() == 1 {
            out.push_str(template);
        } else {
            next = substitute(template, args, printer, &mut out)?;
        }
    }

    for (i, arg) in args.iter().enumerate().skip(next) {
        if i > 0 {
            out.push(' ');
        }
        match arg {
            Arg::Str(s) => out.push_str(s),
            other => out.push_str(&Inspect { arg: other, printer }.to_text()?),
        }
    }

    Ok(out)
}

/// Expand placeholders in `template` using `args[1..]`.
/// Returns the index of the first argument that was not consumed.
fn substitute(
    template: &str,
    args: &[Arg],
    printer: &dyn PrettyPrinter,
    out: &mut String,
) -> Result<usize> {
    let mut next = 1;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let Some(&spec) = chars.peek() else {
            out.push('%');
            break;
        };

        if spec == '%' {
            chars.next();
            out.push('%');
            continue;
        }

        if !matches!(spec, 's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c') {
            out.push('%');
            continue;
        }

        chars.next();
        let Some(arg) = args.get(next) else {
            out.push('%');
            out.push(spec);
            continue;
        };
        next += 1;

        match spec {
            's' => match arg {
                Arg::Str(s) => out.push_str(s),
                other => out.push_str(&Inspect { arg: other, printer }.to_text()?),
            },
            'd' => out.push_str(&to_number(arg)),
            'i' => out.push_str(&to_integer(arg)),
            'f' => out.push_str(&to_float(arg)),
            'j' => out.push_str(&to_json(arg, printer)?),
            'o' | 'O' => out.push_str(&inspect(arg, printer)?),
            // CSS directives carry no text
            _ => {}
        }
    }

    Ok(next)
}

/// `%d`: numeric coercion
fn to_number(arg: &Arg) -> String {
    match arg {
        Arg::Int(n) => n.to_string(),
        Arg::Float(f) => number_to_string(*f),
        Arg::Bool(b) => u8::from(*b).to_string(),
        Arg::Null => "0".into(),
        Arg::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                "0".into()
            } else {
                trimmed
                    .parse::<f64>()
                    .map(number_to_string)
                    .unwrap_or_else(|_| "NaN".into())
            }
        }
        _ => "NaN".into(),
    }
}

/// `%i`: integer prefix parse
fn to_integer(arg: &Arg) -> String {
    match arg {
        Arg::Int(n) => n.to_string(),
        Arg::Float(f) if f.is_finite() => number_to_string(f.trunc()),
        Arg::Str(s) => parse_int_prefix(s).map_or_else(|| "NaN".into(), |n| n.to_string()),
        _ => "NaN".into(),
    }
}

/// `%f`: float prefix parse
fn to_float(arg: &Arg) -> String {
    match arg {
        Arg::Int(n) => n.to_string(),
        Arg::Float(f) => number_to_string(*f),
        Arg::Str(s) => parse_float_prefix(s).map_or_else(|| "NaN".into(), number_to_string),
        _ => "NaN".into(),
    }
}

/// `%j`: compact JSON
fn to_json(arg: &Arg, printer: &dyn PrettyPrinter) -> Result<String> {
    Ok(match arg {
        Arg::Json(value) => serde_json::to_string(value)?,
        Arg::Str(s) => serde_json::to_string(s)?,
        Arg::Float(f) if !f.is_finite() => "null".into(),
        Arg::Undefined | Arg::Function { .. } => "undefined".into(),
        Arg::Debug(_) => printer.render(arg)?,
        other => other.primitive_string().unwrap_or_default(),
    })
}

/// `%o` / `%O`: inspection; strings are quoted
pub(crate) fn inspect(arg: &Arg, printer: &dyn PrettyPrinter) -> Result<String> {
    match arg {
        Arg::Str(s) => Ok(format!("'{}'", s)),
        other => Inspect { arg: other, printer }.to_text(),
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    if s.starts_with("Infinity") || s.starts_with("+Infinity") {
        return Some(f64::INFINITY);
    }
    if s.starts_with("-Infinity") {
        return Some(f64::NEG_INFINITY);
    }

    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(s.len());

    (1..=end)
        .rev()
        .filter(|&len| s.is_char_boundary(len))
        .find_map(|len| s[..len].parse::<f64>().ok())
}
