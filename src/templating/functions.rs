//! Standard function library available inside templates.
//!
//! Templates frequently need small helpers (joining lists of keys, indenting an embedded
//! file, encoding content). This module registers a fixed set of functions into every
//! evaluation context, following the naming and semantics of the interpolation functions
//! provisioning tools traditionally ship.
//!
//! Only deterministic functions are offered. Anything that reads clocks, files, random
//! sources or the network would make the rendered output, and therefore the resource
//! identity, change between runs without any configuration change.
//!
//! # Examples
//!
//! ```text
//! #cloud-config
//! hostname: ${lower(var.hostname)}
//! ssh_authorized_keys:
//!   - ${join("\n  - ", split(",", var.keys))}
//! write_files:
//!   - path: /etc/motd
//!     encoding: gzip+base64
//!     content: ${base64gzip(var.motd)}
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hcl::eval::{Context, FuncArgs, FuncDef, ParamType};
use hcl::{Map, Number, Value};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Largest width accepted by `indent`.
pub const MAX_INDENT: usize = 1024;

/// Register the standard library into an evaluation context.
pub fn register_standard_library(ctx: &mut Context<'_>) {
    let string = || ParamType::String;
    let number = || ParamType::Number;
    let any = || ParamType::Any;
    let list = || ParamType::Array(Box::new(ParamType::Any));
    let map = || ParamType::Object(Box::new(ParamType::Any));

    // strings
    ctx.declare_func("upper", FuncDef::builder().param(string()).build(upper));
    ctx.declare_func("lower", FuncDef::builder().param(string()).build(lower));
    ctx.declare_func("title", FuncDef::builder().param(string()).build(title));
    ctx.declare_func("trimspace", FuncDef::builder().param(string()).build(trimspace));
    ctx.declare_func("chomp", FuncDef::builder().param(string()).build(chomp));
    ctx.declare_func("indent", FuncDef::builder().param(number()).param(string()).build(indent));
    ctx.declare_func(
        "replace",
        FuncDef::builder().param(string()).param(string()).param(string()).build(replace),
    );
    ctx.declare_func(
        "substr",
        FuncDef::builder().param(string()).param(number()).param(number()).build(substr),
    );
    ctx.declare_func("format", FuncDef::builder().param(string()).variadic_param(any()).build(format));
    ctx.declare_func("split", FuncDef::builder().param(string()).param(string()).build(split));
    ctx.declare_func("join", FuncDef::builder().param(string()).param(list()).build(join));
    ctx.declare_func("coalesce", FuncDef::builder().variadic_param(string()).build(coalesce));

    // collections
    ctx.declare_func("length", FuncDef::builder().param(any()).build(length));
    ctx.declare_func("element", FuncDef::builder().param(list()).param(number()).build(element));
    ctx.declare_func(
        "lookup",
        FuncDef::builder().param(map()).param(string()).variadic_param(any()).build(lookup),
    );
    ctx.declare_func("concat", FuncDef::builder().variadic_param(list()).build(concat));
    ctx.declare_func("compact", FuncDef::builder().param(list()).build(compact));
    ctx.declare_func("distinct", FuncDef::builder().param(list()).build(distinct));
    ctx.declare_func("contains", FuncDef::builder().param(list()).param(any()).build(contains));

    // encoding and hashing
    ctx.declare_func("base64encode", FuncDef::builder().param(string()).build(base64encode));
    ctx.declare_func("base64decode", FuncDef::builder().param(string()).build(base64decode));
    ctx.declare_func("base64gzip", FuncDef::builder().param(string()).build(base64gzip));
    ctx.declare_func("base64sha256", FuncDef::builder().param(string()).build(base64sha256));
    ctx.declare_func("sha256", FuncDef::builder().param(string()).build(sha256));

    // numbers
    ctx.declare_func("signum", FuncDef::builder().param(number()).build(signum));
    ctx.declare_func("min", FuncDef::builder().variadic_param(number()).build(min));
    ctx.declare_func("max", FuncDef::builder().variadic_param(number()).build(max));
}

fn str_arg(args: &FuncArgs, index: usize) -> Result<&str, String> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("argument {} must be a string", index + 1))
}

fn int_arg(args: &FuncArgs, index: usize) -> Result<i64, String> {
    args.get(index)
        .and_then(Value::as_number)
        .and_then(Number::as_i64)
        .ok_or_else(|| format!("argument {} must be a whole number", index + 1))
}

fn list_arg(args: &FuncArgs, index: usize) -> Result<&Vec<Value>, String> {
    args.get(index)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("argument {} must be a list", index + 1))
}

fn string_items(items: &[Value]) -> Result<Vec<String>, String> {
    items.iter().map(scalar_to_string).collect()
}

fn scalar_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(format!("cannot convert {} to string", value_type_name(other))),
    }
}

/// Name of an evaluated value's type as shown in diagnostics.
#[must_use]
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn upper(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::String(str_arg(&args, 0)?.to_uppercase()))
}

fn lower(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::String(str_arg(&args, 0)?.to_lowercase()))
}

fn title(args: FuncArgs) -> Result<Value, String> {
    let input = str_arg(&args, 0)?;
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for c in input.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    Ok(Value::String(out))
}

fn trimspace(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::String(str_arg(&args, 0)?.trim().to_string()))
}

fn chomp(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::String(str_arg(&args, 0)?.trim_end_matches(['\r', '\n']).to_string()))
}

/// Indent every line but the first, so the result can follow a YAML key.
fn indent(args: FuncArgs) -> Result<Value, String> {
    let spaces = int_arg(&args, 0)?;
    let spaces = usize::try_from(spaces).map_err(|_| "indent width must not be negative")?;
    if spaces > MAX_INDENT {
        return Err(format!("indent width {spaces} exceeds the maximum of {MAX_INDENT}"));
    }
    let text = str_arg(&args, 1)?;
    let pad = " ".repeat(spaces);
    Ok(Value::String(text.replace('\n', &format!("\n{pad}"))))
}

/// Replace occurrences of a substring, or of a regex when wrapped in `/.../`.
fn replace(args: FuncArgs) -> Result<Value, String> {
    let input = str_arg(&args, 0)?;
    let search = str_arg(&args, 1)?;
    let replacement = str_arg(&args, 2)?;

    if search.len() > 1 && search.starts_with('/') && search.ends_with('/') {
        let pattern = &search[1..search.len() - 1];
        let re = Regex::new(pattern).map_err(|e| format!("invalid regular expression: {e}"))?;
        return Ok(Value::String(re.replace_all(input, replacement).into_owned()));
    }

    Ok(Value::String(input.replace(search, replacement)))
}

/// Substring by character offset; a negative offset counts from the end and a
/// length of -1 extends to the end.
fn substr(args: FuncArgs) -> Result<Value, String> {
    let chars: Vec<char> = str_arg(&args, 0)?.chars().collect();
    let total = chars.len() as i64;
    let mut offset = int_arg(&args, 1)?;
    let length = int_arg(&args, 2)?;

    if offset < 0 {
        offset += total;
    }
    if offset < 0 || offset > total {
        return Err(format!("offset {} is out of range for string of length {}", offset, total));
    }

    let end = if length == -1 {
        total
    } else if length < 0 {
        return Err("length must be -1 or a non-negative number".to_string());
    } else {
        offset.checked_add(length).filter(|end| *end <= total).ok_or_else(|| {
            format!("'offset + length' cannot be larger than the string length ({total})")
        })?
    };

    Ok(Value::String(chars[offset as usize..end as usize].iter().collect()))
}

/// Minimal printf: `%s`, `%d`, `%q`, `%v` and `%%`.
fn format(args: FuncArgs) -> Result<Value, String> {
    let template = str_arg(&args, 0)?;
    let mut values = args.iter().skip(1);
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let verb = chars.next().ok_or("format string ends with a lone '%'")?;
        if verb == '%' {
            out.push('%');
            continue;
        }
        let value = values.next().ok_or_else(|| format!("missing argument for %{verb}"))?;
        match verb {
            's' | 'v' => out.push_str(&scalar_to_string(value)?),
            'q' => out.push_str(&format!("{:?}", scalar_to_string(value)?)),
            'd' => match value.as_number().and_then(Number::as_i64) {
                Some(n) => out.push_str(&n.to_string()),
                None => {
                    return Err(format!(
                        "%d requires a whole number, found {}",
                        value_type_name(value)
                    ));
                }
            },
            other => return Err(format!("unsupported format verb %{other}")),
        }
    }

    if values.next().is_some() {
        return Err("too many arguments for format string".to_string());
    }
    Ok(Value::String(out))
}

fn split(args: FuncArgs) -> Result<Value, String> {
    let separator = str_arg(&args, 0)?;
    let input = str_arg(&args, 1)?;
    if input.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(Value::Array(input.split(separator).map(|s| Value::String(s.to_string())).collect()))
}

fn join(args: FuncArgs) -> Result<Value, String> {
    let separator = str_arg(&args, 0)?;
    let items = string_items(list_arg(&args, 1)?)?;
    Ok(Value::String(items.join(separator)))
}

fn coalesce(args: FuncArgs) -> Result<Value, String> {
    let first = args.iter().filter_map(Value::as_str).find(|s| !s.is_empty()).unwrap_or_default();
    Ok(Value::String(first.to_string()))
}

fn length(args: FuncArgs) -> Result<Value, String> {
    let len = match args.first() {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        Some(other) => return Err(format!("cannot take the length of {}", value_type_name(other))),
        None => return Err("length requires one argument".to_string()),
    };
    Ok(Value::Number(Number::from(len as u64)))
}

/// Index into a list, wrapping around past the end.
fn element(args: FuncArgs) -> Result<Value, String> {
    let items = list_arg(&args, 0)?;
    let index = int_arg(&args, 1)?;
    if items.is_empty() {
        return Err("element() may not be used with an empty list".to_string());
    }
    let index = usize::try_from(index).map_err(|_| "element index must not be negative")?;
    Ok(items[index % items.len()].clone())
}

fn lookup(args: FuncArgs) -> Result<Value, String> {
    let map = args.first().and_then(Value::as_object).ok_or("argument 1 must be a map")?;
    let key = str_arg(&args, 1)?;
    match (map.get(key), args.get(2)) {
        (Some(value), _) => Ok(value.clone()),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(format!("lookup failed to find '{key}'")),
    }
}

fn concat(args: FuncArgs) -> Result<Value, String> {
    let mut out = Vec::new();
    for (index, value) in args.iter().enumerate() {
        let items = value.as_array().ok_or_else(|| format!("argument {} must be a list", index + 1))?;
        out.extend(items.iter().cloned());
    }
    Ok(Value::Array(out))
}

fn compact(args: FuncArgs) -> Result<Value, String> {
    let items = list_arg(&args, 0)?;
    Ok(Value::Array(
        items.iter().filter(|v| !matches!(v, Value::String(s) if s.is_empty())).cloned().collect(),
    ))
}

fn distinct(args: FuncArgs) -> Result<Value, String> {
    let mut out: Vec<Value> = Vec::new();
    for item in list_arg(&args, 0)? {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

fn contains(args: FuncArgs) -> Result<Value, String> {
    let items = list_arg(&args, 0)?;
    let needle = args.get(1).ok_or("contains requires two arguments")?;
    Ok(Value::Bool(items.contains(needle)))
}

fn base64encode(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::String(STANDARD.encode(str_arg(&args, 0)?)))
}

fn base64decode(args: FuncArgs) -> Result<Value, String> {
    let bytes = STANDARD
        .decode(str_arg(&args, 0)?)
        .map_err(|e| format!("failed to decode base64 data: {e}"))?;
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|_| "decoded base64 data is not valid UTF-8".to_string())
}

fn base64gzip(args: FuncArgs) -> Result<Value, String> {
    crate::compression::compress(str_arg(&args, 0)?).map(Value::String).map_err(|e| e.to_string())
}

fn base64sha256(args: FuncArgs) -> Result<Value, String> {
    let digest = Sha256::digest(str_arg(&args, 0)?.as_bytes());
    Ok(Value::String(STANDARD.encode(digest)))
}

fn sha256(args: FuncArgs) -> Result<Value, String> {
    Ok(Value::String(crate::identity::compute_identity(str_arg(&args, 0)?)))
}

fn signum(args: FuncArgs) -> Result<Value, String> {
    let n = args.first().and_then(Value::as_number).and_then(Number::as_f64).ok_or("argument 1 must be a number")?;
    let sign: i64 = if n > 0.0 {
        1
    } else if n < 0.0 {
        -1
    } else {
        0
    };
    Ok(Value::Number(Number::from(sign)))
}

fn min(args: FuncArgs) -> Result<Value, String> {
    fold_numbers(&args, "min", |a, b| a < b)
}

fn max(args: FuncArgs) -> Result<Value, String> {
    fold_numbers(&args, "max", |a, b| a > b)
}

fn fold_numbers(args: &FuncArgs, name: &str, better: fn(f64, f64) -> bool) -> Result<Value, String> {
    let mut best: Option<(f64, &Number)> = None;
    for value in args.iter() {
        let number = value.as_number().ok_or_else(|| format!("{name}() accepts only numbers"))?;
        let as_float = number.as_f64().ok_or_else(|| format!("{name}() received an invalid number"))?;
        match best {
            Some((current, _)) if !better(as_float, current) => {}
            _ => best = Some((as_float, number)),
        }
    }
    best.map(|(_, n)| Value::Number(n.clone()))
        .ok_or_else(|| format!("{name}() requires at least one argument"))
}

/// Convert an object of string values into the `var` namespace value.
pub(crate) fn string_object<'a, I>(pairs: I) -> Value
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let object: Map<String, Value> =
        pairs.into_iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
    Value::Object(object)
}
