//! Named parameters: type hints, bind values and `:name` placeholder handling.

use serde_json::Value;

/// Binding type handed to the driver. Everything that is not an integer travels as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Str,
}

impl ParamType {
    /// Integer for integral numbers and all-digit strings, text otherwise.
    pub fn for_id(id: &Value) -> Self {
        match id {
            Value::Number(n) if n.is_i64() || n.is_u64() => ParamType::Int,
            Value::String(s) if is_integer_literal(s) => ParamType::Int,
            _ => ParamType::Str,
        }
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One bound parameter: placeholder name (without the colon), value and type hint.
#[derive(Clone, Debug, PartialEq)]
pub struct Bind {
    pub name: String,
    pub value: Value,
    pub ty: ParamType,
}

/// A value coerced to what the driver binds. Converts from serde_json::Value plus a type hint.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Int(i64),
    Text(String),
}

impl BindValue {
    pub fn coerce(v: &Value, ty: ParamType) -> Self {
        match (v, ty) {
            (Value::Null, _) => BindValue::Null,
            (Value::Number(n), ParamType::Int) => match n.as_i64() {
                Some(i) => BindValue::Int(i),
                None => BindValue::Text(n.to_string()),
            },
            (Value::String(s), ParamType::Int) => match s.trim().parse::<i64>() {
                Ok(i) => BindValue::Int(i),
                Err(_) => BindValue::Text(s.clone()),
            },
            (Value::Bool(b), ParamType::Int) => BindValue::Int(i64::from(*b)),
            (Value::String(s), ParamType::Str) => BindValue::Text(s.clone()),
            (Value::Bool(b), ParamType::Str) => BindValue::Text(if *b { "1".into() } else { "".into() }),
            (other, _) => BindValue::Text(other.to_string()),
        }
    }

    /// SQL literal used only for diagnostics.
    pub fn literal(&self) -> String {
        match self {
            BindValue::Null => "NULL".to_string(),
            BindValue::Int(i) => i.to_string(),
            BindValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

/// Position of one `:name` placeholder inside SQL text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Finds `:name` placeholders, skipping quoted strings, quoted identifiers and `::` casts.
pub fn placeholders(sql: &str) -> Vec<Placeholder<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => {
                quote = Some(b);
                i += 1;
            }
            b':' if i + 1 < bytes.len() && bytes[i + 1] == b':' => i += 2,
            b':' if i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) => {
                let start = i;
                let mut end = i + 1;
                while end < bytes.len() && is_ident_char(bytes[end]) {
                    end += 1;
                }
                out.push(Placeholder {
                    name: &sql[start + 1..end],
                    start,
                    end,
                });
                i = end;
            }
            _ => i += 1,
        }
    }
    out
}

/// Whether `name` survives as a whole `:name` placeholder.
pub fn is_param_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    matches!(bytes.first(), Some(&b) if is_ident_start(b)) && bytes.iter().all(|&b| is_ident_char(b))
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Rewrites named placeholders as positional `?` markers. Returns the new SQL and the
/// placeholder names in occurrence order (a name used twice appears twice).
pub fn positional(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut order = Vec::new();
    let mut last = 0;
    for p in placeholders(sql) {
        out.push_str(&sql[last..p.start]);
        out.push('?');
        order.push(p.name.to_string());
        last = p.end;
    }
    out.push_str(&sql[last..]);
    (out, order)
}

/// Substitutes bound values as literals. Diagnostic text only, never executed.
pub fn with_literals(sql: &str, binds: &[Bind]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for p in placeholders(sql) {
        out.push_str(&sql[last..p.start]);
        match binds.iter().rev().find(|b| b.name == p.name) {
            Some(b) => out.push_str(&BindValue::coerce(&b.value, b.ty).literal()),
            None => out.push_str(&sql[p.start..p.end]),
        }
        last = p.end;
    }
    out.push_str(&sql[last..]);
    out
}
