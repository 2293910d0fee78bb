//! Parsing and formatting of the field path text form.
//!
//! Grammar:
//!
//! ```text
//! path     = "" | segment ( "." segment )*
//! segment  = key bracket* | bracket+          (bare brackets only at the start)
//! bracket  = "[" index "]" | "[" pair ( "," pair )* "]"
//! pair     = name "=" value
//! ```
//!
//! A backslash escapes any of `\ . [ ] , =`. Tuple values that are numbers,
//! booleans or `null` are written bare; a string value is written bare unless
//! it would read back as something else, in which case it is a quoted JSON
//! string (`[name="80"]`).

use std::iter::Peekable;
use std::str::Chars;

use serde_json::Number;

use crate::types::{FieldPath, KeyScalar, MergeKeyTuple, Step};
use crate::util::{is_valid_index, push_escaped, ESCAPABLE, KEY_SPECIALS, SELECTOR_SPECIALS};
use crate::validate::{validate_depth, validate_path_text};
use crate::FieldPathError;

/// Parse the text form of a field path.
///
/// # Example
///
/// ```
/// use ssa_drift_fieldpath::{parse_field_path, Step};
///
/// let path = parse_field_path(r"metadata.annotations.app\.kubernetes\.io/name").unwrap();
/// assert_eq!(path.steps()[2], Step::Field("app.kubernetes.io/name".to_string()));
///
/// assert!(parse_field_path("spec..replicas").is_err());
/// assert!(parse_field_path("spec.ports[").is_err());
/// ```
pub fn parse_field_path(input: &str) -> Result<FieldPath, FieldPathError> {
    validate_path_text(input)?;
    if input.is_empty() {
        return Ok(FieldPath::root());
    }

    let malformed = |reason: &str| FieldPathError::MalformedPath {
        path: input.to_string(),
        reason: reason.to_string(),
    };

    let mut chars = input.chars().peekable();
    let mut steps = Vec::new();
    let mut first = true;

    loop {
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            match c {
                '.' | '[' => break,
                ']' => return Err(malformed("unexpected ']'")),
                '\\' => {
                    chars.next();
                    key.push(read_escaped(&mut chars).ok_or_else(|| malformed("bad escape"))?);
                }
                _ => {
                    key.push(c);
                    chars.next();
                }
            }
        }

        if key.is_empty() {
            if !(first && chars.peek() == Some(&'[')) {
                return Err(malformed("empty key"));
            }
        } else {
            steps.push(Step::Field(key));
        }
        first = false;

        while chars.peek() == Some(&'[') {
            chars.next();
            let content = read_bracket(&mut chars).ok_or_else(|| malformed("unterminated '['"))?;
            steps.push(parse_bracket(&content).map_err(|reason| malformed(&reason))?);
        }

        match chars.next() {
            None => break,
            Some('.') => {}
            Some(_) => return Err(malformed("expected '.' or '[' after ']'")),
        }
    }

    validate_depth(steps.len())?;
    Ok(FieldPath::from_steps(steps))
}

/// Format a field path to its canonical text form.
///
/// # Example
///
/// ```
/// use ssa_drift_fieldpath::{format_field_path, FieldPath, KeyScalar, MergeKeyTuple};
///
/// let path = FieldPath::root()
///     .field("spec")
///     .field("ports")
///     .select(MergeKeyTuple::new().with("name", KeyScalar::String("80".into())));
/// assert_eq!(format_field_path(&path), r#"spec.ports[name="80"]"#);
/// ```
pub fn format_field_path(path: &FieldPath) -> String {
    let mut out = String::new();
    for (i, step) in path.steps().iter().enumerate() {
        match step {
            Step::Field(name) => {
                if i > 0 {
                    out.push('.');
                }
                push_escaped(&mut out, name, KEY_SPECIALS);
            }
            Step::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
            Step::Select(tuple) => {
                out.push('[');
                for (j, (name, value)) in tuple.iter().enumerate() {
                    if j > 0 {
                        out.push(',');
                    }
                    push_escaped(&mut out, name, SELECTOR_SPECIALS);
                    out.push('=');
                    push_escaped(&mut out, &encode_scalar(value), SELECTOR_SPECIALS);
                }
                out.push(']');
            }
        }
    }
    out
}

fn read_escaped(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    chars.next().filter(|c| ESCAPABLE.contains(c))
}

/// Read up to the closing `]`, keeping track of which chars were escaped.
fn read_bracket(chars: &mut Peekable<Chars<'_>>) -> Option<Vec<(char, bool)>> {
    let mut content = Vec::new();
    loop {
        match chars.next()? {
            ']' => return Some(content),
            '\\' => content.push((read_escaped(chars)?, true)),
            c => content.push((c, false)),
        }
    }
}

fn parse_bracket(content: &[(char, bool)]) -> Result<Step, String> {
    if content.is_empty() {
        return Err("empty brackets".to_string());
    }
    if !content.iter().any(|&(c, esc)| c == '=' && !esc) {
        let text: String = content.iter().map(|&(c, _)| c).collect();
        if content.iter().any(|&(_, esc)| esc) || !is_valid_index(&text) {
            return Err(format!("invalid index '{text}'"));
        }
        return text
            .parse()
            .map(Step::Index)
            .map_err(|_| format!("index out of range '{text}'"));
    }

    let mut tuple = MergeKeyTuple::new();
    for pair in content.split(|&(c, esc)| c == ',' && !esc) {
        let eq = pair
            .iter()
            .position(|&(c, esc)| c == '=' && !esc)
            .ok_or_else(|| "selector pair without '='".to_string())?;
        let name: String = pair[..eq].iter().map(|&(c, _)| c).collect();
        let raw: String = pair[eq + 1..].iter().map(|&(c, _)| c).collect();
        if name.is_empty() {
            return Err("selector field without a name".to_string());
        }
        let value = decode_scalar(&raw)?;
        if tuple.insert(name.clone(), value).is_some() {
            return Err(format!("duplicate selector field '{name}'"));
        }
    }
    Ok(Step::Select(tuple))
}

fn reads_as_non_string(raw: &str) -> bool {
    matches!(raw, "null" | "true" | "false") || serde_json::from_str::<Number>(raw).is_ok()
}

fn encode_scalar(value: &KeyScalar) -> String {
    match value {
        KeyScalar::Null => "null".to_string(),
        KeyScalar::Bool(b) => b.to_string(),
        KeyScalar::Number(n) => n.clone(),
        KeyScalar::String(s) => {
            if s.is_empty() || s.starts_with('"') || reads_as_non_string(s) {
                serde_json::Value::String(s.clone()).to_string()
            } else {
                s.clone()
            }
        }
    }
}

fn decode_scalar(raw: &str) -> Result<KeyScalar, String> {
    if raw.starts_with('"') {
        return serde_json::from_str::<String>(raw)
            .map(KeyScalar::String)
            .map_err(|e| format!("bad quoted value: {e}"));
    }
    Ok(match raw {
        "null" => KeyScalar::Null,
        "true" => KeyScalar::Bool(true),
        "false" => KeyScalar::Bool(false),
        _ => match serde_json::from_str::<Number>(raw) {
            Ok(n) => KeyScalar::Number(n.to_string()),
            Err(_) => KeyScalar::String(raw.to_string()),
        },
    })
}
