//! `%(key)s` template substitution against an attribute mapping.
//!
//! Supported syntax:
//!
//! | token       | meaning                                   |
//! |-------------|-------------------------------------------|
//! | `%(key)s`   | value of `key`, rendered as text          |
//! | `%(key)d`   | value of `key` as an integer (see below)  |
//! | `%(key)i`   | same as `d`                               |
//! | `%%`        | a literal `%`                             |
//!
//! `d`/`i` accept integers of any width, booleans (`1`/`0`) and floats,
//! which are truncated toward zero (`22.7` renders as `22`). Strings, nulls,
//! sequences and mappings are a [`TemplateError::NotAnInteger`].
//!
//! Anything else after a `%` is a [`TemplateError::Malformed`]. A key absent
//! from the mapping is always a [`TemplateError::MissingKey`].
use serde_json::Value;

use crate::config::Attributes;
use crate::error::TemplateError;

/// One lexical piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Percent,
    Placeholder { key: &'a str, conversion: char },
}

/// Split `template` into tokens, validating placeholder syntax.
fn tokenize(template: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some((literal, after)) = rest.split_once('%') {
        let position = template.len() - rest.len() + literal.len();
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        if let Some(tail) = after.strip_prefix('%') {
            tokens.push(Token::Percent);
            rest = tail;
            continue;
        }

        let Some(inner) = after.strip_prefix('(') else {
            return Err(TemplateError::Malformed {
                position,
                reason: "'%' must be followed by '(' or '%'".to_string(),
            });
        };
        let (key, tail) = inner
            .split_once(')')
            .ok_or_else(|| TemplateError::Malformed {
                position,
                reason: "unterminated placeholder".to_string(),
            })?;
        let mut chars = tail.chars();
        let conversion = chars.next().ok_or_else(|| TemplateError::Malformed {
            position,
            reason: format!("placeholder '{key}' has no conversion"),
        })?;
        if !matches!(conversion, 's' | 'd' | 'i') {
            return Err(TemplateError::Malformed {
                position,
                reason: format!("unsupported conversion '{conversion}'"),
            });
        }
        tokens.push(Token::Placeholder { key, conversion });
        rest = chars.as_str();
    }

    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }
    Ok(tokens)
}

/// Render a single value for `%(key)s`.
pub(crate) fn render_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Render a value for `%(key)d`: integers as-is, booleans as `1`/`0`, floats
/// truncated toward zero. Anything else has no integer form.
fn render_integer(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(u8::from(*b).to_string()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::Number(n) => {
            let truncated = n.as_f64()?.trunc();
            if truncated.abs() < 1.0 {
                Some("0".to_string())
            } else {
                Some(format!("{truncated:.0}"))
            }
        }
        _ => None,
    }
}

/// Substitute every placeholder in `template` with values from `attributes`.
///
/// # Errors
///
/// - [`TemplateError::MissingKey`] if a placeholder names an absent key
/// - [`TemplateError::NotAnInteger`] for `d`/`i` on a non-integer value
/// - [`TemplateError::Malformed`] for invalid placeholder syntax
///
/// # Examples
///
/// ```
/// use connectables::template::substitute;
///
/// let mut attrs = serde_json::Map::new();
/// attrs.insert("host".into(), "nas.local".into());
/// attrs.insert("port".into(), 22.into());
///
/// assert_eq!(
///     substitute("ssh -p %(port)d %(host)s", &attrs).unwrap(),
///     "ssh -p 22 nas.local"
/// );
/// assert!(substitute("%(user)s", &attrs).is_err());
/// ```
pub fn substitute(template: &str, attributes: &Attributes) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    for token in tokenize(template)? {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Percent => out.push('%'),
            Token::Placeholder { key, conversion } => {
                let value = attributes
                    .get(key)
                    .ok_or_else(|| TemplateError::MissingKey {
                        key: key.to_string(),
                    })?;
                if conversion == 's' {
                    out.push_str(&render_text(value));
                } else {
                    let n = render_integer(value).ok_or_else(|| TemplateError::NotAnInteger {
                        key: key.to_string(),
                    })?;
                    out.push_str(&n);
                }
            }
        }
    }
    Ok(out)
}

/// List the keys referenced by `template`, in order of first appearance.
///
/// # Errors
///
/// Returns [`TemplateError::Malformed`] for invalid placeholder syntax.
pub fn placeholders(template: &str) -> Result<Vec<&str>, TemplateError> {
    let mut keys = Vec::new();
    for token in tokenize(template)? {
        if let Token::Placeholder { key, .. } = token
            && !keys.contains(&key)
        {
            keys.push(key);
        }
    }
    Ok(keys)
}
