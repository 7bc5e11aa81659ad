//! Inline CSS declaration lists ↔ `StyleMap`.
//!
//! The style panel edits raw `prop: value; prop: value` text. Keys are
//! stored camelCase (`backgroundColor`) and emitted kebab-case
//! (`background-color`). Custom properties (`--brand`) pass through as-is.
//!
//! Built on `winnow` 0.7.

use crate::model::StyleMap;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Parse a declaration list such as `color: red; padding: 4px 8px`.
///
/// Values may contain quoted strings and parenthesized groups with `;`
/// inside (`url("a;b.png")`). An empty value is kept: applied as a style
/// patch it removes the property.
#[must_use = "parsing result should be used"]
pub fn parse_declarations(input: &str) -> Result<StyleMap, String> {
    let mut out = StyleMap::new();
    let mut rest = input;

    loop {
        skip_separators(&mut rest);
        if rest.is_empty() {
            break;
        }
        let at = rest;
        let (name, value) = parse_declaration
            .parse_next(&mut rest)
            .map_err(|e| format!("Style parse error near `{}`: {e}", snippet(at)))?;
        out.insert(kebab_to_camel(name), value);
    }

    Ok(out)
}

/// Render a style map as a declaration list, sorted by key.
pub fn emit_declarations(styles: &StyleMap) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {v}", camel_to_kebab(k)))
        .collect::<Vec<_>>()
        .join("; ")
}

/// `background-color` → `backgroundColor`, `-webkit-mask` → `WebkitMask`.
pub fn kebab_to_camel(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `backgroundColor` → `background-color`, `WebkitMask` → `-webkit-mask`.
pub fn camel_to_kebab(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn parse_declaration<'a>(input: &mut &'a str) -> ModalResult<(&'a str, String)> {
    let name = parse_property_name.parse_next(input)?;
    skip_space(input);
    let _ = ':'.parse_next(input)?;
    skip_space(input);
    let value = parse_value.parse_next(input)?;
    Ok((name, value))
}

fn parse_property_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_').parse_next(input)
}

/// Consume a value up to the next top-level `;` (not consumed) or the end.
fn parse_value(input: &mut &str) -> ModalResult<String> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut end = input.len();

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ErrMode::Cut(ContextError::new()))?;
            }
            (None, ';') if depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth > 0 {
        return Err(ErrMode::Cut(ContextError::new()));
    }

    let value = input[..end].trim().to_string();
    *input = &input[end..];
    Ok(value)
}

fn skip_space(input: &mut &str) {
    *input = input.trim_start_matches([' ', '\t']);
}

fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
}

fn snippet(s: &str) -> &str {
    let end = s.char_indices().nth(24).map_or(s.len(), |(i, _)| i);
    &s[..end]
}
