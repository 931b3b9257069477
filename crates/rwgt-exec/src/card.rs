//! Parameter card rendering.
//!
//! A card is a text template with one physical parameter per line. Lines
//! naming a reweight parameter get the assignment's value, every other line
//! is copied unchanged.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use rwgt_basis::ParameterAssignment;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use serde::{Deserialize, Serialize};

/// How parameter values are substituted into a card template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterSubstitutionStrategy {
    /// SLHA style cards: `<id> <value> # <name>` entries inside `Block`
    /// sections, with `DECAY` lines carrying the same layout.
    #[default]
    Slha,
    /// Plain `name = value` or `name value` lines.
    KeyValue,
}

impl ParameterSubstitutionStrategy {
    /// Renders `template` with the values of `assignment`.
    ///
    /// Fails listing every assigned name that no template line matched.
    pub fn render(&self, template: &str, assignment: &ParameterAssignment) -> Result<String, RwgtError> {
        let mut resolved = BTreeSet::new();
        let mut out = String::with_capacity(template.len());
        for line in template.split_inclusive('\n') {
            let replaced = match self {
                ParameterSubstitutionStrategy::Slha => substitute_slha(line, assignment),
                ParameterSubstitutionStrategy::KeyValue => substitute_key_value(line, assignment),
            };
            match replaced {
                Some((name, text)) => {
                    resolved.insert(name);
                    out.push_str(&text);
                }
                None => out.push_str(line),
            }
        }

        let missing: Vec<&str> = assignment
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .filter(|name| !resolved.contains(*name))
            .collect();
        if !missing.is_empty() {
            return Err(RwgtError::Substitution(
                ErrorInfo::new("unresolved-parameters", "card template lacks reweight parameters")
                    .with_context("row", assignment.row)
                    .with_context("missing", missing.join(","))
                    .with_hint("every reweight parameter needs a matching line in the card template"),
            ));
        }
        Ok(out)
    }
}

/// Formats a value like C's `%.13E`: 13 fractional digits and a signed,
/// at least two digit exponent.
pub fn format_card_value(value: f64) -> String {
    let formatted = format!("{value:.13E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}E{sign}{:02}", exp.unsigned_abs())
            }
            Err(_) => formatted,
        },
        None => formatted.to_uppercase(),
    }
}

fn substitute_slha(line: &str, assignment: &ParameterAssignment) -> Option<(String, String)> {
    let body = line.trim_start_matches([' ', '\t']);
    if body.starts_with('#') || body.starts_with("Block") {
        return None;
    }
    let (keyword, body) = match body.strip_prefix("DECAY") {
        Some(rest) => ("DECAY", rest),
        None => ("", body),
    };
    let (data, comment) = body.split_once('#')?;
    let mut fields = data.split_whitespace();
    let id = fields.next()?.parse::<i64>().ok()?;
    fields.next()?.parse::<f64>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    let name = comment.split_whitespace().next()?;
    let value = assignment.value_of(name)?;
    Some((
        name.to_string(),
        format!("{keyword}  {id}  {}  # {name}\n", format_card_value(value)),
    ))
}

fn substitute_key_value(line: &str, assignment: &ParameterAssignment) -> Option<(String, String)> {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, body) = line.split_at(indent_len);
    if body.starts_with(['#', '!', '[']) {
        return None;
    }
    let (data, comment) = match body.find('#') {
        Some(pos) => (&body[..pos], Some(body[pos..].trim_end())),
        None => (body, None),
    };
    let (key, separator) = match data.split_once('=') {
        Some((key, value)) => {
            value.trim().parse::<f64>().ok()?;
            (key.trim(), " = ")
        }
        None => {
            let mut fields = data.split_whitespace();
            let key = fields.next()?;
            fields.next()?.parse::<f64>().ok()?;
            if fields.next().is_some() {
                return None;
            }
            (key, " ")
        }
    };
    let value = assignment.value_of(key)?;
    let mut text = format!("{indent}{key}{separator}{}", format_card_value(value));
    if let Some(comment) = comment {
        text.push_str("  ");
        text.push_str(comment);
    }
    text.push('\n');
    Some((key.to_string(), text))
}

/// Reads a card template from disk.
pub fn read_card_template(path: &Path) -> Result<String, RwgtError> {
    fs::read_to_string(path).map_err(|err| {
        RwgtError::Substitution(
            ErrorInfo::new("card-template-read", err.to_string())
                .with_context("path", path.display()),
        )
    })
}

/// Renders a card and writes it to `path`.
pub fn write_card(
    strategy: ParameterSubstitutionStrategy,
    template: &str,
    assignment: &ParameterAssignment,
    path: &Path,
) -> Result<(), RwgtError> {
    let card = strategy.render(template, assignment)?;
    fs::write(path, card).map_err(|err| {
        RwgtError::Substitution(
            ErrorInfo::new("card-write", err.to_string())
                .with_context("path", path.display())
                .with_context("row", assignment.row),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::format_card_value;

    #[test]
    fn card_values_use_c_exponent_layout() {
        assert_eq!(format_card_value(1.0), "1.0000000000000E+00");
        assert_eq!(format_card_value(-2.5e-7), "-2.5000000000000E-07");
        assert_eq!(format_card_value(0.0), "0.0000000000000E+00");
        assert_eq!(format_card_value(1.0e120), "1.0000000000000E+120");
    }
}
