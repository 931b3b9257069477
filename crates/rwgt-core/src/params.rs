//! Reweight parameter descriptors and the finalized parameter set.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RwgtError};

fn default_scale() -> f64 {
    1.0
}

/// A named theory parameter together with the linear transform applied to
/// its raw sampling perturbation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReweightParameter {
    /// Unique parameter name, matched against parameter card entries.
    pub name: String,
    /// Multiplicative factor applied to the raw perturbation.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Additive offset applied after scaling.
    #[serde(default)]
    pub offset: f64,
}

impl ReweightParameter {
    /// Creates a parameter with unit scale and zero offset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: default_scale(),
            offset: 0.0,
        }
    }

    /// Overrides the scale and offset.
    pub fn with_transform(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Maps a raw perturbation onto the physical parameter value.
    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

/// Ordered, validated and immutable list of reweight parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    parameters: Vec<ReweightParameter>,
}

impl ParameterSet {
    /// Finalizes the parameter list.
    ///
    /// Fails when the list is empty, when a name is blank or repeated, or when
    /// a scale or offset is not finite.
    pub fn new(parameters: Vec<ReweightParameter>) -> Result<Self, RwgtError> {
        if parameters.is_empty() {
            return Err(RwgtError::Config(
                ErrorInfo::new("no-parameters", "at least one reweight parameter is required")
                    .with_hint("declare parameters inline or through a parameter file"),
            ));
        }
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for (index, param) in parameters.iter().enumerate() {
            if param.name.trim().is_empty() {
                return Err(RwgtError::Config(
                    ErrorInfo::new("blank-parameter-name", "parameter name must not be empty")
                        .with_context("index", index),
                ));
            }
            if !param.scale.is_finite() || !param.offset.is_finite() {
                return Err(RwgtError::Config(
                    ErrorInfo::new("non-finite-transform", "scale and offset must be finite")
                        .with_context("parameter", &param.name)
                        .with_context("scale", param.scale)
                        .with_context("offset", param.offset),
                ));
            }
            if !seen.insert(param.name.as_str()) {
                duplicates.insert(param.name.as_str());
            }
        }
        if !duplicates.is_empty() {
            let names: Vec<&str> = duplicates.into_iter().collect();
            return Err(RwgtError::Config(
                ErrorInfo::new("duplicate-parameter", "parameter names must be unique")
                    .with_context("names", names.join(",")),
            ));
        }
        Ok(Self { parameters })
    }

    /// Number of parameters (N).
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Always false for a finalized set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Number of sample points and polynomial coefficients, (N+1)(N+2)/2.
    pub fn sample_count(&self) -> usize {
        sample_count(self.len())
    }

    /// Parameters in declaration order.
    pub fn as_slice(&self) -> &[ReweightParameter] {
        &self.parameters
    }

    /// Iterates parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.parameters.iter().map(|param| param.name.as_str())
    }

    /// Returns the parameter at `index`.
    pub fn get(&self, index: usize) -> Option<&ReweightParameter> {
        self.parameters.get(index)
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let parameters = Vec::<ReweightParameter>::deserialize(deserializer)?;
        ParameterSet::new(parameters).map_err(serde::de::Error::custom)
    }
}

/// Number of coefficients of a full quadratic form in `n` variables.
pub fn sample_count(n: usize) -> usize {
    (n + 1) * (n + 2) / 2
}

/// Parses a whitespace separated parameter listing.
///
/// Each non-empty line reads `name [scale [offset]]`; `#` starts a comment.
pub fn parse_parameter_listing(text: &str) -> Result<Vec<ReweightParameter>, RwgtError> {
    let mut parameters = Vec::new();
    for (line_no, raw_line) in text.lines().enumerate() {
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some((name, rest)) = fields.split_first() else {
            continue;
        };
        if rest.len() > 2 {
            return Err(RwgtError::Config(
                ErrorInfo::new("parameter-row-shape", "expected `name [scale [offset]]`")
                    .with_context("line", line_no + 1)
                    .with_context("parameter", name),
            ));
        }
        let mut param = ReweightParameter::new(*name);
        if let Some(scale) = rest.first() {
            param.scale = parse_number(scale, name, line_no)?;
        }
        if let Some(offset) = rest.get(1) {
            param.offset = parse_number(offset, name, line_no)?;
        }
        parameters.push(param);
    }
    Ok(parameters)
}

/// Reads a parameter listing from disk.
pub fn read_parameter_file(path: &Path) -> Result<Vec<ReweightParameter>, RwgtError> {
    let text = fs::read_to_string(path).map_err(|err| {
        RwgtError::Config(
            ErrorInfo::new("parameter-file-read", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    parse_parameter_listing(&text)
}

fn parse_number(field: &str, name: &str, line_no: usize) -> Result<f64, RwgtError> {
    field.parse::<f64>().map_err(|_| {
        RwgtError::Config(
            ErrorInfo::new(
                "parameter-transform-parse",
                format!("failed to read scale/offset for reweight parameter {name}"),
            )
            .with_context("line", line_no + 1)
            .with_context("value", field),
        )
    })
}

impl std::fmt::Display for ReweightParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (scale {}, offset {})", self.name, self.scale, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_skips_comments_and_blank_lines() {
        let text = "# header\n\n cW 0.5 # trailing\nCHWB 2 -1\n";
        let params = parse_parameter_listing(text).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], ReweightParameter::new("cW").with_transform(0.5, 0.0));
        assert_eq!(params[1].offset, -1.0);
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = ParameterSet::new(Vec::new()).unwrap_err();
        assert!(matches!(err, RwgtError::Config(_)));
        assert_eq!(err.code(), "no-parameters");
    }
}
