//! Parsing of raw release strings into [`VersionKey`]s
//!
//! Accepted shapes, all optionally prefixed by `v` or `<name>-`:
//!
//! - dotted numbers: `1.1`, `1.9.0.1`, `2.9.0`
//! - PEP 440 style pre-releases: `2.7.0a1`, `2.7.0b1`, `2.7.0rc4`, `2.7.0.dev0`
//! - hyphenated release iterations: `2.4.0.0-0.4.rc4`, `1.9.6-0.1.rc1`

use std::str::FromStr;

use crate::version::error::NormalizationError;
use crate::version::key::{Qualifier, VersionKey};

/// Width the main version is padded to before a hyphenated suffix is folded in
const HYPHENATED_WIDTH: usize = 4;

impl FromStr for VersionKey {
    type Err = NormalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Strip a leading `v` or `<name>-` prefix, returning the part starting at
/// the first digit
pub fn strip_name_prefix(raw: &str) -> Result<&str, NormalizationError> {
    let Some(start) = raw.find(|c: char| c.is_ascii_digit()) else {
        return Err(NormalizationError::NoRelease(raw.to_string()));
    };

    let prefix = &raw[..start];
    if prefix.is_empty() || prefix.eq_ignore_ascii_case("v") || prefix.ends_with('-') {
        Ok(&raw[start..])
    } else {
        Err(NormalizationError::UnrecognizedPrefix {
            version: raw.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

/// Normalize a raw release string (not the devel sentinel) into a [`VersionKey`]
pub fn normalize(raw: &str) -> Result<VersionKey, NormalizationError> {
    let version = strip_name_prefix(raw)?;
    let tokens = split_tokens(raw, version)?;

    let mut numeric = Vec::with_capacity(tokens.len());
    let last = tokens.len() - 1;

    for (idx, token) in tokens.iter().enumerate() {
        if let Some(n) = parse_number(token) {
            numeric.push(n);
            continue;
        }

        let (prefix, qualifier, seq) =
            split_qualifier(token).ok_or_else(|| NormalizationError::InvalidToken {
                version: raw.to_string(),
                token: token.clone(),
            })?;

        if idx != last {
            return Err(NormalizationError::MisplacedQualifier {
                version: raw.to_string(),
                token: token.clone(),
            });
        }

        if let Some(n) = prefix {
            numeric.push(n);
        }
        if numeric.is_empty() {
            return Err(NormalizationError::NoRelease(raw.to_string()));
        }

        return Ok(VersionKey::new(numeric, qualifier, seq));
    }

    Ok(VersionKey::release(numeric))
}

/// Split into dotted tokens, folding a hyphenated release-iteration suffix
/// into the last token of the padded main version.
///
/// `2.4.0.0-0.4.rc4` becomes `["2", "4", "0", "0rc4"]` and
/// `2.0.0.0-1` becomes `["2", "0", "0", "0", "1"]`.
fn split_tokens(raw: &str, version: &str) -> Result<Vec<String>, NormalizationError> {
    let Some((main, rest)) = version.split_once('-') else {
        return Ok(version.split('.').map(str::to_string).collect());
    };

    let mut tokens: Vec<String> = main.split('.').map(str::to_string).collect();
    while tokens.len() < HYPHENATED_WIDTH {
        tokens.push("0".to_string());
    }

    let iteration = rest
        .rsplit('-')
        .next()
        .and_then(|suffix| suffix.rsplit('.').next())
        .unwrap_or_default();

    if iteration.is_empty() {
        return Err(NormalizationError::InvalidToken {
            version: raw.to_string(),
            token: rest.to_string(),
        });
    }

    if parse_number(iteration).is_some() {
        tokens.push(iteration.to_string());
    } else if let Some(last) = tokens.last_mut() {
        last.push_str(iteration);
    }
    Ok(tokens)
}

fn parse_number(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Find the highest-priority qualifier in `token` and split it into
/// `(numeric prefix, qualifier, sequence number)`
fn split_qualifier(token: &str) -> Option<(Option<u64>, Qualifier, u64)> {
    let lowered = token.to_ascii_lowercase();
    let (needle, qualifier) = Qualifier::SEARCH_ORDER
        .iter()
        .find(|(needle, _)| lowered.contains(needle))?;

    let (head, tail) = lowered.split_once(needle)?;

    let prefix = match head {
        "" => None,
        digits => Some(parse_number(digits)?),
    };
    let seq = match tail {
        "" => 0,
        digits => parse_number(digits)?,
    };

    Some((prefix, *qualifier, seq))
}
