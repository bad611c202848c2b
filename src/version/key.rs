//! Comparable decomposition of a release version string

use std::cmp::Ordering;
use std::fmt;

/// Identifier suffix of the project's perpetual development branch
pub const DEVEL_MARKER: &str = "devel";

/// Returns true if the identifier names the development trunk
/// (`devel`, `ansible-devel`, ...)
pub fn is_devel(raw: &str) -> bool {
    raw == DEVEL_MARKER
        || raw
            .strip_suffix(DEVEL_MARKER)
            .is_some_and(|prefix| prefix.ends_with('-'))
}

/// Pre-release stage attached to the last numeric segment
///
/// Variant order is the release order: dev < alpha < beta < rc < final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Dev,
    Alpha,
    Beta,
    Rc,
    Final,
}

impl Qualifier {
    /// Substrings recognized inside a version token, in search priority order.
    ///
    /// `rc` is checked before `beta`/`b` and `alpha`/`a`, and the long
    /// spellings before their one-letter forms.
    pub const SEARCH_ORDER: &'static [(&'static str, Qualifier)] = &[
        ("rc", Qualifier::Rc),
        ("beta", Qualifier::Beta),
        ("b", Qualifier::Beta),
        ("alpha", Qualifier::Alpha),
        ("a", Qualifier::Alpha),
        ("dev", Qualifier::Dev),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::Dev => "dev",
            Qualifier::Alpha => "a",
            Qualifier::Beta => "b",
            Qualifier::Rc => "rc",
            Qualifier::Final => "",
        }
    }
}

/// Normalized, totally ordered form of a release version
///
/// Compared field by field: numeric segments first (the shorter side padded
/// with zeros), then the qualifier stage, then the qualifier sequence number.
#[derive(Debug, Clone)]
pub struct VersionKey {
    numeric: Vec<u64>,
    qualifier: Qualifier,
    qualifier_seq: u64,
}

impl VersionKey {
    pub fn new(numeric: Vec<u64>, qualifier: Qualifier, qualifier_seq: u64) -> Self {
        let qualifier_seq = if qualifier == Qualifier::Final {
            0
        } else {
            qualifier_seq
        };
        Self {
            numeric,
            qualifier,
            qualifier_seq,
        }
    }

    /// A final release with no qualifier
    pub fn release(numeric: Vec<u64>) -> Self {
        Self::new(numeric, Qualifier::Final, 0)
    }

    pub fn numeric(&self) -> &[u64] {
        &self.numeric
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    pub fn qualifier_seq(&self) -> u64 {
        self.qualifier_seq
    }

    pub fn is_prerelease(&self) -> bool {
        self.qualifier != Qualifier::Final
    }

    /// Right-pad the numeric segments with zeros up to `width`
    pub fn pad_to(&mut self, width: usize) {
        if self.numeric.len() < width {
            self.numeric.resize(width, 0);
        }
    }
}

fn compare_numeric(this: &[u64], other: &[u64]) -> Ordering {
    let width = this.len().max(other.len());
    (0..width)
        .map(|i| {
            let a = this.get(i).copied().unwrap_or(0);
            let b = other.get(i).copied().unwrap_or(0);
            a.cmp(&b)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_numeric(&self.numeric, &other.numeric)
            .then(self.qualifier.cmp(&other.qualifier))
            .then(self.qualifier_seq.cmp(&other.qualifier_seq))
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numeric: Vec<String> = self.numeric.iter().map(u64::to_string).collect();
        write!(f, "{}", numeric.join("."))?;
        if self.is_prerelease() {
            write!(f, "{}{}", self.qualifier.as_str(), self.qualifier_seq)?;
        }
        Ok(())
    }
}
