//! Choosing which of the ordered versions a matrix run covers

use tracing::{debug, warn};

use crate::version::normalizer::strip_name_prefix;
use crate::version::{DEVEL_MARKER, is_devel};

/// Version filter of a matrix run.
///
/// `exact` wins over `start` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Resume from the first identifier starting with this value
    pub start: Option<String>,
    /// Run only the first identifier equal to this value
    pub exact: Option<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn starting_at(start: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            exact: None,
        }
    }

    pub fn exactly(version: &str) -> Self {
        Self {
            start: None,
            exact: Some(version.to_string()),
        }
    }

    /// Filter an already ordered list, preserving order
    pub fn apply(&self, ordered: &[String]) -> Vec<String> {
        let selected: Vec<String> = if let Some(exact) = &self.exact {
            ordered
                .iter()
                .find(|id| id.as_str() == exact.as_str() || bare_version(id) == exact.as_str())
                .cloned()
                .into_iter()
                .collect()
        } else if let Some(start) = &self.start {
            ordered
                .iter()
                .skip_while(|id| !starts_with(id, start))
                .cloned()
                .collect()
        } else {
            ordered.to_vec()
        };

        if selected.is_empty() && !ordered.is_empty() {
            warn!("No known version matches {:?}; nothing to run", self);
        }
        debug!("Selected {} of {} versions", selected.len(), ordered.len());
        selected
    }
}

fn starts_with(id: &str, start: &str) -> bool {
    id.starts_with(start) || bare_version(id).starts_with(start)
}

/// Identifier without its `v` or `<name>-` prefix
fn bare_version(id: &str) -> &str {
    if is_devel(id) {
        DEVEL_MARKER
    } else {
        strip_name_prefix(id).unwrap_or(id)
    }
}
