//! Ordering of release identifiers by release precedence

use tracing::debug;

use crate::version::error::NormalizationError;
use crate::version::key::{VersionKey, is_devel};
use crate::version::normalizer::normalize;

/// Sort release identifiers in ascending release order.
///
/// Devel sentinels are pulled out before sorting and appended at the end in
/// their input order. Identifiers with equal keys keep their relative input
/// order. A single unparseable identifier fails the whole sort.
pub fn sort_versions(versions: &[String]) -> Result<Vec<String>, NormalizationError> {
    let (devel, releases): (Vec<&String>, Vec<&String>) =
        versions.iter().partition(|v| is_devel(v));

    let mut keyed = releases
        .into_iter()
        .map(|raw| normalize(raw).map(|key| (raw, key)))
        .collect::<Result<Vec<(&String, VersionKey)>, _>>()?;

    let width = keyed
        .iter()
        .map(|(_, key)| key.numeric().len())
        .max()
        .unwrap_or(0);
    for (_, key) in &mut keyed {
        key.pad_to(width);
    }

    keyed.sort_by(|(_, a), (_, b)| a.cmp(b));

    debug!(
        "Sorted {} releases ({} devel) at width {}",
        keyed.len(),
        devel.len(),
        width
    );

    Ok(keyed
        .into_iter()
        .map(|(raw, _)| raw.clone())
        .chain(devel.into_iter().cloned())
        .collect())
}
