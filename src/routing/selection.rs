//! Priority selection.

use crate::routing::source::SourceDescriptor;

/// Pick the available source with the lowest priority number.
///
/// Ties go to the earliest registered source. The baseline is always a
/// candidate, so the result is never stranded.
pub fn preferred_source(
    sources: &[SourceDescriptor],
    baseline: usize,
    is_available: impl Fn(usize) -> bool,
) -> usize {
    sources
        .iter()
        .enumerate()
        .filter(|(i, _)| *i == baseline || is_available(*i))
        .min_by_key(|(_, s)| s.priority)
        .map(|(i, _)| i)
        .unwrap_or(baseline)
}
