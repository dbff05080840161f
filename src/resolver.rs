use crate::classify::is_aggregator;
use crate::registry::VenueRegistry;

/// Picks a replacement for an aggregator ticket link, first match wins:
/// the venue's canonical site from the registry, then the row's own source
/// page. Returns `None` when the current link is fine or nothing better is
/// known; the caller leaves the row untouched in that case.
///
/// A returned URL never classifies as an aggregator itself, so feeding a
/// resolver output back in always yields `None` and repeated batch runs
/// are safe.
pub fn resolve(
    registry: &VenueRegistry,
    venue_name: &str,
    current_url: Option<&str>,
    source_url: Option<&str>,
) -> Option<String> {
    if !is_aggregator(current_url) {
        return None;
    }

    if let Some(canonical) = registry.lookup(venue_name) {
        // A registry entry pointing at an aggregator site would defeat the
        // idempotence guarantee; treat it like a miss.
        if Some(canonical) != current_url && !is_aggregator(Some(canonical)) {
            return Some(canonical.to_string());
        }
    }

    if let Some(source) = source_url {
        // A source page on an aggregator site would reintroduce the problem.
        if Some(source) != current_url && !is_aggregator(Some(source)) {
            return Some(source.to_string());
        }
    }

    None
}
