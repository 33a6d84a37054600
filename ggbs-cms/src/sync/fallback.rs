//! Field-level fallback chains
//!
//! Resolution walks an ordered list of layers for each media slot and takes
//! the first usable (non-blank) value. The compiled defaults close every
//! chain, so the result is always fully populated.

use ggbs_common::content::is_usable;
use ggbs_common::{MediaSlot, MediaSource, SiteConfiguration};

/// First usable candidate, trimmed
pub fn first_usable<'a, I>(chain: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    chain
        .into_iter()
        .flatten()
        .find(|value| is_usable(value))
        .map(str::trim)
}

/// Build a configuration slot by slot from `layers` (highest priority first)
///
/// `defaults` is consulted last for every slot. A blank default is still
/// returned as-is; compiled defaults are never blank.
pub fn resolve_layers(layers: &[&dyn MediaSource], defaults: &SiteConfiguration) -> SiteConfiguration {
    let mut resolved = defaults.clone();

    for slot in MediaSlot::ALL {
        let chain = layers
            .iter()
            .map(|layer| layer.slot_value(slot))
            .chain(std::iter::once(Some(defaults.slot(slot))));

        if let Some(value) = first_usable(chain) {
            resolved.set_slot(slot, value);
        }
    }

    resolved
}
