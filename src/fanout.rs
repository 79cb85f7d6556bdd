//! Expansion of one base job over a list of viewport sizes

use crate::resolve::JobSpec;
use crate::settings::Settings;
use crate::target::{Size, TargetInput};

/// Sizes a target is captured at: its own list when it has one, otherwise
/// the global list.
pub fn sizes_for<'a>(target: &'a TargetInput, defaults: &'a Settings) -> &'a [Size] {
    if target.sizes.is_empty() {
        defaults.sizes()
    } else {
        &target.sizes
    }
}

/// One job per size, in the order the sizes were given. An empty list yields
/// the base job alone.
///
/// Everything but width, height and (when the size says so) the full-page flag
/// is inherited from `base`; the filename and path are derived again.
pub fn fan_out(base: JobSpec, sizes: &[Size]) -> Vec<JobSpec> {
    if sizes.is_empty() {
        return vec![base];
    }
    sizes
        .iter()
        .map(|size| base.to_builder().size(*size).build())
        .collect()
}
