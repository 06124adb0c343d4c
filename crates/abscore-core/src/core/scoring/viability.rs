use crate::core::models::ids::MetricId;
use crate::core::models::metric::MetricValue;
use crate::core::models::record::Viability;
use crate::core::profile::WeightProfile;

/// Evaluates the profile's gates in declaration order; the first failing gate wins.
///
/// `raw` supplies the accepted raw value of each metric. Absent values never fail a gate.
pub fn evaluate_gates(
    profile: &WeightProfile,
    raw: impl Fn(&MetricId) -> MetricValue,
) -> Viability {
    profile
        .gates()
        .iter()
        .find_map(|gate| gate.check(raw(gate.metric())))
        .map_or_else(Viability::viable, Viability::failed)
}
