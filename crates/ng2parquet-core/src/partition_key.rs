// Hive-style object key construction
//
// Builds `{base}/name=value/.../{object_name}` keys such as
// `logs/year=2023/month=10/day=10/access.log`.

use crate::types::DayKey;

/// Join a base key, partition dimensions and an object name into one key.
///
/// One trailing `/` is stripped from `base_key`; an empty base adds no
/// segment. Names and values are joined as-is with no escaping, so a `/` or
/// `=` inside a value ends up in the path. Day keys are digit-only, which is
/// what makes this safe for the dimensions this crate produces.
pub fn build_partition_key(
    base_key: &str,
    object_name: &str,
    dimensions: &[(&str, &str)],
) -> String {
    let base = base_key.strip_suffix('/').unwrap_or(base_key);

    let mut segments: Vec<String> = Vec::with_capacity(dimensions.len() + 2);
    if !base.is_empty() {
        segments.push(base.to_string());
    }
    segments.extend(
        dimensions
            .iter()
            .map(|(name, value)| format!("{}={}", name, value)),
    );
    segments.push(object_name.to_string());

    segments.join("/")
}

/// Key for one day's object: `{base}/year=YYYY/month=MM/day=DD/{object_name}`
pub fn day_partition_key(base_key: &str, object_name: &str, day_key: &DayKey) -> String {
    build_partition_key(base_key, object_name, &day_key.dimensions())
}
