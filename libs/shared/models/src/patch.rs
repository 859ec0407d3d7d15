use serde::{Deserialize, Deserializer};

/// Deserializer for nullable patch fields. Pair with
/// `#[serde(default)]` on an `Option<Option<T>>` field: an absent
/// field stays `None` (leave unchanged), an explicit JSON `null`
/// becomes `Some(None)` (clear), and a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
