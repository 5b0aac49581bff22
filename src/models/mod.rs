// Domain models and request/response shapes

pub mod automation;
pub mod goal;
pub mod metric;
pub mod planning;
pub mod settings;
pub mod step;
pub mod streak;
pub mod user;
pub mod value;

pub use automation::*;
pub use goal::*;
pub use metric::*;
pub use planning::*;
pub use settings::*;
pub use step::*;
pub use streak::*;
pub use user::*;
pub use value::*;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
