//! Domain models.

pub mod analysis;
pub mod answer;
pub mod payment;
pub mod search;

pub use analysis::{AnalysisResult, Contradiction};
pub use answer::{cache_key, AnswerData};
pub use payment::{PaymentInfo, PaymentRequirements};
pub use search::SearchHit;

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
