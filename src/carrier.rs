//! Energy carriers exchanged within the microgrid.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// An energy carrier. Each carrier has exactly one balance bus in the dispatch model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Carrier {
    /// Electrical energy
    Electricity,
    /// Space/process heat
    Heat,
    /// Chilled water
    Cooling,
    /// Natural gas
    Gas,
}
