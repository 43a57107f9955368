//! Reconstruction of full-horizon net-exchange series from solved representative days.
//!
//! For each of electricity, heat and cooling, the import flow (grid or backup source) and the
//! overflow flow are collapsed into one signed series: positive values are net imports and
//! negative values are net curtailment. The series of a representative day is copied into every
//! calendar day of its cluster.
use crate::carrier::Carrier;
use crate::dispatch::{Component, DispatchResult, FlowDirection};
use crate::operation::HOURS_PER_DAY;
use crate::typical_day::TypicalDay;
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// The import and overflow components whose flows make up each net-exchange series
pub const EXCHANGE_PAIRS: [(Carrier, Component, Component); 3] = [
    (
        Carrier::Electricity,
        Component::Grid,
        Component::ElectricityOverflow,
    ),
    (Carrier::Heat, Component::BackupHeat, Component::HeatOverflow),
    (
        Carrier::Cooling,
        Component::BackupCooling,
        Component::CoolingOverflow,
    ),
];

/// Signed net exchange for one hour.
///
/// Ties go to the import side, so an hour with neither import nor overflow gives zero.
pub fn net_exchange(import: f64, overflow: f64) -> f64 {
    if import >= overflow {
        import
    } else {
        -overflow
    }
}

/// Net-exchange series for electricity, heat and cooling over the whole planning horizon
#[derive(Debug, Clone, PartialEq)]
pub struct NetLoad(IndexMap<Carrier, Vec<f64>>);

impl NetLoad {
    /// Create zeroed series for a horizon of the given number of days
    pub fn new(num_days: usize) -> Self {
        Self(
            EXCHANGE_PAIRS
                .iter()
                .map(|(carrier, _, _)| (*carrier, vec![0.0; num_days * HOURS_PER_DAY]))
                .collect(),
        )
    }

    /// Write the net exchange of a solved representative day into all days of its cluster.
    ///
    /// # Arguments
    ///
    /// * `typical_day` - The representative day and its members
    /// * `dispatch` - The solved dispatch for the representative day
    pub fn insert_typical_day(
        &mut self,
        typical_day: &TypicalDay,
        dispatch: &DispatchResult,
    ) -> Result<()> {
        for (carrier, import_component, overflow_component) in EXCHANGE_PAIRS {
            let import = dispatch
                .flow(import_component, carrier, FlowDirection::IntoBus)
                .with_context(|| format!("Missing {import_component} flow in dispatch result"))?;
            let overflow = dispatch
                .flow(overflow_component, carrier, FlowDirection::FromBus)
                .with_context(|| format!("Missing {overflow_component} flow in dispatch result"))?;
            let day_values: Vec<f64> = import
                .iter()
                .zip(overflow)
                .map(|(&import, &overflow)| net_exchange(import, overflow))
                .collect();

            let series = self
                .0
                .get_mut(&carrier)
                .expect("Net load series should exist for every exchange carrier");
            for &member in &typical_day.members {
                let target = (member as usize)
                    .checked_sub(1)
                    .map(|index| index * HOURS_PER_DAY)
                    .and_then(|start| series.get_mut(start..start + HOURS_PER_DAY))
                    .with_context(|| {
                        format!("Calendar day {member} is outside the planning horizon")
                    })?;
                target.copy_from_slice(&day_values);
            }
        }

        Ok(())
    }

    /// The series for a carrier, if one is kept for it
    pub fn get(&self, carrier: Carrier) -> Option<&[f64]> {
        self.0.get(&carrier).map(Vec::as_slice)
    }

    /// Iterate over the series for each carrier
    pub fn iter(&self) -> impl Iterator<Item = (Carrier, &[f64])> {
        self.0.iter().map(|(carrier, series)| (*carrier, series.as_slice()))
    }

    /// Number of hours covered
    pub fn num_hours(&self) -> usize {
        self.0.values().next().map_or(0, Vec::len)
    }

    /// The complementarity metric: sum of the population standard deviations of all series
    pub fn complementarity(&self) -> f64 {
        self.0.values().map(|series| std_dev(series)).sum()
    }
}

/// Population standard deviation of a series (zero for an empty series)
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
