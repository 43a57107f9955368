//! Representative (typical) days and the calendar days they stand in for.
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use log::warn;
use std::collections::HashSet;

/// A representative day together with the calendar days in its cluster.
///
/// Day numbers are 1-indexed calendar days of the planning horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct TypicalDay {
    /// The calendar day whose data represents the cluster
    pub id: u32,
    /// The calendar days represented by this day
    pub members: Vec<u32>,
}

impl TypicalDay {
    /// Number of calendar days represented by this day
    pub fn weight(&self) -> usize {
        self.members.len()
    }
}

/// All typical days of a planning horizon, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct TypicalDays(IndexMap<u32, TypicalDay>);

impl TypicalDays {
    /// Create a set of typical days covering a horizon of `num_days` days.
    ///
    /// Every calendar day must belong to exactly one cluster, so the cluster weights sum to
    /// `num_days`.
    pub fn new<I>(days: I, num_days: usize) -> Result<Self>
    where
        I: IntoIterator<Item = TypicalDay>,
    {
        let in_horizon = |day: u32| (1..=num_days).contains(&(day as usize));

        let mut map = IndexMap::new();
        let mut seen = HashSet::new();
        for typical_day in days {
            let id = typical_day.id;
            ensure!(
                in_horizon(id),
                "Typical day {id} is outside the planning horizon (1..={num_days})"
            );
            ensure!(
                !typical_day.members.is_empty(),
                "Typical day {id} does not represent any days"
            );
            for &member in &typical_day.members {
                ensure!(
                    in_horizon(member),
                    "Day {member} in cluster of typical day {id} is outside the planning \
                    horizon (1..={num_days})"
                );
                ensure!(
                    seen.insert(member),
                    "Day {member} is assigned to more than one typical day"
                );
            }
            if !typical_day.members.contains(&id) {
                warn!("Typical day {id} is not a member of its own cluster");
            }

            ensure!(
                map.insert(id, typical_day).is_none(),
                "Duplicate entry for typical day {id}"
            );
        }

        ensure!(!map.is_empty(), "No typical days were provided");
        let total_weight: usize = map.values().map(TypicalDay::weight).sum();
        ensure!(
            total_weight == num_days,
            "Typical day weights sum to {total_weight}, but the planning horizon has {num_days} \
            days"
        );

        Ok(Self(map))
    }

    /// Iterate over the typical days in input order
    pub fn iter(&self) -> impl Iterator<Item = &TypicalDay> {
        self.0.values()
    }

    /// Get a typical day by ID
    pub fn get(&self, id: u32) -> Option<&TypicalDay> {
        self.0.get(&id)
    }

    /// Number of typical days
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no typical days (never true for a validated set)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all cluster weights, i.e. the number of days in the planning horizon
    pub fn total_weight(&self) -> usize {
        self.iter().map(TypicalDay::weight).sum()
    }
}
