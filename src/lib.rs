//! Bi-level capacity sizing for multi-carrier microgrids.
//!
//! An outer multi-objective search proposes candidate capacity vectors; each candidate is scored
//! by solving the optimal dispatch of every representative day and aggregating the results into
//! an economic objective and a complementarity objective.
#![warn(missing_docs)]
pub mod capacity;
pub mod carrier;
pub mod cli;
pub mod converter;
pub mod dispatch;
pub mod executor;
pub mod input;
pub mod log;
pub mod model;
pub mod net_load;
pub mod objective;
pub mod operation;
pub mod output;
pub mod population;
pub mod search;
pub mod settings;
pub mod storage;
pub mod typical_day;
pub mod units;
pub mod weather;

#[cfg(test)]
mod fixture;
