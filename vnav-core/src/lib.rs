//! Vertical trajectory prediction for a flight management system.
//!
//! The engine composes a tree of [segments](segment::Segment),
//! each integrating the aircraft state under a control law until a boundary condition,
//! into per-phase checkpoint sequences accumulated by a [`ProfileBuilder`](builder::ProfileBuilder).

#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::needless_pass_by_value, clippy::type_complexity)] // too many false positives from system params.
#![allow(clippy::collapsible_else_if)] // this is usually intentional
#![allow(clippy::missing_panics_doc)] // 5:21 PM conrad.lock().expect("luscious")[tty0] : Worst clippy lint
#![allow(clippy::implicit_hasher)] // unnecessary generalization
#![cfg_attr(not(feature = "precommit-checks"), allow(dead_code, unused_variables, unused_imports))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]

pub mod builder;
pub mod constraints;
pub mod context;
pub mod integrate;
pub mod interpolate;
pub mod perf;
pub mod predict;
pub mod propagate;
pub mod pseudo;
pub mod reconcile;
pub mod segment;
pub mod state;
pub mod tactical;
#[cfg(test)]
mod test_util;
pub mod try_log;
pub use try_log::TryLog;
pub mod wind;

/// Outcome of a bounded computation.
///
/// Computations never fail; they report how they terminated alongside their result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display)]
pub enum Status {
    /// The computation reached its boundary condition.
    Converged,
    /// The computation stopped at its iteration cap and returned the last computed value.
    IterationCapReached,
    /// A required input was unavailable and nothing was computed.
    InputMissing,
}

impl Status {
    /// Combines the status of two computations contributing to one result.
    ///
    /// `InputMissing` dominates `IterationCapReached`, which dominates `Converged`.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        match (self, other) {
            (Self::InputMissing, _) | (_, Self::InputMissing) => Self::InputMissing,
            (Self::IterationCapReached, _) | (_, Self::IterationCapReached) => {
                Self::IterationCapReached
            }
            _ => Self::Converged,
        }
    }
}
