//! FIFO acquisition lots tracked per token.

use serde::{Deserialize, Serialize};

/// Upper bound on the number of lots tracked for a single token (§3).
pub const MAX_LOTS: usize = 32;

/// A single FIFO acquisition record: `amount` units acquired at
/// `cost_per_unit`.
///
/// A lot is "present" when `amount > 0`; an "empty" lot has both fields
/// zero. There is no representation for a lot with `amount == 0` and
/// `cost_per_unit != 0` — callers must zero both fields together when a lot
/// is fully consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Lot {
    /// Units remaining in this lot.
    pub amount: u128,
    /// Acquisition price per unit, in the same fixed-point scale as oracle
    /// prices (§4.5 "Numeric policy").
    pub cost_per_unit: u128,
}

impl Lot {
    /// The empty lot, `(0, 0)`.
    pub const EMPTY: Self = Self {
        amount: 0,
        cost_per_unit: 0,
    };

    /// Construct a present lot.
    #[must_use]
    pub const fn new(amount: u128, cost_per_unit: u128) -> Self {
        Self {
            amount,
            cost_per_unit,
        }
    }

    /// Whether this lot holds units acquired but not yet consumed.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.amount > 0
    }
}
