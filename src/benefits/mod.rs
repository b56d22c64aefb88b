//! Benefit calculation engine
//!
//! Pure, synchronous functions over an immutable `TeamSnapshot`: period
//! resolution, hierarchy walks, production aggregation, tiered rate lookup,
//! and per-member benefit composition.

mod aggregate;
mod engine;
pub mod hierarchy;
mod period;
pub mod rates;
mod report;

pub use aggregate::{sum_field, totals_for, totals_for_member, ProductionField, ProductionTotals};
pub use engine::{format_money, format_percent, BenefitEngine, BenefitLineItem, Detail};
pub use hierarchy::{direct_line_ids, direct_unit_ids, entire_line_ids};
pub use period::{DateRange, Period};
pub use rates::{capped_personal_contribution, tenure_months, HoldbackGate, Payout, RateTable};
pub use report::BenefitReport;
