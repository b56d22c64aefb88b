//! Typed errors for calculation input validation
//!
//! The engine favors soft failure: a benefit that does not qualify comes back
//! as a zero-amount line item with an explanatory note. These errors cover the
//! inputs that cannot produce a meaningful calculation at all.

use chrono::NaiveDate;
use thiserror::Error;

use crate::team::MemberId;

/// Hard failures raised before any benefit math runs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Period token outside `"year"`, `"q1".."q4"`, `"1".."12"`
    #[error("invalid period token: {0:?}")]
    InvalidPeriodToken(String),

    /// Calculation requested for an id that is not in the roster
    #[error("member {0} not found in roster")]
    MemberNotFound(MemberId),

    /// Interval with start after end
    #[error("interval start {start} is after end {end}")]
    MalformedInterval { start: NaiveDate, end: NaiveDate },

    /// Upline edges form a cycle; a walk re-encountered this member
    #[error("cyclic upline chain detected at member {0}")]
    CyclicHierarchy(MemberId),

    /// Position code outside the AG/AL/AVP/VP/SVP ladder
    #[error("unknown position code: {0:?}")]
    UnknownPosition(String),

    /// Year outside the supported calendar range
    #[error("year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),
}
