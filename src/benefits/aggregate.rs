//! Production filtering and monetary reduction
//!
//! Records match when their agent is in the member set and their policy date
//! falls inside the closed interval. `Unmatched` records never match. A
//! linear scan is fine at agency scale (hundreds to low thousands of rows).

use std::collections::HashSet;

use crate::benefits::DateRange;
use crate::team::{MemberId, ProductionRecord};

/// Monetary field of a production record, derived where needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionField {
    Fyp,
    Afyp,
    Commission,
}

/// One-pass totals over a filtered slice of the production log
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductionTotals {
    pub cases: usize,
    pub fyp: f64,
    pub afyp: f64,
    pub commission: f64,
}

/// Sum a single field over records matching the member set and interval
pub fn sum_field(
    log: &[ProductionRecord],
    members: &HashSet<MemberId>,
    range: DateRange,
    field: ProductionField,
) -> f64 {
    matching(log, members, range)
        .map(|record| match field {
            ProductionField::Fyp => record.fyp,
            ProductionField::Afyp => record.afyp(),
            ProductionField::Commission => record.commission(),
        })
        .sum()
}

/// All monetary totals over records matching the member set and interval
pub fn totals_for(
    log: &[ProductionRecord],
    members: &HashSet<MemberId>,
    range: DateRange,
) -> ProductionTotals {
    let mut totals = ProductionTotals::default();
    for record in matching(log, members, range) {
        totals.cases += 1;
        totals.fyp += record.fyp;
        totals.afyp += record.afyp();
        totals.commission += record.commission();
    }
    totals
}

/// Totals for a single member's own production
pub fn totals_for_member(
    log: &[ProductionRecord],
    member_id: MemberId,
    range: DateRange,
) -> ProductionTotals {
    totals_for(log, &HashSet::from([member_id]), range)
}

fn matching<'a>(
    log: &'a [ProductionRecord],
    members: &'a HashSet<MemberId>,
    range: DateRange,
) -> impl Iterator<Item = &'a ProductionRecord> {
    log.iter().filter(move |record| {
        record
            .agent
            .id()
            .is_some_and(|id| members.contains(&id))
            && range.contains(record.policy_date)
    })
}
