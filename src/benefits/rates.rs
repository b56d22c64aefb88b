//! Tiered bonus rate tables and qualification gates
//!
//! All thresholds and rates come from the agency compensation plan. Tables
//! are ordered descending by threshold; the highest tier a total reaches
//! wins, and anything below the lowest tier earns nothing.

use chrono::NaiveDate;

use crate::team::Position;

/// Average month length used by the plan for tenure arithmetic
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Tenure at or below which the first-six-months yearly tables apply
pub const NEW_AGENT_TENURE_MONTHS: f64 = 6.0;

/// Minimum persistency for the agent quarterly and yearly bonuses
pub const AGENT_BONUS_PERSISTENCY_FLOOR: f64 = 80.0;

/// Minimum persistency for the unit manager bonus
pub const MANAGER_BONUS_PERSISTENCY_FLOOR: f64 = 75.0;

/// Minimum persistency for the executive yearly bonus
pub const EXECUTIVE_BONUS_PERSISTENCY_FLOOR: f64 = 70.0;

/// Share of each direct recruit's AFYP paid as the recruiting benefit
pub const RECRUITING_BENEFIT_RATE: f64 = 0.10;

/// Cap on the leader's personal AFYP inside a pooled unit total, as a share
/// of the team's AFYP
pub const PERSONAL_CONTRIBUTION_CAP: f64 = 0.30;

/// Ordered `(threshold, rate)` table, descending by threshold
#[derive(Debug, Clone)]
pub struct RateTable {
    tiers: Vec<(f64, f64)>,
}

impl RateTable {
    fn new(tiers: Vec<(f64, f64)>) -> Self {
        debug_assert!(
            tiers.windows(2).all(|pair| pair[0].0 > pair[1].0),
            "tiers must be strictly descending by threshold"
        );
        Self { tiers }
    }

    /// First tier whose threshold the total reaches; 0 below the lowest tier
    pub fn lookup(&self, total: f64) -> f64 {
        for &(threshold, rate) in &self.tiers {
            if total >= threshold {
                return rate;
            }
        }
        0.0
    }

    /// Agent quarterly bonus on personal AFYP
    pub fn agent_quarterly() -> Self {
        Self::new(vec![
            (160_000.0, 0.22),
            (110_000.0, 0.18),
            (70_000.0, 0.15),
            (40_000.0, 0.12),
            (25_000.0, 0.10),
        ])
    }

    /// Agent yearly bonus, tenure of six months or less
    pub fn agent_yearly_first_six_months() -> Self {
        Self::new(vec![
            (375_000.0, 0.22),
            (250_000.0, 0.18),
            (160_000.0, 0.15),
            (90_000.0, 0.12),
            (60_000.0, 0.10),
        ])
    }

    /// Agent yearly bonus, tenure over six months
    pub fn agent_yearly_tenured() -> Self {
        Self::new(vec![
            (750_000.0, 0.22),
            (500_000.0, 0.18),
            (320_000.0, 0.15),
            (180_000.0, 0.12),
            (120_000.0, 0.10),
        ])
    }

    /// First-year overriding on direct-unit AFYP. The base tier applies to
    /// any positive total; callers skip the lookup entirely at zero.
    pub fn unit_overriding() -> Self {
        Self::new(vec![
            (150_000.0, 0.35),
            (80_000.0, 0.30),
            (60_000.0, 0.25),
            (40_000.0, 0.20),
            (20_000.0, 0.18),
            (0.0, 0.15),
        ])
    }

    /// Unit manager quarterly bonus on the pooled unit AFYP
    pub fn manager_quarterly() -> Self {
        Self::new(vec![
            (400_000.0, 0.06),
            (240_000.0, 0.05),
            (180_000.0, 0.04),
        ])
    }

    /// Unit manager yearly bonus, tenure of six months or less
    pub fn manager_yearly_first_six_months() -> Self {
        Self::new(vec![
            (1_250_000.0, 0.09),
            (1_050_000.0, 0.08),
            (850_000.0, 0.07),
            (650_000.0, 0.06),
            (450_000.0, 0.05),
            (350_000.0, 0.04),
        ])
    }

    /// Unit manager yearly bonus, tenure over six months
    pub fn manager_yearly_tenured() -> Self {
        Self::new(vec![
            (2_500_000.0, 0.09),
            (2_100_000.0, 0.08),
            (1_700_000.0, 0.07),
            (1_300_000.0, 0.06),
            (900_000.0, 0.05),
            (700_000.0, 0.04),
        ])
    }

    /// First-year overriding on an executive's direct-line AFYP. Base tier
    /// applies to any positive total, as with `unit_overriding`.
    pub fn line_overriding() -> Self {
        Self::new(vec![
            (1_200_000.0, 0.13),
            (800_000.0, 0.09),
            (400_000.0, 0.08),
            (0.0, 0.07),
        ])
    }

    /// Executive yearly bonus rate, looked up by achievement ratio
    /// (entire-line AFYP / position target) rather than a money total
    pub fn executive_achievement() -> Self {
        Self::new(vec![(3.0, 0.02), (2.0, 0.015), (1.0, 0.01)])
    }
}

/// Agent yearly table for the given tenure in months
pub fn agent_yearly_table(tenure_months: f64) -> RateTable {
    if tenure_months <= NEW_AGENT_TENURE_MONTHS {
        RateTable::agent_yearly_first_six_months()
    } else {
        RateTable::agent_yearly_tenured()
    }
}

/// Manager yearly table for the given tenure in months
pub fn manager_yearly_table(tenure_months: f64) -> RateTable {
    if tenure_months <= NEW_AGENT_TENURE_MONTHS {
        RateTable::manager_yearly_first_six_months()
    } else {
        RateTable::manager_yearly_tenured()
    }
}

/// Entire-line AFYP target for the executive yearly bonus
pub fn executive_yearly_target(position: Position) -> Option<f64> {
    match position {
        Position::AVP => Some(4_500_000.0),
        Position::VP => Some(9_000_000.0),
        Position::SVP => Some(18_000_000.0),
        Position::AG | Position::AL => None,
    }
}

/// Months between the agent code issue date and the period end
pub fn tenure_months(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_MONTH
}

/// Leader's personal AFYP admitted into the pooled unit total, capped so
/// personal production cannot dominate a team-size-tiered bonus
pub fn capped_personal_contribution(personal_afyp: f64, team_afyp: f64) -> f64 {
    personal_afyp.min(team_afyp * PERSONAL_CONTRIBUTION_CAP)
}

/// How much of a gross overriding amount is paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payout {
    Full,
    HalfHeld,
    Withheld,
}

impl Payout {
    pub fn label(&self) -> &'static str {
        match self {
            Payout::Full => "paid in full",
            Payout::HalfHeld => "50% paid, 50% withheld",
            Payout::Withheld => "withheld in full",
        }
    }
}

/// Two-floor persistency holdback on overriding benefits: below `zero_floor`
/// the whole amount is withheld, between the floors half is withheld.
#[derive(Debug, Clone, Copy)]
pub struct HoldbackGate {
    pub zero_floor: f64,
    pub full_floor: f64,
}

impl HoldbackGate {
    /// Gate on AL/executive direct-unit overriding
    pub const UNIT_OVERRIDING: Self = Self {
        zero_floor: 65.0,
        full_floor: 75.0,
    };

    /// Gate on executive direct-line overriding
    pub const LINE_OVERRIDING: Self = Self {
        zero_floor: 60.0,
        full_floor: 70.0,
    };

    pub fn apply(&self, gross: f64, persistency: f64) -> (f64, Payout) {
        if persistency < self.zero_floor {
            (0.0, Payout::Withheld)
        } else if persistency < self.full_floor {
            (gross * 0.5, Payout::HalfHeld)
        } else {
            (gross, Payout::Full)
        }
    }
}
