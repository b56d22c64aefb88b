//! Benefit composition per member and period
//!
//! `BenefitEngine` walks the hierarchy, aggregates windowed production, runs
//! the tier tables, and assembles named line items with audit details. Every
//! sub-calculation produces a full item even when it yields zero, so the
//! reasons for non-qualification are inspectable; the public entry point
//! filters the final list down to strictly positive amounts before returning.

use std::collections::HashSet;

use serde::Serialize;

use crate::benefits::aggregate::{totals_for, totals_for_member};
use crate::benefits::hierarchy;
use crate::benefits::period::{DateRange, Period};
use crate::benefits::rates::{self, HoldbackGate, RateTable};
use crate::error::EngineError;
use crate::team::{MemberId, Position, TeamMember, TeamSnapshot};

/// Label/value pair shown in the audit popover
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub label: String,
    pub value: String,
}

impl Detail {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One computed benefit, fresh per calculation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitLineItem {
    pub name: String,
    pub amount: f64,
    pub note: String,
    pub details: Vec<Detail>,
}

impl BenefitLineItem {
    fn not_qualifying(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: 0.0,
            note: "not qualifying".to_string(),
            details: Vec::new(),
        }
    }

    fn push_detail(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.details.push(Detail::new(label, value));
    }
}

/// Thousands-separated amount with two decimals, as the collaborator renders
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{:02}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Rate rendered as a percentage, dropping a whole-number fraction
pub fn format_percent(rate: f64) -> String {
    let percent = rate * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{}%", percent.round() as i64)
    } else {
        format!("{percent:.1}%")
    }
}

/// Which sweep a unit manager bonus covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagerBonusPeriod {
    Quarter(u32),
    Year,
}

/// Pure calculation engine over an immutable snapshot
pub struct BenefitEngine<'a> {
    snapshot: &'a TeamSnapshot,
}

impl<'a> BenefitEngine<'a> {
    pub fn new(snapshot: &'a TeamSnapshot) -> Self {
        Self { snapshot }
    }

    /// Compute the ordered benefit list for one member over a period.
    ///
    /// Dispatches by position: everyone gets personal FYC; agents get
    /// quarterly/yearly bonuses and recruiting benefits; unit leaders and
    /// executives get unit overriding and the pooled manager bonus;
    /// executives additionally get direct-line overriding and, for a year
    /// period, the entire-line target bonus. Items that earned nothing are
    /// dropped from the returned list.
    pub fn calculate_for_member(
        &self,
        member_id: MemberId,
        year: i32,
        period: Period,
    ) -> Result<Vec<BenefitLineItem>, EngineError> {
        let member = self.snapshot.require_member(member_id)?;
        let range = period.resolve(year)?;
        log::debug!(
            "calculating benefits for member {member_id} ({}) over {range:?}",
            member.position
        );

        let mut items = Vec::new();

        // Personal FYC is unconditional for every position.
        items.push(self.personal_commission(member, range));

        match member.position {
            Position::AG => {
                for quarter in period.bonus_quarters() {
                    items.push(self.agent_quarterly_bonus(member, year, quarter)?);
                }
                if period.is_yearly() {
                    items.push(self.agent_yearly_bonus(member, year)?);
                }
                items.extend(self.recruiting_benefits(member, range));
            }
            Position::AL | Position::AVP | Position::VP | Position::SVP => {
                let unit = hierarchy::direct_unit_ids(self.snapshot, member.id)?;
                items.push(self.unit_overriding(member, &unit, range));
                for quarter in period.bonus_quarters() {
                    items.push(self.manager_bonus(
                        member,
                        &unit,
                        year,
                        ManagerBonusPeriod::Quarter(quarter),
                    )?);
                }
                if period.is_yearly() {
                    items.push(self.manager_bonus(member, &unit, year, ManagerBonusPeriod::Year)?);
                }
            }
        }

        if member.position.is_executive() {
            let line = hierarchy::direct_line_ids(self.snapshot, member.id)?;
            items.push(self.line_overriding(member, &line, range));

            if period.is_yearly() {
                let entire_line = hierarchy::entire_line_ids(self.snapshot, member.id)?;
                items.push(self.executive_yearly_bonus(member, &entire_line, range));
            }
        }

        Ok(items.into_iter().filter(|item| item.amount > 0.0).collect())
    }

    /// Personal first-year commission over own production. No gating.
    fn personal_commission(&self, member: &TeamMember, range: DateRange) -> BenefitLineItem {
        let totals = totals_for_member(self.snapshot.production(), member.id, range);
        let average_rate = if totals.fyp > 0.0 {
            totals.commission / totals.fyp * 100.0
        } else {
            0.0
        };

        BenefitLineItem {
            name: "Personal Commission (FYC)".to_string(),
            amount: totals.commission,
            note: "from personal production".to_string(),
            details: vec![
                Detail::new("Cases", totals.cases.to_string()),
                Detail::new("Total FYP", format_money(totals.fyp)),
                Detail::new("Average rate", format!("{average_rate:.2}%")),
            ],
        }
    }

    fn agent_quarterly_bonus(
        &self,
        member: &TeamMember,
        year: i32,
        quarter: u32,
    ) -> Result<BenefitLineItem, EngineError> {
        let mut item = BenefitLineItem::not_qualifying(format!("Agent Bonus (Q{quarter})"));

        if member.persistency_rate < rates::AGENT_BONUS_PERSISTENCY_FLOOR {
            item.note = format!(
                "persistency below {:.0}%",
                rates::AGENT_BONUS_PERSISTENCY_FLOOR
            );
            item.push_detail("Persistency", format!("{}%", member.persistency_rate));
            return Ok(item);
        }

        let range = Period::Quarter(quarter).resolve(year)?;
        let totals = totals_for_member(self.snapshot.production(), member.id, range);
        let rate = RateTable::agent_quarterly().lookup(totals.afyp);

        if rate > 0.0 {
            item.amount = totals.afyp * rate;
            item.note = format!(
                "AFYP {} x {}",
                format_money(totals.afyp),
                format_percent(rate)
            );
            item.details = vec![
                Detail::new("Persistency", format!("{}% (pass)", member.persistency_rate)),
                Detail::new("AFYP this quarter", format_money(totals.afyp)),
                Detail::new("Bonus rate", format_percent(rate)),
            ];
        } else {
            item.note = "AFYP below tier minimum".to_string();
            item.push_detail("AFYP this quarter", format_money(totals.afyp));
        }
        Ok(item)
    }

    fn agent_yearly_bonus(
        &self,
        member: &TeamMember,
        year: i32,
    ) -> Result<BenefitLineItem, EngineError> {
        let mut item = BenefitLineItem::not_qualifying("Agent Bonus (Annual)");

        if member.persistency_rate < rates::AGENT_BONUS_PERSISTENCY_FLOOR {
            item.note = format!(
                "persistency below {:.0}%",
                rates::AGENT_BONUS_PERSISTENCY_FLOOR
            );
            item.push_detail("Persistency", format!("{}%", member.persistency_rate));
            return Ok(item);
        }

        let Some(start_date) = member.agent_start_date else {
            item.note = "missing agent start date".to_string();
            item.push_detail("Error", "agent code issue date is required for the annual bonus");
            return Ok(item);
        };

        let range = Period::Year.resolve(year)?;
        let tenure = rates::tenure_months(start_date, range.end);
        let tier_label = if tenure <= rates::NEW_AGENT_TENURE_MONTHS {
            "6 months or less"
        } else {
            "over 6 months"
        };

        let totals = totals_for_member(self.snapshot.production(), member.id, range);
        let rate = rates::agent_yearly_table(tenure).lookup(totals.afyp);

        if rate > 0.0 {
            item.amount = totals.afyp * rate;
            item.note = format!(
                "AFYP {} x {}",
                format_money(totals.afyp),
                format_percent(rate)
            );
            item.details = vec![
                Detail::new("Persistency", format!("{}% (pass)", member.persistency_rate)),
                Detail::new("Tenure", format!("{tenure:.1} months ({tier_label})")),
                Detail::new("AFYP full year", format_money(totals.afyp)),
                Detail::new("Bonus rate", format_percent(rate)),
            ];
        } else {
            item.note = "AFYP below tier minimum".to_string();
            item.push_detail("Tenure", format!("{tenure:.1} months ({tier_label})"));
            item.push_detail("AFYP full year", format_money(totals.afyp));
        }
        Ok(item)
    }

    /// One line item per direct recruit with positive AFYP in the interval.
    /// Not gated by persistency, tenure, or period type.
    fn recruiting_benefits(&self, member: &TeamMember, range: DateRange) -> Vec<BenefitLineItem> {
        let mut benefits = Vec::new();

        for recruit in self.snapshot.children_of(member.id) {
            let totals = totals_for_member(self.snapshot.production(), recruit.id, range);
            if totals.afyp <= 0.0 {
                continue;
            }

            benefits.push(BenefitLineItem {
                name: format!("Recruiting Benefit (from {})", recruit.full_name()),
                amount: totals.afyp * rates::RECRUITING_BENEFIT_RATE,
                note: "10% of recruit AFYP".to_string(),
                details: vec![
                    Detail::new("Recruit", recruit.full_name()),
                    Detail::new("AFYP produced", format_money(totals.afyp)),
                    Detail::new(
                        "Caveat",
                        "first-90-day minimum AFYP qualification is not applied",
                    ),
                ],
            });
        }
        benefits
    }

    fn unit_overriding(
        &self,
        member: &TeamMember,
        unit: &HashSet<MemberId>,
        range: DateRange,
    ) -> BenefitLineItem {
        let mut item = BenefitLineItem::not_qualifying("First-Year Unit Overriding (OV)");
        let totals = totals_for(self.snapshot.production(), unit, range);

        if totals.afyp > 0.0 {
            let rate = RateTable::unit_overriding().lookup(totals.afyp);
            let gross = totals.afyp * rate;
            let (amount, payout) =
                HoldbackGate::UNIT_OVERRIDING.apply(gross, member.persistency_rate);

            item.amount = amount;
            item.note = format!(
                "unit AFYP {} x {}",
                format_money(totals.afyp),
                format_percent(rate)
            );
            item.details = vec![
                Detail::new("Unit AFYP total", format_money(totals.afyp)),
                Detail::new("Overriding rate", format_percent(rate)),
                Detail::new("Unit persistency", format!("{}%", member.persistency_rate)),
                Detail::new("Payout", payout.label()),
            ];
        } else {
            item.push_detail("Unit AFYP total", format_money(totals.afyp));
        }
        item
    }

    fn line_overriding(
        &self,
        member: &TeamMember,
        line: &HashSet<MemberId>,
        range: DateRange,
    ) -> BenefitLineItem {
        let mut item = BenefitLineItem::not_qualifying("First-Year Direct Line Overriding (AE OV)");
        let totals = totals_for(self.snapshot.production(), line, range);

        if totals.afyp > 0.0 {
            let rate = RateTable::line_overriding().lookup(totals.afyp);
            let gross = totals.afyp * rate;
            let (amount, payout) =
                HoldbackGate::LINE_OVERRIDING.apply(gross, member.persistency_rate);

            item.amount = amount;
            item.note = format!(
                "direct line AFYP {} x {}",
                format_money(totals.afyp),
                format_percent(rate)
            );
            item.details = vec![
                Detail::new("Direct line AFYP", format_money(totals.afyp)),
                Detail::new("Overriding rate", format_percent(rate)),
                Detail::new("Line persistency", format!("{}%", member.persistency_rate)),
                Detail::new("Payout", payout.label()),
            ];
        } else {
            item.push_detail("Direct line AFYP", format_money(totals.afyp));
        }
        item
    }

    /// Pooled unit bonus for AL and executive positions. The leader's own
    /// AFYP joins the team total capped at 30% of it.
    fn manager_bonus(
        &self,
        member: &TeamMember,
        unit: &HashSet<MemberId>,
        year: i32,
        bonus_period: ManagerBonusPeriod,
    ) -> Result<BenefitLineItem, EngineError> {
        let (name, range) = match bonus_period {
            ManagerBonusPeriod::Quarter(q) => (
                format!("Unit Manager Bonus (Q{q})"),
                Period::Quarter(q).resolve(year)?,
            ),
            ManagerBonusPeriod::Year => (
                "Unit Manager Bonus (Annual)".to_string(),
                Period::Year.resolve(year)?,
            ),
        };
        let mut item = BenefitLineItem::not_qualifying(name);

        if member.persistency_rate < rates::MANAGER_BONUS_PERSISTENCY_FLOOR {
            item.note = format!(
                "persistency below {:.0}%",
                rates::MANAGER_BONUS_PERSISTENCY_FLOOR
            );
            item.push_detail("Persistency", format!("{}%", member.persistency_rate));
            return Ok(item);
        }

        let table = match bonus_period {
            ManagerBonusPeriod::Quarter(_) => RateTable::manager_quarterly(),
            ManagerBonusPeriod::Year => {
                let Some(start_date) = member.agent_start_date else {
                    item.note = "missing agent start date".to_string();
                    item.push_detail(
                        "Error",
                        "agent code issue date is required for the annual bonus",
                    );
                    return Ok(item);
                };
                rates::manager_yearly_table(rates::tenure_months(start_date, range.end))
            }
        };

        let mut team: HashSet<MemberId> = unit.clone();
        team.remove(&member.id);

        let personal = totals_for_member(self.snapshot.production(), member.id, range);
        let team_totals = totals_for(self.snapshot.production(), &team, range);
        let capped_personal =
            rates::capped_personal_contribution(personal.afyp, team_totals.afyp);
        let pooled = team_totals.afyp + capped_personal;

        let rate = table.lookup(pooled);
        if rate > 0.0 {
            item.amount = pooled * rate;
            item.note = format!("AFYP {} x {}", format_money(pooled), format_percent(rate));
            item.details = vec![
                Detail::new("Persistency", format!("{}% (pass)", member.persistency_rate)),
                Detail::new("Team AFYP", format_money(team_totals.afyp)),
                Detail::new(
                    "Personal AFYP (capped at 30%)",
                    format!(
                        "{} (from {})",
                        format_money(capped_personal),
                        format_money(personal.afyp)
                    ),
                ),
                Detail::new("Pooled AFYP base", format_money(pooled)),
                Detail::new("Bonus rate", format_percent(rate)),
            ];
        } else {
            item.note = "AFYP below tier minimum".to_string();
            item.push_detail("Pooled AFYP base", format_money(pooled));
        }
        Ok(item)
    }

    /// Executive yearly bonus on entire-line AFYP exceeding the position
    /// target, at a rate picked by the achievement ratio.
    fn executive_yearly_bonus(
        &self,
        member: &TeamMember,
        entire_line: &HashSet<MemberId>,
        range: DateRange,
    ) -> BenefitLineItem {
        let mut item = BenefitLineItem::not_qualifying("Executive Annual Bonus");

        if member.persistency_rate < rates::EXECUTIVE_BONUS_PERSISTENCY_FLOOR {
            item.note = format!(
                "persistency below {:.0}%",
                rates::EXECUTIVE_BONUS_PERSISTENCY_FLOOR
            );
            item.push_detail("Persistency", format!("{}%", member.persistency_rate));
            return item;
        }

        let Some(target) = rates::executive_yearly_target(member.position) else {
            item.note = "position has no annual target".to_string();
            return item;
        };

        let totals = totals_for(self.snapshot.production(), entire_line, range);
        if totals.afyp > target {
            let excess = totals.afyp - target;
            let achievement = totals.afyp / target;
            let rate = RateTable::executive_achievement().lookup(achievement);

            if rate > 0.0 {
                item.amount = excess * rate;
                item.note = format!(
                    "excess {} x {}",
                    format_money(excess),
                    format_percent(rate)
                );
                item.details = vec![
                    Detail::new("Persistency", format!("{}% (pass)", member.persistency_rate)),
                    Detail::new("Entire-line AFYP", format_money(totals.afyp)),
                    Detail::new("Position target", format_money(target)),
                    Detail::new("AFYP above target", format_money(excess)),
                    Detail::new("Bonus rate", format_percent(rate)),
                ];
            }
        } else {
            item.note = "AFYP below position target".to_string();
            item.push_detail("Entire-line AFYP", format_money(totals.afyp));
            item.push_detail("Target", format_money(target));
        }
        item
    }
}
