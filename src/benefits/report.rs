//! Assembled benefit report for one member and period
//!
//! Thin wrapper over the engine output carrying what the collaborator
//! renders: the member heading, the positive line items, and their sum.

use serde::Serialize;

use crate::benefits::{BenefitEngine, BenefitLineItem, Period};
use crate::error::EngineError;
use crate::team::{MemberId, Position, TeamSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitReport {
    pub member_id: MemberId,
    pub member_name: String,
    pub position: Position,
    pub year: i32,
    pub period: String,
    pub items: Vec<BenefitLineItem>,
    pub total: f64,
}

impl BenefitReport {
    pub fn build(
        snapshot: &TeamSnapshot,
        member_id: MemberId,
        year: i32,
        period: Period,
    ) -> Result<Self, EngineError> {
        let member = snapshot.require_member(member_id)?;
        let items = BenefitEngine::new(snapshot).calculate_for_member(member_id, year, period)?;
        let total = items.iter().map(|item| item.amount).sum();

        Ok(Self {
            member_id,
            member_name: member.full_name(),
            position: member.position,
            year,
            period: period.to_string(),
            items,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{AgentRef, ProductionRecord, TeamMember};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_report_totals_its_items() {
        let snapshot = TeamSnapshot::new(
            vec![TeamMember {
                id: 1,
                first_name: "Anan".to_string(),
                last_name: "Srisuk".to_string(),
                position: Position::AG,
                persistency_rate: 85.0,
                agent_start_date: NaiveDate::from_ymd_opt(2022, 1, 1),
                upline_id: None,
            }],
            vec![ProductionRecord {
                id: 1,
                policy_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
                agent: AgentRef::Known(1),
                client_name: "C".to_string(),
                policy_type: "WL".to_string(),
                fyp: 75_000.0,
                afyp_rate: 100.0,
                fyc_rate: 30.0,
            }],
        );

        let report = BenefitReport::build(&snapshot, 1, 2024, Period::Quarter(1)).unwrap();
        assert_eq!(report.member_name, "Anan Srisuk");
        assert_eq!(report.period, "q1");
        // FYC 22,500 + quarterly bonus 11,250
        assert_relative_eq!(report.total, 33_750.0, epsilon = 1e-6);
        assert_relative_eq!(
            report.items.iter().map(|i| i.amount).sum::<f64>(),
            report.total,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_report_for_unknown_member_fails() {
        let snapshot = TeamSnapshot::new(vec![], vec![]);
        assert_eq!(
            BenefitReport::build(&snapshot, 5, 2024, Period::Year),
            Err(EngineError::MemberNotFound(5))
        );
    }
}
