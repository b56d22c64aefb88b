//! Immutable input snapshot for benefit calculations
//!
//! The collaborator owns the mutable store; every calculation runs against a
//! consistent `TeamSnapshot` handed in per call. The engine never mutates it.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::team::{MemberId, ProductionRecord, TeamMember};

/// Roster plus production log, frozen for the duration of a calculation.
///
/// Serializes as the collaborator's backup format:
/// `{ "team": [...], "production": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    #[serde(default, rename = "team")]
    members: Vec<TeamMember>,

    #[serde(default)]
    production: Vec<ProductionRecord>,
}

impl TeamSnapshot {
    pub fn new(members: Vec<TeamMember>, production: Vec<ProductionRecord>) -> Self {
        Self {
            members,
            production,
        }
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn production(&self) -> &[ProductionRecord] {
        &self.production
    }

    pub fn member(&self, id: MemberId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn require_member(&self, id: MemberId) -> Result<&TeamMember, EngineError> {
        self.member(id).ok_or(EngineError::MemberNotFound(id))
    }

    /// Members whose upline is `id`. Linear scan; rosters are hundreds of
    /// members at most.
    pub fn children_of(&self, id: MemberId) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(move |m| m.upline_id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Position;

    fn member(id: MemberId, upline: Option<MemberId>) -> TeamMember {
        TeamMember {
            id,
            first_name: format!("M{id}"),
            last_name: "Test".to_string(),
            position: Position::AG,
            persistency_rate: 100.0,
            agent_start_date: None,
            upline_id: upline,
        }
    }

    #[test]
    fn test_member_lookup() {
        let snapshot = TeamSnapshot::new(vec![member(1, None), member(2, Some(1))], vec![]);

        assert_eq!(snapshot.member(2).map(|m| m.id), Some(2));
        assert!(snapshot.member(99).is_none());
        assert_eq!(
            snapshot.require_member(99),
            Err(EngineError::MemberNotFound(99))
        );
    }

    #[test]
    fn test_children_lookup() {
        let snapshot = TeamSnapshot::new(
            vec![member(1, None), member(2, Some(1)), member(3, Some(1)), member(4, Some(2))],
            vec![],
        );

        let children: Vec<MemberId> = snapshot.children_of(1).map(|m| m.id).collect();
        assert_eq!(children, vec![2, 3]);
        assert_eq!(snapshot.children_of(4).count(), 0);
    }

    #[test]
    fn test_backup_format_round_trip() {
        let snapshot = TeamSnapshot::new(vec![member(1, None)], vec![]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"team\""));
        assert!(json.contains("\"production\""));

        let back: TeamSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
