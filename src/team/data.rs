//! Roster and production log data structures
//!
//! Field names and defaults match the JSON the browser collaborator keeps in
//! its key-value store, so snapshots round-trip without an adapter layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EngineError;

/// Stable member identifier. The collaborator assigns epoch-millisecond ids,
/// so this is 64 bits.
pub type MemberId = u64;

/// Position ladder, lowest to highest. AVP/VP/SVP are the executive (AE) tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    AG,
    AL,
    AVP,
    VP,
    SVP,
}

impl Position {
    /// Executive tiers manage multi-level lines and get the AE benefits
    pub fn is_executive(&self) -> bool {
        matches!(self, Position::AVP | Position::VP | Position::SVP)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Position::AG => "AG",
            Position::AL => "AL",
            Position::AVP => "AVP",
            Position::VP => "VP",
            Position::SVP => "SVP",
        };
        f.write_str(code)
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AG" => Ok(Position::AG),
            "AL" => Ok(Position::AL),
            "AVP" => Ok(Position::AVP),
            "VP" => Ok(Position::VP),
            "SVP" => Ok(Position::SVP),
            other => Err(EngineError::UnknownPosition(other.to_string())),
        }
    }
}

/// One member of the agency roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: MemberId,

    pub first_name: String,

    pub last_name: String,

    pub position: Position,

    /// 13-month persistency, 0-100. Gates bonuses and overriding payouts.
    #[serde(default = "default_persistency")]
    pub persistency_rate: f64,

    /// Date the agent code was issued. The yearly bonuses need this to pick
    /// a tenure table; everything else ignores it.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub agent_start_date: Option<NaiveDate>,

    /// Direct recruiter/manager. `None` marks a hierarchy root.
    #[serde(default)]
    pub upline_id: Option<MemberId>,
}

fn default_persistency() -> f64 {
    100.0
}

/// Browser-sourced data sometimes carries `""` where a date was never set
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl TeamMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Who a production record belongs to.
///
/// CSV import matches agent names against the roster; a name with no match is
/// kept as `Unmatched` so the premium still shows in the log, but it never
/// feeds any member's benefit calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentRef {
    Known(MemberId),
    Unmatched(Option<String>),
}

impl AgentRef {
    /// Roster id, if this record is attributed to a known member
    pub fn id(&self) -> Option<MemberId> {
        match self {
            AgentRef::Known(id) => Some(*id),
            AgentRef::Unmatched(_) => None,
        }
    }
}

/// Wire shape of a production record: nullable `agentId` plus an optional
/// `unmatchedAgentName`, exactly as the collaborator stores it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProductionRecord {
    id: u64,
    policy_date: NaiveDate,
    #[serde(default)]
    agent_id: Option<MemberId>,
    #[serde(default)]
    unmatched_agent_name: Option<String>,
    client_name: String,
    policy_type: String,
    fyp: f64,
    #[serde(default = "default_afyp_rate")]
    afyp_rate: f64,
    #[serde(default)]
    fyc_rate: f64,
}

fn default_afyp_rate() -> f64 {
    100.0
}

/// One append-only production log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProductionRecord", into = "RawProductionRecord")]
pub struct ProductionRecord {
    pub id: u64,

    pub policy_date: NaiveDate,

    pub agent: AgentRef,

    pub client_name: String,

    pub policy_type: String,

    /// First-year premium
    pub fyp: f64,

    /// Annualization rate, percent of FYP (0-100+)
    pub afyp_rate: f64,

    /// First-year commission rate, percent of FYP (0-100+)
    pub fyc_rate: f64,
}

impl From<RawProductionRecord> for ProductionRecord {
    fn from(raw: RawProductionRecord) -> Self {
        let agent = match raw.agent_id {
            Some(id) => AgentRef::Known(id),
            None => AgentRef::Unmatched(raw.unmatched_agent_name),
        };
        Self {
            id: raw.id,
            policy_date: raw.policy_date,
            agent,
            client_name: raw.client_name,
            policy_type: raw.policy_type,
            fyp: raw.fyp,
            afyp_rate: raw.afyp_rate,
            fyc_rate: raw.fyc_rate,
        }
    }
}

impl From<ProductionRecord> for RawProductionRecord {
    fn from(record: ProductionRecord) -> Self {
        let (agent_id, unmatched_agent_name) = match record.agent {
            AgentRef::Known(id) => (Some(id), None),
            AgentRef::Unmatched(name) => (None, name),
        };
        Self {
            id: record.id,
            policy_date: record.policy_date,
            agent_id,
            unmatched_agent_name,
            client_name: record.client_name,
            policy_type: record.policy_type,
            fyp: record.fyp,
            afyp_rate: record.afyp_rate,
            fyc_rate: record.fyc_rate,
        }
    }
}

impl ProductionRecord {
    /// Annualized first-year premium
    pub fn afyp(&self) -> f64 {
        self.fyp * self.afyp_rate / 100.0
    }

    /// First-year commission
    pub fn commission(&self) -> f64 {
        self.fyp * self.fyc_rate / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("AG".parse::<Position>().unwrap(), Position::AG);
        assert_eq!(" SVP ".parse::<Position>().unwrap(), Position::SVP);
        assert!(matches!(
            "manager".parse::<Position>(),
            Err(EngineError::UnknownPosition(_))
        ));
    }

    #[test]
    fn test_executive_positions() {
        assert!(!Position::AG.is_executive());
        assert!(!Position::AL.is_executive());
        assert!(Position::AVP.is_executive());
        assert!(Position::VP.is_executive());
        assert!(Position::SVP.is_executive());
    }

    #[test]
    fn test_member_json_round_trip() {
        let json = r#"{
            "id": 1717000000001,
            "firstName": "Somchai",
            "lastName": "K.",
            "position": "AL",
            "persistencyRate": 87.5,
            "agentStartDate": "2023-04-01",
            "uplineId": 1717000000000
        }"#;
        let member: TeamMember = serde_json::from_str(json).unwrap();
        assert_eq!(member.position, Position::AL);
        assert_eq!(
            member.agent_start_date,
            Some(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())
        );
        assert_eq!(member.upline_id, Some(1717000000000));

        let back: TeamMember =
            serde_json::from_str(&serde_json::to_string(&member).unwrap()).unwrap();
        assert_eq!(back, member);
    }

    #[test]
    fn test_member_defaults() {
        let json = r#"{"id": 7, "firstName": "A", "lastName": "B", "position": "AG"}"#;
        let member: TeamMember = serde_json::from_str(json).unwrap();
        assert_eq!(member.persistency_rate, 100.0);
        assert_eq!(member.agent_start_date, None);
        assert_eq!(member.upline_id, None);
    }

    #[test]
    fn test_empty_start_date_is_none() {
        let json = r#"{"id": 7, "firstName": "A", "lastName": "B", "position": "AG", "agentStartDate": ""}"#;
        let member: TeamMember = serde_json::from_str(json).unwrap();
        assert_eq!(member.agent_start_date, None);
    }

    #[test]
    fn test_record_agent_variants() {
        let matched = r#"{
            "id": 1, "policyDate": "2024-02-10", "agentId": 42,
            "clientName": "C", "policyType": "WL",
            "fyp": 50000.0, "afypRate": 100.0, "fycRate": 30.0
        }"#;
        let record: ProductionRecord = serde_json::from_str(matched).unwrap();
        assert_eq!(record.agent, AgentRef::Known(42));
        assert_eq!(record.agent.id(), Some(42));

        let unmatched = r#"{
            "id": 2, "policyDate": "2024-02-10", "agentId": null,
            "unmatchedAgentName": "Unknown Agent",
            "clientName": "C", "policyType": "WL", "fyp": 1000.0
        }"#;
        let record: ProductionRecord = serde_json::from_str(unmatched).unwrap();
        assert_eq!(
            record.agent,
            AgentRef::Unmatched(Some("Unknown Agent".to_string()))
        );
        assert_eq!(record.agent.id(), None);
        // defaults: afypRate 100, fycRate 0
        assert_eq!(record.afyp_rate, 100.0);
        assert_eq!(record.fyc_rate, 0.0);
    }

    #[test]
    fn test_derived_amounts() {
        let record = ProductionRecord {
            id: 1,
            policy_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            agent: AgentRef::Known(1),
            client_name: "C".to_string(),
            policy_type: "WL".to_string(),
            fyp: 80_000.0,
            afyp_rate: 50.0,
            fyc_rate: 25.0,
        };
        assert!((record.afyp() - 40_000.0).abs() < 1e-9);
        assert!((record.commission() - 20_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_serializes_to_wire_shape() {
        let record = ProductionRecord {
            id: 9,
            policy_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            agent: AgentRef::Unmatched(Some("Ghost".to_string())),
            client_name: "C".to_string(),
            policy_type: "TERM".to_string(),
            fyp: 100.0,
            afyp_rate: 100.0,
            fyc_rate: 10.0,
        };
        let value: serde_json::Value =
            serde_json::to_value(&record).unwrap();
        assert_eq!(value["agentId"], serde_json::Value::Null);
        assert_eq!(value["unmatchedAgentName"], "Ghost");
        assert_eq!(value["policyDate"], "2024-01-15");
    }
}
