//! JSON and CSV loaders for roster and production data
//!
//! The browser collaborator keeps two JSON arrays in a key-value store and
//! exchanges CSV files for bulk edits. These loaders accept both shapes:
//! the combined JSON backup (`{ "team": [...], "production": [...] }`), the
//! roster CSV, and the production-log CSV.

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;

use crate::team::{AgentRef, MemberId, Position, ProductionRecord, TeamMember, TeamSnapshot};

/// Load a combined roster + production snapshot from a JSON backup file
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<TeamSnapshot, Box<dyn Error>> {
    let file = File::open(path.as_ref())?;
    let snapshot: TeamSnapshot = serde_json::from_reader(BufReader::new(file))?;
    log::info!(
        "loaded snapshot: {} members, {} production records",
        snapshot.members().len(),
        snapshot.production().len()
    );
    Ok(snapshot)
}

/// Load the roster from a CSV file
pub fn load_team_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TeamMember>, Box<dyn Error>> {
    let file = File::open(path.as_ref())?;
    load_team_csv_from_reader(file)
}

/// Load the roster from any CSV reader.
///
/// Expected headers: `ID, FirstName, LastName, Position, PersistencyRate,
/// AgentStartDate, UplineID`. The export-only `UplineName` column is ignored.
/// Rows without a numeric id are skipped, matching the collaborator's import.
pub fn load_team_csv_from_reader<R: Read>(reader: R) -> Result<Vec<TeamMember>, Box<dyn Error>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let required = ["ID", "FirstName", "LastName", "Position", "UplineID", "AgentStartDate"];
    for name in required {
        if column(name).is_none() {
            return Err(format!("roster CSV is missing required column: {name}").into());
        }
    }

    let mut members = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let field =
            |name: &str| column(name).and_then(|i| record.get(i)).unwrap_or("").trim();

        let id: MemberId = match field("ID").parse() {
            Ok(id) => id,
            Err(_) => continue,
        };

        let position = match field("Position") {
            "" => Position::AG,
            code => code.parse::<Position>()?,
        };

        let persistency_rate = field("PersistencyRate").parse().unwrap_or(100.0);
        let agent_start_date = field("AgentStartDate").parse::<NaiveDate>().ok();
        let upline_id = field("UplineID").parse::<MemberId>().ok();

        members.push(TeamMember {
            id,
            first_name: field("FirstName").to_string(),
            last_name: field("LastName").to_string(),
            position,
            persistency_rate,
            agent_start_date,
            upline_id,
        });
    }

    log::debug!("parsed {} roster rows", members.len());
    Ok(members)
}

/// Load the production log from a CSV file, resolving agent names against the
/// given roster
pub fn load_production_csv<P: AsRef<Path>>(
    path: P,
    roster: &[TeamMember],
) -> Result<Vec<ProductionRecord>, Box<dyn Error>> {
    let file = File::open(path.as_ref())?;
    load_production_csv_from_reader(file, roster)
}

/// Load the production log from any CSV reader.
///
/// Columns are positional: `PolicyDate, AgentName, ClientName, PolicyType,
/// FYP, AFYPRate, FYCRate` (the export's trailing derived columns are
/// ignored). Agent names match the roster's full names case-insensitively;
/// anything else becomes an `Unmatched` record. Record ids are assigned
/// sequentially.
pub fn load_production_csv_from_reader<R: Read>(
    reader: R,
    roster: &[TeamMember],
) -> Result<Vec<ProductionRecord>, Box<dyn Error>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let name_map: HashMap<String, MemberId> = roster
        .iter()
        .map(|m| {
            let key = format!("{} {}", m.first_name.trim(), m.last_name.trim()).to_lowercase();
            (key, m.id)
        })
        .collect();

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let date_field = field(0);
        if date_field.is_empty() {
            continue;
        }
        let policy_date: NaiveDate = date_field.parse()?;

        let agent_name = field(1);
        let agent = match name_map.get(&agent_name.to_lowercase()) {
            Some(&id) => AgentRef::Known(id),
            None => AgentRef::Unmatched(Some(agent_name.to_string())),
        };

        records.push(ProductionRecord {
            id: records.len() as u64 + 1,
            policy_date,
            agent,
            client_name: field(2).to_string(),
            policy_type: field(3).to_string(),
            fyp: field(4).parse().unwrap_or(0.0),
            afyp_rate: field(5).parse().unwrap_or(100.0),
            fyc_rate: field(6).parse().unwrap_or(0.0),
        });
    }

    log::debug!("parsed {} production rows", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEAM_CSV: &str = "\
ID,FirstName,LastName,Position,PersistencyRate,AgentStartDate,UplineID,UplineName
1,Anan,Srisuk,AVP,92.5,2015-06-01,,
2,Busaba,Chai,AL,88,2019-02-15,1,Anan Srisuk
3,Chanon,Dee,AG,,2024-01-10,2,Busaba Chai
not-a-number,Junk,Row,AG,,,,
";

    #[test]
    fn test_team_csv_parsing() {
        let members = load_team_csv_from_reader(Cursor::new(TEAM_CSV)).unwrap();
        assert_eq!(members.len(), 3);

        assert_eq!(members[0].position, Position::AVP);
        assert_eq!(members[0].upline_id, None);
        assert_eq!(members[1].upline_id, Some(1));
        // missing persistency defaults to 100
        assert_eq!(members[2].persistency_rate, 100.0);
        assert_eq!(
            members[2].agent_start_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        );
    }

    #[test]
    fn test_team_csv_missing_column_fails() {
        let csv = "ID,FirstName,LastName\n1,A,B\n";
        let result = load_team_csv_from_reader(Cursor::new(csv));
        assert!(result.is_err());
    }

    #[test]
    fn test_team_csv_unknown_position_fails() {
        let csv = "\
ID,FirstName,LastName,Position,PersistencyRate,AgentStartDate,UplineID
1,A,B,CEO,100,2024-01-01,
";
        assert!(load_team_csv_from_reader(Cursor::new(csv)).is_err());
    }

    #[test]
    fn test_production_csv_parsing() {
        let roster = load_team_csv_from_reader(Cursor::new(TEAM_CSV)).unwrap();
        let csv = "\
PolicyDate,AgentName,ClientName,PolicyType,FYP,AFYPRate,FYCRate
2024-03-05,Chanon Dee,Client One,WL20,50000,100,30
2024-03-06,chanon dee,Client Two,TERM,10000,,
2024-03-07,Nobody Known,Client Three,WL20,7000,90,25
";
        let records = load_production_csv_from_reader(Cursor::new(csv), &roster).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].agent, AgentRef::Known(3));
        // name matching is case-insensitive
        assert_eq!(records[1].agent, AgentRef::Known(3));
        // defaults: AFYPRate 100, FYCRate 0
        assert_eq!(records[1].afyp_rate, 100.0);
        assert_eq!(records[1].fyc_rate, 0.0);
        assert_eq!(
            records[2].agent,
            AgentRef::Unmatched(Some("Nobody Known".to_string()))
        );
        // sequential ids
        assert_eq!(records[2].id, 3);
    }

    #[test]
    fn test_snapshot_json_parsing() {
        let json = r#"{
            "team": [
                {"id": 1, "firstName": "A", "lastName": "B", "position": "AG",
                 "persistencyRate": 90, "agentStartDate": "2024-01-01", "uplineId": null}
            ],
            "production": [
                {"id": 1, "policyDate": "2024-02-01", "agentId": 1,
                 "clientName": "C", "policyType": "WL", "fyp": 1000.0,
                 "afypRate": 100.0, "fycRate": 20.0}
            ]
        }"#;
        let snapshot: TeamSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.members().len(), 1);
        assert_eq!(snapshot.production().len(), 1);
        assert_eq!(snapshot.production()[0].agent, AgentRef::Known(1));
    }
}
