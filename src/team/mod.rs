//! Roster and production data structures and loading

mod data;
pub mod loader;
mod snapshot;

pub use data::{AgentRef, MemberId, Position, ProductionRecord, TeamMember};
pub use loader::{load_production_csv, load_snapshot, load_team_csv};
pub use snapshot::TeamSnapshot;
