//! Hierarchy walks over the upline parent-pointer forest
//!
//! All three walks are breadth-first child lookups ("members whose upline is
//! X") returning membership sets. Each carries a visited set: a roster whose
//! upline edges form a cycle fails with `CyclicHierarchy` instead of looping.

use std::collections::{HashSet, VecDeque};

use crate::error::EngineError;
use crate::team::{MemberId, Position, TeamMember, TeamSnapshot};

/// Direct sales unit of `root`: the root itself plus descendants reachable
/// through unbroken chains of AG members. Any non-AG descendant cuts off its
/// own branch. Used for unit overriding and the pooled manager bonus.
pub fn direct_unit_ids(
    snapshot: &TeamSnapshot,
    root: MemberId,
) -> Result<HashSet<MemberId>, EngineError> {
    let mut unit = HashSet::from([root]);
    let mut visited = HashSet::from([root]);
    let mut queue: VecDeque<&TeamMember> = VecDeque::new();

    enqueue_children(snapshot, root, &mut visited, &mut queue)?;

    while let Some(member) = queue.pop_front() {
        if member.position != Position::AG {
            continue;
        }
        unit.insert(member.id);
        enqueue_children(snapshot, member.id, &mut visited, &mut queue)?;
    }

    Ok(unit)
}

/// Direct line of an executive: the root plus all descendants, with each
/// branch stopping at the next executive down (that executive and their line
/// are excluded). Used for AE direct-line overriding.
pub fn direct_line_ids(
    snapshot: &TeamSnapshot,
    root: MemberId,
) -> Result<HashSet<MemberId>, EngineError> {
    walk(snapshot, root, |child| !child.position.is_executive())
}

/// Entire downstream line of `root` with no position filter. Used for the
/// executive yearly target bonus.
pub fn entire_line_ids(
    snapshot: &TeamSnapshot,
    root: MemberId,
) -> Result<HashSet<MemberId>, EngineError> {
    walk(snapshot, root, |_| true)
}

/// BFS over the child-lookup graph, descending only into children accepted by
/// `descend`. Every dequeued member lands in the result set.
fn walk(
    snapshot: &TeamSnapshot,
    root: MemberId,
    descend: impl Fn(&TeamMember) -> bool,
) -> Result<HashSet<MemberId>, EngineError> {
    let mut line = HashSet::new();
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        line.insert(id);
        for child in snapshot.children_of(id) {
            if !descend(child) {
                continue;
            }
            if !visited.insert(child.id) {
                return Err(EngineError::CyclicHierarchy(child.id));
            }
            queue.push_back(child.id);
        }
    }

    Ok(line)
}

fn enqueue_children<'a>(
    snapshot: &'a TeamSnapshot,
    id: MemberId,
    visited: &mut HashSet<MemberId>,
    queue: &mut VecDeque<&'a TeamMember>,
) -> Result<(), EngineError> {
    for child in snapshot.children_of(id) {
        if !visited.insert(child.id) {
            return Err(EngineError::CyclicHierarchy(child.id));
        }
        queue.push_back(child);
    }
    Ok(())
}
