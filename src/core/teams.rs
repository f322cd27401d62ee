//! Splits a battle's roster into two sides from kill relationships alone.
//!
//! Kill events carry no team label. Starting from the first killer, labels are
//! propagated along killer/victim/group edges until a round adds nothing (or
//! the round budget runs out), then any remainder is assigned by the
//! half-roster fallback.

use super::battle::{Event, PlayerIndex};

#[derive(Debug, Default)]
struct Side {
    members: Vec<bool>,
    len: usize,
}

impl Side {
    fn new(player_count: usize) -> Self {
        Self {
            members: vec![false; player_count],
            len: 0,
        }
    }

    fn contains(&self, index: PlayerIndex) -> bool {
        self.members[index]
    }

    fn add(&mut self, index: PlayerIndex) -> bool {
        if self.members[index] {
            return false;
        }
        self.members[index] = true;
        self.len += 1;
        true
    }

    fn remove(&mut self, index: PlayerIndex) {
        if self.members[index] {
            self.members[index] = false;
            self.len -= 1;
        }
    }

    fn add_all(&mut self, indices: &[PlayerIndex]) -> bool {
        let mut changed = false;
        for index in indices {
            changed |= self.add(*index);
        }
        changed
    }

    /// Keeps exactly the players missing from `other`.
    fn complement_of(other: &Side) -> Self {
        let members: Vec<bool> = other.members.iter().map(|m| !m).collect();
        let len = members.iter().filter(|m| **m).count();
        Self { members, len }
    }

    fn indices(&self) -> Vec<PlayerIndex> {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(index, member)| member.then_some(index))
            .collect()
    }
}

/// Returns `(team_a, team_b)` as roster indices in roster order.
///
/// Both lists are disjoint and together cover `0..player_count`. The first
/// event's killer is always on team A.
pub fn split_teams(player_count: usize, events: &[Event]) -> (Vec<PlayerIndex>, Vec<PlayerIndex>) {
    let mut team_a = Side::new(player_count);
    let mut team_b = Side::new(player_count);

    let seed = events.first().map(|event| event.killer);
    if let Some(seed) = seed {
        team_a.add(seed);
    }

    for _ in 0..=player_count {
        let mut changed = false;

        for event in events {
            let killer = event.killer;
            let victim = event.victim;

            if team_a.contains(killer) {
                changed |= team_a.add_all(&event.group_members);
                if !team_a.contains(victim) {
                    changed |= team_b.add(victim);
                }
            } else if team_b.contains(killer) {
                changed |= team_b.add_all(&event.group_members);
                if !team_b.contains(victim) {
                    changed |= team_a.add(victim);
                }
            }

            if team_a.contains(victim) {
                if !team_a.contains(killer) {
                    changed |= team_b.add(killer);
                    changed |= team_b.add_all(&event.group_members);
                }
            } else if team_b.contains(victim) && !team_b.contains(killer) {
                changed |= team_a.add(killer);
                changed |= team_a.add_all(&event.group_members);
            }
        }

        if !changed {
            break;
        }
    }

    // the seed stays pinned to A even if a later kill also claimed it for B
    if let Some(seed) = seed {
        team_b.remove(seed);
    }

    let half = player_count / 2;
    if team_a.len >= half {
        // everyone not in A goes to B, and A keeps only what B did not claim
        team_b = Side::complement_of(&difference(&team_a, &team_b));
        team_a = Side::complement_of(&team_b);
    } else if team_b.len >= half {
        team_a = Side::complement_of(&difference(&team_b, &team_a));
        team_b = Side::complement_of(&team_a);
    } else {
        log::debug!(
            "Team split left {} of {} players unplaced; assigning the remainder to team B",
            player_count - team_a.len.max(team_b.len),
            player_count
        );
        team_b = Side::complement_of(&difference(&team_a, &team_b));
        team_a = Side::complement_of(&team_b);
    }

    (team_a.indices(), team_b.indices())
}

/// Members of `keep` that `other` has not claimed.
fn difference(keep: &Side, other: &Side) -> Side {
    let members: Vec<bool> = keep
        .members
        .iter()
        .zip(&other.members)
        .map(|(k, o)| *k && !*o)
        .collect();
    let len = members.iter().filter(|m| **m).count();
    Side { members, len }
}
