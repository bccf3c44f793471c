//! Membership Table
//!
//! The authoritative local view of the group: one entry per known live
//! member, keyed by [`MemberId`], holding the highest heartbeat seen for
//! that member and the local time at which it last advanced.
//!
use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::member::{MemberId, MemberRecord};

/// What a merge did to the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeOutcome {
    /// New member observed; an entry was created.
    Inserted,
    /// Known member with a fresher heartbeat; entry advanced.
    Updated,
    /// Lower-or-equal heartbeat, or the local node's own record. No-op.
    Stale,
}

/// Table value: highest heartbeat seen and when it last advanced.
///
/// `last_update` moves only when the heartbeat does, so a member that stops
/// incrementing goes stale even if its old records keep arriving.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemberEntry {
    pub heartbeat: u64,
    pub last_update: u64,
}

/// The local membership view of one node.
#[derive(Debug)]
pub struct MembershipTable {
    local: MemberId,
    entries: HashMap<MemberId, MemberEntry>,
}

impl MembershipTable {
    /// Create an empty table owned by `local`.
    pub fn new(local: MemberId) -> Self {
        Self {
            local,
            entries: HashMap::new(),
        }
    }

    /// Merge one incoming record at local time `now`.
    ///
    /// Inserts unknown members, advances known ones whose incoming heartbeat
    /// is strictly greater, and ignores everything else. Records naming the
    /// local node are always a no-op: liveness of self is decided locally,
    /// never from gossip echoes.
    pub fn merge(&mut self, record: MemberRecord, now: u64) -> MergeOutcome {
        if record.member == self.local {
            return MergeOutcome::Stale;
        }
        match self.entries.get_mut(&record.member) {
            None => {
                self.entries.insert(
                    record.member,
                    MemberEntry {
                        heartbeat: record.heartbeat,
                        last_update: now,
                    },
                );
                MergeOutcome::Inserted
            }
            Some(entry) if record.heartbeat > entry.heartbeat => {
                entry.heartbeat = record.heartbeat;
                entry.last_update = now;
                MergeOutcome::Updated
            }
            Some(_) => MergeOutcome::Stale,
        }
    }

    /// Remove and return every member whose heartbeat has not advanced for
    /// strictly more than `t_remove` ticks.
    pub fn sweep(&mut self, now: u64, t_remove: u64) -> Vec<MemberId> {
        let removed: Vec<MemberId> = self
            .entries
            .iter()
            .filter(|(member, entry)| {
                **member != self.local && now.saturating_sub(entry.last_update) > t_remove
            })
            .map(|(member, _)| *member)
            .collect();
        for member in &removed {
            self.entries.remove(member);
        }
        removed
    }

    /// Pick up to `k` members uniformly at random, without replacement,
    /// excluding the local node. Pure given the RNG, so target selection is
    /// reproducible under a seeded generator.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<MemberId> {
        let pool: Vec<MemberId> = self
            .entries
            .keys()
            .filter(|member| **member != self.local)
            .copied()
            .collect();
        pool.choose_multiple(rng, k).copied().collect()
    }

    /// One record per table entry, for piggybacking on gossip.
    ///
    /// Entries whose staleness exceeds `t_fail` are emitted as the caller's
    /// own record instead of their stored values, so likely-dead information
    /// stops propagating while the message shape stays the same.
    pub fn gossip_records(
        &self,
        own_record: MemberRecord,
        t_fail: u64,
        now: u64,
    ) -> Vec<MemberRecord> {
        self.entries
            .iter()
            .map(|(member, entry)| {
                if now.saturating_sub(entry.last_update) <= t_fail {
                    MemberRecord::new(*member, entry.heartbeat)
                } else {
                    own_record
                }
            })
            .collect()
    }

    pub fn contains(&self, member: MemberId) -> bool {
        self.entries.contains_key(&member)
    }

    pub fn get(&self, member: MemberId) -> Option<MemberEntry> {
        self.entries.get(&member).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All known members, in no particular order.
    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const LOCAL: MemberId = MemberId { id: 1, port: 0 };

    fn record(id: u32, heartbeat: u64) -> MemberRecord {
        MemberRecord::new(MemberId::new(id, 0), heartbeat)
    }

    #[test]
    fn test_merge_inserts_unknown_member() {
        let mut table = MembershipTable::new(LOCAL);
        assert_eq!(table.merge(record(2, 5), 10), MergeOutcome::Inserted);
        let entry = table.get(MemberId::new(2, 0)).unwrap();
        assert_eq!(entry.heartbeat, 5);
        assert_eq!(entry.last_update, 10);
    }

    #[test]
    fn test_merge_heartbeat_never_decreases() {
        let mut table = MembershipTable::new(LOCAL);
        table.merge(record(2, 5), 10);

        // Stale and equal heartbeats leave both fields untouched.
        assert_eq!(table.merge(record(2, 3), 11), MergeOutcome::Stale);
        assert_eq!(table.merge(record(2, 5), 12), MergeOutcome::Stale);
        let entry = table.get(MemberId::new(2, 0)).unwrap();
        assert_eq!(entry.heartbeat, 5);
        assert_eq!(entry.last_update, 10);

        // A strictly greater heartbeat advances both.
        assert_eq!(table.merge(record(2, 9), 13), MergeOutcome::Updated);
        let entry = table.get(MemberId::new(2, 0)).unwrap();
        assert_eq!(entry.heartbeat, 9);
        assert_eq!(entry.last_update, 13);
    }

    #[test]
    fn test_merge_stored_heartbeat_is_max_of_merged() {
        let mut table = MembershipTable::new(LOCAL);
        for hb in [3u64, 9, 1, 9, 4, 12, 7] {
            table.merge(record(2, hb), hb);
        }
        assert_eq!(table.get(MemberId::new(2, 0)).unwrap().heartbeat, 12);
    }

    #[test]
    fn test_merge_own_record_is_noop() {
        let mut table = MembershipTable::new(LOCAL);
        assert_eq!(
            table.merge(MemberRecord::new(LOCAL, 1000), 5),
            MergeOutcome::Stale
        );
        assert!(!table.contains(LOCAL));
        assert!(table.is_empty());
    }

    #[test]
    fn test_sweep_boundary_semantics() {
        let t_remove = 20;
        let mut table = MembershipTable::new(LOCAL);
        table.merge(record(2, 1), 100);

        // Present right up to and including the window edge.
        assert!(table.sweep(100 + t_remove - 1, t_remove).is_empty());
        assert!(table.sweep(100 + t_remove, t_remove).is_empty());
        assert!(table.contains(MemberId::new(2, 0)));

        // Gone once strictly past it.
        let removed = table.sweep(100 + t_remove + 1, t_remove);
        assert_eq!(removed, vec![MemberId::new(2, 0)]);
        assert!(!table.contains(MemberId::new(2, 0)));
    }

    #[test]
    fn test_sweep_removal_is_permanent_but_reinsert_allowed() {
        let mut table = MembershipTable::new(LOCAL);
        table.merge(record(2, 1), 0);
        table.sweep(100, 20);
        assert!(!table.contains(MemberId::new(2, 0)));

        // The identity may reappear as a fresh entry.
        assert_eq!(table.merge(record(2, 50), 101), MergeOutcome::Inserted);
        assert_eq!(table.get(MemberId::new(2, 0)).unwrap().last_update, 101);
    }

    #[test]
    fn test_sweep_only_removes_expired() {
        let mut table = MembershipTable::new(LOCAL);
        table.merge(record(2, 1), 0);
        table.merge(record(3, 1), 90);
        let removed = table.sweep(100, 20);
        assert_eq!(removed, vec![MemberId::new(2, 0)]);
        assert!(table.contains(MemberId::new(3, 0)));
    }

    #[test]
    fn test_sample_bounds_and_exclusions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut table = MembershipTable::new(LOCAL);
        for id in 2..=6 {
            table.merge(record(id, 1), 0);
        }

        let picked = table.sample(3, &mut rng);
        assert_eq!(picked.len(), 3);
        assert!(!picked.contains(&LOCAL));
        let unique: std::collections::HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 3, "sampling is without replacement");

        // Fewer members than requested returns all of them.
        let everyone = table.sample(100, &mut rng);
        assert_eq!(everyone.len(), 5);
    }

    #[test]
    fn test_sample_empty_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let table = MembershipTable::new(LOCAL);
        assert!(table.sample(3, &mut rng).is_empty());
    }

    #[test]
    fn test_gossip_records_substitutes_stale_entries() {
        let t_fail = 5;
        let own = MemberRecord::new(LOCAL, 77);
        let mut table = MembershipTable::new(LOCAL);
        table.merge(record(2, 10), 100); // fresh at now=104
        table.merge(record(3, 10), 90); // stale at now=104

        let records = table.gossip_records(own, t_fail, 104);
        assert_eq!(records.len(), 2);
        assert!(records.contains(&record(2, 10)));
        assert!(records.contains(&own));
        assert!(!records.iter().any(|r| r.member == MemberId::new(3, 0)));
    }

    #[test]
    fn test_gossip_records_freshness_boundary() {
        let t_fail = 5;
        let own = MemberRecord::new(LOCAL, 1);
        let mut table = MembershipTable::new(LOCAL);
        table.merge(record(2, 10), 100);

        // Staleness exactly t_fail is still raw; one past is substituted.
        assert_eq!(table.gossip_records(own, t_fail, 105), vec![record(2, 10)]);
        assert_eq!(table.gossip_records(own, t_fail, 106), vec![own]);
    }
}
