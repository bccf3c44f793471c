//! Gossip Dissemination
//!
//! Builds one gossip round: pick a bounded random subset of known members
//! and address each of them an identical heartbeat message carrying the
//! freshness-filtered membership view. Pure over its inputs so fanout and
//! message-shape properties are testable without a transport.
//!
use rand::Rng;

use crate::member::{MemberId, MemberRecord};
use crate::membership::MembershipTable;
use crate::message::{Message, MessageBuilder, MessageKind};

/// Per-round gossip planner.
#[derive(Clone, Copy, Debug)]
pub struct Disseminator {
    pub fanout: usize,
    pub t_fail: u64,
}

impl Disseminator {
    /// Plan one round: up to `fanout` targets, each paired with a heartbeat
    /// message whose records start with the sender's own record.
    ///
    /// Per-round message cost is bounded by `min(fanout, table size)`
    /// regardless of group size; epidemic redundancy covers any losses.
    pub fn round<R: Rng + ?Sized>(
        &self,
        table: &MembershipTable,
        own_record: MemberRecord,
        now: u64,
        rng: &mut R,
    ) -> Vec<(MemberId, Message)> {
        let targets = table.sample(self.fanout, rng);
        if targets.is_empty() {
            return Vec::new();
        }

        let mut builder = MessageBuilder::new(MessageKind::Heartbeat, own_record);
        builder.extend(table.gossip_records(own_record, self.t_fail, now));
        let message = builder.build();

        targets
            .into_iter()
            .map(|target| (target, message.clone()))
            .collect()
    }
}
