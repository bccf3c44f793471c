//! Protocol Driver
//!
//! One [`Node`] owns the full per-member protocol state: join state
//! machine, heartbeat counter, membership table, and a seeded RNG for
//! gossip target selection. The outer scheduler calls [`Node::tick`] once
//! per tick; everything inside a tick runs to completion synchronously.
//!
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::events::MembershipEvents;
use crate::gossip::Disseminator;
use crate::member::{MemberId, MemberRecord};
use crate::membership::{MembershipTable, MergeOutcome};
use crate::message::{Message, MessageBuilder, MessageKind};
use crate::settings::ProtocolSettings;
use crate::transport::Transport;

/// Join lifecycle. `Joined` is terminal for the node's lifetime; leaving
/// the group is modeled as process death, not a state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinState {
    NotJoined,
    Joining,
    Joined,
}

/// Message counters, for logs and tests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NodeStats {
    pub messages_received: u64,
    pub messages_sent: u64,
    pub malformed_dropped: u64,
}

pub struct Node {
    addr: MemberId,
    settings: ProtocolSettings,
    state: JoinState,
    heartbeat: u64,
    table: MembershipTable,
    gossip: Disseminator,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn MembershipEvents>,
    rng: StdRng,
    ticks_joining: u64,
    stats: NodeStats,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("addr", &self.addr)
            .field("state", &self.state)
            .field("heartbeat", &self.heartbeat)
            .field("members", &self.table.len())
            .finish()
    }
}

impl Node {
    /// Settings must already be validated; see
    /// [`ProtocolSettings::validate`].
    pub fn new(
        addr: MemberId,
        settings: ProtocolSettings,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn MembershipEvents>,
        rng_seed: u64,
    ) -> Self {
        let gossip = Disseminator {
            fanout: settings.fanout,
            t_fail: settings.t_fail,
        };
        Self {
            addr,
            table: MembershipTable::new(addr),
            gossip,
            settings,
            state: JoinState::NotJoined,
            heartbeat: 0,
            transport,
            clock,
            events,
            rng: StdRng::seed_from_u64(rng_seed),
            ticks_joining: 0,
            stats: NodeStats::default(),
        }
    }

    pub fn addr(&self) -> MemberId {
        self.addr
    }

    pub fn state(&self) -> JoinState {
        self.state
    }

    pub fn heartbeat(&self) -> u64 {
        self.heartbeat
    }

    pub fn table(&self) -> &MembershipTable {
        &self.table
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    fn own_record(&self) -> MemberRecord {
        MemberRecord::new(self.addr, self.heartbeat)
    }

    /// Introduce this node to the group. The configured bootstrap node
    /// starts the group on the spot; everyone else asks it to be let in.
    pub fn start(&mut self) {
        if self.addr == self.settings.bootstrap {
            info!(node = %self.addr, "starting up group as bootstrap");
            self.state = JoinState::Joined;
        } else {
            debug!(node = %self.addr, introducer = %self.settings.bootstrap, "trying to join");
            self.state = JoinState::Joining;
            self.send_join_request();
        }
    }

    /// One protocol tick: drain the inbox, then (once joined) gossip and
    /// sweep for failures.
    pub fn tick(&mut self) {
        self.drain_inbox();

        if self.state != JoinState::Joined {
            self.retry_join_if_due();
            return;
        }

        self.heartbeat += 1;
        self.disseminate();
        self.sweep_failures();
    }

    fn drain_inbox(&mut self) {
        for payload in self.transport.drain(self.addr) {
            match Message::decode(&payload) {
                Ok(message) => {
                    self.stats.messages_received += 1;
                    self.handle_message(message);
                }
                Err(err) => {
                    self.stats.malformed_dropped += 1;
                    debug!(node = %self.addr, error = %err, "dropping undecodable message");
                }
            }
        }
    }

    fn handle_message(&mut self, message: Message) {
        let now = self.clock.now();
        for record in &message.records {
            if self.table.merge(*record, now) == MergeOutcome::Inserted {
                self.events.member_joined(self.addr, record.member);
            }
        }

        match message.kind {
            MessageKind::JoinRequest => {
                // Reply with our full current view so the joiner bootstraps
                // its table in one round trip.
                if let Some(sender) = message.sender() {
                    if sender != self.addr {
                        self.send_view(MessageKind::JoinReply, sender);
                    }
                } else {
                    debug!(node = %self.addr, "join request without sender record");
                }
            }
            MessageKind::JoinReply => {
                if self.state == JoinState::Joining {
                    info!(node = %self.addr, members = self.table.len(), "joined group");
                    self.state = JoinState::Joined;
                }
            }
            MessageKind::Heartbeat => {}
        }
    }

    fn send_join_request(&mut self) {
        let message = MessageBuilder::new(MessageKind::JoinRequest, self.own_record()).build();
        self.send_message(self.settings.bootstrap, &message);
    }

    fn retry_join_if_due(&mut self) {
        if self.state != JoinState::Joining {
            return;
        }
        self.ticks_joining += 1;
        let interval = self.settings.join_retry_interval;
        if interval > 0 && self.ticks_joining % interval == 0 {
            debug!(node = %self.addr, attempts = self.ticks_joining / interval, "retrying join");
            self.send_join_request();
        }
    }

    /// Build and send a message carrying our freshness-filtered view.
    fn send_view(&mut self, kind: MessageKind, to: MemberId) {
        let own = self.own_record();
        let now = self.clock.now();
        let mut builder = MessageBuilder::new(kind, own);
        builder.extend(self.table.gossip_records(own, self.settings.t_fail, now));
        let message = builder.build();
        self.send_message(to, &message);
    }

    fn send_message(&mut self, to: MemberId, message: &Message) {
        match message.encode() {
            Ok(payload) => {
                self.transport.send(self.addr, to, payload);
                self.stats.messages_sent += 1;
            }
            Err(err) => {
                debug!(node = %self.addr, error = %err, "failed to encode outbound message");
            }
        }
    }

    fn disseminate(&mut self) {
        let now = self.clock.now();
        let round = self
            .gossip
            .round(&self.table, self.own_record(), now, &mut self.rng);
        for (target, message) in round {
            self.send_message(target, &message);
        }
    }

    fn sweep_failures(&mut self) {
        let now = self.clock.now();
        for member in self.table.sweep(now, self.settings.t_remove) {
            self.events.member_removed(self.addr, member);
        }
    }
}
