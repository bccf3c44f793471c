//! Membership event observers.
//!
//! The protocol reports two events: a member newly observed and a member
//! evicted on timeout. Observers are side channels only; whatever they do
//! (or fail to do) never feeds back into protocol state.
//!
use parking_lot::Mutex;
use tracing::info;

use crate::member::MemberId;

pub trait MembershipEvents: Send + Sync {
    /// `observer` created a table entry for `member`.
    fn member_joined(&self, observer: MemberId, member: MemberId);

    /// `observer` evicted `member` after its heartbeat went silent.
    fn member_removed(&self, observer: MemberId, member: MemberId);
}

/// Logs membership events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingEvents;

impl MembershipEvents for TracingEvents {
    fn member_joined(&self, observer: MemberId, member: MemberId) {
        info!(observer = %observer, member = %member, "node added to membership list");
    }

    fn member_removed(&self, observer: MemberId, member: MemberId) {
        info!(observer = %observer, member = %member, "node removed from membership list");
    }
}

/// Discards all events. Useful where logging is irrelevant to a test.
#[derive(Debug, Default)]
pub struct NullEvents;

impl MembershipEvents for NullEvents {
    fn member_joined(&self, _observer: MemberId, _member: MemberId) {}
    fn member_removed(&self, _observer: MemberId, _member: MemberId) {}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MembershipEvent {
    Joined {
        observer: MemberId,
        member: MemberId,
    },
    Removed {
        observer: MemberId,
        member: MemberId,
    },
}

/// Records events in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<MembershipEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<MembershipEvent> {
        self.events.lock().clone()
    }
}

impl MembershipEvents for RecordingEvents {
    fn member_joined(&self, observer: MemberId, member: MemberId) {
        self.events
            .lock()
            .push(MembershipEvent::Joined { observer, member });
    }

    fn member_removed(&self, observer: MemberId, member: MemberId) {
        self.events
            .lock()
            .push(MembershipEvent::Removed { observer, member });
    }
}
