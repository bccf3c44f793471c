//! Member identity and wire records.
use std::fmt;

use bincode::{Decode, Encode};

/// Identity of a group member: a node id plus the port it listens on.
///
/// Immutable once assigned and used as the membership table key. The id is
/// carried as a structured value, never packed into a raw address buffer.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MemberId {
    pub id: u32,
    pub port: u16,
}

impl MemberId {
    pub fn new(id: u32, port: u16) -> Self {
        Self { id, port }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.port)
    }
}

/// One membership record as carried on the wire: who, and how alive.
///
/// The heartbeat counter is owned by the member it names and never decreases.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq)]
pub struct MemberRecord {
    pub member: MemberId,
    pub heartbeat: u64,
}

impl MemberRecord {
    pub fn new(member: MemberId, heartbeat: u64) -> Self {
        Self { member, heartbeat }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_display() {
        let member = MemberId::new(7, 8410);
        assert_eq!(member.to_string(), "7:8410");
    }

    #[test]
    fn test_member_id_equality_is_id_and_port() {
        assert_eq!(MemberId::new(1, 0), MemberId::new(1, 0));
        assert_ne!(MemberId::new(1, 0), MemberId::new(1, 1));
        assert_ne!(MemberId::new(1, 0), MemberId::new(2, 0));
    }
}
