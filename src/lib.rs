//! Starling: gossip-based group membership.
//!
//! Each participating process keeps a local view of which other processes
//! are alive, spreads that view through periodic randomized gossip, and
//! evicts members whose heartbeat counters stop advancing. Joining is a
//! single round trip through a well-known bootstrap node.
//!
//! The protocol core is synchronous and tick-driven; network, time, and
//! event logging are collaborators behind the [`transport::Transport`],
//! [`clock::Clock`], and [`events::MembershipEvents`] traits.

pub mod cli;
pub mod clock;
pub mod error;
pub mod events;
pub mod gossip;
pub mod member;
pub mod membership;
pub mod message;
pub mod node;
pub mod settings;
pub mod transport;

pub use error::{Result, StarlingError};
pub use member::{MemberId, MemberRecord};
pub use membership::{MembershipTable, MergeOutcome};
pub use message::{Message, MessageBuilder, MessageKind};
pub use node::{JoinState, Node, NodeStats};
pub use settings::ProtocolSettings;
