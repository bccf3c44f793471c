//! CLI for the simulation binary
//!
use crate::settings::{self, ProtocolSettings};

#[derive(Clone, Debug, clap::Parser)]
pub struct Cli {
    #[clap(
        long,
        default_value = "8",
        env("STARLING_NODES"),
        help = "Number of simulated nodes; node 1 is the bootstrap"
    )]
    pub nodes: u32,

    #[clap(
        long,
        default_value = "120",
        env("STARLING_TICKS"),
        help = "Number of protocol ticks to run"
    )]
    pub ticks: u64,

    #[clap(
        long,
        default_value = "3",
        env("STARLING_FANOUT"),
        help = "Peers targeted per gossip round"
    )]
    pub fanout: usize,

    #[clap(
        long,
        default_value = "5",
        env("STARLING_T_FAIL"),
        help = "Ticks before an entry stops being relayed in gossip"
    )]
    pub t_fail: u64,

    #[clap(
        long,
        default_value = "20",
        env("STARLING_T_REMOVE"),
        help = "Ticks before an entry is evicted from the table"
    )]
    pub t_remove: u64,

    #[clap(
        long,
        default_value = "10",
        env("STARLING_JOIN_RETRY_INTERVAL"),
        help = "Ticks between join-request retries (0 disables retries)"
    )]
    pub join_retry_interval: u64,

    #[clap(
        long,
        default_value = "0.0",
        env("STARLING_LOSS"),
        help = "Probability that the network drops any given message"
    )]
    pub loss: f64,

    #[clap(
        long,
        default_value = "42",
        env("STARLING_SEED"),
        help = "Seed for gossip target selection and message loss"
    )]
    pub seed: u64,

    #[clap(
        long,
        env("STARLING_CRASH_AFTER"),
        help = "Tick at which the highest-numbered node crashes, if set"
    )]
    pub crash_after: Option<u64>,

    #[clap(
        long,
        default_value = "0",
        env("STARLING_INTERVAL_MS"),
        help = "Real-time pacing between ticks in milliseconds (0 runs flat out)"
    )]
    pub interval_ms: u64,
}

impl Cli {
    pub fn protocol_settings(&self) -> ProtocolSettings {
        ProtocolSettings {
            bootstrap: settings::DEFAULT_BOOTSTRAP,
            fanout: self.fanout,
            t_fail: self.t_fail,
            t_remove: self.t_remove,
            join_retry_interval: self.join_retry_interval,
        }
    }
}
