//! Transport Layer
//!
//! The protocol only needs best-effort, fire-and-forget datagrams between
//! named endpoints plus a non-blocking per-node inbound queue. That contract
//! is the [`Transport`] trait; [`LoopbackNetwork`] implements it in-process
//! for simulations and tests, with an optional seeded drop probability so
//! lossy-network behavior is reproducible.
//!
use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::member::MemberId;

/// Best-effort datagram transport between group members.
pub trait Transport: Send + Sync {
    /// Queue `payload` for delivery to `to`. No delivery guarantee, no
    /// acknowledgment; loss and reordering are the receiver's problem.
    fn send(&self, from: MemberId, to: MemberId, payload: Vec<u8>);

    /// Take everything currently queued for `addr`. Never blocks: an empty
    /// inbox returns an empty batch.
    fn drain(&self, addr: MemberId) -> Vec<Vec<u8>>;
}

/// Delivery counters for the loopback network.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NetworkStats {
    pub delivered: u64,
    pub dropped: u64,
}

struct LoopbackInner {
    inboxes: HashMap<MemberId, VecDeque<Vec<u8>>>,
    rng: StdRng,
    loss: f64,
    stats: NetworkStats,
}

/// In-memory message hub connecting simulated nodes.
///
/// Each registered address owns one inbound queue: any node may enqueue
/// into it via [`Transport::send`], while the owning node is the sole
/// consumer through [`Transport::drain`].
pub struct LoopbackNetwork {
    inner: Mutex<LoopbackInner>,
}

impl LoopbackNetwork {
    /// Lossless network.
    pub fn new() -> Self {
        Self::with_loss(0.0, 0)
    }

    /// Network dropping each message independently with probability `loss`.
    pub fn with_loss(loss: f64, seed: u64) -> Self {
        Self {
            inner: Mutex::new(LoopbackInner {
                inboxes: HashMap::new(),
                rng: StdRng::seed_from_u64(seed),
                loss,
                stats: NetworkStats::default(),
            }),
        }
    }

    /// Create an inbound queue for `addr`. Sends to unregistered addresses
    /// are silently discarded, like datagrams to a dead host.
    pub fn register(&self, addr: MemberId) {
        self.inner.lock().inboxes.entry(addr).or_default();
    }

    pub fn stats(&self) -> NetworkStats {
        self.inner.lock().stats
    }
}

impl Default for LoopbackNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackNetwork {
    fn send(&self, from: MemberId, to: MemberId, payload: Vec<u8>) {
        let mut inner = self.inner.lock();
        if inner.loss > 0.0 && inner.rng.gen::<f64>() < inner.loss {
            inner.stats.dropped += 1;
            trace!(from = %from, to = %to, "dropped message");
            return;
        }
        match inner.inboxes.get_mut(&to) {
            Some(inbox) => {
                inbox.push_back(payload);
                inner.stats.delivered += 1;
            }
            None => {
                trace!(from = %from, to = %to, "message to unknown destination");
            }
        }
    }

    fn drain(&self, addr: MemberId) -> Vec<Vec<u8>> {
        let mut inner = self.inner.lock();
        match inner.inboxes.get_mut(&addr) {
            Some(inbox) => inbox.drain(..).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: MemberId = MemberId { id: 1, port: 0 };
    const B: MemberId = MemberId { id: 2, port: 0 };

    #[test]
    fn test_send_and_drain_preserves_order() {
        let network = LoopbackNetwork::new();
        network.register(A);
        network.register(B);

        network.send(A, B, vec![1]);
        network.send(A, B, vec![2]);
        assert_eq!(network.drain(B), vec![vec![1], vec![2]]);

        // Drain empties the queue.
        assert!(network.drain(B).is_empty());
        assert_eq!(network.stats().delivered, 2);
    }

    #[test]
    fn test_send_to_unregistered_address_is_discarded() {
        let network = LoopbackNetwork::new();
        network.register(A);

        network.send(A, B, vec![1]);
        assert_eq!(network.stats().delivered, 0);
        assert!(network.drain(B).is_empty());
    }

    #[test]
    fn test_full_loss_drops_everything() {
        let network = LoopbackNetwork::with_loss(1.0, 9);
        network.register(A);
        network.register(B);

        for _ in 0..10 {
            network.send(A, B, vec![0]);
        }
        assert!(network.drain(B).is_empty());
        assert_eq!(network.stats().dropped, 10);
    }

    #[test]
    fn test_partial_loss_is_seeded_and_reproducible() {
        let run = || {
            let network = LoopbackNetwork::with_loss(0.5, 1234);
            network.register(A);
            network.register(B);
            for i in 0..100u8 {
                network.send(A, B, vec![i]);
            }
            network.drain(B)
        };

        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert!(!first.is_empty() && first.len() < 100);
    }
}
