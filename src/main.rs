use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starling::cli;
use starling::clock::TickClock;
use starling::events::TracingEvents;
use starling::member::MemberId;
use starling::node::{JoinState, Node};
use starling::transport::LoopbackNetwork;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starling=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse args and env vars
    let args = cli::Cli::parse();
    let settings = args.protocol_settings();
    settings.validate()?;

    let network = Arc::new(LoopbackNetwork::with_loss(args.loss, args.seed));
    let clock = Arc::new(TickClock::new());
    let events = Arc::new(TracingEvents);

    // Node 1 is the bootstrap; the rest introduce themselves through it.
    let mut nodes: Vec<Node> = (1..=args.nodes)
        .map(|id| {
            let addr = MemberId::new(id, 0);
            network.register(addr);
            Node::new(
                addr,
                settings.clone(),
                network.clone(),
                clock.clone(),
                events.clone(),
                args.seed.wrapping_add(u64::from(id)),
            )
        })
        .collect();

    info!(
        nodes = args.nodes,
        ticks = args.ticks,
        loss = args.loss,
        "starting membership simulation"
    );
    for node in &mut nodes {
        node.start();
    }

    let mut pacing = (args.interval_ms > 0)
        .then(|| tokio::time::interval(Duration::from_millis(args.interval_ms)));

    for tick in 0..args.ticks {
        if let Some(timer) = pacing.as_mut() {
            timer.tick().await;
        }
        clock.advance();

        let crash_last = args.crash_after.is_some_and(|at| tick >= at);
        let live = if crash_last {
            nodes.len() - 1
        } else {
            nodes.len()
        };
        for node in nodes.iter_mut().take(live) {
            node.tick();
        }
    }

    for node in &nodes {
        let stats = node.stats();
        info!(
            node = %node.addr(),
            state = ?node.state(),
            heartbeat = node.heartbeat(),
            members = node.table().len(),
            sent = stats.messages_sent,
            received = stats.messages_received,
            malformed = stats.malformed_dropped,
            "final node state"
        );
    }
    let network_stats = network.stats();
    info!(
        delivered = network_stats.delivered,
        dropped = network_stats.dropped,
        "network summary"
    );

    let joined = nodes
        .iter()
        .filter(|n| n.state() == JoinState::Joined)
        .count();
    info!(joined, total = nodes.len(), "simulation complete");

    Ok(())
}
