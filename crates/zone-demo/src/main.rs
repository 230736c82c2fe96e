//! Scripted zone scenario runner
//!
//! Loads a JSON scenario, spawns its entities into a [`zone_sim::SimWorld`],
//! creates its zones and drives them with a heartbeat, logging every enter and
//! exit.
//!
//! Environment:
//! - `ZONE_SCENARIO` - scenario file (default: `scenario.json` next to this crate)
//! - `RUST_LOG` - log filter (default: `zone_demo=info`)

mod run;
mod scenario;

use std::path::PathBuf;

use tracing::info;
use zone_core::Transition;

use crate::scenario::Scenario;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zone_demo=info".parse()?),
        )
        .init();

    let path = std::env::var("ZONE_SCENARIO").map_or_else(
        |_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scenario.json")),
        PathBuf::from,
    );
    info!("Loading scenario {}", path.display());

    let scenario = Scenario::load(&path)?;
    let report = run::run(&scenario)?;

    for event in &report.events {
        info!(
            tick = event.tick,
            zone = %event.zone,
            entity = %event.entity,
            "{}",
            event.transition
        );
    }
    for zone in &scenario.zones {
        info!(
            zone = %zone.name,
            enters = report.count(&zone.name, Transition::Enter),
            exits = report.count(&zone.name, Transition::Exit),
            "summary"
        );
    }
    for (zone, entity) in &report.rejected {
        info!(%zone, %entity, "rejected: no trackable body");
    }
    info!(
        ticks = report.ticks,
        events = report.events.len(),
        "scenario complete"
    );

    Ok(())
}
