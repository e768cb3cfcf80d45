//! Bridge-level command handlers: listing, registration, lock reset.

use tabled::Tabled;

use huectl_core::{BridgeLock, BridgeSession, BridgeStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::transport;

#[derive(Tabled)]
struct BridgeRow {
    #[tabled(rename = "Bridge")]
    name: String,
}

/// List every bridge with a persisted state file.
pub fn show_bridges(store: &BridgeStore, global: &GlobalOpts) -> Result<(), CliError> {
    let names = store.bridge_names()?;
    let out = output::render_list(
        &global.output,
        &names,
        |name| BridgeRow { name: name.clone() },
        Clone::clone,
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Pair with a bridge and persist the new session.
///
/// The bridge's sync button must have been pressed within the pairing
/// window. If state for `name` already exists it is loaded and
/// refreshed instead, leaving the existing registration intact.
pub async fn init_bridge(
    store: &BridgeStore,
    name: &str,
    address: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session =
        BridgeSession::open(name, Some(address), store.clone(), &transport(global)).await?;
    session.persist()?;

    if !global.quiet {
        eprintln!(
            "Registered bridge '{}' at {} ({} lights)",
            session.name(),
            session.address(),
            session.lights().len()
        );
    }
    Ok(())
}

/// Remove a lockfile left behind by a crashed invocation.
pub fn reset_lock(store: &BridgeStore, bridge: &str, global: &GlobalOpts) -> Result<(), CliError> {
    if BridgeLock::reset(store, bridge)? {
        if !global.quiet {
            eprintln!("Removed lockfile for bridge '{bridge}'");
        }
    } else {
        eprintln!("No lockfile found for bridge '{bridge}'");
    }
    Ok(())
}
