//! Command handlers, one module per domain, plus dispatch and the
//! per-bridge lock discipline.

pub mod bridges;
pub mod groups;
pub mod lights;
pub mod scenes;

use std::time::Duration;

use huectl_core::{BridgeLock, BridgeSession, BridgeStore, TransportConfig};

use crate::cli::{Action, GlobalOpts};
use crate::error::CliError;

/// Dispatch a resolved action.
///
/// Mutating bridge actions run under the advisory lockfile: acquisition
/// is fail-fast (an existing lockfile is left untouched and the action
/// is not performed), and the lock is released even when the action
/// fails. `--reset-lock` bypasses acquisition by design.
pub async fn dispatch(action: Action, global: &GlobalOpts) -> Result<(), CliError> {
    let store = open_store(global)?;

    match action {
        Action::ShowBridges => bridges::show_bridges(&store, global),
        Action::InitBridge { name, address } => {
            bridges::init_bridge(&store, &name, &address, global).await
        }
        action => {
            let bridge = global.bridge.clone().ok_or(CliError::NoBridge)?;

            if matches!(action, Action::ResetLock) {
                return bridges::reset_lock(&store, &bridge, global);
            }

            let session = open_session(&bridge, &store, global).await?;

            if action.is_mutating() {
                let lock = BridgeLock::acquire(&store, &bridge)?;
                let result = run(session, action, global).await;
                let released = lock.release();
                result?;
                released?;
                Ok(())
            } else {
                run(session, action, global).await
            }
        }
    }
}

fn open_store(global: &GlobalOpts) -> Result<BridgeStore, CliError> {
    match &global.store_dir {
        Some(dir) => Ok(BridgeStore::at(dir)?),
        None => Ok(BridgeStore::open_default()?),
    }
}

pub(crate) fn transport(global: &GlobalOpts) -> TransportConfig {
    TransportConfig {
        timeout: Duration::from_secs(global.timeout),
    }
}

async fn open_session(
    bridge: &str,
    store: &BridgeStore,
    global: &GlobalOpts,
) -> Result<BridgeSession, CliError> {
    tracing::debug!(bridge, "opening bridge session");
    Ok(BridgeSession::open(bridge, None, store.clone(), &transport(global)).await?)
}

/// Run a bridge-scoped action against an open session.
async fn run(
    mut session: BridgeSession,
    action: Action,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match action {
        Action::ShowLights => lights::show(&session, global),
        Action::Power { lights, on } => lights::power(&session, &lights, on, global).await,
        Action::Toggle { lights } => lights::toggle(&session, &lights, global).await,
        Action::SetLevels { light, levels } => {
            lights::set_levels(&session, &light, levels, global).await
        }
        Action::IncLevels { light, levels } => {
            lights::inc_levels(&session, &light, levels, global).await
        }

        Action::ShowGroups => groups::show(&session, global),
        Action::GroupPower { group, on } => groups::power(&session, &group, on, global).await,
        Action::ToggleGroup { group } => groups::toggle(&session, &group, global).await,
        Action::CreateGroup { group, lights } => {
            groups::create(&mut session, &group, &lights, global).await
        }
        Action::RemoveGroup { group } => groups::remove(&mut session, &group, global),
        Action::SetGroupLevels { group, levels } => {
            groups::set_levels(&session, &group, levels, global).await
        }
        Action::IncGroupLevels { group, levels } => {
            groups::inc_levels(&session, &group, levels, global).await
        }

        Action::ShowScenes => scenes::show(&session, global),
        Action::SaveScene { scene, lights } => {
            scenes::save(&mut session, &scene, &lights, global).await
        }
        Action::ApplyScene { scene } => scenes::apply(&session, &scene, global).await,
        Action::RemoveScene { scene } => scenes::remove(&mut session, &scene, global),

        Action::ShowBridges | Action::InitBridge { .. } | Action::ResetLock => {
            unreachable!("handled before session construction")
        }
    }
}
