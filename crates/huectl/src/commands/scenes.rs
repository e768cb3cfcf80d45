//! Scene command handlers.

use tabled::Tabled;

use huectl_core::{BridgeSession, SceneState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::lights::report;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SceneRow {
    #[tabled(rename = "Scene")]
    name: String,
    #[tabled(rename = "Lights")]
    lights: String,
}

// ── Handlers ────────────────────────────────────────────────────────

/// List scenes stored for the bridge.
pub fn show(session: &BridgeSession, global: &GlobalOpts) -> Result<(), CliError> {
    let data: Vec<(String, SceneState)> = session
        .scenes()
        .iter()
        .map(|(name, state)| (name.clone(), state.clone()))
        .collect();

    let out = output::render_list(
        &global.output,
        &data,
        |(name, state)| SceneRow {
            name: name.clone(),
            lights: state.keys().cloned().collect::<Vec<_>>().join(", "),
        },
        |(name, _)| name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn save(
    session: &mut BridgeSession,
    scene: &str,
    lights: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.save_scene(scene, lights).await?;
    output::report_skipped("light", &outcome.skipped);
    if !global.quiet {
        eprintln!(
            "Saved scene '{scene}' capturing {} lights",
            outcome.applied.len()
        );
    }
    Ok(())
}

pub async fn apply(
    session: &BridgeSession,
    scene: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.apply_scene(scene).await?;
    report(&outcome, "Applied scene to", global);
    Ok(())
}

pub fn remove(
    session: &mut BridgeSession,
    scene: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if session.remove_scene(scene)? {
        if !global.quiet {
            eprintln!("Removed scene '{scene}'");
        }
    } else {
        eprintln!("No scene named '{scene}'");
    }
    Ok(())
}
