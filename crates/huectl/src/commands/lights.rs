//! Light command handlers.

use tabled::Tabled;

use huectl_core::{BatchOutcome, BridgeSession, LightLevels};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

// ── Handlers ────────────────────────────────────────────────────────

/// List lights known to the bridge.
pub fn show(session: &BridgeSession, global: &GlobalOpts) -> Result<(), CliError> {
    let data: Vec<(String, String)> = session
        .lights()
        .iter()
        .map(|(name, id)| (name.clone(), id.clone()))
        .collect();

    let out = output::render_list(
        &global.output,
        &data,
        |(name, id)| LightRow {
            name: name.clone(),
            id: id.clone(),
        },
        |(name, _)| name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn power(
    session: &BridgeSession,
    lights: &[String],
    on: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.set_lights_power(lights, on).await?;
    report(&outcome, if on { "Turned on" } else { "Turned off" }, global);
    Ok(())
}

pub async fn toggle(
    session: &BridgeSession,
    lights: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.toggle_lights(lights).await?;
    report(&outcome, "Toggled", global);
    Ok(())
}

pub async fn set_levels(
    session: &BridgeSession,
    light: &str,
    levels: LightLevels,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session
        .set_light_attributes(&[light.to_string()], levels)
        .await?;
    report(&outcome, "Updated", global);
    Ok(())
}

pub async fn inc_levels(
    session: &BridgeSession,
    light: &str,
    deltas: LightLevels,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session
        .increment_light_attributes(&[light.to_string()], deltas)
        .await?;
    report(&outcome, "Updated", global);
    Ok(())
}

/// Shared outcome reporting: skipped names go to stderr as warnings,
/// the applied summary respects quiet mode.
pub(crate) fn report(outcome: &BatchOutcome, verb: &str, global: &GlobalOpts) {
    output::report_skipped("light", &outcome.skipped);
    if !global.quiet && !outcome.applied.is_empty() {
        eprintln!("{verb} {}", outcome.applied.join(", "));
    }
}
