//! Group command handlers.
//!
//! Groups are stored views over the light list; every operation here
//! delegates to the corresponding light-list operation via the session.

use tabled::Tabled;

use huectl_core::{BridgeSession, LightLevels};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::lights::report;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    name: String,
    #[tabled(rename = "Lights")]
    lights: String,
}

// ── Handlers ────────────────────────────────────────────────────────

/// List groups defined for the bridge.
pub fn show(session: &BridgeSession, global: &GlobalOpts) -> Result<(), CliError> {
    let data: Vec<(String, Vec<String>)> = session
        .groups()
        .iter()
        .map(|(name, members)| (name.clone(), members.clone()))
        .collect();

    let out = output::render_list(
        &global.output,
        &data,
        |(name, members)| GroupRow {
            name: name.clone(),
            lights: members.join(", "),
        },
        |(name, _)| name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn power(
    session: &BridgeSession,
    group: &str,
    on: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.set_group_power(group, on).await?;
    report(&outcome, if on { "Turned on" } else { "Turned off" }, global);
    Ok(())
}

pub async fn toggle(
    session: &BridgeSession,
    group: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.toggle_group(group).await?;
    report(&outcome, "Toggled", global);
    Ok(())
}

pub async fn create(
    session: &mut BridgeSession,
    group: &str,
    lights: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.create_group(group, lights).await?;
    output::report_skipped("light", &outcome.skipped);
    if !global.quiet {
        eprintln!(
            "Created group '{group}' with {} lights",
            outcome.applied.len()
        );
    }
    Ok(())
}

pub fn remove(
    session: &mut BridgeSession,
    group: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if session.remove_group(group)? {
        if !global.quiet {
            eprintln!("Removed group '{group}'");
        }
    } else {
        eprintln!("No group named '{group}'");
    }
    Ok(())
}

pub async fn set_levels(
    session: &BridgeSession,
    group: &str,
    levels: LightLevels,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.set_group_attributes(group, levels).await?;
    report(&outcome, "Updated", global);
    Ok(())
}

pub async fn inc_levels(
    session: &BridgeSession,
    group: &str,
    deltas: LightLevels,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session.increment_group_attributes(group, deltas).await?;
    report(&outcome, "Updated", global);
    Ok(())
}
