//! Clap derive structures for the `huectl` CLI.
//!
//! The surface is flat flags rather than subcommands: one bridge
//! selection flag plus at most one action flag per invocation, with
//! `;`-separated light lists and `name|v1;v2;v3` payloads.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use huectl_core::LightLevels;

use crate::error::CliError;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huectl -- control Philips Hue bridges from the command line
#[derive(Debug, Parser)]
#[command(
    name = "huectl",
    version,
    about = "Control Philips Hue smart-lighting bridges",
    long_about = "Register Hue bridges, enumerate lights, and switch, dim, and\n\
        recolor lights individually or in named groups.\n\n\
        Light lists are separated by semicolons: --on 'Desk;Hallway'.\n\
        Attribute payloads take the form 'name|bri;sat;hue' where empty\n\
        segments leave the attribute unchanged."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(flatten)]
    pub actions: ActionFlags,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Bridge to operate on
    #[arg(long = "bridge", short = 'b', value_name = "BRIDGE", env = "HUECTL_BRIDGE")]
    pub bridge: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HUECTL_OUTPUT",
        default_value = "table",
        value_enum
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HUECTL_TIMEOUT", default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Directory holding per-bridge state and lock files
    #[arg(long, env = "HUECTL_STORE_DIR", value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Action Flags ─────────────────────────────────────────────────────

/// The action surface. At most one action per invocation.
#[derive(Debug, Args)]
#[group(id = "action", multiple = false)]
pub struct ActionFlags {
    /// Show all initialized bridges
    #[arg(long)]
    pub show_bridges: bool,

    /// Initialize a new bridge (press the sync button first)
    #[arg(long, num_args = 2, value_names = ["NAME", "IP"])]
    pub init_bridge: Option<Vec<String>>,

    /// List lights connected to the bridge
    #[arg(long)]
    pub show_lights: bool,

    /// List groups defined for the bridge
    #[arg(long)]
    pub show_groups: bool,

    /// List scenes stored for the bridge
    #[arg(long)]
    pub show_scenes: bool,

    /// Turn on lights by name
    #[arg(long, value_name = "LIGHTS")]
    pub on: Option<String>,

    /// Turn off lights by name
    #[arg(long, value_name = "LIGHTS")]
    pub off: Option<String>,

    /// Toggle lights individually by name
    #[arg(long, value_name = "LIGHTS")]
    pub toggle: Option<String>,

    /// Turn on all lights in a group
    #[arg(long, value_name = "GROUP")]
    pub group_on: Option<String>,

    /// Turn off all lights in a group
    #[arg(long, value_name = "GROUP")]
    pub group_off: Option<String>,

    /// Toggle each light in a group individually
    #[arg(long, value_name = "GROUP")]
    pub toggle_group: Option<String>,

    /// Create a group of lights: 'group|light1;light2'
    #[arg(long, value_name = "GROUP|LIGHTS")]
    pub create_group: Option<String>,

    /// Remove a group by name
    #[arg(long, value_name = "GROUP")]
    pub remove_group: Option<String>,

    /// Set brightness, saturation, and hue: 'light|b;s;h'
    #[arg(long, value_name = "LIGHT|B;S;H")]
    pub set_bsh: Option<String>,

    /// Set brightness, saturation, and hue for a group: 'group|b;s;h'
    #[arg(long, value_name = "GROUP|B;S;H")]
    pub set_bsh_group: Option<String>,

    /// Increment brightness, saturation, and hue: 'light|b;s;h'
    #[arg(long, value_name = "LIGHT|B;S;H")]
    pub inc_bsh: Option<String>,

    /// Increment brightness, saturation, and hue for a group: 'group|b;s;h'
    #[arg(long, value_name = "GROUP|B;S;H")]
    pub inc_bsh_group: Option<String>,

    /// Capture the current state of lights into a scene: 'scene|light1;light2'
    #[arg(long, value_name = "SCENE|LIGHTS")]
    pub save_scene: Option<String>,

    /// Re-apply a stored scene
    #[arg(long, value_name = "SCENE")]
    pub apply_scene: Option<String>,

    /// Remove a scene by name
    #[arg(long, value_name = "SCENE")]
    pub remove_scene: Option<String>,

    /// Remove the lockfile for the bridge
    #[arg(long)]
    pub reset_lock: bool,
}

// ── Resolved Action ──────────────────────────────────────────────────

/// One fully parsed action, payload grammar included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowBridges,
    InitBridge { name: String, address: String },
    ShowLights,
    ShowGroups,
    ShowScenes,
    Power { lights: Vec<String>, on: bool },
    Toggle { lights: Vec<String> },
    GroupPower { group: String, on: bool },
    ToggleGroup { group: String },
    CreateGroup { group: String, lights: Vec<String> },
    RemoveGroup { group: String },
    SetLevels { light: String, levels: LightLevels },
    SetGroupLevels { group: String, levels: LightLevels },
    IncLevels { light: String, levels: LightLevels },
    IncGroupLevels { group: String, levels: LightLevels },
    SaveScene { scene: String, lights: Vec<String> },
    ApplyScene { scene: String },
    RemoveScene { scene: String },
    ResetLock,
}

impl Action {
    /// Whether the action mutates bridge or store state and therefore
    /// takes the per-bridge lock.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::ShowBridges
                | Self::InitBridge { .. }
                | Self::ShowLights
                | Self::ShowGroups
                | Self::ShowScenes
                | Self::ResetLock
        )
    }
}

impl ActionFlags {
    /// Resolve the flag surface into at most one action.
    ///
    /// Clap's arg group guarantees no two action flags were given;
    /// `None` means "nothing to do".
    pub fn resolve(&self) -> Result<Option<Action>, CliError> {
        if self.show_bridges {
            return Ok(Some(Action::ShowBridges));
        }
        if let Some(ref pair) = self.init_bridge {
            // num_args = 2 guarantees exactly two values.
            return Ok(Some(Action::InitBridge {
                name: pair[0].clone(),
                address: pair[1].clone(),
            }));
        }
        if self.show_lights {
            return Ok(Some(Action::ShowLights));
        }
        if self.show_groups {
            return Ok(Some(Action::ShowGroups));
        }
        if self.show_scenes {
            return Ok(Some(Action::ShowScenes));
        }
        if let Some(ref raw) = self.on {
            return Ok(Some(Action::Power {
                lights: split_list(raw),
                on: true,
            }));
        }
        if let Some(ref raw) = self.off {
            return Ok(Some(Action::Power {
                lights: split_list(raw),
                on: false,
            }));
        }
        if let Some(ref raw) = self.toggle {
            return Ok(Some(Action::Toggle {
                lights: split_list(raw),
            }));
        }
        if let Some(ref group) = self.group_on {
            return Ok(Some(Action::GroupPower {
                group: group.clone(),
                on: true,
            }));
        }
        if let Some(ref group) = self.group_off {
            return Ok(Some(Action::GroupPower {
                group: group.clone(),
                on: false,
            }));
        }
        if let Some(ref group) = self.toggle_group {
            return Ok(Some(Action::ToggleGroup {
                group: group.clone(),
            }));
        }
        if let Some(ref raw) = self.create_group {
            let (group, payload) = split_pair(raw, "create-group")?;
            return Ok(Some(Action::CreateGroup {
                group,
                lights: split_list(&payload),
            }));
        }
        if let Some(ref group) = self.remove_group {
            return Ok(Some(Action::RemoveGroup {
                group: group.clone(),
            }));
        }
        if let Some(ref raw) = self.set_bsh {
            let (light, payload) = split_pair(raw, "set-bsh")?;
            return Ok(Some(Action::SetLevels {
                light,
                levels: parse_levels(&payload, "set-bsh")?,
            }));
        }
        if let Some(ref raw) = self.set_bsh_group {
            let (group, payload) = split_pair(raw, "set-bsh-group")?;
            return Ok(Some(Action::SetGroupLevels {
                group,
                levels: parse_levels(&payload, "set-bsh-group")?,
            }));
        }
        if let Some(ref raw) = self.inc_bsh {
            let (light, payload) = split_pair(raw, "inc-bsh")?;
            return Ok(Some(Action::IncLevels {
                light,
                levels: parse_levels(&payload, "inc-bsh")?,
            }));
        }
        if let Some(ref raw) = self.inc_bsh_group {
            let (group, payload) = split_pair(raw, "inc-bsh-group")?;
            return Ok(Some(Action::IncGroupLevels {
                group,
                levels: parse_levels(&payload, "inc-bsh-group")?,
            }));
        }
        if let Some(ref raw) = self.save_scene {
            let (scene, payload) = split_pair(raw, "save-scene")?;
            return Ok(Some(Action::SaveScene {
                scene,
                lights: split_list(&payload),
            }));
        }
        if let Some(ref scene) = self.apply_scene {
            return Ok(Some(Action::ApplyScene {
                scene: scene.clone(),
            }));
        }
        if let Some(ref scene) = self.remove_scene {
            return Ok(Some(Action::RemoveScene {
                scene: scene.clone(),
            }));
        }
        if self.reset_lock {
            return Ok(Some(Action::ResetLock));
        }
        Ok(None)
    }
}

// ── Payload grammar ──────────────────────────────────────────────────

/// Split a `;`-separated light list, dropping empty segments.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split a `name|payload` pair.
fn split_pair(raw: &str, flag: &str) -> Result<(String, String), CliError> {
    match raw.split_once('|') {
        Some((name, payload)) if !name.is_empty() => Ok((name.to_string(), payload.to_string())),
        _ => Err(CliError::Validation {
            field: flag.to_string(),
            reason: format!("expected 'name|payload', got '{raw}'"),
        }),
    }
}

/// Parse a `b;s;h` payload. Empty segments mean "leave unchanged" and
/// parse to absent, not zero.
fn parse_levels(raw: &str, flag: &str) -> Result<LightLevels, CliError> {
    let segments: Vec<&str> = raw.split(';').collect();
    if segments.len() > 3 {
        return Err(CliError::Validation {
            field: flag.to_string(),
            reason: format!("expected at most three ';'-separated values, got '{raw}'"),
        });
    }

    let parse = |index: usize| -> Result<Option<i64>, CliError> {
        match segments.get(index).map(|s| s.trim()) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| CliError::Validation {
                field: flag.to_string(),
                reason: format!("'{value}' is not an integer"),
            }),
        }
    };

    Ok(LightLevels {
        brightness: parse(0)?,
        saturation: parse(1)?,
        hue: parse(2)?,
    })
}
