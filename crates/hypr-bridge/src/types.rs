//! Reply types for Hyprland JSON queries
//!
//! Only the fields callers of this crate use are modelled; unknown fields in
//! Hyprland's replies are ignored so newer compositor versions still decode.

use serde::{Deserialize, Serialize};

/// Short workspace reference embedded in other replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// One output as reported by `j/monitors all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: i64,

    /// Connector name (e.g., "DP-1", "eDP-1")
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,

    #[serde(default, rename = "refreshRate")]
    pub refresh_rate: f64,

    #[serde(default)]
    pub x: i32,

    #[serde(default)]
    pub y: i32,

    #[serde(default = "default_scale")]
    pub scale: f64,

    #[serde(rename = "activeWorkspace")]
    pub active_workspace: WorkspaceRef,

    /// Whether this monitor has keyboard focus
    #[serde(default)]
    pub focused: bool,

    /// Disabled monitors are only listed by `monitors all`
    #[serde(default)]
    pub disabled: bool,
}

fn default_scale() -> f64 {
    1.0
}

/// A workspace as reported by `j/workspaces` and `j/activeworkspace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    /// Name of the monitor showing this workspace
    #[serde(default)]
    pub monitor: String,

    #[serde(default, rename = "monitorID")]
    pub monitor_id: Option<i64>,

    /// Number of windows on the workspace
    #[serde(default)]
    pub windows: u32,

    #[serde(default, rename = "hasfullscreen")]
    pub has_fullscreen: bool,

    #[serde(default, rename = "lastwindowtitle")]
    pub last_window_title: String,
}
