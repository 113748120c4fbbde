use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::layout_engine::LayoutMode;
use crate::model::workspace::WORKSPACE_COUNT;

pub fn config_file() -> PathBuf { dirs::home_dir().unwrap().join(".weft.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub workspace: WorkspaceSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Layout mode workspaces start in.
    #[serde(default)]
    pub default_mode: LayoutMode,
    /// Ratio step applied per resize keypress.
    #[serde(default = "default_ratio_step")]
    pub ratio_step: f32,
    /// Viewport assumed before the first terminal resize event arrives.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u16,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u16,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            default_mode: LayoutMode::default(),
            ratio_step: default_ratio_step(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// Display names for the nine workspaces; missing entries fall back to
    /// the workspace number.
    #[serde(default = "default_workspace_names")]
    pub names: Vec<String>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            names: default_workspace_names(),
        }
    }
}

fn default_ratio_step() -> f32 { 0.05 }

fn default_viewport_width() -> u16 { 80 }

fn default_viewport_height() -> u16 { 24 }

fn default_workspace_names() -> Vec<String> {
    (1..=WORKSPACE_COUNT).map(|i| i.to_string()).collect()
}

impl Settings {
    /// Reads settings from `path`; a missing file means defaults.
    pub fn load(path: &Path) -> anyhow::Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Settings> {
        let settings: Settings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=0.4).contains(&self.layout.ratio_step) {
            bail!(
                "layout.ratio_step must be within 0.0..=0.4, got {}",
                self.layout.ratio_step
            );
        }
        if self.layout.viewport_width < 1 || self.layout.viewport_height < 1 {
            bail!(
                "layout viewport must be at least 1x1, got {}x{}",
                self.layout.viewport_width,
                self.layout.viewport_height
            );
        }
        if self.workspace.names.len() > WORKSPACE_COUNT {
            bail!(
                "at most {WORKSPACE_COUNT} workspace names, got {}",
                self.workspace.names.len()
            );
        }
        Ok(())
    }
}
