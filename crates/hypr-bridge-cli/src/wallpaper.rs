//! Random wallpaper rotation through hyprpaper
//!
//! Every monitor gets a wallpaper picked at random from the wallpaper
//! directory, avoiding the one it currently shows when there is a choice.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::seq::IndexedRandom;
use rand::Rng;

/// File extensions treated as wallpapers when none are given
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// First line of `hyprpaper listactive` when nothing is loaded
const NO_ACTIVE_WALLPAPERS: &str = "no wallpapers active";

/// Default wallpaper directory: `$XDG_CONFIG_HOME/wallpapers`, falling back
/// to `~/.config/wallpapers`
pub fn default_dir() -> PathBuf {
    let config_home = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(shellexpand::tilde("~/.config").into_owned()),
    };
    config_home.join("wallpapers")
}

/// File names in `dir` ending in one of `extensions`, sorted
pub fn list_wallpapers(dir: &Path, extensions: &[String]) -> Result<Vec<String>> {
    let mut wallpapers = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read wallpaper directory {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if extensions
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext.trim_start_matches('.'))))
        {
            wallpapers.push(name);
        }
    }

    wallpapers.sort();
    Ok(wallpapers)
}

/// Map every monitor to the file name of its active wallpaper
///
/// `listactive` is the output of `hyprctl hyprpaper listactive`, made of
/// `monitor = /path/to/file` lines. Monitors without an entry map to `None`.
pub fn active_wallpapers(
    monitors: &[String],
    listactive: &str,
) -> BTreeMap<String, Option<String>> {
    let mut active: BTreeMap<String, Option<String>> =
        monitors.iter().map(|m| (m.clone(), None)).collect();

    let lines: Vec<&str> = listactive.lines().filter(|l| !l.is_empty()).collect();
    if lines.first().map_or(true, |first| *first == NO_ACTIVE_WALLPAPERS) {
        return active;
    }

    for line in lines {
        let Some((monitor, wallpaper)) = line.split_once(" = ") else {
            tracing::warn!(line = %line, "Ignoring unexpected hyprpaper output");
            continue;
        };
        if monitor.is_empty() {
            continue;
        }
        let name = Path::new(wallpaper)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        active.insert(monitor.to_string(), name);
    }

    active
}

/// Pick a wallpaper other than `current` if possible
pub fn choose<'a, R: Rng + ?Sized>(
    wallpapers: &'a [String],
    current: Option<&str>,
    rng: &mut R,
) -> Result<&'a str> {
    if wallpapers.is_empty() {
        bail!("No wallpapers found");
    }

    let others: Vec<&String> = wallpapers
        .iter()
        .filter(|w| Some(w.as_str()) != current)
        .collect();

    let picked = match others.choose(rng) {
        Some(&w) => w.as_str(),
        // The only wallpaper is already shown
        None => wallpapers[0].as_str(),
    };
    Ok(picked)
}
