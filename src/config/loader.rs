use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::types::{AppConfig, FetchConfig};

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$CYCLE_BOARD_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/cycle-board/config.toml`
/// 4. `~/.config/cycle-board/config.toml`
///
/// Without any of these, defaults are used.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = explicit_path.map(Path::to_path_buf).or_else(find_global_config) else {
        return Ok(AppConfig::default());
    };
    let mut config = read_config(&path)?;
    validate_fetch(&config.fetch).with_context(|| format!("invalid {}", path.display()))?;
    resolve_fixture_path(&mut config, &path);
    Ok(config)
}

fn validate_fetch(fetch: &FetchConfig) -> Result<()> {
    if fetch.stale_after_secs > FetchConfig::MAX_STALE_AFTER_SECS {
        bail!(
            "fetch.stale_after_secs = {} exceeds the maximum of {}",
            fetch.stale_after_secs,
            FetchConfig::MAX_STALE_AFTER_SECS
        );
    }
    if fetch.max_cached_keys == 0 {
        bail!("fetch.max_cached_keys must be at least 1");
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

/// Relative fixture paths are taken relative to the config file; `~/` expands.
fn resolve_fixture_path(config: &mut AppConfig, config_path: &Path) {
    let Some(fixture) = config.defaults.fixture.take() else {
        return;
    };
    let expanded = fixture
        .to_str()
        .map_or_else(|| fixture.clone(), expand_tilde);
    config.defaults.fixture = Some(if expanded.is_absolute() {
        expanded
    } else {
        config_path
            .parent()
            .map_or_else(|| expanded.clone(), |dir| dir.join(&expanded))
    });
}

fn find_global_config() -> Option<PathBuf> {
    // $CYCLE_BOARD_CONFIG
    if let Ok(path) = std::env::var("CYCLE_BOARD_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/cycle-board/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("cycle-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/cycle-board/config.toml
    if let Some(home) = dirs_fallback() {
        let p = home.join(".config/cycle-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

fn dirs_fallback() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs_fallback()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/tmp/x.json"), PathBuf::from("/tmp/x.json"));
        assert_eq!(expand_tilde("rel/x.json"), PathBuf::from("rel/x.json"));
    }

    #[test]
    fn relative_fixture_is_anchored_at_config_dir() {
        let mut config = AppConfig::default();
        config.defaults.fixture = Some(PathBuf::from("fixture.json"));
        resolve_fixture_path(&mut config, Path::new("/etc/cycle-board/config.toml"));
        assert_eq!(
            config.defaults.fixture,
            Some(PathBuf::from("/etc/cycle-board/fixture.json"))
        );
    }
}
