use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    pub snapshot_interval_secs: u64,
    pub history_limit: usize,
    pub autosave_delay_ms: u64,
    pub sync_scroll: bool,
    pub case_sensitive: bool,
    pub data_dir: Option<PathBuf>,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_secs: 10,
            history_limit: 50,
            autosave_delay_ms: 500,
            sync_scroll: false,
            case_sensitive: false, // Search ignores case unless asked
            data_dir: None,
        }
    }
}

impl RcConfig {
    pub fn snapshot_interval_ms(&self) -> u64 {
        self.snapshot_interval_secs * 1000
    }

    /// Directory for the persistent store: the configured one, else
    /// `$XDG_DATA_HOME/marky`, else `~/.local/share/marky`, else `.marky`
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Ok(xdg) = env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return Path::new(&xdg).join("marky");
            }
        }
        if let Ok(home) = env::var("HOME") {
            return Path::new(&home).join(".local/share/marky");
        }
        PathBuf::from(".marky")
    }
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .markyrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.markyrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(".markyrc");
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(".markyrc");
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load and parse the RC file
    pub fn load_config() -> RcConfig {
        let mut config = RcConfig::default();

        if let Some(rc_path) = Self::get_rc_path() {
            match fs::read_to_string(&rc_path) {
                Ok(content) => {
                    log::debug!("Loading config from {}", rc_path.display());
                    Self::parse_config_content(&content, &mut config);
                }
                Err(e) => {
                    log::warn!("Could not read {}: {}", rc_path.display(), e);
                }
            }
        }

        config
    }

    /// Parse the content of an RC file
    pub fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        let setting = line.strip_prefix("set ").map(str::trim).unwrap_or(line);

        if let Some((key, value)) = setting.split_once('=') {
            Self::apply_value(key.trim(), value.trim(), config);
            return;
        }

        // Bare flags: "set syncscroll" / "set nosyncscroll"
        let (flag, enabled) = match setting.strip_prefix("no") {
            Some(flag) => (flag, false),
            None => (setting, true),
        };
        match flag {
            "syncscroll" | "sync_scroll" | "scrollbind" => config.sync_scroll = enabled,
            "casesensitive" | "case_sensitive" => config.case_sensitive = enabled,
            "ignorecase" | "ic" => config.case_sensitive = !enabled,
            _ => {} // Unknown setting, ignore
        }
    }

    fn apply_value(key: &str, value: &str, config: &mut RcConfig) {
        let flag = value == "true" || value == "1" || value == "yes";

        match key {
            "snapshotinterval" | "snapshot_interval" | "snapshot_interval_secs" => {
                if let Ok(secs) = value.parse::<u64>() {
                    if (1..=3600).contains(&secs) {
                        config.snapshot_interval_secs = secs;
                    }
                }
            }
            "historylimit" | "history_limit" => {
                if let Ok(limit) = value.parse::<usize>() {
                    if (1..=1000).contains(&limit) {
                        config.history_limit = limit;
                    }
                }
            }
            "autosavedelay" | "autosave_delay" | "autosave_delay_ms" => {
                if let Ok(delay) = value.parse::<u64>() {
                    if delay <= 60_000 {
                        config.autosave_delay_ms = delay;
                    }
                }
            }
            "syncscroll" | "sync_scroll" => config.sync_scroll = flag,
            "casesensitive" | "case_sensitive" => config.case_sensitive = flag,
            "datadir" | "data_dir" => {
                if !value.is_empty() {
                    config.data_dir = Some(PathBuf::from(value));
                }
            }
            _ => {} // Unknown setting, ignore
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# marky configuration file (.markyrc)
# Lines starting with # or " are comments

# Version history
set snapshotinterval=10   # Seconds between history snapshots
set historylimit=50       # Versions kept before the oldest is dropped

# Autosave
set autosavedelay=500     # Milliseconds of quiet before saving

# Panes and search
set nosyncscroll          # Mirror editor/preview scrolling (or set syncscroll)
set ignorecase            # Case-insensitive search (or set casesensitive)

# Alternative key=value syntax:
# data_dir=/home/me/.local/share/marky
# sync_scroll=true
"#
        .to_string()
    }
}
