use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

pub const DEFAULT_PLAYGROUND_URL: &str = "https://playground.ponylang.io";
pub const DEFAULT_SNIPPET_BASE_URL: &str =
    "https://raw.githubusercontent.com/ponylang/pony-tutorial/main/code-samples";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Load with an explicit rc path. Precedence: defaults < rc file < env.
    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().flatten() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn playground_url(&self) -> String {
        self.get("PLAYGROUND_URL")
            .unwrap_or_else(|| DEFAULT_PLAYGROUND_URL.to_string())
    }

    pub fn snippet_base_url(&self) -> String {
        self.get("SNIPPET_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SNIPPET_BASE_URL.to_string())
    }

    pub fn default_branch(&self) -> String {
        self.get("DEFAULT_BRANCH").unwrap_or_else(|| "release".to_string())
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PLAYGROUND_URL",
        "SNIPPET_BASE_URL",
        "REQUEST_TIMEOUT",
        "DEFAULT_BRANCH",
        "SEPARATE_OUTPUT",
        "COLOR_OUTPUT",
    ];

    KEYS.contains(&k) || k.starts_with("PONYRUN_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("ponyrun").join(".ponyrunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("PLAYGROUND_URL".into(), DEFAULT_PLAYGROUND_URL.into());
    m.insert("SNIPPET_BASE_URL".into(), DEFAULT_SNIPPET_BASE_URL.into());
    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("DEFAULT_BRANCH".into(), "release".into());
    m.insert("SEPARATE_OUTPUT".into(), "true".into());
    m.insert("COLOR_OUTPUT".into(), "auto".into());

    m
}
