use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tool: ToolConfig,
    pub scan: ScanConfig,
    pub safety: SafetyConfig,
}

/// How the external tag tool is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub program: String,
    /// Tag filter selecting the location tag group, e.g. `-GPS*`.
    pub location_tag: String,
    /// Tag holding the capture time.
    pub creation_tag: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "exiftool".to_string(),
            location_tag: "-GPS*".to_string(),
            creation_tag: "-CreateDate".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub recursive: bool,
    /// File-name globs skipped during the scan.
    pub exclude: Vec<String>,
    /// Set to `false` to skip dot-files and dot-directories.
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            exclude: vec!["*_original".to_string()],
            include_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub delete_originals: bool,
    pub dry_run: bool,
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("PHOTOGPS")
            .prefix_separator("_")
            .separator("__"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
