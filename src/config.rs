use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use serde::de::Deserializer;
use serde::Deserialize;

use crate::contact::CategorySet;

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "agenda.log";
const APP_NAME: &str = "agenda";

#[derive(Debug, Clone)]
pub struct Config {
    /// File the configuration was read from; `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    pub categories: CategorySet,
    pub phone_region: Option<String>,
    pub keys: Keys,
    pub ui: UiConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            categories: CategorySet::default(),
            phone_region: None,
            keys: Keys::default(),
            ui: UiConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log file; `None` means the platform data directory.
    pub file: Option<PathBuf>,
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn resolved_file(&self) -> Result<PathBuf> {
        match &self.file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_root()?.join(LOG_FILE_NAME)),
        }
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone, Default)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub separator: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            border: RgbColor::new(98, 0, 238),
            selection_bg: RgbColor::new(98, 0, 238),
            selection_fg: RgbColor::new(255, 255, 255),
            separator: RgbColor::new(98, 0, 238),
            status_fg: RgbColor::new(153, 153, 153),
            status_bg: RgbColor::new(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Keys available whenever no modal is open
    pub global: GlobalKeys,
    /// Keys for moving through the contact list
    pub list: ListKeys,
    /// Keys for the add/edit form
    pub form: FormKeys,
    /// Keys for the delete confirmation
    pub confirm: ConfirmKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub add: Vec<String>,
    pub help: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub top: Vec<String>,
    pub bottom: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FormKeys {
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub save: Vec<String>,
    pub cancel: Vec<String>,
    pub category_next: Vec<String>,
    pub category_prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConfirmKeys {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: vec!["q".into()],
            add: vec!["a".into(), "+".into()],
            help: vec!["F1".into(), "?".into()],
        }
    }
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            next: vec!["j".into(), "Down".into()],
            prev: vec!["k".into(), "Up".into()],
            top: vec!["g".into(), "Home".into()],
            bottom: vec!["G".into(), "End".into()],
            edit: vec!["e".into(), "Enter".into()],
            delete: vec!["x".into(), "Delete".into()],
        }
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self {
            next_field: vec!["Tab".into(), "Down".into()],
            prev_field: vec!["Backtab".into(), "Up".into()],
            save: vec!["Enter".into()],
            cancel: vec!["Escape".into()],
            category_next: vec!["Right".into(), "j".into(), "Space".into()],
            category_prev: vec!["Left".into(), "k".into()],
        }
    }
}

impl Default for ConfirmKeys {
    fn default() -> Self {
        Self {
            confirm: vec!["y".into(), "Enter".into()],
            cancel: vec!["n".into(), "Escape".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    list: ListKeysFile,
    form: FormKeysFile,
    confirm: ConfirmKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    quit: KeyBinding,
    add: KeyBinding,
    help: KeyBinding,
}

impl Default for GlobalKeysFile {
    fn default() -> Self {
        let defaults = GlobalKeys::default();
        Self {
            quit: KeyBinding::Multiple(defaults.quit),
            add: KeyBinding::Multiple(defaults.add),
            help: KeyBinding::Multiple(defaults.help),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    top: KeyBinding,
    bottom: KeyBinding,
    edit: KeyBinding,
    delete: KeyBinding,
}

impl Default for ListKeysFile {
    fn default() -> Self {
        let defaults = ListKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            top: KeyBinding::Multiple(defaults.top),
            bottom: KeyBinding::Multiple(defaults.bottom),
            edit: KeyBinding::Multiple(defaults.edit),
            delete: KeyBinding::Multiple(defaults.delete),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FormKeysFile {
    next_field: KeyBinding,
    prev_field: KeyBinding,
    save: KeyBinding,
    cancel: KeyBinding,
    category_next: KeyBinding,
    category_prev: KeyBinding,
}

impl Default for FormKeysFile {
    fn default() -> Self {
        let defaults = FormKeys::default();
        Self {
            next_field: KeyBinding::Multiple(defaults.next_field),
            prev_field: KeyBinding::Multiple(defaults.prev_field),
            save: KeyBinding::Multiple(defaults.save),
            cancel: KeyBinding::Multiple(defaults.cancel),
            category_next: KeyBinding::Multiple(defaults.category_next),
            category_prev: KeyBinding::Multiple(defaults.category_prev),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfirmKeysFile {
    confirm: KeyBinding,
    cancel: KeyBinding,
}

impl Default for ConfirmKeysFile {
    fn default() -> Self {
        let defaults = ConfirmKeys::default();
        Self {
            confirm: KeyBinding::Multiple(defaults.confirm),
            cancel: KeyBinding::Multiple(defaults.cancel),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            global: GlobalKeys {
                quit: file.global.quit.into_vec(),
                add: file.global.add.into_vec(),
                help: file.global.help.into_vec(),
            },
            list: ListKeys {
                next: file.list.next.into_vec(),
                prev: file.list.prev.into_vec(),
                top: file.list.top.into_vec(),
                bottom: file.list.bottom.into_vec(),
                edit: file.list.edit.into_vec(),
                delete: file.list.delete.into_vec(),
            },
            form: FormKeys {
                next_field: file.form.next_field.into_vec(),
                prev_field: file.form.prev_field.into_vec(),
                save: file.form.save.into_vec(),
                cancel: file.form.cancel.into_vec(),
                category_next: file.form.category_next.into_vec(),
                category_prev: file.form.category_prev.into_vec(),
            },
            confirm: ConfirmKeys {
                confirm: file.confirm.confirm.into_vec(),
                cancel: file.confirm.cancel.into_vec(),
            },
        }
    }
}

// =============================================================================
// Key binding validation
// =============================================================================

/// Canonical form for collision detection.
/// Single characters preserve case ('G' is Shift+g, different from 'g').
/// Multi-character key names are case-insensitive.
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        match trimmed.to_ascii_lowercase().as_str() {
            "esc" => "escape".to_string(),
            "shift+tab" => "backtab".to_string(),
            "del" => "delete".to_string(),
            "page_up" => "pageup".to_string(),
            "page_down" => "pagedown".to_string(),
            other => other.to_string(),
        }
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Field, save and cancel keys are checked before text input, so a key that
/// types a character would be unreachable in the name and number fields.
fn check_form_text_keys(form: &FormKeys) -> Result<()> {
    let actions: [(&str, &[String]); 4] = [
        ("next_field", &form.next_field),
        ("prev_field", &form.prev_field),
        ("save", &form.save),
        ("cancel", &form.cancel),
    ];
    for (action, bindings) in actions {
        for binding in bindings {
            let normalized = normalize_binding(binding);
            if normalized == "space" || normalized.chars().count() == 1 {
                bail!(
                    "invalid binding in [keys.form]: '{}' for '{}' would block typing into text fields",
                    binding,
                    action
                );
            }
        }
    }
    Ok(())
}

/// Category keys only fire while the picker has focus, so they are checked
/// against the other form actions but not against text typed into inputs.
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    // Global keys are live while browsing the list.
    check_context_collisions(
        &[
            ("quit", &keys.global.quit),
            ("add", &keys.global.add),
            ("help", &keys.global.help),
            ("next", &keys.list.next),
            ("prev", &keys.list.prev),
            ("top", &keys.list.top),
            ("bottom", &keys.list.bottom),
            ("edit", &keys.list.edit),
            ("delete", &keys.list.delete),
        ],
        "global/list",
    )?;

    check_context_collisions(
        &[
            ("next_field", &keys.form.next_field),
            ("prev_field", &keys.form.prev_field),
            ("save", &keys.form.save),
            ("cancel", &keys.form.cancel),
            ("category_next", &keys.form.category_next),
            ("category_prev", &keys.form.category_prev),
        ],
        "form",
    )?;
    check_form_text_keys(&keys.form)?;

    check_context_collisions(
        &[
            ("confirm", &keys.confirm.confirm),
            ("cancel", &keys.confirm.cancel),
        ],
        "confirm",
    )?;

    Ok(())
}

// =============================================================================
// Config file
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    categories: Option<Vec<CategoryFile>>,
    phone_region: Option<String>,
    keys: KeysFile,
    ui: UiFile,
    log: LogFile,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    name: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LogFile {
    file: Option<String>,
    level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    separator: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        let defaults = UiColors::default();
        Self {
            border: defaults.border,
            selection_bg: defaults.selection_bg,
            selection_fg: defaults.selection_fg,
            separator: defaults.separator,
            status_fg: defaults.status_fg,
            status_bg: defaults.status_bg,
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let colors = file.colors;
        Self {
            colors: UiColors {
                border: colors.border,
                selection_bg: colors.selection_bg,
                selection_fg: colors.selection_fg,
                separator: colors.separator,
                status_fg: colors.status_fg,
                status_bg: colors.status_bg,
            },
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME).context("unable to determine base directories")
}

fn data_root() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

/// Load configuration. An explicit path must exist; the default path may be
/// absent, in which case built-in defaults are used.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            let path = expand_tilde(path);
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path
        }
        None => {
            let path = default_config_path()?;
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    let mut config = parse(&raw).with_context(|| format!("invalid configuration in {}", path.display()))?;
    config.config_path = Some(path);
    Ok(config)
}

pub fn parse(raw: &str) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse configuration as TOML")?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    let categories = match cfg_file.categories {
        Some(entries) => CategorySet::new(entries.into_iter().map(|c| (c.name, c.icon)))
            .map_err(|err| anyhow!("invalid `categories`: {}", err))?,
        None => CategorySet::default(),
    };

    let phone_region = cfg_file
        .phone_region
        .as_ref()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_ascii_uppercase());

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    let log = LogConfig {
        file: cfg_file
            .log
            .file
            .map(|s| expand_tilde(Path::new(&s))),
        level: cfg_file
            .log
            .level
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| LogConfig::default().level),
    };

    Ok(Config {
        config_path: None,
        categories,
        phone_region,
        keys,
        ui: cfg_file.ui.into(),
        log,
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["categories", "phone_region", "keys", "ui", "log"]);

    for key in table.keys() {
        if !known.contains(key.as_str()) {
            eprintln!("warning: unknown configuration key `{}`", key);
        }
    }

    if let Some(keys_val) = table.get("keys") {
        warn_unknown_keys_section(keys_val);
    }

    if let Some(ui_val) = table.get("ui") {
        warn_unknown_in_context(ui_val, "ui", &["colors"]);
        if let Some(colors) = ui_val.get("colors") {
            warn_unknown_in_context(
                colors,
                "ui.colors",
                &[
                    "border",
                    "selection_bg",
                    "selection_fg",
                    "separator",
                    "status_fg",
                    "status_bg",
                ],
            );
        }
    }

    if let Some(log_val) = table.get("log") {
        warn_unknown_in_context(log_val, "log", &["file", "level"]);
    }
}

fn warn_unknown_keys_section(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    for key in table.keys() {
        let known: &[&str] = match key.as_str() {
            "global" => &["quit", "add", "help"],
            "list" => &["next", "prev", "top", "bottom", "edit", "delete"],
            "form" => &[
                "next_field",
                "prev_field",
                "save",
                "cancel",
                "category_next",
                "category_prev",
            ],
            "confirm" => &["confirm", "cancel"],
            other => {
                eprintln!("warning: unknown key context `keys.{}`", other);
                continue;
            }
        };
        if let Some(section) = table.get(key) {
            warn_unknown_in_context(section, &format!("keys.{}", key), known);
        }
    }
}

fn warn_unknown_in_context(value: &toml::Value, context: &str, known: &[&str]) {
    let Some(table) = value.as_table() else {
        return;
    };
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            eprintln!("warning: unknown {} entry `{}`", context, key);
        }
    }
}
