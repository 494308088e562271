// Run defaults loaded from settings.toml
//
// Lookup: explicit path, else <config_dir>/lotegen/settings.toml, else
// built-in defaults. Missing keys fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lotegen_engine::event::DEFAULT_REQUESTER_ID;
use lotegen_engine::header::{DEFAULT_MIN_FILLED_CELLS, DEFAULT_PROCESS_LABEL};
use lotegen_engine::resolver::DEFAULT_FUZZY_THRESHOLD;
use lotegen_engine::{ColumnResolver, Event, FieldMapping, HeaderLocator};

use crate::error::ConfigError;

/// Template file used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "testesLotes.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub template: PathBuf,
    pub requester_id: String,
    pub columns: ColumnSettings,
    pub header: HeaderSettings,
    pub resolver: ResolverSettings,
}

/// Free-text column names typed for each logical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSettings {
    pub process: String,
    #[serde(rename = "HC30%")]
    pub hc30: String,
    #[serde(rename = "HCP")]
    pub hcp: String,
    #[serde(rename = "CALCS")]
    pub calcs: String,
    #[serde(rename = "HSP")]
    pub hsp: String,
    #[serde(rename = "CALCP")]
    pub calcp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSettings {
    pub min_filled_cells: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub fuzzy_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            requester_id: DEFAULT_REQUESTER_ID.to_string(),
            columns: ColumnSettings::default(),
            header: HeaderSettings::default(),
            resolver: ResolverSettings::default(),
        }
    }
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            process: DEFAULT_PROCESS_LABEL.to_string(),
            hc30: "Contratual - 30%".to_string(),
            hcp: "Contratual CHM".to_string(),
            calcs: "Agosto.2025 - SUCUMBENCIA".to_string(),
            hsp: "Sucumb. Preço".to_string(),
            calcp: "Agosto.2025 - PRINCIPAL".to_string(),
        }
    }
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self { min_filled_cells: DEFAULT_MIN_FILLED_CELLS }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self { fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD }
    }
}

impl ColumnSettings {
    pub fn event(&self, event: Event) -> &str {
        match event {
            Event::Hc30 => &self.hc30,
            Event::Hcp => &self.hcp,
            Event::Calcs => &self.calcs,
            Event::Hsp => &self.hsp,
            Event::Calcp => &self.calcp,
        }
    }

    pub fn event_mut(&mut self, event: Event) -> &mut String {
        match event {
            Event::Hc30 => &mut self.hc30,
            Event::Hcp => &mut self.hcp,
            Event::Calcs => &mut self.calcs,
            Event::Hsp => &mut self.hsp,
            Event::Calcp => &mut self.calcp,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lotegen")
            .join("settings.toml")
    }

    /// Load settings. An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path();
                if !p.exists() {
                    tracing::debug!(path = %p.display(), "no settings file, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let contents = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Read { path: path.clone(), reason: e.to_string() })?;
        let settings = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.resolver.fuzzy_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "resolver.fuzzy_threshold must be in (0, 1], got {t}"
            )));
        }
        if self.header.min_filled_cells == 0 {
            return Err(ConfigError::Validation(
                "header.min_filled_cells must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Operator request built from the configured column texts. Blank event
    /// texts leave the event unmapped.
    pub fn field_mapping(&self) -> FieldMapping {
        let mut mapping = FieldMapping::new(self.columns.process.trim());
        for event in Event::ALL {
            let text = self.columns.event(event).trim();
            if !text.is_empty() {
                mapping = mapping.with_event(event, text);
            }
        }
        mapping.with_requester(self.requester_id.as_str())
    }

    pub fn header_locator(&self) -> HeaderLocator {
        HeaderLocator::new(Some(self.columns.process.as_str()))
            .with_min_filled(self.header.min_filled_cells)
    }

    pub fn column_resolver(&self) -> ColumnResolver {
        ColumnResolver::new(self.resolver.fuzzy_threshold)
    }

    /// Write the commented default file. Refuses to overwrite.
    pub fn init_file(path: &Path) -> Result<(), ConfigError> {
        let write_err = |reason: String| ConfigError::Write { path: path.to_path_buf(), reason };
        if path.exists() {
            return Err(write_err("file already exists".into()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        fs::write(path, DEFAULT_FILE).map_err(|e| write_err(e.to_string()))
    }
}

const DEFAULT_FILE: &str = r#"# lotegen settings
#
# Command-line flags override every value here.

# Template whose first row defines the output columns.
# Outputs are written next to it.
template = "testesLotes.xlsx"

# Written into SOLICITADO_POR.
requester_id = "45270"

# Column texts as typed by the operator. Matching tolerates case, accents,
# spacing, small typos and partial names.
[columns]
process = "Número do Processo"
"HC30%" = "Contratual - 30%"
HCP = "Contratual CHM"
CALCS = "Agosto.2025 - SUCUMBENCIA"
HSP = "Sucumb. Preço"
CALCP = "Agosto.2025 - PRINCIPAL"

[header]
# Fallback when no row contains the process label.
min_filled_cells = 3

[resolver]
# Similarity ratio (0-1] accepted by the fuzzy stage.
fuzzy_threshold = 0.8
"#;
