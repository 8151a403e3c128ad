use crate::constants::{DEFAULT_DPI, DEFAULT_TIMEOUT_SECS, SUPPORTED_DPIS};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Current print options of a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub page_units: Units,
    pub page_size: PageSize,
    /// Accepted and stored, but not part of the generated page rule
    pub page_orientation: Orientation,
    pub page_margins: Option<PageMargins>,
    pub active_template_id: Option<TemplateId>,
    pub custom_params: BTreeMap<String, serde_json::Value>,
}

/// Partial update to [`PrintOptions`]. Only the fields that are `Some`
/// are applied and reported as changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptionsPatch {
    pub page_units: Option<Units>,
    pub page_size: Option<PageSize>,
    pub page_orientation: Option<Orientation>,
    pub page_margins: Option<PageMargins>,
    pub active_template_id: Option<TemplateId>,
    pub custom_params: Option<BTreeMap<String, serde_json::Value>>,
}

/// Names of the individual print options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    PageUnits,
    PageSize,
    PageOrientation,
    PageMargins,
    ActiveTemplate,
    CustomParams,
}

impl OptionKey {
    pub fn name(self) -> &'static str {
        match self {
            OptionKey::PageUnits => "pageUnits",
            OptionKey::PageSize => "pageSize",
            OptionKey::PageOrientation => "pageOrientation",
            OptionKey::PageMargins => "pageMargins",
            OptionKey::ActiveTemplate => "activeTemplate",
            OptionKey::CustomParams => "customParams",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PrintOptionsPatch {
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Keys this patch modifies, in declaration order
    pub fn keys(&self) -> Vec<OptionKey> {
        let mut keys = Vec::new();
        if self.page_units.is_some() {
            keys.push(OptionKey::PageUnits);
        }
        if self.page_size.is_some() {
            keys.push(OptionKey::PageSize);
        }
        if self.page_orientation.is_some() {
            keys.push(OptionKey::PageOrientation);
        }
        if self.page_margins.is_some() {
            keys.push(OptionKey::PageMargins);
        }
        if self.active_template_id.is_some() {
            keys.push(OptionKey::ActiveTemplate);
        }
        if self.custom_params.is_some() {
            keys.push(OptionKey::CustomParams);
        }
        keys
    }

    pub fn page_units(mut self, units: Units) -> Self {
        self.page_units = Some(units);
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn page_orientation(mut self, orientation: Orientation) -> Self {
        self.page_orientation = Some(orientation);
        self
    }

    pub fn page_margins(mut self, margins: PageMargins) -> Self {
        self.page_margins = Some(margins);
        self
    }

    pub fn active_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.active_template_id = Some(id.into());
        self
    }

    pub fn custom_params(mut self, params: BTreeMap<String, serde_json::Value>) -> Self {
        self.custom_params = Some(params);
        self
    }
}

impl PrintOptions {
    /// Return a copy of these options with `patch` applied
    pub fn merged(&self, patch: &PrintOptionsPatch) -> PrintOptions {
        let mut merged = self.clone();
        if let Some(units) = patch.page_units {
            merged.page_units = units;
        }
        if let Some(size) = &patch.page_size {
            merged.page_size = size.clone();
        }
        if let Some(orientation) = patch.page_orientation {
            merged.page_orientation = orientation;
        }
        if let Some(margins) = &patch.page_margins {
            merged.page_margins = Some(margins.clone());
        }
        if let Some(id) = &patch.active_template_id {
            merged.active_template_id = Some(id.clone());
        }
        if let Some(params) = &patch.custom_params {
            merged.custom_params = params.clone();
        }
        merged
    }

    /// Paper dimensions and units used to size the print map.
    ///
    /// Named sizes resolve through `presets` with the orientation applied;
    /// numeric sizes are used as given.
    pub fn paper_dimensions(&self, presets: &[PaperPreset]) -> Result<([f64; 2], Units)> {
        match &self.page_size {
            PageSize::Dimensions(size) => Ok((*size, self.page_units)),
            PageSize::Named(name) => PaperPreset::find(presets, name)
                .map(|preset| {
                    (
                        preset.dimensions_with_orientation(self.page_orientation),
                        preset.units,
                    )
                })
                .ok_or_else(|| PrintError::UnknownPaperSize(name.clone())),
        }
    }
}

/// Print feature configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintConfig {
    /// Base URL of the PrintNG print service. Printing is disabled without it.
    pub print_service: Option<String>,
    /// URL of the template source, without a trailing slash
    pub template_service: Option<String>,
    /// Load templates as soon as the session starts
    pub auto_load: bool,
    pub page_units: Units,
    pub page_size: PageSize,
    pub page_orientation: Orientation,
    pub page_margins: Option<PageMargins>,
    pub custom_params: BTreeMap<String, serde_json::Value>,
    pub dpi: u32,
    /// Paper sizes offered for selection
    pub paper_sizes: Vec<PaperPreset>,
    /// Print resolutions offered, in dpi
    pub resolutions: Vec<u32>,
    pub timeout_secs: u64,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            print_service: None,
            template_service: None,
            auto_load: true,
            page_units: Units::default(),
            page_size: PageSize::default(),
            page_orientation: Orientation::default(),
            page_margins: None,
            custom_params: BTreeMap::new(),
            dpi: DEFAULT_DPI,
            paper_sizes: PaperPreset::defaults(),
            resolutions: SUPPORTED_DPIS.to_vec(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Command line or host overrides applied on top of a loaded configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub print_service: Option<String>,
    pub template_service: Option<String>,
    pub dpi: Option<u32>,
    pub options: PrintOptionsPatch,
}

impl PrintConfig {
    /// Load configuration from a JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| PrintError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrintError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.print_service.as_deref() {
            None => {
                return Err(PrintError::Config(
                    "No print service configured".to_string(),
                ));
            }
            Some(url) if url.trim().is_empty() => {
                return Err(PrintError::Config("Print service URL is empty".to_string()));
            }
            Some(_) => {}
        }

        if self.dpi == 0 || self.resolutions.contains(&0) {
            return Err(PrintError::Config("Resolution must be positive".to_string()));
        }
        if !self.resolutions.contains(&self.dpi) {
            return Err(PrintError::Config(format!(
                "Resolution {} dpi is not among the offered resolutions {:?}",
                self.dpi, self.resolutions
            )));
        }

        if let Some(preset) = self
            .paper_sizes
            .iter()
            .find(|preset| preset.size.iter().any(|length| *length <= 0.0))
        {
            return Err(PrintError::Config(format!(
                "Paper size {} must have positive dimensions",
                preset.name
            )));
        }

        Ok(())
    }

    /// Find a configured paper size by name, ignoring case
    pub fn find_paper(&self, name: &str) -> Option<&PaperPreset> {
        PaperPreset::find(&self.paper_sizes, name)
    }

    /// Return a copy with `overrides` applied; `self` is left untouched
    pub fn merged(&self, overrides: &ConfigOverrides) -> PrintConfig {
        let mut merged = self.clone();
        if let Some(url) = &overrides.print_service {
            merged.print_service = Some(url.clone());
        }
        if let Some(url) = &overrides.template_service {
            merged.template_service = Some(url.clone());
        }
        if let Some(dpi) = overrides.dpi {
            merged.dpi = dpi;
        }
        let options = merged.initial_options().merged(&overrides.options);
        merged.page_units = options.page_units;
        merged.page_size = options.page_size;
        merged.page_orientation = options.page_orientation;
        merged.page_margins = options.page_margins;
        merged.custom_params = options.custom_params;
        merged
    }

    /// Print options a new session starts with
    pub fn initial_options(&self) -> PrintOptions {
        PrintOptions {
            page_units: self.page_units,
            page_size: self.page_size.clone(),
            page_orientation: self.page_orientation,
            page_margins: self.page_margins.clone(),
            active_template_id: None,
            custom_params: self.custom_params.clone(),
        }
    }
}
