//! Print template catalog

use crate::events::{Channel, TemplatesLoaded};
use crate::http::HttpClient;
use crate::types::*;

/// Index of the template selected after a load
const DEFAULT_ACTIVE_INDEX: usize = 1;

/// Templates offered by the template service and the active selection
#[derive(Debug, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    /// Position of the active template in `templates`
    active: Option<usize>,
    /// Published after every successful load
    pub loaded: Channel<TemplatesLoaded>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the template list from `source_url`, replacing the current one.
    ///
    /// On failure the previous templates and selection are kept.
    pub async fn load<C: HttpClient>(&mut self, http: &C, source_url: &str) -> Result<&[Template]> {
        let response = http
            .get(source_url)
            .await
            .map_err(|e| PrintError::TemplateLoad(e.to_string()))?;

        if !response.is_success() {
            return Err(PrintError::TemplateLoad(format!(
                "HTTP {} from {}",
                response.status, source_url
            )));
        }

        let templates: Vec<Template> = serde_json::from_str(&response.body)
            .map_err(|e| PrintError::TemplateLoad(format!("Invalid template list: {}", e)))?;

        log::info!("Loaded {} print templates", templates.len());
        self.replace(templates);
        Ok(&self.templates)
    }

    /// Install a new template list and select the default template
    pub fn replace(&mut self, templates: Vec<Template>) {
        self.templates = templates;
        self.active = (DEFAULT_ACTIVE_INDEX < self.templates.len()).then_some(DEFAULT_ACTIVE_INDEX);

        let event = TemplatesLoaded {
            templates: self.templates.clone(),
            active: self.active().map(|template| template.id.clone()),
        };
        self.loaded.emit(&event);
    }

    /// Select the template with `id`. Unknown ids are ignored.
    pub fn set_active(&mut self, id: &TemplateId) -> bool {
        match self.templates.iter().position(|template| &template.id == id) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => {
                log::debug!("Ignoring unknown template id {}", id);
                false
            }
        }
    }

    pub fn active(&self) -> Option<&Template> {
        self.active.and_then(|index| self.templates.get(index))
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|template| &template.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
