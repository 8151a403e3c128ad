//! Print session: owns the print options and runs print operations
//!
//! A print goes through these steps:
//! 1. Apply option overrides and ask `before_print` listeners
//! 2. Check the active template and resolve the paper size
//! 3. Snapshot the map and submit it to the print service
//! 4. Offer the document to `before_download` listeners and open it

use crate::catalog::TemplateCatalog;
use crate::client::{PrintJob, PrintJobClient, PrintJobId, SizeOverride};
use crate::events::*;
use crate::http::{HttpClient, HttpResponse};
use crate::layout::PageLayout;
use crate::options::{OptionKey, PrintConfig, PrintOptions, PrintOptionsPatch};
use crate::snapshot::{LiveMap, PrintMapSnapshotter, SurfaceHost};
use crate::types::*;

/// Presents a finished document to the user
pub trait DocumentOpener {
    fn open(&mut self, url: &str) -> Result<()>;
}

impl<F> DocumentOpener for F
where
    F: FnMut(&str) -> Result<()>,
{
    fn open(&mut self, url: &str) -> Result<()> {
        self(url)
    }
}

/// Where the session is in its workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    OptionsChanged,
    /// Building the print map
    Previewing,
    /// Print request sent, waiting for the service
    Submitted,
}

impl SessionState {
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Previewing | SessionState::Submitted)
    }
}

/// Parameters of one print call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrintRequest {
    /// Map identifier appended to the print URL
    pub map_id: String,
    /// Options applied through `set_options` before printing
    pub options: Option<PrintOptionsPatch>,
    pub size: Option<SizeOverride>,
    /// Print resolution, defaults to the configured one
    pub dpi: Option<u32>,
}

impl PrintRequest {
    pub fn new(map_id: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, patch: PrintOptionsPatch) -> Self {
        self.options = Some(patch);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some(SizeOverride {
            width: Some(width),
            height: Some(height),
        });
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }
}

/// How a print or preview ended
#[derive(Debug)]
pub enum PrintOutcome {
    /// A `before_print` listener vetoed; nothing was sent
    Cancelled,
    /// Preview document ready, kept for [`PrintSession::commit`]
    Previewed { job: PrintJobId, url: String },
    /// Document handed to the opener
    Delivered { job: PrintJobId, url: String },
    /// Document exists but a `before_download` listener took over delivery
    Vetoed { job: PrintJobId, url: String },
    Failed {
        stage: FailureStage,
        error: PrintError,
    },
}

impl PrintOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            PrintOutcome::Previewed { url, .. }
            | PrintOutcome::Delivered { url, .. }
            | PrintOutcome::Vetoed { url, .. } => Some(url),
            PrintOutcome::Cancelled | PrintOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PrintOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Open,
    Preview,
}

/// Print options, template catalog and print pipeline of one map view
pub struct PrintSession<C, H, O> {
    config: PrintConfig,
    options: PrintOptions,
    layout: PageLayout,
    state: SessionState,
    catalog: TemplateCatalog,
    client: PrintJobClient<C>,
    snapshotter: PrintMapSnapshotter<H>,
    opener: O,
    events: SessionEvents,
    job: Option<PrintJob>,
    preview: Option<(PrintJobId, String)>,
}

impl<C, H, O> PrintSession<C, H, O>
where
    C: HttpClient,
    H: SurfaceHost,
    O: DocumentOpener,
{
    /// Create a session from a validated configuration
    pub fn new(config: PrintConfig, http: C, host: H, opener: O) -> Result<Self> {
        config.validate()?;
        let print_service = config.print_service.clone().unwrap_or_default();
        let options = config.initial_options();
        let layout = PageLayout::build(&options);

        Ok(Self {
            config,
            options,
            layout,
            state: SessionState::Idle,
            catalog: TemplateCatalog::new(),
            client: PrintJobClient::new(http, print_service),
            snapshotter: PrintMapSnapshotter::new(host),
            opener,
            events: SessionEvents::default(),
            job: None,
            preview: None,
        })
    }

    /// Load templates if the configuration asks for it
    pub async fn start(&mut self) -> Result<()> {
        if self.config.auto_load && self.config.template_service.is_some() {
            self.load_templates().await?;
        }
        Ok(())
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TemplateCatalog {
        &mut self.catalog
    }

    pub fn events_mut(&mut self) -> &mut SessionEvents {
        &mut self.events
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn surface_host(&self) -> &H {
        self.snapshotter.host()
    }

    /// Job currently in flight
    pub fn current_job(&self) -> Option<&PrintJob> {
        self.job.as_ref()
    }

    /// URL of the last previewed document, waiting for [`Self::commit`]
    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(|(_, url)| url.as_str())
    }

    /// Fetch templates from the configured template service
    pub async fn load_templates(&mut self) -> Result<&[Template]> {
        let Some(source) = self.config.template_service.clone() else {
            return Err(PrintError::Config(
                "No template service configured".to_string(),
            ));
        };
        if let Err(e) = self.catalog.load(self.client.http(), &source).await {
            log::warn!("{}", e);
            return Err(e);
        }
        self.sync_active_template();
        Ok(self.catalog.templates())
    }

    /// Merge `patch` into the options and rebuild the layout.
    ///
    /// Returns the changed keys, which are also sent to `options_changed`.
    /// A template id the catalog does not know is dropped from the patch.
    pub fn set_options(&mut self, mut patch: PrintOptionsPatch) -> Vec<OptionKey> {
        if let Some(id) = patch.active_template_id.take() {
            if self.catalog.set_active(&id) {
                patch.active_template_id = Some(id);
            } else {
                log::warn!("Template {} is not in the catalog", id);
            }
        }

        let changed = patch.keys();
        self.options = self.options.merged(&patch);
        self.sync_active_template();
        self.layout = PageLayout::build(&self.options);

        if !self.state.is_busy() {
            self.state = SessionState::OptionsChanged;
        }
        self.events.options_changed.emit(&OptionsChanged {
            changed: changed.clone(),
        });
        changed
    }

    /// Use `preset` as the page size, swapped for landscape pages
    pub fn select_paper(&mut self, preset: &PaperPreset) -> Vec<OptionKey> {
        let [width, height] = preset.dimensions_with_orientation(self.options.page_orientation);
        self.set_options(
            PrintOptionsPatch::default()
                .page_size(PageSize::dimensions(width, height))
                .page_units(preset.units),
        )
    }

    /// Select one of the configured paper sizes by name
    pub fn select_paper_named(&mut self, name: &str) -> Result<Vec<OptionKey>> {
        let preset = self
            .config
            .find_paper(name)
            .cloned()
            .ok_or_else(|| PrintError::UnknownPaperSize(name.to_string()))?;
        Ok(self.select_paper(&preset))
    }

    /// Mirror the catalog selection into the options
    fn sync_active_template(&mut self) {
        self.options.active_template_id = self.catalog.active().map(|template| template.id.clone());
    }

    /// Print `map` and open the resulting document
    pub async fn print<M: LiveMap + ?Sized>(
        &mut self,
        map: &M,
        request: PrintRequest,
    ) -> PrintOutcome {
        self.run(map, request, Delivery::Open).await
    }

    /// Print `map` but keep the document for a later [`Self::commit`]
    pub async fn preview<M: LiveMap + ?Sized>(
        &mut self,
        map: &M,
        request: PrintRequest,
    ) -> PrintOutcome {
        self.run(map, request, Delivery::Preview).await
    }

    /// Deliver the last previewed document
    pub fn commit(&mut self) -> PrintOutcome {
        let Some((job, url)) = self.preview.clone() else {
            return self.fail(FailureStage::Delivery, PrintError::NoDocument);
        };
        self.deliver(job, url)
    }

    async fn run<M: LiveMap + ?Sized>(
        &mut self,
        map: &M,
        request: PrintRequest,
        delivery: Delivery,
    ) -> PrintOutcome {
        if self.state.is_busy() {
            // Exclusive borrow means the previous call was dropped mid-flight.
            log::warn!("Discarding abandoned print job");
            self.job = None;
            self.state = SessionState::Idle;
        }

        if let Some(patch) = request.options.clone() {
            self.set_options(patch);
        }
        // The catalog may have been replaced through `catalog_mut`
        self.sync_active_template();

        let before = BeforePrint {
            map_id: request.map_id.clone(),
            options: self.options.clone(),
        };
        if self.events.before_print.emit(&before).is_veto() {
            log::info!("Print cancelled by listener");
            self.state = SessionState::Idle;
            return PrintOutcome::Cancelled;
        }

        let Some(template_id) = self.catalog.active().map(|template| template.id.clone()) else {
            return self.fail(FailureStage::Template, PrintError::NoActiveTemplate);
        };

        self.state = SessionState::Previewing;
        let dpi = request.dpi.unwrap_or(self.config.dpi);
        if !self.config.resolutions.contains(&dpi) {
            return self.fail(
                FailureStage::Snapshot,
                PrintError::Snapshot(format!("Resolution {} dpi is not offered", dpi)),
            );
        }
        let snapshot = match self
            .options
            .paper_dimensions(&self.config.paper_sizes)
            .and_then(|(paper, units)| self.snapshotter.snapshot(map, paper, units, dpi))
        {
            Ok(snapshot) => snapshot,
            Err(e) => return self.fail(FailureStage::Snapshot, e),
        };

        let mut job = self
            .client
            .create_job(template_id, request.map_id, self.layout.clone());
        let job_id = job.id;
        self.job = Some(job.clone());
        self.state = SessionState::Submitted;

        let result = self.client.submit(&mut job, snapshot, request.size).await;
        self.job = None;

        let url = match result {
            Ok(url) => url,
            Err(e) => return self.fail(FailureStage::Submit, e),
        };
        log::info!("{} produced {}", job_id, url);

        match delivery {
            Delivery::Preview => {
                self.preview = Some((job_id, url.clone()));
                self.state = SessionState::Idle;
                PrintOutcome::Previewed { job: job_id, url }
            }
            Delivery::Open => self.deliver(job_id, url),
        }
    }

    fn deliver(&mut self, job: PrintJobId, url: String) -> PrintOutcome {
        self.state = SessionState::Idle;
        let event = BeforeDownload { url: url.clone() };
        if self.events.before_download.emit(&event).is_veto() {
            log::info!("Download of {} handled by listener", url);
            return PrintOutcome::Vetoed { job, url };
        }

        match self.opener.open(&url) {
            Ok(()) => PrintOutcome::Delivered { job, url },
            Err(e) => self.fail(FailureStage::Delivery, e),
        }
    }

    fn fail(&mut self, stage: FailureStage, error: PrintError) -> PrintOutcome {
        log::warn!("Print failed at {} stage: {}", stage, error);
        self.job = None;
        self.state = SessionState::Idle;

        let response = match &error {
            PrintError::PrintTransport { response, .. } => response.clone(),
            PrintError::MalformedResponse { status, body } => {
                Some(HttpResponse::new(*status, body.clone()))
            }
            _ => None,
        };
        self.events.print_exception.emit(&PrintException {
            stage,
            message: error.to_string(),
            response,
        });
        PrintOutcome::Failed { stage, error }
    }
}
