//! PrintNG print request client

use crate::constants::DOCUMENT_URL_FIELD;
use crate::http::{HttpClient, HttpResponse};
use crate::layout::PageLayout;
use crate::snapshot::{MapSnapshot, RenderSurface};
use crate::types::*;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a print job within this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintJobId(u64);

impl PrintJobId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PrintJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "print-job-{}", self.0)
    }
}

/// Lifecycle of a print job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Building,
    Sent,
    Succeeded { document_url: String },
    Failed { detail: String },
}

/// One print request, from building to resolution
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: PrintJobId,
    pub template_id: TemplateId,
    pub map_id: String,
    pub target_url: String,
    pub layout: PageLayout,
    pub state: JobState,
}

impl PrintJob {
    pub fn new(
        print_service: &str,
        template_id: TemplateId,
        map_id: impl Into<String>,
        layout: PageLayout,
    ) -> Self {
        let map_id = map_id.into();
        let target_url = target_url(print_service, &template_id, &map_id);
        Self {
            id: PrintJobId::next(),
            template_id,
            map_id,
            target_url,
            layout,
            state: JobState::Building,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            self.state,
            JobState::Succeeded { .. } | JobState::Failed { .. }
        )
    }
}

/// Explicit print size in pixels, replacing the snapshot's measured size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeOverride {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// `<base>/<template>/<map>`; ids are not escaped.
pub fn target_url(print_service: &str, template_id: &TemplateId, map_id: &str) -> String {
    let separator = if print_service.ends_with('/') { "" } else { "/" };
    format!("{}{}{}/{}", print_service, separator, template_id, map_id)
}

#[derive(serde::Deserialize)]
struct PrintResponse {
    #[serde(rename = "getURL")]
    get_url: Option<String>,
}

/// Sends print requests to the PrintNG service
#[derive(Debug, Clone)]
pub struct PrintJobClient<C> {
    http: C,
    print_service: String,
}

impl<C: HttpClient> PrintJobClient<C> {
    pub fn new(http: C, print_service: impl Into<String>) -> Self {
        Self {
            http,
            print_service: print_service.into(),
        }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn print_service(&self) -> &str {
        &self.print_service
    }

    /// Start a job for `template_id` and `map_id`
    pub fn create_job(
        &self,
        template_id: TemplateId,
        map_id: impl Into<String>,
        layout: PageLayout,
    ) -> PrintJob {
        PrintJob::new(&self.print_service, template_id, map_id, layout)
    }

    /// Send `job` with the map `snapshot` and return the document URL.
    ///
    /// The snapshot is released once the request body is built.
    pub async fn submit<S: RenderSurface>(
        &self,
        job: &mut PrintJob,
        snapshot: MapSnapshot<S>,
        size: Option<SizeOverride>,
    ) -> Result<String> {
        let form = request_form(&job.layout, &snapshot, size.unwrap_or_default());
        snapshot.release();

        job.state = JobState::Sent;
        log::debug!("Submitting {} to {}", job.id, job.target_url);

        let result = self.send(&job.target_url, &form).await;
        job.state = match &result {
            Ok(url) => JobState::Succeeded {
                document_url: url.clone(),
            },
            Err(e) => JobState::Failed {
                detail: e.to_string(),
            },
        };
        result
    }

    async fn send(&self, url: &str, form: &[(String, String)]) -> Result<String> {
        let response = self
            .http
            .post_form(url, form)
            .await
            .map_err(|e| PrintError::PrintTransport {
                message: e.message,
                response: None,
            })?;

        if !response.is_success() {
            return Err(PrintError::PrintTransport {
                message: format!("HTTP {} from print service", response.status),
                response: Some(response),
            });
        }

        document_url(response)
    }
}

fn request_form<S: RenderSurface>(
    layout: &PageLayout,
    snapshot: &MapSnapshot<S>,
    size: SizeOverride,
) -> Vec<(String, String)> {
    let mut form = vec![
        ("styles".to_string(), layout.style_element()),
        ("map_html".to_string(), snapshot.markup()),
    ];
    // A zero override counts as no override
    let width = size.width.filter(|w| *w > 0).unwrap_or_else(|| snapshot.width());
    let height = size.height.filter(|h| *h > 0).unwrap_or_else(|| snapshot.height());
    if width > 0 {
        form.push(("width".to_string(), width.to_string()));
    }
    if height > 0 {
        form.push(("height".to_string(), height.to_string()));
    }
    form
}

fn document_url(response: HttpResponse) -> Result<String> {
    match serde_json::from_str::<PrintResponse>(&response.body) {
        Ok(PrintResponse { get_url: Some(url) }) => Ok(url),
        _ => {
            log::warn!("Print response lacks `{}`", DOCUMENT_URL_FIELD);
            Err(PrintError::MalformedResponse {
                status: response.status,
                body: response.body,
            })
        }
    }
}
