pub mod catalog;
pub mod client;
mod constants;
pub mod events;
pub mod http;
mod layout;
mod options;
mod session;
pub mod snapshot;
mod types;

pub use catalog::TemplateCatalog;
pub use client::{JobState, PrintJob, PrintJobClient, PrintJobId, SizeOverride};
pub use constants::{DEFAULT_DPI, PAPER_SIZES, SUPPORTED_DPIS};
pub use events::{Decision, FailureStage, ListenerId};
pub use http::{HttpClient, HttpResponse, TransportError};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use layout::{build_layout, PageLayout};
pub use options::*;
pub use session::*;
pub use snapshot::{
    HtmlSurfaceHost, LiveMap, LonLat, MapLayer, MapSnapshot, MapState, PrintMapSnapshotter,
};
pub use types::*;
