#![allow(dead_code)]

use printng::*;
use std::collections::VecDeque;
use std::result::Result as StdResult;
use std::sync::{Arc, Mutex};

pub const PRINT_SERVICE: &str = "http://geo.example/printng/render/";
pub const TEMPLATE_SERVICE: &str = "http://geo.example/printng/templates";

/// A request seen by [`MockHttp`]
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get { url: String },
    PostForm { url: String, form: Vec<(String, String)> },
}

impl Request {
    pub fn url(&self) -> &str {
        match self {
            Request::Get { url } | Request::PostForm { url, .. } => url,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Request::PostForm { form, .. } => form
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            Request::Get { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<StdResult<HttpResponse, TransportError>>,
    requests: Vec<Request>,
}

/// Scripted HTTP client. Responses are returned in the order queued;
/// an empty queue answers with a transport error.
#[derive(Debug, Clone, Default)]
pub struct MockHttp {
    state: Arc<Mutex<MockState>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(TransportError::new(message)));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    fn answer(&self, request: Request) -> StdResult<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response")))
    }
}

impl HttpClient for MockHttp {
    async fn get(&self, url: &str) -> StdResult<HttpResponse, TransportError> {
        self.answer(Request::Get {
            url: url.to_string(),
        })
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> StdResult<HttpResponse, TransportError> {
        self.answer(Request::PostForm {
            url: url.to_string(),
            form: form.to_vec(),
        })
    }
}

/// Records every URL handed to it
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl DocumentOpener for RecordingOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub fn templates_json() -> &'static str {
    r#"[
        {"id": 3, "title": "Plain"},
        {"id": "7", "title": "Legend"},
        {"id": 9, "title": "Poster"}
    ]"#
}

pub fn print_response(url: &str) -> String {
    format!(r#"{{"getURL":"{}"}}"#, url)
}

pub fn config() -> PrintConfig {
    PrintConfig {
        print_service: Some(PRINT_SERVICE.to_string()),
        template_service: Some(TEMPLATE_SERVICE.to_string()),
        ..Default::default()
    }
}

pub fn sample_map() -> MapState {
    let mut hidden = MapLayer::tiled("hidden", "http://tiles/hidden");
    hidden.visible = false;
    let mut markers = MapLayer::tiled("pins", "http://markers/pins");
    markers.kind = snapshot::LayerKind::Markers;

    MapState {
        center: LonLat::new(-77.03, 38.89),
        zoom: 7,
        layers: vec![
            MapLayer::tiled("base", "http://tiles/base"),
            hidden,
            markers,
            MapLayer::tiled("roads", "http://tiles/roads"),
        ],
    }
}

pub type TestSession = PrintSession<MockHttp, HtmlSurfaceHost, RecordingOpener>;

/// Session with the sample templates loaded; template "7" is active
pub async fn loaded_session(http: &MockHttp) -> TestSession {
    http.respond(200, templates_json());
    let mut session = PrintSession::new(
        config(),
        http.clone(),
        HtmlSurfaceHost::new(),
        RecordingOpener::default(),
    )
    .unwrap();
    session.start().await.unwrap();
    session
}
