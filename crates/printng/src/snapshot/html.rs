//! Headless HTML surfaces and a plain-data map

use super::{LiveMap, LonLat, MapLayer, MapView, RenderSurface, SurfaceHost};
use crate::constants::PRINT_MAP_ELEMENT_ID;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Map described by data only, e.g. loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapState {
    pub center: LonLat,
    pub zoom: u32,
    #[serde(default)]
    pub layers: Vec<MapLayer>,
}

impl MapState {
    /// Load a map description from a JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl LiveMap for MapState {
    fn center(&self) -> LonLat {
        self.center
    }

    fn zoom(&self) -> u32 {
        self.zoom
    }

    fn layers(&self) -> &[MapLayer] {
        &self.layers
    }
}

/// Builds print maps as detached HTML elements, positioned outside the
/// visible page. Keeps count of surfaces that are still attached.
#[derive(Debug, Clone, Default)]
pub struct HtmlSurfaceHost {
    attached: Arc<AtomicUsize>,
}

impl HtmlSurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces created and not yet detached
    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }
}

impl SurfaceHost for HtmlSurfaceHost {
    type Surface = HtmlSurface;

    fn create_surface(&self, view: &MapView) -> Result<HtmlSurface> {
        if view.width_px == 0 || view.height_px == 0 {
            return Err(PrintError::Snapshot(format!(
                "Cannot create a {}x{} px surface",
                view.width_px, view.height_px
            )));
        }
        self.attached.fetch_add(1, Ordering::SeqCst);
        Ok(HtmlSurface {
            markup: render_map_element(view),
            width: view.width_px,
            height: view.height_px,
            attached: Some(self.attached.clone()),
        })
    }
}

/// Surface created by [`HtmlSurfaceHost`]
#[derive(Debug)]
pub struct HtmlSurface {
    markup: String,
    width: u32,
    height: u32,
    attached: Option<Arc<AtomicUsize>>,
}

impl HtmlSurface {
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }
}

impl RenderSurface for HtmlSurface {
    fn markup(&self) -> String {
        self.markup.clone()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn detach(&mut self) {
        if let Some(counter) = self.attached.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

fn render_map_element(view: &MapView) -> String {
    let mut html = String::new();
    // The map element itself sits at the container origin.
    let _ = write!(
        html,
        "<div id=\"{}\" class=\"olMap\" style=\"position:absolute; left:0px; top:0px; width:{}px; height:{}px;\" data-center=\"{},{}\" data-zoom=\"{}\">",
        PRINT_MAP_ELEMENT_ID,
        view.width_px,
        view.height_px,
        view.center.lon,
        view.center.lat,
        view.zoom
    );
    for (index, layer) in view.layers.iter().enumerate() {
        let _ = write!(
            html,
            "<div class=\"olLayerDiv\" data-layer=\"{}\" style=\"position:absolute; z-index:{}; opacity:{};\"",
            escape_attr(&layer.name),
            100 + index,
            layer.opacity
        );
        if let Some(url) = &layer.url {
            let _ = write!(html, " data-url=\"{}\"", escape_attr(url));
        }
        html.push_str("></div>");
    }
    html.push_str("</div>");
    html
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
