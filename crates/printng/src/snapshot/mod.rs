//! Print map snapshots
//!
//! A snapshot is an isolated copy of the interactive map, sized in pixels
//! for the target paper and resolution:
//! 1. Convert the paper size to pixels at the requested dpi
//! 2. Copy center and zoom, keep only visible tiled layers
//! 3. Ask the surface host for an off-screen surface of that size

mod html;

pub use html::{HtmlSurface, HtmlSurfaceHost, MapState};

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Geographic map position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Rendering category of a map layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Tile-grid rendered layer (WMS, XYZ, ...)
    #[default]
    Tiled,
    Vector,
    Image,
    Markers,
}

/// A map layer as seen by the printing code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl MapLayer {
    pub fn tiled(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Tiled,
            url: Some(url.into()),
            visible: true,
            opacity: 1.0,
        }
    }

    /// Whether this layer ends up in a print snapshot
    pub fn is_printable(&self) -> bool {
        self.visible && self.kind == LayerKind::Tiled
    }
}

/// Read access to the interactive map being printed
pub trait LiveMap {
    fn center(&self) -> LonLat;
    fn zoom(&self) -> u32;
    fn layers(&self) -> &[MapLayer];
}

/// Map state copied into a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: LonLat,
    pub zoom: u32,
    pub layers: Vec<MapLayer>,
    pub width_px: u32,
    pub height_px: u32,
}

/// An off-screen rendering surface
pub trait RenderSurface {
    /// Serialized markup of the rendered map element
    fn markup(&self) -> String;
    /// Measured width in pixels
    fn width(&self) -> u32;
    /// Measured height in pixels
    fn height(&self) -> u32;
    /// Remove the surface from its host. Called once.
    fn detach(&mut self);
}

/// Creates off-screen surfaces for snapshots
pub trait SurfaceHost {
    type Surface: RenderSurface;

    fn create_surface(&self, view: &MapView) -> Result<Self::Surface>;
}

/// Isolated, fixed-size copy of a map. The surface is released when the
/// snapshot is dropped.
#[derive(Debug)]
pub struct MapSnapshot<S: RenderSurface> {
    view: MapView,
    surface: Option<S>,
}

impl<S: RenderSurface> MapSnapshot<S> {
    pub fn new(view: MapView, surface: S) -> Self {
        Self {
            view,
            surface: Some(surface),
        }
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.surface
            .as_ref()
            .map_or(self.view.width_px, |surface| surface.width())
    }

    pub fn height(&self) -> u32 {
        self.surface
            .as_ref()
            .map_or(self.view.height_px, |surface| surface.height())
    }

    pub fn markup(&self) -> String {
        self.surface
            .as_ref()
            .map(|surface| surface.markup())
            .unwrap_or_default()
    }

    /// Detach the surface now instead of at drop
    pub fn release(mut self) {
        self.detach_surface();
    }

    fn detach_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.detach();
        }
    }
}

impl<S: RenderSurface> Drop for MapSnapshot<S> {
    fn drop(&mut self) {
        self.detach_surface();
    }
}

/// Pixel size of `paper` (in `units`) printed at `dpi`
pub fn pixel_dimensions(paper: [f64; 2], units: Units, dpi: u32) -> (u32, u32) {
    let factor = units.inches_per_unit() * f64::from(dpi);
    (
        (paper[0] * factor).round() as u32,
        (paper[1] * factor).round() as u32,
    )
}

/// Builds print snapshots on surfaces provided by `H`
#[derive(Debug, Clone)]
pub struct PrintMapSnapshotter<H> {
    host: H,
}

impl<H: SurfaceHost> PrintMapSnapshotter<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn snapshot<M: LiveMap + ?Sized>(
        &self,
        map: &M,
        paper: [f64; 2],
        units: Units,
        dpi: u32,
    ) -> Result<MapSnapshot<H::Surface>> {
        if dpi == 0 {
            return Err(PrintError::Snapshot("Resolution must be positive".to_string()));
        }
        if !(paper[0] > 0.0 && paper[1] > 0.0) {
            return Err(PrintError::Snapshot(format!(
                "Invalid paper size {}x{}{}",
                paper[0], paper[1], units
            )));
        }

        let (width_px, height_px) = pixel_dimensions(paper, units, dpi);
        let layers: Vec<MapLayer> = map
            .layers()
            .iter()
            .filter(|layer| layer.is_printable())
            .cloned()
            .collect();

        log::debug!(
            "Print map {}x{} px at {} dpi with {} of {} layers",
            width_px,
            height_px,
            dpi,
            layers.len(),
            map.layers().len()
        );

        let view = MapView {
            center: map.center(),
            zoom: map.zoom(),
            layers,
            width_px,
            height_px,
        };
        let surface = self.host.create_surface(&view)?;
        Ok(MapSnapshot::new(view, surface))
    }
}
