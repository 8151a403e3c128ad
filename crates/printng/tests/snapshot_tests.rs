mod common;

use common::*;
use printng::snapshot::{LayerKind, RenderSurface, SurfaceHost};
use printng::*;

#[test]
fn test_a4_snapshot_size_at_96_dpi() {
    let host = HtmlSurfaceHost::new();
    let snapshotter = PrintMapSnapshotter::new(host.clone());

    let snapshot = snapshotter
        .snapshot(&sample_map(), [210.0, 297.0], Units::Mm, 96)
        .unwrap();
    assert_eq!((snapshot.width(), snapshot.height()), (794, 1123));
    assert_eq!(host.attached(), 1);

    drop(snapshot);
    assert_eq!(host.attached(), 0);
}

#[test]
fn test_only_visible_tiled_layers_are_copied() {
    let snapshotter = PrintMapSnapshotter::new(HtmlSurfaceHost::new());
    let map = sample_map();

    let snapshot = snapshotter
        .snapshot(&map, [8.5, 11.0], Units::In, 96)
        .unwrap();
    let names: Vec<&str> = snapshot
        .view()
        .layers
        .iter()
        .map(|layer| layer.name.as_str())
        .collect();
    assert_eq!(names, vec!["base", "roads"]);
    assert!(
        snapshot
            .view()
            .layers
            .iter()
            .all(|layer| layer.kind == LayerKind::Tiled)
    );

    // The live map is left as it was.
    assert_eq!(map.layers.len(), 4);
}

#[test]
fn test_center_and_zoom_are_preserved() {
    let snapshotter = PrintMapSnapshotter::new(HtmlSurfaceHost::new());
    let map = sample_map();

    let snapshot = snapshotter
        .snapshot(&map, [11.0, 8.5], Units::In, 96)
        .unwrap();
    assert_eq!(snapshot.view().center, map.center);
    assert_eq!(snapshot.view().zoom, 7);
    assert!(snapshot.markup().contains("data-zoom=\"7\""));
}

#[test]
fn test_release_detaches_surface() {
    let host = HtmlSurfaceHost::new();
    let snapshotter = PrintMapSnapshotter::new(host.clone());

    let first = snapshotter
        .snapshot(&sample_map(), [210.0, 297.0], Units::Mm, 96)
        .unwrap();
    let second = snapshotter
        .snapshot(&sample_map(), [297.0, 420.0], Units::Mm, 96)
        .unwrap();
    assert_eq!(host.attached(), 2);

    first.release();
    assert_eq!(host.attached(), 1);
    second.release();
    assert_eq!(host.attached(), 0);
}

#[test]
fn test_invalid_inputs_are_snapshot_errors() {
    let host = HtmlSurfaceHost::new();
    let snapshotter = PrintMapSnapshotter::new(host.clone());
    let map = sample_map();

    assert!(matches!(
        snapshotter.snapshot(&map, [210.0, 297.0], Units::Mm, 0),
        Err(PrintError::Snapshot(_))
    ));
    assert!(matches!(
        snapshotter.snapshot(&map, [0.0, 297.0], Units::Mm, 96),
        Err(PrintError::Snapshot(_))
    ));
    assert_eq!(host.attached(), 0);
}

#[test]
fn test_surface_markup_sits_at_origin() {
    let host = HtmlSurfaceHost::new();
    let view = snapshot::MapView {
        center: LonLat::new(0.0, 0.0),
        zoom: 1,
        layers: Vec::new(),
        width_px: 10,
        height_px: 10,
    };
    let mut surface = host.create_surface(&view).unwrap();
    let markup = surface.markup();
    assert!(markup.contains("left:0px; top:0px;"));
    assert!(!markup.contains("-5000"));
    assert!(surface.is_attached());

    surface.detach();
    assert!(!surface.is_attached());
    assert_eq!(host.attached(), 0);
}

#[tokio::test]
async fn test_map_state_loads_from_json() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("map.json");
    tokio::fs::write(
        &path,
        r#"{"center": {"lon": 2.35, "lat": 48.85}, "zoom": 12,
            "layers": [{"name": "osm", "url": "http://tiles/osm"},
                       {"name": "draw", "kind": "vector"}]}"#,
    )
    .await
    .unwrap();

    let map = MapState::load(&path).await.unwrap();
    assert_eq!(map.zoom, 12);
    assert!(map.layers[0].is_printable());
    assert!(!map.layers[1].is_printable());
}
