mod common;

use common::*;
use printng::*;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_load_selects_second_template() {
    let http = MockHttp::new();
    http.respond(200, templates_json());
    let mut catalog = TemplateCatalog::new();

    let loaded = catalog.load(&http, TEMPLATE_SERVICE).await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(catalog.active().unwrap().id, TemplateId::new("7"));
    assert_eq!(http.requests(), vec![Request::Get {
        url: TEMPLATE_SERVICE.to_string()
    }]);
}

#[tokio::test]
async fn test_single_template_has_no_active_selection() {
    let http = MockHttp::new();
    http.respond(200, r#"[{"id": 1, "title": "Only"}]"#);
    let mut catalog = TemplateCatalog::new();

    catalog.load(&http, TEMPLATE_SERVICE).await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(catalog.active().is_none());
}

#[tokio::test]
async fn test_loaded_event_carries_active_id() {
    let http = MockHttp::new();
    http.respond(200, templates_json());
    let mut catalog = TemplateCatalog::new();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    catalog.loaded.subscribe(move |event: &events::TemplatesLoaded| {
        sink.lock()
            .unwrap()
            .push((event.templates.len(), event.active.clone()));
    });

    catalog.load(&http, TEMPLATE_SERVICE).await.unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(3, Some(TemplateId::new("7")))]
    );
}

#[tokio::test]
async fn test_failed_load_keeps_previous_catalog() {
    let http = MockHttp::new();
    http.respond(200, templates_json())
        .respond(500, "boom")
        .respond(200, "not json")
        .fail("connection refused");
    let mut catalog = TemplateCatalog::new();
    catalog.load(&http, TEMPLATE_SERVICE).await.unwrap();
    catalog.set_active(&TemplateId::new("9"));

    for _ in 0..3 {
        let result = catalog.load(&http, TEMPLATE_SERVICE).await;
        assert!(matches!(result, Err(PrintError::TemplateLoad(_))));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.active().unwrap().id, TemplateId::new("9"));
    }
}

#[test]
fn test_set_active_ignores_unknown_id() {
    let mut catalog = TemplateCatalog::new();
    catalog.replace(serde_json::from_str(templates_json()).unwrap());

    assert!(!catalog.set_active(&TemplateId::new("missing")));
    assert_eq!(catalog.active().unwrap().id, TemplateId::new("7"));

    assert!(catalog.set_active(&TemplateId::new("3")));
    assert_eq!(catalog.active().unwrap().title, "Plain");
    assert!(catalog.get(&TemplateId::new("9")).is_some());
}

#[test]
fn test_replace_with_empty_list() {
    let mut catalog = TemplateCatalog::new();
    catalog.replace(Vec::new());
    assert!(catalog.is_empty());
    assert!(catalog.active().is_none());
}
