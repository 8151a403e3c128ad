use printng::*;
use std::collections::BTreeMap;
use tempfile::TempDir;

#[test]
fn test_validation_requires_print_service() {
    let config = PrintConfig::default();
    match config.validate() {
        Err(PrintError::Config(msg)) => assert!(msg.contains("No print service")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    let blank = PrintConfig {
        print_service: Some("  ".to_string()),
        ..Default::default()
    };
    assert!(blank.validate().is_err());
}

#[test]
fn test_validation_rejects_zero_dpi() {
    let config = PrintConfig {
        print_service: Some("http://geo/print/".to_string()),
        dpi: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_config_defaults() {
    let config = PrintConfig::default();
    assert!(config.auto_load);
    assert_eq!(config.page_units, Units::Mm);
    assert_eq!(config.page_size, PageSize::named("A4"));
    assert_eq!(config.page_orientation, Orientation::Landscape);
    assert_eq!(config.dpi, 96);
}

#[test]
fn test_config_parses_camel_case_json() {
    let json = r#"{
        "printService": "http://geo/print/",
        "templateService": "http://geo/templates",
        "autoLoad": false,
        "pageUnits": "in",
        "pageSize": [8.5, 11],
        "pageMargins": [0.5, "auto"]
    }"#;
    let config: PrintConfig = serde_json::from_str(json).unwrap();
    assert!(!config.auto_load);
    assert_eq!(config.page_units, Units::In);
    assert_eq!(config.page_size, PageSize::dimensions(8.5, 11.0));
    assert_eq!(
        config.page_margins,
        Some(PageMargins::list([Margin::from(0.5), "auto".into()]))
    );
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_save_and_load_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("print.json");

    let mut params = BTreeMap::new();
    params.insert("title".to_string(), serde_json::json!("Flood map"));
    let config = PrintConfig {
        print_service: Some("http://geo/print/".to_string()),
        page_margins: Some(PageMargins::Text("1cm".to_string())),
        custom_params: params,
        ..Default::default()
    };

    config.save(&path).await.unwrap();
    let loaded = PrintConfig::load(&path).await.unwrap();
    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_load_invalid_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    assert!(matches!(
        PrintConfig::load(&path).await,
        Err(PrintError::Config(_))
    ));
}

#[test]
fn test_overrides_leave_original_untouched() {
    let base = PrintConfig {
        print_service: Some("http://a/".to_string()),
        ..Default::default()
    };
    let overrides = ConfigOverrides {
        print_service: Some("http://b/".to_string()),
        dpi: Some(72),
        options: PrintOptionsPatch::default().page_units(Units::Cm),
        ..Default::default()
    };

    let merged = base.merged(&overrides);
    assert_eq!(merged.print_service.as_deref(), Some("http://b/"));
    assert_eq!(merged.dpi, 72);
    assert_eq!(merged.page_units, Units::Cm);
    assert_eq!(base.print_service.as_deref(), Some("http://a/"));
    assert_eq!(base.page_units, Units::Mm);
}

#[test]
fn test_patch_reports_only_present_keys() {
    let patch = PrintOptionsPatch::default()
        .page_size(PageSize::named("letter"))
        .active_template("7");
    assert_eq!(patch.keys(), vec![OptionKey::PageSize, OptionKey::ActiveTemplate]);
    assert!(PrintOptionsPatch::default().is_empty());
}

#[test]
fn test_merge_keeps_unpatched_fields() {
    let options = PrintOptions {
        page_units: Units::In,
        page_margins: Some(PageMargins::list([1.0])),
        ..Default::default()
    };
    let merged = options.merged(&PrintOptionsPatch::default().page_orientation(Orientation::Portrait));
    assert_eq!(merged.page_units, Units::In);
    assert_eq!(merged.page_margins, options.page_margins);
    assert_eq!(merged.page_orientation, Orientation::Portrait);
}

#[test]
fn test_paper_dimensions_for_named_size() {
    let options = PrintOptions {
        page_size: PageSize::named("a4"),
        page_orientation: Orientation::Portrait,
        ..Default::default()
    };
    let presets = PaperPreset::defaults();
    assert_eq!(options.paper_dimensions(&presets).unwrap(), ([210.0, 297.0], Units::Mm));

    let landscape = PrintOptions {
        page_size: PageSize::named("letter"),
        page_orientation: Orientation::Landscape,
        ..Default::default()
    };
    assert_eq!(landscape.paper_dimensions(&presets).unwrap(), ([11.0, 8.5], Units::In));
}

#[test]
fn test_unknown_named_size() {
    let options = PrintOptions {
        page_size: PageSize::named("tabloid"),
        ..Default::default()
    };
    assert!(matches!(
        options.paper_dimensions(&PaperPreset::defaults()),
        Err(PrintError::UnknownPaperSize(name)) if name == "tabloid"
    ));
}

#[test]
fn test_configured_paper_sizes_replace_builtins() {
    let json = r#"{
        "printService": "http://geo/print/",
        "paperSizes": [
            {"name": "tabloid", "size": [11, 17], "units": "in"},
            {"name": "poster", "size": [500, 700]}
        ],
        "resolutions": [96, 150],
        "dpi": 150
    }"#;
    let config: PrintConfig = serde_json::from_str(json).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.resolutions, vec![96, 150]);

    let poster = config.find_paper("POSTER").unwrap();
    assert_eq!(poster.units, Units::Mm);
    assert!(config.find_paper("A4").is_none());

    let options = PrintOptions {
        page_size: PageSize::named("tabloid"),
        page_orientation: Orientation::Landscape,
        ..Default::default()
    };
    assert_eq!(
        options.paper_dimensions(&config.paper_sizes).unwrap(),
        ([17.0, 11.0], Units::In)
    );
}

#[test]
fn test_default_paper_sizes_and_resolutions() {
    let config = PrintConfig::default();
    let names: Vec<&str> = config.paper_sizes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A4", "letter", "ledger", "A3", "B4", "legal"]);
    assert_eq!(config.resolutions, vec![96]);
}

#[test]
fn test_validation_checks_resolutions_and_paper_sizes() {
    let base = PrintConfig {
        print_service: Some("http://geo/print/".to_string()),
        ..Default::default()
    };

    let unlisted = PrintConfig {
        dpi: 300,
        ..base.clone()
    };
    match unlisted.validate() {
        Err(PrintError::Config(msg)) => assert!(msg.contains("300 dpi")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    let zero = PrintConfig {
        resolutions: vec![0, 96],
        ..base.clone()
    };
    assert!(zero.validate().is_err());

    let flat = PrintConfig {
        paper_sizes: vec![PaperPreset::new("strip", [100.0, 0.0], Units::Mm)],
        ..base
    };
    assert!(flat.validate().is_err());
}

#[test]
fn test_template_ids_accept_numbers() {
    let templates: Vec<Template> =
        serde_json::from_str(r#"[{"id": 12, "title": "A"}, {"id": "b"}]"#).unwrap();
    assert_eq!(templates[0].id, TemplateId::new("12"));
    assert_eq!(templates[1].id.as_str(), "b");
    assert_eq!(templates[1].title, "");
}

#[test]
fn test_units_parse() {
    assert_eq!(Units::parse("PT"), Some(Units::Pt));
    assert_eq!(Units::parse("furlong"), None);
    assert_eq!(Units::Px.to_string(), "px");
}
