//! Integration tests for PDF export and batch generation
//!
//! Generated documents are read back with lopdf.

use cert_render::{generate, BatchController, BatchMode, BatchOutput, EngineConfig, Exporter};
use cert_template::{parse_template, DataSource, Template};
use lopdf::Document;
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn page_contents(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

fn names(values: &[&str]) -> DataSource {
    DataSource::from_records(
        vec!["name".to_string()],
        values.iter().map(|v| vec![v.to_string()]).collect(),
    )
    .unwrap()
}

fn name_template() -> Template {
    parse_template(
        r##"{
            "name": "Completion",
            "border": { "color": "#8a6d3b", "style": "double" },
            "elements": [
                { "type": "text", "id": "title", "x": 20, "y": 20, "content": "Certificate" },
                { "type": "text", "id": "recipient", "x": 20, "y": 60, "content": "{{name}}",
                  "isDynamic": true, "dataField": "name", "fontSizeMm": 12, "bold": true },
                { "type": "circle", "id": "seal", "x": 240, "y": 150, "radiusMm": 18, "filled": true,
                  "fillColor": "#c9a227", "rotation": 15 }
            ]
        }"##,
    )
    .unwrap()
}

#[test]
fn test_combined_pages_follow_row_order() {
    init_logger();
    let output = generate(
        &name_template(),
        &names(&["Ana", "Bo"]),
        BatchMode::Combined,
        &EngineConfig::default(),
    )
    .unwrap();

    let BatchOutput::Combined(pdf) = output else {
        panic!("expected a combined document");
    };
    let pages = page_contents(&pdf);
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("<416E61> Tj"));
    assert!(!pages[0].contains("<426F> Tj"));
    assert!(pages[1].contains("<426F> Tj"));
}

#[test]
fn test_page_size_matches_template() {
    init_logger();
    let pdf = Exporter::new().render_single(&name_template(), None).unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    let page_id = doc.get_pages()[&1];
    let media_box: Vec<f64> = doc
        .get_object(page_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| {
            o.as_float()
                .map(|f| f as f64)
                .or_else(|_| o.as_i64().map(|i| i as f64))
                .unwrap()
        })
        .collect();

    assert!((media_box[2] - 841.89).abs() < 0.01);
    assert!((media_box[3] - 595.28).abs() < 0.01);
}

fn centered(x: f64, align: &str) -> Template {
    parse_template(&format!(
        r#"{{ "elements": [ {{ "type": "text", "id": "t", "x": {x}, "y": 30, "content": "abcde",
            "fontFamily": "Courier", "fontSizeMm": 10, "width": 250, "align": "{align}" }} ] }}"#
    ))
    .unwrap()
}

#[test]
fn test_center_alignment_ignores_stored_x() {
    init_logger();
    let exporter = Exporter::new();
    let at_zero = exporter.render_single(&centered(0.0, "center"), None).unwrap();
    let at_far = exporter.render_single(&centered(999.0, "center"), None).unwrap();
    assert_eq!(page_contents(&at_zero), page_contents(&at_far));

    // "abcde" in Courier at 10mm is 30mm wide: centred on a 297mm page it
    // starts at 133.5mm, exactly like a left-aligned copy placed there
    let left = exporter.render_single(&centered(133.5, "left"), None).unwrap();
    assert_eq!(page_contents(&at_zero), page_contents(&left));
}

#[test]
fn test_separate_documents_get_distinct_filenames() {
    init_logger();
    let config = EngineConfig {
        filename_template: "{{name}}".to_string(),
        ..EngineConfig::default()
    };
    let data = names(&["Ana", "Bo", "Ana"]);

    let mut progress = Vec::new();
    let output = BatchController::new(config)
        .generate_with_progress(&name_template(), &data, BatchMode::Separate, |p| {
            progress.push(p.completed)
        })
        .unwrap();

    let BatchOutput::Separate(documents) = output else {
        panic!("expected separate documents");
    };
    let filenames: Vec<&str> = documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(filenames, vec!["Ana.pdf", "Bo.pdf", "Ana-2.pdf"]);
    assert_eq!(progress, vec![1, 2, 3]);

    for (i, document) in documents.iter().enumerate() {
        assert_eq!(document.row_index, i);
        let pdf = document.document.as_ref().unwrap();
        assert_eq!(page_contents(pdf).len(), 1);
    }
    assert!(page_contents(documents[1].document.as_ref().unwrap())[0].contains("<426F> Tj"));
}

#[test]
fn test_snapshot_generation_embeds_one_image_per_page() {
    init_logger();
    let mut template = name_template();
    template.use_snapshot_generation = true;

    let config = EngineConfig {
        raster_multiplier: 0.5,
        ..EngineConfig::default()
    };
    let output = generate(&template, &names(&["Ana", "Bo"]), BatchMode::Combined, &config).unwrap();
    let BatchOutput::Combined(pdf) = output else {
        panic!("expected a combined document");
    };

    let pages = page_contents(&pdf);
    assert_eq!(pages.len(), 2);
    for page in &pages {
        assert!(page.contains(" Do"));
        assert!(!page.contains("Tj"));
    }
}

#[test]
fn test_snapshot_generation_with_element_larger_than_page() {
    init_logger();
    let mut template = parse_template(
        r##"{
            "elements": [
                { "type": "rectangle", "id": "wash", "x": -10, "y": -10, "widthMm": 60000,
                  "heightMm": 60000, "filled": true, "fillColor": "#ddeeff", "rotation": 5 },
                { "type": "text", "id": "recipient", "x": 20, "y": 60, "content": "{{name}}" }
            ]
        }"##,
    )
    .unwrap();
    template.use_snapshot_generation = true;

    let output = generate(&template, &names(&["Ana"]), BatchMode::Combined, &EngineConfig::default()).unwrap();
    let BatchOutput::Combined(pdf) = output else {
        panic!("expected a combined document");
    };
    assert_eq!(page_contents(&pdf).len(), 1);
}
