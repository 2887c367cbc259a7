use laserkit_core::{EngineSettings, LoadOverrides};
use laserkit_designer::{Document, FabricationSession, JointState, NoHost};
use std::fs;
use tempfile::TempDir;

const PANEL: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:lz="http://www.heller-web.net/lasersvg/" width="200mm" height="100mm" viewBox="0 0 200 100" lz:material-thickness="3">
  <g id="parts" transform="translate(10 5)">
    <rect id="panel" x="0" y="0" width="120" height="60" lz:joint-top="0" lz:joint-top-type="finger" lz:joint-bottom="1" lz:joint-bottom-type="flap" lz:joint-bottom-direction="outside" style="stroke:red"/>
  </g>
  <text x="5" y="95">Side panel</text>
</svg>"#;

fn load(source: &str, query: &str) -> FabricationSession {
    let overrides = LoadOverrides::from_query(query).unwrap();
    FabricationSession::load(source, &overrides, EngineSettings::default(), &mut NoHost).unwrap()
}

#[test]
fn test_rect_split_into_jointed_edges() {
    let session = load(PANEL, "");
    assert!(session.find("panel").is_none());

    let kinds: Vec<Option<String>> = ["top", "right", "bottom", "left"]
        .iter()
        .map(|side| {
            let edge = session.find(&format!("panel-{}", side)).unwrap();
            assert_eq!(edge.attributes["style"], "stroke:red");
            match edge.joint_state {
                JointState::Jointed { kind, direction } => Some(format!("{} {}", direction, kind)),
                JointState::Unjointed => None,
            }
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some("inside finger".to_string()),
            None,
            Some("outside flap".to_string()),
            None
        ]
    );
}

#[test]
fn test_save_keeps_prefix_structure_and_parameters() {
    let session = load(PANEL, "?thickness=4");
    let saved = session.image_for_saving();

    assert!(saved.contains(r#"xmlns:lz="http://www.heller-web.net/lasersvg/""#));
    assert!(saved.contains(r#"lz:material-thickness="4""#));
    assert!(saved.contains(r#"<g id="parts" transform="translate(10 5)">"#));
    assert!(saved.contains(">Side panel</text>"));
    assert!(saved.contains("lz:template="));
    assert!(!saved.contains("laser:"));
}

#[test]
fn test_saved_document_reloads_with_its_parameters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.svg");

    let first = load(PANEL, "?thickness=4&kerf=0.1");
    fs::write(&path, first.image_for_saving()).unwrap();

    let source = fs::read_to_string(&path).unwrap();
    let second = load(&source, "");
    assert_eq!(second.context().material_thickness, 4.0);
    assert_eq!(second.context().kerf, 0.1);

    let a = first.summary();
    let b = second.summary();
    assert_eq!(a.shapes, b.shapes);
    assert_eq!(a.templated, b.templated);
    assert_eq!(a.joints, b.joints);
}

#[test]
fn test_document_round_trip_is_stable() {
    let once = Document::parse(PANEL).unwrap().to_svg_string();
    let twice = Document::parse(&once).unwrap().to_svg_string();
    assert_eq!(once, twice);
}

#[test]
fn test_save_keeps_declarations_comments_and_references() {
    let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns:laser="http://www.heller-web.net/lasersvg/" laser:material-thickness="3">
  <!-- lid & base -->
  <path id="lid" d="M 0 0 l 40 0" data-label="Lid &amp; base &lt;3mm&gt;"/>
  <text x="0" y="10">Lid &amp; base</text>
</svg>"#;
    let session = load(source, "");
    assert_eq!(session.find("lid").unwrap().attributes["data-label"], "Lid & base <3mm>");

    let saved = session.image_for_saving();
    assert!(saved.starts_with(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg"
    ));
    assert!(saved.contains("  <!-- lid & base -->\n"));
    assert!(saved.contains(r#"data-label="Lid &amp; base &lt;3mm>""#));
    assert!(saved.contains(">Lid &amp; base</text>"));
    assert!(session.image_for_export().starts_with("<?xml"));

    let reloaded = load(&saved, "");
    assert_eq!(reloaded.find("lid").unwrap().attributes["data-label"], "Lid & base <3mm>");
    assert_eq!(reloaded.image_for_saving(), saved);
}

#[test]
fn test_scaled_group_translation() {
    let session = load(PANEL, "?scale=50");
    let saved = session.image_for_saving();
    assert!(saved.contains(r#"transform="translate(5 2.5)""#));
    assert!(saved.contains(r#"width="100mm""#));
    assert!(saved.contains(r#"viewBox="0 0 100 50""#));
}

#[test]
fn test_export_stamps_parameters_and_drops_overlays() {
    let mut session = load(PANEL, "?kerf=0.3");
    session.highlight_elements_with_length(3.0);
    assert!(!session.highlights().is_empty());
    assert!(session.render().contains("lengthHighlight"));

    let exported = session.image_for_export();
    assert!(!exported.contains("lengthHighlight"));
    assert!(exported.contains(r#"lz:kerf="0.3""#));
    assert!(exported.contains(r#"lz:material-thickness="3""#));
}

#[test]
fn test_malformed_documents() {
    let overrides = LoadOverrides::default();
    let settings = EngineSettings::default();
    assert!(FabricationSession::load("<svg><g></svg>", &overrides, settings, &mut NoHost).is_err());
    assert!(FabricationSession::load("<html></html>", &overrides, settings, &mut NoHost).is_err());
}
