use laserkit_core::{EngineSettings, LoadOverrides};
use laserkit_designer::{
    FabricationSession, HighlightTarget, HostCallbacks, JointState, NoHost, Shape,
    ThicknessAdjust,
};
use laserkit_joints::{JointDirection, JointKind};
use laserkit_path::serialize;

const DRAWING: &str = r#"<svg xmlns:laser="http://www.heller-web.net/lasersvg/" laser:material-thickness="3" laser:kerf="0.2">
  <path id="lid" d="M 0 0 l 80 0" laser:joint="0" laser:joint-type="finger-compact"/>
  <path id="notch" d="M 0 20 l 10 0 l 0 3 l 3 0 l 0 -3 l 10 0"/>
  <rect id="tab" x="40" y="40" width="3" height="12"/>
  <path id="base" d="M 0 60 l 90 0" laser:joint="0" laser:joint-type="flap" laser:joint-direction="outside"/>
</svg>"#;

fn load() -> FabricationSession {
    FabricationSession::load(DRAWING, &LoadOverrides::default(), EngineSettings::default(), &mut NoHost)
        .unwrap()
}

#[derive(Default)]
struct Host {
    ready_with: Option<usize>,
    selected: Vec<String>,
}

impl HostCallbacks for Host {
    fn document_ready(&mut self, session: &FabricationSession) {
        self.ready_with = Some(session.document().shapes().len());
    }

    fn element_selected(&mut self, shape: &Shape, segment: Option<usize>) {
        self.selected.push(format!("{} {:?}", shape.label(), segment));
    }
}

#[test]
fn test_host_notifications() {
    let mut host = Host::default();
    let mut session = FabricationSession::load(
        DRAWING,
        &LoadOverrides::default(),
        EngineSettings::default(),
        &mut host,
    )
    .unwrap();
    assert_eq!(host.ready_with, Some(4));

    let id = session.find("notch").unwrap().id;
    assert!(session.select(id, Some(2), &mut host));
    assert_eq!(host.selected, vec!["#notch Some(2)".to_string()]);
    assert_eq!(session.selection().unwrap().label(), "#notch");
}

#[test]
fn test_kerf_change_regenerates_compact_joints() {
    let mut session = load();
    let before = serialize(session.find("lid").unwrap().path().unwrap());
    let notch = session.find("notch").unwrap().clone();

    session.set_kerf(0.4).unwrap();
    assert_ne!(serialize(session.find("lid").unwrap().path().unwrap()), before);
    assert_eq!(session.find("notch").unwrap().geometry, notch.geometry);
    assert!(session.set_kerf(-1.0).is_err());
}

#[test]
fn test_accept_segment_highlight_templates_notch() {
    let mut session = load();
    // Three notch segments and both long sides of the tab, plus joint flanks
    assert!(session.highlight_elements_with_length(3.0) >= 5);

    let notch = session.find("notch").unwrap().id;
    let index = session
        .highlights()
        .iter()
        .position(|h| h.shape == notch && h.target == HighlightTarget::Segment(3))
        .unwrap();
    assert!(session.accept_length_highlight(index).unwrap());

    let template = session.find("notch").unwrap().template.clone().unwrap();
    assert_eq!(template.to_string(), "M 0 20 l 10 0 l 0 3 l {thickness} 0 l 0 -3 l 10 0");

    session.update_thickness(4.0).unwrap();
    assert_eq!(
        serialize(session.find("notch").unwrap().path().unwrap()),
        "M 0 20 l 10 0 l 0 3 l 4 0 l 0 -3 l 10 0"
    );
    // Regeneration clears overlays
    assert!(session.highlights().is_empty());
}

#[test]
fn test_accept_rect_highlight_sets_thickness_adjust() {
    let mut session = load();
    session.highlight_elements_with_length(3.0);
    let index = session
        .highlights()
        .iter()
        .position(|h| h.target == HighlightTarget::Width)
        .unwrap();
    assert!(session.accept_length_highlight(index).unwrap());
    assert_eq!(
        session.find("tab").unwrap().annotations.thickness_adjust,
        ThicknessAdjust::Width
    );

    session.update_thickness(5.0).unwrap();
    let tab = session.find("tab").unwrap().geometry.as_rect().copied().unwrap();
    assert_eq!((tab.width, tab.height), (5.0, 12.0));
}

#[test]
fn test_properties_on_selection() {
    let mut session = load();
    let id = session.find("notch").unwrap().id;
    session.select(id, None, &mut NoHost);

    assert!(session
        .set_property_for_selection("template", "M 0 20 l {20*thickness} 0")
        .unwrap());
    assert!(session.set_property_for_selection("template", "M 0 20 l {20*thickness 0").is_err());
    session.update_thickness(2.5).unwrap();
    assert_eq!(serialize(session.find("notch").unwrap().path().unwrap()), "M 0 20 l 50 0");

    assert!(session.set_property_for_selection("joint", "0").unwrap());
    assert!(session.set_property_for_selection("joint-type", "tslot").unwrap());
    assert_eq!(session.create_joints(), 3);
    assert!(matches!(
        session.find("notch").unwrap().joint_state,
        JointState::Jointed {
            kind: JointKind::TSlot,
            ..
        }
    ));
}

#[test]
fn test_switch_every_joint_type() {
    let mut session = load();
    assert_eq!(session.set_joint_type_for_all(JointKind::Finger), 2);
    let states: Vec<JointState> = ["lid", "base"]
        .iter()
        .map(|id| session.find(id).unwrap().joint_state)
        .collect();
    assert_eq!(
        states,
        vec![
            JointState::Jointed {
                kind: JointKind::Finger,
                direction: JointDirection::Inside
            },
            JointState::Jointed {
                kind: JointKind::Finger,
                direction: JointDirection::Outside
            },
        ]
    );
}

#[test]
fn test_none_joint_strips_template() {
    let mut session = load();
    assert!(session.find("lid").unwrap().template.is_some());
    session.set_joint_type_for_all(JointKind::None);
    let lid = session.find("lid").unwrap();
    let path = lid.path().unwrap();
    assert_eq!(path.len(), 2);
    assert!((path[1].params[0] - 80.0).abs() < 1e-9);
    assert!(path[1].params[1].abs() < 1e-9);
    assert!(lid.template.is_none());
}
