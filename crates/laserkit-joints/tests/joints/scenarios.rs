use laserkit_core::{FabricationContext, JointSettings, Point};
use laserkit_joints::{
    create_joint, FingerJoint, JointDirection, JointGenerator, JointKind, JointParams,
};
use laserkit_path::{parse, serialize, Edge, Verb};
use laserkit_template::evaluate;

#[test]
fn test_five_finger_outside_edge() {
    let edge = Edge::from_commands(&parse("M 0 0 l 100 0").unwrap()).unwrap();
    let pattern = FingerJoint
        .generate(
            &edge,
            &JointParams::new(5.0, 3.0, 5),
            &FabricationContext::default(),
        )
        .unwrap();

    // move, gap, 5 tabs of 3 lines, 4 connectors, gap
    assert_eq!(pattern.path.len(), 1 + 1 + 15 + 4 + 1);
    let rises = pattern.path.iter().filter(|c| c.params.as_slice() == [0.0, 3.0]).count();
    let falls = pattern.path.iter().filter(|c| c.params.as_slice() == [0.0, -3.0]).count();
    let runs = pattern.path.iter().filter(|c| c.params.as_slice() == [10.0, 0.0]).count();
    assert_eq!((rises, falls, runs), (5, 5, 9));
}

#[test]
fn test_thicker_material_deepens_tabs_only() {
    let edge = Edge::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let pattern = create_joint(
        JointKind::Finger,
        JointDirection::Inside,
        &edge,
        3.0,
        &JointSettings::default(),
        &FabricationContext::default(),
    )
    .unwrap();

    let thicker = evaluate(&pattern.template.unwrap(), 6.0).unwrap();
    assert_eq!(thicker[2].params.as_slice(), &[0.0, -6.0]);
    assert_eq!(thicker[3].params.as_slice(), &[10.0, 0.0]);
    assert_eq!(thicker[4].params.as_slice(), &[0.0, 6.0]);
}

#[test]
fn test_inside_tabs_point_against_normal() {
    let edge = Edge::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let pattern = create_joint(
        JointKind::Finger,
        JointDirection::Inside,
        &edge,
        4.0,
        &JointSettings::default(),
        &FabricationContext::default(),
    )
    .unwrap();
    assert_eq!(pattern.path[2].params.as_slice(), &[0.0, -4.0]);
    assert!(serialize(&pattern.path).starts_with("M 0 0 l 5 0 l 0 -4 l 10 0 l 0 4"));
}

#[test]
fn test_compact_finger_scales_relief_with_kerf() {
    let edge = Edge::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let mut ctx = FabricationContext::new(3.0, 0.2).unwrap();
    ctx.compound_scale(2.0).unwrap();
    let pattern = create_joint(
        JointKind::FingerCompact,
        JointDirection::Outside,
        &edge,
        3.0,
        &JointSettings::default(),
        &ctx,
    )
    .unwrap();
    let arc = pattern.path.iter().find(|c| c.verb == Verb::Arc).unwrap();
    assert_eq!(arc.params[0], 0.1);
}
