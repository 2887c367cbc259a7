//! Every generator ends exactly where the edge ends.

use laserkit_core::{FabricationContext, JointSettings, Point};
use laserkit_joints::{create_joint, JointDirection, JointKind};
use laserkit_path::{end_points, Edge, Position, Verb};
use laserkit_template::evaluate;
use proptest::prelude::*;

fn assert_closes(kind: JointKind, direction: JointDirection, edge: &Edge, count: u32) {
    let settings = JointSettings {
        finger_count: count,
        flap_count: count,
        ..JointSettings::default()
    };
    let ctx = FabricationContext::default();
    let Some(pattern) = create_joint(kind, direction, edge, 3.0, &settings, &ctx) else {
        panic!("{} produced no pattern for count {}", kind, count);
    };

    assert_eq!(pattern.path[0].verb, Verb::Move);
    assert_eq!(pattern.path[0].position, Position::Absolute);
    assert!(pattern.path[1..].iter().all(|c| c.position == Position::Relative));

    let end = *end_points(&pattern.path).last().unwrap();
    assert!(
        end.approx_eq(&edge.end, 1e-9),
        "{} {} count {}: ended at {:?}, expected {:?}",
        kind,
        direction,
        count,
        end,
        edge.end
    );

    if let Some(template) = pattern.template {
        let evaluated = evaluate(&template, 3.0).unwrap();
        assert_eq!(evaluated.len(), pattern.path.len());
        let end = *end_points(&evaluated).last().unwrap();
        assert!(end.approx_eq(&edge.end, 1e-9));
    }
}

#[test]
fn test_all_generators_close() {
    let edge = Edge::new(Point::new(10.0, 20.0), Point::new(210.0, 20.0));
    for kind in JointKind::ALL {
        for direction in [JointDirection::Inside, JointDirection::Outside] {
            for count in [1, 2, 3, 10] {
                assert_closes(kind, direction, &edge, count);
            }
        }
    }
}

#[test]
fn test_vertical_and_reversed_edges_close() {
    let edges = [
        Edge::new(Point::new(0.0, 0.0), Point::new(0.0, 150.0)),
        Edge::new(Point::new(150.0, 80.0), Point::new(0.0, 80.0)),
        Edge::new(Point::new(40.0, 160.0), Point::new(40.0, 10.0)),
    ];
    for edge in &edges {
        for kind in JointKind::ALL {
            assert_closes(kind, JointDirection::Outside, edge, 4);
            assert_closes(kind, JointDirection::Inside, edge, 4);
        }
    }
}

#[test]
fn test_zero_length_edge_is_noop() {
    let edge = Edge::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
    for kind in JointKind::ALL {
        assert!(create_joint(
            kind,
            JointDirection::Outside,
            &edge,
            3.0,
            &JointSettings::default(),
            &FabricationContext::default()
        )
        .is_none());
    }
}

#[test]
fn test_diagonal_templates_match_paths() {
    let angle = 2.4915117485988585f64;
    let edge = Edge::new(
        Point::new(0.0, 0.0),
        Point::new(angle.cos(), angle.sin()) * 300.0,
    );
    let ctx = FabricationContext::default();
    for kind in JointKind::ALL {
        for direction in [JointDirection::Inside, JointDirection::Outside] {
            for count in 1..=5 {
                assert_closes(kind, direction, &edge, count);

                let settings = JointSettings {
                    finger_count: count,
                    flap_count: count,
                    ..JointSettings::default()
                };
                let pattern = create_joint(kind, direction, &edge, 3.0, &settings, &ctx).unwrap();
                let evaluated = evaluate(&pattern.template.unwrap(), 3.0).unwrap();
                for (a, b) in evaluated.iter().zip(&pattern.path) {
                    for (x, y) in a.params.iter().zip(&b.params) {
                        assert!(
                            (x - y).abs() <= 1e-9,
                            "{} {} count {}: {} vs {}",
                            kind,
                            direction,
                            count,
                            x,
                            y
                        );
                    }
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn diagonal_edges_close(
        x in -200.0f64..200.0,
        y in -200.0f64..200.0,
        angle in 0.0f64..std::f64::consts::TAU,
        count in 1u32..6,
        outside in any::<bool>(),
        kind_index in 0usize..5,
    ) {
        let start = Point::new(x, y);
        let end = start + Point::new(angle.cos(), angle.sin()) * 300.0;
        let edge = Edge::new(start, end);
        let direction = if outside { JointDirection::Outside } else { JointDirection::Inside };
        assert_closes(JointKind::ALL[kind_index], direction, &edge, count);
    }
}
