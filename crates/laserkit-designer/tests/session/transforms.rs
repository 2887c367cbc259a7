use laserkit_core::{EngineSettings, LoadOverrides, Point};
use laserkit_designer::{FabricationSession, NoHost, Rect, Shape};
use laserkit_path::{end_points, serialize};

fn session(source: &str, query: &str) -> FabricationSession {
    let overrides = LoadOverrides::from_query(query).unwrap();
    FabricationSession::load(source, &overrides, EngineSettings::default(), &mut NoHost).unwrap()
}

fn rect(session: &FabricationSession, id: &str) -> Rect {
    *session.find(id).unwrap().geometry.as_rect().unwrap()
}

fn last_point(shape: &Shape) -> Point {
    *end_points(shape.path().unwrap()).last().unwrap()
}

const SLOT: &str = r#"<svg xmlns:laser="http://www.heller-web.net/lasersvg/" viewBox="0 0 100 100" laser:material-thickness="4" laser:kerf="0.5">
  <rect id="slot" x="10" y="20" width="30" height="4" laser:thickness-adjust="height" laser:origin="bottom"/>
  <rect id="square" x="50" y="50" width="4" height="4" laser:thickness-adjust="both" laser:origin="center"/>
  <rect id="plain" x="10" y="10" width="20" height="30"/>
  <path id="edge" d="M 0 80 l 60 0" laser:joint="1" laser:joint-type="finger"/>
</svg>"#;

#[test]
fn test_bottom_origin_keeps_bottom_edge() {
    let mut session = session(SLOT, "");
    session.update_thickness(6.0).unwrap();

    let slot = rect(&session, "slot");
    assert_eq!((slot.x, slot.y, slot.width, slot.height), (10.0, 18.0, 30.0, 6.0));

    let square = rect(&session, "square");
    assert_eq!((square.x, square.y, square.width, square.height), (49.0, 49.0, 6.0, 6.0));

    session.update_thickness(3.0).unwrap();
    let slot = rect(&session, "slot");
    assert_eq!((slot.y, slot.height), (21.0, 3.0));
}

#[test]
fn test_thickness_update_is_idempotent() {
    let mut session = session(SLOT, "");
    session.update_thickness(5.0).unwrap();
    let once = session.image_for_saving();
    session.update_thickness(5.0).unwrap();
    assert_eq!(session.image_for_saving(), once);
}

#[test]
fn test_joint_depth_follows_thickness() {
    let mut session = session(SLOT, "");
    let depth = |s: &FabricationSession| {
        let points = end_points(s.find("edge").unwrap().path().unwrap());
        points.iter().map(|p| p.y).fold(f64::MIN, f64::max)
            - points.iter().map(|p| p.y).fold(f64::MAX, f64::min)
    };
    assert!((depth(&session) - 4.0).abs() < 1e-9);

    session.update_thickness(6.0).unwrap();
    assert!((depth(&session) - 6.0).abs() < 1e-9);
    assert!(last_point(session.find("edge").unwrap()).approx_eq(&Point::new(60.0, 80.0), 1e-9));
}

#[test]
fn test_scale_composes() {
    let mut stepped = session(SLOT, "");
    stepped.scale(2.0).unwrap();
    stepped.scale(1.5).unwrap();

    let direct = session(SLOT, "?scale=300");
    assert_eq!(stepped.context().scaling_factor, 3.0);
    assert_eq!(direct.context().scaling_factor, 3.0);

    let (a, b) = (rect(&stepped, "plain"), rect(&direct, "plain"));
    for (x, y) in [(a.x, b.x), (a.y, b.y), (a.width, b.width), (a.height, b.height)] {
        assert!((x - y).abs() < 1e-9);
    }
    assert!((a.width - 60.0).abs() < 1e-9);

    let end_a = last_point(stepped.find("edge").unwrap());
    let end_b = last_point(direct.find("edge").unwrap());
    assert!(end_a.approx_eq(&end_b, 1e-9));
    assert!(end_a.approx_eq(&Point::new(180.0, 240.0), 1e-9));
}

#[test]
fn test_scale_keeps_material_dimensions() {
    let mut session = session(SLOT, "");
    session.scale(2.0).unwrap();

    // Pinned to the material, re-anchored at the scaled bottom edge
    let slot = rect(&session, "slot");
    assert_eq!((slot.x, slot.y, slot.width, slot.height), (20.0, 44.0, 60.0, 4.0));
    assert_eq!(session.document().view_box.unwrap().width, 200.0);
}

#[test]
fn test_resize_lock_skips_scaling() {
    let source = r#"<svg xmlns:laser="http://www.heller-web.net/lasersvg/">
  <rect id="label" x="1" y="2" width="3" height="4" laser:resizeLock="lock"/>
</svg>"#;
    let mut session = session(source, "");
    session.scale(4.0).unwrap();
    assert_eq!(rect(&session, "label"), Rect::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn test_kerf_adjust_and_mask_on_export() {
    let source = r#"<svg xmlns:laser="http://www.heller-web.net/lasersvg/" laser:kerf="0.5">
  <rect id="grow" x="0" y="0" width="10" height="10" laser:kerf-adjust="grow"/>
  <rect id="shrink" x="0" y="0" width="10" height="10" laser:kerf-adjust="shrink"/>
  <path id="masked" d="M 0 0 l 10 0 l 0 10" laser:kerf-mask="G S"/>
  <path id="mismatch" d="M 0 0 l 10 0 l 0 10" laser:kerf-mask="G"/>
</svg>"#;
    let session = session(source, "");
    let exported = session.image_for_export();

    assert!(exported.contains(r#"id="grow" x="-0.25" y="-0.25" width="10.5" height="10.5""#));
    assert!(exported.contains(r#"id="shrink" x="0.25" y="0.25" width="9.5" height="9.5""#));
    assert!(exported.contains(r#"id="masked" d="M 0 0 l 10.5 0 l 0 9.5""#));
    assert!(exported.contains(r#"id="mismatch" d="M 0 0 l 10 0 l 0 10""#));

    // The live document is untouched
    assert_eq!(rect(&session, "grow").width, 10.0);
}

#[test]
fn test_live_kerf_compensation_accumulates() {
    let source = r#"<svg xmlns:laser="http://www.heller-web.net/lasersvg/" laser:kerf="0.5">
  <path id="masked" d="M 0 0 l 10 0" laser:kerf-mask="G"/>
</svg>"#;
    let mut session = session(source, "");
    session.adjust_for_kerf();
    session.adjust_for_kerf();
    assert_eq!(serialize(session.find("masked").unwrap().path().unwrap()), "M 0 0 l 11 0");
}

mod properties {
    use laserkit_core::FabricationContext;
    use laserkit_designer::{apply_kerf, apply_thickness, Geometry, KerfAdjust, Origin, Rect, Shape, ThicknessAdjust};
    use proptest::prelude::*;

    fn slot(x: f64, y: f64, w: f64, h: f64, origin: Origin) -> Shape {
        let mut shape = Shape::new(Geometry::Rect(Rect::new(x, y, w, h)));
        shape.annotations.thickness_adjust = ThicknessAdjust::Both;
        shape.annotations.origin = Some(origin);
        shape
    }

    fn origins() -> impl Strategy<Value = Origin> {
        prop_oneof![
            Just(Origin::TopLeft),
            Just(Origin::Bottom),
            Just(Origin::Right),
            Just(Origin::TopRight),
            Just(Origin::BottomRight),
            Just(Origin::Center),
        ]
    }

    proptest! {
        #[test]
        fn thickness_keeps_anchor_fixed(
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
            w in 0.5f64..50.0,
            h in 0.5f64..50.0,
            t in 0.5f64..20.0,
            origin in origins(),
        ) {
            let shape = slot(x, y, w, h, origin);
            let before = origin.anchor(x, y, w, h);
            let ctx = FabricationContext::new(t, 0.1).unwrap();

            let once = apply_thickness(&shape, &ctx).unwrap();
            let twice = apply_thickness(&once, &ctx).unwrap();
            prop_assert_eq!(&once, &twice);

            let r = *once.geometry.as_rect().unwrap();
            prop_assert_eq!((r.width, r.height), (t, t));
            let after = origin.anchor(r.x, r.y, r.width, r.height);
            prop_assert!((after.0 - before.0).abs() < 1e-9);
            prop_assert!((after.1 - before.1).abs() < 1e-9);
        }

        #[test]
        fn kerf_grow_then_shrink_restores(
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
            w in 0.5f64..50.0,
            h in 0.5f64..50.0,
            k in 0.0f64..0.5,
        ) {
            let mut shape = Shape::new(Geometry::Rect(Rect::new(x, y, w, h)));
            shape.annotations.kerf_adjust = Some(KerfAdjust::Grow);
            let mut grown = apply_kerf(&shape, k);
            grown.annotations.kerf_adjust = Some(KerfAdjust::Shrink);
            let back = *apply_kerf(&grown, k).geometry.as_rect().unwrap();

            prop_assert!((back.x - x).abs() < 1e-9);
            prop_assert!((back.y - y).abs() < 1e-9);
            prop_assert!((back.width - w).abs() < 1e-9);
            prop_assert!((back.height - h).abs() < 1e-9);
        }
    }
}
