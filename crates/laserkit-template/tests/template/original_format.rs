//! Templates as written by the browser tooling.

use laserkit_template::{evaluate, Template};

#[test]
fn test_joint_template_without_spaces_after_letters() {
    let template = Template::parse(
        "M 0 0 l5 0 l0 {thickness} l10 0 l0 -{thickness} l10 6.123233995736766e-17*0",
    );
    // Bare expressions outside braces are not numbers
    assert!(template.is_err());

    let template =
        Template::parse("M 0 0 l5 0 l0 {thickness} l10 0 l{6.123233995736766e-17*thickness} -{thickness}")
            .unwrap();
    let path = evaluate(&template, 4.0).unwrap();
    assert_eq!(path[2].params.as_slice(), &[0.0, 4.0]);
    assert_eq!(path[4].params[1], -4.0);
    assert!(path[4].params[0].abs() < 1e-15);
}

#[test]
fn test_assignment_placeholders() {
    let template = Template::parse("M 0 0 h {t2 = thickness * 2; t2 + 1}").unwrap();
    let path = evaluate(&template, 1.5).unwrap();
    assert_eq!(path[1].params[0], 4.0);
}

#[test]
fn test_compact_arc_flags_in_template() {
    let template = Template::parse("M0 0 a0.2 0.2 0 10 0.4 0").unwrap();
    let path = evaluate(&template, 3.0).unwrap();
    assert_eq!(path[1].params.as_slice(), &[0.2, 0.2, 0.0, 1.0, 0.0, 0.4, 0.0]);
}
