use laserkit_path::{end_points, parse, serialize, PathError, Position, Verb};
use laserkit_core::Point;

#[test]
fn test_implicit_lines_after_move() {
    let cmds = parse("M 0 0 10 0 10 10").unwrap();
    assert_eq!(cmds.len(), 3);
    assert_eq!(cmds[1].verb, Verb::Line);
    assert_eq!(cmds[2].verb, Verb::Line);
    assert_eq!(cmds[2].position, Position::Absolute);
}

#[test]
fn test_relative_move_repeats_as_relative_lines() {
    let cmds = parse("m 5 5 1 0 0 1").unwrap();
    assert!(cmds.iter().all(|c| c.position == Position::Relative));
    assert_eq!(end_points(&cmds).last(), Some(&Point::new(6.0, 6.0)));
}

#[test]
fn test_repeated_cubic_params() {
    let cmds = parse("M0,0 c1,1 2,2 3,3 1,1 2,2 3,3").unwrap();
    assert_eq!(cmds.len(), 3);
    assert_eq!(cmds[2].verb, Verb::Cubic);
}

#[test]
fn test_serialize_format() {
    let cmds = parse("M0,0l5,0L5 5z").unwrap();
    assert_eq!(serialize(&cmds), "M 0 0 l 5 0 L 5 5 z");
}

#[test]
fn test_empty_and_whitespace_are_invalid() {
    assert!(matches!(parse(""), Err(PathError::InvalidPath(_))));
    assert!(matches!(parse("  \n"), Err(PathError::InvalidPath(_))));
}

#[test]
fn test_must_start_with_move() {
    assert!(matches!(parse("l 5 0"), Err(PathError::InvalidPath(_))));
}

#[test]
fn test_malformed_inputs() {
    assert!(matches!(parse("M 0"), Err(PathError::Malformed { .. })));
    assert!(matches!(parse("M 0 0 l 5 x"), Err(PathError::Malformed { .. })));
    assert!(matches!(parse("5 5"), Err(PathError::Malformed { .. })));
    assert!(matches!(
        parse("M 0 0 a 1 1 0 2 0 5 5"),
        Err(PathError::Malformed { .. })
    ));
}

#[test]
fn test_numbers_after_close_are_malformed() {
    assert!(matches!(parse("M 0 0 z 5"), Err(PathError::Malformed { .. })));
}
