use laserkit_path::{normalize, parse, serialize, NormalizeOptions, PathCommand, Position};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    (-10_000i32..10_000).prop_map(|v| v as f64 / 8.0)
}

fn relative_lines() -> impl Strategy<Value = Vec<PathCommand>> {
    prop::collection::vec((coord(), coord()), 1..12).prop_flat_map(|pairs| {
        (coord(), coord()).prop_map(move |(x, y)| {
            let mut cmds = vec![PathCommand::move_to(Position::Absolute, x, y)];
            cmds.extend(
                pairs
                    .iter()
                    .map(|(dx, dy)| PathCommand::line_to(Position::Relative, *dx, *dy)),
            );
            cmds
        })
    })
}

proptest! {
    #[test]
    fn serialized_paths_parse_back(cmds in relative_lines()) {
        prop_assert_eq!(parse(&serialize(&cmds)).unwrap(), cmds);
    }

    #[test]
    fn absolute_then_relative_restores_lines(cmds in relative_lines()) {
        let abs = normalize(&cmds, NormalizeOptions { to_absolute: true, reduce_to_line_curve_only: true });
        let rel = normalize(&abs, NormalizeOptions { to_absolute: false, reduce_to_line_curve_only: true });
        // Eighths stay exact under addition and subtraction in this range
        prop_assert_eq!(&rel[1..], &cmds[1..]);
    }
}
