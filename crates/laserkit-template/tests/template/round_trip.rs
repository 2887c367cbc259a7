use laserkit_path::{PathCommand, Position};
use laserkit_template::{evaluate, to_template, ParamMark, Template};
use proptest::prelude::*;

fn path_and_marks() -> impl Strategy<Value = (Vec<PathCommand>, Vec<ParamMark>)> {
    prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0, any::<bool>(), any::<bool>()), 1..10)
        .prop_map(|segments| {
            let mut path = vec![PathCommand::move_to(Position::Absolute, 0.0, 0.0)];
            let mut marks = Vec::new();
            for (i, (dx, dy, mark_x, mark_y)) in segments.into_iter().enumerate() {
                path.push(PathCommand::line_to(Position::Relative, dx, dy));
                if mark_x {
                    marks.push(ParamMark::new(i + 1, 0));
                }
                if mark_y {
                    marks.push(ParamMark::with_constant(i + 1, 1, 0.2));
                }
            }
            (path, marks)
        })
}

proptest! {
    #[test]
    fn evaluate_reproduces_derivation(
        (path, marks) in path_and_marks(),
        thickness in 0.5f64..20.0,
    ) {
        let template = to_template(&path, &marks, thickness).unwrap();
        let evaluated = evaluate(&template, thickness).unwrap();
        prop_assert_eq!(evaluated.len(), path.len());
        for (a, b) in evaluated.iter().zip(&path) {
            prop_assert_eq!(a.verb, b.verb);
            for (x, y) in a.params.iter().zip(&b.params) {
                prop_assert!((x - y).abs() <= 1e-9 * (1.0 + y.abs()), "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn template_string_parses_back((path, marks) in path_and_marks()) {
        let template = to_template(&path, &marks, 3.0).unwrap();
        let reparsed = Template::parse(&template.to_string()).unwrap();
        prop_assert_eq!(reparsed.to_string(), template.to_string());
    }
}
