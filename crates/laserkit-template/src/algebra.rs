//! Conversions between concrete paths and templates.

use laserkit_path::{format_number, PathCommand};

use crate::error::{TemplateError, TemplateResult};
use crate::template::{Template, TemplateParam};

/// Marks one parameter of a concrete path as thickness-dependent.
///
/// The parameter's value is taken to be `ratio * thickness + constant`. When
/// the ratio is not known it is derived from the value at the thickness the
/// path was drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamMark {
    pub command: usize,
    pub param: usize,
    pub constant: f64,
    pub ratio: Option<f64>,
}

impl ParamMark {
    pub fn new(command: usize, param: usize) -> Self {
        Self {
            command,
            param,
            constant: 0.0,
            ratio: None,
        }
    }

    pub fn with_constant(command: usize, param: usize, constant: f64) -> Self {
        Self {
            command,
            param,
            constant,
            ratio: None,
        }
    }

    /// A parameter known to be exactly `ratio * thickness + constant`.
    pub fn linear(command: usize, param: usize, ratio: f64, constant: f64) -> Self {
        Self {
            command,
            param,
            constant,
            ratio: Some(ratio),
        }
    }
}

/// Build a template from `concrete`, turning every marked parameter into an
/// expression of the thickness it was drawn at.
pub fn to_template(
    concrete: &[PathCommand],
    marks: &[ParamMark],
    thickness: f64,
) -> TemplateResult<Template> {
    let mut template = Template::from_path(concrete);
    apply_marks(&mut template, concrete, marks, thickness)?;
    Ok(template)
}

/// Rewrite marked parameters of an existing template in place.
///
/// `concrete` is the template evaluated at `thickness`. Marks on arc flags
/// or out of range are ignored.
pub fn apply_marks(
    template: &mut Template,
    concrete: &[PathCommand],
    marks: &[ParamMark],
    thickness: f64,
) -> TemplateResult<()> {
    if !(thickness.is_finite() && thickness > 0.0) {
        tracing::warn!("Cannot derive a template at thickness {}", thickness);
        return Ok(());
    }

    for mark in marks {
        let Some(cmd) = concrete.get(mark.command) else {
            tracing::debug!("Ignoring mark on missing command {}", mark.command);
            continue;
        };
        if cmd.verb.is_flag(mark.param) {
            continue;
        }
        let Some(value) = cmd.params.get(mark.param).copied() else {
            tracing::debug!(
                "Ignoring mark on missing parameter {} of command {}",
                mark.param,
                mark.command
            );
            continue;
        };
        let Some(slot) = template
            .commands_mut()
            .get_mut(mark.command)
            .and_then(|c| c.params.get_mut(mark.param))
        else {
            continue;
        };
        let ratio = mark
            .ratio
            .unwrap_or_else(|| (value - mark.constant) / thickness);
        *slot = encode(value, ratio, mark.constant)?;
    }
    Ok(())
}

fn encode(value: f64, ratio: f64, constant: f64) -> TemplateResult<TemplateParam> {
    if !(ratio.is_finite() && constant.is_finite()) {
        return Err(TemplateError::NonFinite {
            expression: format!("{}*thickness + {}", ratio, constant),
        });
    }

    let source = if constant == 0.0 {
        if ratio == 0.0 {
            return Ok(TemplateParam::Literal(0.0));
        } else if ratio == 1.0 {
            "thickness".to_string()
        } else if ratio == -1.0 {
            return Ok(TemplateParam::symbolic("thickness")?.negated());
        } else {
            format!("{}*thickness", format_number(ratio))
        }
    } else {
        if ratio == 0.0 {
            return Ok(TemplateParam::Literal(value));
        }
        let term = if ratio == 1.0 {
            "thickness".to_string()
        } else if ratio == -1.0 {
            "-thickness".to_string()
        } else {
            format!("{}*thickness", format_number(ratio))
        };
        let sign = if constant < 0.0 { '-' } else { '+' };
        format!("{} {} {}", term, sign, format_number(constant.abs()))
    };

    TemplateParam::symbolic(&source)
}

/// Evaluate every parameter of `template` at `thickness`.
pub fn evaluate(template: &Template, thickness: f64) -> TemplateResult<Vec<PathCommand>> {
    template
        .commands()
        .iter()
        .map(|cmd| {
            let values = cmd
                .params
                .iter()
                .map(|p| p.evaluate(thickness))
                .collect::<TemplateResult<Vec<f64>>>()?;
            PathCommand::new(cmd.verb, cmd.position, &values).ok_or(TemplateError::Shape {
                command: cmd.verb.letter(cmd.position),
                expected: cmd.verb.arity(),
                found: values.len(),
            })
        })
        .collect()
}
