//! Fabrication session
//!
//! The engine API a host drives: one loaded document, its fabrication
//! context and the editing state (selection, highlights). All operations
//! run synchronously on `&mut self`.
//!
//! Batch passes never abort halfway. A shape whose pass fails is logged and
//! keeps its previous value; the rest of the document is still updated.

use laserkit_core::{EngineSettings, FabricationContext, LoadOverrides};
use laserkit_joints::JointKind;
use laserkit_path::{Position, Verb};
use laserkit_template::{apply_marks, evaluate, ParamMark, Template};
use serde::Serialize;

use crate::annotations::{Side, ThicknessAdjust};
use crate::document::{Document, Node};
use crate::error::{DesignerError, DesignerResult};
use crate::highlight::{
    length_highlights, segment_highlight, Highlight, HighlightTarget, LENGTH_HIGHLIGHT_CLASS,
};
use crate::jointing::apply_joint;
use crate::normalizer::normalize_rect;
use crate::shape::{Geometry, JointState, Shape, ShapeId};
use crate::transform::{apply_kerf, apply_thickness, scale_commands, scale_shape};

/// Class tag used for the segment highlighted on selection.
pub const SELECTION_TAG: &str = "pathTemplate";

/// Notifications from the engine to its host. Both default to no-ops.
pub trait HostCallbacks {
    /// The document is loaded and every load-time parameter applied.
    fn document_ready(&mut self, _session: &FabricationSession) {}

    /// A shape was selected; for paths `segment` is the clicked segment.
    fn element_selected(&mut self, _shape: &Shape, _segment: Option<usize>) {}
}

/// Host that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl HostCallbacks for NoHost {}

/// One generated joint, as listed in a [`DocumentSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointSummary {
    pub shape: String,
    pub kind: String,
    pub direction: String,
}

/// Overview of a loaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub material_thickness: f64,
    pub kerf: f64,
    pub scaling_factor: f64,
    pub shapes: usize,
    /// Shapes carrying a thickness template
    pub templated: usize,
    pub joints: Vec<JointSummary>,
}

#[derive(Debug, Clone)]
pub struct FabricationSession {
    document: Document,
    context: FabricationContext,
    settings: EngineSettings,
    selection: Option<ShapeId>,
    highlights: Vec<Highlight>,
}

impl FabricationSession {
    /// Wrap a parsed document. Root values the document does not declare
    /// (or declares out of range) come from `settings`.
    pub fn new(document: Document, settings: EngineSettings) -> DesignerResult<Self> {
        settings.validate()?;

        let thickness = match document.material_thickness {
            Some(t) if t > 0.0 => t,
            Some(t) => {
                tracing::warn!("Ignoring document material thickness {}", t);
                settings.defaults.material_thickness
            }
            None => settings.defaults.material_thickness,
        };
        let kerf = match document.kerf {
            Some(k) if k >= 0.0 => k,
            Some(k) => {
                tracing::warn!("Ignoring document kerf {}", k);
                settings.defaults.kerf
            }
            None => settings.defaults.kerf,
        };

        Ok(Self {
            document,
            context: FabricationContext::new(thickness, kerf)?,
            settings,
            selection: None,
            highlights: Vec::new(),
        })
    }

    /// Parse `source` and apply the load-time parameters in order: query
    /// thickness, query kerf, joint generation, query scale. The host is
    /// told once everything is in place.
    pub fn load(
        source: &str,
        overrides: &LoadOverrides,
        settings: EngineSettings,
        host: &mut dyn HostCallbacks,
    ) -> DesignerResult<Self> {
        let document = Document::parse(source)?;
        let mut session = Self::new(document, settings)?;

        if let Some(thickness) = overrides.thickness {
            session.update_thickness(thickness)?;
        }
        if let Some(kerf) = overrides.kerf {
            session.context.set_kerf(kerf)?;
        }
        session.create_joints();
        if let Some(factor) = overrides.scale_factor() {
            session.scale(factor)?;
        }

        tracing::info!(
            "Loaded document with {} shapes (thickness {}, kerf {}, scale {})",
            session.document.shapes().len(),
            session.context.material_thickness,
            session.context.kerf,
            session.context.scaling_factor
        );
        host.document_ready(&session);
        Ok(session)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn context(&self) -> &FabricationContext {
        &self.context
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.document.shape(id)
    }

    /// Shape by its element `id` attribute.
    pub fn find(&self, element_id: &str) -> Option<&Shape> {
        self.document.find(element_id)
    }

    pub fn selection(&self) -> Option<&Shape> {
        self.selection.and_then(|id| self.document.shape(id))
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn summary(&self) -> DocumentSummary {
        let shapes = self.document.shapes();
        let joints = shapes
            .iter()
            .filter_map(|shape| match shape.joint_state {
                JointState::Jointed { kind, direction } => Some(JointSummary {
                    shape: shape.label(),
                    kind: kind.to_string(),
                    direction: direction.to_string(),
                }),
                JointState::Unjointed => None,
            })
            .collect();
        DocumentSummary {
            material_thickness: self.context.material_thickness,
            kerf: self.context.kerf,
            scaling_factor: self.context.scaling_factor,
            shapes: shapes.len(),
            templated: shapes.iter().filter(|s| s.template.is_some()).count(),
            joints,
        }
    }

    /// Run `pass` over every shape. `Ok(None)` leaves a shape as it is.
    /// Returns the number of shapes whose pass failed.
    fn transform_shapes<F>(&mut self, name: &str, mut pass: F) -> usize
    where
        F: FnMut(&Shape) -> DesignerResult<Option<Shape>>,
    {
        let mut failures = 0;
        self.document.update_shapes(|shape| match pass(shape) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("{} failed for {}: {}", name, shape.label(), e);
                failures += 1;
                None
            }
        });
        failures
    }

    fn clear_overlays(&mut self) {
        if !self.highlights.is_empty() {
            tracing::debug!("Dropping {} highlights before regeneration", self.highlights.len());
            self.highlights.clear();
        }
    }

    /// Set the document material thickness and regenerate every dependent
    /// shape. Calling it again with the same value changes nothing.
    pub fn update_thickness(&mut self, thickness: f64) -> DesignerResult<()> {
        self.context.set_material_thickness(thickness)?;
        self.clear_overlays();
        let ctx = self.context;
        let failures = self.transform_shapes("Thickness update", |s| apply_thickness(s, &ctx).map(Some));
        tracing::info!("Material thickness set to {} ({} failures)", thickness, failures);
        Ok(())
    }

    /// Scale the drawing by `factor`, compounding with earlier calls.
    pub fn scale(&mut self, factor: f64) -> DesignerResult<()> {
        self.context.compound_scale(factor)?;
        self.clear_overlays();
        let ctx = self.context;
        let failures = self.transform_shapes("Scale", |s| scale_shape(s, factor, &ctx).map(Some));
        self.document.for_each_group(|group| group.scale_translation(factor));
        self.document.scale_canvas(factor);
        tracing::info!(
            "Scaled by {} (cumulative {}, {} failures)",
            factor,
            ctx.scaling_factor,
            failures
        );
        Ok(())
    }

    /// Set the kerf. Compact finger joints, whose relief arcs depend on it,
    /// are regenerated.
    pub fn set_kerf(&mut self, kerf: f64) -> DesignerResult<()> {
        self.context.set_kerf(kerf)?;
        let ctx = self.context;
        let joints = self.settings.joints;
        self.transform_shapes("Joint regeneration", |shape| match shape.joint_state {
            JointState::Jointed {
                kind: JointKind::FingerCompact,
                ..
            } => apply_joint(shape, &joints, &ctx),
            _ => Ok(None),
        });
        tracing::info!("Kerf set to {}", kerf);
        Ok(())
    }

    /// Apply kerf compensation to the live document.
    ///
    /// Each call compensates again; exports use [`image_for_export`]
    /// instead, which works on a copy.
    ///
    /// [`image_for_export`]: FabricationSession::image_for_export
    pub fn adjust_for_kerf(&mut self) {
        let kerf = self.context.kerf;
        self.document.update_shapes(|shape| Some(apply_kerf(shape, kerf)));
    }

    /// Split rectangles with side joints into edge paths, then regenerate
    /// every joint. Returns the number of joints generated.
    pub fn create_joints(&mut self) -> usize {
        self.clear_overlays();
        let ctx = self.context;
        let joints = self.settings.joints;

        let mut split = 0;
        self.document.expand_shapes(|shape| {
            if !shape.annotations.has_side_joints() {
                return None;
            }
            let sides = normalize_rect(shape)?;
            split += 1;
            Some(
                sides
                    .into_iter()
                    .map(|mut side| {
                        if ctx.scaling_factor != 1.0 {
                            side.template = side.path().map(|p| {
                                Template::from_path(&scale_commands(p, 1.0 / ctx.scaling_factor))
                            });
                        }
                        side
                    })
                    .collect(),
            )
        });
        if split > 0 {
            tracing::debug!("Split {} rectangles into edge paths", split);
        }
        if let Some(id) = self.selection {
            if self.document.shape(id).is_none() {
                self.selection = None;
            }
        }

        let mut generated = 0;
        let failures = self.transform_shapes("Joint generation", |shape| {
            let next = apply_joint(shape, &joints, &ctx)?;
            generated += usize::from(next.is_some());
            Ok(next)
        });
        tracing::info!("Generated {} joints ({} failures)", generated, failures);
        generated
    }

    /// Set the joint type of every joint in the document and regenerate.
    /// Returns the number of shapes changed.
    pub fn set_joint_type_for_all(&mut self, kind: JointKind) -> usize {
        let mut changed = 0;
        self.document.update_shapes(|shape| {
            let a = &shape.annotations;
            if !a.joint.is_marked() && !a.has_side_joints() {
                return None;
            }
            let mut next = shape.clone();
            if next.annotations.joint.is_marked() {
                next.annotations.joint.kind = Some(kind);
            }
            for side in Side::ALL {
                let joint = next.annotations.side_mut(side);
                if joint.is_marked() {
                    joint.kind = Some(kind);
                }
            }
            changed += 1;
            Some(next)
        });
        self.create_joints();
        changed
    }

    /// Kerf-compensated copy of the document with the fabrication
    /// parameters on the root. The session itself is not modified.
    pub fn image_for_export(&self) -> String {
        let mut copy = self.document.clone();
        let kerf = self.context.kerf;
        copy.update_shapes(|shape| Some(apply_kerf(shape, kerf)));
        copy.stamp(self.context.material_thickness, kerf);
        copy.to_svg_string()
    }

    /// The document as it should be saved for further editing: no kerf
    /// applied, templates kept, parameters on the root.
    pub fn image_for_saving(&self) -> String {
        let mut copy = self.document.clone();
        copy.stamp(self.context.material_thickness, self.context.kerf);
        copy.to_svg_string()
    }

    /// The document with highlight overlays, for display.
    pub fn render(&self) -> String {
        let prefix = self.document.prefix();
        let overlays: Vec<Node> = self.highlights.iter().map(|h| h.to_node(prefix)).collect();
        self.document.write_with(&overlays)
    }

    /// Select a shape, highlighting `segment` for paths, and tell the host.
    /// Returns `false` if no shape has `id`.
    pub fn select(
        &mut self,
        id: ShapeId,
        segment: Option<usize>,
        host: &mut dyn HostCallbacks,
    ) -> bool {
        let Some(shape) = self.document.shape(id).cloned() else {
            tracing::debug!("Cannot select missing shape {}", id);
            return false;
        };
        self.selection = Some(id);
        if let Some(index) = segment {
            self.highlight_path_segment(id, index, SELECTION_TAG);
        }
        host.element_selected(&shape, segment);
        true
    }

    /// Set one annotation (or `template`) on the selected shape.
    /// Returns `Ok(false)` when nothing is selected.
    pub fn set_property_for_selection(&mut self, name: &str, value: &str) -> DesignerResult<bool> {
        let Some(id) = self.selection else {
            tracing::debug!("No selection for property {}", name);
            return Ok(false);
        };
        let Some(shape) = self.document.shape(id) else {
            self.selection = None;
            return Ok(false);
        };

        let mut next = shape.clone();
        if name == "template" {
            next.template = Some(Template::parse(value)?);
        } else {
            next.annotations.set(name, value)?;
        }
        Ok(self.document.replace_shape(id, next))
    }

    /// Highlight the segment of path `id` ending at command `index`,
    /// replacing any earlier highlight of the same tag.
    pub fn highlight_path_segment(&mut self, id: ShapeId, index: usize, tag: &str) -> bool {
        let Some(highlight) = self
            .document
            .shape(id)
            .and_then(|shape| segment_highlight(shape, index, tag))
        else {
            return false;
        };
        self.highlights.retain(|h| h.class != highlight.class);
        self.highlights.push(highlight);
        true
    }

    /// Highlight every rectangle side and path segment of length `length`.
    /// Returns the number of highlights added.
    pub fn highlight_elements_with_length(&mut self, length: f64) -> usize {
        self.remove_highlights(LENGTH_HIGHLIGHT_CLASS);
        let thickness = self.context.material_thickness;
        let found: Vec<Highlight> = self
            .document
            .shapes()
            .into_iter()
            .flat_map(|shape| length_highlights(shape, length, thickness))
            .collect();
        let count = found.len();
        self.highlights.extend(found);
        count
    }

    /// Remove every highlight of `class`. Returns the number removed.
    pub fn remove_highlights(&mut self, class: &str) -> usize {
        let before = self.highlights.len();
        self.highlights.retain(|h| h.class != class);
        before - self.highlights.len()
    }

    pub fn remove_segment_highlights(&mut self) -> usize {
        self.remove_highlights(LENGTH_HIGHLIGHT_CLASS)
    }

    /// Make the dimension behind a length highlight follow the thickness:
    /// a rectangle side sets `thickness-adjust`, a relative line segment
    /// gets both of its components templated.
    pub fn accept_length_highlight(&mut self, index: usize) -> DesignerResult<bool> {
        let Some(highlight) = self
            .highlights
            .get(index)
            .filter(|h| h.class == LENGTH_HIGHLIGHT_CLASS)
            .cloned()
        else {
            return Ok(false);
        };
        let Some(shape) = self.document.shape(highlight.shape) else {
            return Ok(false);
        };

        match highlight.target {
            HighlightTarget::Width | HighlightTarget::Height => {
                let current = shape.annotations.thickness_adjust;
                let adjust = match (highlight.target, current) {
                    (HighlightTarget::Width, ThicknessAdjust::Height)
                    | (HighlightTarget::Height, ThicknessAdjust::Width)
                    | (_, ThicknessAdjust::Both) => ThicknessAdjust::Both,
                    (HighlightTarget::Width, _) => ThicknessAdjust::Width,
                    _ => ThicknessAdjust::Height,
                };
                let mut next = shape.clone();
                next.annotations.thickness_adjust = adjust;
                Ok(self.document.replace_shape(highlight.shape, next))
            }
            HighlightTarget::Segment(command) => {
                let relative_line = shape.path().and_then(|p| p.get(command)).is_some_and(|c| {
                    c.verb == Verb::Line && c.position == Position::Relative
                });
                if !relative_line {
                    tracing::debug!("Segment {} of {} is not a relative line", command, shape.label());
                    return Ok(false);
                }
                Ok(self.mark_thickness_parameter(highlight.shape, command, 0)?
                    && self.mark_thickness_parameter(highlight.shape, command, 1)?)
            }
        }
    }

    /// Make one parameter of a path's template proportional to the
    /// material thickness. A path without a template gets one first.
    pub fn mark_thickness_parameter(
        &mut self,
        id: ShapeId,
        command: usize,
        param: usize,
    ) -> DesignerResult<bool> {
        let Some(shape) = self.document.shape(id) else {
            tracing::debug!("Cannot mark parameter on missing shape {}", id);
            return Ok(false);
        };
        let Geometry::Path(commands) = &shape.geometry else {
            return Err(DesignerError::UnsupportedGeometry(format!(
                "{} is a {}, not a path",
                shape.label(),
                shape.geometry.tag()
            )));
        };

        let ctx = self.context;
        let thickness = ctx.design_thickness(ctx.effective_thickness(shape.annotations.thickness));
        let (mut template, concrete) = match &shape.template {
            Some(template) => (template.clone(), evaluate(template, thickness)?),
            None => {
                let design = scale_commands(commands, 1.0 / ctx.scaling_factor);
                (Template::from_path(&design), design)
            }
        };
        if concrete.get(command).and_then(|c| c.params.get(param)).is_none() {
            tracing::debug!("{} has no parameter {} on command {}", shape.label(), param, command);
            return Ok(false);
        }

        apply_marks(&mut template, &concrete, &[ParamMark::new(command, param)], thickness)?;
        let mut next = shape.clone();
        next.template = Some(template);
        Ok(self.document.replace_shape(id, next))
    }
}
