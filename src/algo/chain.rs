//! Operator chains: an ordered list of configured operator steps.
//!
//! Each [`OpStep`] names an operator, up to two numeric parameters, a
//! selector and a tag filter. [`apply_chain`] runs the steps strictly in
//! order; every step sees only the previous step's output.
//!
//! # Example
//!
//! ```
//! use conway::algo::chain::{apply_chain, OpKind, OpStep};
//! use conway::algo::Progress;
//! use conway::shapes;
//!
//! let steps = [
//!     OpStep::new(OpKind::Ambo),
//!     OpStep::new(OpKind::Kis).with_amount(0.1),
//!     OpStep::new(OpKind::Dual).disabled(),
//! ];
//! let result = apply_chain(&shapes::cube(), &steps, None, &Progress::none()).unwrap();
//! assert_eq!(result.num_faces(), 48);
//! ```

use std::fmt;
use std::str::FromStr;

use log::debug;
use nalgebra::Vector3;
use rand::RngCore;

use crate::error::{PolyError, Result};
use crate::mesh::{parse_tags, ConwayPoly, TagSet};

use super::canonicalize::{canonicalize, CanonicalizeOptions};
use super::conway::{self, KisOptions, LaceOptions};
use super::faces;
use super::transform::{self, FaceRotateAxis};
use super::weld::weld;
use super::{Jitter, Progress, Selector};

/// Number of shells [`OpKind::Layer`] adds.
pub const LAYER_COUNT: usize = 3;

/// Size limit at which [`OpKind::Stack`] stops adding copies.
pub const STACK_LIMIT: f64 = 0.1;

macro_rules! op_kinds {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
        /// An operator that can appear in a chain.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum OpKind {
            $($(#[$doc])* $variant,)*
        }

        const OP_NAMES: &[(&str, OpKind)] = &[$(($name, OpKind::$variant),)*];
    };
}

op_kinds! {
    /// No change.
    Identity => "identity",
    /// [`conway::dual`].
    Dual => "dual",
    /// [`conway::add_dual`]; amount is the dual's radius.
    AddDual => "adddual",
    /// [`conway::zip`].
    Zip => "zip",
    /// [`conway::ambo`].
    Ambo => "ambo",
    /// [`conway::truncate`] on the selected vertices.
    Truncate => "truncate",
    /// [`conway::bevel`].
    Bevel => "bevel",
    /// [`conway::expand`].
    Expand => "expand",
    /// [`conway::chamfer`].
    Chamfer => "chamfer",
    /// [`conway::ortho`].
    Ortho => "ortho",
    /// [`conway::gyro`]; amount2 is the offset.
    Gyro => "gyro",
    /// [`conway::propeller`].
    Propeller => "propeller",
    /// [`conway::whirl`].
    Whirl => "whirl",
    /// [`conway::volute`].
    Volute => "volute",
    /// [`conway::kis`] on the selected faces.
    Kis => "kis",
    /// [`conway::join`].
    Join => "join",
    /// [`conway::needle`].
    Needle => "needle",
    /// [`conway::meta`]; amount2 is the vertex offset.
    Meta => "meta",
    /// [`conway::join_kis_kis`]; amount2 is the offset.
    JoinKisKis => "joinkiskis",
    /// [`conway::subdivide`].
    Subdivide => "subdivide",
    /// [`conway::cross`].
    Cross => "cross",
    /// [`conway::squall`].
    Squall => "squall",
    /// [`conway::squall`] with joined corners.
    JoinedSquall => "joinedsquall",
    /// [`conway::loft`] on the selected faces; amount2 is the offset.
    Loft => "loft",
    /// [`conway::quinto`]; amount2 is the offset.
    Quinto => "quinto",
    /// [`conway::lace`] on the selected faces; amount2 is the offset.
    Lace => "lace",
    /// [`conway::joined_lace`]; amount2 is the offset.
    JoinedLace => "joinedlace",
    /// [`conway::opposite_lace`]; amount2 is the offset.
    OppositeLace => "oppositelace",
    /// [`conway::stake`] on the selected faces.
    Stake => "stake",
    /// [`conway::stake`] with joined corners.
    JoinedStake => "joinedstake",
    /// [`conway::medial`]; amount is the division count, amount2 the offset.
    Medial => "medial",
    /// [`conway::edge_medial`]; as [`OpKind::Medial`].
    EdgeMedial => "edgemedial",
    /// [`transform::rotate`] about y; amount is in degrees.
    Rotate => "rotate",
    /// [`ConwayPoly::scale_polyhedra`]; amount is the radius.
    Scale => "scale",
    /// [`ConwayPoly::recenter`].
    Recenter => "recenter",
    /// [`transform::stretch`].
    Stretch => "stretch",
    /// [`transform::sit_level`].
    SitLevel => "sitlevel",
    /// [`transform::spherize`] on the selected vertices.
    Spherize => "spherize",
    /// [`ConwayPoly::hinge`]; amount is in degrees.
    Hinge => "hinge",
    /// [`transform::face_slide`]; amount2 is the direction.
    FaceSlide => "faceslide",
    /// [`transform::vertex_scale`].
    VertexScale => "vertexscale",
    /// [`transform::vertex_flex`].
    VertexFlex => "vertexflex",
    /// [`transform::vertex_rotate`].
    VertexRotate => "vertexrotate",
    /// [`transform::face_scale`].
    FaceScale => "facescale",
    /// [`transform::face_rotate`] about the horizontal axis.
    FaceRotate => "facerotate",
    /// [`transform::add_mirrored`] across x = amount.
    Mirror => "mirror",
    /// [`transform::add_copy`] along y.
    AddCopy => "addcopy",
    /// [`transform::stack`] along y; amount2 is the scale.
    Stack => "stack",
    /// [`faces::face_remove`].
    FaceRemove => "faceremove",
    /// [`faces::face_keep`].
    FaceKeep => "facekeep",
    /// [`faces::vertex_remove`].
    VertexRemove => "vertexremove",
    /// [`faces::collapse`].
    Collapse => "collapse",
    /// [`faces::face_merge`].
    FaceMerge => "facemerge",
    /// [`faces::slice`]; amount and amount2 bound the band.
    Slice => "slice",
    /// [`faces::layer`] with [`LAYER_COUNT`] shells; amount is the scale,
    /// amount2 the offset.
    Layer => "layer",
    /// [`faces::offset`].
    Offset => "offset",
    /// [`faces::offset_faces`].
    OffsetFaces => "offsetfaces",
    /// [`faces::extrude`].
    Extrude => "extrude",
    /// [`faces::extrude`], centred on the surface.
    ExtrudeSymmetric => "extrudesymmetric",
    /// [`faces::extrude_faces`].
    ExtrudeFaces => "extrudefaces",
    /// [`ConwayPoly::tag_faces`] with the step's tags.
    TagFaces => "tagfaces",
    /// [`ConwayPoly::fill_holes`].
    FillHoles => "fillholes",
    /// [`weld`]; amount is the distance.
    Weld => "weld",
    /// [`canonicalize`]; amount is the threshold of both passes.
    Canonicalize => "canonicalize",
}

impl OpKind {
    /// Every operator, in declaration order.
    pub fn all() -> impl Iterator<Item = OpKind> {
        OP_NAMES.iter().map(|(_, kind)| *kind)
    }

    /// The lowercase name used by [`FromStr`].
    pub fn name(self) -> &'static str {
        OP_NAMES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    /// Whether the operator consumes random factors when asked to.
    pub fn is_randomizable(self) -> bool {
        matches!(
            self,
            OpKind::Truncate
                | OpKind::Bevel
                | OpKind::Ortho
                | OpKind::Gyro
                | OpKind::Kis
                | OpKind::Needle
                | OpKind::Meta
                | OpKind::Loft
                | OpKind::Quinto
                | OpKind::Lace
                | OpKind::JoinedLace
                | OpKind::OppositeLace
                | OpKind::FaceSlide
                | OpKind::VertexScale
                | OpKind::VertexFlex
                | OpKind::VertexRotate
                | OpKind::FaceScale
                | OpKind::FaceRotate
                | OpKind::Offset
                | OpKind::OffsetFaces
                | OpKind::Extrude
                | OpKind::ExtrudeSymmetric
        )
    }
}

impl FromStr for OpKind {
    type Err = PolyError;

    /// Parse an operator name, case-insensitively, ignoring `-` and `_`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        OP_NAMES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| PolyError::invalid_param("operator", s, "unknown operator"))
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One configured step of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct OpStep {
    /// The operator.
    pub kind: OpKind,
    /// Main parameter.
    pub amount: f64,
    /// Secondary parameter, where the operator has one.
    pub amount2: f64,
    /// Face or vertex selector.
    pub selector: Selector,
    /// Face tag filter. Empty does not filter.
    pub tags: TagSet,
    /// Skip this step.
    pub disabled: bool,
    /// Draw random factors from the chain's source.
    pub randomize: bool,
}

impl OpStep {
    /// A step with zero amounts, selecting everything.
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            amount: 0.0,
            amount2: 0.0,
            selector: Selector::All,
            tags: TagSet::new(),
            disabled: false,
            randomize: false,
        }
    }

    /// Set the main parameter.
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    /// Set the secondary parameter.
    pub fn with_amount2(mut self, amount2: f64) -> Self {
        self.amount2 = amount2;
        self
    }

    /// Set the selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Set the tag filter from a comma-separated string.
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }

    /// Mark the step as skipped.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Draw random factors for this step.
    pub fn randomized(mut self) -> Self {
        self.randomize = true;
        self
    }
}

impl FromStr for OpStep {
    type Err = PolyError;

    /// Parse `kind[:amount[:amount2]]`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let kind: OpKind = parts.next().unwrap_or_default().parse()?;
        let mut step = OpStep::new(kind);
        if let Some(a) = parts.next() {
            step.amount = parse_amount(a)?;
        }
        if let Some(a) = parts.next() {
            step.amount2 = parse_amount(a)?;
        }
        if parts.next().is_some() {
            return Err(PolyError::invalid_param("step", s, "expected kind[:amount[:amount2]]"));
        }
        Ok(step)
    }
}

fn parse_amount(s: &str) -> Result<f64> {
    s.trim()
        .parse()
        .map_err(|_| PolyError::invalid_param("amount", s, "not a number"))
}

/// Run `steps` in order on a copy of `poly`.
///
/// Disabled steps are skipped. Steps marked `randomize` draw their factors
/// from `rng`; without one they behave as if unmarked.
pub fn apply_chain(
    poly: &ConwayPoly,
    steps: &[OpStep],
    mut rng: Option<&mut dyn RngCore>,
    progress: &Progress,
) -> Result<ConwayPoly> {
    let mut current = poly.duplicate();
    for (i, step) in steps.iter().enumerate() {
        progress.report(i, steps.len(), step.kind.name());
        if step.disabled {
            debug!("step {} ({}) disabled", i, step.kind);
            continue;
        }
        let mut jitter = if step.randomize {
            Jitter::from_option(rng.as_mut().map(|r| &mut **r as &mut dyn RngCore))
        } else {
            Jitter::none()
        };
        current = apply_step(&current, step, &mut jitter)?;
        debug!(
            "step {} ({} {} {}): {} vertices, {} faces",
            i,
            step.kind,
            step.amount,
            step.amount2,
            current.num_vertices(),
            current.num_faces()
        );
    }
    Ok(current)
}

/// Run one step.
pub fn apply_step(poly: &ConwayPoly, step: &OpStep, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let OpStep {
        kind,
        amount: a,
        amount2: b,
        selector: sel,
        ref tags,
        ..
    } = *step;

    Ok(match kind {
        OpKind::Identity => poly.duplicate(),
        OpKind::Dual => conway::dual(poly)?,
        OpKind::AddDual => conway::add_dual(poly, a)?,
        OpKind::Zip => conway::zip(poly, a)?,
        OpKind::Ambo => conway::ambo(poly)?,
        OpKind::Truncate => conway::truncate(poly, a, sel, jitter)?,
        OpKind::Bevel => conway::bevel(poly, a, jitter)?,
        OpKind::Expand => conway::expand(poly, a)?,
        OpKind::Chamfer => conway::chamfer(poly, a)?,
        OpKind::Ortho => conway::ortho(poly, a, jitter)?,
        OpKind::Gyro => conway::gyro(poly, a, b, jitter)?,
        OpKind::Propeller => conway::propeller(poly, a)?,
        OpKind::Whirl => conway::whirl(poly, a)?,
        OpKind::Volute => conway::volute(poly, a)?,
        OpKind::Kis => {
            let options = KisOptions::new(a).with_selector(sel).with_tags(tags.clone());
            conway::kis(poly, &options, jitter)?
        }
        OpKind::Join => conway::join(poly, a)?,
        OpKind::Needle => conway::needle(poly, a, jitter)?,
        OpKind::Meta => conway::meta(poly, a, b, jitter)?,
        OpKind::JoinKisKis => conway::join_kis_kis(poly, a, b)?,
        OpKind::Subdivide => conway::subdivide(poly, a)?,
        OpKind::Cross => conway::cross(poly, a)?,
        OpKind::Squall => conway::squall(poly, a, false)?,
        OpKind::JoinedSquall => conway::squall(poly, a, true)?,
        OpKind::Loft => conway::loft(poly, a, b, sel, tags, jitter)?,
        OpKind::Quinto => conway::quinto(poly, a, b, jitter)?,
        OpKind::Lace => {
            let options = LaceOptions::new(a)
                .with_offset(b)
                .with_selector(sel)
                .with_tags(tags.clone());
            conway::lace(poly, &options, jitter)?
        }
        OpKind::JoinedLace => conway::joined_lace(poly, a, b, jitter)?,
        OpKind::OppositeLace => conway::opposite_lace(poly, a, b, jitter)?,
        OpKind::Stake => conway::stake(poly, a, sel, tags, false)?,
        OpKind::JoinedStake => conway::stake(poly, a, sel, tags, true)?,
        OpKind::Medial => conway::medial(poly, divisions(a), b)?,
        OpKind::EdgeMedial => conway::edge_medial(poly, divisions(a), b)?,
        OpKind::Rotate => transform::rotate(poly, &Vector3::y(), a),
        OpKind::Scale => {
            let mut out = poly.duplicate();
            out.scale_polyhedra(a);
            out
        }
        OpKind::Recenter => {
            let mut out = poly.duplicate();
            out.recenter();
            out
        }
        OpKind::Stretch => transform::stretch(poly, a),
        OpKind::SitLevel => transform::sit_level(poly, a),
        OpKind::Spherize => transform::spherize(poly, a, sel),
        OpKind::Hinge => {
            let mut out = poly.duplicate();
            out.hinge(a);
            out
        }
        OpKind::FaceSlide => transform::face_slide(poly, a, b, sel, tags, jitter),
        OpKind::VertexScale => transform::vertex_scale(poly, a, sel, jitter),
        OpKind::VertexFlex => transform::vertex_flex(poly, a, sel, tags, jitter),
        OpKind::VertexRotate => transform::vertex_rotate(poly, a, sel, tags, jitter),
        OpKind::FaceScale => transform::face_scale(poly, a, sel, tags, jitter)?,
        OpKind::FaceRotate => transform::face_rotate(poly, a, sel, tags, FaceRotateAxis::default(), jitter)?,
        OpKind::Mirror => transform::add_mirrored(poly, &Vector3::x(), a, sel, tags)?,
        OpKind::AddCopy => transform::add_copy(poly, &Vector3::y(), a, sel, tags)?,
        OpKind::Stack => transform::stack(poly, &Vector3::y(), a, b, STACK_LIMIT, sel, tags)?,
        OpKind::FaceRemove => faces::face_remove(poly, sel, tags)?,
        OpKind::FaceKeep => faces::face_keep(poly, sel, tags)?,
        OpKind::VertexRemove => faces::vertex_remove(poly, sel, false)?,
        OpKind::Collapse => faces::collapse(poly, sel, false)?,
        OpKind::FaceMerge => faces::face_merge(poly, sel)?,
        OpKind::Slice => faces::slice(poly, a, b, tags)?,
        OpKind::Layer => faces::layer(poly, LAYER_COUNT, a, b, sel, tags)?,
        OpKind::Offset => faces::offset(poly, a, jitter),
        OpKind::OffsetFaces => faces::offset_faces(poly, a, sel, tags, jitter),
        OpKind::Extrude => faces::extrude(poly, a, false, jitter)?,
        OpKind::ExtrudeSymmetric => faces::extrude(poly, a, true, jitter)?,
        OpKind::ExtrudeFaces => faces::extrude_faces(poly, a, sel, tags)?,
        OpKind::TagFaces => {
            let mut out = poly.duplicate();
            out.tag_faces(tags, sel);
            out
        }
        OpKind::FillHoles => {
            let mut out = poly.duplicate();
            out.fill_holes();
            out
        }
        OpKind::Weld => weld(poly, a)?,
        OpKind::Canonicalize => {
            let threshold = if a > 0.0 { a } else { 1e-6 };
            canonicalize(poly, &CanonicalizeOptions::thresholds(threshold, threshold))?.0
        }
    })
}

fn divisions(amount: f64) -> usize {
    amount.round().max(1.0) as usize
}
