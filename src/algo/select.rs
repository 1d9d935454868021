//! Face and vertex selectors.
//!
//! A [`Selector`] names a class of faces (or vertices). Operators that act
//! on a subset take one, plus an optional tag filter for faces. Face and
//! vertex evaluation are separate functions because not every class means
//! the same thing for both.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

use crate::error::PolyError;
use crate::mesh::{tags_match, ConwayPoly, FaceId, Role, TagSet, VertexId};

/// Tolerance for direction tests. Component tests compare the raw normal
/// component against it; angle tests compare in degrees.
pub const TOLERANCE: f64 = 0.02;

/// Area threshold between `Smaller` and `Larger`.
pub const AREA_THRESHOLD: f64 = 0.05;

/// A class of faces or vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selector {
    /// Everything.
    #[default]
    All,
    /// Nothing.
    None,
    /// A pseudo-random half, fixed per index.
    Random,
    /// Odd indices.
    Odd,
    /// Even indices.
    Even,
    /// Index 0 only.
    OnlyFirst,
    /// Everything but index 0.
    ExceptFirst,
    /// Role `Existing` (faces also accept `ExistingAlt`).
    Existing,
    /// Role `New`.
    New,
    /// Role `NewAlt`.
    NewAlt,
    /// Role `New` or `NewAlt`.
    AllNew,
    /// Role `Ignored`.
    Ignored,
    /// Normal has a positive y component.
    FacingUp,
    /// Normal within tolerance of +y.
    FacingStraightUp,
    /// Normal has a negative y component.
    FacingDown,
    /// Normal within tolerance of -y.
    FacingStraightDown,
    /// Normal has a positive z component.
    FacingForward,
    /// Normal within tolerance of +z.
    FacingStraightForward,
    /// Normal is horizontal.
    FacingLevel,
    /// Normal is parallel to the line from the origin.
    FacingCenter,
    /// Reversed normal at least 90 degrees from the position.
    FacingIn,
    /// Reversed normal at most 90 degrees from the position.
    FacingOut,
    /// Centroid (or position) above y = 0.
    TopHalf,
    /// No naked edges.
    Inner,
    /// At least one naked edge.
    Outer,
    /// Area at most [`AREA_THRESHOLD`].
    Smaller,
    /// Area above [`AREA_THRESHOLD`].
    Larger,
    /// Exactly `n` sides (faces) or `n` incident edges (vertices), 3 to 12.
    Sided(u8),
    /// Even side count or degree.
    EvenSided,
    /// Odd side count or degree.
    OddSided,
    /// Side count or degree equal to the seed's `p`.
    PSided,
    /// Side count or degree equal to the seed's `q`.
    QSided,
}

impl ConwayPoly {
    /// Whether face `f` belongs to `selector` and matches `tags`.
    ///
    /// An empty tag set does not filter.
    pub fn include_face(&self, f: FaceId, selector: Selector, tags: &TagSet) -> bool {
        tags_match(self.face_tags(f), tags) && self.select_face(f, selector)
    }

    fn select_face(&self, f: FaceId, selector: Selector) -> bool {
        let i = f.index();
        let role = self.face_role(f);
        match selector {
            Selector::All => true,
            Selector::None => false,
            Selector::Random => coin(i),
            Selector::Odd => i % 2 == 1,
            Selector::Even => i % 2 == 0,
            Selector::OnlyFirst => i == 0,
            Selector::ExceptFirst => i != 0,
            Selector::Existing => matches!(role, Role::Existing | Role::ExistingAlt),
            Selector::New => role == Role::New,
            Selector::NewAlt => role == Role::NewAlt,
            Selector::AllNew => role.is_new(),
            Selector::Ignored => role == Role::Ignored,
            Selector::FacingUp => self.face_normal(f).y > TOLERANCE,
            Selector::FacingStraightUp => angle_deg(&Vector3::y(), &self.face_normal(f)) < TOLERANCE,
            Selector::FacingDown => self.face_normal(f).y < -TOLERANCE,
            Selector::FacingStraightDown => {
                angle_deg(&-Vector3::y(), &self.face_normal(f)) < TOLERANCE
            }
            Selector::FacingForward => self.face_normal(f).z > TOLERANCE,
            Selector::FacingStraightForward => {
                angle_deg(&Vector3::z(), &self.face_normal(f)) < TOLERANCE
            }
            Selector::FacingLevel => self.face_normal(f).y.abs() < TOLERANCE,
            Selector::FacingCenter => {
                facing_center(&self.face_normal(f), &self.face_centroid(f).coords)
            }
            Selector::FacingIn => {
                angle_deg(&-self.face_normal(f), &self.face_centroid(f).coords) > 90.0 - TOLERANCE
            }
            Selector::FacingOut => {
                angle_deg(&-self.face_normal(f), &self.face_centroid(f).coords) < 90.0 + TOLERANCE
            }
            Selector::TopHalf => self.face_centroid(f).y > 0.0,
            Selector::Inner => !self.is_boundary_face(f),
            Selector::Outer => self.is_boundary_face(f),
            Selector::Smaller => self.face_area(f) <= AREA_THRESHOLD,
            Selector::Larger => self.face_area(f) > AREA_THRESHOLD,
            Selector::Sided(n) => self.face_sides(f) == n as usize,
            Selector::EvenSided => self.face_sides(f) % 2 == 0,
            Selector::OddSided => self.face_sides(f) % 2 != 0,
            Selector::PSided => self.face_sides(f) == self.pq.0,
            Selector::QSided => self.face_sides(f) == self.pq.1,
        }
    }

    /// Whether vertex `v` belongs to `selector`.
    ///
    /// Side-count classes compare the vertex degree, except `Sided(3)`,
    /// which also takes degree-2 boundary corners. Area classes never match
    /// a vertex; `Inner`/`Outer` test whether it lies on the boundary.
    pub fn include_vertex(&self, v: VertexId, selector: Selector) -> bool {
        let i = v.index();
        let role = self.vertex_role(v);
        let pos = self.position(v).coords;
        match selector {
            Selector::All => true,
            Selector::None => false,
            Selector::Random => coin(i),
            Selector::Odd => i % 2 == 1,
            Selector::Even => i % 2 == 0,
            Selector::OnlyFirst => i == 0,
            Selector::ExceptFirst => i != 0,
            Selector::Existing => role == Role::Existing,
            Selector::New => role == Role::New,
            Selector::NewAlt => role == Role::NewAlt,
            Selector::AllNew => role.is_new(),
            Selector::Ignored => role == Role::Ignored,
            Selector::FacingUp => self.vertex_normal(v).y > TOLERANCE,
            Selector::FacingStraightUp => {
                angle_deg(&Vector3::y(), &self.vertex_normal(v)) < TOLERANCE
            }
            Selector::FacingDown => self.vertex_normal(v).y < -TOLERANCE,
            Selector::FacingStraightDown => {
                angle_deg(&-Vector3::y(), &self.vertex_normal(v)) < TOLERANCE
            }
            Selector::FacingForward => self.vertex_normal(v).z > TOLERANCE,
            Selector::FacingStraightForward => {
                angle_deg(&Vector3::z(), &self.vertex_normal(v)) < TOLERANCE
            }
            Selector::FacingLevel => self.vertex_normal(v).y.abs() < TOLERANCE,
            Selector::FacingCenter => facing_center(&self.vertex_normal(v), &pos),
            Selector::FacingIn => angle_deg(&-self.vertex_normal(v), &pos) > 90.0 - TOLERANCE,
            Selector::FacingOut => angle_deg(&-self.vertex_normal(v), &pos) < 90.0 + TOLERANCE,
            Selector::TopHalf => pos.y > 0.0,
            Selector::Inner => !self.is_boundary_vertex(v),
            Selector::Outer => self.is_boundary_vertex(v),
            Selector::Smaller | Selector::Larger => false,
            Selector::Sided(3) => self.vertex_degree(v) <= 3,
            Selector::Sided(n) => self.vertex_degree(v) == n as usize,
            Selector::EvenSided => self.vertex_degree(v) % 2 == 0,
            Selector::OddSided => self.vertex_degree(v) % 2 != 0,
            Selector::PSided => self.vertex_degree(v) == self.pq.0,
            Selector::QSided => self.vertex_degree(v) == self.pq.1,
        }
    }

    /// Ids of the faces selected by `selector` and `tags`.
    pub fn selected_faces(&self, selector: Selector, tags: &TagSet) -> Vec<FaceId> {
        self.face_ids()
            .filter(|&f| self.include_face(f, selector, tags))
            .collect()
    }

    /// Ids of the vertices selected by `selector`.
    pub fn selected_vertices(&self, selector: Selector) -> Vec<VertexId> {
        self.vertex_ids()
            .filter(|&v| self.include_vertex(v, selector))
            .collect()
    }
}

/// Angle between two vectors in degrees; 0 when either is zero.
fn angle_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

fn facing_center(normal: &Vector3<f64>, position: &Vector3<f64>) -> bool {
    let angle = angle_deg(&-normal, position);
    angle.abs() < TOLERANCE || (angle - 180.0).abs() < TOLERANCE
}

/// Deterministic fair coin per index (splitmix64 finaliser).
fn coin(i: usize) -> bool {
    let mut z = (i as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    z & 1 == 1
}

const NAMED: &[(&str, Selector)] = &[
    ("all", Selector::All),
    ("none", Selector::None),
    ("random", Selector::Random),
    ("odd", Selector::Odd),
    ("even", Selector::Even),
    ("onlyfirst", Selector::OnlyFirst),
    ("exceptfirst", Selector::ExceptFirst),
    ("existing", Selector::Existing),
    ("new", Selector::New),
    ("newalt", Selector::NewAlt),
    ("allnew", Selector::AllNew),
    ("ignored", Selector::Ignored),
    ("facingup", Selector::FacingUp),
    ("facingstraightup", Selector::FacingStraightUp),
    ("facingdown", Selector::FacingDown),
    ("facingstraightdown", Selector::FacingStraightDown),
    ("facingforward", Selector::FacingForward),
    ("facingstraightforward", Selector::FacingStraightForward),
    ("facinglevel", Selector::FacingLevel),
    ("facingcenter", Selector::FacingCenter),
    ("facingin", Selector::FacingIn),
    ("facingout", Selector::FacingOut),
    ("tophalf", Selector::TopHalf),
    ("inner", Selector::Inner),
    ("outer", Selector::Outer),
    ("smaller", Selector::Smaller),
    ("larger", Selector::Larger),
    ("evensided", Selector::EvenSided),
    ("oddsided", Selector::OddSided),
    ("psided", Selector::PSided),
    ("qsided", Selector::QSided),
];

impl FromStr for Selector {
    type Err = PolyError;

    /// Parse a selector name, case-insensitively; `sided:N` selects N sides.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        if let Some(n) = key.strip_prefix("sided:").or_else(|| key.strip_prefix("sided")) {
            return match n.parse::<u8>() {
                Ok(n) if (3..=12).contains(&n) => Ok(Selector::Sided(n)),
                _ => Err(PolyError::invalid_param("selector", s, "side count must be 3 to 12")),
            };
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, sel)| *sel)
            .ok_or_else(|| PolyError::invalid_param("selector", s, "unknown selector"))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Sided(n) => write!(f, "sided:{}", n),
            other => {
                let name = NAMED
                    .iter()
                    .find(|(_, sel)| sel == other)
                    .map(|(name, _)| *name)
                    .unwrap_or("?");
                f.write_str(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{parse_tags, FlatPoly};
    use crate::shapes;

    fn roles_poly() -> ConwayPoly {
        let mut flat = shapes::cube().to_flat();
        flat.face_roles = vec![
            Role::Existing,
            Role::New,
            Role::NewAlt,
            Role::Ignored,
            Role::ExistingAlt,
            Role::New,
        ];
        ConwayPoly::from_flat(&flat).unwrap()
    }

    fn indices(poly: &ConwayPoly, sel: Selector) -> Vec<usize> {
        poly.selected_faces(sel, &TagSet::new())
            .into_iter()
            .map(FaceId::index)
            .collect()
    }

    #[test]
    fn test_all_and_none() {
        let cube = shapes::cube();
        assert!(cube.face_ids().all(|f| cube.include_face(f, Selector::All, &TagSet::new())));
        assert!(cube.face_ids().all(|f| !cube.include_face(f, Selector::None, &TagSet::new())));
        assert!(cube.vertex_ids().all(|v| cube.include_vertex(v, Selector::All)));
    }

    #[test]
    fn test_role_selectors_exact() {
        let poly = roles_poly();
        assert_eq!(indices(&poly, Selector::Existing), vec![0, 4]);
        assert_eq!(indices(&poly, Selector::New), vec![1, 5]);
        assert_eq!(indices(&poly, Selector::NewAlt), vec![2]);
        assert_eq!(indices(&poly, Selector::AllNew), vec![1, 2, 5]);
        assert_eq!(indices(&poly, Selector::Ignored), vec![3]);
    }

    #[test]
    fn test_index_selectors() {
        let cube = shapes::cube();
        assert_eq!(indices(&cube, Selector::Odd), vec![1, 3, 5]);
        assert_eq!(indices(&cube, Selector::Even), vec![0, 2, 4]);
        assert_eq!(indices(&cube, Selector::OnlyFirst), vec![0]);
        assert_eq!(indices(&cube, Selector::ExceptFirst), vec![1, 2, 3, 4, 5]);
        assert_eq!(indices(&cube, Selector::Random), indices(&cube, Selector::Random));
    }

    #[test]
    fn test_direction_selectors() {
        let cube = shapes::cube();
        // Faces 3 (+y) and 2 (-y) of the seed cube.
        assert_eq!(indices(&cube, Selector::FacingUp), vec![3]);
        assert_eq!(indices(&cube, Selector::FacingStraightUp), vec![3]);
        assert_eq!(indices(&cube, Selector::FacingDown), vec![2]);
        assert_eq!(indices(&cube, Selector::FacingLevel), vec![0, 1, 4, 5]);
        assert_eq!(indices(&cube, Selector::FacingCenter).len(), 6);
        assert_eq!(indices(&cube, Selector::TopHalf), vec![3]);
    }

    #[test]
    fn test_side_selectors() {
        let cube = shapes::cube();
        assert_eq!(indices(&cube, Selector::Sided(4)).len(), 6);
        assert!(indices(&cube, Selector::Sided(3)).is_empty());
        assert_eq!(indices(&cube, Selector::PSided).len(), 6);
        assert!(indices(&cube, Selector::QSided).is_empty());
        assert_eq!(indices(&cube, Selector::EvenSided).len(), 6);
        assert!(cube.vertex_ids().all(|v| cube.include_vertex(v, Selector::QSided)));
        assert!(cube.vertex_ids().all(|v| cube.include_vertex(v, Selector::Sided(3))));
    }

    #[test]
    fn test_boundary_and_area_selectors() {
        let quad = ConwayPoly::from_flat(&FlatPoly {
            positions: vec![
                nalgebra::Point3::new(0.0, 0.0, 0.0),
                nalgebra::Point3::new(0.1, 0.0, 0.0),
                nalgebra::Point3::new(0.1, 0.0, 0.1),
                nalgebra::Point3::new(0.0, 0.0, 0.1),
            ],
            faces: vec![vec![0, 1, 2, 3]],
            face_roles: vec![Role::New],
            vertex_roles: vec![Role::New; 4],
            face_tags: None,
        })
        .unwrap();
        assert_eq!(indices(&quad, Selector::Outer), vec![0]);
        assert!(indices(&quad, Selector::Inner).is_empty());
        assert_eq!(indices(&quad, Selector::Smaller), vec![0]);
        assert!(indices(&shapes::cube(), Selector::Smaller).is_empty());
        assert!(quad.vertex_ids().all(|v| quad.include_vertex(v, Selector::Outer)));
        assert!(quad.vertex_ids().all(|v| !quad.include_vertex(v, Selector::Smaller)));
    }

    #[test]
    fn test_tag_filter() {
        let mut cube = shapes::cube();
        cube.face_tags_mut(FaceId::new(1)).extend(parse_tags("lid"));
        let lid = parse_tags("lid");
        assert_eq!(cube.selected_faces(Selector::All, &lid), vec![FaceId::new(1)]);
        assert!(cube.selected_faces(Selector::Even, &lid).is_empty());
        assert!(cube.selected_faces(Selector::All, &parse_tags("base")).is_empty());
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!("All".parse::<Selector>().unwrap(), Selector::All);
        assert_eq!("facing_up".parse::<Selector>().unwrap(), Selector::FacingUp);
        assert_eq!("sided:5".parse::<Selector>().unwrap(), Selector::Sided(5));
        assert!("sided:2".parse::<Selector>().is_err());
        assert!("sideways".parse::<Selector>().is_err());
        assert_eq!(Selector::Sided(6).to_string(), "sided:6");
        assert_eq!(Selector::NewAlt.to_string(), "newalt");
    }
}
