//! Tank geometry and level-to-volume math
//!
//! Shape and orientation form a closed variant set fixed when the tank is
//! configured - no per-reading string dispatch. Each variant embeds
//! exactly the dimensions its formula needs, and unknown shape labels are
//! rejected once, at the configuration boundary.
//!
//! All lengths are meters and all volumes cubic meters. The math is `f32`
//! via `libm` so results are identical with and without `std`.
//!
//! Formulas:
//! - Vertical cylinder / silo: `π·r²·h`
//! - Horizontal cylinder: circular segment
//!   `r²·acos((r−h)/r) − (r−h)·√(2rh−h²)` times length, with closed-form
//!   empty/full guards to keep `acos`/`sqrt` in domain
//! - Rectangular: `l·w·h`
//! - Spherical: cap `π·h²·(3r−h)/3`, full sphere at `h ≥ d`
//! - Cone-bottom: similarity-scaled partial cone below the cone apex,
//!   full cone plus cylinder fill above it

use core::f32::consts::PI;

use libm::{acosf, sqrtf};

use crate::constants::tanks::{DIAMETER_MAX_M, DIMENSION_MAX_M, DIMENSION_MIN_M};
use crate::errors::{ComputationError, ComputationResult};

/// Loose dimension bag used at the configuration boundary
///
/// Mirrors the shape-dependent dimension fields an external tank-management
/// collaborator supplies; [`TankGeometry::from_label`] picks the fields the
/// named shape needs and rejects the rest of the label space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    /// Height (vertical forms) or axis length (horizontal cylinder), m
    pub height: Option<f32>,
    /// Diameter, m
    pub diameter: Option<f32>,
    /// Footprint length (rectangular), m
    pub length: Option<f32>,
    /// Footprint width (rectangular), m
    pub width: Option<f32>,
    /// Height of the bottom cone section (cone-bottom), m
    pub cone_height: Option<f32>,
    /// Height of the cylinder above the cone (cone-bottom), m
    pub cylinder_height: Option<f32>,
}

impl Dimensions {
    fn require(value: Option<f32>, dimension: &'static str) -> ComputationResult<f32> {
        value.ok_or(ComputationError::MissingDimension { dimension })
    }
}

/// Tank orientation, meaningful for cylindrical tanks only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Axis vertical, level measured along the axis
    Vertical,
    /// Axis horizontal, level measured across the diameter
    Horizontal,
}

/// Closed set of supported tank shapes with embedded dimensions (meters)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "shape"))]
pub enum TankGeometry {
    /// Upright cylinder
    VerticalCylinder {
        /// Diameter, m
        diameter: f32,
        /// Height, m
        height: f32,
    },
    /// Cylinder lying on its side
    HorizontalCylinder {
        /// Diameter, m
        diameter: f32,
        /// Axis length, m
        length: f32,
    },
    /// Rectangular prism
    Rectangular {
        /// Footprint length, m
        length: f32,
        /// Footprint width, m
        width: f32,
        /// Height, m
        height: f32,
    },
    /// Sphere
    Spherical {
        /// Diameter, m
        diameter: f32,
    },
    /// Cylinder over an inverted cone outlet
    ConeBottom {
        /// Diameter, m
        diameter: f32,
        /// Cone section height, m
        cone_height: f32,
        /// Cylinder section height, m
        cylinder_height: f32,
    },
    /// Storage silo, approximated as a right cylinder
    Silo {
        /// Diameter, m
        diameter: f32,
        /// Height, m
        height: f32,
    },
}

impl TankGeometry {
    /// Build a geometry from an external shape label and dimension bag
    ///
    /// This is the only place shape strings are interpreted; unknown
    /// labels fail here with [`ComputationError::UnsupportedShape`] and
    /// never reach the reading path.
    pub fn from_label(
        shape: &str,
        orientation: Orientation,
        dims: &Dimensions,
    ) -> ComputationResult<Self> {
        let geometry = match shape {
            "cylindrical" => {
                let diameter = Dimensions::require(dims.diameter, "diameter")?;
                match orientation {
                    Orientation::Vertical => TankGeometry::VerticalCylinder {
                        diameter,
                        height: Dimensions::require(dims.height, "height")?,
                    },
                    // In horizontal orientation the height field is the
                    // axis length, as configured upstream.
                    Orientation::Horizontal => TankGeometry::HorizontalCylinder {
                        diameter,
                        length: Dimensions::require(dims.height.or(dims.length), "length")?,
                    },
                }
            }
            "rectangular" => TankGeometry::Rectangular {
                length: Dimensions::require(dims.length, "length")?,
                width: Dimensions::require(dims.width, "width")?,
                height: Dimensions::require(dims.height, "height")?,
            },
            "spherical" => TankGeometry::Spherical {
                diameter: Dimensions::require(dims.diameter, "diameter")?,
            },
            "cone_bottom" => TankGeometry::ConeBottom {
                diameter: Dimensions::require(dims.diameter, "diameter")?,
                cone_height: Dimensions::require(dims.cone_height, "cone_height")?,
                cylinder_height: Dimensions::require(
                    dims.cylinder_height.or(dims.height),
                    "cylinder_height",
                )?,
            },
            "silo" => TankGeometry::Silo {
                diameter: Dimensions::require(dims.diameter, "diameter")?,
                height: Dimensions::require(dims.height, "height")?,
            },
            _ => return Err(ComputationError::UnsupportedShape),
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Stable shape label, mirrored into history snapshots
    pub const fn shape_label(&self) -> &'static str {
        match self {
            TankGeometry::VerticalCylinder { .. } | TankGeometry::HorizontalCylinder { .. } => {
                "cylindrical"
            }
            TankGeometry::Rectangular { .. } => "rectangular",
            TankGeometry::Spherical { .. } => "spherical",
            TankGeometry::ConeBottom { .. } => "cone_bottom",
            TankGeometry::Silo { .. } => "silo",
        }
    }

    /// Orientation of this geometry
    pub const fn orientation(&self) -> Orientation {
        match self {
            TankGeometry::HorizontalCylinder { .. } => Orientation::Horizontal,
            _ => Orientation::Vertical,
        }
    }

    /// Vertical extent a liquid level can travel, m
    ///
    /// Height for upright forms, diameter for spherical and horizontal
    /// cylindrical tanks, cone plus cylinder section for cone-bottom.
    pub fn depth(&self) -> f32 {
        match *self {
            TankGeometry::VerticalCylinder { height, .. } => height,
            TankGeometry::HorizontalCylinder { diameter, .. } => diameter,
            TankGeometry::Rectangular { height, .. } => height,
            TankGeometry::Spherical { diameter } => diameter,
            TankGeometry::ConeBottom {
                cone_height,
                cylinder_height,
                ..
            } => cone_height + cylinder_height,
            TankGeometry::Silo { height, .. } => height,
        }
    }

    /// Check all dimensions are positive, finite, and within bounds
    pub fn validate(&self) -> ComputationResult<()> {
        let check = |value: f32, max: f32, reason: &'static str| -> ComputationResult<()> {
            if !value.is_finite() || value < DIMENSION_MIN_M || value > max {
                Err(ComputationError::DegenerateGeometry { reason })
            } else {
                Ok(())
            }
        };

        match *self {
            TankGeometry::VerticalCylinder { diameter, height } => {
                check(diameter, DIAMETER_MAX_M, "cylinder diameter")?;
                check(height, DIMENSION_MAX_M, "cylinder height")
            }
            TankGeometry::HorizontalCylinder { diameter, length } => {
                check(diameter, DIAMETER_MAX_M, "cylinder diameter")?;
                check(length, DIMENSION_MAX_M, "cylinder length")
            }
            TankGeometry::Rectangular {
                length,
                width,
                height,
            } => {
                check(length, DIMENSION_MAX_M, "rectangular length")?;
                check(width, DIMENSION_MAX_M, "rectangular width")?;
                check(height, DIMENSION_MAX_M, "rectangular height")
            }
            TankGeometry::Spherical { diameter } => check(diameter, DIAMETER_MAX_M, "sphere diameter"),
            TankGeometry::ConeBottom {
                diameter,
                cone_height,
                cylinder_height,
            } => {
                check(diameter, DIAMETER_MAX_M, "cone diameter")?;
                check(cone_height, DIMENSION_MAX_M, "cone height")?;
                check(cylinder_height, DIMENSION_MAX_M, "cylinder section height")
            }
            TankGeometry::Silo { diameter, height } => {
                check(diameter, DIAMETER_MAX_M, "silo diameter")?;
                check(height, DIMENSION_MAX_M, "silo height")
            }
        }
    }

    /// Occupied volume (m³) at the given level above the tank bottom
    ///
    /// `offset_depth` is bottom dead space: the effective level is
    /// `max(0, level − offset_depth)`. The level is capped at the tank
    /// depth before evaluation, so the result is always within
    /// `[0, total_volume()]` for finite input.
    pub fn volume_at_level(&self, level_m: f32, offset_depth_m: f32) -> ComputationResult<f32> {
        let effective = (level_m - offset_depth_m).max(0.0).min(self.depth());

        let volume = match *self {
            TankGeometry::VerticalCylinder { diameter, .. }
            | TankGeometry::Silo { diameter, .. } => {
                let r = diameter / 2.0;
                PI * r * r * effective
            }
            TankGeometry::HorizontalCylinder { diameter, length } => {
                horizontal_segment_volume(diameter, length, effective)
            }
            TankGeometry::Rectangular { length, width, .. } => length * width * effective,
            TankGeometry::Spherical { diameter } => spherical_cap_volume(diameter, effective),
            TankGeometry::ConeBottom {
                diameter,
                cone_height,
                ..
            } => cone_bottom_volume(diameter, cone_height, effective),
        };

        if volume.is_finite() {
            Ok(volume.max(0.0))
        } else {
            Err(ComputationError::NonFiniteResult { stage: "volume" })
        }
    }

    /// Volume (m³) of the completely full tank
    pub fn total_volume(&self) -> f32 {
        // Dimensions are validated at configuration time; a full-depth
        // evaluation cannot leave the floating-point domain.
        self.volume_at_level(self.depth(), 0.0).unwrap_or(0.0)
    }
}

/// Circular-segment fill of a horizontal cylinder
fn horizontal_segment_volume(diameter: f32, length: f32, h: f32) -> f32 {
    let r = diameter / 2.0;
    if h <= 0.0 {
        return 0.0;
    }
    if h >= diameter {
        return PI * r * r * length;
    }
    let segment_area = r * r * acosf((r - h) / r) - (r - h) * sqrtf(2.0 * r * h - h * h);
    segment_area * length
}

/// Spherical-cap fill of a sphere
fn spherical_cap_volume(diameter: f32, h: f32) -> f32 {
    let r = diameter / 2.0;
    if h <= 0.0 {
        return 0.0;
    }
    if h >= diameter {
        return 4.0 / 3.0 * PI * r * r * r;
    }
    PI * h * h * (3.0 * r - h) / 3.0
}

/// Partial cone below the apex height, cone plus cylinder above it
fn cone_bottom_volume(diameter: f32, cone_height: f32, h: f32) -> f32 {
    let r = diameter / 2.0;
    if h <= 0.0 {
        return 0.0;
    }
    if h <= cone_height {
        // Fill surface radius scales linearly with height inside the cone.
        let fill_r = h / cone_height * r;
        1.0 / 3.0 * PI * fill_r * fill_r * h
    } else {
        let cone = 1.0 / 3.0 * PI * r * r * cone_height;
        let cylinder = PI * r * r * (h - cone_height);
        cone + cylinder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn vertical_cylinder_midpoint() {
        // d=2 m, h=3 m, level 1.5 m -> pi * 1 * 1.5 = 4.712 m3
        let g = TankGeometry::VerticalCylinder {
            diameter: 2.0,
            height: 3.0,
        };
        let v = g.volume_at_level(1.5, 0.0).unwrap();
        assert!((v - 4.712_389).abs() < EPS);
    }

    #[test]
    fn horizontal_cylinder_half_full() {
        // d=2 m, l=4 m, level at the axis -> half of pi * 1 * 4
        let g = TankGeometry::HorizontalCylinder {
            diameter: 2.0,
            length: 4.0,
        };
        let v = g.volume_at_level(1.0, 0.0).unwrap();
        assert!((v - 6.283_185).abs() < EPS);
    }

    #[test]
    fn horizontal_cylinder_guards() {
        let g = TankGeometry::HorizontalCylinder {
            diameter: 2.0,
            length: 4.0,
        };
        assert_eq!(g.volume_at_level(0.0, 0.0).unwrap(), 0.0);
        let full = g.volume_at_level(2.0, 0.0).unwrap();
        assert!((full - PI * 4.0).abs() < EPS);
        // Over-depth input clamps to full rather than leaving acos domain
        assert!((g.volume_at_level(5.0, 0.0).unwrap() - full).abs() < EPS);
    }

    #[test]
    fn rectangular_tank() {
        let g = TankGeometry::Rectangular {
            length: 2.0,
            width: 3.0,
            height: 2.0,
        };
        assert!((g.volume_at_level(1.0, 0.0).unwrap() - 6.0).abs() < EPS);
    }

    #[test]
    fn spherical_cap_and_full() {
        let g = TankGeometry::Spherical { diameter: 2.0 };
        // Half full sphere: 2/3 * pi * r^3
        let half = g.volume_at_level(1.0, 0.0).unwrap();
        assert!((half - 2.0 / 3.0 * PI).abs() < EPS);
        let full = g.volume_at_level(2.0, 0.0).unwrap();
        assert!((full - 4.0 / 3.0 * PI).abs() < EPS);
    }

    #[test]
    fn cone_bottom_sections() {
        let g = TankGeometry::ConeBottom {
            diameter: 2.0,
            cone_height: 1.0,
            cylinder_height: 2.0,
        };
        // Full cone at the apex height
        let cone = g.volume_at_level(1.0, 0.0).unwrap();
        assert!((cone - PI / 3.0).abs() < EPS);
        // One meter into the cylinder adds pi * r^2
        let above = g.volume_at_level(2.0, 0.0).unwrap();
        assert!((above - (PI / 3.0 + PI)).abs() < EPS);
    }

    #[test]
    fn dead_space_reduces_effective_level() {
        let g = TankGeometry::VerticalCylinder {
            diameter: 2.0,
            height: 3.0,
        };
        let with_offset = g.volume_at_level(1.5, 0.5).unwrap();
        let direct = g.volume_at_level(1.0, 0.0).unwrap();
        assert!((with_offset - direct).abs() < EPS);
    }

    #[test]
    fn monotone_in_level() {
        let shapes = [
            TankGeometry::VerticalCylinder {
                diameter: 2.0,
                height: 3.0,
            },
            TankGeometry::HorizontalCylinder {
                diameter: 2.0,
                length: 4.0,
            },
            TankGeometry::Spherical { diameter: 2.0 },
            TankGeometry::ConeBottom {
                diameter: 2.0,
                cone_height: 1.0,
                cylinder_height: 2.0,
            },
            TankGeometry::Silo {
                diameter: 3.0,
                height: 10.0,
            },
        ];
        for g in shapes {
            let depth = g.depth();
            let mut prev = 0.0;
            for step in 0..=20 {
                let level = depth * step as f32 / 20.0;
                let v = g.volume_at_level(level, 0.0).unwrap();
                assert!(v + 1e-4 >= prev, "{:?} not monotone at {}", g, level);
                prev = v;
            }
        }
    }

    #[test]
    fn from_label_rejects_unknown_shape() {
        let dims = Dimensions {
            diameter: Some(2.0),
            height: Some(3.0),
            ..Dimensions::default()
        };
        assert_eq!(
            TankGeometry::from_label("dish_ends", Orientation::Vertical, &dims),
            Err(ComputationError::UnsupportedShape)
        );
    }

    #[test]
    fn from_label_horizontal_cylinder_uses_height_as_length() {
        let dims = Dimensions {
            diameter: Some(2.0),
            height: Some(4.0),
            ..Dimensions::default()
        };
        let g = TankGeometry::from_label("cylindrical", Orientation::Horizontal, &dims).unwrap();
        assert_eq!(
            g,
            TankGeometry::HorizontalCylinder {
                diameter: 2.0,
                length: 4.0
            }
        );
        assert_eq!(g.depth(), 2.0);
    }

    #[test]
    fn validate_rejects_degenerate_dimensions() {
        let g = TankGeometry::ConeBottom {
            diameter: 2.0,
            cone_height: 0.0,
            cylinder_height: 2.0,
        };
        assert!(matches!(
            g.validate(),
            Err(ComputationError::DegenerateGeometry { .. })
        ));
    }
}
