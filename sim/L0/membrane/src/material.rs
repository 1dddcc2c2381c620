//! Material parameters of a membrane.
//!
//! The membrane is a linear isotropic material described by:
//!
//! - **Young's modulus (E)**: Stiffness (Pa)
//! - **Poisson's ratio (ν)**: Lateral contraction
//! - **Thickness (h)**: Shell thickness
//! - **Damping**: Rayleigh coefficient applied to the rate of squared edge length
//!
//! Per element, the Lamé parameters are integrated over a quarter of the
//! element area and over the thickness:
//!
//! ```text
//! μ = E / (2(1 + ν))            · |A| / 4 · h
//! λ = E ν / ((1 + ν)(1 − 2ν))   · |A| / 4 · h
//! ```
//!
//! Nothing is clamped: λ diverges as ν → 0.5.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Material preset for common membranes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MembranePreset {
    /// Woven cotton.
    Cotton,
    /// Latex/rubber sheet.
    RubberSheet,
    /// Paper.
    Paper,
}

/// Material parameters of a membrane, constant for the lifetime of an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MembraneMaterial {
    /// Young's modulus in Pascals (Pa).
    pub youngs_modulus: f64,

    /// Poisson's ratio (dimensionless).
    pub poissons_ratio: f64,

    /// Shell thickness in meters.
    pub thickness: f64,

    /// Rayleigh damping coefficient (seconds). Zero disables damping.
    pub damping: f64,
}

impl Default for MembraneMaterial {
    fn default() -> Self {
        Self::preset(MembranePreset::Cotton)
    }
}

impl MembraneMaterial {
    /// Create a new material without damping.
    #[must_use]
    pub const fn new(youngs_modulus: f64, poissons_ratio: f64, thickness: f64) -> Self {
        Self {
            youngs_modulus,
            poissons_ratio,
            thickness,
            damping: 0.0,
        }
    }

    /// Create a material from a preset.
    #[must_use]
    pub const fn preset(preset: MembranePreset) -> Self {
        match preset {
            MembranePreset::Cotton => Self {
                youngs_modulus: 1e5, // 100 kPa
                poissons_ratio: 0.3,
                thickness: 0.001, // 1 mm
                damping: 0.0,
            },
            MembranePreset::RubberSheet => Self {
                youngs_modulus: 1e6,
                poissons_ratio: 0.45, // Nearly incompressible
                thickness: 0.002,
                damping: 0.001,
            },
            MembranePreset::Paper => Self {
                youngs_modulus: 3e9, // 3 GPa
                poissons_ratio: 0.2,
                thickness: 0.0001,
                damping: 0.0,
            },
        }
    }

    /// Set the damping coefficient.
    #[must_use]
    pub const fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the thickness.
    #[must_use]
    pub const fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Shear modulus G = E / (2(1 + ν)).
    #[must_use]
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }

    /// First Lamé parameter E ν / ((1 + ν)(1 − 2ν)).
    ///
    /// Infinite at ν = 0.5.
    #[must_use]
    pub fn lame_lambda(&self) -> f64 {
        let nu = self.poissons_ratio;
        self.youngs_modulus * nu / ((1.0 + nu) * (1.0 - 2.0 * nu))
    }

    /// Element shear coefficient μ for an element of the given area.
    #[must_use]
    pub fn element_mu(&self, area: f64) -> f64 {
        self.shear_modulus() * area.abs() / 4.0 * self.thickness
    }

    /// Element dilation coefficient λ for an element of the given area.
    #[must_use]
    pub fn element_lambda(&self, area: f64) -> f64 {
        self.lame_lambda() * area.abs() / 4.0 * self.thickness
    }

    /// Whether per-step damping contributes to the elongation.
    #[must_use]
    pub fn is_damped(&self) -> bool {
        self.damping > 0.0
    }
}
