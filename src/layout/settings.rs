//! Runtime settings for the force-directed layout.
//!
//! `LayoutSettings` holds the physical constants of the simulation:
//! - spring stiffness and rest length (Hooke's law),
//! - node charge for repulsion (Coulomb's law, negative),
//! - velocity damping and the stabilization threshold,
//! - Barnes-Hut opening ratio `theta` and the advisory tree depth

use crate::configuration::config::ConfigError;

#[derive(Debug, Clone)]
pub struct LayoutSettings {
    pub spring_constant: f64, // k in F = -kx
    pub spring_length: f64, // spring rest length
    pub charge: f64, // node charge, negative so nodes repel
    pub damping: f64, // velocity retention per step, in (0, 1)
    pub theta: f64, // Barnes-Hut opening ratio s/d
    pub max_depth: usize, // advisory octree depth, exceeding it is logged
    pub stable_energy_threshold: f64, // kinetic energy below this counts as settled
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            spring_constant: 0.008,
            spring_length: 30.0,
            charge: -1200.0,
            damping: 0.9,
            theta: 1.2,
            max_depth: 5,
            stable_energy_threshold: 1.0,
        }
    }
}

impl LayoutSettings {
    /// Reject settings that would produce silently-wrong physics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::Damping(self.damping));
        }
        if self.charge >= 0.0 {
            return Err(ConfigError::Charge(self.charge));
        }
        if self.theta <= 0.0 {
            return Err(ConfigError::Theta(self.theta));
        }
        if self.spring_length <= 0.0 {
            return Err(ConfigError::SpringLength(self.spring_length));
        }
        if self.spring_constant < 0.0 {
            return Err(ConfigError::SpringConstant(self.spring_constant));
        }
        Ok(())
    }
}
