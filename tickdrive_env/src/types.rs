//! Common types shared between model runners and the control core.

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};

/// Name of an agent (vehicle) in the simulation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentName(pub String);

impl AgentName {
    /// Creates a new agent name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Spatial velocity of an agent as a twist `[ωx, ωy, ωz, vx, vy, vz]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vector6<f64>);

impl Velocity {
    /// Builds a twist from its angular and linear parts.
    pub fn new(angular: Vector3<f64>, linear: Vector3<f64>) -> Self {
        Self(Vector6::new(
            angular.x, angular.y, angular.z,
            linear.x, linear.y, linear.z,
        ))
    }
    
    /// Returns the linear component.
    pub fn linear(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(3).into_owned()
    }
    
    /// Returns the speed in m/s (magnitude of the linear component).
    pub fn speed(&self) -> f64 {
        self.linear().norm()
    }
}

/// Planar pose of an agent in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation [x, y, z] in meters
    pub translation: Vector3<f64>,
    
    /// Heading in radians, counter-clockwise from +x
    pub heading: f64,
}

impl Pose {
    /// Creates a pose on the ground plane.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            translation: Vector3::new(x, y, 0.0),
            heading,
        }
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2})",
            self.translation.x, self.translation.y, self.translation.z
        )
    }
}

/// A pair of agents currently in contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// First agent of the pair
    pub agent_a: AgentName,
    
    /// Second agent of the pair
    pub agent_b: AgentName,
    
    /// Contact point in scene coordinates
    pub location: Vector3<f64>,
}

impl Collision {
    /// Creates a collision record.
    pub fn new(agent_a: AgentName, agent_b: AgentName, location: Vector3<f64>) -> Self {
        Self { agent_a, agent_b, location }
    }
    
    /// Returns the pair in a stable (sorted) order.
    pub fn key(&self) -> (AgentName, AgentName) {
        if self.agent_a <= self.agent_b {
            (self.agent_a.clone(), self.agent_b.clone())
        } else {
            (self.agent_b.clone(), self.agent_a.clone())
        }
    }
}
