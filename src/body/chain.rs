use nalgebra::Vector3;

use super::free::FreeBody;
use super::BodyError;

// ---------------------------------------------------------------------------
// Articulated chain: a 6DOF base link plus jointed child links
// ---------------------------------------------------------------------------

/// A child link rigidly mounted on the chain base, with a single revolute
/// joint (propeller hubs, thruster shafts). The joint only spins about the
/// link's own axis and does not feed back into the base dynamics; its state
/// exists for drive-target bookkeeping and aggregate mass properties.
#[derive(Debug, Clone)]
pub struct Link {
    pub name: String,
    pub mass: f64,
    /// Mount position in the base body's local frame.
    pub mount: Vector3<f64>,
    /// Link center of mass relative to the mount, base-local frame.
    pub center_of_mass: Vector3<f64>,
    pub joint_position: f64,
    pub drive_target: f64,
    pub drive_target_velocity: f64,
}

impl Link {
    pub fn new(name: impl Into<String>, mass: f64, mount: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            mass,
            mount,
            center_of_mass: Vector3::zeros(),
            joint_position: 0.0,
            drive_target: 0.0,
            drive_target_velocity: 0.0,
        }
    }
}

/// Multi-body chain: one free base body carrying the 6DOF state, plus the
/// attached links.
#[derive(Debug, Clone)]
pub struct LinkChain {
    pub base: FreeBody,
    links: Vec<Link>,
}

impl LinkChain {
    pub fn new(base: FreeBody) -> Self {
        Self { base, links: Vec::new() }
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    fn link(&self, index: usize) -> Result<&Link, BodyError> {
        self.links.get(index).ok_or(BodyError::InvalidLink { index })
    }

    fn link_mut(&mut self, index: usize) -> Result<&mut Link, BodyError> {
        self.links
            .get_mut(index)
            .ok_or(BodyError::InvalidLink { index })
    }

    pub fn joint_position(&self, index: usize) -> Result<f64, BodyError> {
        Ok(self.link(index)?.joint_position)
    }

    pub fn set_drive_target(&mut self, index: usize, target: f64) -> Result<(), BodyError> {
        self.link_mut(index)?.drive_target = target;
        Ok(())
    }

    pub fn set_drive_target_velocity(&mut self, index: usize, velocity: f64) -> Result<(), BodyError> {
        self.link_mut(index)?.drive_target_velocity = velocity;
        Ok(())
    }

    /// Advance joint positions by their drive velocities. Called by the
    /// physics step.
    pub fn advance_joints(&mut self, dt: f64) {
        for link in &mut self.links {
            link.joint_position += link.drive_target_velocity * dt;
        }
    }

    /// Total mass of the base plus every attached link.
    ///
    /// Walks the whole chain; intended for initialization, not per-tick use.
    pub fn total_connected_mass(&self) -> f64 {
        self.base.mass + self.links.iter().map(|l| l.mass).sum::<f64>()
    }

    /// Mass-weighted center of the whole chain, world coordinates.
    ///
    /// Walks the whole chain; intended for initialization, not per-tick use.
    pub fn total_connected_center_of_mass(&self) -> Vector3<f64> {
        let rot = self.base.orientation();
        let mut com = self.base.world_center_of_mass() * self.base.mass;
        let mut total_mass = self.base.mass;
        for link in &self.links {
            let link_com = self.base.position() + rot * (link.mount + link.center_of_mass);
            com += link_com * link.mass;
            total_mass += link.mass;
        }
        if total_mass <= 0.0 {
            return Vector3::zeros();
        }
        com / total_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad_chain() -> LinkChain {
        LinkChain::new(FreeBody::new(2.0, Vector3::zeros()))
            .with_link(Link::new("fl", 0.05, Vector3::new(0.2, 0.2, 0.05)))
            .with_link(Link::new("fr", 0.05, Vector3::new(0.2, -0.2, 0.05)))
            .with_link(Link::new("bl", 0.05, Vector3::new(-0.2, 0.2, 0.05)))
            .with_link(Link::new("br", 0.05, Vector3::new(-0.2, -0.2, 0.05)))
    }

    #[test]
    fn total_mass_includes_links() {
        let chain = quad_chain();
        assert_relative_eq!(chain.total_connected_mass(), 2.2, epsilon = 1e-12);
    }

    #[test]
    fn symmetric_links_keep_com_centered() {
        let chain = quad_chain();
        let com = chain.total_connected_center_of_mass();
        assert_relative_eq!(com.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(com.y, 0.0, epsilon = 1e-12);
        assert!(com.z > 0.0); // links sit above the base origin
    }

    #[test]
    fn drive_velocity_advances_joint() {
        let mut chain = quad_chain();
        chain.set_drive_target_velocity(1, 100.0).unwrap();
        chain.advance_joints(0.01);
        assert_relative_eq!(chain.joint_position(1).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(chain.joint_position(0).unwrap(), 0.0);
    }

    #[test]
    fn bad_link_index_is_an_error() {
        let mut chain = quad_chain();
        assert!(chain.set_drive_target(9, 1.0).is_err());
        assert!(chain.joint_position(9).is_err());
    }
}
