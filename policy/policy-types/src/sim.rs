//! Simulation access.
//!
//! The bridge never owns the physics engine. It reads static model tables
//! through [`SimModel`] and per-tick state through [`SimData`], and writes only
//! actuator controls (plus the initial pose when asked to seed it).
//!
//! [`ArrayModel`] / [`ArrayData`] are a plain array-backed implementation with
//! the usual `qpos`/`qvel`/`ctrl` layout. Hosts with their own engine
//! implement the traits directly.

use std::collections::HashMap;

use nalgebra::{DVector, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Joint kind, which fixes the number of position and velocity coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JointKind {
    /// Rotation about one axis.
    #[default]
    Hinge,
    /// Translation along one axis.
    Slide,
    /// Spherical joint, quaternion position.
    Ball,
    /// Floating base: position + quaternion.
    Free,
}

impl JointKind {
    /// Position coordinates.
    #[must_use]
    pub const fn nq(self) -> usize {
        match self {
            Self::Hinge | Self::Slide => 1,
            Self::Ball => 4,
            Self::Free => 7,
        }
    }

    /// Velocity coordinates.
    #[must_use]
    pub const fn nv(self) -> usize {
        match self {
            Self::Hinge | Self::Slide => 1,
            Self::Ball => 3,
            Self::Free => 6,
        }
    }
}

/// What an actuator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    /// A joint, by id.
    Joint(usize),
    /// A tendon, by id.
    Tendon(usize),
    /// A site, by id.
    Site(usize),
}

/// Static model tables.
pub trait SimModel {
    /// Number of joints.
    fn joint_count(&self) -> usize;

    /// Number of actuators.
    fn actuator_count(&self) -> usize;

    /// Joint id by name.
    fn joint_id(&self, name: &str) -> Option<usize>;

    /// Body id by name.
    fn body_id(&self, name: &str) -> Option<usize>;

    /// Kind of a joint.
    fn joint_kind(&self, joint: usize) -> Option<JointKind>;

    /// First `qpos` index of a joint.
    fn joint_qpos_adr(&self, joint: usize) -> Option<usize>;

    /// First `qvel` index of a joint.
    fn joint_dof_adr(&self, joint: usize) -> Option<usize>;

    /// Transmission of an actuator.
    fn actuator_transmission(&self, actuator: usize) -> Option<Transmission>;

    /// Declared control range of an actuator, if any.
    fn actuator_ctrl_range(&self, actuator: usize) -> Option<(f64, f64)>;

    /// Gravity vector.
    fn gravity(&self) -> Vector3<f64>;

    /// Integration timestep in seconds.
    fn timestep(&self) -> f64;
}

/// Mutable per-tick state.
pub trait SimData {
    /// Generalized positions.
    fn qpos(&self) -> &[f64];

    /// Generalized velocities.
    fn qvel(&self) -> &[f64];

    /// World orientation of a body (`w, x, y, z`, possibly unnormalized).
    fn body_quat(&self, body: usize) -> Option<Quaternion<f64>>;

    /// Actuator controls.
    fn ctrl_mut(&mut self) -> &mut [f64];

    /// Generalized positions, writable.
    fn qpos_mut(&mut self) -> &mut [f64];

    /// Generalized velocities, writable.
    fn qvel_mut(&mut self) -> &mut [f64];
}

/// Array-backed model tables.
///
/// # Example
///
/// ```
/// use policy_types::{ArrayModel, JointKind, SimModel};
///
/// let mut model = ArrayModel::new(0.002);
/// let pelvis = model.add_body("pelvis");
/// let root = model.add_joint("root", JointKind::Free, pelvis);
/// let knee = model.add_joint("knee", JointKind::Hinge, pelvis);
/// model.add_joint_actuator(knee, Some((-50.0, 50.0)));
///
/// assert_eq!(model.joint_qpos_adr(knee), Some(7));
/// assert_eq!(model.joint_dof_adr(knee), Some(6));
/// assert_eq!(model.joint_id("root"), Some(root));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayModel {
    /// Number of position coordinates.
    pub nq: usize,
    /// Number of velocity coordinates.
    pub nv: usize,
    /// Body names; body 0 is the world.
    pub body_name: Vec<String>,
    /// Joint kinds.
    pub jnt_type: Vec<JointKind>,
    /// Owning body of each joint.
    pub jnt_body: Vec<usize>,
    /// First `qpos` index per joint.
    pub jnt_qpos_adr: Vec<usize>,
    /// First `qvel` index per joint.
    pub jnt_dof_adr: Vec<usize>,
    /// Joint names.
    pub jnt_name: Vec<String>,
    /// Actuator transmissions.
    pub actuator_trn: Vec<Transmission>,
    /// Actuator control ranges; `None` when unlimited.
    pub actuator_ctrlrange: Vec<Option<(f64, f64)>>,
    /// Gravity vector.
    pub gravity: Vector3<f64>,
    /// Timestep in seconds.
    pub timestep: f64,
    jnt_name_to_id: HashMap<String, usize>,
    body_name_to_id: HashMap<String, usize>,
}

impl ArrayModel {
    /// Creates a model containing only the world body, with Earth gravity.
    #[must_use]
    pub fn new(timestep: f64) -> Self {
        let mut body_name_to_id = HashMap::new();
        body_name_to_id.insert("world".to_string(), 0);
        Self {
            nq: 0,
            nv: 0,
            body_name: vec!["world".to_string()],
            jnt_type: Vec::new(),
            jnt_body: Vec::new(),
            jnt_qpos_adr: Vec::new(),
            jnt_dof_adr: Vec::new(),
            jnt_name: Vec::new(),
            actuator_trn: Vec::new(),
            actuator_ctrlrange: Vec::new(),
            gravity: Vector3::new(0.0, 0.0, -9.81),
            timestep,
            jnt_name_to_id: HashMap::new(),
            body_name_to_id,
        }
    }

    /// Sets the gravity vector.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Appends a body, returning its id.
    pub fn add_body(&mut self, name: &str) -> usize {
        let id = self.body_name.len();
        self.body_name.push(name.to_string());
        self.body_name_to_id.entry(name.to_string()).or_insert(id);
        id
    }

    /// Appends a joint, assigning the next `qpos`/`qvel` addresses.
    pub fn add_joint(&mut self, name: &str, kind: JointKind, body: usize) -> usize {
        let id = self.jnt_type.len();
        self.jnt_type.push(kind);
        self.jnt_body.push(body);
        self.jnt_qpos_adr.push(self.nq);
        self.jnt_dof_adr.push(self.nv);
        self.jnt_name.push(name.to_string());
        self.jnt_name_to_id.entry(name.to_string()).or_insert(id);
        self.nq += kind.nq();
        self.nv += kind.nv();
        id
    }

    /// Appends an actuator driving `joint`.
    pub fn add_joint_actuator(&mut self, joint: usize, ctrlrange: Option<(f64, f64)>) -> usize {
        self.add_actuator(Transmission::Joint(joint), ctrlrange)
    }

    /// Appends an actuator with an arbitrary transmission.
    pub fn add_actuator(&mut self, trn: Transmission, ctrlrange: Option<(f64, f64)>) -> usize {
        self.actuator_trn.push(trn);
        self.actuator_ctrlrange.push(ctrlrange);
        self.actuator_trn.len() - 1
    }

    /// Allocates state for this model: zero velocities and controls,
    /// identity quaternions in every quaternion slot and body orientation.
    #[must_use]
    pub fn make_data(&self) -> ArrayData {
        let mut qpos = DVector::zeros(self.nq);
        for (kind, &adr) in self.jnt_type.iter().zip(&self.jnt_qpos_adr) {
            match kind {
                JointKind::Free => qpos[adr + 3] = 1.0,
                JointKind::Ball => qpos[adr] = 1.0,
                JointKind::Hinge | JointKind::Slide => {}
            }
        }
        ArrayData {
            qpos,
            qvel: DVector::zeros(self.nv),
            ctrl: DVector::zeros(self.actuator_trn.len()),
            xquat: vec![Quaternion::identity(); self.body_name.len()],
        }
    }
}

impl SimModel for ArrayModel {
    fn joint_count(&self) -> usize {
        self.jnt_type.len()
    }

    fn actuator_count(&self) -> usize {
        self.actuator_trn.len()
    }

    fn joint_id(&self, name: &str) -> Option<usize> {
        self.jnt_name_to_id.get(name).copied()
    }

    fn body_id(&self, name: &str) -> Option<usize> {
        self.body_name_to_id.get(name).copied()
    }

    fn joint_kind(&self, joint: usize) -> Option<JointKind> {
        self.jnt_type.get(joint).copied()
    }

    fn joint_qpos_adr(&self, joint: usize) -> Option<usize> {
        self.jnt_qpos_adr.get(joint).copied()
    }

    fn joint_dof_adr(&self, joint: usize) -> Option<usize> {
        self.jnt_dof_adr.get(joint).copied()
    }

    fn actuator_transmission(&self, actuator: usize) -> Option<Transmission> {
        self.actuator_trn.get(actuator).copied()
    }

    fn actuator_ctrl_range(&self, actuator: usize) -> Option<(f64, f64)> {
        self.actuator_ctrlrange.get(actuator).copied().flatten()
    }

    fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }
}

/// Array-backed simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    /// Generalized positions.
    pub qpos: DVector<f64>,
    /// Generalized velocities.
    pub qvel: DVector<f64>,
    /// Actuator controls.
    pub ctrl: DVector<f64>,
    /// Body orientations in world frame.
    pub xquat: Vec<Quaternion<f64>>,
}

impl SimData for ArrayData {
    fn qpos(&self) -> &[f64] {
        self.qpos.as_slice()
    }

    fn qvel(&self) -> &[f64] {
        self.qvel.as_slice()
    }

    fn body_quat(&self, body: usize) -> Option<Quaternion<f64>> {
        self.xquat.get(body).copied()
    }

    fn ctrl_mut(&mut self) -> &mut [f64] {
        self.ctrl.as_mut_slice()
    }

    fn qpos_mut(&mut self) -> &mut [f64] {
        self.qpos.as_mut_slice()
    }

    fn qvel_mut(&mut self) -> &mut [f64] {
        self.qvel.as_mut_slice()
    }
}
