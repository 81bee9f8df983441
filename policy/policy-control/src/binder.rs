//! Mapping policy joint names onto simulation memory.

use std::collections::HashMap;

use nalgebra::Vector3;
use policy_types::{JointKind, SimModel, Transmission};
use tracing::{debug, warn};

/// Where one policy joint lives in the simulation.
///
/// Every field is optional; an unresolved joint reads as zero and is never
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointBinding {
    /// Policy joint name.
    pub name: String,
    /// Simulation joint id.
    pub joint_id: Option<usize>,
    /// Index into `qpos`.
    pub qpos_adr: Option<usize>,
    /// Index into `qvel`.
    pub qvel_adr: Option<usize>,
    /// Index into `ctrl`.
    pub ctrl_index: Option<usize>,
}

impl JointBinding {
    fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            joint_id: None,
            qpos_adr: None,
            qvel_adr: None,
            ctrl_index: None,
        }
    }

    /// Returns `true` if the name matched a simulation joint.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.joint_id.is_some()
    }

    /// Returns `true` if an actuator drives this joint.
    #[must_use]
    pub const fn is_actuated(&self) -> bool {
        self.ctrl_index.is_some()
    }
}

/// The floating base the observation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootBinding {
    /// Root joint id (first free joint, else joint 0).
    pub joint_id: usize,
    /// Whether the root is a free joint.
    pub is_free: bool,
    /// First `qpos` index of the root.
    pub qpos_adr: usize,
    /// First `qvel` index of the root.
    pub dof_adr: usize,
}

/// All bindings for one simulation model.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingTable {
    joints: Vec<JointBinding>,
    root: RootBinding,
    anchor_body: Option<usize>,
    gravity_dir: Vector3<f64>,
}

impl BindingTable {
    /// Per-joint bindings in policy order.
    #[must_use]
    pub fn joints(&self) -> &[JointBinding] {
        &self.joints
    }

    /// Root joint.
    #[must_use]
    pub const fn root(&self) -> RootBinding {
        self.root
    }

    /// Anchor body id, if the model has one.
    #[must_use]
    pub const fn anchor_body(&self) -> Option<usize> {
        self.anchor_body
    }

    /// Unit gravity direction in the world frame.
    #[must_use]
    pub const fn gravity_dir(&self) -> Vector3<f64> {
        self.gravity_dir
    }

    /// Names that matched no simulation joint.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.joints
            .iter()
            .filter(|b| !b.is_resolved())
            .map(|b| b.name.as_str())
    }

    /// Resolved joints no actuator drives.
    pub fn unactuated(&self) -> impl Iterator<Item = &str> {
        self.joints
            .iter()
            .filter(|b| b.is_resolved() && !b.is_actuated())
            .map(|b| b.name.as_str())
    }
}

/// Resolves policy joint names against a simulation model.
///
/// Bindings are computed once and recomputed wholesale by
/// [`rebuild`](Self::rebuild) when the model changes.
///
/// # Example
///
/// ```
/// use policy_control::JointBinder;
/// use policy_types::{ArrayModel, JointKind};
///
/// let mut model = ArrayModel::new(0.002);
/// let pelvis = model.add_body("pelvis");
/// model.add_joint("root", JointKind::Free, pelvis);
/// let knee = model.add_joint("knee", JointKind::Hinge, pelvis);
/// model.add_joint_actuator(knee, None);
///
/// let binder = JointBinder::new(&model, vec!["knee".into(), "ankle".into()], "torso_link");
/// let table = binder.bindings();
/// assert_eq!(table.joints()[0].qpos_adr, Some(7));
/// assert_eq!(table.joints()[0].ctrl_index, Some(0));
/// assert_eq!(table.unresolved().collect::<Vec<_>>(), ["ankle"]);
/// ```
#[derive(Debug, Clone)]
pub struct JointBinder {
    joint_names: Vec<String>,
    anchor_name: String,
    bindings: BindingTable,
}

impl JointBinder {
    /// Binds `joint_names` against `model`.
    #[must_use]
    pub fn new<M: SimModel + ?Sized>(
        model: &M,
        joint_names: Vec<String>,
        anchor_name: impl Into<String>,
    ) -> Self {
        let anchor_name = anchor_name.into();
        let bindings = bind(model, &joint_names, &anchor_name);
        Self {
            joint_names,
            anchor_name,
            bindings,
        }
    }

    /// Recomputes every binding against a new model.
    pub fn rebuild<M: SimModel + ?Sized>(&mut self, model: &M) {
        self.bindings = bind(model, &self.joint_names, &self.anchor_name);
    }

    /// Current bindings.
    #[must_use]
    pub const fn bindings(&self) -> &BindingTable {
        &self.bindings
    }
}

fn bind<M: SimModel + ?Sized>(
    model: &M,
    joint_names: &[String],
    anchor_name: &str,
) -> BindingTable {
    let root = find_root(model);

    let mut actuator_of_joint: HashMap<usize, usize> = HashMap::new();
    for actuator in 0..model.actuator_count() {
        if let Some(Transmission::Joint(joint)) = model.actuator_transmission(actuator) {
            actuator_of_joint.entry(joint).or_insert(actuator);
        }
    }

    let joints: Vec<JointBinding> = joint_names
        .iter()
        .map(|name| match model.joint_id(name) {
            Some(id) => JointBinding {
                name: name.clone(),
                joint_id: Some(id),
                qpos_adr: model.joint_qpos_adr(id),
                qvel_adr: model.joint_dof_adr(id),
                ctrl_index: actuator_of_joint.get(&id).copied(),
            },
            None => JointBinding::unresolved(name),
        })
        .collect();

    let gravity = model.gravity();
    let gravity_dir = gravity.try_normalize(0.0).unwrap_or_else(|| -Vector3::z());

    let table = BindingTable {
        joints,
        root,
        anchor_body: model.body_id(anchor_name),
        gravity_dir,
    };

    let missing: Vec<&str> = table.unresolved().collect();
    if !missing.is_empty() {
        warn!(joints = ?missing, "policy joint names missing from model");
    }
    let unactuated: Vec<&str> = table.unactuated().collect();
    if !unactuated.is_empty() {
        warn!(joints = ?unactuated, "policy joints without actuators");
    }
    debug!(
        root = table.root.joint_id,
        anchor = ?table.anchor_body,
        bound = table.joints.len() - missing.len(),
        "joint bindings built"
    );
    table
}

fn find_root<M: SimModel + ?Sized>(model: &M) -> RootBinding {
    let free = (0..model.joint_count()).find(|&j| model.joint_kind(j) == Some(JointKind::Free));
    let joint_id = free.unwrap_or(0);
    RootBinding {
        joint_id,
        is_free: free.is_some(),
        qpos_adr: model.joint_qpos_adr(joint_id).unwrap_or(0),
        dof_adr: model.joint_dof_adr(joint_id).unwrap_or(0),
    }
}
