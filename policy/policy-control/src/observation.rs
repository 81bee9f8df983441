//! Observation assembly.
//!
//! The buffer is allocated once from the [`ObservationLayout`] and
//! overwritten in place each control tick, term by term in schema order.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use policy_types::{CommandVector, ObservationLayout, ObservationTerm, PolicyMetadata, SimData};

use crate::binder::{BindingTable, RootBinding};

/// Quantities derived from the floating base once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseState {
    /// Root linear velocity, raw generalized velocity slots.
    pub lin_vel: Vector3<f64>,
    /// Root angular velocity, raw generalized velocity slots.
    pub ang_vel: Vector3<f64>,
    /// Gravity direction in the root frame.
    pub projected_gravity: Vector3<f64>,
    /// Gravity direction in the anchor body frame.
    pub anchor_projected_gravity: Vector3<f64>,
}

impl BaseState {
    /// Reads the root and anchor state.
    ///
    /// A root that is not a free joint, or whose slots fall outside the
    /// state arrays, reads as identity orientation and zero velocity.
    #[must_use]
    pub fn read<D: SimData + ?Sized>(data: &D, bindings: &BindingTable) -> Self {
        let root = bindings.root();
        let gravity = bindings.gravity_dir();

        let orientation = root_orientation(data, root);
        let projected_gravity = orientation.inverse_transform_vector(&gravity);

        let anchor_projected_gravity = bindings
            .anchor_body()
            .and_then(|body| data.body_quat(body))
            .and_then(normalized)
            .map_or(projected_gravity, |q| q.inverse_transform_vector(&gravity));

        let (lin_vel, ang_vel) = root_velocity(data, root);

        Self {
            lin_vel,
            ang_vel,
            projected_gravity,
            anchor_projected_gravity,
        }
    }
}

fn normalized(q: Quaternion<f64>) -> Option<UnitQuaternion<f64>> {
    q.coords
        .iter()
        .all(|c| c.is_finite())
        .then(|| UnitQuaternion::try_new(q, f64::EPSILON))
        .flatten()
}

fn root_orientation<D: SimData + ?Sized>(data: &D, root: RootBinding) -> UnitQuaternion<f64> {
    if !root.is_free {
        return UnitQuaternion::identity();
    }
    data.qpos()
        .get(root.qpos_adr + 3..root.qpos_adr + 7)
        .and_then(|q| normalized(Quaternion::new(q[0], q[1], q[2], q[3])))
        .unwrap_or_else(UnitQuaternion::identity)
}

fn root_velocity<D: SimData + ?Sized>(data: &D, root: RootBinding) -> (Vector3<f64>, Vector3<f64>) {
    if !root.is_free {
        return (Vector3::zeros(), Vector3::zeros());
    }
    data.qvel()
        .get(root.dof_adr..root.dof_adr + 6)
        .map_or((Vector3::zeros(), Vector3::zeros()), |v| {
            (Vector3::new(v[0], v[1], v[2]), Vector3::new(v[3], v[4], v[5]))
        })
}

/// Writes the policy input vector.
///
/// # Example
///
/// ```
/// use policy_control::{JointBinder, ObservationAssembler};
/// use policy_types::{ArrayModel, CommandVector, JointKind, ObservationTerm, PolicyMetadata};
///
/// let mut model = ArrayModel::new(0.002);
/// let pelvis = model.add_body("pelvis");
/// model.add_joint("root", JointKind::Free, pelvis);
/// model.add_joint("knee", JointKind::Hinge, pelvis);
/// let data = model.make_data();
///
/// let meta = PolicyMetadata::new(
///     vec!["knee".into()],
///     vec![ObservationTerm::ProjectedGravity, ObservationTerm::JointPos],
///     vec![1.0],
///     vec![0.5],
///     vec![0.0],
///     vec![0.0],
/// )?;
/// let binder = JointBinder::new(&model, meta.joint_names().to_vec(), "torso_link");
/// let mut assembler = ObservationAssembler::new(meta.layout());
/// let obs = assembler.assemble(&data, binder.bindings(), &meta, &CommandVector::idle(), &[0.0]);
/// assert_eq!(obs.len(), 4);
/// assert!((obs[2] + 1.0).abs() < 1e-6);
/// assert!((obs[3] + 0.5).abs() < 1e-6);
/// # Ok::<(), policy_types::TypesError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ObservationAssembler {
    layout: ObservationLayout,
    buffer: Vec<f32>,
}

impl ObservationAssembler {
    /// Allocates a zeroed buffer for `layout`.
    #[must_use]
    pub fn new(layout: ObservationLayout) -> Self {
        let buffer = vec![0.0; layout.len()];
        Self { layout, buffer }
    }

    /// Layout the buffer follows.
    #[must_use]
    pub const fn layout(&self) -> &ObservationLayout {
        &self.layout
    }

    /// Buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the layout has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Last assembled observation.
    #[must_use]
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Zeroes the buffer.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Assembles the observation for the current state.
    ///
    /// `prev_action` holds the raw action of the previous inference, one
    /// entry per policy joint.
    #[allow(clippy::cast_possible_truncation)]
    pub fn assemble<D: SimData + ?Sized>(
        &mut self,
        data: &D,
        bindings: &BindingTable,
        meta: &PolicyMetadata,
        command: &CommandVector,
        prev_action: &[f32],
    ) -> &[f32] {
        let base = BaseState::read(data, bindings);
        let qpos = data.qpos();
        let qvel = data.qvel();
        let joints = bindings.joints();
        let defaults = meta.default_joint_pos();

        let write3 = |out: &mut [f32], v: &Vector3<f64>| {
            for (dst, src) in out.iter_mut().zip(v.iter()) {
                *dst = *src as f32;
            }
        };

        for (term, range) in self.layout.iter() {
            let out = &mut self.buffer[range];
            match term {
                ObservationTerm::BaseLinVel => write3(out, &base.lin_vel),
                ObservationTerm::BaseAngVel => write3(out, &base.ang_vel),
                ObservationTerm::ProjectedGravity => write3(out, &base.projected_gravity),
                ObservationTerm::AnchorProjectedGravity => {
                    write3(out, &base.anchor_projected_gravity);
                }
                ObservationTerm::Command => {
                    out.fill(0.0);
                }
                ObservationTerm::Placeholder => out.copy_from_slice(command.as_slice()),
                ObservationTerm::JointPos => {
                    for (i, dst) in out.iter_mut().enumerate() {
                        let q = joints
                            .get(i)
                            .and_then(|b| b.qpos_adr)
                            .and_then(|adr| qpos.get(adr))
                            .map_or(0.0, |&q| q as f32);
                        *dst = q - defaults.get(i).copied().unwrap_or(0.0);
                    }
                }
                ObservationTerm::JointVel => {
                    for (i, dst) in out.iter_mut().enumerate() {
                        *dst = joints
                            .get(i)
                            .and_then(|b| b.qvel_adr)
                            .and_then(|adr| qvel.get(adr))
                            .map_or(0.0, |&v| v as f32);
                    }
                }
                ObservationTerm::Actions => {
                    for (i, dst) in out.iter_mut().enumerate() {
                        *dst = prev_action.get(i).copied().unwrap_or(0.0);
                    }
                }
            }
        }
        &self.buffer
    }
}
