//! Shared fixtures: a 29-joint humanoid model and scripted networks.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use policy_metadata::encode_model_metadata;
use policy_types::{ArrayModel, InferenceSession, JointKind, SessionError, Tensor, TensorMap};

/// Actuated joints of the humanoid, in policy order.
pub const HUMANOID_JOINTS: [&str; 29] = [
    "left_hip_pitch_joint",
    "left_hip_roll_joint",
    "left_hip_yaw_joint",
    "left_knee_joint",
    "left_ankle_pitch_joint",
    "left_ankle_roll_joint",
    "right_hip_pitch_joint",
    "right_hip_roll_joint",
    "right_hip_yaw_joint",
    "right_knee_joint",
    "right_ankle_pitch_joint",
    "right_ankle_roll_joint",
    "waist_yaw_joint",
    "waist_roll_joint",
    "waist_pitch_joint",
    "left_shoulder_pitch_joint",
    "left_shoulder_roll_joint",
    "left_shoulder_yaw_joint",
    "left_elbow_joint",
    "left_wrist_roll_joint",
    "left_wrist_pitch_joint",
    "left_wrist_yaw_joint",
    "right_shoulder_pitch_joint",
    "right_shoulder_roll_joint",
    "right_shoulder_yaw_joint",
    "right_elbow_joint",
    "right_wrist_roll_joint",
    "right_wrist_pitch_joint",
    "right_wrist_yaw_joint",
];

/// Observation schema of the humanoid walking policy.
pub const HUMANOID_OBSERVATIONS: &str = "projected_gravity,joint_pos,joint_vel,actions,placeholder";

/// Free-floating humanoid: root joint, then one actuated hinge per joint.
///
/// `qpos` index of joint `i` is `7 + i`, `qvel` index is `6 + i`, `ctrl`
/// index is `i`.
pub fn humanoid_model(timestep: f64) -> ArrayModel {
    let mut model = ArrayModel::new(timestep);
    let pelvis = model.add_body("pelvis");
    model.add_joint("floating_base_joint", JointKind::Free, pelvis);
    let torso = model.add_body("torso_link");
    for name in HUMANOID_JOINTS {
        let joint = model.add_joint(name, JointKind::Hinge, torso);
        model.add_joint_actuator(joint, Some((-88.0, 88.0)));
    }
    model
}

/// Metadata artifact for the humanoid with optional extra entries.
pub fn humanoid_artifact(extra: &[(&str, String)]) -> Vec<u8> {
    let mut entries = vec![
        ("joint_names".to_string(), HUMANOID_JOINTS.join(",")),
        ("observation_names".to_string(), HUMANOID_OBSERVATIONS.to_string()),
    ];
    entries.extend(extra.iter().map(|(k, v)| ((*k).to_string(), v.clone())));
    encode_model_metadata(&entries)
}

/// Comma-separated list of `n` copies of `value`.
pub fn repeated(value: f32, n: usize) -> String {
    vec![value.to_string(); n].join(",")
}

/// Feeds seen by a scripted network, shared with the test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<TensorMap>>>);

impl CallLog {
    pub fn len(&self) -> usize {
        self.0.lock().expect("call log lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Input `name` of the most recent call.
    pub fn last(&self, name: &str) -> Option<Tensor> {
        self.0
            .lock()
            .expect("call log lock")
            .last()
            .and_then(|feeds| feeds.get(name).cloned())
    }

    /// Input `name` of call `index`.
    pub fn nth(&self, index: usize, name: &str) -> Option<Tensor> {
        self.0
            .lock()
            .expect("call log lock")
            .get(index)
            .and_then(|feeds| feeds.get(name).cloned())
    }

    fn push(&self, feeds: TensorMap) {
        self.0.lock().expect("call log lock").push(feeds);
    }
}

/// Policy returning a fixed action and recording its feeds.
pub struct ScriptedPolicy {
    inputs: Vec<String>,
    outputs: Vec<String>,
    action: Vec<f32>,
    log: CallLog,
}

impl ScriptedPolicy {
    pub fn new(action: Vec<f32>) -> (Self, CallLog) {
        let log = CallLog::default();
        let policy = Self {
            inputs: vec!["obs".to_string()],
            outputs: vec!["values".to_string(), "actions".to_string()],
            action,
            log: log.clone(),
        };
        (policy, log)
    }

    pub fn with_time_step(mut self) -> Self {
        self.inputs.push("time_step".to_string());
        self
    }

    pub fn boxed(self) -> Box<dyn InferenceSession> {
        Box::new(self)
    }
}

impl InferenceSession for ScriptedPolicy {
    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }

    fn run(&mut self, feeds: TensorMap) -> Result<TensorMap, SessionError> {
        self.log.push(feeds);
        let mut out = TensorMap::new();
        out.insert("values".to_string(), Tensor::row(vec![0.0]));
        out.insert("actions".to_string(), Tensor::row(self.action.clone()));
        Ok(out)
    }
}

/// Depth backbone whose k-th call (from 1) returns `k` in every slot.
pub struct CountingBackbone {
    inputs: Vec<String>,
    outputs: Vec<String>,
    calls: u16,
    feature_dim: usize,
}

impl CountingBackbone {
    pub fn new(feature_dim: usize) -> Self {
        Self {
            inputs: vec!["depth".to_string()],
            outputs: vec!["depth_latent".to_string()],
            calls: 0,
            feature_dim,
        }
    }
}

impl InferenceSession for CountingBackbone {
    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }

    fn run(&mut self, feeds: TensorMap) -> Result<TensorMap, SessionError> {
        if !feeds.contains_key("depth") {
            return Err(SessionError::MissingInput("depth".to_string()));
        }
        self.calls += 1;
        let mut out = TensorMap::new();
        out.insert(
            "depth_latent".to_string(),
            Tensor::row(vec![f32::from(self.calls); self.feature_dim]),
        );
        Ok(out)
    }
}
