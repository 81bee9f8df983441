//! Metadata-driven observation layout through the controller.

use approx::assert_relative_eq;
use policy_control::{ControlError, PolicyController};
use policy_metadata::{MetadataError, encode_model_metadata};
use policy_types::{BridgeConfig, SpeedTier};

use crate::common::{HUMANOID_JOINTS, ScriptedPolicy, humanoid_artifact, humanoid_model, repeated};

fn controller(extra: &[(&str, String)]) -> (PolicyController, crate::common::CallLog) {
    let model = humanoid_model(0.005);
    let (policy, log) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(extra);
    let controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");
    (controller, log)
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_humanoid_layout_is_105() {
    let (controller, _) = controller(&[]);
    assert_eq!(controller.metadata().joint_count(), 29);
    assert_eq!(controller.metadata().layout().len(), 3 + 29 + 29 + 29 + 15);
    assert_eq!(controller.observation().len(), 105);
    assert_eq!(controller.bindings().unresolved().count(), 0);
    assert_eq!(controller.bindings().unactuated().count(), 0);
}

#[test]
fn test_policy_input_is_observation_plus_depth() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (mut controller, log) = controller(&[]);

    controller.request_action(&data).expect("request succeeds");

    let input = log.last("obs").expect("policy saw obs");
    assert_eq!(input.dims(), &[1, 105 + 32]);
    assert!(input.data()[105..].iter().all(|&v| v == 0.0));
    assert!(log.last("time_step").is_none());
}

#[test]
fn test_time_step_fed_when_declared() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (policy, log) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[]);
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.with_time_step().boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");

    controller.request_action(&data).expect("request succeeds");
    let time_step = log.last("time_step").expect("time_step fed");
    assert_eq!(time_step.dims(), &[1, 1]);
    assert_eq!(time_step.data(), &[0.0]);
}

// ============================================================================
// Terms
// ============================================================================

#[test]
fn test_joint_terms_follow_state() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (mut controller, log) = controller(&[("default_joint_pos", repeated(0.25, 29))]);

    data.qpos[7 + 3] = 1.0;
    data.qvel[6 + 28] = -2.0;
    controller.request_action(&data).expect("request succeeds");

    let input = log.last("obs").expect("policy saw obs");
    let obs = input.data();
    assert_relative_eq!(obs[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(obs[1], 0.0, epsilon = 1e-6);
    assert_relative_eq!(obs[2], -1.0, epsilon = 1e-6);
    assert_relative_eq!(obs[3], -0.25);
    assert_relative_eq!(obs[3 + 3], 0.75);
    assert_relative_eq!(obs[32 + 28], -2.0);
    assert!(obs[61..90].iter().all(|&v| v == 0.0));
}

#[test]
fn test_command_reaches_placeholder_block() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (mut controller, log) = controller(&[]);

    controller.request_action(&data).expect("request succeeds");
    let idle = log.last("obs").expect("policy saw obs");
    assert_eq!(idle.data()[90], 1.0);

    controller.command_input_mut().key_down('w', false);
    controller.request_action(&data).expect("request succeeds");
    let forward = log.last("obs").expect("policy saw obs");
    let placeholder = &forward.data()[90..105];
    assert_eq!(controller.command_input().tier(), SpeedTier::High);
    assert_eq!(placeholder.iter().position(|&v| v == 1.0), Some(6));
    assert_eq!(placeholder.iter().filter(|&&v| v != 0.0).count(), 1);
}

#[test]
fn test_previous_action_fed_back() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let action: Vec<f32> = (0..29).map(|i| i as f32 * 0.01).collect();
    let (policy, log) = ScriptedPolicy::new(action.clone());
    let artifact = humanoid_artifact(&[]);
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");

    controller.request_action(&data).expect("first request");
    controller.request_action(&data).expect("second request");

    let first = log.nth(0, "obs").expect("first call");
    let second = log.nth(1, "obs").expect("second call");
    assert!(first.data()[61..90].iter().all(|&v| v == 0.0));
    assert_eq!(&second.data()[61..90], action.as_slice());
}

// ============================================================================
// Fatal metadata
// ============================================================================

#[test]
fn test_unknown_observation_aborts_init() {
    let model = humanoid_model(0.005);
    let (policy, _) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = encode_model_metadata(&[
        ("joint_names", HUMANOID_JOINTS.join(",")),
        ("observation_names", "joint_pos,height_scan".to_string()),
    ]);
    let err = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    );
    assert!(matches!(
        err,
        Err(ControlError::Metadata(MetadataError::UnknownObservation(ref t))) if t == "height_scan"
    ));
}

#[test]
fn test_missing_metadata_aborts_init() {
    let model = humanoid_model(0.005);
    let (policy, _) = ScriptedPolicy::new(vec![0.0; 29]);
    let err = PolicyController::new(BridgeConfig::default(), &model, policy.boxed(), None, None);
    assert!(matches!(err, Err(ControlError::Metadata(MetadataError::MissingKey("joint_names")))));
}

#[test]
fn test_invalid_config_aborts_init() {
    let model = humanoid_model(0.005);
    let (policy, _) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[]);
    let config = BridgeConfig::default().with_control_dt(-1.0);
    let err = PolicyController::new(config, &model, policy.boxed(), Some(&artifact), None);
    assert!(matches!(err, Err(ControlError::Config(_))));
}
