//! Actions to actuator controls.

use policy_control::{ControlLoop, PolicyController};
use policy_types::{ArrayModel, BridgeConfig, JointKind, SimData};

use crate::common::{ScriptedPolicy, humanoid_artifact, humanoid_model, repeated};

// ============================================================================
// PD law
// ============================================================================

#[test]
fn test_zero_gains_write_zero_torque() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (policy, _) = ScriptedPolicy::new(vec![0.8; 29]);
    let artifact = humanoid_artifact(&[("default_joint_pos", repeated(0.3, 29))]);
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");

    for i in 0..29 {
        data.qpos[7 + i] = -0.4;
        data.qvel[6 + i] = 3.0;
        data.ctrl[i] = 5.0;
    }
    controller.request_action(&data).expect("request succeeds");
    let written = controller.apply_control(&model, &mut data);

    assert_eq!(written, 29);
    assert!(data.ctrl.iter().all(|&c| c == 0.0));
}

#[test]
fn test_on_target_at_rest_writes_zero() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (policy, _) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[
        ("default_joint_pos", repeated(0.25, 29)),
        ("joint_stiffness", repeated(150.0, 29)),
        ("joint_damping", repeated(4.0, 29)),
    ]);
    let controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");

    controller.seed_default_pose(&mut data);
    controller.apply_control(&model, &mut data);
    assert!(data.ctrl.iter().all(|&c| c.abs() < 1e-9));
}

#[test]
fn test_torque_clamped_to_ctrl_range() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (policy, _) = ScriptedPolicy::new(vec![1.0; 29]);
    let artifact = humanoid_artifact(&[
        ("action_scale", "0.5".to_string()),
        ("joint_stiffness", repeated(500.0, 29)),
        ("joint_damping", repeated(1.0, 29)),
    ]);
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");

    data.qpos[7 + 1] = 0.45;
    data.qvel[6 + 1] = 2.0;
    controller.request_action(&data).expect("request succeeds");
    controller.apply_control(&model, &mut data);

    assert!((data.ctrl[0] - 88.0).abs() < 1e-9);
    // 500 * (0.5 - 0.45) - 1 * 2 = 23
    assert!((data.ctrl[1] - 23.0).abs() < 1e-4);
}

#[test]
fn test_unbound_joints_are_skipped() {
    let mut model = ArrayModel::new(0.005);
    let pelvis = model.add_body("pelvis");
    model.add_joint("floating_base_joint", JointKind::Free, pelvis);
    let knee = model.add_joint("left_knee_joint", JointKind::Hinge, pelvis);
    model.add_joint("left_hip_pitch_joint", JointKind::Hinge, pelvis);
    model.add_joint_actuator(knee, None);
    let mut data = model.make_data();

    let (policy, log) = ScriptedPolicy::new(vec![1.0; 29]);
    let artifact = humanoid_artifact(&[("joint_stiffness", repeated(10.0, 29))]);
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("partial binding is not fatal");

    assert_eq!(controller.bindings().unresolved().count(), 27);
    assert_eq!(controller.bindings().unactuated().collect::<Vec<_>>(), ["left_hip_pitch_joint"]);

    controller.request_action(&data).expect("request succeeds");
    assert_eq!(log.last("obs").expect("policy saw obs").len(), 105 + 32);
    assert_eq!(controller.apply_control(&model, &mut data), 1);
    assert!((data.ctrl[0] - 10.0).abs() < 1e-9);
}

// ============================================================================
// Session state
// ============================================================================

#[test]
fn test_seed_default_pose() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    data.qvel.fill(1.0);
    let (policy, _) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[("default_joint_pos", "0.1,0.2,0.3".to_string())]);
    let controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");

    controller.seed_default_pose(&mut data);
    assert!((data.qpos()[7] - 0.1).abs() < 1e-6);
    assert!((data.qpos()[9] - 0.3).abs() < 1e-6);
    assert!(data.qpos()[10].abs() < 1e-12);
    assert!(data.qvel()[6..].iter().all(|&v| v == 0.0));
    assert!(data.qvel()[..6].iter().all(|&v| v == 1.0));
}

#[test]
fn test_auto_forward_zones_drive_command() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (policy, log) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[]);
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        policy.boxed(),
        Some(&artifact),
        None,
    )
    .expect("controller initializes");
    let mut control = ControlLoop::new(controller.decimation());

    data.qpos[0] = 9.0;
    assert!(controller.update_auto_forward(&data));
    control.substep(&mut controller, &model, &mut data);
    let obs = log.last("obs").expect("policy saw obs");
    assert_eq!(obs.data()[90 + 6], 1.0);

    data.qpos[0] = 12.0;
    assert!(!controller.update_auto_forward(&data));
    assert_eq!(controller.command_input().command().active_slot(), 0);
}
