//! Request scheduling: in-flight guard, per-call failures, decimation.

use policy_control::{ControlError, ControlLoop, PolicyController, RequestOutcome};
use policy_types::BridgeConfig;

use crate::common::{CallLog, ScriptedPolicy, humanoid_artifact, humanoid_model, repeated};

fn controller_with_action(action: Vec<f32>) -> (PolicyController, CallLog) {
    let model = humanoid_model(0.005);
    let (policy, log) = ScriptedPolicy::new(action);
    let artifact = humanoid_artifact(&[
        ("action_scale", "0.5".to_string()),
        ("default_joint_pos", repeated(0.1, 29)),
        ("joint_stiffness", repeated(100.0, 29)),
        ("joint_damping", repeated(2.0, 29)),
    ]);
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
// In-flight guard
// ============================================================================

#[test]
fn test_request_while_in_flight_is_dropped() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (mut controller, log) = controller_with_action(vec![1.0; 29]);
    let before = controller.target().clone();

    let guard = controller.in_flight_guard().clone();
    let ticket = guard.try_acquire().expect("guard idle");
    assert!(controller.in_flight_guard().is_in_flight());

    let outcome = controller.request_action(&data).expect("dropped, not failed");
    assert_eq!(outcome, RequestOutcome::InFlight);
    assert_eq!(controller.target(), &before);
    assert!(log.is_empty());

    drop(ticket);
    let outcome = controller.request_action(&data).expect("request succeeds");
    assert_eq!(outcome, RequestOutcome::Updated);
    assert_eq!(log.len(), 1);
    assert!((controller.target().values()[0] - 0.6).abs() < 1e-6);
}

#[test]
fn test_guard_released_after_request() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (mut controller, _) = controller_with_action(vec![0.0; 29]);
    controller.request_action(&data).expect("request succeeds");
    assert!(!controller.in_flight_guard().is_in_flight());
}

// ============================================================================
// Per-call failures
// ============================================================================

#[test]
fn test_action_length_mismatch_keeps_target() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (mut controller, log) = controller_with_action(vec![1.0; 28]);
    let before = controller.target().clone();

    let err = controller.request_action(&data);
    assert!(matches!(
        err,
        Err(ControlError::ActionLength {
            expected: 29,
            actual: 28
        })
    ));
    assert!(err.is_err_and(|e| e.is_per_call()));
    assert_eq!(log.len(), 1);
    assert_eq!(controller.target(), &before);
    assert!(controller.latest_action().iter().all(|&a| a == 0.0));
    assert!(!controller.in_flight_guard().is_in_flight());
}

#[test]
fn test_loop_survives_failing_policy() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (mut controller, log) = controller_with_action(vec![1.0; 3]);
    let mut control = ControlLoop::new(controller.decimation());

    for _ in 0..8 {
        assert_eq!(control.substep(&mut controller, &model, &mut data), None);
    }
    assert_eq!(log.len(), 2);
    // Default pose is held: kp * (0.1 - 0) = 10
    assert!((data.ctrl[0] - 10.0).abs() < 1e-5);
}

// ============================================================================
// Decimation
// ============================================================================

#[test]
fn test_decimation_from_control_dt() {
    let (controller, _) = controller_with_action(vec![0.0; 29]);
    assert_eq!(controller.decimation(), 4);

    let mut control = ControlLoop::from_config(controller.config(), 0.005);
    assert_eq!(control.decimation(), 4);
    control.reset();
    assert_eq!(control.counter(), 0);
}

#[test]
fn test_policy_runs_every_nth_substep() {
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let (mut controller, log) = controller_with_action(vec![0.2; 29]);
    let mut control = ControlLoop::new(controller.decimation());

    let mut outcomes = Vec::new();
    for _ in 0..12 {
        outcomes.push(control.substep(&mut controller, &model, &mut data));
    }
    assert_eq!(log.len(), 3);
    assert_eq!(control.counter(), 12);
    let requested: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, o)| o.map(|_| i))
        .collect();
    assert_eq!(requested, [0, 4, 8]);
}

#[test]
fn test_rebuild_rebinds_and_resets() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (mut controller, _) = controller_with_action(vec![1.0; 29]);
    controller.request_action(&data).expect("request succeeds");
    controller.command_input_mut().key_down('w', false);

    let finer = humanoid_model(0.002);
    controller.rebuild(&finer);
    assert_eq!(controller.decimation(), 10);
    assert!(controller.latest_action().iter().all(|&a| a == 0.0));
    assert!((controller.target().values()[0] - 0.1).abs() < 1e-6);
    assert_eq!(controller.command_input().command().active_slot(), 0);
    assert_eq!(controller.bindings().joints()[0].qpos_adr, Some(7));
}
