//! Burn reference networks driving the controller end to end.

use burn::prelude::Backend;
use burn_ndarray::NdArray;
use policy_control::{ControlLoop, PolicyController, RequestOutcome};
use policy_depth::DepthFrame;
use policy_metadata::MetadataResolver;
use policy_models::{
    ActorMlp, ActorMlpConfig, BurnSession, DepthBackbone, DepthBackboneConfig, policy_card,
};
use policy_types::{BridgeConfig, ClipRange, InferenceSession, PolicyMetadata};

use crate::common::{humanoid_artifact, humanoid_model, repeated};

type TestBackend = NdArray<f32>;

fn humanoid_metadata() -> PolicyMetadata {
    let artifact = humanoid_artifact(&[
        ("action_scale", "0.25".to_string()),
        ("default_joint_pos", repeated(0.1, 29)),
        ("joint_stiffness", repeated(60.0, 29)),
        ("joint_damping", repeated(2.0, 29)),
    ]);
    MetadataResolver::from_artifact(&artifact)
        .resolve()
        .expect("metadata resolves")
}

fn actor_session(meta: &PolicyMetadata) -> Box<dyn InferenceSession> {
    let device = <TestBackend as Backend>::Device::default();
    let config = ActorMlpConfig::new(meta.layout().len(), 32, meta.joint_count()).with_hidden(32);
    let actor = ActorMlp::<TestBackend>::new(config, &device);
    Box::new(
        BurnSession::<TestBackend, _>::new(actor, device)
            .with_time_step_input()
            .with_metadata(policy_card(meta)),
    )
}

fn backbone_session() -> Box<dyn InferenceSession> {
    let device = <TestBackend as Backend>::Device::default();
    let config = DepthBackboneConfig::default().with_channels(4);
    let backbone = DepthBackbone::<TestBackend>::new(config, &device);
    Box::new(BurnSession::<TestBackend, _>::new(backbone, device))
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_burn_policy_and_backbone_drive_controls() {
    let meta = humanoid_metadata();
    let model = humanoid_model(0.005);
    let mut data = model.make_data();

    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        actor_session(&meta),
        None,
        Some(backbone_session()),
    )
    .expect("controller initializes");
    assert_eq!(controller.metadata(), &meta);

    controller.seed_default_pose(&mut data);
    let frame =
        DepthFrame::uniform(96, 64, 1.2, ClipRange::new(0.3, 3.0)).expect("valid clip range");
    controller.set_depth_frame(Some(frame));

    let mut control = ControlLoop::new(controller.decimation());
    let mut updates = 0;
    for _ in 0..12 {
        if control.substep(&mut controller, &model, &mut data) == Some(RequestOutcome::Updated) {
            updates += 1;
        }
    }

    assert_eq!(updates, 3);
    assert_eq!(controller.latest_action().len(), 29);
    assert!(controller.latest_action().iter().all(|a| a.is_finite()));
    assert_eq!(controller.observation().len(), 105);
    assert!(controller.depth_preview().is_some());
    assert_eq!(controller.depth().queue().len(), 3);
    assert!(data.ctrl.iter().all(|c| c.is_finite() && c.abs() <= 88.0));
}

#[test]
fn test_same_state_same_action() {
    let meta = humanoid_metadata();
    let model = humanoid_model(0.005);
    let mut data = model.make_data();
    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        actor_session(&meta),
        None,
        None,
    )
    .expect("controller initializes");
    controller.seed_default_pose(&mut data);

    controller.request_action(&data).expect("first request");
    let first = controller.latest_action().to_vec();
    controller.reset();
    controller.request_action(&data).expect("second request");
    assert_eq!(controller.latest_action(), first.as_slice());

    let expected: Vec<f32> = first.iter().map(|a| 0.1 + 0.25 * a).collect();
    for (value, want) in controller.target().values().iter().zip(&expected) {
        assert!((value - want).abs() < 1e-6);
    }
}

#[test]
fn test_mismatched_actor_width_fails_per_call() {
    let meta = humanoid_metadata();
    let model = humanoid_model(0.005);
    let data = model.make_data();

    let device = <TestBackend as Backend>::Device::default();
    let actor =
        ActorMlp::<TestBackend>::new(ActorMlpConfig::new(90, 32, 29).with_hidden(8), &device);
    let session =
        BurnSession::<TestBackend, _>::new(actor, device).with_metadata(policy_card(&meta));

    let mut controller = PolicyController::new(
        BridgeConfig::default(),
        &model,
        Box::new(session),
        None,
        None,
    )
    .expect("width mismatch is not fatal at init");
    let err = controller.request_action(&data).expect_err("runtime rejects input");
    assert!(err.is_per_call());
    assert!(controller.latest_action().iter().all(|&a| a == 0.0));
}
