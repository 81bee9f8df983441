//! Depth feature delay through the request path.

use policy_control::{ControlError, PolicyController};
use policy_depth::DepthFrame;
use policy_types::{ArrayData, BridgeConfig, ClipRange, DepthConfig};

use crate::common::{CallLog, CountingBackbone, ScriptedPolicy, humanoid_artifact, humanoid_model};

const OBS_LEN: usize = 105;

fn setup(latency: usize) -> (PolicyController, CallLog, ArrayData) {
    let model = humanoid_model(0.005);
    let data = model.make_data();
    let (policy, log) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[]);
    let config =
        BridgeConfig::default().with_depth(DepthConfig::default().with_latency_steps(latency));
    let controller = PolicyController::new(
        config,
        &model,
        policy.boxed(),
        Some(&artifact),
        Some(Box::new(CountingBackbone::new(32))),
    )
    .expect("controller initializes");
    (controller, log, data)
}

fn frame() -> DepthFrame {
    DepthFrame::uniform(96, 64, 3.0, ClipRange::new(0.3, 3.0)).expect("valid clip range")
}

/// Depth feature the policy saw on call `index`, as a single value.
fn fed_feature(log: &CallLog, index: usize) -> f32 {
    let input = log.nth(index, "obs").expect("policy call recorded");
    let feature = &input.data()[OBS_LEN..];
    assert_eq!(feature.len(), 32);
    assert!(feature.iter().all(|&v| v == feature[0]));
    feature[0]
}

// ============================================================================
// Delay
// ============================================================================

#[test]
fn test_feature_delayed_by_latency_steps() {
    let latency = 3;
    let (mut controller, log, data) = setup(latency);
    controller.set_depth_frame(Some(frame()));

    for _ in 0..10 {
        controller.request_action(&data).expect("request succeeds");
    }

    // Ticks 1..=latency reuse the oldest entry, then tick t sees tick t - latency.
    let seen: Vec<f32> = (0..10).map(|i| fed_feature(&log, i)).collect();
    assert_eq!(seen, [1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    assert_eq!(controller.depth().queue().len(), latency);
}

#[test]
fn test_default_latency_tick_eight_sees_tick_one() {
    let (mut controller, log, data) = setup(DepthConfig::default().latency_steps);
    controller.set_depth_frame(Some(frame()));
    for _ in 0..9 {
        controller.request_action(&data).expect("request succeeds");
    }
    assert_eq!(fed_feature(&log, 7), 1.0);
    assert_eq!(fed_feature(&log, 8), 2.0);
}

#[test]
fn test_missing_frames_keep_queue_timing() {
    let (mut controller, log, data) = setup(2);

    controller.request_action(&data).expect("tick 1");
    controller.set_depth_frame(Some(frame()));
    controller.request_action(&data).expect("tick 2");
    controller.request_action(&data).expect("tick 3");
    controller.set_depth_frame(None);
    controller.request_action(&data).expect("tick 4");
    controller.request_action(&data).expect("tick 5");
    controller.request_action(&data).expect("tick 6");

    // Produced: none, 1, 2, none, none, none
    let seen: Vec<f32> = (0..6).map(|i| fed_feature(&log, i)).collect();
    assert_eq!(seen, [0.0, 0.0, 0.0, 1.0, 2.0, 0.0]);
}

#[test]
fn test_reset_clears_queue() {
    let (mut controller, log, data) = setup(3);
    controller.set_depth_frame(Some(frame()));
    for _ in 0..5 {
        controller.request_action(&data).expect("request succeeds");
    }
    controller.reset();
    assert!(controller.depth().queue().is_empty());

    controller.request_action(&data).expect("request after reset");
    assert_eq!(fed_feature(&log, 5), 6.0);
}

// ============================================================================
// Preview
// ============================================================================

#[test]
fn test_preview_after_request() {
    let (mut controller, _, data) = setup(1);
    assert!(controller.depth_preview().is_none());
    controller.set_depth_frame(Some(frame()));
    controller.request_action(&data).expect("request succeeds");

    let preview = controller.depth_preview().expect("preview cached");
    assert_eq!((preview.width, preview.height), (87, 58));
    assert!(preview.data.iter().all(|&v| v == 0.5));
    let rgba = preview.to_grayscale_rgba();
    assert_eq!(rgba.len(), 87 * 58 * 4);
    assert_eq!(&rgba[..4], &[255, 255, 255, 255]);
}

#[test]
fn test_no_backbone_zero_fills() {
    let model = humanoid_model(0.005);
    let data = model.make_data();
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
    controller.set_depth_frame(Some(frame()));
    controller.request_action(&data).expect("request succeeds");
    assert_eq!(fed_feature(&log, 0), 0.0);
    assert!(controller.depth_preview().is_none());
}

#[test]
fn test_inverted_depth_clip_rejected_at_init() {
    let model = humanoid_model(0.005);
    let (policy, _) = ScriptedPolicy::new(vec![0.0; 29]);
    let artifact = humanoid_artifact(&[]);
    let depth = DepthConfig::default().with_clip(ClipRange::new(3.0, 0.3));
    let result = PolicyController::new(
        BridgeConfig::default().with_depth(depth),
        &model,
        policy.boxed(),
        Some(&artifact),
        Some(Box::new(CountingBackbone::new(32))),
    );
    assert!(matches!(result, Err(ControlError::Config(_))));
}
