//! The control session: one policy bound to one simulation model.

use policy_depth::{DepthFeatureExtractor, DepthFrame, DepthPreview};
use policy_metadata::MetadataResolver;
use policy_types::{BridgeConfig, InferenceSession, PolicyMetadata, SimData, SimModel};
use tracing::{debug, info};

use crate::binder::{BindingTable, JointBinder};
use crate::command::{AutoForwardZones, CommandInput};
use crate::control_law::ControlLawApplier;
use crate::error::Result;
use crate::observation::ObservationAssembler;
use crate::scheduler::{InFlightGuard, InferenceScheduler};
use crate::target::ControlTarget;

/// What a call to [`PolicyController::request_action`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The policy ran and the target was recomputed.
    Updated,
    /// Another call held the in-flight slot; nothing changed.
    InFlight,
}

/// Bridges a simulation model to a locomotion policy.
///
/// Construction resolves the policy metadata, sizes the observation buffer,
/// and binds joints. A controller that exists is ready. Per control tick the
/// host calls [`request_action`](Self::request_action) at the decimated rate
/// and [`apply_control`](Self::apply_control) every substep; see
/// [`ControlLoop`](crate::ControlLoop).
#[derive(Debug)]
pub struct PolicyController {
    config: BridgeConfig,
    meta: PolicyMetadata,
    binder: JointBinder,
    assembler: ObservationAssembler,
    scheduler: InferenceScheduler,
    depth: DepthFeatureExtractor,
    command: CommandInput,
    zones: AutoForwardZones,
    target: ControlTarget,
    law: ControlLawApplier,
    decimation: usize,
}

impl PolicyController {
    /// Initializes a control session.
    ///
    /// `artifact` is the raw policy file, scanned for metadata when the
    /// session cannot expose it. `depth_backbone` is optional; without it the
    /// depth feature is zero-filled.
    ///
    /// # Errors
    ///
    /// - [`ControlError::Config`](crate::ControlError::Config) for an invalid configuration
    /// - [`ControlError::Metadata`](crate::ControlError::Metadata) for missing keys,
    ///   unknown observation names, or a malformed artifact
    /// - [`ControlError::NoPolicyInput`](crate::ControlError::NoPolicyInput) /
    ///   [`ControlError::NoActionOutput`](crate::ControlError::NoActionOutput)
    pub fn new<M: SimModel + ?Sized>(
        config: BridgeConfig,
        model: &M,
        policy: Box<dyn InferenceSession>,
        artifact: Option<&[u8]>,
        depth_backbone: Option<Box<dyn InferenceSession>>,
    ) -> Result<Self> {
        config.validate()?;
        let meta = MetadataResolver::new(policy.as_ref(), artifact).resolve()?;

        let layout = meta.layout();
        let obs_len = layout.len();
        let assembler = ObservationAssembler::new(layout);
        let binder = JointBinder::new(
            model,
            meta.joint_names().to_vec(),
            config.anchor_body.clone(),
        );
        let scheduler = InferenceScheduler::new(
            policy,
            obs_len,
            meta.joint_count(),
            config.depth.feature_dim,
        )?;

        if depth_backbone.is_none() {
            info!("no depth backbone loaded, depth feature is zero-filled");
        }
        let depth = DepthFeatureExtractor::new(&config.depth, depth_backbone);

        let decimation = config.decimation(model.timestep());
        info!(
            decimation,
            control_dt = config.control_dt,
            timestep = model.timestep(),
            obs_len,
            "policy decimation"
        );

        let mut controller = Self {
            command: CommandInput::new(config.speed_tier),
            zones: AutoForwardZones::new(config.auto_forward.clone()),
            target: ControlTarget::new(&meta),
            law: ControlLawApplier::new(&meta),
            config,
            meta,
            binder,
            assembler,
            scheduler,
            depth,
            decimation,
        };
        controller.reset();
        Ok(controller)
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Resolved policy metadata.
    #[must_use]
    pub const fn metadata(&self) -> &PolicyMetadata {
        &self.meta
    }

    /// Current joint bindings.
    #[must_use]
    pub const fn bindings(&self) -> &BindingTable {
        self.binder.bindings()
    }

    /// Substeps per policy call for the bound model.
    #[must_use]
    pub const fn decimation(&self) -> usize {
        self.decimation
    }

    /// Operator command state.
    #[must_use]
    pub const fn command_input(&self) -> &CommandInput {
        &self.command
    }

    /// Operator command state, for key events.
    pub fn command_input_mut(&mut self) -> &mut CommandInput {
        &mut self.command
    }

    /// Current joint targets.
    #[must_use]
    pub const fn target(&self) -> &ControlTarget {
        &self.target
    }

    /// Last accepted raw action.
    #[must_use]
    pub fn latest_action(&self) -> &[f32] {
        self.target.latest_action()
    }

    /// Last assembled observation.
    #[must_use]
    pub fn observation(&self) -> &[f32] {
        self.assembler.buffer()
    }

    /// The in-flight guard of the policy call.
    #[must_use]
    pub const fn in_flight_guard(&self) -> &InFlightGuard {
        self.scheduler.guard()
    }

    /// Depth extractor state.
    #[must_use]
    pub const fn depth(&self) -> &DepthFeatureExtractor {
        &self.depth
    }

    /// Stores the most recent depth frame; `None` clears it.
    pub fn set_depth_frame(&mut self, frame: Option<DepthFrame>) {
        self.depth.set_frame(frame);
    }

    /// Last preprocessed depth image.
    #[must_use]
    pub const fn depth_preview(&self) -> Option<&DepthPreview> {
        self.depth.preview()
    }

    /// Enables auto-forward when the root lies inside a zone; returns the new state.
    pub fn update_auto_forward<D: SimData + ?Sized>(&mut self, data: &D) -> bool {
        let root = self.binder.bindings().root();
        let inside = root.is_free
            && data
                .qpos()
                .get(root.qpos_adr)
                .is_some_and(|&x| self.zones.contains(x));
        if inside != self.command.auto_forward() {
            debug!(inside, "auto-forward zone changed");
            self.command.set_auto_forward(inside);
        }
        inside
    }

    /// Zero action, target at the default pose, idle command, empty depth queue.
    pub fn reset(&mut self) {
        self.target.reset();
        self.assembler.reset();
        self.depth.reset();
        self.command.reset();
    }

    /// Rebinds joints after a model swap and resets.
    pub fn rebuild<M: SimModel + ?Sized>(&mut self, model: &M) {
        self.binder.rebuild(model);
        self.decimation = self.config.decimation(model.timestep());
        self.reset();
    }

    /// Writes the default pose into bound position slots and zeros bound
    /// velocity slots.
    pub fn seed_default_pose<D: SimData + ?Sized>(&self, data: &mut D) {
        let defaults = self.meta.default_joint_pos();
        for (binding, &default) in self.binder.bindings().joints().iter().zip(defaults) {
            if let Some(adr) = binding.qpos_adr {
                if let Some(slot) = data.qpos_mut().get_mut(adr) {
                    *slot = f64::from(default);
                }
            }
            if let Some(adr) = binding.qvel_adr {
                if let Some(slot) = data.qvel_mut().get_mut(adr) {
                    *slot = 0.0;
                }
            }
        }
    }

    /// Runs one policy step.
    ///
    /// Assembles the observation, advances the depth pipeline by one tick,
    /// runs the policy, and recomputes the target. A request made while
    /// another is outstanding is dropped.
    ///
    /// # Errors
    ///
    /// Per-call errors from the policy (see
    /// [`ControlError::is_per_call`](crate::ControlError::is_per_call)). The
    /// target is left unchanged and the in-flight slot is released.
    pub fn request_action<D: SimData + ?Sized>(&mut self, data: &D) -> Result<RequestOutcome> {
        let Some(_ticket) = self.scheduler.guard().try_acquire() else {
            debug!("policy request dropped, call in flight");
            return Ok(RequestOutcome::InFlight);
        };

        let observation = self.assembler.assemble(
            data,
            self.binder.bindings(),
            &self.meta,
            self.command.command(),
            self.target.latest_action(),
        );
        let feature = self.depth.tick();
        let action = self.scheduler.infer(observation, &feature)?;
        self.target.update(&action)?;
        Ok(RequestOutcome::Updated)
    }

    /// Writes PD torques for the current target; returns the number of
    /// actuators written.
    pub fn apply_control<M, D>(&self, model: &M, data: &mut D) -> usize
    where
        M: SimModel + ?Sized,
        D: SimData + ?Sized,
    {
        self.law
            .apply(model, data, self.binder.bindings(), self.target.values())
    }
}
