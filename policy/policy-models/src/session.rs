//! Burn networks behind the [`InferenceSession`] trait.

use std::marker::PhantomData;

use burn::prelude::Backend;
use policy_types::{InferenceSession, MetadataMap, SessionError, TIME_STEP_INPUT, TensorMap};
use tracing::trace;

use crate::network::PolicyNetwork;

/// Serves a [`PolicyNetwork`] as an [`InferenceSession`].
///
/// The first declared input carries the network input. A declared
/// [`TIME_STEP_INPUT`] must be fed but is otherwise ignored. Metadata attached
/// with [`with_metadata`](Self::with_metadata) is exposed as structured
/// custom metadata.
///
/// # Example
///
/// ```
/// use burn_ndarray::NdArray;
/// use policy_models::{ActorMlp, ActorMlpConfig, BurnSession};
/// use policy_types::{InferenceSession, Tensor, TensorMap};
///
/// let device = Default::default();
/// let actor = ActorMlp::<NdArray<f32>>::new(ActorMlpConfig::new(4, 0, 2).with_hidden(8), &device);
/// let mut session = BurnSession::<NdArray<f32>, _>::new(actor, device);
///
/// let mut feeds = TensorMap::new();
/// feeds.insert("obs".into(), Tensor::row(vec![0.0; 4]));
/// let out = session.run(feeds)?;
/// assert_eq!(out["actions"].len(), 2);
/// # Ok::<(), policy_types::SessionError>(())
/// ```
pub struct BurnSession<B: Backend, N: PolicyNetwork<B>> {
    network: N,
    device: B::Device,
    inputs: Vec<String>,
    outputs: Vec<String>,
    metadata: MetadataMap,
    _backend: PhantomData<fn() -> B>,
}

impl<B: Backend, N: PolicyNetwork<B>> std::fmt::Debug for BurnSession<B, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurnSession")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("metadata_keys", &self.metadata.len())
            .finish_non_exhaustive()
    }
}

impl<B: Backend, N: PolicyNetwork<B>> BurnSession<B, N> {
    /// Wraps a network using its default tensor names.
    #[must_use]
    pub fn new(network: N, device: B::Device) -> Self {
        Self {
            network,
            device,
            inputs: vec![N::INPUT_NAME.to_string()],
            outputs: vec![N::OUTPUT_NAME.to_string()],
            metadata: MetadataMap::new(),
            _backend: PhantomData,
        }
    }

    /// Renames the network input.
    #[must_use]
    pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
        self.inputs[0] = name.into();
        self
    }

    /// Renames the network output.
    #[must_use]
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.outputs[0] = name.into();
        self
    }

    /// Declares the scalar [`TIME_STEP_INPUT`] input.
    #[must_use]
    pub fn with_time_step_input(mut self) -> Self {
        if !self.inputs.iter().any(|name| name == TIME_STEP_INPUT) {
            self.inputs.push(TIME_STEP_INPUT.to_string());
        }
        self
    }

    /// Attaches custom metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// The wrapped network.
    #[must_use]
    pub const fn network(&self) -> &N {
        &self.network
    }
}

impl<B: Backend, N: PolicyNetwork<B>> InferenceSession for BurnSession<B, N> {
    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }

    fn input_dims(&self, name: &str) -> Option<Vec<Option<usize>>> {
        if name == self.inputs[0] {
            Some(self.network.input_dims())
        } else if name == TIME_STEP_INPUT {
            Some(vec![Some(1), Some(1)])
        } else {
            None
        }
    }

    fn custom_metadata(&self) -> Option<MetadataMap> {
        (!self.metadata.is_empty()).then(|| self.metadata.clone())
    }

    fn run(&mut self, mut feeds: TensorMap) -> Result<TensorMap, SessionError> {
        let name = &self.inputs[0];
        let input = feeds
            .remove(name)
            .ok_or_else(|| SessionError::MissingInput(name.clone()))?;
        if self.wants_time_step() && !feeds.contains_key(TIME_STEP_INPUT) {
            return Err(SessionError::MissingInput(TIME_STEP_INPUT.to_string()));
        }

        let dims = self.network.input_dims();
        if dims.iter().all(Option::is_some) {
            let expected: usize = dims.iter().flatten().product();
            if input.len() != expected {
                return Err(SessionError::InputShape {
                    name: name.clone(),
                    expected,
                    actual: input.len(),
                });
            }
        }

        trace!(input = %name, len = input.len(), "burn session run");
        let output = self
            .network
            .infer(&input, &self.device)
            .map_err(|e| SessionError::run(e.to_string()))?;

        let mut out = TensorMap::new();
        out.insert(self.outputs[0].clone(), output);
        Ok(out)
    }
}
