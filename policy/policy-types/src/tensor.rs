//! Named tensors and the inference runtime seam.

use std::collections::HashMap;

use crate::error::SessionError;

/// Name of the optional scalar input some exported policies declare.
pub const TIME_STEP_INPUT: &str = "time_step";

/// A dense `f32` tensor in row-major order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tensor {
    dims: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a tensor; returns `None` when `data` does not fill `dims`.
    #[must_use]
    pub fn new(dims: Vec<usize>, data: Vec<f32>) -> Option<Self> {
        (dims.iter().product::<usize>() == data.len()).then_some(Self { dims, data })
    }

    /// A `[1, n]` row vector.
    #[must_use]
    pub fn row(data: Vec<f32>) -> Self {
        Self {
            dims: vec![1, data.len()],
            data,
        }
    }

    /// Dimensions.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Values.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the tensor, returning its values.
    #[must_use]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the tensor holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Tensors keyed by graph input/output name.
pub type TensorMap = HashMap<String, Tensor>;

/// Key/value metadata attached to a model artifact.
pub type MetadataMap = HashMap<String, String>;

/// A loaded neural network.
///
/// Implementations may be slow and may fail; callers treat the network as a
/// black box and only rely on the declared names.
pub trait InferenceSession: Send {
    /// Declared input names, in graph order.
    fn input_names(&self) -> &[String];

    /// Declared output names, in graph order.
    fn output_names(&self) -> &[String];

    /// Declared dimensions of an input; `None` entries are dynamic.
    fn input_dims(&self, _name: &str) -> Option<Vec<Option<usize>>> {
        None
    }

    /// Custom metadata, when the runtime can expose it.
    fn custom_metadata(&self) -> Option<MetadataMap> {
        None
    }

    /// Runs the network.
    ///
    /// # Errors
    ///
    /// Any failure inside the runtime.
    fn run(&mut self, feeds: TensorMap) -> Result<TensorMap, SessionError>;

    /// First declared input.
    fn primary_input(&self) -> Option<&str> {
        self.input_names().first().map(String::as_str)
    }

    /// Output carrying the action: first name containing `action`, else the first output.
    fn action_output(&self) -> Option<&str> {
        let outputs = self.output_names();
        outputs
            .iter()
            .find(|name| name.to_lowercase().contains("action"))
            .or_else(|| outputs.first())
            .map(String::as_str)
    }

    /// Returns `true` if the session declares the [`TIME_STEP_INPUT`] input.
    fn wants_time_step(&self) -> bool {
        self.input_names().iter().any(|name| name == TIME_STEP_INPUT)
    }
}
