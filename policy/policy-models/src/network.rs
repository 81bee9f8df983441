//! The seam between Burn modules and the runtime-agnostic session trait.

use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};
use policy_types::Tensor as HostTensor;

use crate::error::{ModelError, Result};

/// A Burn network that can serve as an inference session.
pub trait PolicyNetwork<B: Backend>: Send {
    /// Default name of the input tensor.
    const INPUT_NAME: &'static str;

    /// Default name of the output tensor.
    const OUTPUT_NAME: &'static str;

    /// Expected input dimensions; `None` entries are dynamic.
    fn input_dims(&self) -> Vec<Option<usize>>;

    /// Runs the network on host data.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] when `input` does not fit
    /// [`input_dims`](Self::input_dims).
    fn infer(&self, input: &HostTensor, device: &B::Device) -> Result<HostTensor>;
}

/// Checks `actual` against declared dimensions.
pub(crate) fn check_dims(expected: &[Option<usize>], actual: &[usize]) -> Result<()> {
    let fits = expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .all(|(e, a)| e.is_none_or(|e| e == *a));
    if fits && actual.iter().all(|&d| d > 0) {
        Ok(())
    } else {
        Err(ModelError::shape_mismatch(expected, actual))
    }
}

/// Uploads host data as a rank-`D` tensor with the given shape.
pub(crate) fn to_device<B: Backend, const D: usize>(
    input: &HostTensor,
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    Tensor::from_data(TensorData::new(input.data().to_vec(), shape), device)
}

/// Downloads a tensor to host memory.
pub(crate) fn to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<HostTensor> {
    let dims = tensor.dims().to_vec();
    let data = tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| ModelError::TensorData(format!("{e:?}")))?;
    HostTensor::new(dims, data)
        .ok_or_else(|| ModelError::TensorData("data does not fill shape".into()))
}
