use varflow_image::{FlowField, ScalarImage};

use crate::engine::{ComputeOptions, FlowEngine};
use crate::error::FlowError;
use crate::progress::report;

/// Indexable source of frames.
pub trait ImageSequence {
    /// Number of frames.
    fn len(&self) -> usize;

    /// Whether the sequence has no frames.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the frame at `index`.
    ///
    /// # Errors
    ///
    /// If the frame cannot be produced.
    fn frame(&self, index: usize) -> Result<ScalarImage, FlowError>;
}

impl ImageSequence for [ScalarImage] {
    fn len(&self) -> usize {
        <[ScalarImage]>::len(self)
    }

    fn frame(&self, index: usize) -> Result<ScalarImage, FlowError> {
        self.get(index)
            .cloned()
            .ok_or(FlowError::MissingInput("sequence frame"))
    }
}

impl ImageSequence for Vec<ScalarImage> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn frame(&self, index: usize) -> Result<ScalarImage, FlowError> {
        self.as_slice().frame(index)
    }
}

/// Compute the flow between every pair of consecutive frames.
///
/// Frame `i` is the fixed image and frame `i + 1` the moving one. The
/// observer of `options` is notified after every pair; the other options are
/// forwarded to the engine unchanged.
///
/// # Errors
///
/// [`FlowError::MissingInput`] if the sequence has fewer than two frames, or
/// the first error raised by the engine.
pub fn compute_sequence_flow<E, S>(
    engine: &E,
    sequence: &S,
    options: &ComputeOptions<'_>,
) -> Result<Vec<FlowField>, FlowError>
where
    E: FlowEngine + ?Sized,
    S: ImageSequence + ?Sized,
{
    if sequence.len() < 2 {
        return Err(FlowError::MissingInput("at least two frames"));
    }

    let pairs = sequence.len() - 1;
    let engine_options = ComputeOptions {
        progress: None,
        ..*options
    };

    let mut flows = Vec::with_capacity(pairs);
    let mut fixed = sequence.frame(0)?;
    for i in 0..pairs {
        let moving = sequence.frame(i + 1)?;
        log::debug!("{}: frames {} -> {}", engine.name(), i, i + 1);
        flows.push(engine.compute(&fixed, &moving, &engine_options)?);
        fixed = moving;
        report(options.progress, i + 1, pairs);
    }

    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HornSchunckConfig;
    use crate::engine::HornSchunckEngine;
    use varflow_image::ImageSize;

    #[test]
    fn one_field_per_consecutive_pair() -> Result<(), FlowError> {
        let size = ImageSize {
            width: 8,
            height: 6,
        };
        let frames = (0..4)
            .map(|t| ScalarImage::from_fn(size, |x, y| [(x + y + t) as f32]))
            .collect::<Vec<_>>();
        let engine = HornSchunckEngine::new(HornSchunckConfig {
            iterations: 3,
            ..Default::default()
        })?;

        let flows = compute_sequence_flow(&engine, &frames, &ComputeOptions::default())?;
        assert_eq!(flows.len(), 3);
        assert!(flows.iter().all(|f| f.size() == size));
        Ok(())
    }

    #[test]
    fn needs_two_frames() -> Result<(), FlowError> {
        let frames = vec![ScalarImage::from_size_val([4, 4].into(), 0.0)?];
        let engine = HornSchunckEngine::new(HornSchunckConfig::default())?;
        assert_eq!(
            compute_sequence_flow(&engine, &frames, &ComputeOptions::default()).err(),
            Some(FlowError::MissingInput("at least two frames"))
        );
        assert!(frames[..0].is_empty());
        Ok(())
    }
}
