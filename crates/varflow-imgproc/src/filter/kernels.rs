/// Order of a gaussian derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    /// Plain gaussian smoothing.
    Zero,
    /// First derivative of the gaussian.
    First,
    /// Second derivative of the gaussian.
    Second,
}

/// Half width of the gaussian kernel used for `sigma`.
pub fn gaussian_kernel_radius(sigma: f32) -> usize {
    if sigma <= 0.0 {
        return 1;
    }
    ((3.0 * sigma).ceil() as usize).max(1)
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create a sampled gaussian derivative kernel.
///
/// The kernel is applied as a correlation, `out(x) = sum_i k[i] * in(x + i - r)`,
/// and is normalized so that it is exact on polynomials of its order: the zero
/// order kernel sums to one, the first order kernel maps `x` to `1` and the
/// second order kernel maps `x^2` to `2`.
///
/// A `sigma` of zero degenerates to the central finite differences
/// `[1]`, `[-0.5, 0, 0.5]` and `[1, -2, 1]`.
///
/// # Examples
///
/// ```
/// use varflow_imgproc::filter::kernels::{gaussian_derivative_kernel_1d, DerivativeOrder};
///
/// let kernel = gaussian_derivative_kernel_1d(0.0, DerivativeOrder::First);
/// assert_eq!(kernel, vec![-0.5, 0.0, 0.5]);
/// ```
pub fn gaussian_derivative_kernel_1d(sigma: f32, order: DerivativeOrder) -> Vec<f32> {
    if sigma <= 0.0 {
        return match order {
            DerivativeOrder::Zero => vec![1.0],
            DerivativeOrder::First => vec![-0.5, 0.0, 0.5],
            DerivativeOrder::Second => vec![1.0, -2.0, 1.0],
        };
    }

    let radius = gaussian_kernel_radius(sigma);
    let kernel_size = 2 * radius + 1;
    let gaussian = gaussian_kernel_1d(kernel_size, sigma);
    let offsets = (0..kernel_size)
        .map(|i| i as f32 - radius as f32)
        .collect::<Vec<_>>();

    match order {
        DerivativeOrder::Zero => gaussian,
        DerivativeOrder::First => {
            let mut kernel = gaussian
                .iter()
                .zip(offsets.iter())
                .map(|(&g, &x)| x * g)
                .collect::<Vec<_>>();
            let norm = kernel
                .iter()
                .zip(offsets.iter())
                .map(|(&k, &x)| k * x)
                .sum::<f32>();
            kernel.iter_mut().for_each(|k| *k /= norm);
            kernel
        }
        DerivativeOrder::Second => {
            let sigma_sq = sigma * sigma;
            let mut kernel = gaussian
                .iter()
                .zip(offsets.iter())
                .map(|(&g, &x)| (x * x / sigma_sq - 1.0) * g)
                .collect::<Vec<_>>();

            // remove the dc component introduced by the truncation
            let mean = kernel.iter().sum::<f32>() / kernel_size as f32;
            kernel.iter_mut().for_each(|k| *k -= mean);

            let norm = kernel
                .iter()
                .zip(offsets.iter())
                .map(|(&k, &x)| k * x * x)
                .sum::<f32>()
                / 2.0;
            kernel.iter_mut().for_each(|k| *k /= norm);
            kernel
        }
    }
}
