use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use varflow_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A rectangular block of pixel indices.
///
/// The `index` is the `[x, y]` index of the top left pixel and may be negative
/// or non zero, so regions of different images can be compared in a common
/// index space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRegion {
    /// Index `[x, y]` of the first pixel of the region.
    pub index: [isize; 2],
    /// Number of pixels along each axis.
    pub size: ImageSize,
}

impl std::fmt::Display for ImageRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}]+{}x{}",
            self.index[0], self.index[1], self.size.width, self.size.height
        )
    }
}

impl ImageRegion {
    /// Create a region from its start index and size.
    pub fn new(index: [isize; 2], size: ImageSize) -> Self {
        Self { index, size }
    }

    /// Create a region starting at index `[0, 0]`.
    pub fn from_size(size: ImageSize) -> Self {
        Self {
            index: [0, 0],
            size,
        }
    }

    /// One past the last index along each axis.
    pub fn end(&self) -> [isize; 2] {
        [
            self.index[0] + self.size.width as isize,
            self.index[1] + self.size.height as isize,
        ]
    }

    /// Number of pixels in the region.
    pub fn num_pixels(&self) -> usize {
        self.size.num_pixels()
    }

    /// Whether the region covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.num_pixels() == 0
    }

    /// Grow the region by `radius` pixels on every side.
    ///
    /// # Examples
    ///
    /// ```
    /// use varflow_image::{ImageRegion, ImageSize};
    ///
    /// let region = ImageRegion::from_size(ImageSize { width: 4, height: 3 });
    /// let padded = region.pad(1);
    ///
    /// assert_eq!(padded.index, [-1, -1]);
    /// assert_eq!(padded.size, ImageSize { width: 6, height: 5 });
    /// ```
    pub fn pad(&self, radius: usize) -> Self {
        let r = radius as isize;
        Self {
            index: [self.index[0] - r, self.index[1] - r],
            size: ImageSize {
                width: self.size.width + 2 * radius,
                height: self.size.height + 2 * radius,
            },
        }
    }

    /// Crop the region to fit inside `largest`.
    ///
    /// Returns `None` when the two regions do not overlap at all, so callers
    /// can tell a shrunk region apart from an unsatisfiable one.
    pub fn crop(&self, largest: &ImageRegion) -> Option<Self> {
        if self.is_empty() || largest.is_empty() {
            return None;
        }

        let (start, end) = (self.end(), largest.end());
        let x0 = self.index[0].max(largest.index[0]);
        let y0 = self.index[1].max(largest.index[1]);
        let x1 = start[0].min(end[0]);
        let y1 = start[1].min(end[1]);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(Self {
            index: [x0, y0],
            size: ImageSize {
                width: (x1 - x0) as usize,
                height: (y1 - y0) as usize,
            },
        })
    }

    /// Whether `other` lies completely inside this region.
    pub fn contains_region(&self, other: &ImageRegion) -> bool {
        let (end, other_end) = (self.end(), other.end());
        other.index[0] >= self.index[0]
            && other.index[1] >= self.index[1]
            && other_end[0] <= end[0]
            && other_end[1] <= end[1]
    }

    /// Whether the index `[x, y]` lies inside the region.
    pub fn contains_index(&self, x: isize, y: isize) -> bool {
        let end = self.end();
        x >= self.index[0] && x < end[0] && y >= self.index[1] && y < end[1]
    }
}

/// Physical placement of the pixel grid.
///
/// The `origin` is the physical position of index `[0, 0]`; a pixel with index
/// `[x, y]` sits at `origin + [x, y] * spacing`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Distance between pixel centres along `x` and `y`.
    pub spacing: [f32; 2],
    /// Physical position of index `[0, 0]`.
    pub origin: [f32; 2],
}

impl Default for ImageGeometry {
    fn default() -> Self {
        Self {
            spacing: [1.0, 1.0],
            origin: [0.0, 0.0],
        }
    }
}

impl ImageGeometry {
    /// Area covered by a single pixel.
    pub fn pixel_area(&self) -> f32 {
        self.spacing[0] * self.spacing[1]
    }

    /// Physical point of a continuous index.
    pub fn index_to_physical(&self, index: [f32; 2]) -> [f32; 2] {
        [
            self.origin[0] + index[0] * self.spacing[0],
            self.origin[1] + index[1] * self.spacing[1],
        ]
    }

    /// Continuous index of a physical point.
    pub fn physical_to_index(&self, point: [f32; 2]) -> [f32; 2] {
        [
            (point[0] - self.origin[0]) / self.spacing[0],
            (point[1] - self.origin[1]) / self.spacing[1],
        ]
    }

    fn validate(&self) -> Result<(), ImageError> {
        let [sx, sy] = self.spacing;
        if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
            return Err(ImageError::InvalidSpacing(sx, sy));
        }
        Ok(())
    }
}

/// Represents an image with pixel data.
///
/// The data is stored row major with interleaved channels, i.e. with shape
/// (H, W, C). The image also records the largest possible region it covers in
/// index space and its physical geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    data: Vec<T>,
    region: ImageRegion,
    geometry: ImageGeometry,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// The image starts at index `[0, 0]` with unit spacing and zero origin.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use varflow_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32, 2>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0f32; 10 * 20 * 2],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 2);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.width * size.height * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.width * size.height * CHANNELS,
            ));
        }

        Ok(Self {
            data,
            region: ImageRegion::from_size(size),
            geometry: ImageGeometry::default(),
        })
    }

    /// Create a new image with the given size and a constant pixel value.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * CHANNELS];
        Image::new(size, data)
    }

    /// Create an image by evaluating `f(x, y)` at every pixel.
    ///
    /// # Examples
    ///
    /// ```
    /// use varflow_image::{Image, ImageSize};
    ///
    /// let ramp = Image::<f32, 1>::from_fn(ImageSize { width: 3, height: 2 }, |x, _| {
    ///     [x as f32]
    /// });
    ///
    /// assert_eq!(ramp.as_slice(), &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
    /// ```
    pub fn from_fn(size: ImageSize, f: impl Fn(usize, usize) -> [T; CHANNELS]) -> Self {
        let mut data = Vec::with_capacity(size.num_pixels() * CHANNELS);
        for y in 0..size.height {
            for x in 0..size.width {
                data.extend(f(x, y));
            }
        }

        Self {
            data,
            region: ImageRegion::from_size(size),
            geometry: ImageGeometry::default(),
        }
    }

    /// Create a zero filled image sharing the region and geometry of `reference`.
    pub fn zeros_like<U, const C: usize>(reference: &Image<U, C>) -> Self
    where
        T: num_traits::Zero + Clone,
    {
        Self {
            data: vec![T::zero(); reference.size().num_pixels() * CHANNELS],
            region: reference.region,
            geometry: reference.geometry,
        }
    }

    /// Replace the index of the first pixel, keeping the size.
    pub fn with_index(mut self, index: [isize; 2]) -> Self {
        self.region.index = index;
        self
    }

    /// Replace the physical geometry of the image.
    ///
    /// # Errors
    ///
    /// If the spacing is not finite and strictly positive.
    pub fn with_geometry(mut self, geometry: ImageGeometry) -> Result<Self, ImageError> {
        geometry.validate()?;
        self.geometry = geometry;
        Ok(self)
    }

    /// Copy region and geometry metadata from another image of the same size.
    ///
    /// # Errors
    ///
    /// If the sizes of the two images differ.
    pub fn with_metadata_of<U, const C: usize>(
        mut self,
        other: &Image<U, C>,
    ) -> Result<Self, ImageError> {
        if self.size() != other.size() {
            return Err(ImageError::InvalidImageSize(
                other.width(),
                other.height(),
                self.width(),
                self.height(),
            ));
        }
        self.region = other.region;
        self.geometry = other.geometry;
        Ok(self)
    }

    /// The largest possible region of the image in index space.
    pub fn region(&self) -> ImageRegion {
        self.region
    }

    /// The physical geometry of the image.
    pub fn geometry(&self) -> ImageGeometry {
        self.geometry
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.region.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.region.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.region.size.height
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the pixel data of the image as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data of the image as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get the channels of the pixel at local coordinates `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinates lie outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Result<&[T], ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let offset = (y * self.width() + x) * CHANNELS;
        Ok(&self.data[offset..offset + CHANNELS])
    }

    /// Get the mutable channels of the pixel at local coordinates `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinates lie outside the image.
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Result<&mut [T], ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let offset = (y * self.width() + x) * CHANNELS;
        Ok(&mut self.data[offset..offset + CHANNELS])
    }

    /// Whether both images share region and geometry.
    pub fn same_grid<U, const C: usize>(&self, other: &Image<U, C>) -> bool {
        self.region == other.region && self.geometry == other.geometry
    }

    /// Copy out the pixels of `region`, given in the image index space.
    ///
    /// The returned image keeps the index of `region` and the physical origin
    /// of this image, so every pixel stays at the same physical position.
    ///
    /// # Errors
    ///
    /// If `region` is not inside the largest region of the image.
    pub fn crop(&self, region: &ImageRegion) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        if !self.region.contains_region(region) {
            return Err(ImageError::RegionOutOfBounds(*region, self.region));
        }

        let x0 = (region.index[0] - self.region.index[0]) as usize;
        let y0 = (region.index[1] - self.region.index[1]) as usize;
        let row_len = region.size.width * CHANNELS;

        let mut data = Vec::with_capacity(region.num_pixels() * CHANNELS);
        for y in y0..y0 + region.size.height {
            let offset = (y * self.width() + x0) * CHANNELS;
            data.extend_from_slice(&self.data[offset..offset + row_len]);
        }

        Ok(Self {
            data,
            region: *region,
            geometry: self.geometry,
        })
    }

    /// Physical point of the local continuous coordinate `(x, y)`.
    pub fn local_to_physical(&self, x: f32, y: f32) -> [f32; 2] {
        self.geometry.index_to_physical([
            x + self.region.index[0] as f32,
            y + self.region.index[1] as f32,
        ])
    }

    /// Local continuous coordinate of a physical point.
    pub fn physical_to_local(&self, point: [f32; 2]) -> [f32; 2] {
        let [ix, iy] = self.geometry.physical_to_index(point);
        [
            ix - self.region.index[0] as f32,
            iy - self.region.index[1] as f32,
        ]
    }
}
