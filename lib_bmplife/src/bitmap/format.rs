use crate::grid::{Color, DimensionError, PixelGrid};

pub const MAGIC_HEADER: [u8; 2] = *b"BM";

pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 40;
/// Pixel data offset for the headers this format writes.
pub const PIXEL_DATA_OFFSET: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

pub const PLANES: u16 = 1;
pub const BITS_PER_PIXEL: u16 = 24;
pub const COMPRESSION_NONE: u32 = 0;
pub const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_resolution: i32,
    pub y_resolution: i32,
    pub colors_used: u32,
    pub important_colors: u32,
}

/// Zero bytes appended to each row so its length is a multiple of 4.
#[inline]
pub fn row_padding(width: usize) -> usize {
    (4 - (BYTES_PER_PIXEL * width) % 4) % 4
}

/// Bytes one row occupies on disk, padding included.
#[inline]
pub fn row_stride(width: usize) -> usize {
    BYTES_PER_PIXEL * width + row_padding(width)
}

/// Returns `(image data size, file size)` for the given dimensions.
pub fn data_sizes(width: usize, height: usize) -> Result<(u32, u32), DimensionError> {
    let too_large = DimensionError::TooLarge { width, height };
    let image_size = width
        .checked_mul(BYTES_PER_PIXEL)
        .and_then(|row| row.checked_add(row_padding(width)))
        .and_then(|stride| stride.checked_mul(height))
        .ok_or(too_large.clone())?;
    let file_size = image_size
        .checked_add(PIXEL_DATA_OFFSET)
        .ok_or(too_large.clone())?;

    match (u32::try_from(image_size), u32::try_from(file_size)) {
        (Ok(image_size), Ok(file_size)) => Ok((image_size, file_size)),
        _ => Err(too_large),
    }
}

/// Headers plus pixels.
///
/// `width()` and `height()` come from the pixel grid and are what the encoder
/// writes. The dimension and size fields inside the headers are a record of
/// what was read or created and are never consulted after that, so editing
/// them has no effect on the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub file_header: FileHeader,
    pub info_header: InfoHeader,
    pixels: PixelGrid,
}

impl Image {
    /// Builds fresh headers around a rendered pixel buffer.
    pub fn create(width: i32, height: i32, pixels: Vec<Color>) -> Result<Self, DimensionError> {
        if width <= 0 || height <= 0 {
            return Err(DimensionError::NonPositive {
                width: width.into(),
                height: height.into(),
            });
        }
        let grid = PixelGrid::new(width as usize, height as usize, pixels)?;
        Self::from_grid(grid)
    }

    pub fn from_grid(pixels: PixelGrid) -> Result<Self, DimensionError> {
        let (width, height) = (pixels.width(), pixels.height());
        let (image_size, file_size) = data_sizes(width, height)?;

        Ok(Self {
            file_header: FileHeader {
                magic: MAGIC_HEADER,
                file_size,
                reserved1: 0,
                reserved2: 0,
                pixel_offset: PIXEL_DATA_OFFSET as u32,
            },
            info_header: InfoHeader {
                header_size: INFO_HEADER_SIZE as u32,
                // data_sizes bounds both dimensions below u32::MAX / 3
                width: width as i32,
                height: height as i32,
                planes: PLANES,
                bits_per_pixel: BITS_PER_PIXEL,
                compression: COMPRESSION_NONE,
                image_size,
                x_resolution: 0,
                y_resolution: 0,
                colors_used: 0,
                important_colors: 0,
            },
            pixels,
        })
    }

    /// Used by the decoder once both headers have been validated.
    pub(crate) fn from_parts(
        file_header: FileHeader,
        info_header: InfoHeader,
        pixels: PixelGrid,
    ) -> Self {
        Self {
            file_header,
            info_header,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    /// Swaps in the next generation and hands back the previous one.
    pub(crate) fn swap_generation(&mut self, pixels: PixelGrid) -> PixelGrid {
        debug_assert_eq!((pixels.width(), pixels.height()), (self.width(), self.height()));
        std::mem::replace(&mut self.pixels, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_padding() {
        assert_eq!(row_padding(1), 1);
        assert_eq!(row_padding(2), 2);
        assert_eq!(row_padding(3), 3);
        assert_eq!(row_padding(4), 0);
        assert_eq!(row_padding(5), 1);
        assert_eq!(row_padding(8), 0);
        assert_eq!(row_stride(5), 16);
    }

    #[test]
    fn test_create_fills_headers() {
        let image = Image::create(3, 2, vec![Color::WHITE; 6]).unwrap();
        // 3 pixels * 3 bytes + 3 padding = 12 bytes per row
        assert_eq!(image.info_header.image_size, 24);
        assert_eq!(image.file_header.file_size, 54 + 24);
        assert_eq!(image.file_header.pixel_offset, 54);
        assert_eq!(image.file_header.magic, *b"BM");
        assert_eq!(image.info_header.header_size, 40);
        assert_eq!(image.info_header.bits_per_pixel, 24);
        assert_eq!(image.info_header.compression, 0);
        assert_eq!(image.info_header.planes, 1);
    }

    #[test]
    fn test_create_rejects_invalid_dimensions() {
        assert!(matches!(
            Image::create(0, 2, vec![]),
            Err(DimensionError::NonPositive { width: 0, height: 2 })
        ));
        assert!(matches!(
            Image::create(2, -1, vec![]),
            Err(DimensionError::NonPositive { width: 2, height: -1 })
        ));
        assert!(matches!(
            Image::create(2, 2, vec![Color::BLACK; 5]),
            Err(DimensionError::PixelCountMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_data_sizes_overflow() {
        assert!(data_sizes(1 << 16, 1 << 16).is_err());
    }

    #[test]
    fn test_swap_generation_returns_previous() {
        let mut image = Image::create(2, 2, vec![Color::WHITE; 4]).unwrap();
        let next = PixelGrid::filled(2, 2, Color::BLACK).unwrap();
        let previous = image.swap_generation(next);
        assert_eq!(previous.live_count(), 0);
        assert_eq!(image.pixels().live_count(), 4);
    }
}
