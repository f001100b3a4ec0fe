use std::fs;
use std::io;
use std::path::Path;

use log::{debug, error, info, warn};
use thiserror::Error;

use super::format::{
    data_sizes, row_padding, FileHeader, Image, InfoHeader, BITS_PER_PIXEL, BYTES_PER_PIXEL,
    COMPRESSION_NONE, FILE_HEADER_SIZE, INFO_HEADER_SIZE, MAGIC_HEADER, PIXEL_DATA_OFFSET, PLANES,
};
use crate::grid::{Color, DimensionError, PixelGrid};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Truncated input: needed {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("Invalid magic number {0:?}, expected \"BM\"")]
    InvalidMagic([u8; 2]),
    #[error("Unsupported info header: {header_size} bytes, {planes} planes")]
    UnsupportedHeader { header_size: u32, planes: u16 },
    #[error(
        "Unsupported bitmap variant: {bits_per_pixel} bits per pixel, compression {compression}"
    )]
    UnsupportedFormat { bits_per_pixel: u16, compression: u32 },
    #[error("Pixel data offset {0} points inside the headers")]
    InvalidPixelOffset(u32),
    #[error("Invalid image dimensions")]
    InvalidDimensions(#[from] DimensionError),
    #[error("Failed to read bitmap file")]
    Io(#[from] io::Error),
}

/// Little-endian field reader over the raw file bytes.
struct FieldReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.cursor + N;
        let bytes: [u8; N] = self
            .data
            .get(self.cursor..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(DecodeError::Truncated {
                needed: end,
                available: self.data.len(),
            })?;
        self.cursor = end;
        Ok(bytes)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        self.take().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        self.take().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        self.take().map(i32::from_le_bytes)
    }
}

fn read_file_header(reader: &mut FieldReader) -> Result<FileHeader, DecodeError> {
    Ok(FileHeader {
        magic: reader.take()?,
        file_size: reader.u32()?,
        reserved1: reader.u16()?,
        reserved2: reader.u16()?,
        pixel_offset: reader.u32()?,
    })
}

fn read_info_header(reader: &mut FieldReader) -> Result<InfoHeader, DecodeError> {
    Ok(InfoHeader {
        header_size: reader.u32()?,
        width: reader.i32()?,
        height: reader.i32()?,
        planes: reader.u16()?,
        bits_per_pixel: reader.u16()?,
        compression: reader.u32()?,
        image_size: reader.u32()?,
        x_resolution: reader.i32()?,
        y_resolution: reader.i32()?,
        colors_used: reader.u32()?,
        important_colors: reader.u32()?,
    })
}

pub fn decode(data: &[u8]) -> Result<Image, DecodeError> {
    info!("Starting decoding of {} bytes", data.len());

    if data.len() < PIXEL_DATA_OFFSET {
        error!("Input too short for bitmap headers");
        return Err(DecodeError::Truncated {
            needed: PIXEL_DATA_OFFSET,
            available: data.len(),
        });
    }

    let mut reader = FieldReader::new(data);
    let file_header = read_file_header(&mut reader)?;
    if file_header.magic != MAGIC_HEADER {
        error!("Invalid magic number {:?}", file_header.magic);
        return Err(DecodeError::InvalidMagic(file_header.magic));
    }
    debug!("File header: {:?}", file_header);

    let info_header = read_info_header(&mut reader)?;
    debug!("Info header: {:?}", info_header);

    if (info_header.header_size as usize) < INFO_HEADER_SIZE || info_header.planes != PLANES {
        error!(
            "Unsupported info header: {} bytes, {} planes",
            info_header.header_size, info_header.planes
        );
        return Err(DecodeError::UnsupportedHeader {
            header_size: info_header.header_size,
            planes: info_header.planes,
        });
    }

    if info_header.bits_per_pixel != BITS_PER_PIXEL
        || info_header.compression != COMPRESSION_NONE
    {
        error!(
            "Unsupported variant: {} bpp, compression {}",
            info_header.bits_per_pixel, info_header.compression
        );
        return Err(DecodeError::UnsupportedFormat {
            bits_per_pixel: info_header.bits_per_pixel,
            compression: info_header.compression,
        });
    }

    if info_header.width <= 0 || info_header.height <= 0 {
        error!(
            "Non-positive dimensions {}x{}",
            info_header.width, info_header.height
        );
        return Err(DimensionError::NonPositive {
            width: info_header.width.into(),
            height: info_header.height.into(),
        }
        .into());
    }
    let width = info_header.width as usize;
    let height = info_header.height as usize;
    let (image_size, _) = data_sizes(width, height)?;

    let offset = file_header.pixel_offset as usize;
    if offset < FILE_HEADER_SIZE + info_header.header_size as usize {
        error!("Pixel data offset {} overlaps the headers", offset);
        return Err(DecodeError::InvalidPixelOffset(file_header.pixel_offset));
    }

    // An image size of 0 is legal for uncompressed bitmaps and means "derive it".
    let computed = offset + image_size as usize;
    let declared_pixels = match info_header.image_size {
        0 => computed,
        declared => offset + declared as usize,
    };
    let needed = computed
        .max(declared_pixels)
        .max(file_header.file_size as usize);
    if data.len() < needed {
        error!(
            "Truncated input: header declares {} bytes, got {}",
            needed,
            data.len()
        );
        return Err(DecodeError::Truncated {
            needed,
            available: data.len(),
        });
    }
    if data.len() > needed {
        warn!(
            "Ignoring {} trailing bytes after the pixel data",
            data.len() - needed
        );
    }

    let padding = row_padding(width);
    debug!("Reading {}x{} pixels, {} padding bytes per row", width, height, padding);

    let mut pixels = Vec::with_capacity(width * height);
    let mut cursor = offset;
    for _ in 0..height {
        for _ in 0..width {
            let bgr = [data[cursor], data[cursor + 1], data[cursor + 2]];
            pixels.push(Color::from_bgr(bgr));
            cursor += BYTES_PER_PIXEL;
        }
        cursor += padding;
    }

    let grid = PixelGrid::new(width, height, pixels)?;
    info!("Decoding successful");
    Ok(Image::from_parts(file_header, info_header, grid))
}

pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Image, DecodeError> {
    let path = path.as_ref();
    let buffer = fs::read(path).map_err(|err| {
        error!("Failed to read {}: {}", path.display(), err);
        err
    })?;
    debug!("Read {} bytes from {}", buffer.len(), path.display());
    decode(&buffer)
}
