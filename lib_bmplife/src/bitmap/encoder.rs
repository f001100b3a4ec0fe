use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, error, info};
use thiserror::Error;

use super::format::{
    data_sizes, row_padding, Image, BITS_PER_PIXEL, COMPRESSION_NONE, INFO_HEADER_SIZE,
    PIXEL_DATA_OFFSET, PLANES,
};
use crate::grid::DimensionError;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Image does not fit the bitmap size fields")]
    TooLarge(#[from] DimensionError),
    #[error("Failed to write bitmap file")]
    Io(#[from] io::Error),
}

/// Serializes an image. Size fields and the pixel offset are recomputed,
/// reserved and resolution fields are carried over from the headers.
pub fn encode(image: &Image) -> Result<Vec<u8>, EncodeError> {
    info!("Starting encoding");

    let (width, height) = (image.width(), image.height());
    let (image_size, file_size) = data_sizes(width, height)?;
    let padding = row_padding(width);
    let file_header = &image.file_header;
    let info_header = &image.info_header;

    let mut encoded_data: Vec<u8> = Vec::with_capacity(file_size as usize);

    // File header
    encoded_data.extend_from_slice(&file_header.magic);
    encoded_data.extend_from_slice(&file_size.to_le_bytes());
    encoded_data.extend_from_slice(&file_header.reserved1.to_le_bytes());
    encoded_data.extend_from_slice(&file_header.reserved2.to_le_bytes());
    encoded_data.extend_from_slice(&(PIXEL_DATA_OFFSET as u32).to_le_bytes());

    // Info header
    encoded_data.extend_from_slice(&(INFO_HEADER_SIZE as u32).to_le_bytes());
    encoded_data.extend_from_slice(&(width as i32).to_le_bytes());
    encoded_data.extend_from_slice(&(height as i32).to_le_bytes());
    encoded_data.extend_from_slice(&PLANES.to_le_bytes());
    encoded_data.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
    encoded_data.extend_from_slice(&COMPRESSION_NONE.to_le_bytes());
    encoded_data.extend_from_slice(&image_size.to_le_bytes());
    encoded_data.extend_from_slice(&info_header.x_resolution.to_le_bytes());
    encoded_data.extend_from_slice(&info_header.y_resolution.to_le_bytes());
    encoded_data.extend_from_slice(&0u32.to_le_bytes()); // palette colors
    encoded_data.extend_from_slice(&0u32.to_le_bytes()); // important colors
    debug!(
        "Headers written: {}x{}, file size {}, image size {}",
        width, height, file_size, image_size
    );

    for row in image.pixels().rows() {
        for pixel in row {
            encoded_data.extend_from_slice(&pixel.to_bgr());
        }
        encoded_data.extend(std::iter::repeat(0u8).take(padding));
    }
    debug!("Pixel rows written with {} padding bytes each", padding);

    info!("Encoding completed: {} bytes", encoded_data.len());
    Ok(encoded_data)
}

pub fn encode_file<P: AsRef<Path>>(image: &Image, path: P) -> Result<(), EncodeError> {
    let path = path.as_ref();
    let encoded_data = encode(image)?;

    let write = || -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&encoded_data)?;
        file.flush()
    };
    write().map_err(|err| {
        error!("Failed to write {}: {}", path.display(), err);
        EncodeError::Io(err)
    })?;

    debug!("Wrote {} bytes to {}", encoded_data.len(), path.display());
    Ok(())
}
