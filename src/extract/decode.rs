//! Decoding of embedded image XObjects into bitmaps.
//!
//! JPEG streams go through the `image` crate as-is. Everything else arrives
//! here as unfiltered samples and is unpacked according to the XObject's
//! color space and bit depth.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};

/// Color space of an image XObject, resolved to what the decoder needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    /// Palette lookup into a base space; `hival` is the highest valid index.
    Indexed {
        base: Box<ColorSpace>,
        hival: u8,
        lookup: Vec<u8>,
    },
    Unsupported(String),
}

impl ColorSpace {
    /// Samples per pixel in the stream data.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::Gray | ColorSpace::Indexed { .. } | ColorSpace::Unsupported(_) => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

/// How the bytes in [`EmbeddedImage::data`] are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEncoding {
    /// Unfiltered samples, row-padded to whole bytes
    Raw,
    /// A complete JPEG file (DCTDecode)
    Jpeg,
    /// A filter we do not decode (JPXDecode, JBIG2Decode, ...)
    Unsupported(String),
}

/// An image XObject as read from the document, not yet decoded.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Resource name on the page (e.g. "Im0")
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub color_space: ColorSpace,
    /// Stencil mask: one bit per pixel, no color space
    pub image_mask: bool,
    pub encoding: SampleEncoding,
    pub data: Vec<u8>,
}

/// Decode an embedded image into a bitmap.
pub fn decode_image(img: &EmbeddedImage) -> Result<DynamicImage> {
    match &img.encoding {
        SampleEncoding::Jpeg => {
            let decoded = image::load_from_memory_with_format(&img.data, ImageFormat::Jpeg)?;
            Ok(decoded)
        }
        SampleEncoding::Unsupported(filter) => {
            Err(Error::UnsupportedImage(format!("{} filter", filter)))
        }
        SampleEncoding::Raw => decode_raw(img),
    }
}

fn decode_raw(img: &EmbeddedImage) -> Result<DynamicImage> {
    if img.width == 0 || img.height == 0 {
        return Err(Error::ImageDecode(format!(
            "{}: empty image {}x{}",
            img.name, img.width, img.height
        )));
    }

    if img.image_mask {
        let samples = unpack_samples(&img.data, img.width, img.height, 1, 1)?;
        return gray_image(img, scale_samples(samples, 1));
    }

    let bpc = img.bits_per_component;
    match &img.color_space {
        ColorSpace::Indexed {
            base,
            hival,
            lookup,
        } => {
            let indices = unpack_samples(&img.data, img.width, img.height, 1, bpc)?;
            let base_components = base.components();
            let mut pixels = Vec::with_capacity(indices.len() * base_components);
            for index in indices {
                let index = index.min(*hival) as usize;
                let start = index * base_components;
                match lookup.get(start..start + base_components) {
                    Some(entry) => pixels.extend_from_slice(entry),
                    None => pixels.extend(std::iter::repeat(0).take(base_components)),
                }
            }
            build_image(img, base, pixels)
        }
        ColorSpace::Unsupported(name) => {
            Err(Error::UnsupportedImage(format!("{} color space", name)))
        }
        space => {
            let samples = unpack_samples(&img.data, img.width, img.height, space.components(), bpc)?;
            build_image(img, space, scale_samples(samples, bpc))
        }
    }
}

/// Turn 8-bit samples in `space` into a bitmap.
fn build_image(img: &EmbeddedImage, space: &ColorSpace, pixels: Vec<u8>) -> Result<DynamicImage> {
    match space {
        ColorSpace::Gray => gray_image(img, pixels),
        ColorSpace::Rgb => RgbImage::from_raw(img.width, img.height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| short_buffer(img)),
        ColorSpace::Cmyk => {
            let rgb: Vec<u8> = pixels.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
            RgbImage::from_raw(img.width, img.height, rgb)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| short_buffer(img))
        }
        ColorSpace::Indexed { .. } => Err(Error::UnsupportedImage(
            "indexed base color space".to_string(),
        )),
        ColorSpace::Unsupported(name) => {
            Err(Error::UnsupportedImage(format!("{} color space", name)))
        }
    }
}

fn gray_image(img: &EmbeddedImage, pixels: Vec<u8>) -> Result<DynamicImage> {
    GrayImage::from_raw(img.width, img.height, pixels)
        .map(DynamicImage::ImageLuma8)
        .ok_or_else(|| short_buffer(img))
}

fn short_buffer(img: &EmbeddedImage) -> Error {
    Error::ImageDecode(format!(
        "{}: sample buffer does not match {}x{}",
        img.name, img.width, img.height
    ))
}

fn cmyk_to_rgb(px: &[u8]) -> [u8; 3] {
    let k = 255 - px[3] as u16;
    let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
    [channel(px[0]), channel(px[1]), channel(px[2])]
}

/// Read raw sample values. Rows are padded to a byte boundary. For 16-bit
/// samples only the high byte is kept.
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bpc: u8,
) -> Result<Vec<u8>> {
    if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::UnsupportedImage(format!(
            "{} bits per component",
            bpc
        )));
    }

    let too_large = || Error::ImageDecode(format!("image too large: {}x{}", width, height));
    let samples_per_row = (width as usize)
        .checked_mul(components)
        .ok_or_else(too_large)?;
    let row_bytes = samples_per_row
        .checked_mul(bpc as usize)
        .and_then(|bits| bits.checked_add(7))
        .ok_or_else(too_large)?
        / 8;
    let needed = row_bytes
        .checked_mul(height as usize)
        .ok_or_else(too_large)?;
    if data.len() < needed {
        return Err(Error::ImageDecode(format!(
            "truncated image data: expected {} bytes, found {}",
            needed,
            data.len()
        )));
    }

    let mut out = Vec::with_capacity(samples_per_row * height as usize);
    for row in data[..needed].chunks_exact(row_bytes) {
        match bpc {
            8 => out.extend_from_slice(row),
            16 => out.extend(row.chunks_exact(2).map(|pair| pair[0])),
            _ => {
                let per_byte = 8 / bpc as usize;
                let mask = (1u8 << bpc) - 1;
                out.extend(
                    (0..samples_per_row).map(|i| {
                        let byte = row[i / per_byte];
                        let shift = 8 - bpc as usize * (i % per_byte + 1);
                        (byte >> shift) & mask
                    }),
                );
            }
        }
    }
    Ok(out)
}

/// Stretch sub-byte samples to the 0..=255 range.
fn scale_samples(mut samples: Vec<u8>, bpc: u8) -> Vec<u8> {
    if bpc < 8 {
        let max = (1u16 << bpc) - 1;
        for s in samples.iter_mut() {
            *s = (*s as u16 * 255 / max) as u8;
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn raw(width: u32, height: u32, bpc: u8, color_space: ColorSpace, data: Vec<u8>) -> EmbeddedImage {
        EmbeddedImage {
            name: "Im0".to_string(),
            width,
            height,
            bits_per_component: bpc,
            color_space,
            image_mask: false,
            encoding: SampleEncoding::Raw,
            data,
        }
    }

    #[test]
    fn test_decode_rgb() {
        let img = raw(2, 1, 8, ColorSpace::Rgb, vec![255, 0, 0, 0, 0, 255]);
        let decoded = decode_image(&img).unwrap();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.to_rgb8().get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_decode_one_bit_gray_with_row_padding() {
        // 3 pixels per row pad to one byte: rows 101xxxxx and 010xxxxx.
        let img = raw(3, 2, 1, ColorSpace::Gray, vec![0b1010_0000, 0b0100_0000]);
        let gray = decode_image(&img).unwrap().to_luma8();
        assert_eq!(gray.as_raw(), &vec![255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn test_decode_indexed() {
        let space = ColorSpace::Indexed {
            base: Box::new(ColorSpace::Rgb),
            hival: 1,
            lookup: vec![10, 20, 30, 40, 50, 60],
        };
        let img = raw(2, 1, 8, space, vec![1, 0]);
        let rgb = decode_image(&img).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [40, 50, 60]);
        assert_eq!(rgb.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_cmyk() {
        let img = raw(1, 1, 8, ColorSpace::Cmyk, vec![0, 0, 0, 255]);
        let rgb = decode_image(&img).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 0]);

        let img = raw(1, 1, 8, ColorSpace::Cmyk, vec![255, 0, 0, 0]);
        let rgb = decode_image(&img).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 255]);
    }

    #[test]
    fn test_truncated_data_is_an_error() {
        let img = raw(4, 4, 8, ColorSpace::Rgb, vec![0; 10]);
        assert!(matches!(decode_image(&img), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn test_huge_dimensions_are_an_error() {
        let img = raw(u32::MAX, u32::MAX, 16, ColorSpace::Cmyk, vec![0; 64]);
        assert!(matches!(decode_image(&img), Err(Error::ImageDecode(_))));

        let mask = EmbeddedImage {
            image_mask: true,
            ..raw(u32::MAX, u32::MAX, 1, ColorSpace::Gray, vec![0; 64])
        };
        assert!(matches!(decode_image(&mask), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn test_unsupported_filter() {
        let mut img = raw(1, 1, 8, ColorSpace::Rgb, vec![0; 3]);
        img.encoding = SampleEncoding::Unsupported("JPXDecode".to_string());
        assert!(matches!(decode_image(&img), Err(Error::UnsupportedImage(_))));
    }

    #[test]
    fn test_image_mask() {
        let mut img = raw(8, 1, 1, ColorSpace::Gray, vec![0b1111_0000]);
        img.image_mask = true;
        img.bits_per_component = 8;
        let gray = decode_image(&img).unwrap().to_luma8();
        assert_eq!(gray.get_pixel(0, 0).0, [255]);
        assert_eq!(gray.get_pixel(7, 0).0, [0]);
    }
}
