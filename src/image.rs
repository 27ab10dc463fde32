use crate::layout::ImageSlice;
use crate::refs::{ObjectReferences, RefType};
use image::{DynamicImage, GenericImageView};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};

/// The pixels behind a PDF image
#[derive(Debug, Clone)]
pub enum ImageData {
    /// An RGB JPEG file, embedded byte for byte
    Jpeg(Vec<u8>),
    /// Decoded pixels, stored losslessly
    Pixels(DynamicImage),
}

/// An image to be embedded in the document. Pixels are written as deflated
/// 8-bit RGB with a separate greyscale soft mask when there is any
/// transparency, so cutting an image into slices never costs quality.
#[derive(Debug, Clone)]
pub struct Image {
    pub data: ImageData,
    pub width: u32,
    pub height: u32,
}

struct EncodeOutput {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl Image {
    pub fn from_pixels(pixels: DynamicImage) -> Image {
        Image {
            width: pixels.width(),
            height: pixels.height(),
            data: ImageData::Pixels(pixels),
        }
    }

    /// Wrap the raw bytes of a JPEG whose colour type is 8-bit RGB
    pub fn from_jpeg(bytes: Vec<u8>, width: u32, height: u32) -> Image {
        Image {
            data: ImageData::Jpeg(bytes),
            width,
            height,
        }
    }

    pub fn from_slice(slice: ImageSlice) -> Image {
        Image::from_pixels(slice.pixels)
    }

    fn encode(&self) -> EncodeOutput {
        match &self.data {
            ImageData::Jpeg(bytes) => EncodeOutput {
                filter: Filter::DctDecode,
                bytes: bytes.clone(),
                mask: None,
            },
            ImageData::Pixels(pixels) => {
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = pixels.color().has_alpha().then(|| pixels.to_rgba8()).and_then(|rgba| {
                    let alphas: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                    // fully opaque images don't need a mask
                    alphas
                        .iter()
                        .any(|&a| a != u8::MAX)
                        .then(|| compress_to_vec_zlib(&alphas, level))
                });

                EncodeOutput {
                    filter: Filter::FlateDecode,
                    bytes: compress_to_vec_zlib(pixels.to_rgb8().as_raw(), level),
                    mask,
                }
            }
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, image_index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Image(image_index));
        let encoded = self.encode();

        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}
