//! Container decoding for the pipeline boundary.
//!
//! Turns file bytes in any format the `image` crate reads (JPEG, PNG, BMP,
//! TIFF, WebP) into a [`RasterImage`](crate::RasterImage). Images with an
//! alpha channel come out as RGBA, everything else as RGB.
//!
//! # Examples
//!
//! ```ignore
//! use photolift_core::decode::open;
//!
//! let raster = open("photo.jpg").unwrap();
//! println!("Decoded {}x{} image", raster.width(), raster.height());
//! ```

mod reader;
mod types;

pub use reader::{decode_image, is_supported_extension, open, SUPPORTED_EXTENSIONS};
pub use types::DecodeError;
