//! Lossless output encoding.
//!
//! Enhanced rasters are always written as PNG with the strongest compression,
//! keeping alpha when the raster has it.
//!
//! # Examples
//!
//! ```ignore
//! use photolift_core::encode::{encode_png, enhanced_file_name};
//!
//! let bytes = encode_png(&raster).unwrap();
//! std::fs::write(out_dir.join(enhanced_file_name("photo.jpg")), bytes).unwrap();
//! ```

mod png;

pub use png::{encode_png, enhanced_file_name, EncodeError};
