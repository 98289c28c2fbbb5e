//! kabe-export: Pure format serializers (sans-IO)
//!
//! Converts pipeline output (junction points and wall segments) into
//! review artifacts. Currently supports SVG documents and annotated
//! raster overlays. Future formats: DXF, GeoJSON.

pub mod annotate;
pub mod svg;

pub use annotate::annotate;
pub use svg::{SvgMetadata, kind_color, to_svg};
