//! Annotated raster overlay.
//!
//! Renders the skeleton, the extracted wall segments, and the clustered
//! junction points into a single RGBA image for visual review: skeleton
//! pixels in white on black, segments in green, and a filled circle per
//! junction in its kind's color (the same palette as the SVG export, see
//! [`crate::svg::kind_color`]).
//!
//! Drawing uses [`imageproc`]; the result is an in-memory image the
//! caller can encode and write wherever it likes.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use kabe_pipeline::{ClusterPoint, JunctionKind, LineSegment, Mask};

/// Junction marker radius in pixels, matching the SVG export.
const POINT_RADIUS: i32 = 3;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SKELETON: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SEGMENT: Rgba<u8> = Rgba([0, 200, 0, 255]);

/// Marker fill for a junction kind.
const fn kind_rgba(kind: JunctionKind) -> Rgba<u8> {
    match kind {
        JunctionKind::Endpoint => Rgba([0, 0, 255, 255]),
        JunctionKind::Corner => Rgba([255, 0, 0, 255]),
        JunctionKind::TJunction => Rgba([0, 255, 0, 255]),
        JunctionKind::Intersection => Rgba([255, 165, 0, 255]),
        JunctionKind::Unclassified => Rgba([128, 128, 128, 255]),
    }
}

/// Render the skeleton with segment and junction overlays.
///
/// Layers bottom to top: white skeleton pixels, green segment lines,
/// kind-colored junction markers. The output has the skeleton's
/// dimensions.
#[must_use]
pub fn annotate(
    skeleton: &Mask,
    points: &[ClusterPoint],
    segments: &[LineSegment],
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(skeleton.width(), skeleton.height(), BACKGROUND);

    for y in 0..skeleton.height() {
        for x in 0..skeleton.width() {
            if skeleton.get(i64::from(x), i64::from(y)) {
                canvas.put_pixel(x, y, SKELETON);
            }
        }
    }

    for segment in segments {
        #[allow(clippy::cast_possible_truncation)]
        draw_line_segment_mut(
            &mut canvas,
            (segment.start.x as f32, segment.start.y as f32),
            (segment.end.x as f32, segment.end.y as f32),
            SEGMENT,
        );
    }

    for point in points {
        #[allow(clippy::cast_possible_truncation)]
        let center = (
            point.position.x.round() as i32,
            point.position.y.round() as i32,
        );
        draw_filled_circle_mut(&mut canvas, center, POINT_RADIUS, kind_rgba(point.kind));
    }

    canvas
}
