//! SVG export serializer.
//!
//! Converts wall segments and junction points into an SVG string using
//! the [`svg`] crate for document construction, XML escaping, and path
//! data formatting.
//!
//! Each segment becomes a green `<path>` element; each junction point
//! becomes a `<circle>` filled with its kind's review color (see
//! [`kind_color`]).
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use kabe_pipeline::{ClusterPoint, Dimensions, JunctionKind, LineSegment};

/// Junction marker radius in pixels.
const POINT_RADIUS: f64 = 3.0;
/// Stroke color for wall segments.
const SEGMENT_COLOR: &str = "green";

/// Metadata to embed in the SVG document.
///
/// All fields are optional.  When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.  These
/// are standard SVG accessibility elements and are surfaced by some file
/// managers and screen readers.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title — emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description — emitted as `<desc>`.
    ///
    /// Typically contains pipeline parameters and a timestamp so
    /// exported files are distinguishable.
    pub description: Option<&'a str>,

    /// Structured pipeline configuration JSON — emitted inside a
    /// `<metadata>` element wrapped in a namespaced `<kabe:pipeline>`
    /// element.
    ///
    /// When present, the full serialized `PipelineConfig` is embedded
    /// so exported files carry machine-parseable settings for
    /// reproducibility.  The human-readable `description` is retained
    /// separately.
    pub config_json: Option<&'a str>,
}

/// Review color for a junction kind, shared by the SVG and raster
/// overlays: endpoints blue, corners red, T-junctions green,
/// intersections orange.
#[must_use]
pub const fn kind_color(kind: JunctionKind) -> &'static str {
    match kind {
        JunctionKind::Endpoint => "blue",
        JunctionKind::Corner => "red",
        JunctionKind::TJunction => "green",
        JunctionKind::Intersection => "orange",
        JunctionKind::Unclassified => "gray",
    }
}

/// Build an SVG path `d` attribute string from a segment.
///
/// Returns an empty string for zero-length segments.
fn build_path_data(segment: &LineSegment) -> String {
    if segment.length() <= 0.0 {
        return String::new();
    }
    let data = Data::new()
        .move_to((segment.start.x, segment.start.y))
        .line_to((segment.end.x, segment.end.y));
    String::from(Value::from(data))
}

/// Serialize wall segments and junction points into an SVG document
/// string.
///
/// The `viewBox` is set from [`Dimensions`] so the SVG coordinate space
/// matches the source image pixel grid.  Zero-length segments are
/// skipped (they cannot form a visible line).  Points are emitted after
/// segments so the markers render on top.
///
/// If [`SvgMetadata::title`] or [`SvgMetadata::description`] is
/// provided, the corresponding `<title>` / `<desc>` element is emitted
/// after the opening `<svg>` tag.  If [`SvgMetadata::config_json`] is
/// provided, a `<metadata>` element is emitted containing the JSON
/// wrapped in a namespaced `<kabe:pipeline>` element.
///
/// # Examples
///
/// ```
/// use kabe_pipeline::{Dimensions, LineSegment, Point};
/// use kabe_export::{SvgMetadata, to_svg};
///
/// let segments = vec![
///     LineSegment::new(Point::new(10.0, 15.0), Point::new(40.0, 15.0)),
/// ];
/// let dims = Dimensions { width: 800, height: 600 };
/// let metadata = SvgMetadata {
///     title: Some("ground-floor"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&segments, &[], dims, &metadata);
/// assert!(svg.contains("<title>ground-floor</title>"));
/// assert!(svg.contains("M10,15 L40,15"));
/// ```
#[must_use]
pub fn to_svg(
    segments: &[LineSegment],
    points: &[ClusterPoint],
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    // Optional <title> element
    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    // Optional <desc> element
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    // Optional <metadata> element with structured pipeline config
    if let Some(config_json) = metadata.config_json {
        let mut pipeline_el = Element::new("kabe:pipeline");
        pipeline_el.assign("xmlns:kabe", "https://kabe.app/ns/1");
        pipeline_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(pipeline_el);
        doc = doc.add(metadata_el);
    }

    // One <path> per segment (skip zero-length segments).
    for segment in segments {
        let d = build_path_data(segment);
        if d.is_empty() {
            continue;
        }
        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", SEGMENT_COLOR)
            .set("stroke-width", 1);
        doc = doc.add(path);
    }

    // One <circle> per junction point, on top of the segments.
    for point in points {
        let circle = Circle::new()
            .set("cx", point.position.x)
            .set("cy", point.position.y)
            .set("r", POINT_RADIUS)
            .set("fill", kind_color(point.kind));
        doc = doc.add(circle);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kabe_pipeline::Point;

    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    /// Shorthand: no metadata (most tests don't care about it).
    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    fn point(x: f64, y: f64, kind: JunctionKind) -> ClusterPoint {
        ClusterPoint {
            position: Point::new(x, y),
            kind,
            member_count: 1,
        }
    }

    // --- Empty / degenerate inputs ---

    #[test]
    fn empty_input_produces_valid_svg_with_no_shapes() {
        let svg = to_svg(&[], &[], dims(100, 50), &no_meta());
        assert!(svg.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"width="100""#));
        assert!(svg.contains(r#"height="50""#));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn zero_length_segment_is_skipped() {
        let segments = vec![segment(5.0, 5.0, 5.0, 5.0)];
        let svg = to_svg(&segments, &[], dims(100, 100), &no_meta());
        assert!(!svg.contains("<path"));
    }

    // --- Basic output structure ---

    #[test]
    fn segment_becomes_green_path() {
        let segments = vec![segment(10.0, 20.0, 30.0, 40.0)];
        let svg = to_svg(&segments, &[], dims(800, 600), &no_meta());

        assert!(svg.contains(r#"viewBox="0 0 800 600""#));
        assert!(svg.contains(r#"d="M10,20 L30,40""#));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"stroke="green""#));
        assert!(svg.contains(r#"stroke-width="1""#));
    }

    #[test]
    fn multiple_segments_produce_multiple_paths() {
        let segments = vec![segment(1.0, 2.0, 3.0, 4.0), segment(5.0, 6.0, 7.0, 8.0)];
        let svg = to_svg(&segments, &[], dims(100, 100), &no_meta());

        let path_count = svg.matches("<path").count();
        assert_eq!(path_count, 2);
        assert!(svg.contains(r#"d="M1,2 L3,4""#));
        assert!(svg.contains(r#"d="M5,6 L7,8""#));
    }

    #[test]
    fn points_become_kind_colored_circles() {
        let points = vec![
            point(10.0, 10.0, JunctionKind::Endpoint),
            point(20.0, 20.0, JunctionKind::Corner),
            point(30.0, 30.0, JunctionKind::TJunction),
            point(40.0, 40.0, JunctionKind::Intersection),
        ];
        let svg = to_svg(&[], &points, dims(100, 100), &no_meta());

        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains(r#"fill="blue""#));
        assert!(svg.contains(r#"fill="red""#));
        assert!(svg.contains(r#"fill="green""#));
        assert!(svg.contains(r#"fill="orange""#));
        assert!(svg.contains(r#"r="3""#));
    }

    #[test]
    fn circles_render_after_paths() {
        let segments = vec![segment(0.0, 0.0, 50.0, 50.0)];
        let points = vec![point(25.0, 25.0, JunctionKind::Endpoint)];
        let svg = to_svg(&segments, &points, dims(100, 100), &no_meta());

        let path_pos = svg.find("<path").unwrap();
        let circle_pos = svg.find("<circle").unwrap();
        assert!(path_pos < circle_pos, "markers must render on top");
    }

    #[test]
    fn kind_colors_match_review_palette() {
        assert_eq!(kind_color(JunctionKind::Endpoint), "blue");
        assert_eq!(kind_color(JunctionKind::Corner), "red");
        assert_eq!(kind_color(JunctionKind::TJunction), "green");
        assert_eq!(kind_color(JunctionKind::Intersection), "orange");
        assert_eq!(kind_color(JunctionKind::Unclassified), "gray");
    }

    // --- SVG structure ---

    #[test]
    fn svg_has_xml_declaration_and_namespace() {
        let svg = to_svg(&[], &[], dims(100, 100), &no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn viewbox_reflects_dimensions() {
        let svg = to_svg(&[], &[], dims(1920, 1080), &no_meta());
        assert!(svg.contains(r#"width="1920""#));
        assert!(svg.contains(r#"height="1080""#));
        assert!(svg.contains(r#"viewBox="0 0 1920 1080""#));
    }

    // --- Metadata ---

    #[test]
    fn title_and_desc_emitted_when_present() {
        let meta = SvgMetadata {
            title: Some("ground-floor"),
            description: Some("threshold=100, inverse=true"),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&[], &[], dims(100, 100), &meta);
        assert!(svg.contains("<title>ground-floor</title>"));
        assert!(svg.contains("<desc>threshold=100, inverse=true</desc>"));
    }

    #[test]
    fn title_and_desc_omitted_when_none() {
        let svg = to_svg(&[], &[], dims(100, 100), &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
    }

    #[test]
    fn title_appears_before_shapes() {
        let segments = vec![segment(1.0, 2.0, 3.0, 4.0)];
        let meta = SvgMetadata {
            title: Some("test"),
            description: Some("desc"),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&segments, &[], dims(100, 100), &meta);

        let title_pos = svg.find("<title>").unwrap();
        let desc_pos = svg.find("<desc>").unwrap();
        let path_pos = svg.find("<path").unwrap();
        assert!(title_pos < desc_pos, "title should come before desc");
        assert!(desc_pos < path_pos, "desc should come before paths");
    }

    #[test]
    fn special_characters_in_title_are_escaped() {
        let meta = SvgMetadata {
            title: Some("A <B> & C"),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&[], &[], dims(100, 100), &meta);
        assert!(svg.contains("<title>A &lt;B&gt; &amp; C</title>"));
    }

    // --- Config JSON / <metadata> ---

    #[test]
    fn metadata_element_emitted_when_config_json_present() {
        let meta = SvgMetadata {
            config_json: Some(r#"{"merge_intersections":true}"#),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&[], &[], dims(100, 100), &meta);
        assert!(svg.contains("<metadata>"));
        assert!(svg.contains("</metadata>"));
        assert!(svg.contains(r#"<kabe:pipeline xmlns:kabe="https://kabe.app/ns/1">"#));
        assert!(svg.contains("</kabe:pipeline>"));
    }

    #[test]
    fn metadata_element_omitted_when_config_json_none() {
        let svg = to_svg(&[], &[], dims(100, 100), &no_meta());
        assert!(!svg.contains("<metadata>"));
    }

    #[test]
    fn config_json_special_characters_are_escaped() {
        let meta = SvgMetadata {
            config_json: Some(r#"{"note":"a < b & c > d"}"#),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&[], &[], dims(100, 100), &meta);
        // The svg crate escapes <, >, & in text content
        assert!(svg.contains("&lt;"));
        assert!(svg.contains("&amp;"));
        assert!(svg.contains("&gt;"));
    }

    #[test]
    fn full_pipeline_config_round_trips_through_metadata() {
        let config = kabe_pipeline::PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let meta = SvgMetadata {
            config_json: Some(&json),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&[], &[], dims(100, 100), &meta);
        assert!(svg.contains("<metadata>"));
        assert!(svg.contains("threshold"));
    }
}
