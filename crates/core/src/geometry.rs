//! Card layout geometry and width normalization.
//!
//! A [`Layout`] is the coordinate design of a printed PAD card at its native
//! resolution: lane polygons, fiducial groups, the QR code quadrilateral and
//! the swipe line. Viewers receive card images capped at a display width, so
//! every coordinate has to be re-expressed in that pixel space before it is
//! handed out. Scaling never changes the shape of the layout, only the
//! numeric values stored under `x` and `y` keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Named constants
-------------------------------------------------------------------------- */

/// Largest target width accepted by [`Layout::scale_to_width`].
pub const MAX_TARGET_WIDTH: u32 = 7680;

/// Layout keys whose numeric values are coordinates.
const COORDINATE_KEYS: &[&str] = &["x", "y"];

// Reference v2 card design (pixels).
const CARD_WIDTH: i64 = 730;
const CARD_HEIGHT: i64 = 1220;
const LANE_COUNT: i64 = 12;
const FIRST_LANE_LEFT: i64 = 17;
const LANE_WIDTH: i64 = 53;
const LANE_TOP: i64 = 359;
const LANE_BOTTOM: i64 = 1095;
const SWIPE_LINE_Y: i64 = 620;

/* --------------------------------------------------------------------------
Layout tree
-------------------------------------------------------------------------- */

/// One node of a layout tree.
///
/// Maps keep their insertion order so a scaled layout serializes with the
/// same key order as the design it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Node>),
    Map(IndexMap<String, Node>),
}

impl Node {
    /// Build a map node from `(key, value)` pairs, preserving their order.
    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Node)>) -> Self {
        Node::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    /// Look up a key on a map node. Returns `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Numeric value of an integer or float leaf.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Int(value) => Some(*value as f64),
            Node::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

/* --------------------------------------------------------------------------
Scaling
-------------------------------------------------------------------------- */

/// Round half up: `floor(value + 0.5)`.
///
/// Scaled coordinates are wire-visible, so this must not be replaced by
/// `f64::round` (half away from zero) or banker's rounding.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Rescale every numeric `x`/`y` value in `node` by `factor`.
///
/// Containers are rebuilt with the same keys and lengths; every other leaf is
/// copied unchanged. A non-numeric value under `x`/`y` is copied as-is.
/// A factor of exactly `1.0` returns a clone of the input, which keeps float
/// coordinates untouched.
pub fn scale(node: &Node, factor: f64) -> Node {
    if factor == 1.0 {
        return node.clone();
    }
    scale_node(node, factor)
}

fn scale_node(node: &Node, factor: f64) -> Node {
    match node {
        Node::Map(entries) => Node::Map(
            entries
                .iter()
                .map(|(key, value)| {
                    let scaled = if COORDINATE_KEYS.contains(&key.as_str()) {
                        scale_coordinate(value, factor)
                    } else {
                        scale_node(value, factor)
                    };
                    (key.clone(), scaled)
                })
                .collect(),
        ),
        Node::List(items) => Node::List(items.iter().map(|item| scale_node(item, factor)).collect()),
        Node::Null | Node::Bool(_) | Node::Int(_) | Node::Float(_) | Node::Text(_) => node.clone(),
    }
}

fn scale_coordinate(value: &Node, factor: f64) -> Node {
    match value.as_f64() {
        Some(v) => Node::Int(round_half_up(v * factor)),
        None => value.clone(),
    }
}

/* --------------------------------------------------------------------------
Layout
-------------------------------------------------------------------------- */

/// A card layout together with its declared card width.
///
/// The width is read from `card_size.x` and is the reference against which
/// target widths are turned into scale factors.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    root: Node,
    card_width: f64,
}

impl Layout {
    /// Wrap a layout tree. The tree must declare a positive numeric
    /// `card_size.x`.
    pub fn new(root: Node) -> Result<Self, CoreError> {
        let card_width = declared_card_width(&root).ok_or_else(|| {
            CoreError::Validation("Layout must declare a numeric card_size.x".to_string())
        })?;
        if card_width <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Layout card width must be positive (got {card_width})"
            )));
        }
        Ok(Self { root, card_width })
    }

    /// Parse a layout from JSON text (e.g. a design file on disk).
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let root: Node = serde_json::from_str(text)
            .map_err(|e| CoreError::Validation(format!("Invalid layout JSON: {e}")))?;
        Self::new(root)
    }

    /// The v2 reference card design, 730 x 1220 pixels, twelve lanes `A`-`L`.
    pub fn reference() -> Self {
        let lane_boxes = (0..LANE_COUNT)
            .map(|index| {
                let left = FIRST_LANE_LEFT + index * LANE_WIDTH;
                let right = left + LANE_WIDTH;
                let label = char::from(b'A' + index as u8).to_string();
                let polygon = points(&[
                    (left, LANE_TOP),
                    (left, LANE_BOTTOM),
                    (right, LANE_BOTTOM),
                    (right, LANE_TOP),
                ]);
                Node::Map(IndexMap::from([(label, polygon)]))
            })
            .collect();

        let root = Node::map([
            ("units", "pixels".into()),
            ("id", "padproject.nd.edu/?t=".into()),
            ("date", "11/13/19".into()),
            ("version", "2.0".into()),
            ("card_size", point(CARD_WIDTH, CARD_HEIGHT)),
            ("active_area", points(&[(71, 359), (707, 849)])),
            ("lane_number", Node::Int(LANE_COUNT)),
            ("lane_boxes", Node::List(lane_boxes)),
            ("outer_fiducials", points(&[(85, 1163), (686, 1163), (686, 77)])),
            ("qr_fiducials", points(&[(82, 64), (82, 237), (255, 64)])),
            ("wax_fiducials", points(&[(387, 214), (387, 1164)])),
            (
                "edges_of_qr_code",
                points(&[(54, 37), (54, 269), (286, 269), (286, 37)]),
            ),
            ("swipe_line", Node::map([("y", Node::Int(SWIPE_LINE_Y))])),
        ]);

        Self {
            root,
            card_width: CARD_WIDTH as f64,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Declared card width in the layout's native unit.
    pub fn card_width(&self) -> f64 {
        self.card_width
    }

    /// Design version label, when the layout declares one.
    pub fn version(&self) -> Option<&str> {
        self.root.get("version").and_then(Node::as_str)
    }

    /// Number of lane polygons in `lane_boxes`.
    pub fn lane_count(&self) -> usize {
        match self.root.get("lane_boxes") {
            Some(Node::List(lanes)) => lanes.len(),
            _ => 0,
        }
    }

    /// Scale the whole layout by `factor`, producing a new layout.
    pub fn scale(&self, factor: f64) -> Layout {
        let root = scale(&self.root, factor);
        let card_width = declared_card_width(&root).unwrap_or(0.0);
        Layout { root, card_width }
    }

    /// Scale the layout so that its card width becomes `target_width`.
    pub fn scale_to_width(&self, target_width: u32) -> Result<Layout, CoreError> {
        if target_width == 0 || target_width > MAX_TARGET_WIDTH {
            return Err(CoreError::Validation(format!(
                "Target width must be between 1 and {MAX_TARGET_WIDTH}px (got {target_width})"
            )));
        }
        if self.card_width <= 0.0 {
            return Err(CoreError::Validation(
                "Layout has no positive card width to scale from".to_string(),
            ));
        }
        let factor = f64::from(target_width) / self.card_width;
        Ok(self.scale(factor))
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

fn declared_card_width(root: &Node) -> Option<f64> {
    root.get("card_size")?.get("x")?.as_f64()
}

fn point(x: i64, y: i64) -> Node {
    Node::map([("x", Node::Int(x)), ("y", Node::Int(y))])
}

fn points(coords: &[(i64, i64)]) -> Node {
    Node::List(coords.iter().map(|&(x, y)| point(x, y)).collect())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    /// Walk two trees in lockstep and assert they have the same keys, list
    /// lengths and depth.
    fn assert_same_shape(a: &Node, b: &Node) {
        match (a, b) {
            (Node::Map(left), Node::Map(right)) => {
                let left_keys: Vec<_> = left.keys().collect();
                let right_keys: Vec<_> = right.keys().collect();
                assert_eq!(left_keys, right_keys);
                for (key, value) in left {
                    assert_same_shape(value, &right[key]);
                }
            }
            (Node::List(left), Node::List(right)) => {
                assert_eq!(left.len(), right.len());
                for (l, r) in left.iter().zip(right) {
                    assert_same_shape(l, r);
                }
            }
            (Node::Map(_), _) | (Node::List(_), _) | (_, Node::Map(_)) | (_, Node::List(_)) => {
                panic!("container mismatch: {a:?} vs {b:?}")
            }
            _ => {}
        }
    }

    /// Collect `(original, scaled)` pairs for every `x`/`y` coordinate.
    fn coordinate_pairs(original: &Node, scaled: &Node, out: &mut Vec<(f64, Node)>) {
        match (original, scaled) {
            (Node::Map(left), Node::Map(right)) => {
                for (key, value) in left {
                    if COORDINATE_KEYS.contains(&key.as_str()) {
                        if let Some(v) = value.as_f64() {
                            out.push((v, right[key].clone()));
                            continue;
                        }
                    }
                    coordinate_pairs(value, &right[key], out);
                }
            }
            (Node::List(left), Node::List(right)) => {
                for (l, r) in left.iter().zip(right) {
                    coordinate_pairs(l, r, out);
                }
            }
            _ => {}
        }
    }

    // -- reference design --

    #[test]
    fn reference_layout_has_twelve_four_point_lanes() {
        let layout = Layout::reference();
        assert_eq!(layout.card_width(), 730.0);
        assert_eq!(layout.lane_count(), 12);
        assert_eq!(layout.version(), Some("2.0"));

        let Some(Node::List(lanes)) = layout.root().get("lane_boxes") else {
            panic!("lane_boxes missing");
        };
        for (index, lane) in lanes.iter().enumerate() {
            let label = char::from(b'A' + index as u8).to_string();
            assert_matches!(lane.get(&label), Some(Node::List(corners)) if corners.len() == 4);
        }
    }

    #[test]
    fn reference_layout_serializes_in_design_order() {
        let value = serde_json::to_value(Layout::reference()).unwrap();
        assert_eq!(value["card_size"], json!({"x": 730, "y": 1220}));
        assert_eq!(value["swipe_line"], json!({"y": 620}));
        assert_eq!(
            value["lane_boxes"][11]["L"][2],
            json!({"x": 653, "y": 1095})
        );

        let text = serde_json::to_string(&Layout::reference()).unwrap();
        assert!(text.starts_with(r#"{"units":"pixels","id":"#));
    }

    // -- identity --

    #[test]
    fn identity_factor_returns_equal_layout() {
        let layout = Layout::reference();
        assert_eq!(layout.scale(1.0), layout);
    }

    #[test]
    fn identity_factor_keeps_float_coordinates() {
        let node = Node::map([("x", Node::Float(3.7)), ("y", Node::Int(2))]);
        assert_eq!(scale(&node, 1.0), node);
    }

    #[test]
    fn scaling_to_native_width_is_identity() {
        let layout = Layout::reference();
        assert_eq!(layout.scale_to_width(730).unwrap(), layout);
    }

    // -- rounding --

    #[test]
    fn half_values_round_up() {
        let node = Node::map([("x", Node::Int(5)), ("y", Node::Int(3))]);
        let scaled = scale(&node, 0.5);
        // 2.5 -> 3 and 1.5 -> 2; banker's rounding would give 2 and 2.
        assert_eq!(scaled.get("x"), Some(&Node::Int(3)));
        assert_eq!(scaled.get("y"), Some(&Node::Int(2)));

        let scaled = scale(&Node::map([("x", Node::Int(1))]), 2.5);
        assert_eq!(scaled.get("x"), Some(&Node::Int(3)));
    }

    #[test]
    fn negative_half_values_round_towards_positive_infinity() {
        let scaled = scale(&Node::map([("x", Node::Int(-5))]), 0.5);
        assert_eq!(scaled.get("x"), Some(&Node::Int(-2)));
    }

    #[test]
    fn every_reference_coordinate_obeys_the_rounding_law() {
        let layout = Layout::reference();
        let factor = 300.0 / 730.0;
        let scaled = layout.scale(factor);

        let mut pairs = Vec::new();
        coordinate_pairs(layout.root(), scaled.root(), &mut pairs);
        assert!(pairs.len() > 100);
        for (original, scaled) in pairs {
            assert_eq!(scaled, Node::Int((original * factor + 0.5).floor() as i64));
        }
    }

    // -- shape --

    #[test]
    fn scaling_preserves_shape() {
        let layout = Layout::reference();
        for factor in [0.1, 0.411, 2.0, 3.75] {
            assert_same_shape(layout.root(), layout.scale(factor).root());
        }
    }

    #[test]
    fn non_coordinate_leaves_pass_through() {
        let scaled = Layout::reference().scale(2.0);
        let root = scaled.root();
        assert_eq!(root.get("lane_number"), Some(&Node::Int(12)));
        assert_eq!(root.get("units"), Some(&Node::Text("pixels".into())));
        assert_eq!(root.get("date"), Some(&Node::Text("11/13/19".into())));
    }

    #[test]
    fn non_numeric_coordinate_passes_through() {
        let node = Node::map([("x", "left".into()), ("y", Node::Int(10))]);
        let scaled = scale(&node, 2.0);
        assert_eq!(scaled.get("x"), Some(&Node::Text("left".into())));
        assert_eq!(scaled.get("y"), Some(&Node::Int(20)));
    }

    #[test]
    fn swipe_line_scales_its_single_y() {
        let scaled = Layout::reference().scale(0.5);
        let swipe = scaled.root().get("swipe_line").unwrap();
        assert_eq!(swipe, &Node::map([("y", Node::Int(310))]));
    }

    // -- composition --

    #[test]
    fn repeated_scaling_is_not_associative_under_rounding() {
        // Known behaviour: each pass rounds, so two passes can drift from a
        // single pass with the product factor.
        let node = Node::map([("x", Node::Int(1))]);
        let twice = scale(&scale(&node, 0.5), 2.0);
        let once = scale(&node, 0.5 * 2.0);
        assert_eq!(twice.get("x"), Some(&Node::Int(2)));
        assert_eq!(once.get("x"), Some(&Node::Int(1)));
    }

    // -- scale_to_width --

    #[test]
    fn scale_to_display_width() {
        let scaled = Layout::reference().scale_to_width(300).unwrap();
        let value = serde_json::to_value(&scaled).unwrap();
        assert_eq!(value["card_size"], json!({"x": 300, "y": 501}));
        assert_eq!(value["lane_boxes"][0]["A"][0], json!({"x": 7, "y": 148}));
        assert_eq!(scaled.card_width(), 300.0);
    }

    #[test]
    fn out_of_range_target_width_rejected() {
        let layout = Layout::reference();
        assert_matches!(layout.scale_to_width(0), Err(CoreError::Validation(_)));
        let msg = layout.scale_to_width(7681).unwrap_err().to_string();
        assert!(msg.contains("between 1 and 7680"));
    }

    // -- construction --

    #[test]
    fn layout_from_json_keeps_key_order() {
        let text = r#"{"units":"mm","card_size":{"x":10,"y":20},"marks":[{"y":4,"x":2}]}"#;
        let layout = Layout::from_json(text).unwrap();
        assert_eq!(layout.card_width(), 10.0);

        let scaled = layout.scale_to_width(20).unwrap();
        assert_eq!(
            serde_json::to_string(&scaled).unwrap(),
            r#"{"units":"mm","card_size":{"x":20,"y":40},"marks":[{"y":8,"x":4}]}"#
        );
    }

    #[test]
    fn layout_without_card_width_rejected() {
        assert_matches!(
            Layout::from_json(r#"{"card_size":{"y":20}}"#),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            Layout::from_json(r#"{"card_size":{"x":0,"y":20}}"#),
            Err(CoreError::Validation(_))
        );
        assert_matches!(Layout::from_json("[1, 2"), Err(CoreError::Validation(_)));
    }
}
