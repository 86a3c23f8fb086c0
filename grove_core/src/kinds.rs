// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in node kinds.
//!
//! Every built-in kind uses a strict schema
//! ([`UnknownKeyPolicy::Reject`]) and caches its geometry as a `kurbo`
//! shape, re-derived in [`props_changed`](NodeKind::props_changed).
//!
//! | Tag      | Properties                                              |
//! |----------|---------------------------------------------------------|
//! | `Group`  | `opacity`, `visible`                                    |
//! | `Circle` | `cx`, `cy`, `r`                                         |
//! | `Rect`   | `x`, `y`, `width`, `height`                             |
//! | `Line`   | `p1`, `p2`                                              |
//! | `Paint`  | `color`, `opacity`, `stroke_width`, `style`             |

use alloc::string::String;

use kurbo::{Circle as CircleShape, Line as LineShape, Point, Rect as RectShape, Shape};

use crate::kind::NodeKind;
use crate::props::{Color, PropKind, PropertySchema, PropsContainer, UnknownKeyPolicy};

/// Container node; draws nothing itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    /// Opacity applied to the group's children.
    pub opacity: f64,
    /// Whether the group and its children are drawn.
    pub visible: bool,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            visible: true,
        }
    }
}

impl NodeKind for Group {
    fn define_properties(&self, schema: &mut PropertySchema) {
        schema
            .declare_with_default("opacity", PropKind::Number, 1.0)
            .declare_with_default("visible", PropKind::Bool, true)
            .set_unknown_policy(UnknownKeyPolicy::Reject);
    }

    fn props_changed(&mut self, props: &PropsContainer, _changed: &[String]) {
        self.opacity = props.get_number("opacity").unwrap_or(1.0).clamp(0.0, 1.0);
        self.visible = props.get_bool("visible").unwrap_or(true);
    }
}

/// A circle given by center and radius.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    /// Cached shape.
    pub shape: CircleShape,
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            shape: CircleShape::new(Point::ZERO, 0.0),
        }
    }
}

impl NodeKind for Circle {
    fn define_properties(&self, schema: &mut PropertySchema) {
        schema
            .declare_with_default("cx", PropKind::Number, 0.0)
            .declare_with_default("cy", PropKind::Number, 0.0)
            .declare_with_default("r", PropKind::Number, 0.0)
            .set_unknown_policy(UnknownKeyPolicy::Reject);
    }

    fn props_changed(&mut self, props: &PropsContainer, _changed: &[String]) {
        let center = Point::new(
            props.get_number("cx").unwrap_or(0.0),
            props.get_number("cy").unwrap_or(0.0),
        );
        // Negative radii collapse to a point.
        let radius = props.get_number("r").unwrap_or(0.0).max(0.0);
        self.shape = CircleShape::new(center, radius);
    }

    fn bounds(&self) -> Option<RectShape> {
        Some(self.shape.bounding_box())
    }
}

/// An axis-aligned rectangle given by origin and size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rect {
    /// Cached shape.
    pub shape: RectShape,
}

impl NodeKind for Rect {
    fn define_properties(&self, schema: &mut PropertySchema) {
        schema
            .declare_with_default("x", PropKind::Number, 0.0)
            .declare_with_default("y", PropKind::Number, 0.0)
            .declare_with_default("width", PropKind::Number, 0.0)
            .declare_with_default("height", PropKind::Number, 0.0)
            .set_unknown_policy(UnknownKeyPolicy::Reject);
    }

    fn props_changed(&mut self, props: &PropsContainer, _changed: &[String]) {
        let origin = Point::new(
            props.get_number("x").unwrap_or(0.0),
            props.get_number("y").unwrap_or(0.0),
        );
        let size = (
            props.get_number("width").unwrap_or(0.0),
            props.get_number("height").unwrap_or(0.0),
        );
        self.shape = RectShape::from_origin_size(origin, size).abs();
    }

    fn bounds(&self) -> Option<RectShape> {
        Some(self.shape)
    }
}

/// A line segment between two points.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Cached shape.
    pub shape: LineShape,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            shape: LineShape::new(Point::ZERO, Point::ZERO),
        }
    }
}

impl NodeKind for Line {
    fn define_properties(&self, schema: &mut PropertySchema) {
        schema
            .declare_with_default("p1", PropKind::Point, Point::ZERO)
            .declare_with_default("p2", PropKind::Point, Point::ZERO)
            .set_unknown_policy(UnknownKeyPolicy::Reject);
    }

    fn props_changed(&mut self, props: &PropsContainer, _changed: &[String]) {
        self.shape = LineShape::new(
            props.get_point("p1").unwrap_or(Point::ZERO),
            props.get_point("p2").unwrap_or(Point::ZERO),
        );
    }

    fn bounds(&self) -> Option<RectShape> {
        Some(self.shape.bounding_box())
    }
}

/// How a [`Paint`] applies to its shape siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// Fill the interior.
    #[default]
    Fill,
    /// Stroke the outline.
    Stroke,
}

/// Paint attributes (color, opacity, stroke) for the shapes of a group.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Base color.
    pub color: Color,
    /// Opacity multiplied into the color's alpha.
    pub opacity: f64,
    /// Stroke width, used with [`PaintStyle::Stroke`].
    pub stroke_width: f64,
    /// Fill or stroke.
    pub style: PaintStyle,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 1.0,
            stroke_width: 1.0,
            style: PaintStyle::Fill,
        }
    }
}

impl NodeKind for Paint {
    fn define_properties(&self, schema: &mut PropertySchema) {
        schema
            .declare_with_default("color", PropKind::Color, Color::BLACK)
            .declare_with_default("opacity", PropKind::Number, 1.0)
            .declare_with_default("stroke_width", PropKind::Number, 1.0)
            .declare_with_default("style", PropKind::Text, "fill")
            .set_unknown_policy(UnknownKeyPolicy::Reject);
    }

    fn props_changed(&mut self, props: &PropsContainer, _changed: &[String]) {
        self.color = props.get_color("color").unwrap_or(Color::BLACK);
        self.opacity = props.get_number("opacity").unwrap_or(1.0).clamp(0.0, 1.0);
        self.stroke_width = props.get_number("stroke_width").unwrap_or(1.0).max(0.0);
        self.style = match props.get_text("style") {
            Some("stroke") => PaintStyle::Stroke,
            _ => PaintStyle::Fill,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::props::PropBatch;

    fn apply(kind: &mut dyn NodeKind, batch: &PropBatch) -> Result<PropsContainer, SchemaError> {
        let mut props = PropsContainer::new();
        props.define_schema(|s| kind.define_properties(s))?;
        let changed = props.set_props(batch)?;
        kind.props_changed(&props, &changed);
        Ok(props)
    }

    #[test]
    fn circle_bounds_follow_props() {
        let mut circle = Circle::default();
        apply(
            &mut circle,
            &PropBatch::new().with("cx", 10.0).with("cy", 5.0).with("r", 2.0),
        )
        .unwrap();
        assert_eq!(circle.bounds(), Some(RectShape::new(8.0, 3.0, 12.0, 7.0)));
    }

    #[test]
    fn circle_rejects_unknown_keys() {
        let mut circle = Circle::default();
        let err = apply(&mut circle, &PropBatch::new().with("radius", 2.0)).unwrap_err();
        assert_eq!(err, SchemaError::UnknownProperty("radius".into()));
    }

    #[test]
    fn circle_rejects_wrong_type() {
        let mut circle = Circle::default();
        let err = apply(&mut circle, &PropBatch::new().with("r", "big")).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn rect_normalizes_negative_size() {
        let mut rect = Rect::default();
        apply(
            &mut rect,
            &PropBatch::new()
                .with("x", 10.0)
                .with("y", 10.0)
                .with("width", -4.0)
                .with("height", 2.0),
        )
        .unwrap();
        assert_eq!(rect.bounds(), Some(RectShape::new(6.0, 10.0, 10.0, 12.0)));
    }

    #[test]
    fn line_bounds_span_endpoints() {
        let mut line = Line::default();
        apply(
            &mut line,
            &PropBatch::new()
                .with("p1", Point::new(4.0, 1.0))
                .with("p2", Point::new(0.0, 3.0)),
        )
        .unwrap();
        assert_eq!(line.bounds(), Some(RectShape::new(0.0, 1.0, 4.0, 3.0)));
    }

    #[test]
    fn paint_reads_defaults_and_style() {
        let mut paint = Paint::default();
        apply(&mut paint, &PropBatch::new()).unwrap();
        assert_eq!(paint, Paint::default());

        apply(
            &mut paint,
            &PropBatch::new()
                .with("style", "stroke")
                .with("stroke_width", 3.0)
                .with("color", Color::rgba8(255, 0, 0, 255)),
        )
        .unwrap();
        assert_eq!(paint.style, PaintStyle::Stroke);
        assert_eq!(paint.stroke_width, 3.0);
        assert_eq!(paint.color, Color::rgba8(255, 0, 0, 255));
        assert!(paint.bounds().is_none());
    }

    #[test]
    fn group_clamps_opacity() {
        let mut group = Group::default();
        apply(&mut group, &PropBatch::new().with("opacity", 2.5)).unwrap();
        assert_eq!(group.opacity, 1.0);
        assert!(group.visible);
    }
}
