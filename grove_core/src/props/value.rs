// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Materialized property values.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba8(0, 0, 0, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba8(0, 0, 0, 0);

    /// Creates a color from its channels.
    #[must_use]
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from a packed `0xRRGGBBAA` value.
    #[must_use]
    pub const fn from_rgba_u32(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Packs the color as `0xRRGGBBAA`.
    #[must_use]
    pub const fn to_rgba_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

/// The value type of a property slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// Accepts every value.
    Any,
    /// [`PropValue::Bool`].
    Bool,
    /// [`PropValue::Number`].
    Number,
    /// [`PropValue::Text`].
    Text,
    /// [`PropValue::Point`].
    Point,
    /// [`PropValue::Vec2`].
    Vec2,
    /// [`PropValue::Rect`].
    Rect,
    /// [`PropValue::Color`].
    Color,
    /// [`PropValue::List`].
    List,
    /// [`PropValue::Null`].
    Null,
}

impl PropKind {
    /// Returns whether a value of kind `found` can be stored in a slot of
    /// this kind.
    #[must_use]
    pub fn accepts(self, found: Self) -> bool {
        self == Self::Any || found == Self::Null || self == found
    }
}

/// A property value resolved to its concrete form.
///
/// The reconciler hands over plain values; animated or deferred values are
/// resolved before they reach the tree. [`Null`](Self::Null) clears a
/// property.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PropValue {
    /// No value; writing it removes the property.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
    /// A point.
    Point(Point),
    /// A vector.
    Vec2(Vec2),
    /// A rectangle.
    Rect(Rect),
    /// A color.
    Color(Color),
    /// A list of values.
    List(Vec<PropValue>),
}

impl PropValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> PropKind {
        match self {
            Self::Null => PropKind::Null,
            Self::Bool(_) => PropKind::Bool,
            Self::Number(_) => PropKind::Number,
            Self::Text(_) => PropKind::Text,
            Self::Point(_) => PropKind::Point,
            Self::Vec2(_) => PropKind::Vec2,
            Self::Rect(_) => PropKind::Rect,
            Self::Color(_) => PropKind::Color,
            Self::List(_) => PropKind::List,
        }
    }

    /// Returns whether this is [`Null`](Self::Null).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the point, if this is one.
    #[must_use]
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the vector, if this is one.
    #[must_use]
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Self::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the rectangle, if this is one.
    #[must_use]
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the color, if this is one.
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the list, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Point> for PropValue {
    fn from(v: Point) -> Self {
        Self::Point(v)
    }
}

impl From<Vec2> for PropValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Rect> for PropValue {
    fn from(v: Rect) -> Self {
        Self::Rect(v)
    }
}

impl From<Color> for PropValue {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<Vec<Self>> for PropValue {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packs_round_trip() {
        let c = Color::from_rgba_u32(0x1122_33ff);
        assert_eq!(c, Color::rgba8(0x11, 0x22, 0x33, 0xff));
        assert_eq!(c.to_rgba_u32(), 0x1122_33ff);
    }

    #[test]
    fn null_is_accepted_by_every_slot() {
        assert!(PropKind::Number.accepts(PropKind::Null));
        assert!(PropKind::Any.accepts(PropKind::Text));
        assert!(!PropKind::Number.accepts(PropKind::Text));
    }

    #[test]
    fn accessors_match_variant() {
        let v = PropValue::from(Point::new(1.0, 2.0));
        assert_eq!(v.kind(), PropKind::Point);
        assert_eq!(v.as_point(), Some(Point::new(1.0, 2.0)));
        assert_eq!(v.as_number(), None);
        assert_eq!(PropValue::from(3).as_number(), Some(3.0));
    }
}
