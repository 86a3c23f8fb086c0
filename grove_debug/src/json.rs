// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON dumps of trees and recordings.
//!
//! [`snapshot_to_json`] renders a [`TreeSnapshot`] as nested objects:
//!
//! ```json
//! [{ "id": "#0.0", "type": "Group", "props": {}, "children": [ ... ] }]
//! ```
//!
//! [`events_to_json`] renders a recording from
//! [`RecorderSink`](crate::recorder::RecorderSink) as an array of
//! `{ "seq", "name", "args" }` objects.

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use grove_core::props::{Color, PropValue};
use grove_core::snapshot::{SnapshotNode, TreeSnapshot};

use crate::recorder::RecordedEvent;

/// Converts a property value to JSON.
///
/// Geometry values become objects (`{"x", "y"}`, `{"x0", "y0", "x1", "y1"}`)
/// and colors become `#rrggbbaa` strings. Non-finite numbers become `null`.
#[must_use]
pub fn prop_to_json(value: &PropValue) -> Value {
    match value {
        PropValue::Null => Value::Null,
        PropValue::Bool(b) => Value::Bool(*b),
        PropValue::Number(n) => json!(n),
        PropValue::Text(s) => Value::String(s.clone()),
        PropValue::Point(p) => json!({ "x": p.x, "y": p.y }),
        PropValue::Vec2(v) => json!({ "x": v.x, "y": v.y }),
        PropValue::Rect(r) => json!({ "x0": r.x0, "y0": r.y0, "x1": r.x1, "y1": r.y1 }),
        PropValue::Color(c) => Value::String(color_hex(*c)),
        PropValue::List(items) => Value::Array(items.iter().map(prop_to_json).collect()),
    }
}

fn color_hex(c: Color) -> String {
    format!("#{:08x}", c.to_rgba_u32())
}

fn node_to_json(node: &SnapshotNode) -> Value {
    let props: Map<String, Value> = node
        .props
        .iter()
        .map(|(k, v)| (k.clone(), prop_to_json(v)))
        .collect();
    json!({
        "id": node.id.to_string(),
        "type": node.tag.as_str(),
        "props": props,
        "children": node.children.iter().map(node_to_json).collect::<Vec<_>>(),
    })
}

/// Renders a snapshot as an array with one object per root.
#[must_use]
pub fn snapshot_to_json(snapshot: &TreeSnapshot) -> Value {
    Value::Array(snapshot.roots.iter().map(node_to_json).collect())
}

/// Writes a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn write_snapshot(snapshot: &TreeSnapshot, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &snapshot_to_json(snapshot))?;
    writeln!(writer)
}

fn event_args(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::NodeCreated(e) => json!({ "id": e.id.to_string(), "type": e.tag.as_str() }),
        RecordedEvent::PropsApplied(e) => json!({
            "id": e.id.to_string(),
            "batch_len": e.batch_len,
            "changed": e.changed,
        }),
        RecordedEvent::ChildAttached(e) => json!({
            "parent": e.parent.to_string(),
            "child": e.child.to_string(),
            "before": e.before.map(|b| b.to_string()),
        }),
        RecordedEvent::ChildRemoved(e) => json!({
            "parent": e.parent.to_string(),
            "child": e.child.to_string(),
        }),
        RecordedEvent::NodeDisposed(e) => json!({ "id": e.id.to_string(), "first": e.first }),
        RecordedEvent::NodeReleased(e) => json!({ "id": e.id.to_string() }),
        RecordedEvent::RootChanged(e) => json!({ "id": e.id.to_string(), "added": e.added }),
        RecordedEvent::CommandRejected(e) => json!({
            "command": format!("{:?}", e.command),
            "error": e.error.to_string(),
        }),
        RecordedEvent::Flush(e) => json!({
            "props": e.props,
            "topology": e.topology,
            "created": e.created,
            "disposed": e.disposed,
            "released": e.released,
            "topology_changed": e.topology_changed,
        }),
        RecordedEvent::Teardown(e) => json!({ "disposed": e.disposed }),
    }
}

/// Renders recorded events as a JSON array.
#[must_use]
pub fn events_to_json(events: &[RecordedEvent]) -> Value {
    Value::Array(
        events
            .iter()
            .enumerate()
            .map(|(seq, e)| json!({ "seq": seq, "name": e.name(), "args": event_args(e) }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::props::PropBatch;
    use grove_core::registry::NodeRegistry;
    use grove_core::tree::NodeTree;
    use grove_core::trace::{TeardownEvent, TraceSink};

    use crate::recorder::RecorderSink;

    #[test]
    fn snapshot_json_shape() {
        let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let root = tree.create("Group", &PropBatch::new()).unwrap();
        let paint = tree
            .create(
                "Paint",
                &PropBatch::new().with("color", Color::rgba8(0x11, 0x22, 0x33, 0xff)),
            )
            .unwrap();
        tree.add_child(root, paint).unwrap();
        tree.add_root(root).unwrap();

        let value = snapshot_to_json(&tree.snapshot());
        assert_eq!(value[0]["type"], "Group");
        assert_eq!(value[0]["children"][0]["type"], "Paint");
        assert_eq!(value[0]["children"][0]["props"]["color"], "#112233ff");
        assert_eq!(value[0]["children"][0]["children"], json!([]));
    }

    #[test]
    fn geometry_props_become_objects() {
        let value = prop_to_json(&PropValue::Point(kurbo_point(1.0, 2.0)));
        assert_eq!(value, json!({ "x": 1.0, "y": 2.0 }));
        assert_eq!(prop_to_json(&PropValue::Number(f64::NAN)), Value::Null);
        assert_eq!(
            prop_to_json(&PropValue::List(vec![PropValue::Bool(true), PropValue::Null])),
            json!([true, null])
        );
    }

    fn kurbo_point(x: f64, y: f64) -> grove_core::kurbo::Point {
        grove_core::kurbo::Point::new(x, y)
    }

    #[test]
    fn write_snapshot_is_valid_json() {
        let tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let mut out = Vec::new();
        write_snapshot(&tree.snapshot(), &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, json!([]));
    }

    #[test]
    fn events_json_numbers_sequence() {
        let mut rec = RecorderSink::new();
        rec.on_teardown(&TeardownEvent { disposed: 2 });
        rec.on_teardown(&TeardownEvent { disposed: 0 });
        let value = events_to_json(rec.events());
        assert_eq!(value[1]["seq"], 1);
        assert_eq!(value[0]["name"], "Teardown");
        assert_eq!(value[0]["args"]["disposed"], 2);
    }
}
