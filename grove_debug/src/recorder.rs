// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it
//! receives, in order, as a [`RecordedEvent`]. Tests use it to assert on the
//! exact command sequence a session produced; [`json::events_to_json`]
//! renders a recording for post-mortem analysis.
//!
//! [`json::events_to_json`]: crate::json::events_to_json

use grove_core::trace::{
    ChildAttachedEvent, ChildRemovedEvent, CommandRejectedEvent, FlushEvent, NodeCreatedEvent,
    NodeDisposedEvent, NodeReleasedEvent, PropsAppliedEvent, RootChangedEvent, TeardownEvent,
    TraceSink,
};

/// A recorded event.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`NodeCreatedEvent`].
    NodeCreated(NodeCreatedEvent),
    /// A [`PropsAppliedEvent`].
    PropsApplied(PropsAppliedEvent),
    /// A [`ChildAttachedEvent`].
    ChildAttached(ChildAttachedEvent),
    /// A [`ChildRemovedEvent`].
    ChildRemoved(ChildRemovedEvent),
    /// A [`NodeDisposedEvent`].
    NodeDisposed(NodeDisposedEvent),
    /// A [`NodeReleasedEvent`].
    NodeReleased(NodeReleasedEvent),
    /// A [`RootChangedEvent`].
    RootChanged(RootChangedEvent),
    /// A [`CommandRejectedEvent`].
    CommandRejected(CommandRejectedEvent),
    /// A [`FlushEvent`].
    Flush(FlushEvent),
    /// A [`TeardownEvent`].
    Teardown(TeardownEvent),
}

impl RecordedEvent {
    /// Returns a short event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeCreated(_) => "NodeCreated",
            Self::PropsApplied(_) => "PropsApplied",
            Self::ChildAttached(_) => "ChildAttached",
            Self::ChildRemoved(_) => "ChildRemoved",
            Self::NodeDisposed(_) => "NodeDisposed",
            Self::NodeReleased(_) => "NodeReleased",
            Self::RootChanged(_) => "RootChanged",
            Self::CommandRejected(_) => "CommandRejected",
            Self::Flush(_) => "Flush",
            Self::Teardown(_) => "Teardown",
        }
    }
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Returns the event names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(RecordedEvent::name).collect()
    }

    /// Returns the recorded rejections.
    pub fn rejections(&self) -> impl Iterator<Item = &CommandRejectedEvent> {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::CommandRejected(r) => Some(r),
            _ => None,
        })
    }

    /// Drops all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        self.events.push(RecordedEvent::NodeCreated(e.clone()));
    }

    fn on_props_applied(&mut self, e: &PropsAppliedEvent) {
        self.events.push(RecordedEvent::PropsApplied(*e));
    }

    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        self.events.push(RecordedEvent::ChildAttached(*e));
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent) {
        self.events.push(RecordedEvent::ChildRemoved(*e));
    }

    fn on_node_disposed(&mut self, e: &NodeDisposedEvent) {
        self.events.push(RecordedEvent::NodeDisposed(*e));
    }

    fn on_node_released(&mut self, e: &NodeReleasedEvent) {
        self.events.push(RecordedEvent::NodeReleased(*e));
    }

    fn on_root_changed(&mut self, e: &RootChangedEvent) {
        self.events.push(RecordedEvent::RootChanged(*e));
    }

    fn on_command_rejected(&mut self, e: &CommandRejectedEvent) {
        self.events.push(RecordedEvent::CommandRejected(e.clone()));
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.events.push(RecordedEvent::Flush(*e));
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.events.push(RecordedEvent::Teardown(*e));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::command::{Command, CommandKind};
    use grove_core::error::{StructuralError, TreeError};
    use grove_core::props::PropBatch;
    use grove_core::registry::NodeRegistry;
    use grove_core::trace::Tracer;
    use grove_core::tree::NodeTree;

    fn create(tree: &mut NodeTree, tracer: &mut Tracer<'_>, tag: &str) -> grove_core::node::NodeId {
        tree.apply(
            Command::Create {
                tag: tag.into(),
                props: PropBatch::new(),
            },
            tracer,
        )
        .unwrap()
        .created()
        .unwrap()
    }

    #[test]
    fn records_session_in_order() {
        let mut rec = RecorderSink::new();
        {
            let mut tracer = Tracer::new(&mut rec);
            let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
            let a = create(&mut tree, &mut tracer, "Group");
            let b = create(&mut tree, &mut tracer, "Circle");
            tree.apply_all(
                [
                    Command::AddChild {
                        parent: a,
                        child: b,
                    },
                    Command::SetProperties {
                        id: b,
                        props: PropBatch::new().with("r", 2.0),
                    },
                    Command::RemoveChild {
                        parent: a,
                        child: b,
                    },
                    Command::Dispose(b),
                ],
                &mut tracer,
            )
            .unwrap();
            tree.flush_traced(&mut tracer);
        }

        assert_eq!(
            rec.names(),
            [
                "NodeCreated",
                "NodeCreated",
                "ChildAttached",
                "PropsApplied",
                "ChildRemoved",
                "NodeDisposed",
                "Flush",
            ]
        );
        match &rec.events()[5] {
            RecordedEvent::NodeDisposed(e) => assert!(!e.first, "already disposed by removal"),
            other => panic!("expected NodeDisposed, got {other:?}"),
        }
        match &rec.events()[6] {
            RecordedEvent::Flush(e) => {
                assert_eq!(e.created, 2);
                assert_eq!(e.disposed, 1);
            }
            other => panic!("expected Flush, got {other:?}"),
        }
    }

    #[test]
    fn records_rejections() {
        let mut rec = RecorderSink::new();
        {
            let mut tracer = Tracer::new(&mut rec);
            let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
            let a = create(&mut tree, &mut tracer, "Group");
            let _ = tree.apply(
                Command::AddChild {
                    parent: a,
                    child: a,
                },
                &mut tracer,
            );
        }
        let rejected: Vec<_> = rec.rejections().collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].command, CommandKind::AddChild);
        assert!(matches!(
            rejected[0].error,
            TreeError::Structural(StructuralError::WouldCycle { .. })
        ));

        rec.clear();
        assert!(rec.events().is_empty());
    }
}
