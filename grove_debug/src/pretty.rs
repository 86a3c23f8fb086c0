// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use grove_core::command::CommandKind;
use grove_core::trace::{
    ChildAttachedEvent, ChildRemovedEvent, CommandRejectedEvent, FlushEvent, NodeCreatedEvent,
    NodeDisposedEvent, NodeReleasedEvent, PropsAppliedEvent, RootChangedEvent, TeardownEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    lines: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Returns the number of lines written so far.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        // Diagnostics must never fail the command that produced them.
        if self.writer.write_fmt(args).is_ok() && self.writer.write_all(b"\n").is_ok() {
            self.lines += 1;
        }
    }
}

fn command_name(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Create => "create",
        CommandKind::SetProperties => "set-props",
        CommandKind::AddChild => "add-child",
        CommandKind::InsertChildBefore => "insert-before",
        CommandKind::RemoveChild => "remove-child",
        CommandKind::Dispose => "dispose",
        CommandKind::Release => "release",
        CommandKind::AddRoot => "add-root",
        CommandKind::RemoveRoot => "remove-root",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        self.line(format_args!("[create] {} {}", e.id, e.tag));
    }

    fn on_props_applied(&mut self, e: &PropsAppliedEvent) {
        self.line(format_args!(
            "[props] {} keys={} changed={}",
            e.id, e.batch_len, e.changed
        ));
    }

    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        match e.before {
            Some(before) => self.line(format_args!(
                "[attach] {} -> {} before {before}",
                e.child, e.parent
            )),
            None => self.line(format_args!("[attach] {} -> {}", e.child, e.parent)),
        }
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent) {
        self.line(format_args!("[remove] {} from {}", e.child, e.parent));
    }

    fn on_node_disposed(&mut self, e: &NodeDisposedEvent) {
        let state = if e.first { "disposed" } else { "already disposed" };
        self.line(format_args!("[dispose] {} {state}", e.id));
    }

    fn on_node_released(&mut self, e: &NodeReleasedEvent) {
        self.line(format_args!("[release] {}", e.id));
    }

    fn on_root_changed(&mut self, e: &RootChangedEvent) {
        let sign = if e.added { '+' } else { '-' };
        self.line(format_args!("[root] {sign}{}", e.id));
    }

    fn on_command_rejected(&mut self, e: &CommandRejectedEvent) {
        self.line(format_args!(
            "[rejected] {}: {}",
            command_name(e.command),
            e.error
        ));
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.line(format_args!(
            "[flush] props={} topology={} created={} disposed={} released={} rebuilt={}",
            e.props, e.topology, e.created, e.disposed, e.released, e.topology_changed
        ));
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.line(format_args!("[teardown] disposed={}", e.disposed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::command::Command;
    use grove_core::props::PropBatch;
    use grove_core::registry::NodeRegistry;
    use grove_core::trace::Tracer;
    use grove_core::tree::NodeTree;

    #[test]
    fn pretty_print_session() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        {
            let mut tracer = Tracer::new(&mut sink);
            let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
            let id = tree
                .apply(
                    Command::Create {
                        tag: "Circle".into(),
                        props: PropBatch::new().with("r", 1.0),
                    },
                    &mut tracer,
                )
                .unwrap()
                .created()
                .unwrap();
            tree.apply(Command::AddRoot(id), &mut tracer).unwrap();
            let _ = tree.apply(Command::Release(id), &mut tracer);
            tree.teardown_traced(&mut tracer);
        }
        assert_eq!(sink.lines(), 4);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[create] #0.0 Circle"), "got: {output}");
        assert!(output.contains("[root] +#0.0"), "got: {output}");
        assert!(output.contains("[rejected] release:"), "got: {output}");
        assert!(output.contains("[teardown] disposed=1"), "got: {output}");
    }
}
