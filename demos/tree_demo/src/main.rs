// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted reconciler session that exercises the command stream and the
//! diagnostics pipeline.
//!
//! Builds a small scene, then runs a few synthetic frames of edits (animated
//! radii, a reorder, a removal, one deliberately bad batch). Each frame is
//! flushed into a console renderer. Events go to both a
//! [`PrettyPrintSink`](grove_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](grove_debug::recorder::RecorderSink); at the end the
//! final tree and the recording are written as JSON.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use grove_core::command::Command;
use grove_core::consumer::TreeConsumer;
use grove_core::kind::TypeTag;
use grove_core::node::{DisposeCallback, NodeId, TreeChanges};
use grove_core::props::{Color, PropBatch};
use grove_core::registry::NodeRegistry;
use grove_core::trace::{
    ChildAttachedEvent, ChildRemovedEvent, CommandRejectedEvent, FlushEvent, NodeCreatedEvent,
    NodeDisposedEvent, NodeReleasedEvent, PropsAppliedEvent, RootChangedEvent, TeardownEvent,
    TraceSink, Tracer,
};
use grove_core::tree::NodeTree;

use grove_debug::json::{events_to_json, write_snapshot};
use grove_debug::pretty::PrettyPrintSink;
use grove_debug::recorder::RecorderSink;

const FRAME_COUNT: u32 = 4;

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        self.a.on_node_created(e);
        self.b.on_node_created(e);
    }

    fn on_props_applied(&mut self, e: &PropsAppliedEvent) {
        self.a.on_props_applied(e);
        self.b.on_props_applied(e);
    }

    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        self.a.on_child_attached(e);
        self.b.on_child_attached(e);
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent) {
        self.a.on_child_removed(e);
        self.b.on_child_removed(e);
    }

    fn on_node_disposed(&mut self, e: &NodeDisposedEvent) {
        self.a.on_node_disposed(e);
        self.b.on_node_disposed(e);
    }

    fn on_node_released(&mut self, e: &NodeReleasedEvent) {
        self.a.on_node_released(e);
        self.b.on_node_released(e);
    }

    fn on_root_changed(&mut self, e: &RootChangedEvent) {
        self.a.on_root_changed(e);
        self.b.on_root_changed(e);
    }

    fn on_command_rejected(&mut self, e: &CommandRejectedEvent) {
        self.a.on_command_rejected(e);
        self.b.on_command_rejected(e);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.a.on_flush(e);
        self.b.on_flush(e);
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.a.on_teardown(e);
        self.b.on_teardown(e);
    }
}

/// Prints the visible tree with each node's bounds.
struct ConsoleRenderer;

impl TreeConsumer for ConsoleRenderer {
    fn consume(&mut self, tree: &NodeTree, changes: &TreeChanges) {
        if changes.props.is_empty() && !changes.topology_changed {
            println!("  (nothing to redraw)");
            return;
        }
        tree.walk(|node, depth| {
            let bounds = node
                .bounds()
                .map(|r| format!("{:.1},{:.1} {:.1}x{:.1}", r.x0, r.y0, r.width(), r.height()))
                .unwrap_or_else(|| "-".into());
            println!(
                "  {:indent$}{} {} [{bounds}]",
                "",
                node.type_tag(),
                node.id(),
                indent = depth * 2
            );
        });
    }
}

fn create(
    tree: &mut NodeTree,
    tracer: &mut Tracer<'_>,
    tag: &str,
    props: PropBatch,
) -> Result<NodeId, Box<dyn Error>> {
    let applied = tree.apply(
        Command::Create {
            tag: tag.into(),
            props,
        },
        tracer,
    )?;
    applied
        .created()
        .ok_or_else(|| format!("{tag} was not created").into())
}

fn main() -> Result<(), Box<dyn Error>> {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    // -- tree --------------------------------------------------------------
    // The coordinator stands in for an animation driver that keeps a count
    // of subscribed nodes.
    let subscribed = Arc::new(AtomicUsize::new(0));
    let live = Arc::clone(&subscribed);
    let mut tree = NodeTree::with_coordinator(
        NodeRegistry::with_builtin_kinds(),
        move |_id: NodeId, _tag: &TypeTag| {
            live.fetch_add(1, Ordering::Relaxed);
            let live = Arc::clone(&live);
            Some(DisposeCallback::new(move || {
                live.fetch_sub(1, Ordering::Relaxed);
            }))
        },
    );

    {
        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);

        // -- scene -----------------------------------------------------------
        let root = create(&mut tree, &mut tracer, "Group", PropBatch::new())?;
        let paint = create(
            &mut tree,
            &mut tracer,
            "Paint",
            PropBatch::new().with("color", Color::rgba8(0x33, 0x99, 0xff, 0xff)),
        )?;
        let circles = (0_u8..3)
            .map(|i| {
                let props = PropBatch::new()
                    .with("cx", 40.0 * f64::from(i + 1))
                    .with("cy", 40.0)
                    .with("r", 10.0);
                create(&mut tree, &mut tracer, "Circle", props)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let line = create(
            &mut tree,
            &mut tracer,
            "Line",
            PropBatch::new()
                .with("p1", grove_core::kurbo::Point::new(0.0, 80.0))
                .with("p2", grove_core::kurbo::Point::new(160.0, 80.0)),
        )?;

        let mut setup = vec![
            Command::AddRoot(root),
            Command::AddChild {
                parent: root,
                child: paint,
            },
        ];
        setup.extend(circles.iter().map(|&c| Command::AddChild {
            parent: root,
            child: c,
        }));
        tree.apply_all(setup, &mut tracer)?;

        // -- frames ----------------------------------------------------------
        for frame in 0..FRAME_COUNT {
            println!("-- frame {frame} --");
            let mut cmds: Vec<Command> = circles
                .iter()
                .map(|&c| Command::SetProperties {
                    id: c,
                    props: PropBatch::new().with("r", 10.0 + 2.5 * f64::from(frame)),
                })
                .collect();
            match frame {
                1 => cmds.push(Command::InsertChildBefore {
                    parent: root,
                    child: line,
                    before: circles[0],
                }),
                2 => cmds.push(Command::RemoveChild {
                    parent: root,
                    child: circles[1],
                }),
                _ => {}
            }
            if let Err(err) = tree.apply_all(cmds, &mut tracer) {
                println!("  batch stopped: {err}");
            }

            // A batch the schema rejects; the tree stays as it was.
            if frame == 3 {
                let _ = tree.apply(
                    Command::SetProperties {
                        id: circles[0],
                        props: PropBatch::new().with("radius", 1.0),
                    },
                    &mut tracer,
                );
            }

            let changes = tree.flush_traced(&mut tracer);
            ConsoleRenderer.consume(&tree, &changes);
        }

        // -- snapshot --------------------------------------------------------
        let path = "tree_snapshot.json";
        let mut out = BufWriter::new(File::create(path)?);
        write_snapshot(&tree.snapshot(), &mut out)?;
        println!("Wrote {path} ({} nodes)", tree.snapshot().node_count());

        tree.teardown_traced(&mut tracer);
    }

    println!(
        "Subscribed after teardown: {}",
        subscribed.load(Ordering::Relaxed)
    );

    let path = "tree_events.json";
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, &events_to_json(recorder.events()))?;
    println!("Wrote {path} ({} events)", recorder.events().len());
    Ok(())
}
