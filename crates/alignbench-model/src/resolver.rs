//! Breadth-first transform resolution over the link graph.
//!
//! Every edge is evaluated lazily from the current frame definitions:
//!
//! - a reference edge (one endpoint is the other's stored reference) uses
//!   the stored transform, inverted when walked frame → reference;
//! - any other registered pair derives its transform from the two
//!   endpoints' poses relative to their shared chain root.
//!
//! BFS expands neighbours in lexicographic order (the adjacency sets are
//! ordered), so among equally short paths the same one wins on every query
//! and resolver output is bit-identical run to run. Hardware-sync checks
//! diff that output against live stage coordinates; any run-to-run jitter
//! would show up as phantom drift.

use std::collections::{HashSet, VecDeque};

use alignbench_types::{AlignError, RigidTransform};

use crate::graph::FrameGraph;

/// Resolve the composed transform `from` → `to`.
///
/// # Errors
///
/// [`AlignError::UnknownFrame`] when either endpoint is missing,
/// [`AlignError::NoPathFound`] when no derivable edge path connects the two
/// frames.
pub(crate) fn resolve(
    graph: &FrameGraph,
    from: &str,
    to: &str,
) -> Result<RigidTransform, AlignError> {
    for name in [from, to] {
        if !graph.frames.contains_key(name) {
            return Err(AlignError::UnknownFrame(name.to_string()));
        }
    }
    if from == to {
        return Ok(RigidTransform::identity());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, RigidTransform)> = VecDeque::new();
    visited.insert(from);
    queue.push_back((from, RigidTransform::identity()));

    while let Some((current, accumulated)) = queue.pop_front() {
        let Some(neighbours) = graph.adjacency.get(current) else {
            continue;
        };
        for next in neighbours {
            if visited.contains(next.as_str()) {
                continue;
            }
            // An edge can lose derivability when an override moves one
            // endpoint under a different chain root; skip it and let BFS
            // look for another route.
            let Some(edge) = edge_transform(graph, current, next) else {
                continue;
            };
            let composed = accumulated.compose(edge);
            if next == to {
                return Ok(composed);
            }
            visited.insert(next.as_str());
            queue.push_back((next.as_str(), composed));
        }
    }

    Err(AlignError::NoPathFound {
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// The transform carried by the edge `a` → `b`, or `None` when the pair has
/// no derivable relationship under the current definitions.
fn edge_transform(graph: &FrameGraph, a: &str, b: &str) -> Option<RigidTransform> {
    let fa = &graph.frames[a];
    let fb = &graph.frames[b];
    if fb.reference == a {
        return Some(fb.transform);
    }
    if fa.reference == b {
        return Some(fa.transform.inverse());
    }
    let (root_a, pose_a) = chain_root(graph, a);
    let (root_b, pose_b) = chain_root(graph, b);
    if root_a != root_b {
        return None;
    }
    Some(pose_a.inverse().compose(pose_b))
}

/// Walk `name`'s reference chain to its bootstrap root, returning the root
/// name and the pose of `name` in the root (root → name).
///
/// Chains always terminate: references must exist at add time and
/// overrides reject cycles.
pub(crate) fn chain_root<'a>(graph: &'a FrameGraph, name: &'a str) -> (&'a str, RigidTransform) {
    let mut current = name;
    let mut pose = RigidTransform::identity();
    loop {
        let frame = &graph.frames[current];
        if frame.is_root() {
            return (current, pose);
        }
        pose = frame.transform.compose(pose);
        current = frame.reference.as_str();
    }
}

/// True when `needle` appears on `start`'s reference chain (including
/// `start` itself). Used by the override cycle guard.
pub(crate) fn chain_contains(graph: &FrameGraph, start: &str, needle: &str) -> bool {
    let mut current = start;
    loop {
        if current == needle {
            return true;
        }
        let frame = &graph.frames[current];
        if frame.is_root() {
            return false;
        }
        current = frame.reference.as_str();
    }
}
