use std::collections::VecDeque;

use eframe::egui::{Vec2, vec2};

use crate::config::{OverlapConfig, TreeConfig};

use super::overlap::resolve_overlaps;

struct Expansion {
    node: usize,
    level: usize,
    parent_y: f32,
}

struct TreePlacer<'a> {
    outgoing: Vec<Vec<usize>>,
    positions: Vec<Vec2>,
    placed: Vec<bool>,
    queue: VecDeque<Expansion>,
    config: &'a TreeConfig,
}

impl TreePlacer<'_> {
    fn place_root(&mut self, node: usize, y: f32) {
        self.positions[node] = vec2(self.config.left_margin, y);
        self.placed[node] = true;
    }

    /// Breadth-first expansion from `root`. A node is claimed by the first
    /// parent that reaches it; later parents and back-edges skip it.
    fn expand_from(&mut self, root: usize) {
        self.queue.push_back(Expansion {
            node: root,
            level: 1,
            parent_y: self.positions[root].y,
        });

        let spacing = self.config.vertical_spacing;
        while let Some(Expansion {
            node,
            level,
            parent_y,
        }) = self.queue.pop_front()
        {
            let children = &self.outgoing[node];
            if children.is_empty() {
                continue;
            }

            let base_y = parent_y - ((children.len() - 1) as f32 * spacing) / 2.0;
            let x = self.config.left_margin + level as f32 * self.config.horizontal_spacing;
            for (slot, &child) in children.iter().enumerate() {
                if self.placed[child] {
                    continue;
                }
                self.placed[child] = true;

                let y = base_y + slot as f32 * spacing;
                self.positions[child] = vec2(x, y);
                self.queue.push_back(Expansion {
                    node: child,
                    level: level + 1,
                    parent_y: y,
                });
            }
        }
    }
}

/// Left-to-right hierarchical layout over index-space edges, followed by one
/// overlap cleanup pass. Deterministic for a fixed node order and edge order.
pub fn tree_layout(
    node_count: usize,
    edges: &[(usize, usize)],
    tree: &TreeConfig,
    overlap: &OverlapConfig,
) -> Vec<Vec2> {
    if node_count == 0 {
        return Vec::new();
    }

    let mut outgoing = vec![Vec::new(); node_count];
    let mut has_incoming = vec![false; node_count];
    for &(source, target) in edges {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }
        outgoing[source].push(target);
        has_incoming[target] = true;
    }

    let mut roots = (0..node_count)
        .filter(|&index| !has_incoming[index])
        .collect::<Vec<_>>();
    if roots.is_empty() {
        roots.push(0);
    }

    let mut placer = TreePlacer {
        outgoing,
        positions: vec![Vec2::ZERO; node_count],
        placed: vec![false; node_count],
        queue: VecDeque::new(),
        config: tree,
    };

    let mut next_y = tree.top_margin;
    for &root in &roots {
        placer.place_root(root, next_y);
        next_y += tree.vertical_spacing;
    }
    for &root in &roots {
        placer.expand_from(root);
    }

    for index in 0..node_count {
        if placer.placed[index] {
            continue;
        }
        placer.place_root(index, next_y);
        next_y += tree.vertical_spacing;
        placer.expand_from(index);
    }

    resolve_overlaps(&placer.positions, overlap)
}
