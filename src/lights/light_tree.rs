//! Binary light importance tree (spec section 4.4).
//!
//! Built once, bottom-up, over the scene's emissive primitives using a
//! `typed_arena::Arena` for the recursive build nodes (the single-
//! threaded counterpart of the arena the teacher keeps around for its
//! own tree builds; this crate's BVH build is parallelized with
//! `rayon::join` instead, which an `Arena` cannot safely share across,
//! so the arena's use moved here -- see DESIGN.md). Traversal is
//! flattened afterwards into a flat `Vec` with parent back-pointers so
//! `pdf` can replay a sampling decision without retraversing the whole
//! tree (spec section 4.4, "Structure").
//!
//! Every internal node here has exactly two children, so the spec's
//! general "adaptive threshold over several children" traversal
//! collapses to a plain two-way weighted choice at each node (see
//! DESIGN.md, "Light tree adaptive threshold traversal").

use std::collections::HashMap;

use typed_arena::Arena;

use crate::core::geometry::{bnd3_union_pnt3f, pnt3_distance_squaredf, pnt3_distancef, Bounds3f, Point3f};
use crate::core::pbrt::{Float, ONE_MINUS_EPSILON};

/// One emissive primitive as seen by the tree builder: an opaque id
/// back into the scene's primitive array, its world bound, and an
/// estimate of its total emitted power (spec section 4.4, "cumulative
/// emitted power").
#[derive(Debug, Copy, Clone)]
pub struct Emitter {
    pub primitive_index: u32,
    pub bounds: Bounds3f,
    pub power: Float,
}

enum BuildKind<'a> {
    Leaf(u32),
    Interior(&'a BuildNode<'a>, &'a BuildNode<'a>),
}

struct BuildNode<'a> {
    center: Point3f,
    radius: Float,
    power: Float,
    leaf_count: u32,
    kind: BuildKind<'a>,
}

fn axis_of(p: &Point3f, axis: u8) -> Float {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

/// Smallest sphere enclosing both input spheres.
fn merge_spheres(a: (Point3f, Float), b: (Point3f, Float)) -> (Point3f, Float) {
    let (c1, r1) = a;
    let (c2, r2) = b;
    let d = pnt3_distancef(&c1, &c2);
    if d + r2 <= r1 {
        return (c1, r1);
    }
    if d + r1 <= r2 {
        return (c2, r2);
    }
    let r = (d + r1 + r2) * 0.5;
    let t = (r - r1) / d.max(1e-12);
    (c1 + (c2 - c1) * t, r)
}

fn build_range<'a>(arena: &'a Arena<BuildNode<'a>>, items: &mut [Emitter]) -> &'a BuildNode<'a> {
    if items.len() == 1 {
        let e = items[0];
        let (center, radius) = e.bounds.bounding_sphere();
        return arena.alloc(BuildNode {
            center,
            radius,
            power: e.power,
            leaf_count: 1,
            kind: BuildKind::Leaf(e.primitive_index),
        });
    }
    let mut centroid_bounds = Bounds3f::new(items[0].bounds.centroid(), items[0].bounds.centroid());
    for item in items.iter().skip(1) {
        centroid_bounds = bnd3_union_pnt3f(&centroid_bounds, &item.bounds.centroid());
    }
    let axis = centroid_bounds.maximum_extent();
    items.sort_by(|a, b| {
        axis_of(&a.bounds.centroid(), axis)
            .partial_cmp(&axis_of(&b.bounds.centroid(), axis))
            .unwrap()
    });
    let mid = items.len() / 2;
    let (left_items, right_items) = items.split_at_mut(mid);
    let left = build_range(arena, left_items);
    let right = build_range(arena, right_items);
    let (center, radius) = merge_spheres((left.center, left.radius), (right.center, right.radius));
    arena.alloc(BuildNode {
        center,
        radius,
        power: left.power + right.power,
        leaf_count: left.leaf_count + right.leaf_count,
        kind: BuildKind::Interior(left, right),
    })
}

enum LightTreeNodeKind {
    Leaf { primitive_index: u32 },
    Interior { left: u32, right: u32 },
}

struct LightTreeNode {
    center: Point3f,
    radius: Float,
    power: Float,
    leaf_count: u32,
    parent: Option<u32>,
    kind: LightTreeNodeKind,
}

fn flatten(node: &BuildNode, nodes: &mut Vec<LightTreeNode>, parent: Option<u32>) -> u32 {
    let idx = nodes.len() as u32;
    nodes.push(LightTreeNode {
        center: node.center,
        radius: node.radius,
        power: node.power,
        leaf_count: node.leaf_count,
        parent,
        kind: LightTreeNodeKind::Leaf { primitive_index: 0 },
    });
    match &node.kind {
        BuildKind::Leaf(id) => {
            nodes[idx as usize].kind = LightTreeNodeKind::Leaf { primitive_index: *id };
        }
        BuildKind::Interior(left, right) => {
            let left_idx = flatten(left, nodes, Some(idx));
            let right_idx = flatten(right, nodes, Some(idx));
            nodes[idx as usize].kind = LightTreeNodeKind::Interior { left: left_idx, right: right_idx };
        }
    }
    idx
}

/// Importance tree over emissive primitives (spec section 4.4).
/// Construct via [`LightTree::build`]; `None` emitters means no tree,
/// and callers treat that as "skip NEE" rather than an error (spec
/// section 4.4, "Degenerate case"; SPEC_FULL.md section 4.4).
pub struct LightTree {
    nodes: Vec<LightTreeNode>,
    root: u32,
    leaf_of: HashMap<u32, u32>,
}

impl LightTree {
    pub fn build(mut emitters: Vec<Emitter>) -> Option<Self> {
        if emitters.is_empty() {
            return None;
        }
        let arena = Arena::new();
        let root_ref = build_range(&arena, &mut emitters);
        let mut nodes = Vec::new();
        let root = flatten(root_ref, &mut nodes, None);
        let mut leaf_of = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if let LightTreeNodeKind::Leaf { primitive_index } = node.kind {
                leaf_of.insert(primitive_index, i as u32);
            }
        }
        Some(LightTree { nodes, root, leaf_of })
    }

    fn weight(&self, idx: u32, p: &Point3f) -> Float {
        let node = &self.nodes[idx as usize];
        let d2 = pnt3_distance_squaredf(&node.center, p).max(1e-6);
        node.power * (node.radius * node.radius).max(1e-12) / d2
    }

    fn branch_probability(&self, left: u32, right: u32, p: &Point3f) -> Float {
        let wl = self.weight(left, p);
        let wr = self.weight(right, p);
        let total = wl + wr;
        if total.is_finite() && total > 0.0 {
            wl / total
        } else {
            let cl = self.nodes[left as usize].leaf_count as Float;
            let cr = self.nodes[right as usize].leaf_count as Float;
            cl / (cl + cr)
        }
    }

    /// Discrete sample of an emitter with approximate probability
    /// proportional to its unoccluded contribution at `p` (spec
    /// section 4.4, "Contract").
    pub fn sample(&self, p: &Point3f, mut u: Float) -> Option<(u32, Float)> {
        let mut idx = self.root;
        let mut pdf = 1.0;
        loop {
            match self.nodes[idx as usize].kind {
                LightTreeNodeKind::Leaf { primitive_index } => return Some((primitive_index, pdf)),
                LightTreeNodeKind::Interior { left, right } => {
                    let pl = self.branch_probability(left, right, p);
                    if u < pl {
                        pdf *= pl.max(1e-12);
                        u = (u / pl.max(1e-12)).min(ONE_MINUS_EPSILON);
                        idx = left;
                    } else {
                        let pr = 1.0 - pl;
                        pdf *= pr.max(1e-12);
                        u = ((u - pl) / pr.max(1e-12)).min(ONE_MINUS_EPSILON);
                        idx = right;
                    }
                }
            }
        }
    }

    /// The probability `sample` would have assigned to
    /// `emitter_primitive_index`, replayed via parent back-pointers
    /// without retraversing the whole tree (spec section 4.4).
    pub fn pdf(&self, p: &Point3f, emitter_primitive_index: u32) -> Float {
        let Some(&leaf_idx) = self.leaf_of.get(&emitter_primitive_index) else {
            return 0.0;
        };
        let mut node_idx = leaf_idx;
        let mut pdf = 1.0;
        while let Some(parent_idx) = self.nodes[node_idx as usize].parent {
            let (left, right) = match self.nodes[parent_idx as usize].kind {
                LightTreeNodeKind::Interior { left, right } => (left, right),
                LightTreeNodeKind::Leaf { .. } => unreachable!("light tree parent is always interior"),
            };
            let pl = self.branch_probability(left, right, p);
            pdf *= if node_idx == left { pl } else { 1.0 - pl };
            node_idx = parent_idx;
        }
        pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Rng;

    fn sample_emitters(n: usize, rng: &mut Rng) -> Vec<Emitter> {
        (0..n as u32)
            .map(|i| {
                let c = Point3f::new(rng.uniform_float() * 10.0, rng.uniform_float() * 10.0, rng.uniform_float() * 10.0);
                let r = 0.1;
                let half = crate::core::geometry::Vector3f::new(r, r, r);
                Emitter {
                    primitive_index: i,
                    bounds: Bounds3f::new(c - half, c + half),
                    power: 1.0 + rng.uniform_float() * 10.0,
                }
            })
            .collect()
    }

    #[test]
    fn empty_emitter_set_yields_no_tree() {
        assert!(LightTree::build(Vec::new()).is_none());
    }

    #[test]
    fn single_emitter_always_selected_with_pdf_one() {
        let mut rng = Rng::new(1, 1);
        let tree = LightTree::build(sample_emitters(1, &mut rng)).unwrap();
        let p = Point3f::new(0.0, 0.0, 0.0);
        let (idx, pdf) = tree.sample(&p, 0.37).unwrap();
        assert_eq!(idx, 0);
        assert!((pdf - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pdf_matches_sample_traversal() {
        let mut rng = Rng::new(7, 3);
        let tree = LightTree::build(sample_emitters(64, &mut rng)).unwrap();
        let p = Point3f::new(3.0, 4.0, 5.0);
        for _ in 0..10_000 {
            let u = rng.uniform_float();
            let (idx, pdf) = tree.sample(&p, u).unwrap();
            let replayed = tree.pdf(&p, idx);
            assert!(
                (pdf - replayed).abs() < 1e-5,
                "sample pdf {pdf} != replayed pdf {replayed} for emitter {idx}"
            );
        }
    }
}
