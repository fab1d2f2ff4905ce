//! Packed binary BVH over a primitive set, built with the surface-area
//! heuristic (spec section 4.1).
//!
//! The contract is deliberately decoupled from `shapes::Primitive`: the
//! builder only ever sees `(AABB, centroid, opaque id)` triples, and
//! traversal only ever calls back into a caller-supplied intersector
//! closure per visited leaf primitive (spec section 4.1, "Contract").
//! `core::scene::Scene` is the thing that actually binds `u32` ids back
//! to `shapes::Primitive`.

use smallvec::SmallVec;

use crate::core::geometry::{bnd3_union_bnd3f, bnd3_union_pnt3f, Bounds3f, Point3f, Ray, Vector3f};
use crate::core::pbrt::Float;

/// One input triple to the builder (spec section 4.1, "Contract").
#[derive(Debug, Copy, Clone)]
pub struct BvhBuildPrimitive {
    pub id: u32,
    pub bounds: Bounds3f,
    pub centroid: Point3f,
}

impl BvhBuildPrimitive {
    pub fn new(id: u32, bounds: Bounds3f) -> Self {
        debug_assert!(
            !bounds.p_min.has_nans() && !bounds.p_max.has_nans(),
            "BVH primitive {id} has a NaN in its geometric bounds"
        );
        let mut centroid = bounds.p_min * 0.5 + bounds.p_max * 0.5 - Point3f::default() * 0.5;
        // A NaN centroid (e.g. from a degenerate transform) is clamped to
        // the geometric bounds rather than propagated (spec section 4.1,
        // "Failure semantics").
        if centroid.x.is_nan() {
            centroid.x = bounds.p_min.x;
        }
        if centroid.y.is_nan() {
            centroid.y = bounds.p_min.y;
        }
        if centroid.z.is_nan() {
            centroid.z = bounds.p_min.z;
        }
        BvhBuildPrimitive { id, bounds, centroid }
    }
}

const N_BINS: usize = 32;
/// Recursion switches from exhaustive sweep-SAH to binned SAH above this
/// primitive count (spec section 4.1, "Build algorithm").
const EXHAUSTIVE_SWEEP_LIMIT: usize = 64;
/// Outer recursion is handed to the thread pool above this count (spec
/// section 4.1, "Larger: ... outer recursion is parallelized for
/// subtrees above a 32k-primitive threshold").
const PARALLEL_SPLIT_THRESHOLD: usize = 32_000;
const TRAVERSAL_COST: Float = 1.0;
const INTERSECT_COST: Float = 1.0;

#[derive(Debug, Clone)]
enum BuildNode {
    Leaf {
        bounds: Bounds3f,
        count: u32,
    },
    Interior {
        bounds: Bounds3f,
        axis: u8,
        left: Box<BuildNode>,
        right: Box<BuildNode>,
    },
}

impl BuildNode {
    fn bounds(&self) -> Bounds3f {
        match self {
            BuildNode::Leaf { bounds, .. } => *bounds,
            BuildNode::Interior { bounds, .. } => *bounds,
        }
    }
}

fn axis_of(p: &Point3f, axis: u8) -> Float {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

/// Candidate split found by either SAH strategy: which axis, how many
/// primitives end up on the left, and its SAH cost (in units of
/// `INTERSECT_COST`, comparable to `n as Float` for the leaf cost).
struct Split {
    axis: u8,
    left_count: usize,
    cost: Float,
}

/// Exhaustive O(n log n) sweep: sort by centroid along each of the 3
/// axes, prefix/suffix-sum child areas from each end, evaluate every
/// split (spec section 4.1, "<= 64 primitives").
fn sweep_sah(infos: &mut [BvhBuildPrimitive], node_area: Float) -> Option<Split> {
    let n = infos.len();
    let mut best: Option<Split> = None;
    let mut scratch = infos.to_vec();
    for axis in 0..3u8 {
        scratch.copy_from_slice(infos);
        scratch.sort_by(|a, b| axis_of(&a.centroid, axis).partial_cmp(&axis_of(&b.centroid, axis)).unwrap());
        let mut area_l = vec![0.0 as Float; n + 1];
        let mut area_r = vec![0.0 as Float; n + 1];
        let mut b = Bounds3f::default();
        for i in 0..n {
            b = bnd3_union_bnd3f(&b, &scratch[i].bounds);
            area_l[i + 1] = b.surface_area();
        }
        b = Bounds3f::default();
        for i in (0..n).rev() {
            b = bnd3_union_bnd3f(&b, &scratch[i].bounds);
            area_r[i] = b.surface_area();
        }
        for split in 1..n {
            let cost = TRAVERSAL_COST
                + (area_l[split] * split as Float + area_r[split] * (n - split) as Float) * INTERSECT_COST
                    / node_area.max(1e-12);
            if best.as_ref().map_or(true, |s| cost < s.cost) {
                best = Some(Split { axis, left_count: split, cost });
            }
        }
    }
    if let Some(s) = &best {
        infos.sort_by(|a, b| axis_of(&a.centroid, s.axis).partial_cmp(&axis_of(&b.centroid, s.axis)).unwrap());
    }
    best
}

#[derive(Clone, Copy)]
struct Bin {
    count: usize,
    bounds: Bounds3f,
}

impl Default for Bin {
    fn default() -> Self {
        Bin { count: 0, bounds: Bounds3f::default() }
    }
}

/// Binned SAH with 32 bins along the chosen axis (spec section 4.1,
/// "<= ~10^6 primitives" and the larger tier, which this crate folds
/// into the same binned pass -- see DESIGN.md).
fn binned_sah(infos: &mut [BvhBuildPrimitive], centroid_bounds: &Bounds3f, node_area: Float, axis: u8) -> Option<Split> {
    let n = infos.len();
    let extent = axis_of(&centroid_bounds.p_max, axis) - axis_of(&centroid_bounds.p_min, axis);
    if extent <= 0.0 {
        return None;
    }
    let bin_of = |c: &Point3f| -> usize {
        let o = (axis_of(c, axis) - axis_of(&centroid_bounds.p_min, axis)) / extent;
        ((o * N_BINS as Float) as usize).min(N_BINS - 1)
    };
    let mut bins = [Bin::default(); N_BINS];
    for info in infos.iter() {
        let b = bin_of(&info.centroid);
        bins[b].count += 1;
        bins[b].bounds = bnd3_union_bnd3f(&bins[b].bounds, &info.bounds);
    }
    let mut area_l = [0.0 as Float; N_BINS];
    let mut count_l = [0usize; N_BINS];
    let mut b = Bounds3f::default();
    let mut c = 0usize;
    for i in 0..N_BINS {
        b = bnd3_union_bnd3f(&b, &bins[i].bounds);
        c += bins[i].count;
        area_l[i] = b.surface_area();
        count_l[i] = c;
    }
    let mut area_r = [0.0 as Float; N_BINS];
    let mut count_r = [0usize; N_BINS];
    b = Bounds3f::default();
    c = 0;
    for i in (0..N_BINS).rev() {
        b = bnd3_union_bnd3f(&b, &bins[i].bounds);
        c += bins[i].count;
        area_r[i] = b.surface_area();
        count_r[i] = c;
    }
    let mut best: Option<Split> = None;
    for split_bin in 0..N_BINS - 1 {
        let nl = count_l[split_bin];
        let nr = count_r[split_bin + 1];
        if nl == 0 || nr == 0 {
            continue;
        }
        let cost = TRAVERSAL_COST
            + (area_l[split_bin] * nl as Float + area_r[split_bin + 1] * nr as Float) * INTERSECT_COST
                / node_area.max(1e-12);
        if best.as_ref().map_or(true, |s| cost < s.cost) {
            best = Some(Split { axis, left_count: nl, cost });
        }
    }
    let best = best?;
    // Stable partition by bin index relative to the winning bucket so
    // `left_count` primitives land in `infos[..left_count]`.
    let split_bin = {
        // Re-derive which bin boundary the winning left_count corresponds
        // to: smallest prefix count_l[i] >= left_count.
        (0..N_BINS - 1).find(|&i| count_l[i] >= best.left_count).unwrap_or(N_BINS - 2)
    };
    infos.sort_by_key(|info| bin_of(&info.centroid) > split_bin);
    Some(best)
}

/// Builds one subtree over `infos`, partitioning it in place so that on
/// return the slice is ordered to match the tree's leaf traversal order
/// (left subtree occupies the first primitives, right subtree the
/// rest, recursively -- see the module doc for why this lets `flatten`
/// assign leaf offsets with a single running counter).
fn build_range(infos: &mut [BvhBuildPrimitive], max_prims_per_leaf: usize) -> BuildNode {
    let n = infos.len();
    let bounds = infos.iter().fold(Bounds3f::default(), |acc, p| bnd3_union_bnd3f(&acc, &p.bounds));
    if n <= 1 {
        return BuildNode::Leaf { bounds, count: n as u32 };
    }

    let centroid_bounds = infos.iter().fold(Bounds3f::default(), |acc, p| bnd3_union_pnt3f(&acc, &p.centroid));
    let dim = centroid_bounds.maximum_extent();
    let node_area = bounds.surface_area();
    let must_split = n > max_prims_per_leaf;
    let leaf_cost = n as Float;

    let split = if n <= EXHAUSTIVE_SWEEP_LIMIT {
        sweep_sah(infos, node_area)
    } else {
        binned_sah(infos, &centroid_bounds, node_area, dim)
    };

    let chosen = match split {
        Some(s) if s.cost < leaf_cost || must_split => Some((s.axis, s.left_count)),
        _ => {
            if must_split {
                // Degenerate-span fallback (spec section 4.1): split at
                // the midpoint along the longest geometric-AABB axis,
                // partitioning by primitive id rather than position.
                let axis = bounds.maximum_extent();
                let mid = n / 2;
                infos.select_nth_unstable_by_key(mid, |p| p.id);
                Some((axis, mid))
            } else {
                None
            }
        }
    };

    match chosen {
        None => BuildNode::Leaf { bounds, count: n as u32 },
        Some((axis, left_count)) => {
            let left_count = left_count.max(1).min(n - 1);
            let (left_slice, right_slice) = infos.split_at_mut(left_count);
            let (left, right) = if n > PARALLEL_SPLIT_THRESHOLD {
                rayon::join(
                    || build_range(left_slice, max_prims_per_leaf),
                    || build_range(right_slice, max_prims_per_leaf),
                )
            } else {
                (build_range(left_slice, max_prims_per_leaf), build_range(right_slice, max_prims_per_leaf))
            };
            BuildNode::Interior { bounds, axis, left: Box::new(left), right: Box::new(right) }
        }
    }
}

/// Collapses an interior node whose two children are both leaves back
/// into a single leaf when that is cheaper under the SAH cost model
/// (spec section 4.1, "After building, adjacent internal nodes whose
/// combined leaf-fit would have been better are collapsed").
fn collapse(node: BuildNode, max_prims_per_leaf: usize) -> BuildNode {
    match node {
        BuildNode::Leaf { .. } => node,
        BuildNode::Interior { bounds, axis, left, right } => {
            let left = collapse(*left, max_prims_per_leaf);
            let right = collapse(*right, max_prims_per_leaf);
            if let (BuildNode::Leaf { bounds: bl, count: cl }, BuildNode::Leaf { bounds: br, count: cr }) = (&left, &right) {
                let combined = cl + cr;
                if combined as usize <= max_prims_per_leaf {
                    let area = bounds.surface_area().max(1e-12);
                    let split_cost = TRAVERSAL_COST
                        + (bl.surface_area() * *cl as Float + br.surface_area() * *cr as Float) * INTERSECT_COST / area;
                    let leaf_cost = combined as Float;
                    if leaf_cost <= split_cost {
                        return BuildNode::Leaf { bounds, count: combined };
                    }
                }
            }
            BuildNode::Interior { bounds, axis, left: Box::new(left), right: Box::new(right) }
        }
    }
}

/// One 24-byte flattened node. The spec's packed 48-byte dual-child
/// SIMD layout (four bounds floats per axis, two children at once) is
/// approximated here by a portable scalar-per-node layout; see
/// DESIGN.md's "SIMD traversal" open question for the rationale.
#[derive(Debug, Clone, Copy)]
struct LinearBvhNode {
    bounds: Bounds3f,
    /// Leaf: offset into `Bvh::ordered_ids`. Interior: index of the
    /// second (far, in build order) child; the first child is always
    /// `self_index + 1`.
    offset: u32,
    n_primitives: u16,
    axis: u8,
}

fn flatten(node: &BuildNode, nodes: &mut Vec<LinearBvhNode>, leaf_cursor: &mut u32) -> u32 {
    let my_index = nodes.len() as u32;
    match node {
        BuildNode::Leaf { bounds, count } => {
            nodes.push(LinearBvhNode { bounds: *bounds, offset: *leaf_cursor, n_primitives: *count as u16, axis: 0 });
            *leaf_cursor += count;
        }
        BuildNode::Interior { bounds, axis, left, right } => {
            nodes.push(LinearBvhNode { bounds: *bounds, offset: 0, n_primitives: 0, axis: *axis });
            flatten(left, nodes, leaf_cursor);
            let second_child = flatten(right, nodes, leaf_cursor);
            nodes[my_index as usize].offset = second_child;
        }
    }
    my_index
}

/// Immutable, built BVH over a primitive set (spec section 4.1).
pub struct Bvh {
    nodes: Vec<LinearBvhNode>,
    ordered_ids: Vec<u32>,
    empty: bool,
}

impl Bvh {
    pub fn build(mut build_prims: Vec<BvhBuildPrimitive>, max_prims_per_leaf: usize) -> Self {
        if build_prims.is_empty() {
            // "Construction with an empty primitive set yields a single
            // dummy leaf whose traversal produces no hits" (spec 4.1).
            return Bvh { nodes: Vec::new(), ordered_ids: Vec::new(), empty: true };
        }
        let max_prims_per_leaf = max_prims_per_leaf.max(1).min(u16::MAX as usize);
        let root = build_range(&mut build_prims, max_prims_per_leaf);
        let root = collapse(root, max_prims_per_leaf);
        let mut nodes = Vec::new();
        let mut leaf_cursor = 0u32;
        flatten(&root, &mut nodes, &mut leaf_cursor);
        let ordered_ids = build_prims.iter().map(|p| p.id).collect();
        Bvh { nodes, ordered_ids, empty: false }
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.nodes.first().map(|n| n.bounds).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Front-to-back closest-hit traversal. `hit_fn` is invoked once per
    /// primitive in a visited leaf and is responsible for shrinking
    /// `ray.t_far`; the id of the last primitive it accepted is the
    /// closest hit, since `t_far` only ever shrinks. Returns that id, or
    /// `None` if nothing was hit.
    pub fn intersect(&self, ray: &mut Ray, mut hit_fn: impl FnMut(u32, &mut Ray) -> bool) -> Option<u32> {
        if self.empty {
            return None;
        }
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        let dir_is_neg = [inv_dir.x < 0.0, inv_dir.y < 0.0, inv_dir.z < 0.0];
        // Depth <= 2*(tree depth)+1, inline-capacity 64 so a typical tree
        // never touches the heap (spec section 4.1, "Traversal algorithm").
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        let mut current = 0u32;
        let mut closest = None;
        loop {
            let node = self.nodes[current as usize];
            if node.bounds.intersect_p(ray, &inv_dir).is_some() {
                if node.n_primitives > 0 {
                    for i in 0..node.n_primitives as u32 {
                        let id = self.ordered_ids[(node.offset + i) as usize];
                        if hit_fn(id, ray) {
                            closest = Some(id);
                        }
                    }
                    match stack.pop() {
                        Some(next) => current = next,
                        None => break,
                    }
                } else if dir_is_neg[node.axis as usize] {
                    stack.push(current + 1);
                    current = node.offset;
                } else {
                    stack.push(node.offset);
                    current += 1;
                }
            } else {
                match stack.pop() {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        closest
    }

    /// Occlusion traversal: returns as soon as `hit_fn` reports a hit.
    pub fn occluded(&self, ray: &Ray, mut hit_fn: impl FnMut(u32, &Ray) -> bool) -> bool {
        if self.empty {
            return false;
        }
        let ray = *ray;
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        let dir_is_neg = [inv_dir.x < 0.0, inv_dir.y < 0.0, inv_dir.z < 0.0];
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        let mut current = 0u32;
        loop {
            let node = self.nodes[current as usize];
            if node.bounds.intersect_p(&ray, &inv_dir).is_some() {
                if node.n_primitives > 0 {
                    for i in 0..node.n_primitives as u32 {
                        let id = self.ordered_ids[(node.offset + i) as usize];
                        if hit_fn(id, &ray) {
                            return true;
                        }
                    }
                    match stack.pop() {
                        Some(next) => current = next,
                        None => break,
                    }
                } else if dir_is_neg[node.axis as usize] {
                    stack.push(current + 1);
                    current = node.offset;
                } else {
                    stack.push(node.offset);
                    current += 1;
                }
            } else {
                match stack.pop() {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        false
    }

    /// Asserts the BVH invariants from spec section 8, property 6:
    /// every internal node's AABB contains both children's, every leaf's
    /// AABB contains its owned primitives, and `ordered_ids` is a
    /// permutation of `[0, n)`. Exposed for the test suite.
    #[cfg(test)]
    fn check_invariants(&self, prim_bounds: &[Bounds3f]) {
        fn visit(nodes: &[LinearBvhNode], idx: u32, ordered_ids: &[u32], prim_bounds: &[Bounds3f]) {
            let node = nodes[idx as usize];
            if node.n_primitives > 0 {
                for i in 0..node.n_primitives as u32 {
                    let id = ordered_ids[(node.offset + i) as usize] as usize;
                    let pb = prim_bounds[id];
                    assert!(node.bounds.p_min.x <= pb.p_min.x + 1e-4 && node.bounds.p_max.x >= pb.p_max.x - 1e-4);
                }
            } else {
                let left = idx + 1;
                let right = node.offset;
                let lb = nodes[left as usize].bounds;
                let rb = nodes[right as usize].bounds;
                assert!(node.bounds.p_min.x <= lb.p_min.x + 1e-4 && node.bounds.p_min.x <= rb.p_min.x + 1e-4);
                assert!(node.bounds.p_max.x >= lb.p_max.x - 1e-4 && node.bounds.p_max.x >= rb.p_max.x - 1e-4);
                visit(nodes, left, ordered_ids, prim_bounds);
                visit(nodes, right, ordered_ids, prim_bounds);
            }
        }
        if !self.nodes.is_empty() {
            visit(&self.nodes, 0, &self.ordered_ids, prim_bounds);
        }
        let mut seen: Vec<u32> = self.ordered_ids.clone();
        seen.sort_unstable();
        let expected: Vec<u32> = (0..prim_bounds.len() as u32).collect();
        assert_eq!(seen, expected, "ordered_ids must be a permutation of [0,n)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point3f;
    use crate::core::rng::Rng;

    fn cube_prims(n: usize, rng: &mut Rng) -> Vec<BvhBuildPrimitive> {
        (0..n)
            .map(|i| {
                let c = Point3f::new(rng.uniform_float(), rng.uniform_float(), rng.uniform_float());
                let r = 0.01;
                let bounds = Bounds3f::new(
                    Point3f::new(c.x - r, c.y - r, c.z - r),
                    Point3f::new(c.x + r, c.y + r, c.z + r),
                );
                BvhBuildPrimitive::new(i as u32, bounds)
            })
            .collect()
    }

    #[test]
    fn empty_bvh_has_no_hits() {
        let bvh = Bvh::build(Vec::new(), 4);
        assert!(bvh.is_empty());
        let mut ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(bvh.intersect(&mut ray, |_, _| true), None);
        assert!(!bvh.occluded(&ray, |_, _| true));
    }

    #[test]
    fn invariants_hold_for_random_scene() {
        let mut rng = Rng::new(11, 0);
        let prims = cube_prims(5000, &mut rng);
        let bounds: Vec<Bounds3f> = prims.iter().map(|p| p.bounds).collect();
        let bvh = Bvh::build(prims, 4);
        bvh.check_invariants(&bounds);
    }

    #[test]
    fn closest_hit_matches_brute_force() {
        let mut rng = Rng::new(5, 1);
        let n = 2000;
        let prims = cube_prims(n, &mut rng);
        let bounds: Vec<Bounds3f> = prims.iter().map(|p| p.bounds).collect();
        let bvh = Bvh::build(prims, 4);

        for _ in 0..200 {
            let o = Point3f::new(rng.uniform_float() * 2.0 - 0.5, rng.uniform_float() * 2.0 - 0.5, -2.0);
            let d = Vector3f::new(0.0, 0.0, 1.0);
            let mut ray = Ray::new(o, d);
            let inv_dir = Vector3f::new(1.0 / d.x, 1.0 / d.y, 1.0 / d.z);

            let mut brute_best: Option<(usize, Float)> = None;
            for (i, b) in bounds.iter().enumerate() {
                if let Some((t0, _)) = b.intersect_p(&ray, &inv_dir) {
                    if t0 >= ray.t_near && t0 < ray.t_far {
                        if brute_best.map_or(true, |(_, bt)| t0 < bt) {
                            brute_best = Some((i, t0));
                        }
                    }
                }
            }

            let bvh_hit = bvh.intersect(&mut ray, |id, r| {
                if let Some((t0, _)) = bounds[id as usize].intersect_p(r, &inv_dir) {
                    if t0 >= r.t_near && t0 < r.t_far {
                        r.t_far = t0;
                        return true;
                    }
                }
                false
            });

            match (brute_best, bvh_hit) {
                (None, None) => {}
                (Some((bi, bt)), Some(id)) => {
                    assert_eq!(bi as u32, id);
                    assert!((bt - ray.t_far).abs() <= 1e-5 * bt.max(1.0));
                }
                other => panic!("brute force / bvh disagreement: {other:?}"),
            }
        }
    }
}
