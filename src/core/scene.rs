//! Scene container: owns the flat primitive array and the acceleration
//! structures built over it (SPEC_FULL.md section 3, "[ADD] Scene
//! container").
//!
//! Scene-file parsing is out of scope (spec section 6, "the scene is
//! supplied as a pre-parsed object graph"); this type is the minimal
//! owner of that already-parsed graph the integrator needs to borrow
//! from.

use std::collections::HashSet;
use std::sync::Arc;

use crate::accelerators::bvh::{Bvh, BvhBuildPrimitive};
use crate::bsdfs::{BsdfKind, ScatterModel};
use crate::core::error::{PrepareReport, SetupDiagnostic};
use crate::core::geometry::{luminance, Bounds3f, Ray};
use crate::core::interaction::{IntersectionInfo, IntersectionTemporary};
use crate::lights::light_tree::Emitter;
use crate::lights::LightTree;
use crate::shapes::{Primitive, Shape};

/// Default leaf size passed to the BVH builder; small enough to keep
/// leaf intersection cost low, matching the constant the teacher's own
/// BVH construction defaults to.
const MAX_PRIMS_PER_LEAF: usize = 4;

pub struct Scene {
    primitives: Vec<Primitive>,
    bvh: Bvh,
    infinite_primitives: Vec<u32>,
    light_tree: Option<LightTree>,
}

impl Scene {
    /// Builds the BVH and light tree over `primitives`. Acceleration
    /// structures are built eagerly here rather than lazily, since the
    /// scene is read-only for the rest of the render once constructed
    /// (spec section 5, "read-only after prepareForRender").
    pub fn new(primitives: Vec<Primitive>) -> Self {
        let mut infinite_primitives = Vec::new();
        let mut build_prims = Vec::with_capacity(primitives.len());
        let mut emitters = Vec::new();
        for (i, primitive) in primitives.iter().enumerate() {
            let id = i as u32;
            if primitive.shape.is_infinite() {
                infinite_primitives.push(id);
            } else {
                build_prims.push(BvhBuildPrimitive::new(id, primitive.world_bound()));
            }
            if primitive.is_samplable() {
                if let Some(emission) = primitive.emission {
                    let power = luminance(&emission) * primitive.shape.area();
                    if power > 0.0 {
                        emitters.push(Emitter { primitive_index: id, bounds: primitive.world_bound(), power });
                    }
                }
            }
        }
        let light_count = emitters.len();
        let bvh = Bvh::build(build_prims, MAX_PRIMS_PER_LEAF);
        let light_tree = LightTree::build(emitters);
        log::debug!(
            "scene prepared: {} primitives, {} infinite, {} emitters",
            primitives.len(),
            infinite_primitives.len(),
            light_count
        );
        Scene { primitives, bvh, infinite_primitives, light_tree }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn primitive(&self, index: u32) -> &Primitive {
        &self.primitives[index as usize]
    }

    pub fn infinite_primitives(&self) -> &[u32] {
        &self.infinite_primitives
    }

    pub fn light_tree(&self) -> Option<&LightTree> {
        self.light_tree.as_ref()
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.bvh.world_bound()
    }

    /// One-shot setup diagnostics pass (spec section 7, tier 3), and the
    /// call site for the spec's named `BSDF.prepareForRender()` operation
    /// (spec section 6). Most variants' own precomputation already runs
    /// eagerly in their constructor (DESIGN.md, "prepareForRender" open
    /// question), so `Bsdf::prepare_for_render` is a no-op for them, but
    /// it is still invoked once per unique `Bsdf` here so a future variant
    /// that needs deferred setup has a live call site rather than a
    /// second parallel mechanism. The rest of this pass collects the
    /// fallback BSDFs a scene builder already substituted in for a
    /// resource that failed to resolve (`BsdfKind::Error`), surfaced once
    /// instead of silently.
    pub fn prepare_for_render(&mut self) -> PrepareReport {
        let mut report = PrepareReport::default();
        let mut seen = HashSet::new();
        for (i, primitive) in self.primitives.iter().enumerate() {
            let ptr = Arc::as_ptr(&primitive.bsdf) as usize;
            if !seen.insert(ptr) {
                continue;
            }
            primitive.bsdf.prepare_for_render();
            if let BsdfKind::Error(_) = primitive.bsdf.kind {
                report.push(SetupDiagnostic::MissingTexture {
                    name: format!("primitive[{i}]"),
                    reason: "bound to the fallback error BSDF before the scene was constructed".to_string(),
                });
            }
        }
        report
    }

    /// Tightens `ray.t_far` to the closest hit, if any, and returns the
    /// realized `IntersectionInfo` with `primitive_index` corrected to
    /// the realized primitive (spec section 6, `intersect`/
    /// `intersectionInfo`).
    pub fn intersect(&self, ray: &mut Ray) -> Option<(u32, IntersectionInfo)> {
        let mut scratch = IntersectionTemporary::default();
        let hit_id = self.bvh.intersect(ray, |id, ray| {
            let primitive = &self.primitives[id as usize];
            match primitive.intersect(ray) {
                Some(data) => {
                    scratch.primitive_index = Some(id);
                    scratch.data = data;
                    true
                }
                None => false,
            }
        })?;
        debug_assert_eq!(scratch.primitive_index, Some(hit_id));
        let primitive = &self.primitives[hit_id as usize];
        let mut info = primitive.intersection_info(ray, &scratch.data);
        info.primitive_index = hit_id;
        Some((hit_id, info))
    }

    /// Binary visibility query; stops at the first occluder (spec
    /// section 6, `occluded`).
    pub fn occluded(&self, ray: &Ray) -> bool {
        self.bvh.occluded(ray, |id, ray| self.primitives[id as usize].occluded(ray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdfs::{Bsdf, BsdfKind, Lambert};
    use crate::core::geometry::{Point3f, Spectrum, Vector3f};
    use crate::shapes::{ShapeKind, Sphere};

    fn lambert_bsdf() -> Arc<Bsdf> {
        Arc::new(Bsdf::new(BsdfKind::Lambert(Lambert { albedo: Spectrum::new(0.5, 0.5, 0.5) })))
    }

    #[test]
    fn intersect_reports_correct_primitive_index() {
        let primitives = vec![
            Primitive::new(ShapeKind::Sphere(Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0)), lambert_bsdf()),
            Primitive::new(ShapeKind::Sphere(Sphere::new(Point3f::new(0.0, 0.0, -5.0), 1.0)), lambert_bsdf()),
        ];
        let scene = Scene::new(primitives);
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        let (id, info) = scene.intersect(&mut ray).unwrap();
        assert_eq!(id, 0);
        assert_eq!(info.primitive_index, 0);
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::new(Vec::new());
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(scene.intersect(&mut ray).is_none());
        assert!(!scene.occluded(&ray));
    }

    #[test]
    fn occluded_sphere_blocks_ray() {
        let primitives = vec![Primitive::new(
            ShapeKind::Sphere(Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0)),
            lambert_bsdf(),
        )];
        let scene = Scene::new(primitives);
        let ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(scene.occluded(&ray));
    }

    #[test]
    fn emissive_primitive_produces_a_light_tree() {
        let primitives = vec![Primitive::new(
            ShapeKind::Sphere(Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0)),
            lambert_bsdf(),
        )
        .with_emission(Spectrum::new(5.0, 5.0, 5.0))];
        let scene = Scene::new(primitives);
        assert!(scene.light_tree().is_some());
    }
}
