use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{self, Ray};
use parry3d::shape::SharedShape;

use super::collision::{ChannelMask, ObjectType, QueryFilter};
use super::trace::{HitResult, SurfaceId, SweepShape};
use super::CollisionQuery;

/// Coarse march step never drops below this (cm)
const MIN_SWEEP_STEP: f32 = 1.0;

/// Bisection passes used to refine a sweep hit
const REFINE_ITERATIONS: u32 = 16;

/// Extra distance allowed when recovering the contact at a refined hit
const CONTACT_PREDICTION: f32 = 1.0;

/// Surfaces closer than this at the start of a sweep count as touching, and
/// overlap tests shrink the query shape by this much
const CONTACT_SKIN: f32 = 0.1;

/// Minimum approach rate (cos of angle) for a touching surface to block
const APPROACH_EPSILON: f32 = 1e-4;

/// A collidable surface in the world
#[derive(Clone)]
pub struct Surface {
    id: SurfaceId,
    shape: SharedShape,
    transform: Isometry<Real>,
    blocks: ChannelMask,
    object_type: ObjectType,
}

impl Surface {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn location(&self) -> Vec3 {
        let t = self.transform.translation.vector;
        Vec3::new(t.x, t.y, t.z)
    }

    pub fn blocks(&self) -> ChannelMask {
        self.blocks
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("location", &self.location())
            .field("blocks", &self.blocks)
            .field("object_type", &self.object_type)
            .finish()
    }
}

/// Static and movable level geometry answering sweeps and overlaps with parry3d.
///
/// A capsule resting on a floor can slide along it: surfaces touched at the
/// start of a sweep only block motion that pushes into them.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    surfaces: Vec<Surface>,
    next_id: u32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box of world geometry
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, blocks: ChannelMask) -> SurfaceId {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.add_surface(shape, center, blocks, ObjectType::WorldStatic)
    }

    /// Add another character's capsule
    pub fn add_pawn(&mut self, center: Vec3, radius: f32, half_height: f32) -> SurfaceId {
        let shape = capsule_shape(radius, half_height);
        self.add_surface(shape, center, ChannelMask::ALL, ObjectType::Pawn)
    }

    pub fn add_surface(
        &mut self,
        shape: SharedShape,
        center: Vec3,
        blocks: ChannelMask,
        object_type: ObjectType,
    ) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.push(Surface {
            id,
            shape,
            transform: to_isometry(center),
            blocks,
            object_type,
        });
        id
    }

    /// Move a surface. Returns false if it does not exist.
    pub fn set_surface_location(&mut self, id: SurfaceId, center: Vec3) -> bool {
        let Some(surface) = self.surfaces.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        surface.transform = to_isometry(center);
        true
    }

    pub fn remove_surface(&mut self, id: SurfaceId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.id != id);
        self.surfaces.len() != before
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    fn accepted<'a>(&'a self, filter: &'a QueryFilter) -> impl Iterator<Item = &'a Surface> + 'a {
        self.surfaces
            .iter()
            .filter(move |s| filter.accepts(s.id, s.blocks, s.object_type))
    }

    fn ray_trace(&self, start: Vec3, delta: Vec3, filter: &QueryFilter) -> Option<HitResult> {
        if delta.length_squared() <= f32::EPSILON {
            return None;
        }

        let ray = Ray::new(
            Point::new(start.x, start.y, start.z),
            Vector::new(delta.x, delta.y, delta.z),
        );

        let mut best: Option<(f32, &Surface)> = None;
        for surface in self.accepted(filter) {
            let Some(toi) = surface.shape.cast_ray(&surface.transform, &ray, 1.0, true) else {
                continue;
            };
            if best.map_or(true, |(best_toi, _)| toi < best_toi) {
                best = Some((toi, surface));
            }
        }

        let (toi, surface) = best?;
        let normal = surface
            .shape
            .cast_ray_and_get_normal(&surface.transform, &ray, 1.0, true)
            .map(|hit| Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z))
            .filter(|n| n.length_squared() > f32::EPSILON)
            .unwrap_or(-delta.normalize_or_zero());

        let point = start + delta * toi;
        Some(HitResult::new(toi, point, point, normal, surface.id))
    }

    fn shape_sweep(&self, start: Vec3, delta: Vec3, shape: SweepShape, filter: &QueryFilter) -> Option<HitResult> {
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return None;
        }

        let query_shape = match to_shared_shape(shape, 0.0) {
            Some(s) => s,
            None => return self.ray_trace(start, delta, filter),
        };

        // Surfaces already in contact block at once when the move pushes into
        // them and are skipped when it slides along or away from them
        let mut candidates: Vec<&Surface> = Vec::new();
        let mut immediate: Option<(f32, HitResult)> = None;
        for surface in self.accepted(filter) {
            let contact = query::contact(
                &to_isometry(start),
                &*query_shape,
                &surface.transform,
                &*surface.shape,
                CONTACT_SKIN,
            )
            .ok()
            .flatten();

            let Some(c) = contact else {
                candidates.push(surface);
                continue;
            };

            let normal = Vec3::new(c.normal2.x, c.normal2.y, c.normal2.z);
            let approach = normal.dot(delta / distance);
            if approach < -APPROACH_EPSILON && immediate.as_ref().map_or(true, |(best, _)| approach < *best) {
                let point = Vec3::new(c.point2.x, c.point2.y, c.point2.z);
                immediate = Some((approach, HitResult::new(0.0, start, point, normal, surface.id)));
            }
        }
        if let Some((_, hit)) = immediate {
            return Some(hit);
        }
        if candidates.is_empty() {
            return None;
        }

        // Coarse march so thin geometry is not skipped, then bisect the blocked step
        let step = (shape.min_extent() * 0.5).max(MIN_SWEEP_STEP);
        let steps = (distance / step).ceil().max(1.0) as u32;
        let mut free = 0.0;

        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let Some(mut blocker) = first_overlap(&query_shape, start + delta * t, &candidates) else {
                free = t;
                continue;
            };

            let mut blocked = t;
            for _ in 0..REFINE_ITERATIONS {
                let mid = (free + blocked) * 0.5;
                match first_overlap(&query_shape, start + delta * mid, &candidates) {
                    Some(surface) => {
                        blocked = mid;
                        blocker = surface;
                    }
                    None => free = mid,
                }
            }

            let location = start + delta * free;
            let prediction = (blocked - free) * distance + CONTACT_PREDICTION;
            let contact = query::contact(
                &to_isometry(location),
                &*query_shape,
                &blocker.transform,
                &*blocker.shape,
                prediction,
            )
            .ok()
            .flatten();

            let (impact_point, impact_normal) = match contact {
                Some(c) => (
                    Vec3::new(c.point2.x, c.point2.y, c.point2.z),
                    Vec3::new(c.normal2.x, c.normal2.y, c.normal2.z),
                ),
                None => (location, -delta / distance),
            };

            return Some(HitResult::new(free, location, impact_point, impact_normal, blocker.id));
        }

        None
    }
}

impl CollisionQuery for CollisionWorld {
    fn sweep(&self, start: Vec3, end: Vec3, shape: SweepShape, filter: &QueryFilter) -> Option<HitResult> {
        match shape {
            SweepShape::Line => self.ray_trace(start, end - start, filter),
            _ => self.shape_sweep(start, end - start, shape, filter),
        }
    }

    fn overlap_blocking(&self, center: Vec3, shape: SweepShape, filter: &QueryFilter) -> bool {
        let Some(query_shape) = to_shared_shape(shape, CONTACT_SKIN) else {
            return false;
        };
        self.accepted(filter).any(|s| intersects(&query_shape, center, s))
    }

    fn surface_location(&self, surface: SurfaceId) -> Option<Vec3> {
        self.surface(surface).map(Surface::location)
    }
}

fn to_isometry(p: Vec3) -> Isometry<Real> {
    Isometry::translation(p.x, p.y, p.z)
}

fn capsule_shape(radius: f32, half_height: f32) -> SharedShape {
    SharedShape::capsule_z((half_height - radius).max(0.0), radius)
}

/// parry shape for a sweep shape, shrunk by `skin` on every side
fn to_shared_shape(shape: SweepShape, skin: f32) -> Option<SharedShape> {
    match shape {
        SweepShape::Line => None,
        SweepShape::Sphere { radius } => Some(SharedShape::ball((radius - skin).max(skin))),
        SweepShape::Capsule { radius, half_height } => Some(capsule_shape(
            (radius - skin).max(skin),
            (half_height - skin).max(skin),
        )),
    }
}

fn intersects(shape: &SharedShape, center: Vec3, surface: &Surface) -> bool {
    query::intersection_test(&to_isometry(center), &**shape, &surface.transform, &*surface.shape)
        .unwrap_or(false)
}

fn first_overlap<'a>(shape: &SharedShape, center: Vec3, candidates: &[&'a Surface]) -> Option<&'a Surface> {
    candidates.iter().copied().find(|s| intersects(shape, center, s))
}
