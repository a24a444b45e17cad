//! In-memory physics collaborator
//!
//! Spheres under gravity against static boxes and each other. Good enough to
//! drive the demo and end-to-end tests: it reports contact *enter* events the
//! way a real engine would, and nothing more. Iteration is by handle order so
//! runs are reproducible.

use std::collections::{BTreeMap, BTreeSet};

use glam::{Quat, Vec3};

use crate::sim::arena::SeedId;
use crate::sim::body::{
    BodyHandle, BodySpec, Contact, ContactReport, PhysicsWorld, Trigger, Velocity,
};

/// Earth-ish gravity
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
/// Fraction of tangential velocity kept per second while resting on a surface
const SURFACE_FRICTION: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxBody {
    pub owner: SeedId,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Velocity,
    pub radius: f32,
    pub kinematic: bool,
}

/// Static geometry category
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderKind {
    Solid(Contact),
    Trigger(Trigger),
}

/// Axis-aligned static box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    pub min: Vec3,
    pub max: Vec3,
    pub kind: ColliderKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Touch {
    Collider(usize),
    Body(BodyHandle),
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    bodies: BTreeMap<BodyHandle, SandboxBody>,
    colliders: Vec<StaticCollider>,
    pub gravity: Vec3,
    /// Play volume; bodies leaving it are reported once as out of play
    pub bounds: (Vec3, Vec3),
    touching: BTreeSet<(BodyHandle, Touch)>,
    reported_out: BTreeSet<BodyHandle>,
    next_handle: u32,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Empty world, no static geometry
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            colliders: Vec::new(),
            gravity: GRAVITY,
            bounds: (Vec3::splat(-50.0), Vec3::splat(50.0)),
            touching: BTreeSet::new(),
            reported_out: BTreeSet::new(),
            next_handle: 0,
        }
    }

    /// Floor, a raised basket in front of the spawn point and a scoring
    /// volume over the basket floor
    pub fn basket() -> Self {
        let mut world = Self::new();
        world.bounds = (Vec3::new(-10.0, -5.0, -10.0), Vec3::new(10.0, 20.0, 20.0));
        world.add_collider(StaticCollider {
            min: Vec3::new(-10.0, -1.0, -10.0),
            max: Vec3::new(10.0, 0.0, 20.0),
            kind: ColliderKind::Solid(Contact::Ground),
        });
        // Basket floor and rim
        world.add_collider(StaticCollider {
            min: Vec3::new(-1.0, 0.3, 1.2),
            max: Vec3::new(1.0, 0.5, 3.2),
            kind: ColliderKind::Solid(Contact::Other),
        });
        for (min, max) in [
            (Vec3::new(-1.1, 0.3, 1.2), Vec3::new(-1.0, 1.1, 3.2)),
            (Vec3::new(1.0, 0.3, 1.2), Vec3::new(1.1, 1.1, 3.2)),
            (Vec3::new(-1.1, 0.3, 3.2), Vec3::new(1.1, 1.1, 3.3)),
            (Vec3::new(-1.1, 0.3, 1.1), Vec3::new(1.1, 0.8, 1.2)),
        ] {
            world.add_collider(StaticCollider {
                min,
                max,
                kind: ColliderKind::Solid(Contact::Other),
            });
        }
        world.add_collider(StaticCollider {
            min: Vec3::new(-1.0, 0.5, 1.2),
            max: Vec3::new(1.0, 1.1, 3.2),
            kind: ColliderKind::Trigger(Trigger::Scoreable),
        });
        world
    }

    pub fn add_collider(&mut self, collider: StaticCollider) -> usize {
        self.colliders.push(collider);
        self.colliders.len() - 1
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&SandboxBody> {
        self.bodies.get(&handle)
    }

    pub fn is_kinematic(&self, handle: BodyHandle) -> bool {
        self.bodies.get(&handle).is_some_and(|b| b.kinematic)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Integrate one step and report new contacts
    pub fn step(&mut self, dt: f32) -> Vec<ContactReport> {
        let mut reports = Vec::new();
        let mut touching = BTreeSet::new();

        for body in self.bodies.values_mut().filter(|b| !b.kinematic) {
            body.velocity.linear += self.gravity * dt;
            body.position += body.velocity.linear * dt;
            let spin = body.velocity.angular * dt;
            if spin != Vec3::ZERO {
                body.rotation = (Quat::from_scaled_axis(spin) * body.rotation).normalize();
            }
        }

        for (&handle, body) in self.bodies.iter_mut() {
            for (index, collider) in self.colliders.iter().enumerate() {
                let closest = body.position.clamp(collider.min, collider.max);
                let delta = body.position - closest;
                let dist = delta.length();
                if dist >= body.radius {
                    continue;
                }

                let key = (handle, Touch::Collider(index));
                let entered = !self.touching.contains(&key);
                touching.insert(key);

                match collider.kind {
                    ColliderKind::Trigger(other) => {
                        if entered {
                            reports.push(ContactReport::TriggerEnter {
                                seed: body.owner,
                                other,
                            });
                        }
                    }
                    ColliderKind::Solid(other) => {
                        if !body.kinematic {
                            let normal = if dist > f32::EPSILON {
                                delta / dist
                            } else {
                                Vec3::Y
                            };
                            body.position = closest + normal * body.radius;
                            let vn = body.velocity.linear.dot(normal);
                            if vn < 0.0 {
                                body.velocity.linear -= normal * vn;
                            }
                            let keep = SURFACE_FRICTION.powf(dt);
                            body.velocity.linear *= keep;
                            body.velocity.angular *= keep;
                        }
                        if entered {
                            reports.push(ContactReport::Collision {
                                seed: body.owner,
                                other,
                            });
                        }
                    }
                }
            }
        }

        let handles: Vec<BodyHandle> = self.bodies.keys().copied().collect();
        for (i, &ha) in handles.iter().enumerate() {
            for &hb in &handles[i + 1..] {
                let (Some(&a), Some(&b)) = (self.bodies.get(&ha), self.bodies.get(&hb)) else {
                    continue;
                };
                let delta = b.position - a.position;
                let dist = delta.length();
                let reach = a.radius + b.radius;
                if dist >= reach {
                    continue;
                }

                let (a, b) = separate(a, b, delta, dist, reach);
                self.bodies.insert(ha, a);
                self.bodies.insert(hb, b);

                let key_a = (ha, Touch::Body(hb));
                let key_b = (hb, Touch::Body(ha));
                let entered = !self.touching.contains(&key_a);
                touching.insert(key_a);
                touching.insert(key_b);
                if entered {
                    for (seed, other) in [(a.owner, b.owner), (b.owner, a.owner)] {
                        reports.push(ContactReport::Collision {
                            seed,
                            other: Contact::Seed(other),
                        });
                        reports.push(ContactReport::TriggerEnter {
                            seed,
                            other: Trigger::Seed(other),
                        });
                    }
                }
            }
        }
        self.touching = touching;

        let (lo, hi) = self.bounds;
        for (&handle, body) in &self.bodies {
            let inside = body.position.cmpge(lo).all() && body.position.cmple(hi).all();
            if !inside && self.reported_out.insert(handle) {
                reports.push(ContactReport::OutOfPlay { seed: body.owner });
            }
        }

        reports
    }
}

/// Push two overlapping spheres apart and equalize their normal velocity
fn separate(
    mut a: SandboxBody,
    mut b: SandboxBody,
    delta: Vec3,
    dist: f32,
    reach: f32,
) -> (SandboxBody, SandboxBody) {
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec3::Y };
    let overlap = reach - dist;
    let (share_a, share_b) = match (a.kinematic, b.kinematic) {
        (true, true) => return (a, b),
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        (false, false) => (0.5, 0.5),
    };
    a.position -= normal * overlap * share_a;
    b.position += normal * overlap * share_b;

    let closing = (b.velocity.linear - a.velocity.linear).dot(normal);
    if closing < 0.0 {
        a.velocity.linear += normal * closing * share_a;
        b.velocity.linear -= normal * closing * share_b;
    }
    (a, b)
}

impl PhysicsWorld for SandboxWorld {
    fn create_body(&mut self, spec: BodySpec) -> Option<BodyHandle> {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            SandboxBody {
                owner: spec.owner,
                position: spec.position,
                rotation: spec.rotation,
                velocity: Velocity::ZERO,
                radius: spec.radius,
                kinematic: spec.kinematic,
            },
        );
        Some(handle)
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
        self.touching.retain(|(h, touch)| *h != body && *touch != Touch::Body(body));
        self.reported_out.remove(&body);
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> bool {
        match self.bodies.get_mut(&body) {
            Some(b) => {
                b.position = position;
                true
            }
            None => false,
        }
    }

    fn velocity(&self, body: BodyHandle) -> Option<Velocity> {
        self.bodies.get(&body).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Velocity) -> bool {
        match self.bodies.get_mut(&body) {
            Some(b) => {
                b.velocity = velocity;
                true
            }
            None => false,
        }
    }

    fn set_kinematic(&mut self, body: BodyHandle, kinematic: bool) -> bool {
        match self.bodies.get_mut(&body) {
            Some(b) => {
                b.kinematic = kinematic;
                if kinematic {
                    b.velocity = Velocity::ZERO;
                }
                true
            }
            None => false,
        }
    }

    /// Unit mass: the impulse is the velocity change. Frozen bodies ignore it.
    fn apply_impulse(&mut self, body: BodyHandle, direction: Vec3, magnitude: f32) -> bool {
        match self.bodies.get_mut(&body) {
            Some(b) if !b.kinematic => {
                b.velocity.linear += direction.normalize_or_zero() * magnitude;
                true
            }
            _ => false,
        }
    }
}
