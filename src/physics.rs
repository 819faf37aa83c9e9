use std::num::NonZeroUsize;

use macroquad::prelude::*;
use rapier2d::crossbeam::channel;
use rapier2d::prelude::*;

use crate::coords::WorldConfig;

/// Handles for a body and its colliders
#[derive(Debug, Default, Clone)]
pub struct PhysicsHandle {
    pub body: RigidBodyHandle,
    pub colliders: Vec<ColliderHandle>
}

/// Properties for the body and colliders of an object
#[derive(Debug, Default, Clone)]
pub struct PhysicalProperties {
    pub body: RigidBodyBuilder,
    pub colliders: Vec<ColliderBuilder>
}

impl PhysicalProperties {
    pub fn new(body_type: RigidBodyType) -> Self {
        Self {
            body: RigidBodyBuilder::new(body_type),
            colliders: Vec::new()
        }
    }
    pub fn set_location(&mut self, location: Vector<Real>) {
        self.body = self.body.clone().translation(location);
    }
    pub fn set_rotation(&mut self, angle: f32) {
        self.body = self.body.clone().rotation(angle);
    }
    pub fn set_velocity(&mut self, velocity: Vector<Real>) {
        self.body = self.body.clone().linvel(velocity);
    }
}

/// Solver iteration counts, fixed for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverSettings {
    pub velocity_iterations: usize,
    pub position_iterations: usize
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self { velocity_iterations: 6, position_iterations: 2 }
    }
}

/// State of physics simulation
pub struct Physics {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub physics_pipeline: PhysicsPipeline,
    pub integration_parameters: IntegrationParameters,
    pub island_manager: IslandManager,
    pub broad_phase: Box<dyn BroadPhase>,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub event_handler: ChannelEventCollector,
    collision_reciever: channel::Receiver<CollisionEvent>
}

impl Physics {
    pub fn new(gravity: Vector<Real>, solver: SolverSettings) -> Self {
        // Only collision events are consumed; nothing asks for contact forces.
        let (collision_send, collision_recv) = channel::unbounded();
        let (contact_force_send, _) = channel::unbounded();
        let event_handler = ChannelEventCollector::new(collision_send, contact_force_send);

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(solver.velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        integration_parameters.num_internal_stabilization_iterations = solver.position_iterations;

        Self {
            gravity,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            physics_pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: Box::new(BroadPhaseMultiSap::new()),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            event_handler,
            collision_reciever: collision_recv
        }
    }

    /// Adds a body to the physics world with a rigid body and its colliders.
    pub fn create_body(&mut self, properties: &PhysicalProperties) -> PhysicsHandle {
        let body_handle = self.rigid_body_set.insert(properties.body.build());
        let mut collider_handles: Vec<ColliderHandle> = Vec::new();
        for collider in &properties.colliders {
            let handle =
                self.collider_set.insert_with_parent(
                    collider.build(),
                    body_handle,
                    &mut self.rigid_body_set);
            collider_handles.push(handle);
        }
        PhysicsHandle{body: body_handle, colliders: collider_handles}
    }

    /// Rotates a kinematic body to `angle` (radians) over the next step.
    pub fn set_kinematic_rotation(&mut self, physics: &PhysicsHandle, angle: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(physics.body) {
            body.set_next_kinematic_rotation(Rotation::new(angle));
        }
    }

    /// Translation and rotation angle of a body.
    pub fn pose(&self, physics: &PhysicsHandle) -> Option<(Vector<Real>, f32)> {
        self.rigid_body_set.get(physics.body)
            .map(|body| (*body.translation(), body.rotation().angle()))
    }

    pub fn velocity(&self, physics: &PhysicsHandle) -> Option<Vector<Real>> {
        self.rigid_body_set.get(physics.body).map(|body| *body.linvel())
    }

    /// Body that owns a collider
    pub fn collider_parent(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set.get(collider).and_then(|collider| collider.parent())
    }

    pub fn step(&mut self, time: f32) {
        self.integration_parameters.dt = time;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut *self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.event_handler,
          );
    }

    /// Collision events produced since the last call
    pub fn drain_collision_events(&self) -> Vec<CollisionEvent> {
        self.collision_reciever.try_iter().collect()
    }

    /// Draws every collider outline in screen pixels
    pub fn draw_debug(&self, world: &WorldConfig, color: Color, stroke: f32) {
        let scale = 1.0 / world.meters_per_pixel();
        for (_, collider) in self.collider_set.iter() {
            draw_shape(collider.shape(), collider.position(), scale, color, stroke);
        }
    }
}

fn to_screen(point: Point<Real>, scale: f32) -> Vec2 {
    vec2(point.x, point.y) * scale
}

pub fn draw_shape(shape: &dyn Shape, position: &Isometry<f32>, scale: f32, color: Color, stroke: f32) {
    match shape.as_typed_shape() {
        TypedShape::Ball(ball) => {
            let center = to_screen(Point::from(position.translation.vector), scale);
            draw_circle_lines(center.x, center.y, ball.radius * scale, stroke, color);
        },
        TypedShape::Segment(segment) => {
            let a = to_screen(position * segment.a, scale);
            let b = to_screen(position * segment.b, scale);
            draw_line(a.x, a.y, b.x, b.y, stroke, color);
        },
        TypedShape::ConvexPolygon(polygon) => {
            let vertices: Vec<Vec2> = polygon.points().iter()
                .map(|point| to_screen(position * point, scale))
                .collect();
            for i in 0..vertices.len() {
                let point = vertices[i];
                let next_point = vertices[(i+1) % vertices.len()];
                draw_line(point.x, point.y, next_point.x, next_point.y, stroke, color);
            }
        },
        TypedShape::Compound(compound) => {
            for (isometry, shape) in compound.shapes() {
                draw_shape(shape.as_ref(), &(position * isometry), scale, color, stroke);
            }
        },
        _ => {
            let aabb = shape.compute_aabb(position);
            let min = to_screen(aabb.mins, scale);
            let max = to_screen(aabb.maxs, scale);
            draw_rectangle_lines(min.x, min.y, max.x - min.x, max.y - min.y, stroke, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_settings_reach_integration_parameters() {
        let physics = Physics::new(vector![0.0, 0.0], SolverSettings { velocity_iterations: 6, position_iterations: 2 });
        assert_eq!(physics.integration_parameters.num_solver_iterations.get(), 6);
        assert_eq!(physics.integration_parameters.num_internal_stabilization_iterations, 2);
    }

    #[test]
    fn test_free_body_integrates_velocity() {
        let mut physics = Physics::new(vector![0.0, 0.0], SolverSettings::default());
        let mut properties = PhysicalProperties::new(RigidBodyType::Dynamic);
        properties.colliders.push(ColliderBuilder::ball(0.5));
        properties.set_location(vector![40.0, 30.0]);
        properties.set_velocity(vector![-10.0, -10.0]);
        let handle = physics.create_body(&properties);

        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }
        let (position, _) = physics.pose(&handle).unwrap();
        assert!((position.x - 30.0).abs() < 0.05);
        assert!((position.y - 20.0).abs() < 0.05);
    }

    #[test]
    fn test_kinematic_rotation_applies_after_step() {
        let mut physics = Physics::new(vector![0.0, 0.0], SolverSettings::default());
        let mut properties = PhysicalProperties::new(RigidBodyType::KinematicPositionBased);
        properties.colliders.push(ColliderBuilder::cuboid(1.0, 0.2));
        let handle = physics.create_body(&properties);

        physics.set_kinematic_rotation(&handle, 1.0);
        physics.step(1.0 / 60.0);
        let (_, angle) = physics.pose(&handle).unwrap();
        assert!((angle - 1.0).abs() < 1e-4);
    }
}
