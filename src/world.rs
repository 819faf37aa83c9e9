//! Builds the arena once at startup: walls, castles, shields and the bullet.

use std::f32::consts::TAU;

use rapier2d::prelude::*;

use crate::arc::ShieldGeometry;
use crate::config::GameConfig;
use crate::coords::WorldConfig;
use crate::error::BuildError;
use crate::input::{AxisSamples, Player};
use crate::physics::{Physics, PhysicalProperties, PhysicsHandle};

/// Every surface in the arena bounces perfectly and has no friction.
const RESTITUTION: f32 = 1.0;
const FRICTION: f32 = 0.0;

/// The shapes the arena is made of.
#[derive(Debug, Clone)]
pub enum ColliderKind {
    Circle { radius: f32 },
    Segment { a: Point<Real>, b: Point<Real> },
    ArcPolygon(ShieldGeometry),
}

impl ColliderKind {
    /// A collider with the arena's material. Arc polygons become a compound
    /// of one convex piece per tessellation step.
    pub fn collider(&self) -> Result<ColliderBuilder, BuildError> {
        let builder = match self {
            ColliderKind::Circle { radius } => ColliderBuilder::ball(*radius),
            ColliderKind::Segment { a, b } => ColliderBuilder::segment(*a, *b),
            ColliderKind::ArcPolygon(geometry) => {
                let mut pieces = Vec::with_capacity(geometry.tessellation_points);
                for (piece, corners) in geometry.convex_pieces().iter().enumerate() {
                    let shape = SharedShape::convex_hull(corners)
                        .ok_or(BuildError::ConvexPiece { piece })?;
                    pieces.push((Isometry::identity(), shape));
                }
                ColliderBuilder::compound(pieces)
            }
        };
        Ok(builder.restitution(RESTITUTION).friction(FRICTION))
    }
}

/// What a body in the arena is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    StaticWall,
    StaticCastle(Player),
    RotatingShield(Player),
    DynamicBullet,
}

/// Pixel positions and sizes of everything in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaLayout {
    pub castle_centers: [(i32, i32); 2],
    pub castle_radius: i32,
    pub shield_radius: i32,
    pub bullet_spawn: (i32, i32),
    pub bullet_radius: i32,
}

impl ArenaLayout {
    /// Castles sit at a quarter and a third of the screen (player one) and
    /// three quarters and two thirds (player two); the bullet starts in the
    /// middle.
    pub fn from_world(world: &WorldConfig) -> Self {
        let width = world.screen_width_px as i32;
        let height = world.screen_height_px as i32;
        let castle_radius = width / 16;
        Self {
            castle_centers: [(width / 4, height / 3), (width * 3 / 4, height * 2 / 3)],
            castle_radius,
            shield_radius: height / 10,
            bullet_spawn: (width / 2, height / 2),
            bullet_radius: castle_radius / 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Castle {
    pub player: Player,
    pub physics: PhysicsHandle,
    /// Castles never move, so their pose is read once.
    pub center: Vector<Real>,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct Shield {
    pub player: Player,
    pub physics: PhysicsHandle,
    pub geometry: ShieldGeometry,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub physics: PhysicsHandle,
    pub radius: f32,
    pub mass: f32,
}

/// Handles to every body in the arena.
#[derive(Debug, Clone)]
pub struct Arena {
    pub layout: ArenaLayout,
    pub walls: PhysicsHandle,
    pub castles: [Castle; 2],
    pub shields: [Shield; 2],
    pub bullet: Bullet,
}

impl Arena {
    /// Assembles the whole scene inside `physics`.
    pub fn build(physics: &mut Physics, config: &GameConfig) -> Result<Self, BuildError> {
        let world = config.world();
        let layout = ArenaLayout::from_world(&world);

        let walls = build_walls(physics, &world)?;
        let (castle_one, shield_one) = build_side(physics, config, &world, &layout, Player::One)?;
        let (castle_two, shield_two) = build_side(physics, config, &world, &layout, Player::Two)?;
        let bullet = build_bullet(physics, config, &world, &layout)?;

        log::info!(
            "Arena built: castles at {:?} r={}px, shields r={}px sweep={}°, bullet r={}px",
            layout.castle_centers,
            layout.castle_radius,
            layout.shield_radius,
            config.shield_sweep_degrees,
            layout.bullet_radius
        );

        Ok(Self {
            layout,
            walls,
            castles: [castle_one, castle_two],
            shields: [shield_one, shield_two],
            bullet,
        })
    }

    pub fn body_kind(&self, body: RigidBodyHandle) -> Option<BodyKind> {
        if body == self.walls.body {
            return Some(BodyKind::StaticWall);
        }
        if body == self.bullet.physics.body {
            return Some(BodyKind::DynamicBullet);
        }
        for player in Player::ALL {
            if body == self.castles[player.index()].physics.body {
                return Some(BodyKind::StaticCastle(player));
            }
            if body == self.shields[player.index()].physics.body {
                return Some(BodyKind::RotatingShield(player));
            }
        }
        None
    }
}

/// Four segments along the screen edges, all on one fixed body.
fn build_walls(physics: &mut Physics, world: &WorldConfig) -> Result<PhysicsHandle, BuildError> {
    let width = world.world_width_m;
    let height = world.world_height_m();
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ];
    let mut properties = PhysicalProperties::new(RigidBodyType::Fixed);
    for i in 0..corners.len() {
        let side = ColliderKind::Segment { a: corners[i], b: corners[(i + 1) % corners.len()] };
        properties.colliders.push(side.collider()?);
    }
    Ok(physics.create_body(&properties))
}

/// A castle and the shield that guards it.
fn build_side(
    physics: &mut Physics,
    config: &GameConfig,
    world: &WorldConfig,
    layout: &ArenaLayout,
    player: Player,
) -> Result<(Castle, Shield), BuildError> {
    let (x, y) = layout.castle_centers[player.index()];
    let center = world.point_to_meters(x, y);
    let castle_radius = world.to_meters(layout.castle_radius);
    let castle = build_castle(physics, player, center, castle_radius)?;

    let geometry = ShieldGeometry::new(
        castle_radius,
        world.to_meters(layout.shield_radius),
        config.shield_sweep_degrees.to_radians().min(TAU),
        config.arc_tessellation_points,
    )
    .map_err(|source| BuildError::Geometry { player, source })?;
    let angle = config.axis_mapper().axis_to_radians(AxisSamples::default().get(player));
    let shield = build_shield(physics, player, center, angle, geometry)?;

    Ok((castle, shield))
}

fn build_castle(
    physics: &mut Physics,
    player: Player,
    center: Vector<Real>,
    radius: f32,
) -> Result<Castle, BuildError> {
    let mut properties = PhysicalProperties::new(RigidBodyType::Fixed);
    properties.set_location(center);
    properties.colliders.push(ColliderKind::Circle { radius }.collider()?);
    Ok(Castle {
        player,
        physics: physics.create_body(&properties),
        center,
        radius,
    })
}

/// The shield pivots around its castle's center; its rotation is written
/// every tick from the player's axis.
fn build_shield(
    physics: &mut Physics,
    player: Player,
    center: Vector<Real>,
    angle: f32,
    geometry: ShieldGeometry,
) -> Result<Shield, BuildError> {
    let mut properties = PhysicalProperties::new(RigidBodyType::KinematicPositionBased);
    properties.set_location(center);
    properties.set_rotation(angle);
    properties.colliders.push(ColliderKind::ArcPolygon(geometry.clone()).collider()?);
    Ok(Shield {
        player,
        physics: physics.create_body(&properties),
        geometry,
    })
}

/// The bullet starts in the middle of the arena. Its launch impulse is
/// turned into a velocity using the mass of its collider.
fn build_bullet(
    physics: &mut Physics,
    config: &GameConfig,
    world: &WorldConfig,
    layout: &ArenaLayout,
) -> Result<Bullet, BuildError> {
    let radius = world.to_meters(layout.bullet_radius);
    let collider = ColliderKind::Circle { radius }
        .collider()?
        .density(config.bullet_density)
        .active_events(ActiveEvents::COLLISION_EVENTS);
    let mass = collider.shape.mass_properties(config.bullet_density).mass();
    if !(mass > 0.0) {
        return Err(BuildError::MasslessBullet { radius, mass });
    }
    log::info!("Bullet mass: {mass:.3} kg");

    let (x, y) = layout.bullet_spawn;
    let mut properties = PhysicalProperties::new(RigidBodyType::Dynamic);
    properties.body = properties.body.clone().ccd_enabled(true);
    properties.set_location(world.point_to_meters(x, y));
    properties.set_velocity(config.bullet_impulse() / mass);
    properties.colliders.push(collider);

    Ok(Bullet {
        physics: physics.create_body(&properties),
        radius,
        mass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::SolverSettings;

    fn build_default() -> (Physics, Arena) {
        let config = GameConfig::default();
        let mut physics = Physics::new(config.gravity(), config.solver());
        let arena = Arena::build(&mut physics, &config).unwrap();
        (physics, arena)
    }

    #[test]
    fn test_layout_for_800_by_600() {
        let layout = ArenaLayout::from_world(&WorldConfig::new(800, 600, 80.0));
        assert_eq!(layout.castle_centers, [(200, 200), (600, 400)]);
        assert_eq!(layout.castle_radius, 50);
        assert_eq!(layout.shield_radius, 60);
        assert_eq!(layout.bullet_spawn, (400, 300));
        assert_eq!(layout.bullet_radius, 5);
    }

    #[test]
    fn test_every_body_is_classified() {
        let (physics, arena) = build_default();
        assert_eq!(physics.rigid_body_set.len(), 6);
        assert_eq!(arena.walls.colliders.len(), 4);
        assert_eq!(arena.body_kind(arena.walls.body), Some(BodyKind::StaticWall));
        assert_eq!(arena.body_kind(arena.bullet.physics.body), Some(BodyKind::DynamicBullet));
        assert_eq!(
            arena.body_kind(arena.shields[1].physics.body),
            Some(BodyKind::RotatingShield(Player::Two))
        );
        assert_eq!(
            arena.body_kind(arena.castles[0].physics.body),
            Some(BodyKind::StaticCastle(Player::One))
        );
    }

    #[test]
    fn test_body_types() {
        let (physics, arena) = build_default();
        let body_type = |handle: &PhysicsHandle| physics.rigid_body_set[handle.body].body_type();
        assert_eq!(body_type(&arena.walls), RigidBodyType::Fixed);
        assert_eq!(body_type(&arena.castles[0].physics), RigidBodyType::Fixed);
        assert_eq!(body_type(&arena.shields[0].physics), RigidBodyType::KinematicPositionBased);
        assert_eq!(body_type(&arena.bullet.physics), RigidBodyType::Dynamic);
        assert!(physics.rigid_body_set[arena.bullet.physics.body].is_ccd_enabled());
    }

    #[test]
    fn test_materials_are_perfectly_elastic() {
        let (physics, _) = build_default();
        for (_, collider) in physics.collider_set.iter() {
            assert_eq!(collider.restitution(), 1.0);
            assert_eq!(collider.friction(), 0.0);
        }
    }

    #[test]
    fn test_shield_is_a_compound_of_quads() {
        let shield = ShieldGeometry::new(5.0, 6.0, std::f32::consts::FRAC_PI_2, 16).unwrap();
        let collider = ColliderKind::ArcPolygon(shield).collider().unwrap().build();
        let compound = collider.shape().as_compound().unwrap();
        assert_eq!(compound.shapes().len(), 16);
    }

    #[test]
    fn test_bullet_velocity_from_impulse() {
        let (physics, arena) = build_default();
        let velocity = physics.velocity(&arena.bullet.physics).unwrap();
        let expected = 10.0 / (std::f32::consts::PI * 0.25);
        assert!((arena.bullet.mass - std::f32::consts::PI * 0.25).abs() < 1e-4);
        assert!((velocity.x + expected).abs() < 1e-3);
        assert!((velocity.y + expected).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_geometry_is_reported() {
        let config = GameConfig {
            shield_sweep_degrees: 360.0,
            arc_tessellation_points: 1,
            ..GameConfig::default()
        };
        let mut physics = Physics::new(config.gravity(), SolverSettings::default());
        let error = Arena::build(&mut physics, &config).unwrap_err();
        assert!(matches!(error, BuildError::Geometry { player: Player::One, .. }));
    }

    #[test]
    fn test_narrow_screen_cannot_launch_a_bullet() {
        // 100 / 16 / 10 rounds the bullet down to zero pixels
        let config = GameConfig {
            screen_width: 100,
            ..GameConfig::default()
        };
        let mut physics = Physics::new(config.gravity(), SolverSettings::default());
        let error = Arena::build(&mut physics, &config).unwrap_err();
        assert!(matches!(error, BuildError::MasslessBullet { mass, .. } if mass == 0.0));
    }
}
