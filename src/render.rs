//! Pixel-space frame data and the macroquad code that draws it.

use macroquad::prelude::*;
use rapier2d::prelude::Vector;

use crate::input::Player;
use crate::simulation::SimulationContext;

pub const CASTLE_COLOR: Color = Color::new(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0);
pub const BULLET_COLOR: Color = WHITE;

pub fn shield_color(player: Player) -> Color {
    match player {
        Player::One => RED,
        Player::Two => BLUE,
    }
}

/// Triangles per full turn when filling a shield.
const ARC_SIDES_PER_TURN: f32 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleSprite {
    pub center: (i32, i32),
    pub radius: i32,
    pub color: Color,
}

/// A filled ring sector, angles in degrees clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSprite {
    pub center: (i32, i32),
    pub inner_radius: i32,
    pub outer_radius: i32,
    pub start_degrees: f32,
    pub end_degrees: f32,
    pub color: Color,
}

/// Everything the renderer needs for one frame, read after the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub castles: [CircleSprite; 2],
    pub shields: [ArcSprite; 2],
    pub bullet: CircleSprite,
}

impl FrameSnapshot {
    pub fn capture(context: &SimulationContext) -> Self {
        let world = &context.world;
        let arena = &context.arena;
        let physics = &context.physics;

        let castle_sprite = |player: Player| {
            let castle = &arena.castles[player.index()];
            CircleSprite {
                center: world.point_to_pixels(&castle.center),
                radius: world.to_pixels(castle.radius),
                color: CASTLE_COLOR,
            }
        };

        let shield_sprite = |player: Player| {
            let shield = &arena.shields[player.index()];
            let castle = &arena.castles[player.index()];
            let (position, angle) = physics
                .pose(&shield.physics)
                .unwrap_or((castle.center, 0.0));
            let start_degrees = angle.to_degrees().rem_euclid(360.0);
            ArcSprite {
                center: world.point_to_pixels(&position),
                inner_radius: world.to_pixels(shield.geometry.inner_radius),
                outer_radius: world.to_pixels(shield.geometry.outer_radius),
                start_degrees,
                end_degrees: start_degrees + shield.geometry.sweep.to_degrees(),
                color: shield_color(player),
            }
        };

        let bullet = &arena.bullet;
        let bullet_position = physics
            .pose(&bullet.physics)
            .map_or_else(Vector::zeros, |(position, _)| position);

        Self {
            castles: [castle_sprite(Player::One), castle_sprite(Player::Two)],
            shields: [shield_sprite(Player::One), shield_sprite(Player::Two)],
            bullet: CircleSprite {
                center: world.point_to_pixels(&bullet_position),
                radius: world.to_pixels(bullet.radius),
                color: BULLET_COLOR,
            },
        }
    }
}

/// Shields first, then castles over their inner edge, then the bullet.
pub fn draw_frame(frame: &FrameSnapshot) {
    for shield in &frame.shields {
        draw_arc_sprite(shield);
    }
    for castle in &frame.castles {
        draw_circle_sprite(castle);
    }
    draw_circle_sprite(&frame.bullet);
}

fn draw_circle_sprite(sprite: &CircleSprite) {
    draw_circle(
        sprite.center.0 as f32,
        sprite.center.1 as f32,
        sprite.radius as f32,
        sprite.color,
    );
}

fn draw_arc_sprite(sprite: &ArcSprite) {
    let center = vec2(sprite.center.0 as f32, sprite.center.1 as f32);
    let span = sprite.end_degrees - sprite.start_degrees;
    let sides = ((span / 360.0) * ARC_SIDES_PER_TURN).ceil().max(1.0) as usize;
    let point = |radius: i32, degrees: f32| {
        let radians = degrees.to_radians();
        center + vec2(radians.cos(), radians.sin()) * radius as f32
    };
    for i in 0..sides {
        let from = sprite.start_degrees + span * i as f32 / sides as f32;
        let to = sprite.start_degrees + span * (i + 1) as f32 / sides as f32;
        let inner_from = point(sprite.inner_radius, from);
        let inner_to = point(sprite.inner_radius, to);
        let outer_from = point(sprite.outer_radius, from);
        let outer_to = point(sprite.outer_radius, to);
        draw_triangle(inner_from, outer_from, outer_to, sprite.color);
        draw_triangle(inner_from, outer_to, inner_to, sprite.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::input::InputEvent;

    #[test]
    fn test_snapshot_matches_layout() {
        let context = SimulationContext::new(&GameConfig::default()).unwrap();
        let frame = FrameSnapshot::capture(&context);
        assert_eq!(frame.castles[0].center, (200, 200));
        assert_eq!(frame.castles[1].center, (600, 400));
        assert_eq!(frame.castles[0].radius, 50);
        assert_eq!(frame.castles[1].color, CASTLE_COLOR);
        assert_eq!(frame.shields[0].center, (200, 200));
        assert_eq!(frame.shields[0].inner_radius, 50);
        assert_eq!(frame.shields[0].outer_radius, 60);
        assert_eq!(frame.shields[0].color, RED);
        assert_eq!(frame.shields[1].color, BLUE);
        assert_eq!(frame.bullet.center, (400, 300));
        assert_eq!(frame.bullet.radius, 5);
    }

    #[test]
    fn test_shield_sweep_follows_input() {
        let mut context = SimulationContext::new(&GameConfig::default()).unwrap();
        // 8192 units above the bottom at double sensitivity: 90 degrees
        context.dispatch(InputEvent::AxisChanged { axis: 1, value: -24576 });
        context.tick();
        let frame = FrameSnapshot::capture(&context);
        let shield = frame.shields[1];
        assert!((shield.start_degrees - 90.0).abs() < 0.1);
        assert!((shield.end_degrees - 180.0).abs() < 0.1);
    }
}
