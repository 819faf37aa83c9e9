//! The fixed-timestep loop state: one explicit context owning the physics
//! world, the arena handles and the latest input.

use rapier2d::prelude::*;

use crate::config::GameConfig;
use crate::coords::WorldConfig;
use crate::error::BuildError;
use crate::input::{AxisMapper, AxisSamples, InputEvent, Player};
use crate::physics::Physics;
use crate::world::{Arena, BodyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

pub struct SimulationContext {
    pub world: WorldConfig,
    pub physics: Physics,
    pub arena: Arena,
    pub axes: AxisSamples,
    mapper: AxisMapper,
    timestep: f32,
    max_substeps: u32,
    accumulator: f32,
    ticks: u64,
    state: LoopState,
}

impl SimulationContext {
    pub fn new(config: &GameConfig) -> Result<Self, BuildError> {
        let world = config.world();
        log::info!(
            "World: {}x{} px, {} m wide ({} m/px), {} Hz",
            world.screen_width_px,
            world.screen_height_px,
            world.world_width_m,
            world.meters_per_pixel(),
            config.tick_rate
        );
        let mut physics = Physics::new(config.gravity(), config.solver());
        let arena = Arena::build(&mut physics, config)?;
        Ok(Self {
            world,
            physics,
            arena,
            axes: AxisSamples::default(),
            mapper: config.axis_mapper(),
            timestep: config.timestep(),
            max_substeps: config.max_substeps,
            accumulator: 0.0,
            ticks: 0,
            state: LoopState::Running,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Applies one input event.
    pub fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit => {
                log::info!("Quit requested after {} ticks", self.ticks);
                self.state = LoopState::Stopped;
            }
            InputEvent::AxisChanged { axis, value } => match Player::from_axis(axis) {
                Some(player) => self.axes.set(player, value),
                None => log::trace!("Ignoring axis {axis}"),
            },
        }
    }

    /// Shield angle in radians for the latest axis sample.
    pub fn shield_angle(&self, player: Player) -> f32 {
        self.mapper.axis_to_radians(self.axes.get(player))
    }

    /// One fixed step: pose the shields from input, step the world, report
    /// what the bullet hit.
    pub fn tick(&mut self) {
        for player in Player::ALL {
            let angle = self.shield_angle(player);
            let shield = &self.arena.shields[player.index()];
            self.physics.set_kinematic_rotation(&shield.physics, angle);
        }

        self.physics.step(self.timestep);
        self.ticks += 1;

        for event in self.physics.drain_collision_events() {
            if let CollisionEvent::Started(first, second, _) = event {
                self.log_hit(first, second);
            }
        }
        if let Some((position, _)) = self.physics.pose(&self.arena.bullet.physics) {
            log::trace!("bullet: ({:.3}, {:.3})", position.x, position.y);
        }
    }

    /// Runs as many fixed steps as `frame_time` pays for, up to
    /// `max_substeps`. Time beyond that is dropped rather than carried into
    /// the next frame. Returns the number of steps taken.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        if !self.is_running() {
            return 0;
        }
        self.accumulator += frame_time.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.timestep && steps < self.max_substeps {
            self.tick();
            self.accumulator -= self.timestep;
            steps += 1;
        }
        if self.accumulator >= self.timestep {
            log::debug!("Dropping {:.3}s of simulation time", self.accumulator);
            self.accumulator = 0.0;
        }
        steps
    }

    fn log_hit(&self, first: ColliderHandle, second: ColliderHandle) {
        let kind = |collider| {
            self.physics
                .collider_parent(collider)
                .and_then(|body| self.arena.body_kind(body))
        };
        let other = match (kind(first), kind(second)) {
            (Some(BodyKind::DynamicBullet), other) | (other, Some(BodyKind::DynamicBullet)) => other,
            _ => return,
        };
        match other {
            Some(BodyKind::StaticWall) => log::debug!("Bullet bounced off a wall"),
            Some(BodyKind::StaticCastle(player)) => log::debug!("Bullet hit the castle of {player}"),
            Some(BodyKind::RotatingShield(player)) => log::debug!("Bullet deflected by the shield of {player}"),
            Some(BodyKind::DynamicBullet) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SimulationContext {
        SimulationContext::new(&GameConfig::default()).unwrap()
    }

    fn same_angle(a: f32, b: f32) -> bool {
        (a.cos() - b.cos()).abs() < 1e-3 && (a.sin() - b.sin()).abs() < 1e-3
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let mut context = context();
        assert_eq!(context.state(), LoopState::Running);
        context.dispatch(InputEvent::Quit);
        assert_eq!(context.state(), LoopState::Stopped);
        assert_eq!(context.advance(1.0), 0);
        assert_eq!(context.ticks(), 0);
    }

    #[test]
    fn test_axis_events_update_the_right_player() {
        let mut context = context();
        context.dispatch(InputEvent::AxisChanged { axis: 1, value: 1234 });
        context.dispatch(InputEvent::AxisChanged { axis: 7, value: -5 });
        assert_eq!(context.axes.get(Player::One), 0);
        assert_eq!(context.axes.get(Player::Two), 1234);
    }

    #[test]
    fn test_input_drives_the_shield_collider() {
        let mut context = context();
        context.dispatch(InputEvent::AxisChanged { axis: 0, value: -16384 });
        context.tick();
        let expected = context.shield_angle(Player::One);
        let (_, angle) = context.physics.pose(&context.arena.shields[0].physics).unwrap();
        assert!(same_angle(angle, expected));
        // 16384 units above the bottom, doubled: a half turn
        assert!(same_angle(angle, std::f32::consts::PI));
    }

    #[test]
    fn test_advance_runs_whole_ticks() {
        let mut context = context();
        let dt = context.timestep();
        assert_eq!(context.advance(dt * 0.5), 0);
        assert_eq!(context.advance(dt * 0.6), 1);
        assert_eq!(context.advance(dt * 2.0), 2);
        assert_eq!(context.ticks(), 3);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let mut context = context();
        // A one second hitch only buys max_substeps steps
        assert_eq!(context.advance(1.0), 8);
        assert_eq!(context.advance(0.0), 0);
    }

    #[test]
    fn test_castles_do_not_move() {
        let mut context = context();
        for _ in 0..120 {
            context.tick();
        }
        for castle in &context.arena.castles {
            let (position, _) = context.physics.pose(&castle.physics).unwrap();
            assert_eq!(position, castle.center);
        }
    }
}
