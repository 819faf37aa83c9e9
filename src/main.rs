use macroquad::prelude::*;
use warlords::config::CONFIG_PATH;
use warlords::input::{AxisEmulator, InputEvent, Player};
use warlords::render::{self, FrameSnapshot};
use warlords::{GameConfig, SimulationContext, StartupError};

/// Keys that turn each player's shield (counter-clockwise, clockwise)
const BINDINGS: [(KeyCode, KeyCode); 2] = [
    (KeyCode::A, KeyCode::D),
    (KeyCode::Left, KeyCode::Right),
];

/// macroquad has no joystick support, so each axis is emulated from a pair
/// of keys.
struct KeyboardAxes {
    sticks: [AxisEmulator; 2],
}

impl KeyboardAxes {
    fn new(rate: f32) -> Self {
        Self { sticks: [AxisEmulator::new(rate), AxisEmulator::new(rate)] }
    }

    fn poll(&mut self, dt: f32) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if is_quit_requested() || is_key_pressed(KeyCode::Escape) {
            events.push(InputEvent::Quit);
        }
        for player in Player::ALL {
            let (decrease, increase) = BINDINGS[player.index()];
            let stick = &mut self.sticks[player.index()];
            if let Some(value) = stick.update(is_key_down(decrease), is_key_down(increase), dt) {
                events.push(InputEvent::AxisChanged { axis: player.index() as u8, value });
            }
        }
        events
    }
}

fn window_conf(config: &GameConfig) -> Conf {
    Conf {
        window_title: "Warlords".to_string(),
        window_width: config.screen_width as i32,
        window_height: config.screen_height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

fn startup() -> Result<(GameConfig, SimulationContext), StartupError> {
    let config = GameConfig::load(CONFIG_PATH)?;
    let context = SimulationContext::new(&config)?;
    Ok((config, context))
}

async fn run(mut context: SimulationContext, config: GameConfig) {
    prevent_quit();
    let mut keyboard = KeyboardAxes::new(config.keyboard_axis_rate);
    let mut debug = false;

    while context.is_running() {
        //////// Input ////////
        let frame_time = get_frame_time();
        for event in keyboard.poll(frame_time) {
            context.dispatch(event);
        }
        // Show/Hide collider outlines
        if is_key_pressed(KeyCode::I) { debug = !debug }

        //////// Simulate ///////
        context.advance(frame_time);

        //////// Render ////////
        let frame = FrameSnapshot::capture(&context);
        clear_background(BLACK);
        render::draw_frame(&frame);
        if debug {
            context.physics.draw_debug(&context.world, GREEN, 1.0);
        }

        next_frame().await
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, context) = match startup() {
        Ok(started) => started,
        Err(e) => {
            log::error!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    macroquad::Window::from_config(window_conf(&config), run(context, config));
}
