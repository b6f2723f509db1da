//! Scripted input for headless replay.
//!
//! ```yaml
//! - { type: pointer_down, x: 100, y: 100 }
//! - { type: pointer_move, x: 150, y: 130 }
//! - { type: pointer_up }
//! - { type: key_down, key: ArrowUp }
//! - { tick: 30 }
//! ```

use anyhow::Context;
use modelview_input::InputEvent;
use modelview_kernel::Controller;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Tick { tick: u32 },
    Input(InputEvent),
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing script {}", path.display()))
}

pub fn parse(text: &str) -> anyhow::Result<Vec<Step>> {
    Ok(serde_yaml::from_str(text)?)
}

/// Feed every step to the controller. `after_ticks` runs after each tick step.
pub fn run(
    controller: &mut Controller,
    steps: &[Step],
    dt: f32,
    mut after_ticks: impl FnMut(&Controller),
) {
    for step in steps {
        match step {
            Step::Input(event) => controller.handle(event),
            Step::Tick { tick } => {
                for _ in 0..*tick {
                    controller.tick(dt);
                }
                after_ticks(controller);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelview_assets::ModelAsset;
    use modelview_common::ViewerConfig;

    const SCRIPT: &str = "\
- { type: pointer_down, x: 100, y: 100 }
- { type: pointer_move, x: 150, y: 130 }
- { type: pointer_up }
- { type: key_down, key: ArrowUp }
- { tick: 100 }
- { type: key_up, key: ArrowUp }
- { type: wheel, delta_y: 100000 }
- { tick: 1 }
";

    #[test]
    fn parses_mixed_steps() {
        let steps = parse(SCRIPT).unwrap();
        assert_eq!(steps.len(), 8);
        assert_eq!(steps[4], Step::Tick { tick: 100 });
        assert_eq!(steps[2], Step::Input(InputEvent::PointerUp));
    }

    #[test]
    fn replay_drives_controller() {
        let steps = parse(SCRIPT).unwrap();
        let mut controller = Controller::new(&ViewerConfig::default());
        controller.set_model(ModelAsset::default());
        let mut tick_steps = 0;
        run(&mut controller, &steps, 0.016, |_| tick_steps += 1);

        assert_eq!(tick_steps, 2);
        assert_eq!(controller.frame(), 101);
        let state = controller.state();
        assert!((state.rotation().y - 0.25).abs() < 1e-6);
        assert!((state.rotation().x - 0.15).abs() < 1e-6);
        assert!((state.camera_position().y - 1.75).abs() < 1e-3);
        assert_eq!(state.camera_position().z, 20.0);
        assert!(!state.movement().up);
    }

    #[test]
    fn replay_without_model_only_moves_camera() {
        let steps = parse(SCRIPT).unwrap();
        let mut controller = Controller::new(&ViewerConfig::default());
        run(&mut controller, &steps, 0.016, |_| {});

        let state = controller.state();
        assert_eq!(state.rotation().x, 0.0);
        assert_eq!(state.rotation().y, 0.0);
        assert!((state.camera_position().y - 1.75).abs() < 1e-3);
    }

    #[test]
    fn unknown_step_rejected() {
        assert!(parse("- { type: teleport }").is_err());
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), SCRIPT).unwrap();
        assert_eq!(load(tmp.path()).unwrap().len(), 8);
    }
}
