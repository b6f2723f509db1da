use crate::state::ViewerState;
use modelview_assets::{
    AnimationPlayer, AssetError, GltfLoader, LoadHandle, LoadStatus, ModelAsset,
};
use modelview_common::{Transform, ViewerConfig};
use modelview_input::InputEvent;
use std::fmt;

/// Observable state of the model load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadProgress {
    /// No load has been started.
    Idle,
    Loading(f32),
    Loaded,
    Failed(String),
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProgress::Idle => write!(f, "idle"),
            LoadProgress::Loading(fraction) => write!(f, "{:.0}% loaded", fraction * 100.0),
            LoadProgress::Loaded => write!(f, "loaded"),
            LoadProgress::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// A model placed in the scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub asset: ModelAsset,
    /// Written absolutely from the rotation offset every tick.
    pub transform: Transform,
}

/// Top-level owner of the viewer: input state, the pending load, the model
/// and its animation player.
///
/// One [`tick`](Controller::tick) per displayed frame performs, in order:
/// load polling, animation update and posing, model rotation write, and the
/// pan step.
pub struct Controller {
    state: ViewerState,
    load: Option<LoadHandle>,
    progress: LoadProgress,
    model: Option<LoadedModel>,
    player: Option<AnimationPlayer>,
    frame: u64,
}

impl Controller {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            state: ViewerState::new(config),
            load: None,
            progress: LoadProgress::Idle,
            model: None,
            player: None,
            frame: 0,
        }
    }

    /// Start loading `config.asset_path` on a background thread.
    pub fn spawn_load(config: &ViewerConfig) -> Self {
        tracing::info!("loading {}", config.asset_path.display());
        let mut controller = Self::new(config);
        controller.begin_load(GltfLoader::spawn(config.asset_path.clone()));
        controller
    }

    /// Attach a pending load. A previous pending load is abandoned.
    pub fn begin_load(&mut self, handle: LoadHandle) {
        self.load = Some(handle);
        self.progress = LoadProgress::Loading(0.0);
    }

    /// Install a model immediately and start its first animation.
    pub fn set_model(&mut self, asset: ModelAsset) {
        self.player = asset.animations.first().cloned().map(|clip| {
            tracing::debug!(
                "playing animation {:?} ({:.2}s, {} channels)",
                clip.name,
                clip.duration,
                clip.channel_count()
            );
            let mut player = AnimationPlayer::new(clip);
            player.play();
            player
        });
        let transform = Transform {
            rotation: self.state.rotation().to_quat(),
            ..Transform::default()
        };
        self.model = Some(LoadedModel { asset, transform });
        self.progress = LoadProgress::Loaded;
    }

    /// Route an input event into the viewer state.
    ///
    /// Pointer moves are dropped until a model is loaded: the rotation
    /// offset and the last pointer position both stay untouched. Zoom, pan
    /// keys, drag start/end and focus loss always go through.
    pub fn handle(&mut self, event: &InputEvent) {
        if self.model.is_none() && matches!(event, InputEvent::PointerMove { .. }) {
            return;
        }
        self.state.handle(event);
    }

    /// Advance one frame by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.poll_load();

        if let Some(player) = &mut self.player {
            player.update(dt);
            if let Some(model) = &mut self.model {
                player.apply(&mut model.asset.scene);
            }
        }

        if let Some(model) = &mut self.model {
            model.transform.rotation = self.state.rotation().to_quat();
        }

        self.state.pan_step();
        self.frame += 1;
    }

    fn poll_load(&mut self) {
        let Some(handle) = &mut self.load else {
            return;
        };
        let Some(status) = handle.poll() else {
            return;
        };
        match status {
            LoadStatus::Loading(fraction) => {
                tracing::info!("{:.0}% loaded", fraction * 100.0);
                self.progress = LoadProgress::Loading(fraction);
            }
            LoadStatus::Loaded(asset) => {
                self.load = None;
                tracing::info!("model loaded successfully");
                self.set_model(*asset);
            }
            LoadStatus::Failed(e) => {
                self.load = None;
                self.fail_load(&e);
            }
        }
    }

    fn fail_load(&mut self, error: &AssetError) {
        tracing::error!("failed to load model: {error}");
        self.progress = LoadProgress::Failed(error.to_string());
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn animation(&self) -> Option<&AnimationPlayer> {
        self.player.as_ref()
    }

    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec2, Vec3};
    use modelview_assets::{
        AnimationChannel, AnimationClip, Interpolation, Keyframes, Scene, SceneNode, load_channel,
    };
    use modelview_common::RotationOffset;

    fn asset(animated: bool) -> ModelAsset {
        if !animated {
            return ModelAsset::default();
        }
        // Node 0 slides from y = 0 to y = 2 over one second.
        ModelAsset {
            scene: Scene {
                name: None,
                roots: vec![SceneNode::default()],
            },
            animations: vec![AnimationClip {
                name: "run".into(),
                duration: 1.0,
                channels: vec![AnimationChannel {
                    node: 0,
                    interpolation: Interpolation::Linear,
                    times: vec![0.0, 1.0],
                    values: Keyframes::Translation(vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]),
                }],
            }],
            ..ModelAsset::default()
        }
    }

    fn controller() -> Controller {
        Controller::new(&ViewerConfig::default())
    }

    #[test]
    fn failed_load_keeps_camera_responsive() {
        let mut c = controller();
        let (handle, reporter) = load_channel();
        c.begin_load(handle);
        reporter.finish(Err(AssetError::GltfParse("truncated".into())));

        c.tick(0.016);
        assert!(matches!(c.progress(), LoadProgress::Failed(msg) if msg.contains("truncated")));
        assert!(c.model().is_none());

        let start = c.state().camera_position();
        c.handle(&InputEvent::Wheel { delta_y: 1000.0 });
        c.handle(&InputEvent::key_down("ArrowRight"));
        c.handle(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        c.handle(&InputEvent::PointerMove { x: 100.0, y: 0.0 });
        for _ in 0..10 {
            c.tick(0.016);
        }
        let end = c.state().camera_position();
        assert!((end.z - (start.z + 1.0)).abs() < 1e-5);
        assert!((end.x - 0.1).abs() < 1e-5);
        assert!(c.model().is_none());
        assert_eq!(c.frame(), 11);
    }

    #[test]
    fn progress_then_loaded() {
        let mut c = controller();
        let (handle, reporter) = load_channel();
        c.begin_load(handle);
        reporter.progress(0.5);
        c.tick(0.0);
        assert_eq!(c.progress(), &LoadProgress::Loading(0.5));
        assert_eq!(c.progress().to_string(), "50% loaded");

        reporter.finish(Ok(asset(true)));
        c.tick(0.25);
        assert_eq!(c.progress(), &LoadProgress::Loaded);
        assert!(c.model().is_some());
        let player = c.animation().unwrap();
        assert!(player.is_playing());
        assert_eq!(player.clip().name, "run");
        assert_eq!(player.time(), 0.25);
    }

    #[test]
    fn rotation_written_absolutely_each_tick() {
        let mut c = controller();
        c.set_model(asset(false));
        c.state_mut().on_pointer_down(0.0, 0.0);
        c.state_mut().on_pointer_move(40.0, 20.0);
        c.tick(0.016);
        c.tick(0.016);

        let expected = c.state().rotation().to_quat();
        let actual = c.model().unwrap().transform.rotation;
        assert!(actual.abs_diff_eq(expected, 1e-6));
        assert!(c.animation().is_none());
    }

    #[test]
    fn drag_before_load_is_ignored() {
        let mut c = controller();
        c.handle(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        c.handle(&InputEvent::PointerMove { x: 100.0, y: 60.0 });
        c.tick(0.016);
        assert_eq!(c.state().rotation(), RotationOffset::default());
        assert!(c.state().pointer().dragging);
        assert_eq!(c.state().pointer().last, Vec2::ZERO);

        c.set_model(asset(false));
        c.tick(0.016);
        assert_eq!(c.state().rotation(), RotationOffset::default());
        assert!(c.model().unwrap().transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));

        // The drag continues from where it started once the model exists.
        c.handle(&InputEvent::PointerMove { x: 20.0, y: 0.0 });
        assert!((c.state().rotation().y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn camera_input_applies_before_load() {
        let mut c = controller();
        c.handle(&InputEvent::Wheel { delta_y: 1000.0 });
        c.handle(&InputEvent::key_down("w"));
        c.tick(0.016);
        let p = c.state().camera_position();
        assert!((p.z - 6.0).abs() < 1e-5);
        assert!((p.y - 0.76).abs() < 1e-5);

        c.handle(&InputEvent::FocusLost);
        assert!(!c.state().movement().any());
    }

    #[test]
    fn tick_poses_animated_nodes() {
        let mut c = controller();
        c.set_model(asset(true));
        c.tick(0.25);
        c.tick(0.25);

        let node = &c.model().unwrap().asset.scene.roots[0];
        assert!((node.transform.position.y - 1.0).abs() < 1e-5);
        assert!((c.animation().unwrap().time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interrupted_loader_reports_failure() {
        let mut c = controller();
        let (handle, reporter) = load_channel();
        c.begin_load(handle);
        drop(reporter);
        c.tick(0.016);
        assert!(matches!(c.progress(), LoadProgress::Failed(_)));
    }

    #[test]
    fn spawn_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let gltf = dir.path().join("empty.gltf");
        let doc = serde_json::json!({
            "asset": { "version": "2.0" },
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "name": "only" }]
        });
        std::fs::write(&gltf, doc.to_string()).unwrap();

        let mut config = ViewerConfig::default();
        config.asset_path = gltf;
        let mut c = Controller::spawn_load(&config);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while c.model().is_none() {
            assert!(std::time::Instant::now() < deadline, "load timed out");
            assert!(!matches!(c.progress(), LoadProgress::Failed(_)));
            c.tick(0.016);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(c.model().unwrap().asset.scene.node_count(), 1);
    }
}
