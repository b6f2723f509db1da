use crate::error::AssetError;
use crate::gltf::load_gltf;
use crate::scene::ModelAsset;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// State of an in-flight model load.
#[derive(Debug)]
pub enum LoadStatus {
    /// Fraction of bytes read so far, in `[0, 1]`.
    Loading(f32),
    Loaded(Box<ModelAsset>),
    Failed(AssetError),
}

impl LoadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadStatus::Loading(_))
    }
}

/// Sending half of a load: progress updates followed by one result.
#[derive(Debug)]
pub struct LoadReporter {
    tx: Sender<LoadStatus>,
}

impl LoadReporter {
    pub fn progress(&self, fraction: f32) {
        // The handle may already be gone; nobody is listening then.
        let _ = self.tx.send(LoadStatus::Loading(fraction.clamp(0.0, 1.0)));
    }

    pub fn finish(self, result: Result<ModelAsset, AssetError>) {
        let status = match result {
            Ok(model) => LoadStatus::Loaded(Box::new(model)),
            Err(e) => LoadStatus::Failed(e),
        };
        let _ = self.tx.send(status);
    }
}

/// Receiving half of a load, polled once per frame.
#[derive(Debug)]
pub struct LoadHandle {
    rx: Receiver<LoadStatus>,
    finished: bool,
}

impl LoadHandle {
    /// Drain pending updates without blocking.
    ///
    /// Returns the terminal status as soon as it arrives, otherwise the most
    /// recent progress, or `None` when nothing new was reported. A reporter
    /// dropped without finishing yields `Failed(Interrupted)` once.
    pub fn poll(&mut self) -> Option<LoadStatus> {
        if self.finished {
            return None;
        }
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(LoadStatus::Loading(f)) => latest = Some(f),
                Ok(terminal) => {
                    self.finished = true;
                    return Some(terminal);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    return Some(LoadStatus::Failed(AssetError::Interrupted));
                }
            }
        }
        latest.map(LoadStatus::Loading)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Create a connected handle/reporter pair.
pub fn load_channel() -> (LoadHandle, LoadReporter) {
    let (tx, rx) = mpsc::channel();
    (
        LoadHandle {
            rx,
            finished: false,
        },
        LoadReporter { tx },
    )
}

/// Loads glTF models on a background thread.
pub struct GltfLoader;

impl GltfLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> LoadHandle {
        let path = path.into();
        let (handle, reporter) = load_channel();
        let spawned = std::thread::Builder::new()
            .name("gltf-loader".into())
            .spawn(move || {
                let result = load_gltf(&path, |f| reporter.progress(f));
                reporter.finish(result);
            });
        if let Err(e) = spawned {
            // The reporter was dropped with the closure, so the handle
            // reports Interrupted on its first poll.
            tracing::error!("failed to spawn loader thread: {e}");
        }
        handle
    }
}
