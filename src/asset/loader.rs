use std::sync::{
    Arc,
    mpsc::{self, Receiver, Sender, TryRecvError},
};

use super::decode::{LoadedAsset, build_asset, parse, resolve_buffers};
use super::draco::{MeshDecoder, default_decoder};
use super::progress::LoadProgress;
use super::source::{LoadRequest, Location, fetch};
use crate::error::LoadError;
use crate::shell::HostUi;

/// Messages from the loader task to the render thread.
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Loaded(Box<LoadedAsset>),
    Failed(LoadError),
}

/// Task side of a load. Suppresses progress that does not move forward and
/// sends at most one terminal event (consuming `self`).
pub struct LoadReporter {
    tx: Sender<LoadEvent>,
    last: Option<LoadProgress>,
}

impl LoadReporter {
    pub fn progress(&mut self, progress: LoadProgress) {
        if self.last.is_some_and(|last| progress <= last) {
            return;
        }
        self.last = Some(progress);
        // receiver gone means the scene was torn down
        let _ = self.tx.send(LoadEvent::Progress(progress));
    }

    pub fn succeed(self, asset: LoadedAsset) {
        let _ = self.tx.send(LoadEvent::Loaded(Box::new(asset)));
    }

    pub fn fail(self, error: LoadError) {
        let _ = self.tx.send(LoadEvent::Failed(error));
    }
}

/// Render-thread side of a load, drained once per frame.
pub struct LoadHandle {
    rx: Receiver<LoadEvent>,
    finished: bool,
}

pub fn channel() -> (LoadReporter, LoadHandle) {
    let (tx, rx) = mpsc::channel();
    (
        LoadReporter { tx, last: None },
        LoadHandle::from_receiver(rx),
    )
}

impl LoadHandle {
    pub fn from_receiver(rx: Receiver<LoadEvent>) -> Self {
        Self { rx, finished: false }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Forward pending progress to `shell` and return the terminal outcome the
    /// first time it is seen. The indicator is cleared on both outcomes.
    pub fn poll(&mut self, shell: &mut dyn HostUi) -> Option<Result<LoadedAsset, LoadError>> {
        if self.finished {
            return None;
        }
        loop {
            let outcome = match self.rx.try_recv() {
                Ok(LoadEvent::Progress(progress)) => {
                    shell.set_loading_percent(progress.percent());
                    continue;
                }
                Ok(LoadEvent::Loaded(asset)) => Ok(*asset),
                Ok(LoadEvent::Failed(error)) => Err(error),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(LoadError::Interrupted),
            };
            self.finished = true;
            shell.clear_loading();
            return Some(outcome);
        }
    }
}

fn asset_name(location: &Location) -> String {
    let name = match location {
        Location::Remote(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Location::Local(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
    };
    name.filter(|n| !n.is_empty())
        .unwrap_or_else(|| location.display_name())
}

/// Fetch, parse and decode a model. Geometry decoding runs on a blocking worker.
pub async fn load_asset(
    request: &LoadRequest,
    decoder: Option<Arc<dyn MeshDecoder>>,
    on_progress: impl FnMut(LoadProgress),
) -> Result<LoadedAsset, LoadError> {
    let location = request.location()?;
    let bytes = fetch(&location, on_progress).await?;
    log::debug!("Fetched {} bytes from {}", bytes.len(), location.display_name());

    let gltf = parse(&bytes)?;
    let buffers = resolve_buffers(&gltf, &location).await?;
    let name = asset_name(&location);
    let document = gltf.document;

    tokio::task::spawn_blocking(move || build_asset(&document, &buffers, &name, decoder.as_deref()))
        .await?
}

#[derive(Clone)]
pub struct AssetLoader {
    runtime: tokio::runtime::Handle,
    decoder: Option<Arc<dyn MeshDecoder>>,
}

impl AssetLoader {
    /// Uses the Draco decoder compiled into this build, if any.
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self {
            runtime,
            decoder: default_decoder(),
        }
    }

    pub fn with_decoder(mut self, decoder: Option<Arc<dyn MeshDecoder>>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Start loading in the background and return immediately.
    pub fn load(&self, request: LoadRequest) -> LoadHandle {
        let (mut reporter, handle) = channel();
        let decoder = self.decoder.clone();

        self.runtime.spawn(async move {
            log::info!("Loading model from '{}'", request.as_str());
            let result = load_asset(&request, decoder, |p| reporter.progress(p)).await;
            match result {
                Ok(asset) => {
                    log::info!("Model '{}' loaded", asset.mesh.name);
                    reporter.succeed(asset);
                }
                Err(e) => {
                    log::error!("An error happened loading the model '{}': {e}", request.as_str());
                    reporter.fail(e);
                }
            }
        });

        handle
    }
}
