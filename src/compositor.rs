use crate::{
    assets::{LoadStatus, TextureStore},
    config::VisualizerConfig,
    error::VitrineResult,
    selection::Selection,
    stage::{Layer, LayerId, Stage, fit_scale},
    tween::{FadeSpec, Tween},
};

/// Monotonically increasing refresh stamp. A newer generation supersedes
/// every older one; only the newest can ever commit its layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// How newly loaded layers replace the current display.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum TransitionStyle {
    /// Swap in the same tick the loads complete.
    Instant,
    /// Ramp the new layers from transparent to opaque, then swap.
    FadeIn,
}

impl Default for TransitionStyle {
    fn default() -> Self {
        Self::FadeIn
    }
}

/// One displayed layer: its stage id plus the texture path it keeps alive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLayer {
    pub id: LayerId,
    pub path: String,
}

/// The currently displayed base/overlay pair. Replaced atomically at commit,
/// never partially updated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub base: Option<DisplayLayer>,
    pub overlay: Option<DisplayLayer>,
}

struct PendingRefresh {
    generation: Generation,
    base_path: String,
    overlay_path: Option<String>,
    phase: Phase,
}

enum Phase {
    Loading,
    Fading {
        base: LayerId,
        overlay: Option<LayerId>,
        tween: Tween,
    },
}

/// Drives selection refreshes through load, transition, and commit.
///
/// The compositor owns the stage and the display state. The embedder calls
/// [`refresh`](Compositor::refresh) whenever the selection changes and
/// [`tick`](Compositor::tick) on its frame cadence; texture IO stays behind
/// the [`TextureStore`] passed into both.
pub struct Compositor {
    stage: Stage,
    display: DisplayState,
    pending: Option<PendingRefresh>,
    generation: u64,
    style: TransitionStyle,
    fade: FadeSpec,
}

impl Compositor {
    pub fn new(config: &VisualizerConfig) -> VitrineResult<Self> {
        config.validate()?;
        Ok(Self {
            stage: Stage::new(config.canvas, config.background_rgba),
            display: DisplayState::default(),
            pending: None,
            generation: 0,
            style: config.style,
            fade: config.fade,
        })
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Whether a refresh is still loading or fading.
    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a refresh for `selection`: derive both asset paths, supersede
    /// any in-flight refresh, and request the texture loads.
    ///
    /// Returns the stamped generation. The refresh itself progresses through
    /// subsequent [`tick`](Compositor::tick) calls; the current display stays
    /// visible until the new layers commit.
    #[tracing::instrument(skip(self, store))]
    pub fn refresh(
        &mut self,
        store: &mut dyn TextureStore,
        selection: &Selection,
    ) -> VitrineResult<Generation> {
        selection.validate()?;

        let base_path = selection.base_path();
        let overlay_path = selection.overlay_path();

        // The newest trigger wins; whatever is still in flight can no longer
        // commit, so drop it before stamping the next generation.
        self.cancel_pending(store);

        self.generation += 1;
        let generation = Generation(self.generation);

        store.request(&base_path);
        if let Some(path) = &overlay_path {
            store.request(path);
        }

        self.pending = Some(PendingRefresh {
            generation,
            base_path,
            overlay_path,
            phase: Phase::Loading,
        });
        Ok(generation)
    }

    /// Advance the pending refresh by one cooperative step.
    ///
    /// `dt_secs` is the embedder clock delta since the previous tick. A load
    /// failure is terminal for the refresh: it is logged with both attempted
    /// paths and the display is left exactly as it was. Nothing is retried.
    pub fn tick(&mut self, store: &mut dyn TextureStore, dt_secs: f64) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        match pending.phase {
            Phase::Loading => self.tick_loading(store, pending),
            Phase::Fading { .. } => self.tick_fading(store, pending, dt_secs),
        }
    }

    /// Tick until no refresh is pending, up to `max_ticks`. Returns whether
    /// the compositor settled.
    pub fn settle(&mut self, store: &mut dyn TextureStore, dt_secs: f64, max_ticks: u32) -> bool {
        for _ in 0..max_ticks {
            if !self.in_flight() {
                return true;
            }
            self.tick(store, dt_secs);
        }
        !self.in_flight()
    }

    fn tick_loading(&mut self, store: &mut dyn TextureStore, pending: PendingRefresh) {
        let base = match store.status(&pending.base_path) {
            LoadStatus::Pending => {
                self.pending = Some(pending);
                return;
            }
            LoadStatus::Failed(cause) => {
                self.fail_refresh(store, pending, cause);
                return;
            }
            LoadStatus::Ready(texture) => texture,
        };

        let overlay = match &pending.overlay_path {
            None => None,
            Some(path) => match store.status(path) {
                LoadStatus::Pending => {
                    self.pending = Some(pending);
                    return;
                }
                LoadStatus::Failed(cause) => {
                    self.fail_refresh(store, pending, cause);
                    return;
                }
                LoadStatus::Ready(texture) => Some(texture),
            },
        };

        let canvas = self.stage.canvas();
        let scale = fit_scale(canvas, base.width, base.height);
        let initial_alpha = match self.style {
            TransitionStyle::Instant => 1.0,
            TransitionStyle::FadeIn => 0.0,
        };

        // New layers go on top of whatever is displayed; the overlay registers
        // with the base by sharing its center and scale.
        let base_id = self
            .stage
            .add(Layer::centered(base, canvas, scale, initial_alpha));
        let overlay_id = overlay.map(|texture| {
            self.stage
                .add(Layer::centered(texture, canvas, scale, initial_alpha))
        });

        match self.style {
            TransitionStyle::Instant => self.commit(store, pending, base_id, overlay_id),
            TransitionStyle::FadeIn => {
                self.pending = Some(PendingRefresh {
                    phase: Phase::Fading {
                        base: base_id,
                        overlay: overlay_id,
                        tween: Tween::new(self.fade),
                    },
                    ..pending
                });
            }
        }
    }

    fn tick_fading(&mut self, store: &mut dyn TextureStore, mut pending: PendingRefresh, dt_secs: f64) {
        let Phase::Fading {
            base,
            overlay,
            ref mut tween,
        } = pending.phase
        else {
            self.pending = Some(pending);
            return;
        };

        let progress = tween.advance(dt_secs);
        let finished = tween.finished();
        let alpha = if finished { 1.0 } else { progress as f32 };

        if let Some(layer) = self.stage.layer_mut(base) {
            layer.alpha = alpha;
        }
        if let Some(id) = overlay
            && let Some(layer) = self.stage.layer_mut(id)
        {
            layer.alpha = alpha;
        }

        if finished {
            self.commit(store, pending, base, overlay);
        } else {
            self.pending = Some(pending);
        }
    }

    fn commit(
        &mut self,
        store: &mut dyn TextureStore,
        pending: PendingRefresh,
        base: LayerId,
        overlay: Option<LayerId>,
    ) {
        let PendingRefresh {
            generation,
            base_path,
            overlay_path,
            ..
        } = pending;

        let previous = std::mem::take(&mut self.display);
        for shown in [previous.base, previous.overlay].into_iter().flatten() {
            self.stage.remove(shown.id);
            store.release(&shown.path);
        }

        self.display = DisplayState {
            base: Some(DisplayLayer {
                id: base,
                path: base_path,
            }),
            overlay: match (overlay, overlay_path) {
                (Some(id), Some(path)) => Some(DisplayLayer { id, path }),
                _ => None,
            },
        };

        tracing::debug!(
            generation = generation.0,
            layers = self.stage.len(),
            "committed refresh"
        );
    }

    fn fail_refresh(&mut self, store: &mut dyn TextureStore, pending: PendingRefresh, cause: String) {
        tracing::error!(
            generation = pending.generation.0,
            base = %pending.base_path,
            overlay = ?pending.overlay_path,
            error = %cause,
            "texture load failed; keeping current display"
        );
        release_requests(store, &pending);
    }

    fn cancel_pending(&mut self, store: &mut dyn TextureStore) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        if let Phase::Fading { base, overlay, .. } = pending.phase {
            self.stage.remove(base);
            if let Some(id) = overlay {
                self.stage.remove(id);
            }
        }
        release_requests(store, &pending);

        tracing::debug!(
            generation = pending.generation.0,
            "superseded in-flight refresh"
        );
    }
}

fn release_requests(store: &mut dyn TextureStore, pending: &PendingRefresh) {
    store.release(&pending.base_path);
    if let Some(path) = &pending.overlay_path {
        store.release(path);
    }
}
