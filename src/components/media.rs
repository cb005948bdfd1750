//! Click-driven video playback and the shared registry of tracked media.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::dom::{DomTree, NodeId};
use crate::error::PlaybackError;

pub const PLAY_ICON: &str = "\u{25B6}";
pub const PAUSE_ICON: &str = "\u{23F8}";
pub const PLAYING_CLASS: &str = "playing";

/// The media-playback primitive of the host.
pub trait Playback {
    fn play(&mut self, media: NodeId) -> Result<(), PlaybackError>;
    fn pause(&mut self, media: NodeId);
    fn is_paused(&self, media: NodeId) -> bool;
}

/// In-memory playback used headlessly and by the viewer's video tiles.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayback {
    positions: HashMap<NodeId, f32>,
    playing: HashSet<NodeId>,
    refused: HashSet<NodeId>,
}

impl SimulatedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `play()` of `media` fail, like a browser blocking
    /// autoplay or a broken source.
    pub fn refuse(&mut self, media: NodeId) {
        self.refused.insert(media);
    }

    /// Move the playhead of every playing media forward.
    pub fn advance(&mut self, seconds: f32) {
        for id in &self.playing {
            *self.positions.entry(*id).or_insert(0.0) += seconds;
        }
    }

    pub fn position(&self, media: NodeId) -> f32 {
        self.positions.get(&media).copied().unwrap_or(0.0)
    }
}

impl Playback for SimulatedPlayback {
    fn play(&mut self, media: NodeId) -> Result<(), PlaybackError> {
        if self.refused.contains(&media) {
            return Err(PlaybackError(format!("media {:?} cannot be played", media)));
        }
        self.playing.insert(media);
        Ok(())
    }

    fn pause(&mut self, media: NodeId) {
        self.playing.remove(&media);
    }

    fn is_paused(&self, media: NodeId) -> bool {
        !self.playing.contains(&media)
    }
}

/// A playable element, its control and what the user last asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMedia {
    pub id: String,
    pub element: NodeId,
    pub control: NodeId,
    /// Set only by an explicit toggle to play.
    pub user_intent_playing: bool,
    /// Paused by the visibility tracker while the user still wanted it playing.
    pub suspended: bool,
}

/// One canonical record per media identity, shared by the click handler
/// and the visibility tracker.
#[derive(Debug, Clone, Default)]
pub struct MediaRegistry {
    records: BTreeMap<String, TrackedMedia>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a media once. A second registration of the same id is
    /// ignored and reported as `false`.
    pub fn register(&mut self, id: &str, element: NodeId, control: NodeId) -> bool {
        if self.records.contains_key(id) {
            return false;
        }
        self.records.insert(
            id.to_string(),
            TrackedMedia {
                id: id.to_string(),
                element,
                control,
                user_intent_playing: false,
                suspended: false,
            },
        );
        true
    }

    pub fn get(&self, id: &str) -> Option<&TrackedMedia> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedMedia> {
        self.records.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedMedia> {
        self.records.values_mut()
    }

    /// Play a paused media or pause a playing one. The only way media
    /// starts playing. Returns the new playing state, `None` for unknown
    /// ids or a refused `play()`.
    pub fn toggle_play(
        &mut self,
        id: &str,
        tree: &mut DomTree,
        playback: &mut dyn Playback,
    ) -> Option<bool> {
        let Some(media) = self.records.get_mut(id) else {
            log::debug!("toggle_play: no tracked media '{}'", id);
            return None;
        };

        if playback.is_paused(media.element) {
            if let Err(e) = playback.play(media.element) {
                log::warn!("video '{}' did not start: {}", id, e);
                return None;
            }
            tree.set_text(media.control, PAUSE_ICON);
            tree.set_class(media.control, PLAYING_CLASS, true);
            media.user_intent_playing = true;
            media.suspended = false;
            Some(true)
        } else {
            playback.pause(media.element);
            tree.set_text(media.control, PLAY_ICON);
            tree.set_class(media.control, PLAYING_CLASS, false);
            media.user_intent_playing = false;
            media.suspended = false;
            Some(false)
        }
    }
}
