use serde::{Deserialize, Serialize};

/// A named track the user can step through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub name: String,
    pub locator: String,
}

impl PlaylistEntry {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }

    /// The tracks shipped with the instrument, relative to the asset root.
    pub fn defaults() -> Vec<PlaylistEntry> {
        vec![
            PlaylistEntry::new("Cascade Breathe", "/cascade-breathe-future-garage-412839.mp3"),
            PlaylistEntry::new("Hype Drill Music", "/hype-drill-music-438398.mp3"),
            PlaylistEntry::new(
                "The Last Point",
                "/the-last-point-beat-electronic-digital-394291.mp3",
            ),
        ]
    }
}

/// Playlist with a cursor that wraps at both ends.
#[derive(Debug, Clone)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    index: usize,
}

impl Playlist {
    /// An empty list falls back to the default tracks.
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        let entries = if entries.is_empty() {
            PlaylistEntry::defaults()
        } else {
            entries
        };
        Self { entries, index: 0 }
    }

    pub fn current(&self) -> &PlaylistEntry {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves the cursor by `delta` and returns the new entry.
    pub fn step(&mut self, delta: i32) -> &PlaylistEntry {
        let len = self.entries.len() as i64;
        self.index = (self.index as i64 + i64::from(delta)).rem_euclid(len) as usize;
        self.current()
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new(PlaylistEntry::defaults())
    }
}
