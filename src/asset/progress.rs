/// Whole-percent progress of one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadProgress(u8);

impl LoadProgress {
    pub fn percent(self) -> u8 {
        self.0
    }

    /// `round(loaded / total * 100)`, clamped to 0..=100. No value without a total.
    pub fn from_bytes(loaded: u64, total: Option<u64>) -> Option<Self> {
        let total = total.filter(|&t| t > 0)?;
        let ratio = loaded as f64 / total as f64;
        Some(Self((ratio * 100.0).round().clamp(0.0, 100.0) as u8))
    }
}

/// Turns byte counts into a non-decreasing stream of percentages.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    total: Option<u64>,
    loaded: u64,
    last: Option<LoadProgress>,
}

impl ProgressTracker {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total,
            loaded: 0,
            last: None,
        }
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    /// Account for `n` more bytes. Returns a value only when the percentage moved up.
    pub fn advance(&mut self, n: usize) -> Option<LoadProgress> {
        self.loaded = self.loaded.saturating_add(n as u64);
        let next = LoadProgress::from_bytes(self.loaded, self.total)?;
        if self.last.is_some_and(|last| next <= last) {
            return None;
        }
        self.last = Some(next);
        Some(next)
    }
}
