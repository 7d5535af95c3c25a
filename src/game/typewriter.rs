//=========================================================================
// Typewriter
//=========================================================================
//
// Character-by-character reveal of a passage, driven by game time.
//
//=========================================================================

/// Base reveal rate before the `text_speed` multiplier.
pub const CHARS_PER_SECOND: f64 = 30.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Typewriter {
    text: String,
    total: usize,
    shown: usize,
    /// Fraction of a character carried to the next tick.
    carry: f64,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        let mut typewriter = Self::default();
        typewriter.set_text(text);
        typewriter
    }

    /// Starts revealing `text` from the beginning.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.total = self.text.chars().count();
        self.shown = 0;
        self.carry = 0.0;
    }

    /// Reveals `dt` seconds worth of characters at `speed` × base rate.
    pub fn update(&mut self, dt: f64, speed: f64) {
        if self.is_complete() {
            return;
        }

        self.carry += CHARS_PER_SECOND * speed.max(0.0) * dt.max(0.0);
        let whole = self.carry.floor();
        self.carry -= whole;
        self.shown = (self.shown + whole as usize).min(self.total);
    }

    /// Shows everything at once.
    pub fn complete(&mut self) {
        self.shown = self.total;
        self.carry = 0.0;
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.total
    }

    /// Revealed prefix, always cut on a char boundary.
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
