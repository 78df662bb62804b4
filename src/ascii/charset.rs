//! Glyph ramps for ASCII rendering.

use std::fmt;
use std::str::FromStr;

/// Standard ASCII density ramp (10 levels).
/// Characters ordered from darkest (space) to brightest (@).
pub const STANDARD_CHARSET: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Block character set (5 levels).
/// Uses Unicode block characters for higher perceived resolution.
pub const BLOCKS_CHARSET: &[char] = &[' ', '░', '▒', '▓', '█'];

/// Minimal character set (4 levels).
/// Clean, less noisy look.
pub const MINIMAL_CHARSET: &[char] = &[' ', '.', ':', '#'];

/// Glyph ramp used to approximate luminance.
///
/// Every ramp is ordered darkest first, so level 0 is the glyph for
/// black pixels when rendering without inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharSet {
    /// Standard ASCII density ramp (10 levels)
    #[default]
    Standard,
    /// Block character set (5 levels) using Unicode blocks
    Blocks,
    /// Minimal character set (4 levels) for a clean look
    Minimal,
}

impl CharSet {
    /// All charsets, in cycling order.
    pub const ALL: [CharSet; 3] = [CharSet::Standard, CharSet::Blocks, CharSet::Minimal];

    /// Get the character slice for this charset.
    pub fn chars(&self) -> &'static [char] {
        match self {
            CharSet::Standard => STANDARD_CHARSET,
            CharSet::Blocks => BLOCKS_CHARSET,
            CharSet::Minimal => MINIMAL_CHARSET,
        }
    }

    /// Number of brightness levels in the ramp.
    pub fn levels(&self) -> usize {
        self.chars().len()
    }

    /// Position of this charset in [`CharSet::ALL`].
    pub fn index(&self) -> usize {
        match self {
            CharSet::Standard => 0,
            CharSet::Blocks => 1,
            CharSet::Minimal => 2,
        }
    }

    /// Get a human-readable name for the charset.
    pub fn name(&self) -> &'static str {
        match self {
            CharSet::Standard => "standard",
            CharSet::Blocks => "blocks",
            CharSet::Minimal => "minimal",
        }
    }

    /// Glyph at the mirrored ramp position.
    ///
    /// Mapping every glyph of a non-inverted render through this yields the
    /// inverted render. Returns `None` for characters outside the ramp.
    pub fn mirror(&self, glyph: char) -> Option<char> {
        let chars = self.chars();
        chars
            .iter()
            .position(|&c| c == glyph)
            .map(|idx| chars[chars.len() - 1 - idx])
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "ascii" => Ok(CharSet::Standard),
            "blocks" | "block" => Ok(CharSet::Blocks),
            "minimal" => Ok(CharSet::Minimal),
            other => Err(format!(
                "Unknown charset '{}'. Available charsets: standard, blocks, minimal",
                other
            )),
        }
    }
}
