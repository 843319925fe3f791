//! RNG module - uniform piece generation
//!
//! Every draw picks one of the seven kinds independently and uniformly; there
//! is no bag and no anti-repeat rule. The random source is a trait so tests
//! can script the exact sequence.
//!
//! Also provides a simple LCG for deterministic seeded games.

use std::fmt;

use crate::error::ConfigError;
use crate::pieces::PieceBuffer;
use crate::types::PieceKind;

/// Source of uniform random integers
pub trait RandomSource {
    /// Uniform value in `[0, bound)`; `bound` is always at least 1
    fn next_below(&mut self, bound: u32) -> u32;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_below(&mut self, bound: u32) -> u32 {
        // Multiply-shift uses the high bits; the low bits of an LCG cycle quickly.
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }
}

/// Replays a fixed list of values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<u32>,
    pos: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<u32>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptyScript);
        }
        Ok(Self { values, pos: 0 })
    }

    /// Script that yields exactly these kinds, in order
    pub fn from_kinds(kinds: &[PieceKind]) -> Result<Self, ConfigError> {
        Self::new(kinds.iter().map(|k| k.index() as u32).collect())
    }
}

impl RandomSource for ScriptedSource {
    fn next_below(&mut self, bound: u32) -> u32 {
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value % bound
    }
}

/// Uniform piece generator owning the incoming-piece buffer
pub struct PieceGenerator {
    source: Box<dyn RandomSource + Send>,
    incoming: PieceBuffer,
}

impl PieceGenerator {
    pub fn new(source: Box<dyn RandomSource + Send>) -> Self {
        Self {
            source,
            incoming: PieceBuffer::empty(),
        }
    }

    pub fn seeded(seed: u32) -> Self {
        Self::new(Box::new(SimpleRng::new(seed)))
    }

    /// Draw the next kind and overwrite the incoming buffer with its shape
    pub fn next(&mut self) -> PieceKind {
        let index = self.source.next_below(PieceKind::COUNT) as usize;
        // next_below honours its bound, so the lookup never misses.
        let kind = PieceKind::ALL[index % PieceKind::ALL.len()];
        self.incoming.load(kind);
        kind
    }

    /// The preview buffer filled by the last draw
    pub fn incoming(&self) -> &PieceBuffer {
        &self.incoming
    }

    /// Empty the incoming buffer (on game reset)
    pub fn clear(&mut self) {
        self.incoming.clear();
    }
}

impl fmt::Debug for PieceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceGenerator")
            .field("incoming", &self.incoming)
            .finish_non_exhaustive()
    }
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::seeded(1)
    }
}
