//! Random byte corruption of JPEG scan data
//!
//! A [`CorruptionPlan`] is a list of body offsets drawn with replacement.
//! Applying it zeroes each targeted byte unless the active [`GuardMode`]
//! protects that offset. Every mutation that actually changes a byte is
//! recorded as a [`ByteChange`], so the report doubles as a diff against the
//! original body.

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::formats::{EOI, MARKER_PREFIX};

/// Number of offsets drawn per file unless configured otherwise
pub const DEFAULT_CORRUPTION_COUNT: usize = 400;

/// Value written at every corrupted offset
pub const CORRUPT_VALUE: u8 = 0x00;

/// Which offsets are spared from corruption
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GuardMode {
    /// Historical check `byte != FF || byte != D9`. It holds for every byte,
    /// so nothing is ever protected.
    #[default]
    Literal,
    /// Protect both bytes of an actual FF D9 (End of Image) pair
    PairAware,
}

/// A single byte change made by the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteChange {
    pub offset: usize,
    pub old_value: u8,
    pub new_value: u8,
}

/// Offsets into a body buffer, generated once per file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorruptionPlan {
    offsets: Vec<usize>,
}

impl CorruptionPlan {
    /// Draw `count` offsets uniformly from `[0, len)`, duplicates allowed.
    ///
    /// An empty body yields an empty plan.
    pub fn generate<R: Rng + ?Sized>(len: usize, count: usize, rng: &mut R) -> Self {
        if len == 0 {
            return Self::default();
        }
        let offsets = (0..count).map(|_| rng.gen_range(0..len)).collect();
        Self { offsets }
    }

    /// Build a plan from explicit offsets
    #[cfg(test)]
    pub fn from_offsets(offsets: Vec<usize>) -> Self {
        Self { offsets }
    }

    #[cfg(test)]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Zero every targeted byte the guard permits.
    ///
    /// Offsets outside the body are ignored.
    pub fn apply(&self, body: &mut [u8], guard: GuardMode) -> CorruptionReport {
        let mut report = CorruptionReport {
            planned: self.offsets.len(),
            ..Default::default()
        };

        for &offset in &self.offsets {
            if offset >= body.len() {
                continue;
            }
            if is_protected_offset(body, offset, guard) {
                report.protected += 1;
                continue;
            }

            let old_value = body[offset];
            body[offset] = CORRUPT_VALUE;
            if old_value != CORRUPT_VALUE {
                let change = ByteChange {
                    offset,
                    old_value,
                    new_value: CORRUPT_VALUE,
                };
                log::trace!(
                    "Body offset {}: {:02X} -> {:02X}",
                    change.offset,
                    change.old_value,
                    change.new_value
                );
                report.changes.push(change);
            }
        }

        report
    }
}

/// Outcome of corrupting one body
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorruptionReport {
    /// Offsets in the plan
    pub planned: usize,
    /// Offsets skipped by the guard
    pub protected: usize,
    /// Bytes that actually changed value
    pub changes: Vec<ByteChange>,
}

impl CorruptionReport {
    pub fn changed(&self) -> usize {
        self.changes.len()
    }
}

/// Whether corrupting `offset` would damage a byte the guard protects
pub fn is_protected_offset(body: &[u8], offset: usize, guard: GuardMode) -> bool {
    let Some(&byte) = body.get(offset) else {
        return false;
    };

    match guard {
        GuardMode::Literal => {
            // Always true: one byte cannot equal both FF and D9
            let permitted = byte != MARKER_PREFIX || byte != EOI;
            !permitted
        }
        GuardMode::PairAware => {
            let starts_pair = byte == MARKER_PREFIX && body.get(offset + 1) == Some(&EOI);
            let ends_pair = byte == EOI
                && offset
                    .checked_sub(1)
                    .and_then(|prev| body.get(prev))
                    .is_some_and(|&prev| prev == MARKER_PREFIX);
            starts_pair || ends_pair
        }
    }
}

/// Draw a plan for `body` and apply it in place
pub fn corrupt<R: Rng + ?Sized>(
    body: &mut [u8],
    count: usize,
    guard: GuardMode,
    rng: &mut R,
) -> CorruptionReport {
    let plan = CorruptionPlan::generate(body.len(), count, rng);
    log::debug!(
        "Corrupting {} of {} body bytes ({:?} guard)",
        plan.len(),
        body.len(),
        guard
    );
    plan.apply(body, guard)
}
