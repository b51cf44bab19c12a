//! Stint segmentation: split the ordered lap feed into contiguous stints.
//!
//! A stint boundary is detected purely by a change of stint id; there is no
//! minimum length, so a single-lap stint is valid and produces a degenerate
//! filter run downstream. The feed is consumed once and lazily: each call to
//! `next()` pulls laps until the boundary of the following stint.
//!
//! # Ordering contract
//! - stint ids must not decrease as the feed advances
//! - lap numbers must strictly increase inside one stint
//!
//! A violation yields `Err(OutOfOrderError)` and ends the iteration; stints
//! already yielded stay valid (per-stint isolation).

use crate::error::OutOfOrderError;
use crate::types::{Compound, LapRecord, StintId};

/// One contiguous run of laps on a single tyre set.
#[derive(Clone, Debug)]
pub struct Stint {
    pub id: StintId,
    /// Compound of the first lap; constant across the stint by construction
    /// of the upstream feed.
    pub compound: Compound,
    /// Laps in feed order, never empty.
    pub laps: Vec<LapRecord>,
}

impl Stint {
    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}

/// Lazy iterator of stint groups over a once-only lap feed.
pub struct StintSegmenter<I: Iterator<Item = LapRecord>> {
    laps: I,
    /// First lap of the next stint, pulled while closing the previous one.
    pending: Option<LapRecord>,
    done: bool,
}

impl<I: Iterator<Item = LapRecord>> StintSegmenter<I> {
    pub fn new(laps: impl IntoIterator<Item = LapRecord, IntoIter = I>) -> Self {
        Self {
            laps: laps.into_iter(),
            pending: None,
            done: false,
        }
    }
}

/// Segment an ordered lap feed into stints.
pub fn segment<I>(laps: I) -> StintSegmenter<I::IntoIter>
where
    I: IntoIterator<Item = LapRecord>,
{
    StintSegmenter::new(laps)
}

impl<I: Iterator<Item = LapRecord>> Iterator for StintSegmenter<I> {
    type Item = Result<Stint, OutOfOrderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let first = match self.pending.take().or_else(|| self.laps.next()) {
            Some(lap) => lap,
            None => {
                self.done = true;
                return None;
            }
        };

        let mut stint = Stint {
            id: first.stint_id,
            compound: first.compound,
            laps: vec![first],
        };

        loop {
            let lap = match self.laps.next() {
                Some(lap) => lap,
                None => {
                    self.done = true;
                    return Some(Ok(stint));
                }
            };

            let prev = stint.laps.last().expect("stint starts non-empty");
            if lap.stint_id == stint.id {
                if lap.lap_number <= prev.lap_number {
                    self.done = true;
                    return Some(Err(OutOfOrderError::LapRegression {
                        stint: stint.id,
                        prev_lap: prev.lap_number,
                        lap_number: lap.lap_number,
                    }));
                }
                stint.laps.push(lap);
            } else if lap.stint_id > stint.id {
                self.pending = Some(lap);
                return Some(Ok(stint));
            } else {
                self.done = true;
                return Some(Err(OutOfOrderError::StintRegression {
                    lap_number: lap.lap_number,
                    prev: stint.id,
                    next: lap.stint_id,
                }));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
