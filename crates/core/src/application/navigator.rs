// Lead Navigator - ordered, filtered, optionally shuffled view over a list

use crate::domain::{Lead, LeadFilter};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Movement request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Current,
    First,
    Next,
    Previous,
    Last,
    Jump(usize),
}

/// View over the leads matching a filter
///
/// Order is import order, or a permutation fully determined by the shuffle
/// seed so that every device shows the same sequence. No wrap-around.
#[derive(Debug, Clone)]
pub struct LeadNavigator {
    leads: Vec<Lead>,
    index: usize,
}

impl LeadNavigator {
    pub fn new(mut leads: Vec<Lead>, filter: &LeadFilter, shuffle_seed: Option<u64>) -> Self {
        leads.sort_by_key(|l| l.position);
        leads.retain(|l| filter.matches(l));

        if let Some(seed) = shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            leads.shuffle(&mut rng);
        }

        Self { leads, index: 0 }
    }

    /// Restore a saved position (clamped into range)
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = self.clamp(index);
        self
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.leads.len().saturating_sub(1))
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Lead> {
        self.leads.get(self.index)
    }

    pub fn at_end(&self) -> bool {
        self.index + 1 >= self.leads.len()
    }

    /// Apply a movement; returns whether the position changed
    pub fn apply(&mut self, direction: Direction) -> bool {
        let before = self.index;
        self.index = match direction {
            Direction::Current => before,
            Direction::First => 0,
            Direction::Next => self.clamp(before + 1),
            Direction::Previous => before.saturating_sub(1),
            Direction::Last => self.clamp(usize::MAX),
            Direction::Jump(target) => self.clamp(target),
        };
        self.index != before
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }
}
