//! Coalitions of sources and the value functions defined over them

use crate::types::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A subset of the sources under comparison
#[derive(Debug, Clone, Copy)]
pub struct Coalition<'a> {
    sources: &'a [SourceId],
    mask: u32,
}

impl<'a> Coalition<'a> {
    /// `mask` bit `i` set means `sources[i]` is a member
    pub(crate) fn new(sources: &'a [SourceId], mask: u32) -> Self {
        Self { sources, mask }
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn contains(&self, source: &str) -> bool {
        self.members().any(|member| member == source)
    }

    pub fn members(&self) -> impl Iterator<Item = &'a SourceId> + 'a {
        let mask = self.mask;
        self.sources
            .iter()
            .enumerate()
            .filter(move |(i, _)| mask & (1u32 << *i) != 0)
            .map(|(_, source)| source)
    }
}

/// How member overall scores combine into a coalition value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoalitionBlend {
    /// Best single article
    Max,
    /// Average article
    Mean,
    /// Additive; every source is paid exactly its own score
    Sum,
    /// `1 - Π(1 - q)`: each extra source fills part of what is still missing
    Union,
}

impl CoalitionBlend {
    /// Combine member scores; an empty coalition is worth 0
    pub fn combine<I>(self, scores: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let scores: Vec<f64> = scores.into_iter().collect();
        if scores.is_empty() {
            return 0.0;
        }

        match self {
            CoalitionBlend::Max => scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CoalitionBlend::Mean => scores.iter().sum::<f64>() / scores.len() as f64,
            CoalitionBlend::Sum => scores.iter().sum(),
            CoalitionBlend::Union => 1.0 - scores.iter().map(|q| 1.0 - q).product::<f64>(),
        }
    }
}

/// Coalition value function over per-source overall scores
///
/// Sources without a score contribute 0.
pub fn blended_value(
    scores: &BTreeMap<SourceId, f64>,
    blend: CoalitionBlend,
) -> impl Fn(&Coalition<'_>) -> f64 + '_ {
    move |coalition| {
        blend.combine(
            coalition
                .members()
                .map(|member| scores.get(member).copied().unwrap_or(0.0)),
        )
    }
}
