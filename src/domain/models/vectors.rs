//! Epistemic vector snapshots.
//!
//! An agent reports its confidence along a fixed set of named dimensions
//! ("vectors"). A snapshot is stored as a name → score map so that payloads
//! carrying extra or missing dimensions still round-trip unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const KNOW: &str = "know";
pub const UNCERTAINTY: &str = "uncertainty";
pub const COMPLETION: &str = "completion";
pub const CONTEXT: &str = "context";
pub const DO: &str = "do";
pub const SIGNAL: &str = "signal";
pub const COHERENCE: &str = "coherence";
pub const ENGAGEMENT: &str = "engagement";

/// The canonical vector names, in reporting order.
pub const CANONICAL_VECTORS: [&str; 8] = [
    KNOW,
    UNCERTAINTY,
    COMPLETION,
    CONTEXT,
    DO,
    SIGNAL,
    COHERENCE,
    ENGAGEMENT,
];

/// One self-assessment (or grounded estimate): vector name → score in `[0.0, 1.0]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpistemicVectors(BTreeMap<String, f64>);

impl EpistemicVectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn know(&self) -> Option<f64> {
        self.get(KNOW)
    }

    pub fn uncertainty(&self) -> Option<f64> {
        self.get(UNCERTAINTY)
    }

    pub fn completion(&self) -> Option<f64> {
        self.get(COMPLETION)
    }

    pub fn context(&self) -> Option<f64> {
        self.get(CONTEXT)
    }

    pub fn r#do(&self) -> Option<f64> {
        self.get(DO)
    }

    pub fn signal(&self) -> Option<f64> {
        self.get(SIGNAL)
    }

    pub fn coherence(&self) -> Option<f64> {
        self.get(COHERENCE)
    }

    pub fn engagement(&self) -> Option<f64> {
        self.get(ENGAGEMENT)
    }

    pub fn is_canonical(name: &str) -> bool {
        CANONICAL_VECTORS.contains(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate vectors in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterate canonical vectors in reporting order, then any others in
    /// name order.
    pub fn iter_reporting_order(&self) -> impl Iterator<Item = (&str, f64)> {
        let canonical = CANONICAL_VECTORS
            .iter()
            .filter_map(|name| self.get(name).map(|v| (*name, v)));
        let extra = self.iter().filter(|(name, _)| !Self::is_canonical(name));
        canonical.chain(extra)
    }
}

impl FromIterator<(String, f64)> for EpistemicVectors {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, f64)> for EpistemicVectors {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}
