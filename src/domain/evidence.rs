//! Research evidence behind a forecast.
//!
//! The tiered research collaborator reports the sources it consulted, an
//! information-quality category, and its own confidence level. This module
//! turns that evidence into [`ConfidenceFactors`] and into the red/green
//! flags shown next to each opportunity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use super::forecast::ConfidenceFactors;

/// Sources needed for full consensus credit.
const CONSENSUS_SOURCE_TARGET: f64 = 5.0;

/// Information quality category assigned by deep research.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationQuality {
    Low,
    Medium,
    High,
}

impl InformationQuality {
    /// Recency sub-score for this category.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.6,
            Self::Low => 0.3,
        }
    }
}

/// The research model's self-reported confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    MediumHigh,
    High,
}

impl ConfidenceLevel {
    /// Base-rate alignment sub-score for this level.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::MediumHigh => 0.8,
            Self::Medium => 0.6,
            Self::Low => 0.4,
        }
    }

    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High | Self::MediumHigh)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::MediumHigh => "medium-high",
            Self::High => "high",
        }
    }
}

/// A source consulted during research.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    /// Credibility rating from 1 to 5.
    pub credibility: u8,
}

impl Source {
    pub fn new(url: impl Into<String>, credibility: u8) -> Self {
        Self {
            url: url.into(),
            credibility,
        }
    }

    /// Host part of the URL, if it parses.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    }
}

/// Evidence gathered by the research collaborator for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchEvidence {
    #[serde(default)]
    pub sources: Vec<Source>,
    pub information_quality: InformationQuality,
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub reasoning: String,
    /// Low and high ends of the model's probability interval.
    #[serde(default)]
    pub confidence_interval: Option<(f64, f64)>,
    #[serde(default)]
    pub recent_developments: bool,
    #[serde(default)]
    pub key_findings: usize,
}

impl ResearchEvidence {
    /// Number of distinct source hosts. Unparseable URLs are ignored.
    #[must_use]
    pub fn distinct_hosts(&self) -> usize {
        self.sources
            .iter()
            .filter_map(Source::host)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Mean credibility on the 1-5 scale, or 0 with no sources.
    #[must_use]
    pub fn mean_credibility(&self) -> f64 {
        if self.sources.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .sources
            .iter()
            .map(|s| f64::from(s.credibility.clamp(1, 5)))
            .sum();
        total / self.sources.len() as f64
    }

    fn reasoning_clarity(&self) -> f64 {
        match self.reasoning.chars().count() {
            n if n > 1000 => 1.0,
            n if n > 500 => 0.8,
            n if n > 200 => 0.6,
            _ => 0.4,
        }
    }

    /// Red and green flags for this evidence.
    ///
    /// `liquidity` and `reference_liquidity` come from the quote and the
    /// scoring policy respectively.
    #[must_use]
    pub fn flags(&self, liquidity: f64, reference_liquidity: f64) -> Flags {
        let mut flags = Flags::default();
        let hosts = self.distinct_hosts();

        if !self.sources.is_empty() && hosts < 3 {
            flags
                .red
                .push(format!("low source diversity ({hosts} distinct hosts)"));
        }
        if let Some((low, high)) = self.confidence_interval {
            let width = high - low;
            if width > 0.4 {
                flags
                    .red
                    .push(format!("wide confidence interval ({:.1}%)", width * 100.0));
            }
        }
        if !self.confidence_level.is_high() {
            flags.red.push(format!(
                "low model confidence ({})",
                self.confidence_level.as_str()
            ));
        }
        if self.information_quality == InformationQuality::Low {
            flags.red.push("low information quality".to_string());
        }

        let credible = self.sources.iter().filter(|s| s.credibility >= 4).count();
        if credible >= 3 {
            flags.green.push(format!("{credible} high-quality sources"));
        }
        if hosts >= 5 {
            flags
                .green
                .push(format!("good source diversity ({hosts} hosts)"));
        }
        if self.confidence_level.is_high() {
            flags.green.push(format!(
                "high model confidence ({})",
                self.confidence_level.as_str()
            ));
        }
        if self.recent_developments {
            flags.green.push("recent material developments".to_string());
        }
        if self.information_quality == InformationQuality::High {
            flags.green.push("high-quality information".to_string());
        }
        if liquidity > reference_liquidity {
            flags.green.push(format!("good liquidity ({liquidity:.0})"));
        }
        if self.key_findings >= 5 {
            flags.green.push(format!("{} key findings", self.key_findings));
        }

        flags
    }
}

impl ConfidenceFactors {
    /// Derive the five sub-scores from research evidence.
    #[must_use]
    pub fn from_evidence(evidence: &ResearchEvidence) -> Self {
        Self {
            source_quality: evidence.mean_credibility() / 5.0,
            information_recency: evidence.information_quality.score(),
            consensus: (evidence.distinct_hosts() as f64 / CONSENSUS_SOURCE_TARGET).min(1.0),
            base_rate_alignment: evidence.confidence_level.score(),
            reasoning_clarity: evidence.reasoning_clarity(),
        }
    }
}

/// Informational red and green flags. Never used for sizing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub red: Vec<String>,
    pub green: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(sources: Vec<Source>) -> ResearchEvidence {
        ResearchEvidence {
            sources,
            information_quality: InformationQuality::Medium,
            confidence_level: ConfidenceLevel::MediumHigh,
            reasoning: "x".repeat(600),
            confidence_interval: Some((0.5, 0.7)),
            recent_developments: false,
            key_findings: 2,
        }
    }

    #[test]
    fn factors_follow_evidence_tables() {
        let ev = evidence(vec![
            Source::new("https://www.reuters.com/a", 5),
            Source::new("https://apnews.com/b", 4),
            Source::new("https://www.reuters.com/c", 3),
        ]);
        let factors = ConfidenceFactors::from_evidence(&ev);

        assert!((factors.source_quality - 0.8).abs() < 1e-12);
        assert!((factors.information_recency - 0.6).abs() < 1e-12);
        assert!((factors.consensus - 0.4).abs() < 1e-12);
        assert!((factors.base_rate_alignment - 0.8).abs() < 1e-12);
        assert!((factors.reasoning_clarity - 0.8).abs() < 1e-12);
    }

    #[test]
    fn no_sources_gives_zero_quality_and_consensus() {
        let factors = ConfidenceFactors::from_evidence(&evidence(vec![]));
        assert_eq!(factors.source_quality, 0.0);
        assert_eq!(factors.consensus, 0.0);
    }

    #[test]
    fn consensus_caps_at_one() {
        let sources = (0..8)
            .map(|i| Source::new(format!("https://site{i}.example/x"), 3))
            .collect();
        let factors = ConfidenceFactors::from_evidence(&evidence(sources));
        assert_eq!(factors.consensus, 1.0);
    }

    #[test]
    fn unparseable_urls_do_not_count_as_hosts() {
        let ev = evidence(vec![
            Source::new("not a url", 3),
            Source::new("https://example.org/", 3),
        ]);
        assert_eq!(ev.distinct_hosts(), 1);
    }

    #[test]
    fn flags_report_low_diversity_and_liquidity() {
        let ev = evidence(vec![Source::new("https://one.example/", 5)]);
        let flags = ev.flags(25_000.0, 10_000.0);

        assert!(flags.red.iter().any(|f| f.contains("low source diversity")));
        assert!(flags.green.iter().any(|f| f.contains("good liquidity")));
        assert!(flags.green.iter().any(|f| f.contains("high model confidence")));
    }

    #[test]
    fn flags_report_wide_interval_and_low_quality() {
        let mut ev = evidence(vec![]);
        ev.confidence_interval = Some((0.2, 0.8));
        ev.information_quality = InformationQuality::Low;
        ev.confidence_level = ConfidenceLevel::Medium;
        let flags = ev.flags(0.0, 10_000.0);

        assert!(flags.red.iter().any(|f| f.contains("wide confidence interval")));
        assert!(flags.red.iter().any(|f| f.contains("low information quality")));
        assert!(flags.red.iter().any(|f| f.contains("low model confidence (medium)")));
    }

    #[test]
    fn confidence_level_deserializes_kebab_case() {
        let level: ConfidenceLevel = serde_json::from_str("\"medium-high\"").unwrap();
        assert_eq!(level, ConfidenceLevel::MediumHigh);
    }
}
