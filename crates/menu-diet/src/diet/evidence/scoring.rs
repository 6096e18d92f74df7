use crate::diet::domain::{ConfidenceLevel, ExcludedItem, MatchKind, MatchedItem, ScoreBreakdown};

use super::item::{EXCLUSION_WEIGHT, STRONG_EXCLUSION_WEIGHT};

const NEGATIVE_DISCOUNT: f64 = 0.35;
const MAX_EVIDENCE_BOOST: i64 = 20;
const MAX_EVIDENCE_PENALTY: i64 = 18;

/// Aggregate inputs to the scoring formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tally {
    pub positive_evidence: f64,
    pub negative_evidence: f64,
    pub strong_signals: usize,
    pub manual_overrides: usize,
    pub excluded_count: usize,
    pub total_items: usize,
}

impl Tally {
    pub(crate) fn from_items(
        matched: &[MatchedItem],
        excluded: &[ExcludedItem],
        total_items: usize,
    ) -> Self {
        let positive_evidence = matched.iter().map(|item| item.weight).sum();
        let negative_evidence = excluded
            .iter()
            .map(|item| {
                if item.strong_signal {
                    STRONG_EXCLUSION_WEIGHT
                } else {
                    EXCLUSION_WEIGHT
                }
            })
            .sum();

        Self {
            positive_evidence,
            negative_evidence,
            strong_signals: matched.iter().filter(|item| item.strong_signal).count(),
            manual_overrides: matched
                .iter()
                .filter(|item| item.kind == MatchKind::ManualOverride)
                .count(),
            excluded_count: excluded.len(),
            total_items,
        }
    }
}

/// Result of applying the formula to a tally.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Scored {
    pub score: u8,
    pub confidence: ConfidenceLevel,
    pub match_ratio: f64,
    pub breakdown: ScoreBreakdown,
}

pub(crate) fn match_ratio(tally: &Tally) -> f64 {
    if tally.total_items == 0 {
        return 0.0;
    }
    let raw = (tally.positive_evidence - NEGATIVE_DISCOUNT * tally.negative_evidence)
        / tally.total_items as f64;
    raw.clamp(0.0, 1.0)
}

pub(crate) fn confidence_for(
    total_items: usize,
    strong_signals: usize,
    ratio: f64,
) -> ConfidenceLevel {
    if total_items == 0 {
        return ConfidenceLevel::Low;
    }
    if strong_signals >= 2 && ratio >= 0.2 {
        return ConfidenceLevel::High;
    }
    if total_items < 5 {
        return if ratio >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };
    }
    if ratio >= 0.3 {
        ConfidenceLevel::High
    } else if ratio > 0.0 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

pub(crate) fn score(tally: &Tally) -> Scored {
    let ratio = match_ratio(tally);
    let confidence = confidence_for(tally.total_items, tally.strong_signals, ratio);

    let ratio_score = (ratio * 100.0).round() as i64;
    let evidence_boost = ((3 * tally.strong_signals + 5 * tally.manual_overrides) as f64
        + 4.0 * ratio)
        .round() as i64;
    let evidence_boost = evidence_boost.min(MAX_EVIDENCE_BOOST);
    let evidence_penalty = (2 * tally.excluded_count as i64).min(MAX_EVIDENCE_PENALTY);
    let multiplier = confidence.multiplier();

    let raw = ((ratio_score + evidence_boost - evidence_penalty) as f64 * multiplier).round();
    let score = raw.clamp(0.0, 100.0) as u8;

    Scored {
        score,
        confidence,
        match_ratio: ratio,
        breakdown: ScoreBreakdown {
            positive_evidence: tally.positive_evidence,
            negative_evidence: tally.negative_evidence,
            strong_signals: tally.strong_signals,
            manual_overrides: tally.manual_overrides,
            ratio_score,
            evidence_boost,
            evidence_penalty,
            confidence_multiplier: multiplier,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(
        positive: f64,
        negative: f64,
        strong: usize,
        manual: usize,
        excluded: usize,
        total: usize,
    ) -> Tally {
        Tally {
            positive_evidence: positive,
            negative_evidence: negative,
            strong_signals: strong,
            manual_overrides: manual,
            excluded_count: excluded,
            total_items: total,
        }
    }

    #[test]
    fn empty_menu_scores_zero_with_low_confidence() {
        let scored = score(&tally(0.0, 0.0, 0, 0, 0, 0));
        assert_eq!(scored.score, 0);
        assert_eq!(scored.confidence, ConfidenceLevel::Low);
        assert_eq!(scored.match_ratio, 0.0);
    }

    #[test]
    fn small_menu_confidence_thresholds() {
        assert_eq!(confidence_for(3, 1, 0.5), ConfidenceLevel::Medium);
        assert_eq!(confidence_for(3, 1, 0.49), ConfidenceLevel::Low);
        assert_eq!(confidence_for(3, 2, 0.2), ConfidenceLevel::High);
    }

    #[test]
    fn large_menu_confidence_thresholds() {
        assert_eq!(confidence_for(10, 0, 0.3), ConfidenceLevel::High);
        assert_eq!(confidence_for(10, 0, 0.1), ConfidenceLevel::Medium);
        assert_eq!(confidence_for(10, 0, 0.0), ConfidenceLevel::Low);
        assert_eq!(confidence_for(10, 5, 0.19), ConfidenceLevel::Medium);
    }

    #[test]
    fn formula_matches_reference_values() {
        // 2 matches out of 3, one strong: ratio 0.6667, MEDIUM on a small menu.
        let scored = score(&tally(2.0, 0.0, 1, 0, 0, 3));
        assert_eq!(scored.confidence, ConfidenceLevel::Medium);
        assert_eq!(scored.breakdown.ratio_score, 67);
        assert_eq!(scored.breakdown.evidence_boost, 6);
        assert_eq!(scored.breakdown.evidence_penalty, 0);
        // round((67 + 6) * 0.92) = round(67.16)
        assert_eq!(scored.score, 67);
    }

    #[test]
    fn negative_evidence_is_discounted_and_penalized() {
        // 10 items, 4 matches, 2 plain exclusions.
        let scored = score(&tally(4.0, 2.0, 0, 0, 2, 10));
        assert!((scored.match_ratio - 0.33).abs() < 1e-9);
        assert_eq!(scored.confidence, ConfidenceLevel::High);
        assert_eq!(scored.breakdown.ratio_score, 33);
        assert_eq!(scored.breakdown.evidence_boost, 1);
        assert_eq!(scored.breakdown.evidence_penalty, 4);
        assert_eq!(scored.score, 30);
    }

    #[test]
    fn boost_and_penalty_are_capped() {
        let scored = score(&tally(10.0, 0.0, 10, 0, 0, 10));
        assert_eq!(scored.breakdown.evidence_boost, 20);
        assert_eq!(scored.score, 100);

        let penalized = score(&tally(1.0, 20.0, 0, 0, 20, 30));
        assert_eq!(penalized.breakdown.evidence_penalty, 18);
        assert_eq!(penalized.score, 0);
    }
}
