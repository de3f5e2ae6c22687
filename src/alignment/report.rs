use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::metrics::percentage;
use crate::error::EvalError;
use crate::pipeline::runtime::Evaluator;
use crate::review::TranscriptReview;
use crate::types::{CleanCategory, CleaningResult, Metrics, TokenRange};

pub const SCHEMA_VERSION: u32 = 1;

/// One row of a scoring corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub id: String,
    pub reference: String,
    pub hypothesis: String,
    #[serde(default)]
    pub range: TokenRange,
    #[serde(default)]
    pub review: Option<TranscriptReview>,
    /// Raw transcript to run through cleaning alongside scoring.
    #[serde(default)]
    pub raw_transcript: Option<String>,
    #[serde(default)]
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub case_count: usize,
    pub default_preset: String,
    pub normalize_case: bool,
    pub strip_punctuation: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub has_review: bool,
    pub metrics: CaseMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<CleaningResult>,
    pub notes: Vec<String>,
}

/// Metrics of one case with percentages rounded to two decimals.
#[derive(Debug, Clone, Serialize)]
pub struct CaseMetrics {
    pub wer: f64,
    pub custom_wer: f64,
    pub cer: f64,
    pub insertions: usize,
    pub deletions: usize,
    pub substitutions: usize,
    pub critical_substitutions: usize,
    pub reference_word_count: usize,
    pub char_errors: usize,
    pub reference_char_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub global: GlobalRates,
    pub distributions: AggregateDistributions,
    pub outliers: OutlierReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateCounts {
    pub total: usize,
    pub with_review: usize,
    pub cleaned: usize,
    pub reference_words: usize,
    pub reference_chars: usize,
}

/// Error totals over total reference units (micro average).
#[derive(Debug, Clone, Serialize)]
pub struct GlobalRates {
    pub wer: f64,
    pub custom_wer: f64,
    pub cer: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AggregateDistributions {
    pub wer: Option<MetricDistribution>,
    pub custom_wer: Option<MetricDistribution>,
    pub cer: Option<MetricDistribution>,
    pub clean_rate: Option<MetricDistribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDistribution {
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub worst_wer: Vec<OutlierEntry>,
    pub worst_custom_wer: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub value: f64,
}

pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>, EvalError> {
    let data = std::fs::read_to_string(path).map_err(|e| EvalError::io("read cases file", e))?;
    serde_json::from_str(&data).map_err(|e| EvalError::json("parse cases file", e))
}

pub fn compute_case_report(
    evaluator: &Evaluator,
    case: &EvalCase,
) -> Result<CaseReport, EvalError> {
    let mut notes = Vec::new();
    let evaluation = evaluator.evaluate(
        &case.reference,
        &case.hypothesis,
        &case.range,
        case.review.as_ref(),
    )?;
    let metrics = &evaluation.metrics;

    if metrics.reference_word_count == 0 {
        notes.push("empty_reference".to_string());
    }
    if !case.range.reference.is_full() || !case.range.hypothesis.is_full() {
        notes.push("range_restricted".to_string());
    }
    if let Some(review) = case.review.as_ref() {
        let summary = evaluator.review_summary(review);
        if summary.unreviewed > 0 {
            notes.push(format!("unreviewed_words={}", summary.unreviewed));
        }
        if summary.low_confidence > 0 {
            notes.push(format!("low_confidence_words={}", summary.low_confidence));
        }
    }

    let clean = match case.raw_transcript.as_deref() {
        Some(raw) => {
            let preset = case
                .preset
                .as_deref()
                .unwrap_or(evaluator.config().default_preset.as_str());
            if !evaluator.presets().contains(preset) {
                notes.push(format!("unknown_preset={preset}"));
            }
            let result = evaluator.clean_or_default(raw, preset)?;
            if result.category == Some(CleanCategory::Poor) {
                notes.push("clean_rate_poor".to_string());
            }
            Some(result)
        }
        None => None,
    };

    Ok(CaseReport {
        id: case.id.clone(),
        has_review: case.review.is_some(),
        metrics: CaseMetrics::from_metrics(metrics),
        clean,
        notes,
    })
}

pub fn build_report(
    evaluator: &Evaluator,
    cases: Vec<CaseReport>,
    generated_at: String,
) -> Report {
    let config = evaluator.config();
    let aggregates = aggregate_reports(&cases, config.outlier_top_n);
    Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at,
            case_count: cases.len(),
            default_preset: config.default_preset.clone(),
            normalize_case: config.normalize_case,
            strip_punctuation: config.strip_punctuation,
        },
        cases,
        aggregates,
    }
}

pub fn aggregate_reports(cases: &[CaseReport], top_n: usize) -> AggregateReport {
    let mut reference_words = 0usize;
    let mut reference_chars = 0usize;
    let mut word_errors = 0usize;
    let mut custom_errors = 0usize;
    let mut char_errors = 0usize;

    for case in cases {
        let m = &case.metrics;
        reference_words += m.reference_word_count;
        reference_chars += m.reference_char_count;
        word_errors += m.insertions + m.deletions + m.substitutions;
        custom_errors += m.insertions + m.deletions + m.critical_substitutions;
        char_errors += m.char_errors;
    }

    let wer: Vec<f64> = cases.iter().map(|c| c.metrics.wer).collect();
    let custom_wer: Vec<f64> = cases.iter().map(|c| c.metrics.custom_wer).collect();
    let cer: Vec<f64> = cases.iter().map(|c| c.metrics.cer).collect();
    let clean_rate: Vec<f64> = cases
        .iter()
        .filter_map(|c| c.clean.as_ref().and_then(|r| r.clean_rate))
        .map(f64::from)
        .collect();

    AggregateReport {
        counts: AggregateCounts {
            total: cases.len(),
            with_review: cases.iter().filter(|c| c.has_review).count(),
            cleaned: cases.iter().filter(|c| c.clean.is_some()).count(),
            reference_words,
            reference_chars,
        },
        global: GlobalRates {
            wer: round2(percentage(word_errors, reference_words)),
            custom_wer: round2(percentage(custom_errors, reference_words)),
            cer: round2(percentage(char_errors, reference_chars)),
        },
        distributions: AggregateDistributions {
            wer: distribution_or_none(&wer),
            custom_wer: distribution_or_none(&custom_wer),
            cer: distribution_or_none(&cer),
            clean_rate: distribution_or_none(&clean_rate),
        },
        outliers: OutlierReport {
            worst_wer: ranked_outliers(cases, top_n, |c| c.metrics.wer),
            worst_custom_wer: ranked_outliers(cases, top_n, |c| c.metrics.custom_wer),
        },
    }
}

impl CaseMetrics {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self {
            wer: round2(metrics.wer),
            custom_wer: round2(metrics.custom_wer),
            cer: round2(metrics.cer),
            insertions: metrics.insertions,
            deletions: metrics.deletions,
            substitutions: metrics.substitutions,
            critical_substitutions: metrics.critical_substitutions,
            reference_word_count: metrics.reference_word_count,
            char_errors: metrics.char_errors,
            reference_char_count: metrics.reference_char_count,
        }
    }
}

fn ranked_outliers(
    cases: &[CaseReport],
    top_n: usize,
    metric: impl Fn(&CaseReport) -> f64,
) -> Vec<OutlierEntry> {
    let mut entries: Vec<OutlierEntry> = cases
        .iter()
        .map(|case| OutlierEntry {
            id: case.id.clone(),
            value: metric(case),
        })
        .filter(|entry| entry.value > 0.0)
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    entries.truncate(top_n);
    entries
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(MetricDistribution {
        mean: round2(mean(&sorted)),
        p50: round2(percentile_sorted(&sorted, 0.5)),
        p90: round2(percentile_sorted(&sorted, 0.9)),
        p95: round2(percentile_sorted(&sorted, 0.95)),
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

/// Rounds a percentage to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfig;
    use crate::pipeline::builder::EvaluatorBuilder;

    fn evaluator() -> Evaluator {
        EvaluatorBuilder::new(EvalConfig::default()).build().unwrap()
    }

    fn case(id: &str, reference: &str, hypothesis: &str) -> EvalCase {
        EvalCase {
            id: id.to_string(),
            reference: reference.to_string(),
            hypothesis: hypothesis.to_string(),
            range: TokenRange::default(),
            review: None,
            raw_transcript: None,
            preset: None,
        }
    }

    #[test]
    fn case_report_rounds_to_two_decimals() {
        let report = compute_case_report(&evaluator(), &case("c1", "a b c", "a x c")).unwrap();
        assert_eq!(report.metrics.wer, 33.33);
        assert_eq!(report.metrics.custom_wer, 0.0);
        assert_eq!(report.metrics.substitutions, 1);
        assert!(report.notes.is_empty());
    }

    #[test]
    fn case_report_notes_empty_reference() {
        let report = compute_case_report(&evaluator(), &case("c1", "", "a b")).unwrap();
        assert_eq!(report.metrics.wer, 0.0);
        assert_eq!(report.metrics.insertions, 2);
        assert!(report.notes.iter().any(|n| n == "empty_reference"));
    }

    #[test]
    fn case_report_cleans_with_fallback_preset() {
        let mut c = case("c1", "a", "a");
        c.raw_transcript = Some("[x] hello".to_string());
        c.preset = Some("nope".to_string());
        let report = compute_case_report(&evaluator(), &c).unwrap();
        let clean = report.clean.expect("clean result");
        assert_eq!(clean.cleaned_text, "hello");
        assert!(report.notes.iter().any(|n| n == "unknown_preset=nope"));
    }

    #[test]
    fn aggregate_is_micro_averaged() {
        let evaluator = evaluator();
        let cases: Vec<CaseReport> = [
            case("short", "a", "b"),
            case("long", "a b c d e f g h i", "a b c d e f g h i"),
        ]
        .iter()
        .map(|c| compute_case_report(&evaluator, c).unwrap())
        .collect();

        let aggregate = aggregate_reports(&cases, 20);
        assert_eq!(aggregate.counts.total, 2);
        assert_eq!(aggregate.counts.reference_words, 10);
        assert_eq!(aggregate.global.wer, 10.0);
        let wer = aggregate.distributions.wer.expect("wer distribution");
        assert_eq!(wer.mean, 50.0);
        assert_eq!(wer.p50, 50.0);
    }

    #[test]
    fn outliers_rank_by_wer_and_skip_perfect_cases() {
        let evaluator = evaluator();
        let cases: Vec<CaseReport> = [
            case("perfect", "a b", "a b"),
            case("half", "a b", "a x"),
            case("all", "a b", "x y"),
        ]
        .iter()
        .map(|c| compute_case_report(&evaluator, c).unwrap())
        .collect();

        let aggregate = aggregate_reports(&cases, 1);
        assert_eq!(
            aggregate.outliers.worst_wer,
            vec![OutlierEntry {
                id: "all".to_string(),
                value: 100.0,
            }]
        );
        assert!(aggregate.outliers.worst_custom_wer.is_empty());
    }

    #[test]
    fn empty_corpus_has_no_distributions() {
        let aggregate = aggregate_reports(&[], 20);
        assert_eq!(aggregate.counts.total, 0);
        assert_eq!(aggregate.global.wer, 0.0);
        assert!(aggregate.distributions.wer.is_none());
    }

    #[test]
    fn empty_references_keep_global_rates_at_zero() {
        let evaluator = evaluator();
        let cases: Vec<CaseReport> = [case("a", "", "x y"), case("b", "", "z")]
            .iter()
            .map(|c| compute_case_report(&evaluator, c).unwrap())
            .collect();

        let aggregate = aggregate_reports(&cases, 20);
        assert_eq!(aggregate.counts.reference_words, 0);
        assert_eq!(aggregate.global.wer, 0.0);
        assert_eq!(aggregate.global.custom_wer, 0.0);
        assert_eq!(aggregate.global.cer, 0.0);
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(percentile_sorted(&sorted, 0.5), 15.0);
        assert_eq!(percentile_sorted(&sorted, 1.0), 30.0);
        assert_eq!(percentile_sorted(&[], 0.5), 0.0);
    }

    #[test]
    fn cases_parse_with_defaults() {
        let json = r#"[{"id": "x", "reference": "a", "hypothesis": "a",
            "range": {"reference": {"start": 0, "end": 3}}}]"#;
        let cases: Vec<EvalCase> = serde_json::from_str(json).unwrap();
        assert_eq!(cases[0].range.reference.end, Some(3));
        assert!(cases[0].range.hypothesis.is_full());
        assert!(cases[0].review.is_none());
    }
}
