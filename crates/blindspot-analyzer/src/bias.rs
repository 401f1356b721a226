//! Per-cluster bias aggregation.

use std::collections::BTreeMap;

use blindspot_core::{Article, BiasLabel, Verdict};
use serde::{Deserialize, Serialize};

/// Share one label needs for a dominant verdict, in percent.
const DOMINANT_THRESHOLD_PCT: f64 = 55.0;

/// Bias profile of one cluster.
///
/// Percentages always sum to exactly 100; the rounding correction in
/// [`aggregate_bias`] enforces it and the empty default satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasProfile {
    pub left_pct: i32,
    pub center_pct: i32,
    pub right_pct: i32,
    /// Mean of per-article signed lean values, rounded to 3 decimals.
    pub bias_score: f64,
    /// Article count per outlet name.
    pub media_distribution: BTreeMap<String, i64>,
    pub verdict: Verdict,
}

impl BiasProfile {
    /// The neutral profile for a cluster with no members.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            left_pct: 0,
            center_pct: 100,
            right_pct: 0,
            bias_score: 0.0,
            media_distribution: BTreeMap::new(),
            verdict: Verdict::Balanced,
        }
    }

    /// Corrected percentage for one label.
    #[must_use]
    pub fn pct(&self, label: BiasLabel) -> i32 {
        match label {
            BiasLabel::Left => self.left_pct,
            BiasLabel::Center => self.center_pct,
            BiasLabel::Right => self.right_pct,
        }
    }
}

/// Counts member articles per bias label, in [`BiasLabel::ALL`] order.
///
/// An article whose outlet bias is unresolved counts as center.
#[must_use]
pub fn label_counts(members: &[&Article]) -> [usize; 3] {
    BiasLabel::ALL.map(|label| {
        members
            .iter()
            .filter(|a| a.effective_bias() == label)
            .count()
    })
}

/// Derives the bias profile of one cluster from its member articles.
///
/// Pure function of the member list: re-running it on the same membership
/// yields an identical profile.
///
/// Rules, in order:
/// 1. Count labels (unresolved outlets count as center) and per-outlet
///    article totals.
/// 2. Round each label's raw share to a whole percent.
/// 3. If the rounded percentages miss 100, the label with the largest
///    percentage absorbs the difference; ties resolve to the first label in
///    [`BiasLabel::ALL`] order.
/// 4. The bias score is the mean of signed per-article values, rounded to
///    3 decimals.
/// 5. The verdict is judged on raw counts: a single-label cluster is that
///    label's dominant form; otherwise the most frequent label wins if its
///    share reaches 55%, ties resolving in [`BiasLabel::ALL`] order; anything
///    else is balanced.
///
/// An empty member list returns [`BiasProfile::empty`].
#[must_use]
pub fn aggregate_bias(members: &[&Article]) -> BiasProfile {
    if members.is_empty() {
        return BiasProfile::empty();
    }

    let counts = label_counts(members);
    let total = members.len();

    let mut media_distribution: BTreeMap<String, i64> = BTreeMap::new();
    let mut score_sum = 0.0_f64;
    for article in members {
        *media_distribution.entry(article.outlet.clone()).or_insert(0) += 1;
        score_sum += article.effective_bias().score();
    }

    let mut pcts = counts.map(|count| rounded_pct(count, total));
    let sum: i32 = pcts.iter().sum();
    if sum != 100 {
        let mut largest = 0;
        for i in 1..pcts.len() {
            if pcts[i] > pcts[largest] {
                largest = i;
            }
        }
        pcts[largest] += 100 - sum;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = score_sum / total as f64;
    let bias_score = (mean * 1000.0).round() / 1000.0;

    BiasProfile {
        left_pct: pcts[0],
        center_pct: pcts[1],
        right_pct: pcts[2],
        bias_score,
        media_distribution,
        verdict: verdict_for(counts, total),
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn rounded_pct(count: usize, total: usize) -> i32 {
    (count as f64 / total as f64 * 100.0).round() as i32
}

/// Verdict from raw label counts. `total` must be at least 1.
fn verdict_for(counts: [usize; 3], total: usize) -> Verdict {
    // Single-label clusters short-circuit to that label's dominant form.
    for (i, &count) in counts.iter().enumerate() {
        if count == total {
            return Verdict::dominant_for(BiasLabel::ALL[i]);
        }
    }

    let mut top = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[top] {
            top = i;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let share = counts[top] as f64 / total as f64 * 100.0;
    if share >= DOMINANT_THRESHOLD_PCT {
        Verdict::dominant_for(BiasLabel::ALL[top])
    } else {
        Verdict::Balanced
    }
}

/// One-line qualitative reading of a bias score, with the label counts.
///
/// Lean: below -0.3 reads left, above 0.3 reads right, otherwise centrist.
/// Intensity from the magnitude: slight under 0.2, moderate under 0.5,
/// strong under 0.8, else very strong. Centrist renders without intensity.
/// Example: `"moderate left lean (L:4 C:2 R:1)"`.
#[must_use]
pub fn lean_summary(score: f64, left: usize, center: usize, right: usize) -> String {
    let distribution = format!("(L:{left} C:{center} R:{right})");
    if score < -0.3 {
        format!("{} left lean {distribution}", intensity(score))
    } else if score > 0.3 {
        format!("{} right lean {distribution}", intensity(score))
    } else {
        format!("centrist {distribution}")
    }
}

fn intensity(score: f64) -> &'static str {
    let magnitude = score.abs();
    if magnitude < 0.2 {
        "slight"
    } else if magnitude < 0.5 {
        "moderate"
    } else if magnitude < 0.8 {
        "strong"
    } else {
        "very strong"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, outlet: &str, bias: Option<BiasLabel>) -> Article {
        Article {
            id,
            title: format!("기사 {id}"),
            content: "본문".to_string(),
            url: format!("https://news.example.com/{id}"),
            published_at: None,
            outlet: outlet.to_string(),
            bias,
            category: "정치".to_string(),
        }
    }

    fn members(spec: &[(&str, Option<BiasLabel>, usize)]) -> Vec<Article> {
        let mut articles = Vec::new();
        let mut id = 1;
        for (outlet, bias, count) in spec {
            for _ in 0..*count {
                articles.push(article(id, outlet, *bias));
                id += 1;
            }
        }
        articles
    }

    fn aggregate(articles: &[Article]) -> BiasProfile {
        let refs: Vec<&Article> = articles.iter().collect();
        aggregate_bias(&refs)
    }

    #[test]
    fn empty_cluster_uses_neutral_default() {
        let profile = aggregate_bias(&[]);
        assert_eq!(profile.left_pct, 0);
        assert_eq!(profile.center_pct, 100);
        assert_eq!(profile.right_pct, 0);
        assert_eq!(profile.bias_score, 0.0);
        assert!(profile.media_distribution.is_empty());
        assert_eq!(profile.verdict, Verdict::Balanced);
    }

    #[test]
    fn percentages_sum_to_exactly_100() {
        // 1/3 splits round to 33+33+33 = 99; the correction must land the sum
        // on 100 without going negative anywhere.
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 1),
            ("KBS뉴스", Some(BiasLabel::Center), 1),
            ("조선일보", Some(BiasLabel::Right), 1),
        ]);
        let profile = aggregate(&articles);

        assert_eq!(profile.left_pct + profile.center_pct + profile.right_pct, 100);
        assert!(profile.left_pct >= 0);
        assert!(profile.center_pct >= 0);
        assert!(profile.right_pct >= 0);
        // Tie on the maximum: left is first in the fixed order.
        assert_eq!(profile.left_pct, 34);
        assert_eq!(profile.center_pct, 33);
        assert_eq!(profile.right_pct, 33);
    }

    #[test]
    fn unresolved_outlet_counts_as_center() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 1),
            ("동네신문", None, 1),
        ]);
        let profile = aggregate(&articles);

        assert_eq!(profile.left_pct, 50);
        assert_eq!(profile.center_pct, 50);
        assert_eq!(profile.right_pct, 0);
        assert_eq!(profile.media_distribution.len(), 2);
        assert_eq!(profile.media_distribution["동네신문"], 1);
    }

    #[test]
    fn bias_score_is_mean_rounded_to_3_decimals() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 2),
            ("조선일보", Some(BiasLabel::Right), 1),
        ]);
        let profile = aggregate(&articles);
        // (-1 - 1 + 1) / 3 = -0.333...
        assert_eq!(profile.bias_score, -0.333);
    }

    #[test]
    fn score_never_decreases_when_center_becomes_right() {
        let base = members(&[
            ("한겨레", Some(BiasLabel::Left), 2),
            ("KBS뉴스", Some(BiasLabel::Center), 2),
            ("조선일보", Some(BiasLabel::Right), 1),
        ]);
        let shifted = members(&[
            ("한겨레", Some(BiasLabel::Left), 2),
            ("KBS뉴스", Some(BiasLabel::Center), 1),
            ("조선일보", Some(BiasLabel::Right), 2),
        ]);

        let before = aggregate(&base).bias_score;
        let after = aggregate(&shifted).bias_score;
        assert!(after >= before, "score dropped: {before} -> {after}");
    }

    #[test]
    fn verdict_left_dominant_at_60_pct() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 6),
            ("KBS뉴스", Some(BiasLabel::Center), 3),
            ("조선일보", Some(BiasLabel::Right), 1),
        ]);
        assert_eq!(aggregate(&articles).verdict, Verdict::LeftDominant);
    }

    #[test]
    fn verdict_balanced_below_threshold() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 4),
            ("KBS뉴스", Some(BiasLabel::Center), 3),
            ("조선일보", Some(BiasLabel::Right), 3),
        ]);
        assert_eq!(aggregate(&articles).verdict, Verdict::Balanced);
    }

    #[test]
    fn verdict_single_label_cluster_is_dominant() {
        let articles = members(&[("KBS뉴스", Some(BiasLabel::Center), 2)]);
        assert_eq!(aggregate(&articles).verdict, Verdict::CenterDominant);
    }

    #[test]
    fn verdict_dominant_at_exact_threshold() {
        // 11/20 = 55% exactly, and the threshold is inclusive.
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 11),
            ("조선일보", Some(BiasLabel::Right), 9),
        ]);
        assert_eq!(aggregate(&articles).verdict, Verdict::LeftDominant);
    }

    #[test]
    fn verdict_even_split_is_balanced() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 5),
            ("조선일보", Some(BiasLabel::Right), 5),
        ]);
        assert_eq!(aggregate(&articles).verdict, Verdict::Balanced);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 3),
            ("KBS뉴스", Some(BiasLabel::Center), 2),
            ("조선일보", Some(BiasLabel::Right), 2),
        ]);
        let first = aggregate(&articles);
        let second = aggregate(&articles);
        assert_eq!(first, second);
    }

    #[test]
    fn media_distribution_counts_by_outlet() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 2),
            ("YTN", Some(BiasLabel::Center), 1),
        ]);
        let profile = aggregate(&articles);
        assert_eq!(profile.media_distribution["한겨레"], 2);
        assert_eq!(profile.media_distribution["YTN"], 1);
    }

    #[test]
    fn label_counts_follow_fixed_order() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 1),
            ("KBS뉴스", Some(BiasLabel::Center), 2),
            ("조선일보", Some(BiasLabel::Right), 3),
        ]);
        let refs: Vec<&Article> = articles.iter().collect();
        assert_eq!(label_counts(&refs), [1, 2, 3]);
    }

    #[test]
    fn lean_summary_variants() {
        assert_eq!(lean_summary(-0.333, 4, 2, 1), "moderate left lean (L:4 C:2 R:1)");
        assert_eq!(lean_summary(0.85, 0, 1, 6), "very strong right lean (L:0 C:1 R:6)");
        assert_eq!(lean_summary(0.0, 1, 2, 1), "centrist (L:1 C:2 R:1)");
        assert_eq!(lean_summary(-0.9, 6, 0, 0), "very strong left lean (L:6 C:0 R:0)");
        assert_eq!(lean_summary(0.31, 1, 1, 2), "moderate right lean (L:1 C:1 R:2)");
    }

    #[test]
    fn profile_serializes_for_storage() {
        let articles = members(&[
            ("한겨레", Some(BiasLabel::Left), 2),
            ("조선일보", Some(BiasLabel::Right), 1),
        ]);
        let profile = aggregate(&articles);
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["left_pct"], 67);
        assert_eq!(json["right_pct"], 33);
        assert_eq!(json["verdict"], "left_dominant");
        let back: BiasProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }
}
