use crate::model::{MatchRow, MatchTier, ReconSummary, TierCounts};
use crate::normalize::MIN_LEN;

/// Compute summary statistics from result rows.
pub fn compute_summary(rows: &[MatchRow]) -> ReconSummary {
    let mut tiers = TierCounts::default();
    let mut matched = 0;
    let mut too_short = 0;

    for row in rows {
        if row.part.len() < MIN_LEN {
            too_short += 1;
        }
        match row.tier {
            Some(MatchTier::Suffix) => tiers.suffix += 1,
            Some(MatchTier::HyphenInsensitive) => tiers.hyphen_insensitive += 1,
            Some(MatchTier::ReverseSuffix) => tiers.reverse_suffix += 1,
            None => {}
        }
        if row.is_match() {
            matched += 1;
        }
    }

    ReconSummary {
        total_parts: rows.len(),
        matched,
        unmatched: rows.len() - matched,
        too_short,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(part: &str, tier: Option<MatchTier>) -> MatchRow {
        MatchRow {
            part: part.into(),
            master: tier.map(|_| "M".to_string()),
            master_index: tier.map(|_| 0),
            tier,
        }
    }

    #[test]
    fn summary_counts() {
        let rows = vec![
            row("abc", Some(MatchTier::Suffix)),
            row("abcd", Some(MatchTier::Suffix)),
            row("x100", Some(MatchTier::HyphenInsensitive)),
            row("zz9876", Some(MatchTier::ReverseSuffix)),
            row("nomatch", None),
            row("AB", None),
            row("", None),
        ];
        let summary = compute_summary(&rows);
        assert_eq!(summary.total_parts, 7);
        assert_eq!(summary.matched, 4);
        assert_eq!(summary.unmatched, 3);
        assert_eq!(summary.too_short, 2);
        assert_eq!(
            summary.tiers,
            TierCounts { suffix: 2, hyphen_insensitive: 1, reverse_suffix: 1 }
        );
    }

    #[test]
    fn empty_rows() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.total_parts, 0);
        assert_eq!(summary.matched, 0);
        assert_eq!(summary.tiers, TierCounts::default());
    }
}
