// src/select.rs
use crate::listing::Listing;

/// Ranked listings scoring at least `min_score`, capped at `max_alerts`, order kept.
pub fn pick_alerts(ranked: &[Listing], min_score: u8, max_alerts: usize) -> Vec<Listing> {
    ranked
        .iter()
        .filter(|j| j.score_or_zero() >= min_score)
        .take(max_alerts)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(title: &str, score: u8) -> Listing {
        Listing {
            title: title.into(),
            score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn threshold_and_cap_hold() {
        let ranked = vec![
            scored("a", 9),
            scored("b", 8),
            scored("c", 6),
            scored("d", 6),
            scored("e", 3),
        ];
        let out = pick_alerts(&ranked, 6, 3);
        let titles: Vec<_> = out.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        for (min, max) in [(0u8, 10usize), (7, 10), (10, 1), (6, 0)] {
            let out = pick_alerts(&ranked, min, max);
            assert!(out.len() <= max);
            assert!(out.iter().all(|l| l.score_or_zero() >= min));
        }
    }

    #[test]
    fn unscored_counts_as_zero() {
        let l = Listing::default();
        assert!(pick_alerts(&[l.clone()], 1, 5).is_empty());
        assert_eq!(pick_alerts(&[l], 0, 5).len(), 1);
    }
}
