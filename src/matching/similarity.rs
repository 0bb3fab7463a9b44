use std::collections::HashSet;

fn tokens(name: &str) -> HashSet<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard index of the lowercase word sets of two release names.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard_prefers_closer_release() {
        let target = "The.Morning.Show.S01E03.Chaos.is.the.New.Cocaine.1080p.WEB-DL.DD5.1.H264-MZABI[rarbg]";
        let file_a = "The.Morning.Show.S01E03.Chaos.Is.the.New.Cocaine.720p.WEB-DL.DD5.1.H264-MZABI[rartv]";
        let file_b = "The.Morning.Show.2019.S01E03.PROPER.1080p.WEB.H264-ELiMiNATE[rartv]";
        assert!(jaccard_similarity(target, file_a) > jaccard_similarity(target, file_b));
    }

    #[test]
    fn test_jaccard_bounds() {
        assert_eq!(jaccard_similarity("a.b", "A B"), 1.0);
        assert_eq!(jaccard_similarity("a", "b"), 0.0);
        assert_eq!(jaccard_similarity("", ""), 0.0);
    }
}
