//! Search query variants for a claim.

use super::TrustedDomains;

/// Build the query set for `claim`, in the order they should run.
///
/// The first query restricts results to the trusted sites; the others are
/// free-text variants that exclude each configured aggregator. A blank claim
/// yields no queries.
pub fn build_queries(claim: &str, trust: &TrustedDomains, excluded: &[String]) -> Vec<String> {
    let claim = claim.split_whitespace().collect::<Vec<_>>().join(" ");
    if claim.is_empty() {
        return Vec::new();
    }

    let exclusions: String = excluded
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(|d| format!(" -site:{}", d))
        .collect();

    let mut queries = Vec::with_capacity(4);

    if !trust.is_empty() {
        let sites = trust
            .sites()
            .iter()
            .map(|s| format!("site:{}", s))
            .collect::<Vec<_>>()
            .join(" OR ");
        queries.push(format!("{} ({})", claim, sites));
    }

    let quoted = claim.replace('"', "");
    queries.push(format!("\"{}\" fact check{}", quoted, exclusions));
    queries.push(format!("{} debunked{}", claim, exclusions));
    queries.push(format!("{} true or false{}", claim, exclusions));

    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_variants() {
        let trust = TrustedDomains::new(["snopes.com", "reuters.com/fact-check"]);
        let queries = build_queries("  the moon is   cheese ", &trust, &["msn.com".to_string()]);

        assert_eq!(
            queries,
            vec![
                "the moon is cheese (site:snopes.com OR site:reuters.com/fact-check)",
                "\"the moon is cheese\" fact check -site:msn.com",
                "the moon is cheese debunked -site:msn.com",
                "the moon is cheese true or false -site:msn.com",
            ]
        );
    }

    #[test]
    fn test_no_trusted_domains_skips_site_query() {
        let queries = build_queries("claim", &TrustedDomains::new(Vec::<String>::new()), &[]);
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "\"claim\" fact check");
    }

    #[test]
    fn test_blank_claim() {
        assert!(build_queries("   ", &TrustedDomains::default(), &[]).is_empty());
    }
}
