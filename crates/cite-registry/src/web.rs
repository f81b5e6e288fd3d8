//! Reliable-domain allow-list for generic URL citations.

use reqwest::Url;

/// Hosts whose pages are trusted sources on their own: registries, major
/// publishers, health authorities and preprint servers.
///
/// Matching is by host suffix on a label boundary, so `www.nature.com`
/// matches `nature.com` but `notnature.com` does not.
pub const RELIABLE_DOMAINS: &[&str] = &[
    // registries and indexes
    "doi.org",
    "ncbi.nlm.nih.gov",
    "pubmed.ncbi.nlm.nih.gov",
    "europepmc.org",
    "clinicaltrials.gov",
    "crossref.org",
    "openalex.org",
    "semanticscholar.org",
    // preprint servers
    "arxiv.org",
    "biorxiv.org",
    "medrxiv.org",
    "ssrn.com",
    // publishers
    "nature.com",
    "science.org",
    "sciencedirect.com",
    "springer.com",
    "link.springer.com",
    "wiley.com",
    "onlinelibrary.wiley.com",
    "tandfonline.com",
    "sagepub.com",
    "oup.com",
    "academic.oup.com",
    "cambridge.org",
    "cell.com",
    "thelancet.com",
    "nejm.org",
    "jamanetwork.com",
    "bmj.com",
    "plos.org",
    "journals.plos.org",
    "frontiersin.org",
    "mdpi.com",
    "ieee.org",
    "ieeexplore.ieee.org",
    "acm.org",
    "dl.acm.org",
    "pnas.org",
    "annualreviews.org",
    "jstor.org",
    // health and regulatory authorities
    "who.int",
    "cdc.gov",
    "nih.gov",
    "fda.gov",
    "ema.europa.eu",
    "ecdc.europa.eu",
    "nice.org.uk",
    "nhs.uk",
    "cochranelibrary.com",
];

/// Whether `url` belongs to a reliable domain. Unparseable URLs never do.
#[must_use]
pub fn is_reliable_domain(url: &str) -> bool {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };
    RELIABLE_DOMAINS.iter().any(|domain| host_matches(&host, domain))
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.nature.com/articles/nature14539", true)]
    #[case("https://pubmed.ncbi.nlm.nih.gov/33301246/", true)]
    #[case("https://arxiv.org/abs/1706.03762", true)]
    #[case("https://www.who.int/publications/i/item/9789240", true)]
    #[case("https://WWW.NEJM.ORG/doi/full/10.1056/NEJMoa2034577", true)]
    #[case("https://notnature.com/article", false)]
    #[case("https://example.com/blog/post", false)]
    #[case("https://nature.com.evil.example/", false)]
    #[case("not a url", false)]
    fn reliable_domain_matching(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_reliable_domain(url), expected, "{url}");
    }
}
