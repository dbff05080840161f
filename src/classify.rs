use url::Url;

/// Third-party listing sites that are not the actual point of purchase.
/// Links into these domains carry no value beyond what we already scraped.
const AGGREGATOR_DOMAINS: &[&str] = &[
    "visitbergen.com",
    "det-skjer.no",
    "kulturkalender.no",
    "eventlista.no",
    "whatsonbergen.com",
];

/// Ticketing platforms that are a legitimate point of purchase. These are
/// third-party domains too, but their links must never be rewritten.
const TICKET_PLATFORM_DOMAINS: &[&str] = &[
    "ticketmaster.no",
    "ticketco.events",
    "tikkio.com",
    "eventbrite.com",
    "hoopla.no",
    "checkin.no",
];

/// Derived per call from the URL string; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlClassification {
    Aggregator,
    TicketPlatform,
    Direct,
    Unknown,
}

pub fn classify(url: Option<&str>) -> UrlClassification {
    let raw = match url {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return UrlClassification::Unknown,
    };
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(_) => return UrlClassification::Unknown,
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return UrlClassification::Unknown;
    }
    let host = match parsed.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return UrlClassification::Unknown,
    };

    // Ticket platforms win over everything else
    if matches_domain(&host, TICKET_PLATFORM_DOMAINS) {
        UrlClassification::TicketPlatform
    } else if matches_domain(&host, AGGREGATOR_DOMAINS) {
        UrlClassification::Aggregator
    } else {
        UrlClassification::Direct
    }
}

/// True only for URLs whose host is in the aggregator set. Absence of
/// evidence (missing or malformed URL) is not evidence of aggregation.
pub fn is_aggregator(url: Option<&str>) -> bool {
    classify(url) == UrlClassification::Aggregator
}

/// Matches the registrable domain, so "www." and other subdomain
/// variants of a listed domain count as the same site.
fn matches_domain(host: &str, domains: &[&str]) -> bool {
    domains
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_domains_match_with_scheme_and_www_variants() {
        assert!(is_aggregator(Some("https://visitbergen.com/whats-on/x")));
        assert!(is_aggregator(Some("http://visitbergen.com/whats-on/x")));
        assert!(is_aggregator(Some("https://www.visitbergen.com/whats-on/x")));
        assert!(is_aggregator(Some("https://en.visitbergen.com/whats-on/x")));
    }

    #[test]
    fn test_ticket_platforms_are_never_aggregators() {
        for url in [
            "https://www.ticketmaster.no/event/123",
            "https://ticketco.events/no/nb/e/show",
            "https://tikkio.com/tickets/456",
        ] {
            assert_eq!(classify(Some(url)), UrlClassification::TicketPlatform);
            assert!(!is_aggregator(Some(url)));
        }
    }

    #[test]
    fn test_venue_domains_classify_as_direct() {
        assert_eq!(classify(Some("https://usf.no/program/x")), UrlClassification::Direct);
        assert_eq!(
            classify(Some("https://grieghallen.no/arrangement/y")),
            UrlClassification::Direct
        );
    }

    #[test]
    fn test_absent_or_malformed_urls_are_unknown() {
        assert_eq!(classify(None), UrlClassification::Unknown);
        assert_eq!(classify(Some("")), UrlClassification::Unknown);
        assert_eq!(classify(Some("   ")), UrlClassification::Unknown);
        assert_eq!(classify(Some("not a url")), UrlClassification::Unknown);
        assert_eq!(classify(Some("ftp://visitbergen.com/x")), UrlClassification::Unknown);
        assert!(!is_aggregator(None));
        assert!(!is_aggregator(Some("::::")));
    }

    #[test]
    fn test_similar_but_unlisted_domains_are_not_aggregators() {
        // suffix match must be on domain labels, not raw string endswith
        assert!(!is_aggregator(Some("https://notvisitbergen.com/x")));
        assert!(!is_aggregator(Some("https://visitbergen.com.evil.org/x")));
    }
}
