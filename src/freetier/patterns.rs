use crate::freetier::FreeTierItem;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// One extraction rule: a phrase pattern with the resource label and unit
/// it reports, plus a multiplier applied to the parsed amount.
struct ExtractionRule {
    regex: Regex,
    resource: &'static str,
    unit: &'static str,
    scale: f64,
}

impl ExtractionRule {
    fn new(pattern: &str, resource: &'static str, unit: &'static str, scale: f64) -> Self {
        Self {
            regex: Regex::new(pattern).expect("invalid extraction pattern"),
            resource,
            unit,
            scale,
        }
    }
}

/// Ordered rule table for extracting free tier allowances from documentation
/// text. Order matters only for which rule owns an ambiguous phrase; keep it
/// stable.
static EXTRACTION_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    vec![
        // vCPU and memory time (Cloud Run, Cloud Functions)
        ExtractionRule::new(
            r"(?i)([0-9,]+)\s*vCPU[- ]?seconds?\s*(?:per\s*month|/month|monthly)?\s*(?:are\s*|is\s*)?(?:free|at no charge)",
            "vCPU-seconds",
            "seconds",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)([0-9,]+)\s*GiB[- ]?seconds?\s*(?:per\s*month|/month|monthly)?\s*(?:are\s*|is\s*)?(?:free|at no charge)",
            "GiB-seconds",
            "seconds",
            1.0,
        ),
        // Variants prefixed with "free tier"
        ExtractionRule::new(
            r"(?i)free\s*tier[:\s]*([0-9,]+)\s*vCPU[- ]?seconds?",
            "vCPU-seconds",
            "seconds",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)free\s*tier[:\s]*([0-9,]+)\s*GiB[- ]?seconds?",
            "GiB-seconds",
            "seconds",
            1.0,
        ),
        // Storage (Cloud Storage, Firestore)
        ExtractionRule::new(
            r"(?i)first\s*([0-9.]+)\s*(?:GB|GiB)\s*(?:of\s*storage\s*)?(?:per\s*month|/month|monthly)?\s*(?:is\s*)?free",
            "storage",
            "GiB",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)([0-9.]+)\s*(?:GB|GiB)\s*(?:of\s*)?(?:storage|data)\s*(?:per\s*month|/month|monthly)?\s*(?:is\s*)?free",
            "storage",
            "GiB",
            1.0,
        ),
        // Requests and invocations (Cloud Functions, API Gateway)
        ExtractionRule::new(
            r"(?i)first\s*([0-9.]+)\s*million\s*(?:invocations?|requests?)\s*(?:per\s*month|/month|monthly)?\s*(?:are\s*|is\s*)?free",
            "requests",
            "count",
            1_000_000.0,
        ),
        ExtractionRule::new(
            r"(?i)([0-9,]+)\s*(?:invocations?|requests?)\s*(?:per\s*month|/month|monthly)?\s*(?:are\s*|is\s*)?free",
            "requests",
            "count",
            1.0,
        ),
        // Per-operation allowances (Firestore, Secret Manager)
        ExtractionRule::new(
            r"(?i)first\s*([0-9,]+)\s*(?:document\s*)?(?:reads?|read\s*operations?)\s*(?:per\s*day|/day|daily)?\s*(?:are\s*|is\s*)?free",
            "document-reads",
            "count",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)first\s*([0-9,]+)\s*(?:document\s*)?(?:writes?|write\s*operations?)\s*(?:per\s*day|/day|daily)?\s*(?:are\s*|is\s*)?free",
            "document-writes",
            "count",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)first\s*([0-9,]+)\s*(?:document\s*)?(?:deletes?|delete\s*operations?)\s*(?:per\s*day|/day|daily)?\s*(?:are\s*|is\s*)?free",
            "document-deletes",
            "count",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)first\s*(\d+)\s*active\s*(?:secret\s*)?versions?\s*(?:are\s*|is\s*)?free",
            "secret-versions",
            "count",
            1.0,
        ),
        ExtractionRule::new(
            r"(?i)first\s*([0-9,]+)\s*access\s*operations?\s*(?:per\s*month|/month|monthly)?\s*(?:are\s*|is\s*)?free",
            "access-operations",
            "count",
            1.0,
        ),
        // BigQuery query processing
        ExtractionRule::new(
            r"(?i)first\s*([0-9.]+)\s*(?:TB|TiB)\s*(?:of\s*)?(?:query|queries|processing)\s*(?:per\s*month|/month|monthly)?\s*(?:is\s*)?free",
            "query-processing",
            "TiB",
            1.0,
        ),
        // Network egress
        ExtractionRule::new(
            r"(?i)first\s*([0-9.]+)\s*(?:GB|GiB)\s*(?:of\s*)?(?:egress|outbound|network)\s*(?:per\s*month|/month|monthly)?\s*(?:is\s*)?free",
            "egress",
            "GiB",
            1.0,
        ),
        // GKE cluster management credit
        ExtractionRule::new(
            r"(?i)\$([0-9.]+)/month\s*(?:credit|free)",
            "cluster-credit",
            "USD",
            1.0,
        ),
        // Pub/Sub message delivery
        ExtractionRule::new(
            r"(?i)first\s*([0-9.]+)\s*(?:GB|GiB)\s*(?:of\s*)?(?:message|messaging)\s*(?:per\s*month|/month|monthly)?\s*(?:is\s*)?free",
            "message-delivery",
            "GiB",
            1.0,
        ),
    ]
});

/// Extract free tier allowances from documentation text.
///
/// Repeated matches of the same literal quantity for the same resource are
/// discarded, but distinct amounts for the same resource are all kept, so
/// documents listing several tiers of one resource survive intact.
pub fn extract_free_tier_items(content: &str) -> Vec<FreeTierItem> {
    let mut items = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for rule in EXTRACTION_RULES.iter() {
        for caps in rule.regex.captures_iter(content) {
            let Some(raw) = caps.get(1) else { continue };

            let amount_str = raw.as_str().replace(',', "");
            let Ok(parsed) = amount_str.parse::<f64>() else {
                continue;
            };
            let amount = parsed * rule.scale;

            let key = format!("{}-{}", rule.resource, amount_str);
            if !seen.insert(key) {
                continue;
            }

            items.push(FreeTierItem {
                resource: rule.resource.to_string(),
                amount,
                unit: rule.unit.to_string(),
            });
        }
    }

    items
}
