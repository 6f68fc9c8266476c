use crate::freetier::{FreeTierItem, FreeTierRecord};

/// Maps canonical SKU usage units to free tier resource labels, in match
/// priority order. Extending coverage to a new billing unit means adding an
/// entry here, not changing the lookup.
const UNIT_RESOURCE_MAP: &[(&str, &[&str])] = &[
    ("s", &["vCPU-seconds", "GiB-seconds", "seconds"]),
    ("GiBy", &["GiB-seconds", "storage"]),
    ("GiBy.s", &["GiB-seconds"]),
    ("By", &["storage", "egress"]),
    (
        "count",
        &[
            "requests",
            "operations",
            "access-operations",
            "document-reads",
            "document-writes",
            "document-deletes",
        ],
    ),
    ("1", &["requests", "operations", "secret-versions"]),
    ("h", &["hours"]),
    ("mo", &["months"]),
];

/// Find the free tier item matching a SKU's usage unit, if any.
///
/// For known units the first record item whose resource label contains one
/// of the mapped labels (case-insensitively, in map order) wins. Unknown
/// units fall back to an exact case-insensitive match on the item's stored
/// unit.
pub fn find_matching_item<'a>(
    record: &'a FreeTierRecord,
    usage_unit: &str,
) -> Option<&'a FreeTierItem> {
    if record.items.is_empty() {
        return None;
    }

    let resources = UNIT_RESOURCE_MAP
        .iter()
        .find(|(unit, _)| *unit == usage_unit)
        .map(|(_, resources)| *resources);

    let Some(resources) = resources else {
        return record
            .items
            .iter()
            .find(|item| item.unit.eq_ignore_ascii_case(usage_unit));
    };

    record.items.iter().find(|item| {
        let label = item.resource.to_lowercase();
        resources
            .iter()
            .any(|resource| label.contains(&resource.to_lowercase()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freetier::{Period, Scope};

    fn record(items: Vec<FreeTierItem>) -> FreeTierRecord {
        FreeTierRecord {
            service_name: "Cloud Run".to_string(),
            items,
            scope: Scope::Account,
            period: Period::Month,
            conditions: vec![],
            source_url: "https://cloud.google.com/run/pricing".to_string(),
        }
    }

    fn item(resource: &str, amount: f64, unit: &str) -> FreeTierItem {
        FreeTierItem {
            resource: resource.to_string(),
            amount,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_seconds_unit_prefers_first_record_item() {
        let rec = record(vec![
            item("vCPU-seconds", 240_000.0, "seconds"),
            item("GiB-seconds", 450_000.0, "seconds"),
        ]);
        let matched = find_matching_item(&rec, "s").unwrap();
        assert_eq!(matched.resource, "vCPU-seconds");
    }

    #[test]
    fn test_count_unit_matches_requests() {
        let rec = record(vec![
            item("storage", 5.0, "GiB"),
            item("requests", 2_000_000.0, "count"),
        ]);
        let matched = find_matching_item(&rec, "count").unwrap();
        assert_eq!(matched.resource, "requests");
    }

    #[test]
    fn test_bytes_unit_matches_storage_then_egress() {
        let rec = record(vec![item("egress", 1.0, "GiB")]);
        let matched = find_matching_item(&rec, "By").unwrap();
        assert_eq!(matched.resource, "egress");
    }

    #[test]
    fn test_unknown_unit_falls_back_to_exact_unit_match() {
        let rec = record(vec![item("cluster-credit", 74.4, "USD")]);
        let matched = find_matching_item(&rec, "usd").unwrap();
        assert_eq!(matched.resource, "cluster-credit");
    }

    #[test]
    fn test_unknown_unit_without_match_returns_none() {
        let rec = record(vec![item("storage", 5.0, "GiB")]);
        assert!(find_matching_item(&rec, "widget").is_none());
    }

    #[test]
    fn test_empty_record_returns_none() {
        let rec = record(vec![]);
        assert!(find_matching_item(&rec, "s").is_none());
    }

    #[test]
    fn test_resource_label_match_is_case_insensitive() {
        let rec = record(vec![item("VCPU-Seconds", 240_000.0, "seconds")]);
        assert!(find_matching_item(&rec, "s").is_some());
    }
}
