use crate::freetier::{Period, Scope};

const ACCOUNT_CUES: &[&str] = &["per billing account", "per account", "across all projects"];
const DAY_CUES: &[&str] = &["per day", "daily", "/day"];
const MONTH_CUES: &[&str] = &["per month", "monthly", "/month"];

/// Determine whether a free tier applies per billing account or per project.
/// Defaults to account: most GCP free tiers are shared across a billing
/// account.
pub fn extract_scope(content: &str) -> Scope {
    let lower = content.to_lowercase();

    if ACCOUNT_CUES.iter().any(|cue| lower.contains(cue)) {
        return Scope::Account;
    }

    if lower.contains("per project") {
        return Scope::Project;
    }

    Scope::Account
}

/// Determine the free tier reset period.
///
/// "Always free" wins outright. Otherwise day cues must strictly outnumber
/// month cues to classify as daily; ties and the no-signal case resolve to
/// monthly, since most allowances are monthly even when a document also
/// quotes daily-aggregated figures.
pub fn extract_period(content: &str) -> Period {
    let lower = content.to_lowercase();

    if lower.contains("always free") {
        return Period::Always;
    }

    let day_count: usize = DAY_CUES.iter().map(|cue| lower.matches(cue).count()).sum();
    let month_count: usize = MONTH_CUES
        .iter()
        .map(|cue| lower.matches(cue).count())
        .sum();

    if day_count > month_count {
        Period::Day
    } else {
        Period::Month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_billing_account() {
        assert_eq!(
            extract_scope("Free tier is shared per billing account."),
            Scope::Account
        );
        assert_eq!(
            extract_scope("The allowance applies across all projects."),
            Scope::Account
        );
    }

    #[test]
    fn test_scope_project() {
        assert_eq!(
            extract_scope("Each quota is granted per project."),
            Scope::Project
        );
    }

    #[test]
    fn test_scope_account_wins_when_both_present() {
        assert_eq!(
            extract_scope("Granted per billing account, not per project."),
            Scope::Account
        );
    }

    #[test]
    fn test_scope_default_is_account() {
        assert_eq!(extract_scope("No scope information here."), Scope::Account);
        assert_eq!(extract_scope(""), Scope::Account);
    }

    #[test]
    fn test_period_always_free() {
        assert_eq!(
            extract_period("This product is part of the Always Free tier."),
            Period::Always
        );
    }

    #[test]
    fn test_period_month_outnumbers_day() {
        let content = "2 million requests per month. 360,000 GiB-seconds per month. \
                       180,000 vCPU-seconds per month. Usage is aggregated per day.";
        assert_eq!(extract_period(content), Period::Month);
    }

    #[test]
    fn test_period_day_outnumbers_month() {
        let content = "First 50,000 reads per day. First 20,000 writes per day.";
        assert_eq!(extract_period(content), Period::Day);
    }

    #[test]
    fn test_period_tie_resolves_to_month() {
        let content = "50,000 reads per day are free; 1 GB per month is free.";
        assert_eq!(extract_period(content), Period::Month);
    }

    #[test]
    fn test_period_no_signal_defaults_to_month() {
        assert_eq!(extract_period("No period cues at all."), Period::Month);
        assert_eq!(extract_period(""), Period::Month);
    }

    #[test]
    fn test_period_slash_forms_counted() {
        assert_eq!(extract_period("Quota resets /day. Also /day."), Period::Day);
    }
}
