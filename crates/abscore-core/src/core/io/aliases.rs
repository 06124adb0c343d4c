use phf::{Map, Set, phf_map, phf_set};

/// Column names used by older scoring sheets, mapped to their canonical names.
#[rustfmt::skip]
pub static COLUMN_ALIASES: Map<&'static str, &'static str> = phf_map! {
    // --- Identity columns ---
    "team_name" => "team", "team_id" => "team",
    "design_id" => "design", "design_name" => "design",
    "challenge_id" => "challenge", "track" => "challenge",
    "warnings" => "warning",
    "metric_id" => "metric", "raw_value" => "value",

    // --- Binding ---
    "delta_g" => "prodigy_dg", "dg" => "prodigy_dg", "prodigy" => "prodigy_dg",
    "ipsae_score" => "ipsae",

    // --- Developability ---
    "netsolp_solubility" => "netsolp", "solubility" => "netsolp",
    "cdr_sasa_proxy" => "cdr_sasa",

    // --- Novelty ---
    "cdr3_identity" => "cdrh3_identity", "cdrh3_id" => "cdrh3_identity",
};

/// Cell contents that mean "no value" rather than a parse failure.
pub static ABSENT_TOKENS: Set<&'static str> = phf_set! {
    "", "na", "n/a", "nan", "none", "null", "-",
};

/// Lowercases a header or metric name and resolves legacy aliases.
pub fn canonical_column(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    match COLUMN_ALIASES.get(lowered.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => lowered,
    }
}

pub fn is_absent_token(raw: &str) -> bool {
    ABSENT_TOKENS.contains(raw.trim().to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_columns_resolve_to_canonical_names() {
        assert_eq!(canonical_column("delta_g"), "prodigy_dg");
        assert_eq!(canonical_column(" Team_Name "), "team");
        assert_eq!(canonical_column("CDR3_identity"), "cdrh3_identity");
    }

    #[test]
    fn unknown_columns_are_only_lowercased() {
        assert_eq!(canonical_column("DockQ"), "dockq");
        assert_eq!(canonical_column("iface_plddt"), "iface_plddt");
    }

    #[test]
    fn absent_tokens_are_case_insensitive() {
        for token in ["", "  ", "NA", "NaN", "None", "null", "n/a"] {
            assert!(is_absent_token(token), "{token:?}");
        }
        assert!(!is_absent_token("0"));
        assert!(!is_absent_token("abc"));
    }
}
