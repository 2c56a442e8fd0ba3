use std::collections::HashMap;

/// Parses a `key=value[,key=value...]` mapping string. Pairs without
/// exactly one `=` are skipped; keys and values are trimmed.
pub fn parse_mappings(raw: &str) -> HashMap<String, String> {
    let mut mappings = HashMap::new();
    for pair in raw.split(',') {
        let kv: Vec<&str> = pair.split('=').collect();
        if kv.len() == 2 {
            mappings.insert(kv[0].trim().to_string(), kv[1].trim().to_string());
        }
    }
    mappings
}

/// Total identifier lookup: an exact table hit wins, an empty request falls
/// back to the configured default, and anything else passes through
/// unchanged — the upstream is the final arbiter of validity.
pub fn resolve<'a>(
    requested: &'a str,
    table: &'a HashMap<String, String>,
    default: &'a str,
) -> &'a str {
    if let Some(mapped) = table.get(requested) {
        return mapped;
    }
    if requested.is_empty() { default } else { requested }
}
