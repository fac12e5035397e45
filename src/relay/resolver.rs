//! # Name Resolver
//!
//! Maps the free-form operation name a model emits onto one canonical name of
//! the registry. Resolution is layered, first success wins:
//!
//! 1. exact match of the lower-cased name
//! 2. curated alias table (case-sensitive, target must be registered)
//! 3. ordered fuzzy rules over normalized names; the first rule with any
//!    candidate wins and the longest candidate is returned
//!
//! Everything here is pure and deterministic.

use std::collections::HashMap;

/// Known free-form names and the canonical operation each stands for.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("TRANSFER_SOL", "transfer"),
    ("TRANSFER", "transfer"),
    ("SEND_SOL", "transfer"),
    ("TRANSFER_SPL", "transfer"),
    ("SEND_TOKEN", "transfer"),
    ("SOLANA_BALANCE", "get_balance"),
    ("GET_BALANCE", "get_balance"),
    ("WALLET_BALANCE", "get_balance"),
    ("GET_SOL_BALANCE", "get_balance"),
    ("CHECK_BALANCE", "get_balance"),
    ("SHOW_BALANCE", "get_balance"),
    ("BALANCE_ACTION", "get_balance"),
    ("BUY", "trade"),
    ("BUY_TOKEN", "trade"),
    ("PURCHASE_TOKEN", "trade"),
    ("SWAP_FOR", "trade"),
    ("SELL_TOKEN", "trade"),
    ("SELL", "trade"),
    ("SWAP_TOKEN", "trade"),
    ("SWAP", "swap"),
    ("GET_TOKEN_PRICE", "fetch_price"),
    ("GET_PRICE", "fetch_price"),
    ("FETCH_PRICE", "fetch_price"),
    ("GET_WALLET_ADDRESS", "get_wallet_address"),
    ("WALLET_ADDRESS", "get_wallet_address"),
    ("GET_TOKEN_BALANCE", "get_token_balance"),
    ("TOKEN_BALANCE", "get_token_balance"),
];

const VERB_PREFIXES: &[&str] = &["get", "transfer", "send"];
const NOUN_SUFFIXES: &[&str] = &["sol", "spl", "token"];

/// Lower-case and strip everything that is not ASCII alphanumeric.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A raw name prepared once for every fuzzy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub normalized: String,
    /// Normalized pieces of the raw name split on separators.
    pub tokens: Vec<String>,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        let tokens = raw
            .split(|c: char| !c.is_ascii_alphanumeric())
            .map(normalize)
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            normalized: normalize(raw),
            tokens,
        }
    }
}

/// Fuzzy rules in the order they are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyRule {
    /// Normalized names are equal.
    Exact,
    /// The canonical name contains the whole input.
    Contains,
    /// Every input token appears in the canonical name, in order.
    TokenSubsequence,
    /// Equal once an optional leading verb (`get`, `transfer`, `send`) is accounted for.
    VerbPrefix,
    /// Equal once an optional trailing noun (`sol`, `spl`, `token`) is accounted for.
    NounSuffix,
    /// `solana` read as `sol`, found after a leading `get` in the canonical name.
    SolanaGetter,
}

impl FuzzyRule {
    pub const ORDERED: [FuzzyRule; 6] = [
        FuzzyRule::Exact,
        FuzzyRule::Contains,
        FuzzyRule::TokenSubsequence,
        FuzzyRule::VerbPrefix,
        FuzzyRule::NounSuffix,
        FuzzyRule::SolanaGetter,
    ];

    /// Whether `canonical` (already normalized) satisfies this rule for `query`.
    pub fn matches(self, query: &Query, canonical: &str) -> bool {
        let input = query.normalized.as_str();
        if input.is_empty() || canonical.is_empty() {
            return false;
        }

        match self {
            FuzzyRule::Exact => canonical == input,
            FuzzyRule::Contains => canonical.contains(input),
            FuzzyRule::TokenSubsequence => {
                if query.tokens.is_empty() {
                    return false;
                }
                let mut rest = canonical;
                for token in &query.tokens {
                    match rest.find(token.as_str()) {
                        Some(pos) => rest = &rest[pos + token.len()..],
                        None => return false,
                    }
                }
                true
            }
            FuzzyRule::VerbPrefix => {
                let stripped = strip_any_prefix(input, VERB_PREFIXES);
                !stripped.is_empty()
                    && (canonical == stripped
                        || VERB_PREFIXES
                            .iter()
                            .any(|verb| canonical.strip_prefix(verb) == Some(stripped)))
            }
            FuzzyRule::NounSuffix => {
                let stripped = strip_any_suffix(input, NOUN_SUFFIXES);
                !stripped.is_empty()
                    && (canonical == stripped
                        || NOUN_SUFFIXES
                            .iter()
                            .any(|noun| canonical.strip_suffix(noun) == Some(stripped)))
            }
            FuzzyRule::SolanaGetter => {
                let rewritten = input.replace("solana", "sol");
                canonical
                    .strip_prefix("get")
                    .is_some_and(|rest| rest.contains(rewritten.as_str()))
            }
        }
    }
}

fn strip_any_prefix<'a>(input: &'a str, prefixes: &[&str]) -> &'a str {
    prefixes
        .iter()
        .find_map(|p| input.strip_prefix(p))
        .unwrap_or(input)
}

fn strip_any_suffix<'a>(input: &'a str, suffixes: &[&str]) -> &'a str {
    suffixes
        .iter()
        .find_map(|s| input.strip_suffix(s))
        .unwrap_or(input)
}

/// Resolves model-emitted names against a list of canonical names.
#[derive(Debug, Clone)]
pub struct NameResolver {
    aliases: HashMap<String, String>,
    rules: Vec<FuzzyRule>,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self {
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            rules: FuzzyRule::ORDERED.to_vec(),
        }
    }
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an alias.
    pub fn with_alias(mut self, raw: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(raw.into(), canonical.into());
        self
    }

    /// Replaces the fuzzy rule chain.
    pub fn with_rules(mut self, rules: Vec<FuzzyRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    /// Best canonical name for `raw`, or `None` when nothing plausible is registered.
    ///
    /// `names` must be in registry order; it breaks ties between equally long candidates.
    pub fn resolve(&self, raw: &str, names: &[String]) -> Option<String> {
        let lowered = raw.to_lowercase();
        if let Some(name) = names.iter().find(|name| **name == lowered) {
            return Some(name.clone());
        }

        if let Some(target) = self.aliases.get(raw) {
            if names.iter().any(|name| name == target) {
                return Some(target.clone());
            }
        }

        let query = Query::new(raw);
        let normalized: Vec<String> = names.iter().map(|name| normalize(name)).collect();

        for rule in &self.rules {
            let mut best: Option<&String> = None;
            for (name, canonical) in names.iter().zip(&normalized) {
                if !rule.matches(&query, canonical) {
                    continue;
                }
                if best.map_or(true, |current| name.len() > current.len()) {
                    best = Some(name);
                }
            }
            if let Some(name) = best {
                return Some(name.clone());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn default_names() -> Vec<String> {
        registry(&["get_balance", "get_wallet_address", "transfer", "trade", "swap"])
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let resolver = NameResolver::new();
        for raw in ["get_balance", "GET_BALANCE", "Get_Balance"] {
            assert_eq!(resolver.resolve(raw, &default_names()).as_deref(), Some("get_balance"));
        }
        assert_eq!(resolver.resolve("TRADE", &default_names()).as_deref(), Some("trade"));
    }

    #[test]
    fn test_alias_table() {
        let resolver = NameResolver::new();
        assert_eq!(
            resolver.resolve("SOLANA_BALANCE", &default_names()).as_deref(),
            Some("get_balance")
        );
        assert_eq!(resolver.resolve("BUY_TOKEN", &default_names()).as_deref(), Some("trade"));
        assert_eq!(resolver.resolve("SEND_SOL", &default_names()).as_deref(), Some("transfer"));
    }

    #[test]
    fn test_alias_wins_over_fuzzy_candidates() {
        let names = registry(&["sell_everything", "trade"]);
        // "sell" would be contained in "sell_everything"
        assert_eq!(NameResolver::new().resolve("SELL", &names).as_deref(), Some("trade"));
    }

    #[test]
    fn test_alias_is_case_sensitive_and_requires_registered_target() {
        let resolver = NameResolver::new();
        // Lower-case alias keys are not in the table; falls through to fuzzy rules.
        assert_eq!(resolver.resolve("buy_token", &registry(&["trade"])), None);
        // Target not registered.
        assert_eq!(resolver.resolve("GET_PRICE", &default_names()), None);
    }

    #[test]
    fn test_unrelated_name_does_not_resolve() {
        let resolver = NameResolver::new();
        assert_eq!(resolver.resolve("LAUNCH_ROCKET", &default_names()), None);
        assert_eq!(resolver.resolve("", &default_names()), None);
        assert_eq!(resolver.resolve("___", &default_names()), None);
    }

    #[test]
    fn test_longest_candidate_wins() {
        let names = registry(&["get_balance", "get_token_balance"]);
        assert_eq!(
            NameResolver::new().resolve("balance", &names).as_deref(),
            Some("get_token_balance")
        );
    }

    #[test]
    fn test_equal_length_candidates_keep_registry_order() {
        let names = registry(&["ab_x", "cd_x"]);
        assert_eq!(NameResolver::new().resolve("x", &names).as_deref(), Some("ab_x"));

        let names = registry(&["get_x", "send_x"]);
        assert_eq!(NameResolver::new().resolve("x", &names).as_deref(), Some("send_x"));
    }

    #[test]
    fn test_earlier_rule_wins_even_with_shorter_candidate() {
        // "transfer" matches Exact; "transfer_all_tokens" only Contains.
        let names = registry(&["transfer_all_tokens", "transfer"]);
        let resolver = NameResolver::new().with_rules(FuzzyRule::ORDERED.to_vec());
        assert_eq!(resolver.resolve("Transfer!", &names).as_deref(), Some("transfer"));
    }

    #[test]
    fn test_rules_individually() {
        let q = Query::new("WALLET_ADDRESS");
        assert!(!FuzzyRule::Exact.matches(&q, "getwalletaddress"));
        assert!(FuzzyRule::Contains.matches(&q, "getwalletaddress"));

        let q = Query::new("get-address");
        assert!(!FuzzyRule::Contains.matches(&q, "getwalletaddress"));
        assert!(FuzzyRule::TokenSubsequence.matches(&q, "getwalletaddress"));
        assert!(!FuzzyRule::TokenSubsequence.matches(&q, "addressget"));

        let q = Query::new("SEND_BALANCE");
        assert!(FuzzyRule::VerbPrefix.matches(&q, "getbalance"));
        assert!(FuzzyRule::VerbPrefix.matches(&q, "balance"));

        let q = Query::new("TRANSFER_SOL");
        assert!(FuzzyRule::NounSuffix.matches(&q, "transfer"));
        assert!(FuzzyRule::NounSuffix.matches(&q, "transfertoken"));
        assert!(!FuzzyRule::NounSuffix.matches(&q, "trade"));

        let q = Query::new("SOLANA_STAKE");
        assert!(FuzzyRule::SolanaGetter.matches(&q, "getsolstakeinfo"));
        assert!(!FuzzyRule::SolanaGetter.matches(&q, "solstake"));
    }

    #[test]
    fn test_fuzzy_fallbacks_reach_registry() {
        let resolver = NameResolver::new();
        let names = default_names();
        // NounSuffix
        assert_eq!(resolver.resolve("swap_spl", &names).as_deref(), Some("swap"));
        // Contains
        assert_eq!(resolver.resolve("wallet-address", &names).as_deref(), Some("get_wallet_address"));
        // VerbPrefix
        assert_eq!(resolver.resolve("send_trade", &names).as_deref(), Some("trade"));
    }

    #[test]
    fn test_custom_alias() {
        let resolver = NameResolver::new().with_alias("PAY", "transfer");
        assert_eq!(resolver.resolve("PAY", &default_names()).as_deref(), Some("transfer"));
    }
}
