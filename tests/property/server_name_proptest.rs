//! Property-based tests for server name normalization

use fedtester::shared::normalize_server_name;
use proptest::prelude::*;

fn host() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}(\\.[a-z0-9]{1,12}){0,3}"
}

proptest! {
    #[test]
    fn test_normalize_is_idempotent(input in ".{0,40}") {
        if let Ok(normalized) = normalize_server_name(&input) {
            prop_assert_eq!(normalize_server_name(&normalized).unwrap(), normalized);
        }
    }

    #[test]
    fn test_valid_names_accepted(host in host(), port in proptest::option::of(1u16..)) {
        let name = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };
        prop_assert_eq!(normalize_server_name(&name).unwrap(), name);
    }

    #[test]
    fn test_spelling_variants_agree(host in host(), https: bool, slashes in 0usize..3) {
        let scheme = if https { "https://" } else { "http://" };
        let messy = format!("  {}{}{} ", scheme, host.to_ascii_uppercase(), "/".repeat(slashes));
        prop_assert_eq!(normalize_server_name(&messy).unwrap(), host);
    }
}
