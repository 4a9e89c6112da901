//! Property-based tests for the metrics page parser

use fedtester::client::stats::parse_metrics;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_parser_never_panics(text in "(?s).{0,200}") {
        let _ = parse_metrics(&text);
    }

    #[test]
    fn test_every_sample_line_kept(
        values in proptest::collection::vec(0u32..1_000_000, 1..20),
        label in "[a-zA-Z0-9 _.-]{0,12}",
    ) {
        let page: String = values
            .iter()
            .enumerate()
            .map(|(i, value)| format!("probe_requests{{id=\"{}\",note=\"{}\"}} {}\n", i, label, value))
            .collect();

        let metrics = parse_metrics(&page);
        prop_assert_eq!(metrics.families.len(), 1);

        let family = &metrics.families[0];
        prop_assert_eq!(family.samples.len(), values.len());
        prop_assert_eq!(family.samples[0].label("note"), Some(label.as_str()));
        let expected: f64 = values.iter().map(|v| f64::from(*v)).sum();
        prop_assert_eq!(family.total(), expected);
    }
}
