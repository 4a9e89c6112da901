//! Property-based tests for transport failure classification

use fedtester::client::{classify, TransportFailure};
use fedtester::shared::ErrorKind;
use proptest::prelude::*;

const TRANSPORT_KINDS: [ErrorKind; 4] = [
    ErrorKind::Timeout,
    ErrorKind::TlsError,
    ErrorKind::Cors,
    ErrorKind::Network,
];

fn failure(message: &str, aborted: bool, fetch_layer: bool) -> TransportFailure {
    let mut failure = TransportFailure::new(message);
    if aborted {
        failure = failure.aborted();
    }
    if fetch_layer {
        failure = failure.fetch_layer();
    }
    failure
}

proptest! {
    #[test]
    fn test_always_a_transport_kind(message in ".*", aborted: bool, fetch_layer: bool) {
        let kind = classify(&failure(&message, aborted, fetch_layer));
        prop_assert!(TRANSPORT_KINDS.contains(&kind));
    }

    #[test]
    fn test_aborted_is_timeout(message in ".*", fetch_layer: bool) {
        prop_assert_eq!(classify(&failure(&message, true, fetch_layer)), ErrorKind::Timeout);
    }

    #[test]
    fn test_case_insensitive(message in "[a-zA-Z .-]{0,40}", fetch_layer: bool) {
        prop_assert_eq!(
            classify(&failure(&message.to_ascii_uppercase(), false, fetch_layer)),
            classify(&failure(&message.to_ascii_lowercase(), false, fetch_layer))
        );
    }

    #[test]
    fn test_plain_message_is_network(message in "[0-9 :]{0,40}", fetch_layer: bool) {
        prop_assert_eq!(classify(&failure(&message, false, fetch_layer)), ErrorKind::Network);
    }

    #[test]
    fn test_certificate_wins_over_cors(prefix in "[a-z ]{0,10}") {
        let message = format!("{}network error: invalid certificate", prefix);
        prop_assert_eq!(classify(&failure(&message, false, true)), ErrorKind::TlsError);
    }
}
