//! Property-based tests for failure classification and request shaping
//!
//! - Classification is total and deterministic
//! - Status precedence beats the upstream marker
//! - The upstream marker beats transport details
//! - User ids survive coercion whenever they are integers

use super::error::{classify, ErrorKind, FailureSignal, UPSTREAM_MARKER};
use super::types::coerce_user_id;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Free text that never contains the upstream marker
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :.{}\"_-]{0,80}".prop_filter("must not contain marker", |s| {
        !s.contains(UPSTREAM_MARKER)
    })
}

/// Text that embeds the upstream marker somewhere
fn arb_marker_text() -> impl Strategy<Value = String> {
    (arb_plain_text(), arb_plain_text())
        .prop_map(|(before, after)| format!("{before}{UPSTREAM_MARKER}{after}"))
}

fn arb_any_text() -> impl Strategy<Value = String> {
    prop_oneof![arb_plain_text(), arb_marker_text()]
}

fn arb_failure_status() -> impl Strategy<Value = u16> {
    prop_oneof![300u16..600, 100u16..200]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn status_classification_is_deterministic(code in 100u16..600, body in arb_any_text()) {
        let signal = FailureSignal::Status { code, body: &body };
        let first = classify(&signal);
        prop_assert_eq!(first, classify(&signal));
        prop_assert!(ErrorKind::ALL.contains(&first));
        // Transport-only kinds never come from a received response
        prop_assert_ne!(first, ErrorKind::NetworkError);
        prop_assert_ne!(first, ErrorKind::BackendUnreachable);
        prop_assert_ne!(first, ErrorKind::TimedOut);
    }

    #[test]
    fn auth_statuses_win_over_body(code in prop_oneof![Just(401u16), Just(403u16)], body in arb_any_text()) {
        prop_assert_eq!(
            classify(&FailureSignal::Status { code, body: &body }),
            ErrorKind::AuthenticationRequired
        );
    }

    #[test]
    fn marker_decides_unlisted_statuses(code in arb_failure_status(), body in arb_marker_text()) {
        prop_assume!(![401, 403, 404, 500].contains(&code));
        prop_assert_eq!(
            classify(&FailureSignal::Status { code, body: &body }),
            ErrorKind::UpstreamUnavailable
        );
    }

    #[test]
    fn unlisted_statuses_without_marker_are_unknown(code in arb_failure_status(), body in arb_plain_text()) {
        prop_assume!(![401, 403, 404, 500].contains(&code));
        prop_assert_eq!(
            classify(&FailureSignal::Status { code, body: &body }),
            ErrorKind::UnknownError
        );
    }

    #[test]
    fn transport_failures_never_look_like_statuses(
        description in arb_any_text(),
        connect in any::<bool>(),
        timed_out in any::<bool>(),
    ) {
        let kind = classify(&FailureSignal::Transport { description: &description, connect, timed_out });
        prop_assert!(matches!(
            kind,
            ErrorKind::UpstreamUnavailable
                | ErrorKind::TimedOut
                | ErrorKind::BackendUnreachable
                | ErrorKind::NetworkError
        ));
        if description.contains(UPSTREAM_MARKER) {
            prop_assert_eq!(kind, ErrorKind::UpstreamUnavailable);
        } else if timed_out {
            prop_assert_eq!(kind, ErrorKind::TimedOut);
        } else if connect {
            prop_assert_eq!(kind, ErrorKind::BackendUnreachable);
        }
    }

    #[test]
    fn integer_user_ids_round_trip(id in any::<i64>(), pad in "[ ]{0,3}") {
        prop_assert_eq!(coerce_user_id(&format!("{pad}{id}{pad}")), Some(id));
    }

    #[test]
    fn non_numeric_user_ids_become_null(raw in "[a-zA-Z_@.-]{1,20}") {
        // "inf"/"nan" spellings parse as floats but are not finite
        prop_assert_eq!(coerce_user_id(&raw), None);
    }
}
