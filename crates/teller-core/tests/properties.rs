use proptest::prelude::*;
use regex::Regex;
use teller_core::format::{self, FormattedSegment};
use teller_core::{AskResponse, Locale, RevealEvent, SubmitOutcome, TurnController, Typewriter};

/// Reference splitter: every non-greedy `**...**` match on one line is
/// emphasis, everything else is literal.
fn reference_strip(text: &str) -> String {
    let re = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    re.replace_all(text, "$1").into_owned()
}

fn reply_text() -> impl Strategy<Value = String> {
    // Heavy on stars and newlines so marker edge cases show up
    proptest::collection::vec(
        prop_oneof![
            3 => Just("**".to_string()),
            1 => Just("*".to_string()),
            1 => Just("\n".to_string()),
            4 => "[a-zA-Z0-9 ,.đĐàá₫]{1,6}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn segments_reconstruct_stripped_text(text in reply_text()) {
        let segs = format::segments(&text);
        prop_assert_eq!(format::joined(&segs), reference_strip(&text));
    }

    #[test]
    fn segments_are_non_empty_and_alternate(text in reply_text()) {
        let segs = format::segments(&text);
        prop_assert!(segs.iter().all(|s| !s.text.is_empty()));
        for pair in segs.windows(2) {
            prop_assert_ne!(pair[0].emphasized, pair[1].emphasized);
        }
    }

    #[test]
    fn typewriter_ends_with_full_text_and_one_completion(text in reply_text()) {
        let segs = format::segments(&text);
        let expected = format::joined(&segs);
        let total = expected.chars().count();

        let mut tw = Typewriter::new(segs.clone());
        let mut snapshots = 0;
        let mut completes = 0;
        let mut last = String::new();
        for _ in 0..(total + 10) {
            match tw.advance() {
                Some(RevealEvent::Snapshot(state)) => {
                    let visible = state.visible_text();
                    prop_assert!(visible.starts_with(&last));
                    last = visible;
                    snapshots += 1;
                }
                Some(RevealEvent::Complete) => completes += 1,
                None => {}
            }
        }

        prop_assert_eq!(snapshots, total);
        prop_assert_eq!(completes, 1);
        prop_assert_eq!(&last, &expected);
        prop_assert_eq!(tw.visible(), segs.as_slice());
    }

    #[test]
    fn whitespace_submissions_never_grow_the_log(ws in "[ \t\n\r]{0,12}") {
        let mut turn = TurnController::new("u", Locale::Vietnamese);
        let before = turn.log().len();
        prop_assert_eq!(turn.submit(&ws), SubmitOutcome::Empty);
        prop_assert_eq!(turn.log().len(), before);
    }

    #[test]
    fn reply_without_handoff_never_creates_payment(text in "[a-z ]{1,20}[a-z]") {
        let mut turn = TurnController::new("u", Locale::English);
        turn.submit("question");
        turn.resolve(Ok(AskResponse::reply(text)));
        while turn.advance_reveal().is_some() {}
        prop_assert!(turn.pending_payment().is_none());
    }
}

#[test]
fn reference_strip_agrees_on_known_case() {
    assert_eq!(reference_strip("a **b** c"), "a b c");
    assert_eq!(
        format::segments("a **b** c"),
        vec![
            FormattedSegment::plain("a "),
            FormattedSegment::emphasized("b"),
            FormattedSegment::plain(" c"),
        ]
    );
}
