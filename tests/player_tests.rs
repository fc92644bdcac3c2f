use dquest::player::{Cue, Effect, Event, Phase, Session, COUNTDOWN_SECONDS, SCORE_PER_CORRECT};
use dquest::quiz::{Question, Quiz};

fn quiz(questions: usize) -> Quiz {
    Quiz {
        id: Some("test".to_string()),
        title: "Player Test".to_string(),
        metadata: None,
        questions: (0..questions)
            .map(|i| Question {
                question: format!("Q{i}?"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_index: 1,
            })
            .collect(),
    }
}

/// Drive a fresh session to the Options phase of the first question and return
/// it together with the countdown generation that was started.
fn session_at_options() -> (Session, u64) {
    let mut s = Session::new();
    s.apply(Event::Loaded(quiz(2)));
    s.apply(Event::Play);
    s.apply(Event::Next);
    let effects = s.apply(Event::ShowOptions);
    let generation = effects
        .iter()
        .find_map(|e| match e {
            Effect::StartCountdown { generation, .. } => Some(*generation),
            _ => None,
        })
        .expect("options phase starts a countdown");
    (s, generation)
}

#[test]
fn happy_path_phase_sequence() {
    let mut s = Session::new();
    assert_eq!(s.phase(), Phase::Loading);

    let effects = s.apply(Event::Loaded(quiz(1)));
    assert_eq!(s.phase(), Phase::Start);
    assert!(effects.contains(&Effect::Play(Cue::Intro)));

    let effects = s.apply(Event::Play);
    assert_eq!(s.phase(), Phase::Intro);
    assert!(effects.contains(&Effect::FadeOut(Cue::Intro)));

    let effects = s.apply(Event::Next);
    assert_eq!(s.phase(), Phase::QuestionIncoming);
    // Any in-flight fade is cancelled before the next cue starts.
    assert_eq!(effects[0], Effect::StopAll);
    assert!(effects.contains(&Effect::Play(Cue::Incoming)));

    let effects = s.apply(Event::ShowOptions);
    assert_eq!(s.phase(), Phase::Options);
    assert!(effects.contains(&Effect::Stop(Cue::Incoming)));
    assert!(effects.contains(&Effect::PlayLooping(Cue::Clock)));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::StartCountdown { seconds, .. } if *seconds == COUNTDOWN_SECONDS
    )));
}

#[test]
fn correct_selection_scores_exactly_1000() {
    let (mut s, _) = session_at_options();

    let effects = s.apply(Event::Select(1));
    assert_eq!(s.phase(), Phase::Locked);
    // The countdown is always cancelled before entering Locked.
    assert!(effects.contains(&Effect::CancelCountdown));
    assert!(effects.contains(&Effect::MarkSelected(1)));

    let effects = s.apply(Event::RevealDelayElapsed);
    assert_eq!(s.phase(), Phase::Revealed);
    assert_eq!(s.score(), SCORE_PER_CORRECT);
    assert!(effects.contains(&Effect::HighlightCorrect(1)));
    assert!(effects.contains(&Effect::Play(Cue::Correct)));
}

#[test]
fn wrong_selection_leaves_score_unchanged() {
    let (mut s, _) = session_at_options();
    s.apply(Event::Select(3));
    s.apply(Event::RevealDelayElapsed);
    assert_eq!(s.phase(), Phase::Revealed);
    assert_eq!(s.score(), 0);
}

#[test]
fn timeout_reveals_correct_option_without_score() {
    let (mut s, generation) = session_at_options();

    let effects = s.apply(Event::CountdownExpired(generation));
    assert_eq!(s.phase(), Phase::Revealed);
    assert_eq!(s.score(), 0);
    assert!(effects.contains(&Effect::Stop(Cue::Clock)));
    assert!(effects.contains(&Effect::HighlightCorrect(1)));
    assert!(effects.contains(&Effect::Play(Cue::Wrong)));
}

#[test]
fn only_one_selection_per_question() {
    let (mut s, _) = session_at_options();
    s.apply(Event::Select(0));
    assert_eq!(s.phase(), Phase::Locked);

    // A second selection while locked is ignored.
    let effects = s.apply(Event::Select(2));
    assert!(effects.is_empty());
    assert_eq!(s.selected(), Some(0));
}

#[test]
fn stale_countdown_expiry_is_ignored() {
    let (mut s, generation) = session_at_options();
    s.apply(Event::Select(1));
    assert_eq!(s.phase(), Phase::Locked);

    // Expiry arriving in the same tick as the selection must not double-fire.
    let effects = s.apply(Event::CountdownExpired(generation));
    assert!(effects.is_empty());
    assert_eq!(s.phase(), Phase::Locked);

    s.apply(Event::RevealDelayElapsed);
    assert_eq!(s.score(), SCORE_PER_CORRECT);
}

#[test]
fn expiry_from_a_previous_question_is_ignored() {
    let (mut s, first_generation) = session_at_options();
    s.apply(Event::CountdownExpired(first_generation));
    s.apply(Event::Next);
    assert_eq!(s.phase(), Phase::Intro);

    // Second question, new countdown.
    s.apply(Event::Next);
    s.apply(Event::ShowOptions);
    let effects = s.apply(Event::CountdownExpired(first_generation));
    assert!(effects.is_empty());
    assert_eq!(s.phase(), Phase::Options);
}

#[test]
fn out_of_range_selection_is_ignored() {
    let (mut s, _) = session_at_options();
    let effects = s.apply(Event::Select(4));
    assert!(effects.is_empty());
    assert_eq!(s.phase(), Phase::Options);
}

#[test]
fn next_advances_or_finishes() {
    let (mut s, generation) = session_at_options();
    s.apply(Event::CountdownExpired(generation));
    let effects = s.apply(Event::Next);
    assert_eq!(s.phase(), Phase::Intro);
    assert_eq!(s.question_index(), 1);
    assert!(effects.contains(&Effect::StopAll));

    // Finish the second (last) question via selection.
    s.apply(Event::Next);
    s.apply(Event::ShowOptions);
    s.apply(Event::Select(1));
    s.apply(Event::RevealDelayElapsed);
    s.apply(Event::Next);
    assert_eq!(s.phase(), Phase::Finished);
    assert!(s.phase().is_terminal());

    // Terminal: no further transitions.
    assert!(s.apply(Event::Next).is_empty());
    assert!(s.apply(Event::Play).is_empty());
}

#[test]
fn load_failure_is_a_terminal_error_state() {
    let mut s = Session::new();
    let effects = s.apply(Event::LoadFailed("fetch failed".to_string()));
    assert_eq!(s.phase(), Phase::Failed);
    assert!(effects.contains(&Effect::ShowError("fetch failed".to_string())));
    assert!(s.apply(Event::Play).is_empty());
}

#[test]
fn events_out_of_phase_are_ignored() {
    let mut s = Session::new();
    assert!(s.apply(Event::Play).is_empty());
    assert!(s.apply(Event::Select(0)).is_empty());
    assert!(s.apply(Event::RevealDelayElapsed).is_empty());
    assert_eq!(s.phase(), Phase::Loading);
}
