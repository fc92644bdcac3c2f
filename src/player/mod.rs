//! Quiz player state machine.
//!
//! A `Session` is a pure reducer: it owns the single current-session state and
//! maps input events to effect lists, leaving rendering, audio, and timers to a
//! driver. No ambient globals, so sessions are cheap to construct in tests and
//! multiple instances never interfere.

pub mod driver;

use tracing::debug;

use crate::quiz::Quiz;

/// Points awarded for a correct selection.
pub const SCORE_PER_CORRECT: u32 = 1000;
/// Countdown started when the options are revealed.
pub const COUNTDOWN_SECONDS: u64 = 30;
/// Pause between locking a selection and revealing the answer.
pub const REVEAL_DELAY_MS: u64 = 2000;

/// Visual/audio phases of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Start,
    Intro,
    QuestionIncoming,
    Options,
    Locked,
    Revealed,
    Finished,
    /// Terminal error display, distinct from `Finished`. No retry.
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Failed)
    }
}

/// Audio cues, one per phase that plays sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Intro,
    Incoming,
    Clock,
    Correct,
    Wrong,
}

/// Inputs to the state machine: user actions, load results, timer expirations.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Loaded(Quiz),
    LoadFailed(String),
    /// User-initiated "Play" on the start screen.
    Play,
    /// User-initiated "Next" (intro screen or after a reveal).
    Next,
    /// Click or Space/ArrowRight while the question is incoming.
    ShowOptions,
    /// User selects one of the four options.
    Select(usize),
    /// The countdown ran out. The generation ties the expiry to the countdown
    /// that started it; stale expirations are ignored.
    CountdownExpired(u64),
    /// The fixed post-lock delay elapsed.
    RevealDelayElapsed,
}

/// Outputs for the driver/frontend to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Play(Cue),
    PlayLooping(Cue),
    Stop(Cue),
    /// Stops every cue, including an in-flight fade.
    StopAll,
    FadeOut(Cue),
    StartCountdown { generation: u64, seconds: u64 },
    CancelCountdown,
    ScheduleReveal { delay_ms: u64 },
    MarkSelected(usize),
    HighlightCorrect(usize),
    ShowError(String),
}

/// One quiz session. Owned exclusively by its driver; one session per player.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    quiz: Option<Quiz>,
    index: usize,
    score: u32,
    selected: Option<usize>,
    countdown_generation: u64,
    countdown_armed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            quiz: None,
            index: 0,
            score: 0,
            selected: None,
            countdown_generation: 0,
            countdown_armed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn question_index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    fn correct_index(&self) -> Option<usize> {
        self.quiz
            .as_ref()
            .and_then(|q| q.questions.get(self.index))
            .map(|q| q.correct_index)
    }

    fn is_last_question(&self) -> bool {
        self.quiz
            .as_ref()
            .map(|q| self.index + 1 >= q.questions.len())
            .unwrap_or(true)
    }

    /// Advance the machine. Events that do not apply in the current phase are
    /// ignored and produce no effects.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let effects = self.transition(event);
        debug!(target: "dquest::player", phase = ?self.phase, effects = effects.len(), "applied event");
        effects
    }

    fn transition(&mut self, event: Event) -> Vec<Effect> {
        match (self.phase, event) {
            (Phase::Loading, Event::Loaded(quiz)) => {
                self.quiz = Some(quiz);
                self.phase = Phase::Start;
                vec![Effect::Play(Cue::Intro)]
            }
            (Phase::Loading, Event::LoadFailed(reason)) => {
                self.phase = Phase::Failed;
                vec![Effect::ShowError(reason)]
            }
            (Phase::Start, Event::Play) => {
                self.index = 0;
                self.score = 0;
                self.selected = None;
                self.phase = Phase::Intro;
                // The fade either completes or is cancelled by the StopAll that
                // precedes the next cue; tracks never overlap.
                vec![Effect::FadeOut(Cue::Intro)]
            }
            (Phase::Intro, Event::Next) => {
                self.phase = Phase::QuestionIncoming;
                vec![Effect::StopAll, Effect::Play(Cue::Incoming)]
            }
            (Phase::QuestionIncoming, Event::ShowOptions) => {
                self.phase = Phase::Options;
                self.countdown_generation += 1;
                self.countdown_armed = true;
                vec![
                    Effect::Stop(Cue::Incoming),
                    Effect::PlayLooping(Cue::Clock),
                    Effect::StartCountdown {
                        generation: self.countdown_generation,
                        seconds: COUNTDOWN_SECONDS,
                    },
                ]
            }
            (Phase::Options, Event::Select(index)) if index < crate::quiz::OPTIONS_PER_QUESTION => {
                // Exactly one selection per question; the countdown is always
                // cancelled before entering Locked.
                self.countdown_armed = false;
                self.selected = Some(index);
                self.phase = Phase::Locked;
                vec![
                    Effect::CancelCountdown,
                    Effect::Stop(Cue::Clock),
                    Effect::MarkSelected(index),
                    Effect::ScheduleReveal {
                        delay_ms: REVEAL_DELAY_MS,
                    },
                ]
            }
            (Phase::Options, Event::CountdownExpired(generation))
                if self.countdown_armed && generation == self.countdown_generation =>
            {
                // Timeout path: reveal with no score change.
                self.countdown_armed = false;
                self.phase = Phase::Revealed;
                let correct = self.correct_index().unwrap_or(0);
                vec![
                    Effect::Stop(Cue::Clock),
                    Effect::HighlightCorrect(correct),
                    Effect::Play(Cue::Wrong),
                ]
            }
            (Phase::Locked, Event::RevealDelayElapsed) => {
                self.phase = Phase::Revealed;
                let correct = self.correct_index().unwrap_or(0);
                let hit = self.selected == Some(correct);
                if hit {
                    self.score += SCORE_PER_CORRECT;
                }
                vec![
                    Effect::HighlightCorrect(correct),
                    Effect::Play(if hit { Cue::Correct } else { Cue::Wrong }),
                ]
            }
            (Phase::Revealed, Event::Next) => {
                if self.is_last_question() {
                    self.phase = Phase::Finished;
                } else {
                    self.index += 1;
                    self.selected = None;
                    self.phase = Phase::Intro;
                }
                vec![Effect::StopAll]
            }
            _ => Vec::new(),
        }
    }
}
