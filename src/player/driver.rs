//! Async driver for a single player session.
//!
//! The driver owns the session, the event channel, and the two timers (the 30 s
//! countdown and the 2 s reveal delay). Every effect is forwarded to a
//! `Frontend`, which handles presentation; timer effects are additionally
//! executed here. Timer tasks are aborted on cancel, and the session's
//! generation counter discards any expiry that slips through in the same tick
//! as a selection.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::{Effect, Event, Session};

/// Presentation seam: rendering, audio playback, fades.
pub trait Frontend: Send {
    fn apply(&mut self, effect: &Effect);
}

pub struct PlayerDriver<F: Frontend> {
    session: Session,
    frontend: F,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    countdown: Option<JoinHandle<()>>,
    reveal: Option<JoinHandle<()>>,
}

impl<F: Frontend> PlayerDriver<F> {
    pub fn new(frontend: F) -> Self {
        let (tx, rx) = mpsc::channel(32);
        Self {
            session: Session::new(),
            frontend,
            tx,
            rx,
            countdown: None,
            reveal: None,
        }
    }

    /// Sender for feeding user input and load results into the session.
    pub fn handle(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    /// Run until the session reaches a terminal phase, then return it.
    #[instrument(target = "dquest::player", skip(self))]
    pub async fn run(mut self) -> Session {
        while !self.session.phase().is_terminal() {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            self.dispatch(event);
        }
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
        if let Some(handle) = self.reveal.take() {
            handle.abort();
        }
        debug!(target: "dquest::player", phase = ?self.session.phase(), score = self.session.score(), "session ended");
        self.session
    }

    fn dispatch(&mut self, event: Event) {
        for effect in self.session.apply(event) {
            match &effect {
                Effect::StartCountdown { generation, seconds } => {
                    let tx = self.tx.clone();
                    let generation = *generation;
                    let seconds = *seconds;
                    self.countdown = Some(tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs(seconds)).await;
                        let _ = tx.send(Event::CountdownExpired(generation)).await;
                    }));
                }
                Effect::CancelCountdown => {
                    if let Some(handle) = self.countdown.take() {
                        handle.abort();
                    }
                }
                Effect::ScheduleReveal { delay_ms } => {
                    let tx = self.tx.clone();
                    let delay_ms = *delay_ms;
                    self.reveal = Some(tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        let _ = tx.send(Event::RevealDelayElapsed).await;
                    }));
                }
                _ => {}
            }
            self.frontend.apply(&effect);
        }
    }
}
