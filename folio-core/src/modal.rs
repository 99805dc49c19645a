//! Lifecycle controller for the project-embed dialog.
//!
//! The machine itself never touches the document: every transition returns an
//! ordered list of [`Effect`]s for the presentation surface to execute, and
//! the surface feeds timer/frame outcomes back in as [`FrameSignal`]s. Each
//! created frame is tagged with a [`FrameToken`], so a callback from a frame
//! or timer that has since been superseded is detectably stale and ignored.

use thiserror::Error;

use crate::catalog::ProjectRecord;

/// Timing policy for the dialog. The teardown delay must match the
/// presentation layer's exit-transition duration.
#[derive(Clone, Copy, Debug)]
pub struct ModalTiming {
    pub load_timeout_ms: u32,
    pub teardown_ms: u32,
}

impl Default for ModalTiming {
    fn default() -> Self {
        ModalTiming {
            load_timeout_ms: 15_000,
            teardown_ms: 300,
        }
    }
}

/// Dialog lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Loading,
    Ready,
    Failed,
}

/// Generation tag minted per created frame. Timers and frame callbacks carry
/// the token of the frame they were armed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken(u64);

/// Commands for the presentation surface, executed in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Mark the dialog open (`data-state`/`aria-hidden`) and set its title.
    ShowDialog { title: String },
    /// Mark the dialog closed for assistive technology.
    HideDialog,
    LockScroll,
    UnlockScroll,
    /// Loading-indicator region visibility.
    ShowLoading,
    HideLoading,
    /// Embed-container region visibility.
    ShowEmbed,
    HideEmbed,
    /// Instantiate the sandboxed frame pointed at `url`, labelled from the
    /// record's title and description.
    CreateFrame {
        token: FrameToken,
        url: String,
        title: String,
        description: String,
    },
    DestroyFrame,
    StartLoadTimer { token: FrameToken, ms: u32 },
    CancelLoadTimer,
    /// Arm the deferred close-teardown timer.
    ScheduleTeardown { token: FrameToken, ms: u32 },
    /// Render the recovery UI: in-place retry plus a direct link to `url`.
    ShowFailure { url: String },
    ClearFailure,
    FocusCloseControl,
    RestoreFocus,
}

/// Named user inputs, decoupled from the concrete DOM events that carry them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserInput {
    CloseActivated,
    BackdropActivated,
    EscapePressed,
    RetryActivated,
}

/// Asynchronous outcomes delivered by the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSignal {
    Loaded(FrameToken),
    Failed(FrameToken),
    TimedOut(FrameToken),
    TeardownElapsed(FrameToken),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModalError {
    /// The record has no embeddable target; nothing changed.
    #[error("project has no embeddable target")]
    InvalidRequest,
    /// The same record is still tearing down from a previous close.
    #[error("project is still closing; try again shortly")]
    ReopenWhileClosing,
}

struct ActiveEmbed {
    id: String,
    title: String,
    description: String,
    url: String,
    token: FrameToken,
}

struct PendingTeardown {
    record_id: String,
    token: FrameToken,
}

/// Singleton controller over a recurring modal session.
pub struct EmbedModal {
    timing: ModalTiming,
    phase: Phase,
    generation: u64,
    active: Option<ActiveEmbed>,
    teardown: Option<PendingTeardown>,
    timer_armed: bool,
}

impl EmbedModal {
    pub fn new(timing: ModalTiming) -> Self {
        EmbedModal {
            timing,
            phase: Phase::Closed,
            generation: 0,
            active: None,
            teardown: None,
            timer_armed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Id of the record currently displayed, if any.
    pub fn active_record_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// True while the load-timeout timer is armed. Holds only in `Loading`.
    pub fn load_timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Begin showing `record`. Fails fast when the record has no embeddable
    /// target, or when the same record is still inside its deferred-teardown
    /// window. Re-opening the record already `Ready` is a no-op; any other
    /// re-open cancels the current session first.
    pub fn open(&mut self, record: &ProjectRecord) -> Result<Vec<Effect>, ModalError> {
        let Some(url) = record.embed_target() else {
            log::warn!("open rejected: no embed target for {:?}", record.id);
            return Err(ModalError::InvalidRequest);
        };
        let url = url.to_string();

        let mut effects = Vec::new();
        if let Some(pending) = &self.teardown {
            if pending.record_id == record.id {
                return Err(ModalError::ReopenWhileClosing);
            }
            // A different record may not wait: complete the deferred
            // teardown now so the old frame never outlives the new open.
            let token = pending.token;
            effects.extend(self.finish_teardown(token));
        }

        if self.phase == Phase::Ready
            && self.active.as_ref().is_some_and(|a| a.id == record.id)
        {
            return Ok(Vec::new());
        }

        if self.phase != Phase::Closed {
            // Cancel-then-open: discard the prior frame and timer in place.
            self.timer_armed = false;
            effects.push(Effect::CancelLoadTimer);
            effects.push(Effect::DestroyFrame);
            effects.push(Effect::ClearFailure);
        }

        effects.push(Effect::ShowDialog {
            title: record.title.clone(),
        });
        effects.push(Effect::LockScroll);
        effects.extend(self.enter_loading(record, url));
        effects.push(Effect::FocusCloseControl);
        Ok(effects)
    }

    /// Dismiss the dialog. Safe from any phase; a no-op while `Closed`.
    /// Frame and error markup are released on the deferred teardown timer so
    /// the exit transition can play.
    pub fn close(&mut self) -> Vec<Effect> {
        if self.phase == Phase::Closed {
            return Vec::new();
        }
        let mut effects = vec![Effect::HideDialog, Effect::UnlockScroll];
        if self.timer_armed {
            self.timer_armed = false;
            effects.push(Effect::CancelLoadTimer);
        }
        effects.push(Effect::RestoreFocus);

        let active = self.active.take().expect("non-closed phase has an active embed");
        self.teardown = Some(PendingTeardown {
            record_id: active.id,
            token: active.token,
        });
        effects.push(Effect::ScheduleTeardown {
            token: active.token,
            ms: self.timing.teardown_ms,
        });
        self.phase = Phase::Closed;
        effects
    }

    /// Re-run the loading sequence for the failed record. A no-op outside
    /// `Failed`.
    pub fn retry(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Failed {
            return Vec::new();
        }
        let active = self.active.take().expect("failed phase has an active embed");
        let record = ProjectRecord {
            id: active.id,
            title: active.title,
            description: active.description,
            ..Default::default()
        };
        let mut effects = vec![Effect::ClearFailure];
        effects.extend(self.enter_loading(&record, active.url));
        effects
    }

    /// Route a named user input to its transition.
    pub fn input(&mut self, input: UserInput) -> Vec<Effect> {
        match input {
            UserInput::CloseActivated
            | UserInput::BackdropActivated
            | UserInput::EscapePressed => self.close(),
            UserInput::RetryActivated => self.retry(),
        }
    }

    /// Apply an asynchronous outcome. Signals carrying a stale token, or
    /// arriving after the race already resolved, change nothing.
    pub fn signal(&mut self, signal: FrameSignal) -> Vec<Effect> {
        match signal {
            FrameSignal::Loaded(token) => {
                if self.phase != Phase::Loading || !self.is_current(token) {
                    return Vec::new();
                }
                self.phase = Phase::Ready;
                self.timer_armed = false;
                vec![Effect::CancelLoadTimer, Effect::HideLoading, Effect::ShowEmbed]
            }
            FrameSignal::Failed(token) | FrameSignal::TimedOut(token) => {
                if self.phase != Phase::Loading || !self.is_current(token) {
                    return Vec::new();
                }
                self.phase = Phase::Failed;
                self.timer_armed = false;
                let url = self
                    .active
                    .as_ref()
                    .map(|a| a.url.clone())
                    .unwrap_or_default();
                vec![
                    Effect::CancelLoadTimer,
                    Effect::HideLoading,
                    Effect::DestroyFrame,
                    Effect::ShowFailure { url },
                ]
            }
            FrameSignal::TeardownElapsed(token) => {
                if self.teardown.as_ref().is_some_and(|p| p.token == token) {
                    self.finish_teardown(token)
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn enter_loading(&mut self, record: &ProjectRecord, url: String) -> Vec<Effect> {
        self.generation += 1;
        let token = FrameToken(self.generation);
        self.active = Some(ActiveEmbed {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            url: url.clone(),
            token,
        });
        self.phase = Phase::Loading;
        self.timer_armed = true;
        vec![
            Effect::ShowLoading,
            Effect::HideEmbed,
            Effect::CreateFrame {
                token,
                url,
                title: record.title.clone(),
                description: record.description.clone(),
            },
            Effect::StartLoadTimer {
                token,
                ms: self.timing.load_timeout_ms,
            },
        ]
    }

    fn finish_teardown(&mut self, token: FrameToken) -> Vec<Effect> {
        debug_assert!(self.teardown.as_ref().is_some_and(|p| p.token == token));
        self.teardown = None;
        // Reset the regions to their pre-open defaults for the next session.
        vec![
            Effect::DestroyFrame,
            Effect::ClearFailure,
            Effect::HideEmbed,
            Effect::ShowLoading,
        ]
    }

    fn is_current(&self, token: FrameToken) -> bool {
        self.active.as_ref().is_some_and(|a| a.token == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embeddable(id: &str, title: &str) -> ProjectRecord {
        ProjectRecord {
            id: id.into(),
            title: title.into(),
            description: format!("{title} description"),
            has_embed: true,
            embed_url: Some(format!("https://sketches.test/{id}/")),
            ..Default::default()
        }
    }

    fn plain(id: &str, title: &str) -> ProjectRecord {
        ProjectRecord {
            id: id.into(),
            title: title.into(),
            description: "coming soon".into(),
            has_embed: false,
            ..Default::default()
        }
    }

    /// Replays effect lists against counters so tests can assert the
    /// resource invariants (one frame, one timer) without a document.
    #[derive(Default)]
    struct Replay {
        frames_created: usize,
        frame_live: bool,
        timer: Option<FrameToken>,
        teardown: Option<FrameToken>,
        dialog_open: bool,
        focus_restored: usize,
    }

    impl Replay {
        fn apply(&mut self, effects: &[Effect]) {
            for fx in effects {
                match fx {
                    Effect::ShowDialog { .. } => self.dialog_open = true,
                    Effect::HideDialog => self.dialog_open = false,
                    Effect::CreateFrame { .. } => {
                        assert!(!self.frame_live, "second live frame created");
                        self.frames_created += 1;
                        self.frame_live = true;
                    }
                    Effect::DestroyFrame => self.frame_live = false,
                    Effect::StartLoadTimer { token, .. } => {
                        assert!(self.timer.is_none(), "second live timer armed");
                        self.timer = Some(*token);
                    }
                    Effect::CancelLoadTimer => self.timer = None,
                    Effect::ScheduleTeardown { token, .. } => self.teardown = Some(*token),
                    Effect::RestoreFocus => self.focus_restored += 1,
                    _ => {}
                }
            }
        }
    }

    fn open_token(effects: &[Effect]) -> FrameToken {
        effects
            .iter()
            .find_map(|fx| match fx {
                Effect::CreateFrame { token, .. } => Some(*token),
                _ => None,
            })
            .expect("no frame created")
    }

    fn run_teardown(modal: &mut EmbedModal, replay: &mut Replay) {
        let token = replay.teardown.take().expect("no teardown scheduled");
        replay.apply(&modal.signal(FrameSignal::TeardownElapsed(token)));
    }

    #[test]
    fn non_embeddable_record_never_leaves_closed() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let err = modal.open(&plain("epluribus", "Epluribus Technologies"));
        assert_eq!(err.unwrap_err(), ModalError::InvalidRequest);
        assert_eq!(modal.phase(), Phase::Closed);
        assert_eq!(modal.active_record_id(), None);
    }

    #[test]
    fn open_creates_one_frame_and_one_timer() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let mut replay = Replay::default();
        let effects = modal.open(&embeddable("treasure-hunter", "Treasure Hunter")).unwrap();
        replay.apply(&effects);

        assert_eq!(modal.phase(), Phase::Loading);
        assert_eq!(replay.frames_created, 1);
        assert!(replay.timer.is_some());
        assert!(replay.dialog_open);
        assert!(modal.load_timer_armed());
    }

    #[test]
    fn load_success_cancels_timer_and_timeout_cannot_fail_ready() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let mut replay = Replay::default();
        let effects = modal.open(&embeddable("treasure-hunter", "Treasure Hunter")).unwrap();
        let token = open_token(&effects);
        replay.apply(&effects);

        replay.apply(&modal.signal(FrameSignal::Loaded(token)));
        assert_eq!(modal.phase(), Phase::Ready);
        assert!(replay.timer.is_none());
        assert!(!modal.load_timer_armed());

        // A timeout that slipped past cancellation must not demote Ready.
        let late = modal.signal(FrameSignal::TimedOut(token));
        assert!(late.is_empty());
        assert_eq!(modal.phase(), Phase::Ready);
    }

    #[test]
    fn timeout_reaches_failed_and_late_signals_are_ignored() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let mut replay = Replay::default();
        let effects = modal.open(&embeddable("probabilities", "Probabilities")).unwrap();
        let token = open_token(&effects);
        replay.apply(&effects);

        let failed = modal.signal(FrameSignal::TimedOut(token));
        replay.apply(&failed);
        assert_eq!(modal.phase(), Phase::Failed);
        assert!(!replay.frame_live);
        assert!(failed.iter().any(|fx| matches!(fx, Effect::ShowFailure { .. })));

        // The frame answering after the timeout changes nothing.
        assert!(modal.signal(FrameSignal::Loaded(token)).is_empty());
        assert!(modal.signal(FrameSignal::Failed(token)).is_empty());
        assert_eq!(modal.phase(), Phase::Failed);
    }

    #[test]
    fn failure_ui_offers_retry_and_external_link() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let record = embeddable("pizza-matrix", "Pizza Matrix");
        let effects = modal.open(&record).unwrap();
        let token = open_token(&effects);

        let failed = modal.signal(FrameSignal::Failed(token));
        let url = failed
            .iter()
            .find_map(|fx| match fx {
                Effect::ShowFailure { url } => Some(url.clone()),
                _ => None,
            })
            .expect("failure UI not shown");
        assert_eq!(url, "https://sketches.test/pizza-matrix/");

        // The retry input is actionable from here...
        let retried = modal.input(UserInput::RetryActivated);
        assert!(!retried.is_empty());
        assert_eq!(modal.phase(), Phase::Loading);
    }

    #[test]
    fn close_releases_everything_after_teardown_delay() {
        for resolve in [None, Some(true), Some(false)] {
            let mut modal = EmbedModal::new(ModalTiming::default());
            let mut replay = Replay::default();
            let effects = modal.open(&embeddable("steamboat", "Steamboat Restoration")).unwrap();
            let token = open_token(&effects);
            replay.apply(&effects);
            match resolve {
                Some(true) => replay.apply(&modal.signal(FrameSignal::Loaded(token))),
                Some(false) => replay.apply(&modal.signal(FrameSignal::Failed(token))),
                None => {}
            }

            replay.apply(&modal.close());
            assert_eq!(modal.phase(), Phase::Closed);
            assert!(!replay.dialog_open);
            assert!(replay.timer.is_none());
            assert_eq!(replay.focus_restored, 1);

            run_teardown(&mut modal, &mut replay);
            assert!(!replay.frame_live);
            assert!(replay.teardown.is_none());
        }
    }

    #[test]
    fn close_from_closed_is_a_noop() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        assert!(modal.close().is_empty());
        assert!(modal.input(UserInput::EscapePressed).is_empty());
        assert!(modal.input(UserInput::BackdropActivated).is_empty());
    }

    #[test]
    fn retry_discards_failed_frame_and_creates_one_new() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let mut replay = Replay::default();
        let effects = modal.open(&embeddable("solarpunk-3d", "Solarpunk 3D")).unwrap();
        let first = open_token(&effects);
        replay.apply(&effects);
        replay.apply(&modal.signal(FrameSignal::TimedOut(first)));

        let frames_before = replay.frames_created;
        let retried = modal.retry();
        let second = open_token(&retried);
        replay.apply(&retried);

        assert_eq!(modal.phase(), Phase::Loading);
        assert_eq!(replay.frames_created, frames_before + 1);
        assert_ne!(first, second);

        // The superseded frame's signals no longer resolve the race.
        assert!(modal.signal(FrameSignal::Loaded(first)).is_empty());
        assert_eq!(modal.phase(), Phase::Loading);
    }

    #[test]
    fn retry_outside_failed_is_a_noop() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        assert!(modal.retry().is_empty());

        let effects = modal.open(&embeddable("treasure-hunter", "Treasure Hunter")).unwrap();
        let token = open_token(&effects);
        assert!(modal.retry().is_empty());
        assert_eq!(modal.phase(), Phase::Loading);

        modal.signal(FrameSignal::Loaded(token));
        assert!(modal.retry().is_empty());
        assert_eq!(modal.phase(), Phase::Ready);
    }

    #[test]
    fn switching_records_discards_the_old_session_first() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let mut replay = Replay::default();
        let effects_a = modal.open(&embeddable("treasure-hunter", "Treasure Hunter")).unwrap();
        let token_a = open_token(&effects_a);
        replay.apply(&effects_a);

        let effects_b = modal.open(&embeddable("pizza-matrix", "Pizza Matrix")).unwrap();
        let token_b = open_token(&effects_b);

        // Old frame and timer are discarded before the new frame appears.
        let destroy = effects_b
            .iter()
            .position(|fx| matches!(fx, Effect::DestroyFrame))
            .expect("old frame not destroyed");
        let cancel = effects_b
            .iter()
            .position(|fx| matches!(fx, Effect::CancelLoadTimer))
            .expect("old timer not cancelled");
        let create = effects_b
            .iter()
            .position(|fx| matches!(fx, Effect::CreateFrame { .. }))
            .unwrap();
        assert!(destroy < create && cancel < create);
        replay.apply(&effects_b);
        assert_eq!(replay.frames_created, 2);

        // A late signal tagged for record A must not affect record B.
        assert!(modal.signal(FrameSignal::Loaded(token_a)).is_empty());
        assert_eq!(modal.phase(), Phase::Loading);
        modal.signal(FrameSignal::Loaded(token_b));
        assert_eq!(modal.phase(), Phase::Ready);
        assert_eq!(modal.active_record_id(), Some("pizza-matrix"));
    }

    #[test]
    fn reopening_same_record_while_loading_restarts_the_load() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let record = embeddable("treasure-hunter", "Treasure Hunter");
        let first = open_token(&modal.open(&record).unwrap());
        let again = modal.open(&record).unwrap();
        let second = open_token(&again);
        assert_ne!(first, second);
        assert_eq!(modal.phase(), Phase::Loading);
    }

    #[test]
    fn reopening_same_record_while_ready_is_a_noop() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let record = embeddable("treasure-hunter", "Treasure Hunter");
        let token = open_token(&modal.open(&record).unwrap());
        modal.signal(FrameSignal::Loaded(token));

        let effects = modal.open(&record).unwrap();
        assert!(effects.is_empty());
        assert_eq!(modal.phase(), Phase::Ready);
    }

    #[test]
    fn reopening_same_record_while_closing_fails_fast() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let record = embeddable("treasure-hunter", "Treasure Hunter");
        modal.open(&record).unwrap();
        modal.close();

        let err = modal.open(&record);
        assert_eq!(err.unwrap_err(), ModalError::ReopenWhileClosing);
        assert_eq!(modal.phase(), Phase::Closed);
    }

    #[test]
    fn opening_other_record_while_closing_completes_teardown_first() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        let mut replay = Replay::default();
        let effects = modal.open(&embeddable("treasure-hunter", "Treasure Hunter")).unwrap();
        replay.apply(&effects);
        replay.apply(&modal.close());
        assert!(replay.teardown.is_some());

        let reopened = modal.open(&embeddable("pizza-matrix", "Pizza Matrix")).unwrap();
        let destroy = reopened
            .iter()
            .position(|fx| matches!(fx, Effect::DestroyFrame))
            .expect("pending teardown not completed");
        let create = reopened
            .iter()
            .position(|fx| matches!(fx, Effect::CreateFrame { .. }))
            .unwrap();
        assert!(destroy < create);
        replay.apply(&reopened);
        assert_eq!(modal.phase(), Phase::Loading);

        // The stale teardown timer firing later must not clobber session B.
        let stale = replay.teardown.take();
        assert!(stale.is_none() || modal.signal(FrameSignal::TeardownElapsed(stale.unwrap())).is_empty());
        assert_eq!(modal.phase(), Phase::Loading);
    }

    #[test]
    fn treasure_hunter_scenario_reaches_ready() {
        // open -> Loading -> frame load succeeds -> Ready, loading hidden,
        // embed container visible.
        let mut modal = EmbedModal::new(ModalTiming::default());
        let record = embeddable("treasure-hunter", "Treasure Hunter");
        let effects = modal.open(&record).unwrap();
        assert_eq!(modal.phase(), Phase::Loading);
        let token = open_token(&effects);

        let loaded = modal.signal(FrameSignal::Loaded(token));
        assert_eq!(modal.phase(), Phase::Ready);
        assert!(loaded.contains(&Effect::HideLoading));
        assert!(loaded.contains(&Effect::ShowEmbed));
    }

    #[test]
    fn default_timing_matches_the_page_policy() {
        let timing = ModalTiming::default();
        assert_eq!(timing.load_timeout_ms, 15_000);
        assert_eq!(timing.teardown_ms, 300);

        let mut modal = EmbedModal::new(ModalTiming {
            load_timeout_ms: 5_000,
            teardown_ms: 120,
        });
        let effects = modal.open(&embeddable("treasure-hunter", "Treasure Hunter")).unwrap();
        assert!(effects.iter().any(|fx| matches!(
            fx,
            Effect::StartLoadTimer { ms: 5_000, .. }
        )));
        let closed = modal.close();
        assert!(closed.iter().any(|fx| matches!(
            fx,
            Effect::ScheduleTeardown { ms: 120, .. }
        )));
    }

    #[test]
    fn timer_armed_only_while_loading() {
        let mut modal = EmbedModal::new(ModalTiming::default());
        assert!(!modal.load_timer_armed());

        let record = embeddable("treasure-hunter", "Treasure Hunter");
        let token = open_token(&modal.open(&record).unwrap());
        assert!(modal.load_timer_armed());

        modal.signal(FrameSignal::Loaded(token));
        assert!(!modal.load_timer_armed());

        modal.open(&embeddable("pizza-matrix", "Pizza Matrix")).unwrap();
        assert!(modal.load_timer_armed());
        modal.close();
        assert!(!modal.load_timer_armed());
    }
}
