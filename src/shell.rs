//! Top-level page state and its transitions.
//!
//! All mutation goes through [`PageState::update`]. The browser layer turns
//! DOM events into [`Msg`]s and carries out the returned [`Command`].

use crate::error::GenerateError;
use crate::generator::GenerationRequest;
use crate::profile::BrandProfile;

pub const FAILURE_NOTICE: &str = "Failed to refine profile. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Open,
}

#[derive(Debug)]
pub enum Msg {
    OpenGenerator,
    CloseGenerator,
    /// Click on the backdrop around the modal content.
    DismissOutside,
    PromptChanged(String),
    Submit,
    GenerationSettled(Result<BrandProfile, GenerateError>),
    Scrolled(f64),
    PointerEntered,
    PointerLeft,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Nothing changed.
    Ignore,
    Render,
    /// Render the busy state, then run the request.
    Generate(GenerationRequest),
    /// Render, then block on a failure notice.
    NotifyFailure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    profile: BrandProfile,
    phase: Phase,
    modal: Modal,
    prompt: String,
    scrolled: bool,
    interacting: bool,
    scroll_threshold: f64,
}

impl PageState {
    pub fn new(scroll_threshold: f64) -> Self {
        Self {
            profile: BrandProfile::default(),
            phase: Phase::Idle,
            modal: Modal::Closed,
            prompt: String::new(),
            scrolled: false,
            interacting: false,
            scroll_threshold,
        }
    }

    pub fn profile(&self) -> &BrandProfile {
        &self.profile
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn modal(&self) -> Modal {
        self.modal
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Generating
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Whether the submit control should accept a click.
    pub fn can_submit(&self) -> bool {
        !self.is_generating() && !self.prompt.trim().is_empty()
    }

    pub fn update(&mut self, msg: Msg) -> Command {
        match msg {
            Msg::OpenGenerator => {
                if self.modal == Modal::Open {
                    return Command::Ignore;
                }
                self.modal = Modal::Open;
                Command::Render
            }
            Msg::CloseGenerator | Msg::DismissOutside => {
                if self.modal == Modal::Closed || self.is_generating() {
                    return Command::Ignore;
                }
                self.modal = Modal::Closed;
                Command::Render
            }
            Msg::PromptChanged(text) => {
                if self.is_generating() {
                    return Command::Ignore;
                }
                self.prompt = text;
                Command::Render
            }
            Msg::Submit => {
                if self.modal != Modal::Open || !self.can_submit() {
                    return Command::Ignore;
                }
                self.phase = Phase::Generating;
                Command::Generate(GenerationRequest {
                    target_role: self.profile.role.clone(),
                    context: self.prompt.trim().to_owned(),
                })
            }
            Msg::GenerationSettled(result) => {
                if !self.is_generating() {
                    return Command::Ignore;
                }
                self.phase = Phase::Idle;
                match result {
                    Ok(profile) => {
                        self.profile = profile;
                        self.modal = Modal::Closed;
                        self.prompt.clear();
                        Command::Render
                    }
                    Err(err) => {
                        log::warn!("profile generation failed: {err}");
                        Command::NotifyFailure
                    }
                }
            }
            Msg::Scrolled(y) => {
                let scrolled = y > self.scroll_threshold;
                if scrolled == self.scrolled {
                    return Command::Ignore;
                }
                self.scrolled = scrolled;
                Command::Render
            }
            Msg::PointerEntered => self.set_interacting(true),
            Msg::PointerLeft => self.set_interacting(false),
        }
    }

    fn set_interacting(&mut self, interacting: bool) -> Command {
        if self.interacting == interacting {
            return Command::Ignore;
        }
        self.interacting = interacting;
        Command::Render
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_with_prompt(prompt: &str) -> PageState {
        let mut state = PageState::default();
        state.update(Msg::OpenGenerator);
        state.update(Msg::PromptChanged(prompt.into()));
        state
    }

    #[test]
    fn starts_idle_closed_with_default_profile() {
        let state = PageState::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.modal(), Modal::Closed);
        assert_eq!(state.profile(), &BrandProfile::default());
    }

    #[test]
    fn open_and_close() {
        let mut state = PageState::default();
        assert_eq!(state.update(Msg::OpenGenerator), Command::Render);
        assert_eq!(state.update(Msg::OpenGenerator), Command::Ignore);
        assert_eq!(state.update(Msg::DismissOutside), Command::Render);
        assert_eq!(state.modal(), Modal::Closed);
        assert_eq!(state.update(Msg::CloseGenerator), Command::Ignore);
    }

    #[test]
    fn submit_uses_current_role_and_trimmed_prompt() {
        let mut state = open_with_prompt("  lean into infra  ");
        let cmd = state.update(Msg::Submit);
        assert_eq!(
            cmd,
            Command::Generate(GenerationRequest {
                target_role: "Fullstack Engineer".into(),
                context: "lean into infra".into(),
            })
        );
        assert_eq!(state.phase(), Phase::Generating);
        assert_eq!(state.modal(), Modal::Open);
    }

    #[test]
    fn blank_prompt_never_starts_generation() {
        for prompt in ["", "   ", "\n\t"] {
            let mut state = open_with_prompt(prompt);
            assert!(!state.can_submit());
            assert_eq!(state.update(Msg::Submit), Command::Ignore);
            assert_eq!(state.phase(), Phase::Idle);
        }
    }

    #[test]
    fn submit_requires_open_modal() {
        let mut state = PageState::default();
        state.update(Msg::PromptChanged("something".into()));
        assert_eq!(state.update(Msg::Submit), Command::Ignore);
    }

    #[test]
    fn modal_cannot_close_or_resubmit_while_generating() {
        let mut state = open_with_prompt("x");
        state.update(Msg::Submit);
        assert_eq!(state.update(Msg::DismissOutside), Command::Ignore);
        assert_eq!(state.update(Msg::CloseGenerator), Command::Ignore);
        assert_eq!(state.update(Msg::Submit), Command::Ignore);
        assert_eq!(state.update(Msg::PromptChanged("y".into())), Command::Ignore);
        assert_eq!(state.modal(), Modal::Open);
        assert_eq!(state.prompt(), "x");
    }

    #[test]
    fn success_swaps_profile_and_closes() {
        let mut state = open_with_prompt("go data");
        state.update(Msg::Submit);

        let mut next = BrandProfile::default();
        next.name = "Dana Data".into();
        next.role = "Data Engineer".into();
        next.hue_shift = 120.0;

        let cmd = state.update(Msg::GenerationSettled(Ok(next.clone())));
        assert_eq!(cmd, Command::Render);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.modal(), Modal::Closed);
        assert_eq!(state.prompt(), "");
        assert_eq!(state.profile(), &next);
    }

    #[test]
    fn failure_keeps_profile_prompt_and_modal() {
        let mut state = open_with_prompt("go data");
        state.update(Msg::Submit);

        let cmd = state.update(Msg::GenerationSettled(Err(GenerateError::EmptyResponse)));
        assert_eq!(cmd, Command::NotifyFailure);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.modal(), Modal::Open);
        assert_eq!(state.prompt(), "go data");
        assert_eq!(state.profile(), &BrandProfile::default());
        assert!(state.can_submit());
    }

    #[test]
    fn stray_settlement_is_ignored() {
        let mut state = PageState::default();
        let cmd = state.update(Msg::GenerationSettled(Ok(BrandProfile::default())));
        assert_eq!(cmd, Command::Ignore);
    }

    #[test]
    fn scroll_flag_flips_past_threshold_only() {
        let mut state = PageState::default();
        assert_eq!(state.update(Msg::Scrolled(50.0)), Command::Ignore);
        assert!(!state.is_scrolled());
        assert_eq!(state.update(Msg::Scrolled(51.0)), Command::Render);
        assert!(state.is_scrolled());
        assert_eq!(state.update(Msg::Scrolled(900.0)), Command::Ignore);
        assert_eq!(state.update(Msg::Scrolled(0.0)), Command::Render);
        assert!(!state.is_scrolled());
    }

    #[test]
    fn pointer_flag_is_last_event_wins() {
        let mut state = PageState::default();
        state.update(Msg::PointerEntered);
        state.update(Msg::PointerEntered);
        assert!(state.is_interacting());
        state.update(Msg::PointerLeft);
        assert!(!state.is_interacting());
    }
}
