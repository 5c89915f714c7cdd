//! Render State and Transform
//!
//! The renderer's whole screen state, advanced by a single pure function:
//! `(state, input) -> (state, outbound events)`. Exactly one task owns a
//! `RenderState` and feeds it messages, keys, and ticks in arrival order,
//! so no locking exists anywhere near render state. A tick is just
//! another input.
//!
//! Outbound events returned by a transform must be written before the
//! next input is processed - the dispatch loop upholds that ordering.

use limelight_core::{MessageId, ProgressPayload, RendererEvent, UiBody, UiMessage};
use ratatui::text::Line;

use crate::animation::{Spring, SpringProfile};
use crate::theme::Theme;
use crate::views::{
    AlertView, CodeView, ConfirmView, FormView, InputView, KeyInput, KeyOutcome, MarkdownView,
    ProgressView, SelectView, SpinnerView, TableView, TextView,
};

/// Display blocks kept in the scrollback. Old blocks fall off the front
/// past this point.
const MAX_BLOCKS: usize = 256;

/// One input to the transform function.
#[derive(Clone, Debug)]
pub enum Input {
    /// A decoded protocol message.
    Message(UiMessage),
    /// A user key press.
    Key(KeyInput),
    /// One animation tick.
    Tick,
}

/// A display block in the scrollback.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Plain text.
    Text(TextView),
    /// Markdown text.
    Markdown(MarkdownView),
    /// Alert callout.
    Alert(AlertView),
    /// Progress bar.
    Progress(ProgressView),
    /// Activity spinner.
    Spinner(SpinnerView),
    /// Data table.
    Table(TableView),
    /// Source listing.
    Code(CodeView),
}

impl Block {
    /// Render this block's fragment.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        match self {
            Self::Text(v) => v.render_lines(theme, width),
            Self::Markdown(v) => v.render_lines(theme, width),
            Self::Alert(v) => v.render_lines(theme, width),
            Self::Progress(v) => v.render_lines(theme, width),
            Self::Spinner(v) => v.render_lines(theme, width),
            Self::Table(v) => v.render_lines(theme, width),
            Self::Code(v) => v.render_lines(theme, width),
        }
    }

    /// Advance animations one tick. Returns true while more ticks are
    /// wanted.
    fn tick(&mut self) -> bool {
        match self {
            Self::Progress(v) => v.tick(),
            Self::Spinner(v) => v.tick(),
            _ => false,
        }
    }
}

/// The open interactive request, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Modal {
    /// Id of the request awaiting this interaction's reply.
    pub id: MessageId,
    /// The interactive view.
    pub view: InteractiveView,
    /// Entry animation: 0 (hidden) to 1 (fully revealed). Controls how
    /// much of the fragment interactive painting shows; the fragment
    /// itself is always complete.
    pub reveal: Spring,
}

impl Modal {
    fn new(id: MessageId, view: InteractiveView) -> Self {
        let mut reveal = Spring::new(SpringProfile::Fast);
        reveal.set_target(1.0);
        Self { id, view, reveal }
    }

    /// The cancelled reply owed to the agent if this modal is torn down
    /// without user completion.
    pub fn cancel_reply(&self) -> RendererEvent {
        let payload = match &self.view {
            InteractiveView::Form(v) => v.cancel_reply(),
            InteractiveView::Confirm(v) => v.cancel_reply(),
            InteractiveView::Select(v) => v.cancel_reply(),
            InteractiveView::Input(v) => v.cancel_reply(),
        };
        RendererEvent::reply(self.id.clone(), payload)
    }
}

/// The interactive view kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractiveView {
    /// Multi-field form.
    Form(FormView),
    /// Yes/no confirmation.
    Confirm(ConfirmView),
    /// Option picker.
    Select(SelectView),
    /// Single-line prompt.
    Input(InputView),
}

impl InteractiveView {
    fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        match self {
            Self::Form(v) => v.handle_key(key),
            Self::Confirm(v) => v.handle_key(key),
            Self::Select(v) => v.handle_key(key),
            Self::Input(v) => v.handle_key(key),
        }
    }

    /// Render this view's fragment.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        match self {
            Self::Form(v) => v.render_lines(theme, width),
            Self::Confirm(v) => v.render_lines(theme, width),
            Self::Select(v) => v.render_lines(theme, width),
            Self::Input(v) => v.render_lines(theme, width),
        }
    }
}

/// Why the loop should stop.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct QuitState {
    /// Goodbye line to show after teardown.
    pub message: Option<String>,
}

/// Immutable-per-frame snapshot of everything on screen.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RenderState {
    /// Scrollback of display blocks, oldest first.
    pub blocks: Vec<Block>,
    /// Open interactive request, if any.
    pub modal: Option<Modal>,
    /// Set when the agent asked the renderer to exit.
    pub quit: Option<QuitState>,
}

impl RenderState {
    /// Fresh, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the agent has asked the renderer to exit.
    pub fn is_quitting(&self) -> bool {
        self.quit.is_some()
    }

    /// Whether anything on screen wants fast ticks right now.
    pub fn has_active_animation(&self) -> bool {
        if self
            .modal
            .as_ref()
            .is_some_and(|modal| modal.reveal.is_active())
        {
            return true;
        }
        self.blocks.iter().any(|block| match block {
            Block::Spinner(_) => true,
            Block::Progress(v) => v.is_indeterminate() || v.is_animating(),
            _ => false,
        })
    }
}

/// Advance the state by one input, producing the replacement state and any
/// outbound events, in order.
pub fn transform(state: RenderState, input: Input) -> (RenderState, Vec<RendererEvent>) {
    match input {
        Input::Message(msg) => apply_message(state, msg),
        Input::Key(key) => apply_key(state, key),
        Input::Tick => apply_tick(state),
    }
}

fn push_block(state: &mut RenderState, block: Block) {
    state.blocks.push(block);
    if state.blocks.len() > MAX_BLOCKS {
        let excess = state.blocks.len() - MAX_BLOCKS;
        state.blocks.drain(..excess);
    }
}

/// Route a progress payload: update the bar with the same label when one
/// exists, otherwise append a new bar.
fn apply_progress(state: &mut RenderState, payload: ProgressPayload) {
    let label = payload.label.as_deref();
    for block in state.blocks.iter_mut().rev() {
        if let Block::Progress(existing) = block {
            if existing.label() == label {
                existing.update(payload);
                return;
            }
        }
    }
    push_block(state, Block::Progress(ProgressView::new(payload)));
}

fn apply_message(mut state: RenderState, msg: UiMessage) -> (RenderState, Vec<RendererEvent>) {
    let mut out = Vec::new();
    let UiMessage { id, body } = msg;

    if body.is_request() && id.is_none() {
        tracing::warn!(kind = body.kind(), "request message without an id; cannot reply");
        out.push(RendererEvent::error(
            None,
            format!("{} message is missing an id", body.kind()),
        ));
        return (state, out);
    }

    match body {
        UiBody::Text(payload) => push_block(&mut state, Block::Text(TextView::new(payload))),
        UiBody::Markdown(payload) => {
            push_block(&mut state, Block::Markdown(MarkdownView::new(payload)));
        }
        UiBody::Alert(payload) => push_block(&mut state, Block::Alert(AlertView::new(payload))),
        UiBody::Progress(payload) => apply_progress(&mut state, payload),
        UiBody::Spinner(payload) => {
            push_block(&mut state, Block::Spinner(SpinnerView::new(payload)));
        }
        UiBody::Table(payload) => push_block(&mut state, Block::Table(TableView::new(payload))),
        UiBody::Code(payload) => push_block(&mut state, Block::Code(CodeView::new(payload))),
        UiBody::Quit(payload) => {
            state.quit = Some(QuitState {
                message: payload.message,
            });
        }
        UiBody::Form(payload) => {
            install_modal(&mut state, &mut out, id, InteractiveView::Form(FormView::new(payload)));
        }
        UiBody::Confirm(payload) => {
            install_modal(
                &mut state,
                &mut out,
                id,
                InteractiveView::Confirm(ConfirmView::new(payload)),
            );
        }
        UiBody::Select(payload) => {
            install_modal(
                &mut state,
                &mut out,
                id,
                InteractiveView::Select(SelectView::new(payload)),
            );
        }
        UiBody::Input(payload) => {
            install_modal(
                &mut state,
                &mut out,
                id,
                InteractiveView::Input(InputView::new(payload)),
            );
        }
    }

    (state, out)
}

/// A newer interactive request supersedes an open one: the old request is
/// answered with its cancelled reply so the agent never hangs on it.
fn install_modal(
    state: &mut RenderState,
    out: &mut Vec<RendererEvent>,
    id: Option<MessageId>,
    view: InteractiveView,
) {
    let Some(id) = id else { return };
    if let Some(old) = state.modal.take() {
        tracing::debug!(old = %old.id, new = %id, "interactive request superseded");
        out.push(old.cancel_reply());
    }
    state.modal = Some(Modal::new(id, view));
}

fn apply_key(mut state: RenderState, key: KeyInput) -> (RenderState, Vec<RendererEvent>) {
    let mut out = Vec::new();
    if let Some(mut modal) = state.modal.take() {
        match modal.view.handle_key(key) {
            KeyOutcome::Reply(payload) => {
                out.push(RendererEvent::reply(modal.id, payload));
            }
            KeyOutcome::Consumed | KeyOutcome::Ignored => {
                state.modal = Some(modal);
            }
        }
    }
    (state, out)
}

fn apply_tick(mut state: RenderState) -> (RenderState, Vec<RendererEvent>) {
    for block in &mut state.blocks {
        block.tick();
    }
    if let Some(modal) = &mut state.modal {
        modal.reveal.tick();
    }
    (state, Vec::new())
}

/// Render the whole state to a fragment: every block, oldest first,
/// separated by blank lines, with the open modal last. This is the byte
/// contract shared by interactive painting and headless output.
pub fn render_fragment(state: &RenderState, theme: &Theme, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, block) in state.blocks.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(String::new()));
        }
        lines.extend(block.render_lines(theme, width));
    }
    if let Some(modal) = &state.modal {
        if !lines.is_empty() {
            lines.push(Line::from(String::new()));
        }
        lines.extend(modal.view.render_lines(theme, width));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::line_text;
    use limelight_core::{
        ConfirmPayload, ProgressPayload, SpinnerPayload, TextPayload,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text_msg(content: &str) -> UiMessage {
        UiMessage::display(UiBody::Text(TextPayload {
            content: content.into(),
        }))
    }

    fn confirm_msg(id: &str) -> UiMessage {
        UiMessage {
            id: Some(MessageId(id.into())),
            body: UiBody::Confirm(ConfirmPayload {
                message: "Delete?".into(),
                yes_label: None,
                no_label: None,
            }),
        }
    }

    #[test]
    fn display_messages_append_blocks_without_events() {
        let (state, out) = transform(RenderState::new(), Input::Message(text_msg("one")));
        let (state, _) = transform(state, Input::Message(text_msg("two")));
        assert_eq!(state.blocks.len(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn confirm_yes_produces_exactly_one_reply() {
        let (state, out) = transform(RenderState::new(), Input::Message(confirm_msg("r1")));
        assert!(out.is_empty());
        assert!(state.modal.is_some());

        let (state, out) = transform(state, Input::Key(KeyInput::Char('y')));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0],
            RendererEvent::reply(MessageId("r1".into()), json!({"confirmed": true}))
        );
        assert!(state.modal.is_none());

        // Further keys answer nothing - the interaction is over.
        let (_, out) = transform(state, Input::Key(KeyInput::Enter));
        assert!(out.is_empty());
    }

    #[test]
    fn superseding_request_cancels_the_open_one() {
        let (state, _) = transform(RenderState::new(), Input::Message(confirm_msg("r1")));
        let (state, out) = transform(state, Input::Message(confirm_msg("r2")));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0],
            RendererEvent::reply(MessageId("r1".into()), json!({"confirmed": false}))
        );
        assert_eq!(state.modal.as_ref().unwrap().id, MessageId("r2".into()));
    }

    #[test]
    fn request_without_id_yields_an_error_event() {
        let msg = UiMessage::display(UiBody::Confirm(ConfirmPayload {
            message: "Delete?".into(),
            yes_label: None,
            no_label: None,
        }));
        let (state, out) = transform(RenderState::new(), Input::Message(msg));
        assert!(state.modal.is_none());
        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0].body,
            limelight_core::EventBody::Error(_)
        ));
        assert!(out[0].id.is_none());
    }

    #[test]
    fn progress_updates_replace_by_label() {
        let progress = |current: f64| {
            UiMessage::display(UiBody::Progress(ProgressPayload {
                label: Some("sync".into()),
                current,
                total: 10.0,
            }))
        };
        let (state, _) = transform(RenderState::new(), Input::Message(progress(2.0)));
        let (state, _) = transform(state, Input::Message(progress(8.0)));
        assert_eq!(state.blocks.len(), 1);

        let other = UiMessage::display(UiBody::Progress(ProgressPayload {
            label: Some("other".into()),
            current: 1.0,
            total: 2.0,
        }));
        let (state, _) = transform(state, Input::Message(other));
        assert_eq!(state.blocks.len(), 2);
    }

    #[test]
    fn quit_message_sets_the_terminal_condition() {
        let msg = UiMessage::display(UiBody::Quit(limelight_core::QuitPayload {
            message: Some("Bye!".into()),
        }));
        let (state, out) = transform(RenderState::new(), Input::Message(msg));
        assert!(state.is_quitting());
        assert_eq!(state.quit.unwrap().message.as_deref(), Some("Bye!"));
        assert!(out.is_empty());
    }

    #[test]
    fn ticks_are_inputs_like_any_other() {
        let spinner = UiMessage::display(UiBody::Spinner(SpinnerPayload { label: None }));
        let (state, _) = transform(RenderState::new(), Input::Message(spinner));
        let theme = Theme::charm_dark();
        let before = line_text(&render_fragment(&state, &theme, 40)[0]);
        let (state, out) = transform(state, Input::Tick);
        assert!(out.is_empty());
        let after = line_text(&render_fragment(&state, &theme, 40)[0]);
        assert_ne!(before, after, "tick should advance the spinner frame");
    }

    #[test]
    fn animation_activity_follows_screen_content() {
        let state = RenderState::new();
        assert!(!state.has_active_animation());

        let spinner = UiMessage::display(UiBody::Spinner(SpinnerPayload { label: None }));
        let (state, _) = transform(state, Input::Message(spinner));
        assert!(state.has_active_animation());
    }

    #[test]
    fn modal_reveal_settles_and_stops_requesting_ticks() {
        let (mut state, _) = transform(RenderState::new(), Input::Message(confirm_msg("r1")));
        assert!(state.has_active_animation());
        for _ in 0..200 {
            let (next, _) = transform(state, Input::Tick);
            state = next;
        }
        assert!(!state.has_active_animation());
        assert_eq!(state.modal.as_ref().unwrap().reveal.value(), 1.0);
    }
}
