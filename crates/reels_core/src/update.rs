use crate::{Advance, Effect, Interaction, Msg, NavigatorState, Phase, ReelEvent, ReelQueue};

/// Pure update function: applies a message to the navigator and its queue and
/// returns the effects to run, in order.
///
/// Effects produced by a message must run to completion before the next
/// message is applied; an effect may itself feed a message back in.
pub fn update(
    mut state: NavigatorState,
    queue: &mut ReelQueue,
    msg: Msg,
) -> (NavigatorState, Vec<Effect>) {
    let effects = match msg {
        Msg::InitializeRequested => {
            if state.phase() == Phase::Uninitialized {
                state.set_phase(Phase::Initializing);
                vec![Effect::OpenPrimarySession]
            } else {
                Vec::new()
            }
        }
        Msg::SurfaceLoaded => match state.phase() {
            Phase::Initializing => vec![
                Effect::Emit(ReelEvent::ReelsLoaded),
                Effect::CollectForeground,
            ],
            Phase::Ready => vec![Effect::CollectForeground],
            Phase::Uninitialized | Phase::Failed | Phase::Closed => Vec::new(),
        },
        Msg::SurfaceFailed { detail } => match state.phase() {
            Phase::Initializing => {
                state.set_phase(Phase::Failed);
                vec![Effect::Emit(ReelEvent::Error { detail })]
            }
            // Recovery failure: the cursor stays exhausted until the next attempt.
            Phase::Ready => vec![Effect::Emit(ReelEvent::Error { detail })],
            Phase::Uninitialized | Phase::Failed | Phase::Closed => Vec::new(),
        },
        Msg::ForegroundCollected(report) => match state.phase() {
            Phase::Initializing => {
                state.set_phase(Phase::Ready);
                vec![
                    Effect::Emit(ReelEvent::ReelsCollected(report)),
                    Effect::RequestBackgroundRun,
                    Effect::Emit(ReelEvent::Ready),
                ]
            }
            Phase::Ready => vec![Effect::Emit(ReelEvent::ReelsCollected(report))],
            Phase::Uninitialized | Phase::Failed | Phase::Closed => Vec::new(),
        },
        Msg::NextRequested { collecting } => {
            if !state.is_ready() {
                return (state, Vec::new());
            }
            match queue.advance() {
                Advance::Exhausted { cursor } => vec![
                    Effect::ReloadPrimarySession,
                    Effect::Emit(ReelEvent::ReelChanged { index: cursor }),
                ],
                Advance::Ready { cursor } => {
                    let mut effects = Vec::with_capacity(2);
                    if state.policy().needs_collection(queue.status(collecting)) {
                        effects.push(Effect::RequestBackgroundRun);
                    }
                    effects.push(Effect::Emit(ReelEvent::ReelChanged { index: cursor }));
                    effects
                }
            }
        }
        Msg::PreviousRequested => {
            if state.is_ready() {
                let index = queue.retreat();
                vec![Effect::Emit(ReelEvent::ReelChanged { index })]
            } else {
                Vec::new()
            }
        }
        Msg::InteractionRequested(interaction) => {
            if state.is_ready() {
                vec![Effect::Interact(interaction)]
            } else {
                Vec::new()
            }
        }
        Msg::InteractionDone(interaction) => {
            let event = match interaction {
                Interaction::Like => ReelEvent::ReelLiked,
                Interaction::Save => ReelEvent::ReelSaved,
            };
            vec![Effect::Emit(event)]
        }
        Msg::InteractionFailed { detail } => vec![Effect::Emit(ReelEvent::Error { detail })],
        Msg::ShutdownRequested => match state.phase() {
            Phase::Closed => Vec::new(),
            _ => {
                state.set_phase(Phase::Closed);
                vec![Effect::ClosePrimarySession]
            }
        },
    };

    (state, effects)
}
