use std::sync::Once;

use pretty_assertions::assert_eq;
use reels_core::{
    update, BufferPolicy, CollectionReport, ContentId, Effect, Interaction, Msg, NavigatorState,
    Phase, ReelEvent, ReelQueue,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(reels_logging::initialize_for_tests);
}

fn queue_with(count: usize) -> ReelQueue {
    let mut queue = ReelQueue::new();
    for i in 0..count {
        queue.append(ContentId::new(format!("reel{i}")).unwrap());
    }
    queue
}

fn report(discovered_count: usize, total_queue_length: usize) -> CollectionReport {
    CollectionReport {
        discovered_count,
        total_queue_length,
    }
}

/// Drives a fresh navigator through a successful initialize.
fn ready_state(queue: &mut ReelQueue) -> NavigatorState {
    let state = NavigatorState::new(BufferPolicy::new(5));
    let (state, _) = update(state, queue, Msg::InitializeRequested);
    let (state, _) = update(state, queue, Msg::SurfaceLoaded);
    let total = queue.len();
    let (state, _) = update(state, queue, Msg::ForegroundCollected(report(total, total)));
    assert_eq!(state.phase(), Phase::Ready);
    state
}

#[test]
fn initialize_opens_session_then_bootstraps() {
    init_logging();
    let mut queue = ReelQueue::new();
    let state = NavigatorState::default();

    let (state, effects) = update(state, &mut queue, Msg::InitializeRequested);
    assert_eq!(state.phase(), Phase::Initializing);
    assert_eq!(effects, vec![Effect::OpenPrimarySession]);

    let (state, effects) = update(state, &mut queue, Msg::SurfaceLoaded);
    assert_eq!(state.phase(), Phase::Initializing);
    assert_eq!(
        effects,
        vec![
            Effect::Emit(ReelEvent::ReelsLoaded),
            Effect::CollectForeground
        ]
    );

    let (state, effects) = update(state, &mut queue, Msg::ForegroundCollected(report(3, 3)));
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(
        effects,
        vec![
            Effect::Emit(ReelEvent::ReelsCollected(report(3, 3))),
            Effect::RequestBackgroundRun,
            Effect::Emit(ReelEvent::Ready),
        ]
    );
}

#[test]
fn initialize_twice_is_ignored() {
    init_logging();
    let mut queue = ReelQueue::new();
    let (state, _) = update(NavigatorState::default(), &mut queue, Msg::InitializeRequested);
    let (state, effects) = update(state, &mut queue, Msg::InitializeRequested);
    assert_eq!(state.phase(), Phase::Initializing);
    assert!(effects.is_empty());
}

#[test]
fn setup_failure_is_terminal() {
    init_logging();
    let mut queue = ReelQueue::new();
    let (state, _) = update(NavigatorState::default(), &mut queue, Msg::InitializeRequested);
    let (state, effects) = update(
        state,
        &mut queue,
        Msg::SurfaceFailed {
            detail: "timeout waiting for video".to_string(),
        },
    );
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        effects,
        vec![Effect::Emit(ReelEvent::Error {
            detail: "timeout waiting for video".to_string()
        })]
    );

    let (state, effects) = update(state, &mut queue, Msg::InitializeRequested);
    assert_eq!(state.phase(), Phase::Failed);
    assert!(effects.is_empty());
    let (state, effects) = update(state, &mut queue, Msg::NextRequested { collecting: false });
    assert_eq!(state.phase(), Phase::Failed);
    assert!(effects.is_empty());
}

#[test]
fn next_moves_cursor_by_one_each_call() {
    init_logging();
    let mut queue = queue_with(20);
    let mut state = ready_state(&mut queue);

    for expected in 1..=10 {
        let (next, effects) = update(state, &mut queue, Msg::NextRequested { collecting: true });
        state = next;
        assert_eq!(queue.cursor(), expected);
        assert_eq!(
            effects.last(),
            Some(&Effect::Emit(ReelEvent::ReelChanged { index: expected }))
        );
    }
}

#[test]
fn next_requests_background_run_when_margin_is_low() {
    init_logging();
    // total=6, cursor=0: advancing leaves remaining=5, at the margin.
    let mut queue = queue_with(6);
    let state = ready_state(&mut queue);

    let (_state, effects) = update(state, &mut queue, Msg::NextRequested { collecting: false });
    assert_eq!(queue.status(false).remaining, 5);
    assert_eq!(
        effects,
        vec![
            Effect::RequestBackgroundRun,
            Effect::Emit(ReelEvent::ReelChanged { index: 1 }),
        ]
    );
}

#[test]
fn next_leaves_buffer_alone_when_margin_is_healthy() {
    init_logging();
    // total=7: advancing leaves remaining=6.
    let mut queue = queue_with(7);
    let state = ready_state(&mut queue);

    let (_state, effects) = update(state, &mut queue, Msg::NextRequested { collecting: false });
    assert_eq!(
        effects,
        vec![Effect::Emit(ReelEvent::ReelChanged { index: 1 })]
    );
}

#[test]
fn next_does_not_request_while_collecting() {
    init_logging();
    let mut queue = queue_with(3);
    let state = ready_state(&mut queue);

    let (_state, effects) = update(state, &mut queue, Msg::NextRequested { collecting: true });
    assert_eq!(
        effects,
        vec![Effect::Emit(ReelEvent::ReelChanged { index: 1 })]
    );
}

#[test]
fn exhausted_queue_reloads_before_announcing_change() {
    init_logging();
    let mut queue = queue_with(3);
    let mut state = ready_state(&mut queue);
    for _ in 0..2 {
        state = update(state, &mut queue, Msg::NextRequested { collecting: true }).0;
    }
    assert_eq!(queue.cursor(), 2);

    let (state, effects) = update(state, &mut queue, Msg::NextRequested { collecting: true });
    assert_eq!(queue.cursor(), 3);
    assert_eq!(
        effects,
        vec![
            Effect::ReloadPrimarySession,
            Effect::Emit(ReelEvent::ReelChanged { index: 3 }),
        ]
    );

    // Reload reaches the surface: collect without re-announcing readiness.
    let (state, effects) = update(state, &mut queue, Msg::SurfaceLoaded);
    assert_eq!(effects, vec![Effect::CollectForeground]);
    let (state, effects) = update(state, &mut queue, Msg::ForegroundCollected(report(2, 5)));
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(
        effects,
        vec![Effect::Emit(ReelEvent::ReelsCollected(report(2, 5)))]
    );
}

#[test]
fn failed_recovery_reports_error_and_stays_ready() {
    init_logging();
    let mut queue = queue_with(1);
    let state = ready_state(&mut queue);
    let (state, _) = update(state, &mut queue, Msg::NextRequested { collecting: false });

    let (state, effects) = update(
        state,
        &mut queue,
        Msg::SurfaceFailed {
            detail: "navigation failed".to_string(),
        },
    );
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(
        effects,
        vec![Effect::Emit(ReelEvent::Error {
            detail: "navigation failed".to_string()
        })]
    );
}

#[test]
fn previous_never_goes_below_zero_or_collects() {
    init_logging();
    let mut queue = queue_with(2);
    let mut state = ready_state(&mut queue);

    for _ in 0..4 {
        let (next, effects) = update(state, &mut queue, Msg::PreviousRequested);
        state = next;
        assert_eq!(
            effects,
            vec![Effect::Emit(ReelEvent::ReelChanged { index: 0 })]
        );
    }
    assert_eq!(queue.cursor(), 0);
}

#[test]
fn interactions_only_run_when_ready() {
    init_logging();
    let mut queue = ReelQueue::new();
    let (_, effects) = update(
        NavigatorState::default(),
        &mut queue,
        Msg::InteractionRequested(Interaction::Like),
    );
    assert!(effects.is_empty());

    let mut queue = queue_with(2);
    let state = ready_state(&mut queue);
    let (state, effects) = update(state, &mut queue, Msg::InteractionRequested(Interaction::Save));
    assert_eq!(effects, vec![Effect::Interact(Interaction::Save)]);

    let (_, effects) = update(state, &mut queue, Msg::InteractionDone(Interaction::Save));
    assert_eq!(effects, vec![Effect::Emit(ReelEvent::ReelSaved)]);
}

#[test]
fn shutdown_closes_once() {
    init_logging();
    let mut queue = queue_with(2);
    let state = ready_state(&mut queue);

    let (state, effects) = update(state, &mut queue, Msg::ShutdownRequested);
    assert_eq!(state.phase(), Phase::Closed);
    assert_eq!(effects, vec![Effect::ClosePrimarySession]);

    let (state, effects) = update(state, &mut queue, Msg::ShutdownRequested);
    assert_eq!(state.phase(), Phase::Closed);
    assert!(effects.is_empty());

    let (_, effects) = update(state, &mut queue, Msg::NextRequested { collecting: false });
    assert!(effects.is_empty());
}
