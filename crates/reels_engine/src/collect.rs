use reels_core::{extract_content_id, CollectionPlan, CollectionReport, CollectionRun, StepOutcome};
use reels_logging::{reels_debug, reels_info, reels_warn, Lane};

use crate::types::lock_queue;
use crate::{AutomationSession, SharedQueue};

/// One bounded scrape pass over a session already showing an item.
///
/// Each step waits for the surface to settle, reads the location and appends
/// the identifier if it is new, then gestures to the next item unless the pass
/// is complete. A step that fails is skipped; only a closed session ends the
/// pass early. Re-visited items are absorbed by the queue's dedup.
pub async fn run_collection(
    session: &dyn AutomationSession,
    queue: &SharedQueue,
    sentinel: &str,
    plan: CollectionPlan,
    lane: Lane,
) -> CollectionReport {
    let mut run = CollectionRun::new(plan);

    while !run.is_done() {
        tokio::time::sleep(plan.settle_delay).await;

        if !session.is_open() {
            reels_warn!(lane, "session closed during collection; stopping pass");
            break;
        }

        let step = run.steps_attempted();
        let outcome = match session.current_location().await {
            Ok(location) => match extract_content_id(&location, sentinel) {
                Ok(id) => {
                    let added = lock_queue(queue).append(id.clone());
                    if added {
                        reels_debug!(lane, "step {} collected {}", step, id);
                        StepOutcome::Added
                    } else {
                        StepOutcome::Duplicate
                    }
                }
                Err(err) => {
                    reels_debug!(lane, "step {} has no item: {}", step, err);
                    StepOutcome::NoItem(err)
                }
            },
            Err(err) if err.is_fatal() => {
                reels_warn!(lane, "step {} lost the session: {}", step, err);
                break;
            }
            Err(err) => {
                reels_warn!(lane, "step {} skipped: {}", step, err);
                StepOutcome::Skipped
            }
        };
        run.record(&outcome);

        if run.is_done() {
            break;
        }
        if let Err(err) = session.advance_gesture().await {
            if err.is_fatal() {
                reels_warn!(lane, "advance after step {} lost the session: {}", step, err);
                break;
            }
            reels_warn!(lane, "advance after step {} failed: {}", step, err);
        }
    }

    let report = run.report(lock_queue(queue).len());
    reels_info!(
        lane,
        "collection pass done: {} new in {} steps ({} skipped), queue length {}",
        report.discovered_count,
        run.steps_attempted(),
        run.skipped(),
        report.total_queue_length
    );
    report
}
