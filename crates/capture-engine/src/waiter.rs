//! Waiting for the single frame of a request.
//!
//! The backend's handler pushes exactly one [`FrameDelivery`] into a one-shot
//! channel. The caller awaits it against a fixed deadline. A poll interval
//! ticks alongside so the calling thread's message queue is drained while
//! waiting, for hosts whose callbacks ride on that queue.

use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_common::timing::WaitPolicy;
use primeshot_platform_core::{FrameBuffer, FrameReceiver};
use tokio::time::{Instant, MissedTickBehavior};

/// How a wait ended, before it is folded into a `CaptureResult`.
#[derive(Debug)]
pub enum WaitOutcome {
    /// The handler delivered a frame or an error.
    Delivered(CaptureResult<FrameBuffer>),
    /// The channel closed without a delivery.
    Abandoned,
    /// The deadline passed.
    TimedOut,
}

/// Await the frame channel, calling `pump` every poll interval.
pub async fn wait_for_delivery<P>(
    mut rx: FrameReceiver,
    policy: &WaitPolicy,
    mut pump: P,
) -> WaitOutcome
where
    P: FnMut(),
{
    let deadline = policy.start();
    let sleep = tokio::time::sleep_until(Instant::from_std(deadline.instant()));
    tokio::pin!(sleep);

    let mut ticker = tokio::time::interval(policy.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(
        timeout_ms = policy.timeout.as_millis() as u64,
        poll_ms = policy.poll_interval.as_millis() as u64,
        "waiting for frame"
    );

    loop {
        tokio::select! {
            biased;
            delivered = &mut rx => {
                return match delivered {
                    Ok(delivery) => {
                        tracing::debug!(elapsed_ms = deadline.elapsed().as_millis() as u64, "frame delivered");
                        WaitOutcome::Delivered(delivery)
                    }
                    Err(_) => WaitOutcome::Abandoned,
                };
            }
            _ = &mut sleep => return WaitOutcome::TimedOut,
            _ = ticker.tick() => pump(),
        }
    }
}

/// Await the frame and fold every non-delivery into `TimeoutError`.
///
/// A handler that fails after receiving a frame still wakes the waiter at
/// once, but the request ends as a save failure: the frame arrived and no
/// image could be produced from it.
pub async fn wait_for_frame<P>(
    rx: FrameReceiver,
    policy: &WaitPolicy,
    pump: P,
) -> CaptureResult<FrameBuffer>
where
    P: FnMut(),
{
    match wait_for_delivery(rx, policy, pump).await {
        WaitOutcome::Delivered(delivery) => delivery.map_err(|e| {
            tracing::error!("frame handler failed: {e}");
            CaptureError::file_save(format!("frame could not be read back: {e}"))
        }),
        WaitOutcome::Abandoned => {
            tracing::error!("frame channel closed before any frame arrived");
            Err(CaptureError::timeout(policy.timeout))
        }
        WaitOutcome::TimedOut => {
            tracing::error!(
                "timeout: no frame received within {}ms",
                policy.timeout.as_millis()
            );
            Err(CaptureError::timeout(policy.timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use primeshot_common::error::ErrorCode;
    use primeshot_platform_core::{frame_channel, handle_frame_arrival, FrameArrival};

    use super::*;

    fn quick_policy() -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(120), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn delivered_frame_is_returned() {
        let (slot, rx) = frame_channel();
        let frame = FrameBuffer::bgra8(vec![1, 2, 3, 255], 1, 1, 4);
        slot.deliver(Ok(frame.clone()));

        let got = wait_for_frame(rx, &quick_policy(), || {}).await.unwrap();
        assert_eq!(got, frame);
    }

    #[tokio::test]
    async fn late_delivery_from_another_task_is_awaited() {
        let (slot, rx) = frame_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            slot.deliver(Ok(FrameBuffer::bgra8(vec![0; 4], 1, 1, 4)));
        });

        let mut pumps = 0;
        let got = wait_for_frame(rx, &quick_policy(), || pumps += 1).await;
        assert!(got.is_ok());
        assert!(pumps >= 1);
    }

    #[tokio::test]
    async fn handler_error_wakes_waiter_as_save_failure() {
        let (slot, rx) = frame_channel();
        slot.deliver(Err(CaptureError::texture_processing("map failed")));

        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(10));
        let started = std::time::Instant::now();
        let err = wait_for_frame(rx, &policy, || {}).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::FileSaveFailed);
        assert!(err.to_string().contains("map failed"));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn silence_times_out_and_keeps_pumping() {
        let (_slot, rx) = frame_channel();
        let mut pumps = 0;
        let err = wait_for_frame(rx, &quick_policy(), || pumps += 1)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TimeoutError);
        assert!(pumps >= 2, "pumped {pumps} times");
    }

    #[tokio::test]
    async fn dropped_frame_surfaces_as_timeout() {
        let (slot, rx) = frame_channel();
        let outcome = handle_frame_arrival(&slot, || Err::<(), _>("no frame"), |()| {
            Ok(FrameBuffer::bgra8(vec![0; 4], 1, 1, 4))
        });
        assert_eq!(outcome, FrameArrival::NoFrame);

        let err = wait_for_frame(rx, &quick_policy(), || {}).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TimeoutError);
    }

    #[tokio::test]
    async fn closed_channel_is_reported_as_abandoned() {
        let (slot, rx) = frame_channel();
        slot.close();

        let outcome = wait_for_delivery(rx, &quick_policy(), || {}).await;
        assert!(matches!(outcome, WaitOutcome::Abandoned));
    }
}
