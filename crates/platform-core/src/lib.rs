//! primeshot platform core contracts.
//!
//! This crate contains the platform-neutral display and frame data structures
//! shared by the capture engine and the OS backends, plus the one-shot
//! channel a backend uses to hand its single frame to the waiting caller.

use std::fmt::Display;
use std::sync::Mutex;

use primeshot_common::error::{CaptureError, CaptureResult};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Information about a connected monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorInfo {
    /// Monitor name/identifier.
    pub name: String,
    /// Resolution in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Position in the virtual desktop (pixels).
    pub x: i32,
    pub y: i32,
    /// Whether this monitor is primary.
    pub primary: bool,
}

/// Pick the primary monitor from an enumeration.
///
/// Falls back to the monitor containing the virtual desktop origin, which
/// is where the primary monitor always sits on Windows.
pub fn primary_monitor(monitors: &[MonitorInfo]) -> Option<&MonitorInfo> {
    monitors.iter().find(|m| m.primary).or_else(|| {
        monitors.iter().find(|m| {
            m.x <= 0 && m.y <= 0 && m.x + m.width as i32 > 0 && m.y + m.height as i32 > 0
        })
    })
}

/// Pixel size of a resolved capture item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSize {
    pub width: u32,
    pub height: u32,
}

impl ItemSize {
    /// Build from the signed size the compositor reports. Non-positive
    /// dimensions are rejected.
    pub fn from_signed(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Self {
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8 bits per channel, blue first, alpha last.
    #[default]
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8 => 4,
        }
    }
}

/// Raw pixels read back from the GPU.
///
/// `stride` is the row pitch of the mapped texture and may exceed
/// `width * 4`; the padding bytes at the end of each row are meaningless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: PixelFormat,
}

impl FrameBuffer {
    /// Wrap BGRA8 bytes with the given row pitch.
    pub fn bgra8(data: Vec<u8>, width: u32, height: u32, stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            format: PixelFormat::Bgra8,
        }
    }

    /// Bytes of real pixel data in one row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// The smallest buffer length that holds every visible row.
    pub fn required_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        self.stride * (self.height as usize - 1) + self.row_bytes()
    }

    /// Check the buffer can be walked row by row.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::encode(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }
        if self.stride < self.row_bytes() {
            return Err(CaptureError::encode(format!(
                "row pitch {} is smaller than a {}-pixel row",
                self.stride, self.width
            )));
        }
        if self.data.len() < self.required_len() {
            return Err(CaptureError::encode(format!(
                "frame holds {} bytes, {}x{} with pitch {} needs {}",
                self.data.len(),
                self.width,
                self.height,
                self.stride,
                self.required_len()
            )));
        }
        Ok(())
    }

    /// Iterate over the visible bytes of each row, skipping pitch padding.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let row_bytes = self.row_bytes();
        (0..self.height as usize).map(move |row| {
            let start = row * self.stride;
            &self.data[start..start + row_bytes]
        })
    }
}

/// What a backend delivers for one request: a frame or the reason it failed.
pub type FrameDelivery = CaptureResult<FrameBuffer>;

/// Receiving half of the per-request frame channel.
pub type FrameReceiver = oneshot::Receiver<FrameDelivery>;

/// Sending half of the per-request frame channel, shareable with a
/// platform callback that may fire more than once.
///
/// Only the first delivery is forwarded; the sender is consumed by it.
#[derive(Debug)]
pub struct FrameSlot {
    sender: Mutex<Option<oneshot::Sender<FrameDelivery>>>,
}

impl FrameSlot {
    /// Whether a delivery has already been made (or the slot was closed).
    pub fn is_spent(&self) -> bool {
        match self.sender.lock() {
            Ok(guard) => guard.is_none(),
            Err(_) => true,
        }
    }

    /// Forward `delivery` if this is the first one. Returns whether it was
    /// handed to the receiver.
    pub fn deliver(&self, delivery: FrameDelivery) -> bool {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => {
                if tx.send(delivery).is_err() {
                    tracing::debug!("frame receiver dropped before delivery");
                    return false;
                }
                true
            }
            None => {
                tracing::debug!("ignoring frame: this session already delivered one");
                false
            }
        }
    }

    /// Drop the sender without delivering, closing the channel.
    pub fn close(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
    }
}

/// Create the one-shot frame channel for a single capture request.
pub fn frame_channel() -> (FrameSlot, FrameReceiver) {
    let (tx, rx) = oneshot::channel();
    (
        FrameSlot {
            sender: Mutex::new(Some(tx)),
        },
        rx,
    )
}

/// What one frame-arrived callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameArrival {
    /// A frame was already delivered for this request; nothing was read.
    Ignored,
    /// The pool had no frame. Nothing was signalled.
    NoFrame,
    /// A frame was read back and handed to the waiter.
    Delivered,
    /// Readback failed and the error was handed to the waiter.
    Failed,
    /// The waiter was gone (or another callback won the race).
    Undelivered,
}

/// Run one frame-arrived callback against `slot`.
///
/// `next_frame` pulls the frame out of the pool and `read_back` turns it
/// into pixels. A missing frame is logged and not signalled, so a dropped
/// frame surfaces as a timeout. A readback error is delivered so the
/// waiter wakes at once.
pub fn handle_frame_arrival<F, E, N, R>(
    slot: &FrameSlot,
    next_frame: N,
    read_back: R,
) -> FrameArrival
where
    E: Display,
    N: FnOnce() -> Result<F, E>,
    R: FnOnce(F) -> FrameDelivery,
{
    if slot.is_spent() {
        tracing::debug!("frame arrived after delivery, ignoring");
        return FrameArrival::Ignored;
    }

    let frame = match next_frame() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("no frame available: {e}");
            return FrameArrival::NoFrame;
        }
    };

    let delivery = read_back(frame);
    let failed = match &delivery {
        Ok(frame) => {
            tracing::debug!(width = frame.width, height = frame.height, "frame read back");
            false
        }
        Err(e) => {
            tracing::error!("error processing frame: {e}");
            true
        }
    };

    match (slot.deliver(delivery), failed) {
        (false, _) => FrameArrival::Undelivered,
        (true, false) => FrameArrival::Delivered,
        (true, true) => FrameArrival::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, x: i32, y: i32, primary: bool) -> MonitorInfo {
        MonitorInfo {
            name: name.to_string(),
            width: 1920,
            height: 1080,
            x,
            y,
            primary,
        }
    }

    #[test]
    fn primary_flag_wins_over_position() {
        let monitors = vec![monitor("left", -1920, 0, false), monitor("main", 1920, 0, true)];
        assert_eq!(primary_monitor(&monitors).unwrap().name, "main");
    }

    #[test]
    fn primary_falls_back_to_origin_monitor() {
        let monitors = vec![monitor("left", -1920, 0, false), monitor("main", 0, 0, false)];
        assert_eq!(primary_monitor(&monitors).unwrap().name, "main");
        assert!(primary_monitor(&[]).is_none());
    }

    #[test]
    fn item_size_rejects_non_positive() {
        assert_eq!(
            ItemSize::from_signed(2560, 1440),
            Some(ItemSize {
                width: 2560,
                height: 1440
            })
        );
        assert_eq!(ItemSize::from_signed(0, 1080), None);
        assert_eq!(ItemSize::from_signed(1920, -1), None);
    }

    #[test]
    fn padded_rows_skip_pitch_bytes() {
        // 2x2 frame, pitch of 12 bytes (4 bytes of padding per row).
        let mut data = vec![0xEE; 12 + 8];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[12..20].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);
        let frame = FrameBuffer::bgra8(data, 2, 2, 12);

        assert!(frame.validate().is_ok());
        let rows: Vec<&[u8]> = frame.rows().collect();
        assert_eq!(rows[0], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rows[1], &[9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn validate_rejects_short_buffers_and_narrow_pitch() {
        let short = FrameBuffer::bgra8(vec![0; 15], 2, 2, 8);
        assert!(short.validate().is_err());

        let narrow = FrameBuffer::bgra8(vec![0; 64], 4, 2, 8);
        assert!(narrow.validate().is_err());

        let empty = FrameBuffer::bgra8(Vec::new(), 0, 0, 0);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn slot_forwards_only_first_delivery() {
        let (slot, mut rx) = frame_channel();
        assert!(!slot.is_spent());

        let first = FrameBuffer::bgra8(vec![0; 4], 1, 1, 4);
        assert!(slot.deliver(Ok(first.clone())));
        assert!(slot.is_spent());
        assert!(!slot.deliver(Err(CaptureError::texture_processing("late"))));

        let received = rx.try_recv().unwrap().unwrap();
        assert_eq!(received, first);
    }

    #[test]
    fn closing_slot_closes_channel() {
        let (slot, mut rx) = frame_channel();
        slot.close();
        assert!(slot.is_spent());
        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));
    }

    #[test]
    fn closing_slot_twice_is_a_no_op() {
        let (slot, mut rx) = frame_channel();
        slot.close();
        slot.close();
        assert!(slot.is_spent());
        assert!(!slot.deliver(Ok(FrameBuffer::bgra8(vec![0; 4], 1, 1, 4))));
        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));
    }

    #[test]
    fn arrival_without_frame_signals_nothing() {
        let (slot, mut rx) = frame_channel();
        let mut read = false;

        let outcome = handle_frame_arrival(
            &slot,
            || Err::<(), _>("TryGetNextFrame returned null"),
            |()| {
                read = true;
                Ok(FrameBuffer::bgra8(vec![0; 4], 1, 1, 4))
            },
        );

        assert_eq!(outcome, FrameArrival::NoFrame);
        assert!(!read);
        assert!(!slot.is_spent());
        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn arrival_after_delivery_is_ignored() {
        let (slot, mut rx) = frame_channel();
        let first = FrameBuffer::bgra8(vec![1, 2, 3, 4], 1, 1, 4);
        let outcome = handle_frame_arrival(&slot, || Ok::<_, String>(()), |()| Ok(first.clone()));
        assert_eq!(outcome, FrameArrival::Delivered);

        let mut pulled = false;
        let outcome = handle_frame_arrival(
            &slot,
            || {
                pulled = true;
                Ok::<_, String>(())
            },
            |()| Ok(FrameBuffer::bgra8(vec![9; 4], 1, 1, 4)),
        );

        assert_eq!(outcome, FrameArrival::Ignored);
        assert!(!pulled);
        assert_eq!(rx.try_recv().unwrap().unwrap(), first);
    }

    #[test]
    fn readback_error_is_delivered_once() {
        let (slot, mut rx) = frame_channel();

        let outcome = handle_frame_arrival(&slot, || Ok::<_, String>(()), |()| {
            Err(CaptureError::texture_processing("Map failed"))
        });
        assert_eq!(outcome, FrameArrival::Failed);

        let again = handle_frame_arrival(&slot, || Ok::<_, String>(()), |()| {
            Err(CaptureError::texture_processing("Map failed again"))
        });
        assert_eq!(again, FrameArrival::Ignored);

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(err.to_string().contains("Map failed"));
        assert!(!err.to_string().contains("again"));
    }

    #[test]
    fn arrival_after_waiter_left_is_undelivered() {
        let (slot, rx) = frame_channel();
        drop(rx);
        let outcome = handle_frame_arrival(&slot, || Ok::<_, String>(()), |()| {
            Ok(FrameBuffer::bgra8(vec![0; 4], 1, 1, 4))
        });
        assert_eq!(outcome, FrameArrival::Undelivered);
    }

    #[test]
    fn monitor_info_serializes() {
        let json = serde_json::to_string(&monitor("main", 0, 0, true)).unwrap();
        let parsed: MonitorInfo = serde_json::from_str(&json).unwrap();
        assert!(parsed.primary);
    }
}
