//! Capture item for the primary monitor.

use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::ItemSize;
use windows::Graphics::Capture::GraphicsCaptureItem;
use windows::Win32::Foundation::POINT;
use windows::Win32::Graphics::Gdi::{MonitorFromPoint, MONITOR_DEFAULTTOPRIMARY};
use windows::Win32::System::WinRT::Graphics::Capture::IGraphicsCaptureItemInterop;

use crate::WinResultExt;

/// The primary monitor as a capturable item, with the size it reported at
/// resolution time.
#[derive(Clone)]
pub struct PrimaryItem {
    item: GraphicsCaptureItem,
    size: ItemSize,
}

impl PrimaryItem {
    /// Resolve the primary monitor. The virtual desktop origin always lies
    /// on the primary monitor.
    pub fn resolve() -> CaptureResult<Self> {
        let monitor = unsafe { MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY) };
        if monitor.is_invalid() {
            return Err(CaptureError::capture_item("no primary monitor handle"));
        }

        let interop = windows::core::factory::<GraphicsCaptureItem, IGraphicsCaptureItemInterop>()
            .stage(CaptureError::capture_item, "IGraphicsCaptureItemInterop factory")?;
        let item: GraphicsCaptureItem = unsafe { interop.CreateForMonitor(monitor) }
            .stage(CaptureError::capture_item, "CreateForMonitor")?;

        let raw = item
            .Size()
            .stage(CaptureError::capture_item, "GraphicsCaptureItem::Size")?;
        let size = ItemSize::from_signed(raw.Width, raw.Height).ok_or_else(|| {
            CaptureError::capture_item(format!(
                "primary monitor reported size {}x{}",
                raw.Width, raw.Height
            ))
        })?;

        tracing::info!(
            width = size.width,
            height = size.height,
            "capture item created for primary monitor"
        );
        Ok(Self { item, size })
    }

    pub fn item(&self) -> &GraphicsCaptureItem {
        &self.item
    }

    pub fn size(&self) -> ItemSize {
        self.size
    }
}
