//! Hardware Direct3D 11 device and its WinRT wrapper.

use primeshot_common::error::{CaptureError, CaptureResult};
use windows::core::Interface;
use windows::Graphics::DirectX::Direct3D11::IDirect3DDevice;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::{
    D3D_DRIVER_TYPE_HARDWARE, D3D_FEATURE_LEVEL, D3D_FEATURE_LEVEL_10_0, D3D_FEATURE_LEVEL_10_1,
    D3D_FEATURE_LEVEL_11_0, D3D_FEATURE_LEVEL_11_1, D3D_FEATURE_LEVEL_9_1, D3D_FEATURE_LEVEL_9_2,
    D3D_FEATURE_LEVEL_9_3,
};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_SDK_VERSION,
};
use windows::Win32::Graphics::Dxgi::IDXGIDevice;
use windows::Win32::System::WinRT::Direct3D11::CreateDirect3D11DeviceFromDXGIDevice;
use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_MULTITHREADED};

use crate::WinResultExt;

const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 7] = [
    D3D_FEATURE_LEVEL_11_1,
    D3D_FEATURE_LEVEL_11_0,
    D3D_FEATURE_LEVEL_10_1,
    D3D_FEATURE_LEVEL_10_0,
    D3D_FEATURE_LEVEL_9_3,
    D3D_FEATURE_LEVEL_9_2,
    D3D_FEATURE_LEVEL_9_1,
];

/// A D3D11 device usable for texture work and for registration with the
/// capture subsystem.
#[derive(Clone)]
pub struct CaptureDevice {
    d3d: ID3D11Device,
    winrt: IDirect3DDevice,
}

// D3D11 devices are free-threaded; the immediate context is only touched
// from the frame handler, which runs once per session.
unsafe impl Send for CaptureDevice {}
unsafe impl Sync for CaptureDevice {}

impl CaptureDevice {
    /// Create a hardware device with BGRA support. No software fallback.
    pub fn create() -> CaptureResult<Self> {
        init_winrt();

        let mut device: Option<ID3D11Device> = None;
        unsafe {
            D3D11CreateDevice(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                HMODULE::default(),
                D3D11_CREATE_DEVICE_BGRA_SUPPORT,
                Some(&FEATURE_LEVELS),
                D3D11_SDK_VERSION,
                Some(&mut device),
                None,
                None,
            )
            .stage(CaptureError::initialization, "D3D11CreateDevice")?;
        }
        let d3d = device.ok_or_else(|| {
            CaptureError::initialization("D3D11CreateDevice returned no device")
        })?;

        let dxgi: IDXGIDevice = d3d
            .cast()
            .stage(CaptureError::initialization, "cast ID3D11Device to IDXGIDevice")?;
        let winrt = unsafe { CreateDirect3D11DeviceFromDXGIDevice(&dxgi) }
            .stage(CaptureError::initialization, "CreateDirect3D11DeviceFromDXGIDevice")?
            .cast::<IDirect3DDevice>()
            .stage(CaptureError::initialization, "cast to IDirect3DDevice")?;

        tracing::debug!("created hardware D3D11 device");
        Ok(Self { d3d, winrt })
    }

    pub fn d3d(&self) -> &ID3D11Device {
        &self.d3d
    }

    pub fn winrt(&self) -> &IDirect3DDevice {
        &self.winrt
    }
}

/// Initialise the WinRT runtime on this thread. Already-initialised threads
/// (in any apartment) are fine.
fn init_winrt() {
    if let Err(e) = unsafe { RoInitialize(RO_INIT_MULTITHREADED) } {
        tracing::debug!("RoInitialize: {e} (continuing with the existing apartment)");
    }
}
