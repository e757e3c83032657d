//! GPU to CPU texture readback for a delivered frame.

use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::FrameBuffer;
use windows::core::Interface;
use windows::Graphics::Capture::Direct3D11CaptureFrame;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11Device, ID3D11DeviceContext, ID3D11Texture2D, D3D11_CPU_ACCESS_READ,
    D3D11_MAPPED_SUBRESOURCE, D3D11_MAP_READ, D3D11_TEXTURE2D_DESC, D3D11_USAGE_STAGING,
};
use windows::Win32::System::WinRT::Direct3D11::IDirect3DDxgiInterfaceAccess;

use crate::WinResultExt;

/// Copy a captured frame out of GPU memory.
///
/// The frame's surface is blitted into a CPU-readable staging texture of the
/// same size and format, mapped, and copied row-pitch by height.
pub fn read_frame(device: &ID3D11Device, frame: &Direct3D11CaptureFrame) -> CaptureResult<FrameBuffer> {
    let surface = frame
        .Surface()
        .stage(CaptureError::texture_processing, "Direct3D11CaptureFrame::Surface")?;
    let access: IDirect3DDxgiInterfaceAccess = surface
        .cast()
        .stage(CaptureError::texture_processing, "cast to IDirect3DDxgiInterfaceAccess")?;
    let texture: ID3D11Texture2D = unsafe { access.GetInterface() }
        .stage(CaptureError::texture_processing, "IDirect3DDxgiInterfaceAccess::GetInterface")?;

    let mut desc = D3D11_TEXTURE2D_DESC::default();
    unsafe { texture.GetDesc(&mut desc) };
    tracing::debug!(width = desc.Width, height = desc.Height, "frame texture");

    let staging = create_staging_texture(device, &desc)?;

    let mut context: Option<ID3D11DeviceContext> = None;
    unsafe { device.GetImmediateContext(&mut context) };
    let context = context
        .ok_or_else(|| CaptureError::texture_processing("device has no immediate context"))?;

    unsafe { context.CopyResource(&staging, &texture) };

    let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
    unsafe { context.Map(&staging, 0, D3D11_MAP_READ, 0, Some(&mut mapped)) }
        .stage(CaptureError::texture_processing, "ID3D11DeviceContext::Map")?;

    let stride = mapped.RowPitch as usize;
    let len = stride * desc.Height as usize;
    let data = if mapped.pData.is_null() {
        None
    } else {
        let bytes = unsafe { std::slice::from_raw_parts(mapped.pData as *const u8, len) };
        Some(bytes.to_vec())
    };
    unsafe { context.Unmap(&staging, 0) };

    let data = data.ok_or_else(|| CaptureError::texture_processing("mapped texture has no data"))?;
    Ok(FrameBuffer::bgra8(data, desc.Width, desc.Height, stride))
}

fn create_staging_texture(
    device: &ID3D11Device,
    source: &D3D11_TEXTURE2D_DESC,
) -> CaptureResult<ID3D11Texture2D> {
    let desc = D3D11_TEXTURE2D_DESC {
        Usage: D3D11_USAGE_STAGING,
        CPUAccessFlags: D3D11_CPU_ACCESS_READ.0 as u32,
        BindFlags: 0,
        MiscFlags: 0,
        ..*source
    };

    let mut staging: Option<ID3D11Texture2D> = None;
    unsafe { device.CreateTexture2D(&desc, None, Some(&mut staging)) }
        .stage(CaptureError::texture_processing, "CreateTexture2D (staging)")?;
    staging.ok_or_else(|| CaptureError::texture_processing("CreateTexture2D returned no texture"))
}
