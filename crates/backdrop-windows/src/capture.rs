use std::mem;

use backdrop_core::{CaptureSurface, Error, Rect, ScreenCapture, WindowResult};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BitBlt, CreateCompatibleDC, CreateDIBSection,
    DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, ReleaseDC, SRCCOPY, SelectObject,
};

/// Copies screen pixels through GDI.
///
/// Reads whatever is composited on screen at the time, so the child must
/// be on top for the capture to show it. The sync loop only captures
/// when the child is the foreground window.
#[derive(Debug, Clone, Copy, Default)]
pub struct GdiCapture;

/// A top-down 32-bpp DIB header for a `width` x `height` bitmap.
pub(crate) fn bitmap_info(width: i32, height: i32) -> BITMAPINFO {
    BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height, // top-down
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

impl ScreenCapture for GdiCapture {
    fn capture(&self, region: Rect) -> WindowResult<CaptureSurface> {
        if region.is_empty() {
            return Err(Error::Capture("zero-size region".into()));
        }
        let (w, h) = (region.width, region.height);

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(Error::Capture("screen DC unavailable".into()));
            }
            let mem_dc = CreateCompatibleDC(Some(screen_dc));

            let bmi = bitmap_info(w, h);
            let mut bits = std::ptr::null_mut();
            let dib = CreateDIBSection(Some(mem_dc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0);
            let bmp = match dib {
                Ok(bmp) if !bits.is_null() => bmp,
                other => {
                    if let Ok(bmp) = other {
                        let _ = DeleteObject(bmp.into());
                    }
                    let _ = DeleteDC(mem_dc);
                    let _ = ReleaseDC(None, screen_dc);
                    return Err(Error::Capture(format!("no {w}x{h} bitmap")));
                }
            };

            let old = SelectObject(mem_dc, bmp.into());

            let copied = BitBlt(mem_dc, 0, 0, w, h, Some(screen_dc), region.x, region.y, SRCCOPY);
            let result = match copied {
                Ok(()) => {
                    // SAFETY: `bits` is non-null and holds w * h pixels
                    // allocated by CreateDIBSection.
                    let pixels = std::slice::from_raw_parts(bits as *const u32, region.area());
                    Ok(CaptureSurface {
                        width: w,
                        height: h,
                        pixels: pixels.to_vec(),
                    })
                }
                Err(e) => Err(Error::Capture(e.to_string())),
            };

            SelectObject(mem_dc, old);
            let _ = DeleteObject(bmp.into());
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(None, screen_dc);

            result
        }
    }
}
