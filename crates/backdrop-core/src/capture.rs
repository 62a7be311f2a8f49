//! Screenshot fallback for when the child rises above the host.

use crate::window::WindowQuery;
use crate::{Error, Rect, WindowResult};

/// An in-memory 32-bit bitmap (BGRA, top-down rows).
#[derive(Clone, PartialEq, Eq)]
pub struct CaptureSurface {
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u32>,
}

impl CaptureSurface {
    /// Allocates a zeroed surface covering `rect`.
    pub fn blank(rect: Rect) -> Self {
        Self {
            width: rect.width.max(0),
            height: rect.height.max(0),
            pixels: vec![0; rect.area()],
        }
    }

    /// Whether the surface has the dimensions of `rect` and a full buffer.
    pub fn matches(&self, rect: &Rect) -> bool {
        !rect.is_empty()
            && self.width == rect.width
            && self.height == rect.height
            && self.pixels.len() == rect.area()
    }
}

// Pixel buffers are large; keep Debug output to the dimensions.
impl std::fmt::Debug for CaptureSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Copies a region of the screen into a fresh surface.
pub trait ScreenCapture: Send + Sync {
    fn capture(&self, region: Rect) -> WindowResult<CaptureSurface>;
}

/// Captures the screen region currently occupied by `hwnd`.
///
/// The rect is read again rather than reused from earlier in the tick,
/// since the child may have moved. A zero-size region or a surface that
/// doesn't match the region is reported as [`Error::Capture`], which
/// callers swallow so the previous background stays in place.
pub fn capture_child(
    query: &dyn WindowQuery,
    capture: &dyn ScreenCapture,
    hwnd: usize,
) -> WindowResult<CaptureSurface> {
    let rect = query.window_rect(hwnd)?;
    if rect.is_empty() {
        return Err(Error::Capture("zero-size region".into()));
    }

    let surface = capture.capture(rect)?;
    if !surface.matches(&rect) {
        return Err(Error::Capture(format!(
            "got {}x{} surface for {}x{} region",
            surface.width, surface.height, rect.width, rect.height
        )));
    }
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCapture, FakeWindows};

    #[test]
    fn captures_surface_sized_to_child() {
        // Arrange
        let rect = Rect::new(200, 100, 320, 240);
        let windows = FakeWindows::with_child(0x42, rect);
        let capture = FakeCapture::default();

        // Act
        let surface = capture_child(&windows, &capture, 0x42).unwrap();

        // Assert
        assert_eq!((surface.width, surface.height), (320, 240));
        assert_eq!(surface.pixels.len(), 320 * 240);
        assert_eq!(capture.regions(), vec![rect]);
    }

    #[test]
    fn empty_rect_is_a_capture_error() {
        let windows = FakeWindows::with_child(0x42, Rect::default());
        let capture = FakeCapture::default();

        let err = capture_child(&windows, &capture, 0x42).unwrap_err();

        assert!(matches!(err, Error::Capture(_)));
        assert!(capture.regions().is_empty());
    }

    #[test]
    fn mismatched_surface_is_rejected() {
        let windows = FakeWindows::with_child(0x42, Rect::new(0, 0, 100, 100));
        let capture = FakeCapture::returning_size(0, 0);

        let err = capture_child(&windows, &capture, 0x42).unwrap_err();

        assert!(err.is_recoverable());
    }

    #[test]
    fn destroyed_window_propagates_query_error() {
        let windows = FakeWindows::default();
        let capture = FakeCapture::default();

        let err = capture_child(&windows, &capture, 0x42).unwrap_err();

        assert!(matches!(err, Error::WindowQuery { hwnd: 0x42, .. }));
    }

    #[test]
    fn blank_surface_matches_its_rect() {
        let rect = Rect::new(5, 5, 3, 2);
        let surface = CaptureSurface::blank(rect);
        assert!(surface.matches(&rect));
        assert!(!surface.matches(&Rect::new(5, 5, 2, 3)));
    }
}
