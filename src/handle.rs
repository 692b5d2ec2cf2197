// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Plain values shared by every layer: window handles, screen rectangles
//! and display resolutions.

use std::fmt;

/// Opaque reference to a native window.
///
/// Handles are borrowed from the OS. They stay valid only while the window
/// exists and nothing here owns or frees them. `NULL` means "not resolved yet"
/// or "no such window".
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub const fn from_raw(raw: isize) -> Self {
        WindowHandle(raw)
    }

    pub const fn raw(self) -> isize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0 as usize)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Screen-space rectangle. Origins can be negative for screens placed left
/// of or above the primary one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Resolution { width, height }
    }

    /// True when either side is below `min`.
    pub const fn is_degenerate(&self, min: u32) -> bool {
        self.width < min || self.height < min
    }

    /// One third of each side, rounded down.
    pub const fn thirds(&self) -> Self {
        Resolution { width: self.width / 3, height: self.height / 3 }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_is_default() {
        assert!(WindowHandle::default().is_null());
        assert!(!WindowHandle::from_raw(0x10).is_null());
        assert_eq!(format!("{}", WindowHandle::from_raw(0x1A2B)), "0x1A2B");
    }

    #[test]
    fn thirds_use_integer_division() {
        assert_eq!(Resolution::new(1920, 1080).thirds(), Resolution::new(640, 360));
        assert_eq!(Resolution::new(1366, 768).thirds(), Resolution::new(455, 256));
    }

    #[test]
    fn degenerate_checks_either_side() {
        assert!(Resolution::new(10, 10).is_degenerate(50));
        assert!(Resolution::new(800, 49).is_degenerate(50));
        assert!(!Resolution::new(50, 50).is_degenerate(50));
    }
}
