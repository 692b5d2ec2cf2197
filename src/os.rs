// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Boundary to the OS windowing facilities.
//!
//! Everything above this trait speaks in [`WindowHandle`]s and plain values.
//! Calling conventions, wide strings and enumeration callbacks stay inside the
//! implementations (`win32` on Windows, `fake` under the `testing` feature).
//!
//! None of this is meant for concurrent use. Implementations may keep interior
//! state without synchronisation and callers drive them from one thread.

use std::time::Duration;

use bitflags::bitflags;

use crate::handle::{Rect, WindowHandle};

// ── Shell protocol ──────────────────────────────────
/// Asks the shell host to spawn the surface behind the icons. No-op when it exists.
pub const MSG_SPAWN_WORKER: u32 = 0x052C;
/// Desktop refresh notification sent to the shell host on restore.
pub const MSG_REFRESH_DESKTOP: u32 = 0x0034;
pub const REFRESH_DESKTOP_WPARAM: usize = 4;

pub const SHELL_HOST_CLASS: &str = "Progman";
pub const ICON_VIEW_CLASS: &str = "SHELLDLL_DefView";
pub const WORKER_CLASS: &str = "WorkerW";
pub const TRAY_CLASS: &str = "Shell_TrayWnd";
pub const SECONDARY_TRAY_CLASS: &str = "Shell_SecondaryTrayWnd";
/// Class of the root desktop window.
pub const DESKTOP_ROOT_CLASS: &str = "#32769";

bitflags! {
    /// Window-position flags. Bit values match the native `SWP_*` values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PositionFlags: u32 {
        const NO_SIZE         = 0x0001;
        const NO_MOVE         = 0x0002;
        const NO_ZORDER       = 0x0004;
        const NO_REDRAW       = 0x0008;
        const NO_ACTIVATE     = 0x0010;
        const SHOW_WINDOW     = 0x0040;
        const NO_OWNER_ZORDER = 0x0200;
    }
}

pub trait WindowSystem {
    /// Currently focused top-level window, or `NULL`.
    fn active_window(&self) -> WindowHandle;

    /// Parent of `window`; `NULL` for top-level windows.
    fn parent_of(&self, window: WindowHandle) -> WindowHandle;

    /// First top-level window matching class and title. `None` matches anything.
    fn find_window(&self, class: Option<&str>, title: Option<&str>) -> WindowHandle;

    /// Next child of `parent` after `after` matching class and title.
    ///
    /// A `NULL` parent searches top-level windows, so passing a top-level
    /// window as `after` yields its next matching sibling in z-order.
    fn find_child(
        &self,
        parent: WindowHandle,
        after: WindowHandle,
        class: Option<&str>,
        title: Option<&str>,
    ) -> WindowHandle;

    /// Every top-level window in enumeration (z-) order.
    fn top_level_windows(&self) -> Vec<WindowHandle>;

    fn is_window(&self, window: WindowHandle) -> bool;

    /// Window class name; `None` when `window` is gone.
    fn class_name(&self, window: WindowHandle) -> Option<String>;

    /// Re-parents `child`. A `NULL` parent makes it top-level again.
    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) -> bool;

    fn set_position(&self, window: WindowHandle, bounds: Rect, flags: PositionFlags) -> bool;

    /// Raises `window` to the top of the z-order without focusing it.
    fn bring_to_top(&self, window: WindowHandle) -> bool;

    /// Sends a message and waits at most `timeout` for the reply.
    /// `None` when the window did not answer in time or the call failed.
    fn send_message_timeout(
        &self,
        window: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
        timeout: Duration,
    ) -> Option<usize>;

    /// Bounds of every physical screen, primary first as the OS reports them.
    fn screens(&self) -> Vec<Rect>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_flags_match_native_bits() {
        let flags = PositionFlags::NO_ZORDER | PositionFlags::NO_OWNER_ZORDER | PositionFlags::NO_ACTIVATE;
        assert_eq!(flags.bits(), 0x0214);
    }
}
