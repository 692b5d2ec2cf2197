// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fullscreen/windowed switching around the background transitions.

use tracing::{debug, info};

use crate::handle::{Resolution, WindowHandle};

/// Smallest windowed side considered usable.
pub const MIN_WINDOWED_SIDE: u32 = 50;

/// Display-mode control for the target window.
pub trait Display {
    fn is_fullscreen(&self, window: WindowHandle) -> bool;
    /// Current size of the window.
    fn window_resolution(&self, window: WindowHandle) -> Resolution;
    /// Native resolution of the display the window lives on.
    fn native_resolution(&self, window: WindowHandle) -> Resolution;
    fn set_resolution(&mut self, window: WindowHandle, resolution: Resolution, fullscreen: bool);
}

#[derive(Debug, Default)]
pub struct DisplaySwitch {
    last_windowed: Resolution,
}

impl DisplaySwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_windowed(&self) -> Resolution {
        self.last_windowed
    }

    pub fn remember_windowed<D: Display>(&mut self, display: &D, window: WindowHandle) {
        if !display.is_fullscreen(window) {
            self.last_windowed = display.window_resolution(window);
        }
    }

    pub fn to_fullscreen<D: Display>(&mut self, display: &mut D, window: WindowHandle) {
        if display.is_fullscreen(window) {
            return;
        }
        self.last_windowed = display.window_resolution(window);
        let native = display.native_resolution(window);
        info!("display: fullscreen at {} (windowed was {})", native, self.last_windowed);
        display.set_resolution(window, native, true);
    }

    pub fn to_windowed<D: Display>(&mut self, display: &mut D, window: WindowHandle) {
        if !display.is_fullscreen(window) {
            return;
        }
        let native = display.native_resolution(window);
        let restored = windowed_fallback(self.last_windowed, native);
        info!("display: windowed at {}", restored);
        display.set_resolution(window, restored, false);
    }

    /// Hook run before embedding. Only the windowed size is recorded; forcing
    /// fullscreen while in the background is switched off.
    pub fn on_enter_background<D: Display>(&mut self, display: &D, window: WindowHandle, fullscreen: bool) {
        self.remember_windowed(display, window);
        if fullscreen {
            debug!("display: background fullscreen requested, switch is disabled");
        }
    }

    pub fn on_exit_background<D: Display>(&mut self, display: &mut D, window: WindowHandle, fullscreen: bool) {
        if fullscreen {
            self.to_fullscreen(display, window);
        } else {
            self.to_windowed(display, window);
        }
    }
}

/// The recorded size, or a third of `native` when the recorded one is unusable.
pub fn windowed_fallback(recorded: Resolution, native: Resolution) -> Resolution {
    if recorded.is_degenerate(MIN_WINDOWED_SIDE) {
        native.thirds()
    } else {
        recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeDisplay;

    const W: WindowHandle = WindowHandle::from_raw(7);

    #[test]
    fn degenerate_size_falls_back_to_a_third() {
        let native = Resolution::new(1920, 1080);
        assert_eq!(windowed_fallback(Resolution::new(10, 10), native), Resolution::new(640, 360));
        assert_eq!(windowed_fallback(Resolution::new(1280, 720), native), Resolution::new(1280, 720));
    }

    #[test]
    fn fullscreen_round_trip_restores_window_size() {
        let mut display = FakeDisplay::windowed(Resolution::new(1280, 720), Resolution::new(1920, 1080));
        let mut switch = DisplaySwitch::new();

        switch.to_fullscreen(&mut display, W);
        assert!(display.is_fullscreen(W));
        switch.to_windowed(&mut display, W);

        assert_eq!(
            display.applied(),
            &[(Resolution::new(1920, 1080), true), (Resolution::new(1280, 720), false)]
        );
    }

    #[test]
    fn windowed_is_noop_when_not_fullscreen() {
        let mut display = FakeDisplay::windowed(Resolution::new(800, 600), Resolution::new(1920, 1080));
        let mut switch = DisplaySwitch::new();
        switch.to_windowed(&mut display, W);
        assert!(display.applied().is_empty());
    }

    #[test]
    fn background_hook_never_changes_the_display() {
        let display = FakeDisplay::windowed(Resolution::new(800, 600), Resolution::new(1920, 1080));
        let mut switch = DisplaySwitch::new();
        switch.on_enter_background(&display, W, true);
        assert!(display.applied().is_empty());
        assert_eq!(switch.last_windowed(), Resolution::new(800, 600));
    }
}
