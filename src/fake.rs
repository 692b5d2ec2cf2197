// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory desktop shell.
//!
//! Models just enough of the shell's window topology to drive the embedding
//! logic without a real desktop: a host window owning the icon view, decoy
//! worker windows, a spawn request that creates the worker surface right
//! after the icon host, and shell restarts that tear it down again.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::display::Display;
use crate::handle::{Rect, Resolution, WindowHandle};
use crate::os::{
    PositionFlags, WindowSystem, ICON_VIEW_CLASS, MSG_SPAWN_WORKER, SHELL_HOST_CLASS, WORKER_CLASS,
};

#[derive(Debug, Clone)]
struct FakeWindow {
    class: String,
    title: String,
    parent: WindowHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub window: WindowHandle,
    pub msg: u32,
    pub wparam: usize,
    pub timeout: Duration,
}

#[derive(Debug)]
struct ShellState {
    next_id: isize,
    windows: BTreeMap<WindowHandle, FakeWindow>,
    z_order: Vec<WindowHandle>,
    active: WindowHandle,
    screens: Vec<Rect>,
    positions: Vec<(WindowHandle, Rect, PositionFlags)>,
    raised: Vec<WindowHandle>,
    messages: Vec<SentMessage>,
    responsive: bool,
    spawn_after: u32,
    spawn_requests: u32,
    worker: WindowHandle,
}

impl ShellState {
    fn create(&mut self, class: &str, title: &str, parent: WindowHandle) -> WindowHandle {
        self.next_id += 0x10;
        let handle = WindowHandle::from_raw(self.next_id);
        self.windows.insert(
            handle,
            FakeWindow { class: class.to_string(), title: title.to_string(), parent },
        );
        handle
    }

    fn children(&self, parent: WindowHandle) -> Vec<WindowHandle> {
        if parent.is_null() {
            return self.z_order.clone();
        }
        self.windows
            .iter()
            .filter(|(_, w)| w.parent == parent)
            .map(|(h, _)| *h)
            .collect()
    }

    fn matches(&self, handle: WindowHandle, class: Option<&str>, title: Option<&str>) -> bool {
        let Some(w) = self.windows.get(&handle) else { return false };
        class.map_or(true, |c| w.class == c) && title.map_or(true, |t| w.title == t)
    }

    fn icon_host(&self) -> Option<WindowHandle> {
        self.z_order.iter().copied().find(|top| {
            self.windows
                .values()
                .any(|w| w.parent == *top && w.class == ICON_VIEW_CLASS)
        })
    }

    fn spawn_worker(&mut self) {
        if !self.worker.is_null() {
            return;
        }
        let Some(host) = self.icon_host() else { return };
        let worker = self.create(WORKER_CLASS, "", WindowHandle::NULL);
        let pos = self.z_order.iter().position(|h| *h == host).map_or(0, |i| i + 1);
        self.z_order.insert(pos, worker);
        self.worker = worker;
    }

    fn destroy(&mut self, handle: WindowHandle) {
        if self.windows.remove(&handle).is_none() {
            return;
        }
        self.z_order.retain(|h| *h != handle);
        // orphaned children surface as top-level windows
        let orphans: Vec<WindowHandle> = self.children(handle);
        for orphan in orphans {
            if let Some(w) = self.windows.get_mut(&orphan) {
                w.parent = WindowHandle::NULL;
            }
            self.z_order.insert(0, orphan);
        }
        if self.worker == handle {
            self.worker = WindowHandle::NULL;
        }
        if self.active == handle {
            self.active = WindowHandle::NULL;
        }
    }
}

/// Fake [`WindowSystem`]. Single-threaded by construction (`RefCell`).
#[derive(Debug)]
pub struct FakeShell {
    state: RefCell<ShellState>,
}

impl Default for FakeShell {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeShell {
    /// Empty desktop with a single 1920x1080 screen.
    pub fn new() -> Self {
        FakeShell {
            state: RefCell::new(ShellState {
                next_id: 0x1000,
                windows: BTreeMap::new(),
                z_order: Vec::new(),
                active: WindowHandle::NULL,
                screens: vec![Rect::new(0, 0, 1920, 1080)],
                positions: Vec::new(),
                raised: Vec::new(),
                messages: Vec::new(),
                responsive: true,
                spawn_after: 1,
                spawn_requests: 0,
                worker: WindowHandle::NULL,
            }),
        }
    }

    /// Shell host owning the icon view, with an idle worker window stacked
    /// above it that must never be picked as the embed target.
    pub fn desktop() -> Self {
        let shell = Self::new();
        shell.add_top_level(WORKER_CLASS, "");
        let host = shell.add_top_level(SHELL_HOST_CLASS, "Program Manager");
        shell.add_child(host, ICON_VIEW_CLASS, "");
        shell
    }

    /// Adds a top-level window at the bottom of the z-order.
    pub fn add_top_level(&self, class: &str, title: &str) -> WindowHandle {
        let mut s = self.state.borrow_mut();
        let handle = s.create(class, title, WindowHandle::NULL);
        s.z_order.push(handle);
        handle
    }

    pub fn add_child(&self, parent: WindowHandle, class: &str, title: &str) -> WindowHandle {
        self.state.borrow_mut().create(class, title, parent)
    }

    pub fn destroy(&self, handle: WindowHandle) {
        self.state.borrow_mut().destroy(handle);
    }

    pub fn set_active(&self, handle: WindowHandle) {
        self.state.borrow_mut().active = handle;
    }

    pub fn set_screens(&self, screens: Vec<Rect>) {
        self.state.borrow_mut().screens = screens;
    }

    /// An unresponsive shell lets every request time out.
    pub fn set_responsive(&self, responsive: bool) {
        self.state.borrow_mut().responsive = responsive;
    }

    /// Number of spawn requests the shell needs before the worker surface appears.
    pub fn spawn_worker_after(&self, requests: u32) {
        self.state.borrow_mut().spawn_after = requests;
    }

    /// Simulates a shell restart: the worker surface is torn down and the
    /// request counter starts over.
    pub fn restart_shell(&self) {
        let mut s = self.state.borrow_mut();
        let worker = s.worker;
        s.destroy(worker);
        s.spawn_requests = 0;
    }

    pub fn worker_surface(&self) -> WindowHandle {
        self.state.borrow().worker
    }

    pub fn spawn_requests(&self) -> u32 {
        self.state.borrow().spawn_requests
    }

    pub fn last_position(&self, handle: WindowHandle) -> Option<(Rect, PositionFlags)> {
        self.state
            .borrow()
            .positions
            .iter()
            .rev()
            .find(|(h, _, _)| *h == handle)
            .map(|(_, r, f)| (*r, *f))
    }

    pub fn raised(&self) -> Vec<WindowHandle> {
        self.state.borrow().raised.clone()
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.state.borrow().messages.clone()
    }
}

impl WindowSystem for FakeShell {
    fn active_window(&self) -> WindowHandle {
        self.state.borrow().active
    }

    fn parent_of(&self, window: WindowHandle) -> WindowHandle {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map_or(WindowHandle::NULL, |w| w.parent)
    }

    fn find_window(&self, class: Option<&str>, title: Option<&str>) -> WindowHandle {
        self.find_child(WindowHandle::NULL, WindowHandle::NULL, class, title)
    }

    fn find_child(
        &self,
        parent: WindowHandle,
        after: WindowHandle,
        class: Option<&str>,
        title: Option<&str>,
    ) -> WindowHandle {
        let s = self.state.borrow();
        let candidates = s.children(parent);
        let start = if after.is_null() {
            0
        } else {
            match candidates.iter().position(|h| *h == after) {
                Some(i) => i + 1,
                None => return WindowHandle::NULL,
            }
        };
        candidates[start..]
            .iter()
            .copied()
            .find(|h| s.matches(*h, class, title))
            .unwrap_or(WindowHandle::NULL)
    }

    fn top_level_windows(&self) -> Vec<WindowHandle> {
        self.state.borrow().z_order.clone()
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        self.state.borrow().windows.contains_key(&window)
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        self.state.borrow().windows.get(&window).map(|w| w.class.clone())
    }

    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) -> bool {
        let mut s = self.state.borrow_mut();
        if !s.windows.contains_key(&child) || (!parent.is_null() && !s.windows.contains_key(&parent)) {
            return false;
        }
        s.z_order.retain(|h| *h != child);
        if parent.is_null() {
            s.z_order.insert(0, child);
        }
        if let Some(w) = s.windows.get_mut(&child) {
            w.parent = parent;
        }
        true
    }

    fn set_position(&self, window: WindowHandle, bounds: Rect, flags: PositionFlags) -> bool {
        let mut s = self.state.borrow_mut();
        if !s.windows.contains_key(&window) {
            return false;
        }
        s.positions.push((window, bounds, flags));
        true
    }

    fn bring_to_top(&self, window: WindowHandle) -> bool {
        let mut s = self.state.borrow_mut();
        if !s.windows.contains_key(&window) {
            return false;
        }
        if let Some(i) = s.z_order.iter().position(|h| *h == window) {
            s.z_order.remove(i);
            s.z_order.insert(0, window);
        }
        s.raised.push(window);
        true
    }

    fn send_message_timeout(
        &self,
        window: WindowHandle,
        msg: u32,
        wparam: usize,
        _lparam: isize,
        timeout: Duration,
    ) -> Option<usize> {
        let mut s = self.state.borrow_mut();
        s.messages.push(SentMessage { window, msg, wparam, timeout });
        if !s.responsive || !s.windows.contains_key(&window) {
            return None;
        }
        if msg == MSG_SPAWN_WORKER && s.matches(window, Some(SHELL_HOST_CLASS), None) {
            s.spawn_requests += 1;
            if s.spawn_requests >= s.spawn_after {
                s.spawn_worker();
            }
        }
        Some(0)
    }

    fn screens(&self) -> Vec<Rect> {
        self.state.borrow().screens.clone()
    }
}

/// Fake [`Display`] recording every applied resolution.
#[derive(Debug, Clone)]
pub struct FakeDisplay {
    fullscreen: bool,
    window: Resolution,
    native: Resolution,
    applied: Vec<(Resolution, bool)>,
}

impl FakeDisplay {
    pub fn windowed(window: Resolution, native: Resolution) -> Self {
        FakeDisplay { fullscreen: false, window, native, applied: Vec::new() }
    }

    pub fn fullscreen(native: Resolution) -> Self {
        FakeDisplay { fullscreen: true, window: native, native, applied: Vec::new() }
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn applied(&self) -> &[(Resolution, bool)] {
        &self.applied
    }
}

impl Display for FakeDisplay {
    fn is_fullscreen(&self, _window: WindowHandle) -> bool {
        self.fullscreen
    }

    fn window_resolution(&self, _window: WindowHandle) -> Resolution {
        self.window
    }

    fn native_resolution(&self, _window: WindowHandle) -> Resolution {
        self.native
    }

    fn set_resolution(&mut self, _window: WindowHandle, resolution: Resolution, fullscreen: bool) {
        self.window = resolution;
        self.fullscreen = fullscreen;
        self.applied.push((resolution, fullscreen));
    }
}
