// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Windows binding: the shell's `Progman`/`WorkerW` layering via user32.

use std::ffi::c_void;
use std::mem;
use std::time::Duration;

use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, MonitorFromWindow, HDC, HMONITOR, MONITORINFO,
    MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::display::Display;
use crate::handle::{Rect, Resolution, WindowHandle};
use crate::os::{PositionFlags, WindowSystem};

fn hwnd(h: WindowHandle) -> HWND {
    HWND(h.raw() as *mut c_void)
}

fn handle(h: HWND) -> WindowHandle {
    WindowHandle::from_raw(h.0 as isize)
}

fn rect(rc: &RECT) -> Rect {
    Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top)
}

/// Null-terminated UTF-16 copy of an optional string; `None` becomes a null pointer.
struct Wide(Option<Vec<u16>>);

impl Wide {
    fn new(s: Option<&str>) -> Self {
        Wide(s.map(|s| s.encode_utf16().chain(Some(0)).collect()))
    }

    fn pcwstr(&self) -> PCWSTR {
        self.0.as_ref().map_or(PCWSTR::null(), |v| PCWSTR(v.as_ptr()))
    }
}

unsafe extern "system" fn enum_windows_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let vec = &mut *(lparam.0 as *mut Vec<isize>);
    vec.push(hwnd.0 as isize);
    TRUE
}

unsafe extern "system" fn enum_monitors_cb(_: HMONITOR, _: HDC, rc: *mut RECT, lparam: LPARAM) -> BOOL {
    let screens = &mut *(lparam.0 as *mut Vec<Rect>);
    if let Some(rc) = rc.as_ref() {
        screens.push(rect(rc));
    }
    TRUE
}

/// The live desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Shell;

impl WindowSystem for Win32Shell {
    fn active_window(&self) -> WindowHandle {
        handle(unsafe { GetForegroundWindow() })
    }

    fn parent_of(&self, window: WindowHandle) -> WindowHandle {
        unsafe { GetParent(hwnd(window)) }.map(handle).unwrap_or_default()
    }

    fn find_window(&self, class: Option<&str>, title: Option<&str>) -> WindowHandle {
        let (class, title) = (Wide::new(class), Wide::new(title));
        unsafe { FindWindowW(class.pcwstr(), title.pcwstr()) }
            .map(handle)
            .unwrap_or_default()
    }

    fn find_child(
        &self,
        parent: WindowHandle,
        after: WindowHandle,
        class: Option<&str>,
        title: Option<&str>,
    ) -> WindowHandle {
        let (class, title) = (Wide::new(class), Wide::new(title));
        unsafe { FindWindowExW(hwnd(parent), hwnd(after), class.pcwstr(), title.pcwstr()) }
            .map(handle)
            .unwrap_or_default()
    }

    fn top_level_windows(&self) -> Vec<WindowHandle> {
        let mut raw: Vec<isize> = Vec::new();
        unsafe {
            let _ = EnumWindows(Some(enum_windows_cb), LPARAM(&mut raw as *mut Vec<isize> as isize));
        }
        raw.into_iter().map(WindowHandle::from_raw).collect()
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        !window.is_null() && unsafe { IsWindow(hwnd(window)) }.as_bool()
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        let mut buf = [0u16; 256];
        let len = unsafe { GetClassNameW(hwnd(window), &mut buf) };
        (len > 0).then(|| String::from_utf16_lossy(&buf[..len as usize]))
    }

    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) -> bool {
        unsafe { SetParent(hwnd(child), hwnd(parent)) }.is_ok()
    }

    fn set_position(&self, window: WindowHandle, bounds: Rect, flags: PositionFlags) -> bool {
        unsafe {
            SetWindowPos(
                hwnd(window),
                HWND::default(),
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                SET_WINDOW_POS_FLAGS(flags.bits()),
            )
        }
        .is_ok()
    }

    fn bring_to_top(&self, window: WindowHandle) -> bool {
        unsafe { BringWindowToTop(hwnd(window)) }.is_ok()
    }

    fn send_message_timeout(
        &self,
        window: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
        timeout: Duration,
    ) -> Option<usize> {
        let mut result: usize = 0;
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let rc = unsafe {
            SendMessageTimeoutW(
                hwnd(window),
                msg,
                WPARAM(wparam),
                LPARAM(lparam),
                SMTO_NORMAL,
                millis,
                Some(&mut result as *mut usize),
            )
        };
        (rc.0 != 0).then_some(result)
    }

    fn screens(&self) -> Vec<Rect> {
        let mut screens: Vec<Rect> = Vec::new();
        unsafe {
            let _ = EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(enum_monitors_cb),
                LPARAM(&mut screens as *mut Vec<Rect> as isize),
            );
        }
        screens
    }
}

/// Display control over the target window and the monitor nearest to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Display;

impl Win32Display {
    fn monitor_rect(window: WindowHandle) -> Rect {
        unsafe {
            let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
            let mut info = MONITORINFO { cbSize: mem::size_of::<MONITORINFO>() as u32, ..Default::default() };
            if GetMonitorInfoW(monitor, &mut info).as_bool() {
                rect(&info.rcMonitor)
            } else {
                Rect::default()
            }
        }
    }

    fn window_rect(window: WindowHandle) -> Rect {
        let mut rc = RECT::default();
        let _ = unsafe { GetWindowRect(hwnd(window), &mut rc) };
        rect(&rc)
    }
}

impl Display for Win32Display {
    fn is_fullscreen(&self, window: WindowHandle) -> bool {
        let monitor = Self::monitor_rect(window);
        monitor.width > 0 && Self::window_rect(window) == monitor
    }

    fn window_resolution(&self, window: WindowHandle) -> Resolution {
        let rc = Self::window_rect(window);
        Resolution::new(rc.width.max(0) as u32, rc.height.max(0) as u32)
    }

    fn native_resolution(&self, window: WindowHandle) -> Resolution {
        let rc = Self::monitor_rect(window);
        Resolution::new(rc.width.max(0) as u32, rc.height.max(0) as u32)
    }

    fn set_resolution(&mut self, window: WindowHandle, resolution: Resolution, fullscreen: bool) {
        let monitor = Self::monitor_rect(window);
        let (w, h) = (resolution.width as i32, resolution.height as i32);
        let (x, y) = if fullscreen {
            (monitor.x, monitor.y)
        } else {
            (monitor.x + (monitor.width - w) / 2, monitor.y + (monitor.height - h) / 2)
        };
        let flags = PositionFlags::NO_ZORDER | PositionFlags::NO_ACTIVATE;
        Win32Shell.set_position(window, Rect::new(x, y, w, h), flags);
    }
}
