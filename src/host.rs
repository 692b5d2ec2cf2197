// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Windows tray host: a hidden window whose timer drives the session.

use std::cell::RefCell;
use std::mem;
use std::time::Instant;

use anyhow::{Context, Result};
use backdrop::win32::{Win32Display, Win32Shell};
use backdrop::{Config, ModeSchedule, ScheduledAction, SessionController, WindowHandle};
use tracing::{debug, info};
use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::*;

const TICK_TIMER: usize = 1;
const WM_TRAYICON: u32 = WM_APP + 50;
const TRAY_ID: u32 = 1;
const IDM_TOGGLE: u16 = 1001;
const IDM_EXIT: u16 = 1002;
const TRAY_TIP: &str = "Backdrop";

struct Host {
    controller: SessionController<Win32Shell, Win32Display>,
    schedule: ModeSchedule,
    started: Instant,
}

impl Host {
    fn on_tick(&mut self) {
        self.controller.tick();
        for action in self.schedule.due(self.started.elapsed()) {
            info!("schedule: {:?}", action);
            match action {
                ScheduledAction::EnterBackground => self.controller.enter_background_mode(),
                ScheduledAction::ExitBackground => self.controller.exit_background_mode(),
            }
        }
    }
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
}

/// Runs `f` on the host unless a call is already in flight. Sent messages can
/// re-enter the window procedure while the shell is being waited on.
fn with_host<R>(f: impl FnOnce(&mut Host) -> R) -> Option<R> {
    HOST.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            debug!("host: busy, message skipped");
            None
        }
    })
}

fn is_background() -> bool {
    with_host(|h| h.controller.is_background()).unwrap_or(false)
}

// ── System Tray Icon ─────────────────────────────────

unsafe fn add_tray_icon(hwnd: HWND) {
    let mut nid: NOTIFYICONDATAW = mem::zeroed();
    nid.cbSize = mem::size_of::<NOTIFYICONDATAW>() as u32;
    nid.hWnd = hwnd;
    nid.uID = TRAY_ID;
    nid.uFlags = NIF_MESSAGE | NIF_ICON | NIF_TIP;
    nid.uCallbackMessage = WM_TRAYICON;
    nid.hIcon = LoadIconW(HINSTANCE::default(), IDI_APPLICATION).unwrap_or_default();
    let tip: Vec<u16> = TRAY_TIP.encode_utf16().chain(Some(0)).collect();
    let copy_len = tip.len().min(nid.szTip.len());
    nid.szTip[..copy_len].copy_from_slice(&tip[..copy_len]);
    let _ = Shell_NotifyIconW(NIM_ADD, &nid);
    debug!("tray icon added");
}

unsafe fn remove_tray_icon(hwnd: HWND) {
    let mut nid: NOTIFYICONDATAW = mem::zeroed();
    nid.cbSize = mem::size_of::<NOTIFYICONDATAW>() as u32;
    nid.hWnd = hwnd;
    nid.uID = TRAY_ID;
    let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
}

unsafe fn show_tray_menu(hwnd: HWND) {
    let Ok(menu) = CreatePopupMenu() else { return };
    let toggle_label = if is_background() { "Bring to front\0" } else { "Send to background\0" };
    let toggle_wide: Vec<u16> = toggle_label.encode_utf16().collect();
    let exit_wide: Vec<u16> = "Exit Backdrop\0".encode_utf16().collect();
    let sep_wide: Vec<u16> = "\0".encode_utf16().collect();

    let _ = InsertMenuW(menu, 0, MF_STRING, IDM_TOGGLE as usize, PCWSTR(toggle_wide.as_ptr()));
    let _ = InsertMenuW(menu, 1, MF_SEPARATOR, 0, PCWSTR(sep_wide.as_ptr()));
    let _ = InsertMenuW(menu, 2, MF_STRING, IDM_EXIT as usize, PCWSTR(exit_wide.as_ptr()));

    // menu only dismisses properly when the owner is foreground
    let _ = SetForegroundWindow(hwnd);
    let mut pt = POINT::default();
    let _ = GetCursorPos(&mut pt);
    let _ = TrackPopupMenu(menu, TPM_LEFTALIGN | TPM_BOTTOMALIGN, pt.x, pt.y, 0, hwnd, None);
    let _ = DestroyMenu(menu);
}

// ── Window Procedure ────────────────────────────────

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wp: WPARAM, lp: LPARAM) -> LRESULT {
    match msg {
        WM_TIMER => {
            if wp.0 == TICK_TIMER {
                with_host(Host::on_tick);
            }
            LRESULT(0)
        }

        x if x == WM_TRAYICON => {
            match (lp.0 & 0xFFFF) as u32 {
                WM_LBUTTONDBLCLK => {
                    with_host(|h| h.controller.toggle_background_mode());
                }
                WM_RBUTTONUP => show_tray_menu(hwnd),
                _ => {}
            }
            LRESULT(0)
        }

        WM_COMMAND => {
            match (wp.0 & 0xFFFF) as u16 {
                IDM_TOGGLE => {
                    with_host(|h| h.controller.toggle_background_mode());
                }
                IDM_EXIT => {
                    info!("tray: exit requested");
                    let _ = PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0));
                }
                _ => {}
            }
            LRESULT(0)
        }

        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            let _ = KillTimer(hwnd, TICK_TIMER);
            // leave the target window usable once we are gone
            with_host(|h| h.controller.exit_background_mode());
            remove_tray_icon(hwnd);
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wp, lp),
    }
}

pub fn run(config: Config) -> Result<()> {
    let class = w!("Backdrop");

    // ── Single-Instance Guard ────────────────────────────────────────
    if let Ok(existing) = unsafe { FindWindowW(class, None) } {
        if existing != HWND::default() {
            info!("Backdrop is already running, exiting");
            return Ok(());
        }
    }

    let controller = SessionController::new(Win32Shell, Win32Display, &config);
    HOST.with(|cell| {
        *cell.borrow_mut() = Some(Host {
            controller,
            schedule: ModeSchedule::from(&config.schedule),
            started: Instant::now(),
        });
    });

    unsafe {
        let inst = GetModuleHandleW(None).context("GetModuleHandleW failed")?;
        let hinst: HINSTANCE = inst.into();
        let wc = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wndproc),
            hInstance: hinst,
            lpszClassName: class,
            ..Default::default()
        };
        RegisterClassExW(&wc);

        let hwnd = CreateWindowExW(
            WS_EX_TOOLWINDOW,
            class, w!("Backdrop"),
            WS_POPUP,
            0, 0, 0, 0,
            HWND::default(), HMENU::default(), hinst, None,
        )
        .context("creating the host window")?;
        debug!("host window created: 0x{:X}", hwnd.0 as usize);
        let own = WindowHandle::from_raw(hwnd.0 as isize);
        with_host(|h| h.controller.ignore_window(own));

        add_tray_icon(hwnd);
        let _ = SetTimer(hwnd, TICK_TIMER, config.host.tick_ms, None);
        info!("host: ticking every {} ms", config.host.tick_ms);

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).into() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    HOST.with(|cell| cell.borrow_mut().take());
    info!("=== Backdrop EXIT ===");
    Ok(())
}
