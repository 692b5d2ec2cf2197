// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Provisioning of the worker surface, the shell window that sits between
//! the desktop background and the icon layer.

use std::time::Duration;

use tracing::debug;

use crate::config::ShellConfig;
use crate::handle::WindowHandle;
use crate::locator::ShellLocator;
use crate::os::{WindowSystem, MSG_REFRESH_DESKTOP, MSG_SPAWN_WORKER, REFRESH_DESKTOP_WPARAM};

/// Cached shell handles. The worker surface is only a hint: the shell may
/// recreate it at any time, so it is re-checked before every use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellHandles {
    pub desktop_host: WindowHandle,
    pub worker_surface: WindowHandle,
}

#[derive(Debug, Clone)]
pub struct WorkerSurfaceProvisioner {
    locator: ShellLocator,
    icon_view_class: String,
    worker_class: String,
    timeout: Duration,
    handles: ShellHandles,
}

impl WorkerSurfaceProvisioner {
    pub fn new(shell: &ShellConfig, timeout: Duration) -> Self {
        WorkerSurfaceProvisioner {
            locator: ShellLocator::new(shell.host_class.clone())
                .with_shell_class(shell.icon_view_class.clone())
                .with_shell_class(shell.worker_class.clone()),
            icon_view_class: shell.icon_view_class.clone(),
            worker_class: shell.worker_class.clone(),
            timeout,
            handles: ShellHandles::default(),
        }
    }

    pub fn locator(&self) -> &ShellLocator {
        &self.locator
    }

    pub fn handles(&self) -> ShellHandles {
        self.handles
    }

    /// Desktop host, looked up once and kept while it stays alive.
    pub fn shell_host<W: WindowSystem>(&mut self, ws: &W) -> WindowHandle {
        let cached = self.handles.desktop_host;
        if !cached.is_null() && ws.is_window(cached) {
            return cached;
        }
        self.handles.desktop_host = self.locator.find_shell_host(ws);
        self.handles.desktop_host
    }

    /// Asks the shell to spawn the worker surface. A timeout only means the
    /// surface may not exist yet.
    pub fn ensure_worker_surface<W: WindowSystem>(&self, ws: &W, shell_host: WindowHandle) {
        if ws
            .send_message_timeout(shell_host, MSG_SPAWN_WORKER, 0, 0, self.timeout)
            .is_none()
        {
            debug!("provisioner: spawn request to {} timed out after {:?}", shell_host, self.timeout);
        }
    }

    /// The top-level window directly following the first icon host.
    ///
    /// Several worker-class windows can exist; only the one next to the
    /// window holding the icon view sits behind the icons.
    pub fn resolve_worker_surface<W: WindowSystem>(&self, ws: &W) -> WindowHandle {
        let icon_host = ws.top_level_windows().into_iter().find(|top| {
            !ws.find_child(*top, WindowHandle::NULL, Some(&self.icon_view_class), None)
                .is_null()
        });
        match icon_host {
            Some(host) => ws.find_child(WindowHandle::NULL, host, Some(&self.worker_class), None),
            None => WindowHandle::NULL,
        }
    }

    /// Cached worker surface, or a freshly provisioned one. Gives up with
    /// `NULL` after `attempts` spawn-and-resolve rounds.
    pub fn acquire<W: WindowSystem>(&mut self, ws: &W, attempts: u32) -> WindowHandle {
        let cached = self.handles.worker_surface;
        if !cached.is_null() {
            if ws.is_window(cached) {
                return cached;
            }
            debug!("provisioner: worker surface {} is gone, re-resolving", cached);
            self.handles.worker_surface = WindowHandle::NULL;
        }

        let host = self.shell_host(ws);
        if host.is_null() {
            return WindowHandle::NULL;
        }

        for attempt in 1..=attempts.max(1) {
            self.ensure_worker_surface(ws, host);
            let surface = self.resolve_worker_surface(ws);
            if !surface.is_null() {
                debug!("provisioner: worker surface {} (attempt {})", surface, attempt);
                self.handles.worker_surface = surface;
                return surface;
            }
            debug!("provisioner: no worker surface after attempt {}", attempt);
        }
        WindowHandle::NULL
    }

    /// Tells the shell host to redraw the desktop, e.g. after icons moved
    /// while a window was embedded.
    pub fn refresh_desktop<W: WindowSystem>(&mut self, ws: &W) {
        let host = self.shell_host(ws);
        if host.is_null() {
            return;
        }
        if ws
            .send_message_timeout(host, MSG_REFRESH_DESKTOP, REFRESH_DESKTOP_WPARAM, 0, self.timeout)
            .is_none()
        {
            debug!("provisioner: refresh request to {} timed out", host);
        }
    }

    pub fn invalidate(&mut self) {
        self.handles.worker_surface = WindowHandle::NULL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeShell;
    use crate::os::{ICON_VIEW_CLASS, SHELL_HOST_CLASS, WORKER_CLASS};

    fn provisioner() -> WorkerSurfaceProvisioner {
        WorkerSurfaceProvisioner::new(&ShellConfig::default(), Duration::from_millis(1000))
    }

    #[test]
    fn picks_sibling_after_icon_host_not_first_worker() {
        let shell = FakeShell::desktop();
        let decoy = shell.find_window(Some(WORKER_CLASS), None);
        let mut p = provisioner();

        let surface = p.acquire(&shell, 2);

        assert_eq!(surface, shell.worker_surface());
        assert_ne!(surface, decoy);
    }

    #[test]
    fn only_first_icon_host_counts() {
        let shell = FakeShell::desktop();
        let host = shell.find_window(Some(SHELL_HOST_CLASS), None);
        shell.send_message_timeout(host, MSG_SPAWN_WORKER, 0, 0, Duration::ZERO);
        let expected = shell.worker_surface();
        // a second icon host further down with its own worker sibling
        let other = shell.add_top_level("Other", "");
        shell.add_child(other, ICON_VIEW_CLASS, "");
        shell.add_top_level(WORKER_CLASS, "");

        assert_eq!(provisioner().resolve_worker_surface(&shell), expected);
    }

    #[test]
    fn resolve_without_icon_host_is_null() {
        let shell = FakeShell::new();
        shell.add_top_level(WORKER_CLASS, "");
        assert!(provisioner().resolve_worker_surface(&shell).is_null());
    }

    #[test]
    fn second_attempt_succeeds_after_spawn() {
        let shell = FakeShell::desktop();
        shell.spawn_worker_after(2);
        let mut p = provisioner();

        assert!(p.resolve_worker_surface(&shell).is_null());
        let surface = p.acquire(&shell, 2);

        assert!(!surface.is_null());
        assert_eq!(shell.spawn_requests(), 2);
    }

    #[test]
    fn gives_up_when_shell_never_answers() {
        let shell = FakeShell::desktop();
        shell.set_responsive(false);
        let mut p = provisioner();

        assert!(p.acquire(&shell, 3).is_null());
        assert!(p.handles().worker_surface.is_null());
        assert_eq!(shell.messages().len(), 3);
    }

    #[test]
    fn stale_cache_is_re_resolved() {
        let shell = FakeShell::desktop();
        let mut p = provisioner();
        let first = p.acquire(&shell, 1);

        shell.restart_shell();
        let second = p.acquire(&shell, 1);

        assert!(!second.is_null());
        assert_ne!(first, second);
        assert_eq!(p.handles().worker_surface, second);
    }

    #[test]
    fn missing_host_short_circuits() {
        let shell = FakeShell::new();
        let mut p = provisioner();
        assert!(p.acquire(&shell, 2).is_null());
        assert!(shell.messages().is_empty());
    }
}
