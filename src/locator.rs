// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lookups for the well-known shell windows. Every call is a fresh query.

use tracing::debug;

use crate::handle::WindowHandle;
use crate::os::{WindowSystem, DESKTOP_ROOT_CLASS, SECONDARY_TRAY_CLASS, TRAY_CLASS};

#[derive(Debug, Clone)]
pub struct ShellLocator {
    host_class: String,
    /// Classes that belong to the shell itself and are never a target.
    shell_classes: Vec<String>,
}

impl ShellLocator {
    pub fn new(host_class: impl Into<String>) -> Self {
        let host_class = host_class.into();
        let shell_classes = [host_class.as_str(), TRAY_CLASS, SECONDARY_TRAY_CLASS, DESKTOP_ROOT_CLASS]
            .iter()
            .map(|c| c.to_string())
            .collect();
        ShellLocator { host_class, shell_classes }
    }

    pub fn with_shell_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.shell_classes.contains(&class) {
            self.shell_classes.push(class);
        }
        self
    }

    /// True for the desktop host, icon view, worker surfaces and taskbars.
    pub fn is_shell_window<W: WindowSystem>(&self, ws: &W, window: WindowHandle) -> bool {
        ws.class_name(window)
            .map_or(false, |class| self.shell_classes.iter().any(|c| *c == class))
    }

    /// The desktop host window, `NULL` while the shell is still starting.
    pub fn find_shell_host<W: WindowSystem>(&self, ws: &W) -> WindowHandle {
        let host = ws.find_window(Some(&self.host_class), None);
        if host.is_null() {
            debug!("locator: no '{}' window yet", self.host_class);
        }
        host
    }

    pub fn find_active_window<W: WindowSystem>(&self, ws: &W) -> WindowHandle {
        ws.active_window()
    }

    pub fn find_parent_of<W: WindowSystem>(&self, ws: &W, window: WindowHandle) -> WindowHandle {
        ws.parent_of(window)
    }
}
