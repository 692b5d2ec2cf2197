// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The embedding session: the host application's view of the subsystem.
//!
//! A [`SessionController`] owns the OS binding, the display binding and all
//! cached state. The host calls [`SessionController::tick`] periodically and
//! the two mode switches whenever it likes; each is idempotent.
//!
//! Not thread-safe. Drive a controller from a single thread, normally the one
//! running the host's frame loop or message pump.

use tracing::{debug, info};

use crate::config::{Config, EmbedConfig, TargetConfig};
use crate::display::{Display, DisplaySwitch};
use crate::engine::{Placement, ReparentEngine};
use crate::error::EmbedError;
use crate::handle::WindowHandle;
use crate::os::WindowSystem;
use crate::provisioner::WorkerSurfaceProvisioner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Foreground,
    Embedded,
    /// Target not resolved yet.
    Unknown,
}

/// How the target window is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    /// Whatever window is active when resolution runs.
    Active,
    Class { class: Option<String>, title: Option<String> },
}

impl From<&TargetConfig> for TargetSelector {
    fn from(target: &TargetConfig) -> Self {
        if target.class.is_none() && target.title.is_none() {
            TargetSelector::Active
        } else {
            TargetSelector::Class { class: target.class.clone(), title: target.title.clone() }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingSession {
    pub target_window: WindowHandle,
    /// Parent of the target when first resolved. Set once, never replaced.
    pub original_parent: Option<WindowHandle>,
    pub mode: Mode,
}

impl Default for EmbeddingSession {
    fn default() -> Self {
        EmbeddingSession { target_window: WindowHandle::NULL, original_parent: None, mode: Mode::Unknown }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Enter,
    Exit,
}

pub struct SessionController<W: WindowSystem, D: Display> {
    ws: W,
    display: D,
    config: EmbedConfig,
    selector: TargetSelector,
    engine: ReparentEngine,
    switch: DisplaySwitch,
    session: EmbeddingSession,
    pending: Option<Request>,
    /// Windows owned by the host itself, never taken as the target.
    ignored: Vec<WindowHandle>,
}

impl<W: WindowSystem, D: Display> SessionController<W, D> {
    /// Starts a session and makes a first attempt at resolving the target.
    pub fn new(ws: W, display: D, config: &Config) -> Self {
        let provisioner = WorkerSurfaceProvisioner::new(&config.shell, config.embedding.shell_timeout());
        let mut controller = SessionController {
            ws,
            display,
            config: config.embedding.clone(),
            selector: TargetSelector::from(&config.target),
            engine: ReparentEngine::new(provisioner, config.embedding.worker_attempts),
            switch: DisplaySwitch::new(),
            session: EmbeddingSession::default(),
            pending: None,
            ignored: Vec::new(),
        };
        controller.resolve_target();
        controller
    }

    pub fn session(&self) -> &EmbeddingSession {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn is_background(&self) -> bool {
        self.session.mode == Mode::Embedded
    }

    /// True while a mode switch waits for a later tick.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn placement(&self) -> Placement {
        self.engine.placement()
    }

    pub fn window_system(&self) -> &W {
        &self.ws
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn set_screen_index(&mut self, index: i32) {
        self.config.screen_index = index;
    }

    /// Excludes one of the host's own windows from target resolution.
    pub fn ignore_window(&mut self, window: WindowHandle) {
        if !window.is_null() && !self.ignored.contains(&window) {
            self.ignored.push(window);
        }
    }

    pub fn set_fullscreen_flags(&mut self, background: bool, foreground: bool) {
        self.config.background_fullscreen = background;
        self.config.foreground_fullscreen = foreground;
    }

    /// Periodic work: resolve the target if needed, then replay a deferred switch.
    pub fn tick(&mut self) {
        self.drop_stale_target();
        if self.session.target_window.is_null() && !self.resolve_target() {
            return;
        }
        match self.pending {
            Some(Request::Enter) => self.enter_background_mode(),
            Some(Request::Exit) => self.exit_background_mode(),
            None => {}
        }
    }

    pub fn enter_background_mode(&mut self) {
        self.drop_stale_target();
        if self.session.target_window.is_null() && !self.resolve_target() {
            debug!("session: enter deferred, {}", EmbedError::TargetUnresolved);
            self.pending = Some(Request::Enter);
            return;
        }
        let target = self.session.target_window;

        self.switch.on_enter_background(&self.display, target, self.config.background_fullscreen);
        match self.engine.embed(&self.ws, target, self.config.screen_index) {
            Ok(_) => {
                self.pending = None;
                if self.session.mode != Mode::Embedded {
                    info!("session: background mode on");
                }
                self.session.mode = Mode::Embedded;
            }
            Err(e) => {
                debug!("session: enter deferred, {}", e);
                self.pending = Some(Request::Enter);
            }
        }
    }

    pub fn exit_background_mode(&mut self) {
        self.drop_stale_target();
        let target = self.session.target_window;
        if target.is_null()
            || (self.session.mode != Mode::Embedded && self.engine.placement() == Placement::Foreground)
        {
            // nothing was moved; drop any deferred enter
            self.pending = None;
            return;
        }
        let original = self.session.original_parent.unwrap_or(WindowHandle::NULL);

        match self.engine.restore(&self.ws, target, original) {
            Ok(()) => {
                self.pending = None;
                if self.session.mode == Mode::Embedded {
                    info!("session: background mode off");
                }
                self.session.mode = Mode::Foreground;
                self.switch
                    .on_exit_background(&mut self.display, target, self.config.foreground_fullscreen);
            }
            Err(e) => {
                debug!("session: exit deferred, {}", e);
                self.pending = Some(Request::Exit);
            }
        }
    }

    pub fn toggle_background_mode(&mut self) {
        if self.is_background() || self.pending == Some(Request::Enter) {
            self.exit_background_mode();
        } else {
            self.enter_background_mode();
        }
    }

    /// Looks the target up and captures its parent the first time it shows up.
    fn resolve_target(&mut self) -> bool {
        let locator = self.engine.provisioner().locator();
        let target = match &self.selector {
            TargetSelector::Active => locator.find_active_window(&self.ws),
            TargetSelector::Class { class, title } => {
                self.ws.find_window(class.as_deref(), title.as_deref())
            }
        };
        if target.is_null() || !self.ws.is_window(target) {
            return false;
        }
        if self.ignored.contains(&target) || locator.is_shell_window(&self.ws, target) {
            debug!("session: {} belongs to the shell or host, not a target", target);
            return false;
        }

        self.session.target_window = target;
        if self.session.original_parent.is_none() {
            let parent = locator.find_parent_of(&self.ws, target);
            info!("session: target {} resolved, original parent {}", target, parent);
            self.session.original_parent = Some(parent);
        }
        if self.session.mode == Mode::Unknown {
            self.session.mode = Mode::Foreground;
        }
        true
    }

    /// Forgets a target that no longer exists. The next window found is a new
    /// target and gets its own original parent.
    fn drop_stale_target(&mut self) {
        let target = self.session.target_window;
        if target.is_null() || self.ws.is_window(target) {
            return;
        }
        info!("session: target {} is gone, resolving again", target);
        self.session = EmbeddingSession::default();
        self.engine.reset();
        if self.pending == Some(Request::Exit) {
            self.pending = None;
        }
    }
}
