// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Moves a target window between its own parent and the worker surface.

use tracing::{debug, info};

use crate::error::EmbedError;
use crate::handle::{Rect, WindowHandle};
use crate::os::{PositionFlags, WindowSystem};
use crate::provisioner::WorkerSurfaceProvisioner;

/// Keeps the z-order and ignores owner windows when placing the embedded window.
pub const EMBED_FLAGS: PositionFlags = PositionFlags::NO_ZORDER
    .union(PositionFlags::NO_OWNER_ZORDER)
    .union(PositionFlags::NO_ACTIVATE);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Foreground,
    Embedded,
    /// Between the two; only observable after a failed re-parent.
    Detached,
}

#[derive(Debug, Clone)]
pub struct ReparentEngine {
    provisioner: WorkerSurfaceProvisioner,
    attempts: u32,
    placement: Placement,
}

impl ReparentEngine {
    pub fn new(provisioner: WorkerSurfaceProvisioner, attempts: u32) -> Self {
        ReparentEngine { provisioner, attempts, placement: Placement::Foreground }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Back to `Foreground` after the target went away.
    pub fn reset(&mut self) {
        self.placement = Placement::Foreground;
    }

    pub fn provisioner(&self) -> &WorkerSurfaceProvisioner {
        &self.provisioner
    }

    /// Foreground -> Embedded. Returns the bounds the window was moved to.
    pub fn embed<W: WindowSystem>(
        &mut self,
        ws: &W,
        target: WindowHandle,
        screen_index: i32,
    ) -> Result<Rect, EmbedError> {
        if target.is_null() {
            return Err(EmbedError::TargetUnresolved);
        }
        let bounds = embed_bounds(&ws.screens(), screen_index).ok_or(EmbedError::NoScreens)?;
        if self.provisioner.shell_host(ws).is_null() {
            return Err(EmbedError::ShellHostMissing);
        }
        let surface = self.provisioner.acquire(ws, self.attempts);
        if surface.is_null() {
            return Err(EmbedError::WorkerSurfaceUnavailable { attempts: self.attempts });
        }

        self.placement = Placement::Detached;
        if !ws.set_parent(target, surface) {
            return Err(EmbedError::ReparentFailed { child: target, parent: surface });
        }
        if !ws.set_position(target, bounds, EMBED_FLAGS) {
            debug!("engine: positioning {} at {:?} failed", target, bounds);
        }
        self.placement = Placement::Embedded;
        info!("engine: {} embedded under {} at {:?}", target, surface, bounds);
        Ok(bounds)
    }

    /// Embedded -> Foreground, back under `original_parent`.
    pub fn restore<W: WindowSystem>(
        &mut self,
        ws: &W,
        target: WindowHandle,
        original_parent: WindowHandle,
    ) -> Result<(), EmbedError> {
        if target.is_null() {
            return Err(EmbedError::TargetUnresolved);
        }

        self.placement = Placement::Detached;
        if !ws.set_parent(target, original_parent) {
            return Err(EmbedError::ReparentFailed { child: target, parent: original_parent });
        }
        self.provisioner.refresh_desktop(ws);
        // the shell may rebuild the worker surface while we are away
        self.provisioner.invalidate();
        if !ws.bring_to_top(target) {
            debug!("engine: raising {} failed", target);
        }
        self.placement = Placement::Foreground;
        info!("engine: {} restored under {}", target, original_parent);
        Ok(())
    }
}

/// Where an embedded window covering screen `index` goes.
///
/// Child coordinates start at the top-left of the union of all screens, so
/// screen origins are shifted by the most negative x and y. Indexes outside
/// `0..screens.len()` fall back to screen 0.
pub fn embed_bounds(screens: &[Rect], index: i32) -> Option<Rect> {
    let first = screens.first()?;
    let screen = usize::try_from(index)
        .ok()
        .and_then(|i| screens.get(i))
        .unwrap_or(first);

    let min_x = screens.iter().map(|s| s.x).min().unwrap_or(0).min(0);
    let min_y = screens.iter().map(|s| s.y).min().unwrap_or(0).min(0);

    Some(Rect::new(
        screen.x.saturating_sub(min_x),
        screen.y.saturating_sub(min_y),
        screen.width,
        screen.height,
    ))
}
