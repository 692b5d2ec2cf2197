// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

use crate::handle::WindowHandle;

/// Why a configuration could not be loaded or saved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no per-user configuration directory on this system")]
    NoConfigDir,
}

/// Why a placement transition could not run this tick.
///
/// All of these are transient. The session controller logs them and retries
/// on a later tick; none reach the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmbedError {
    #[error("target window is not resolved yet")]
    TargetUnresolved,

    #[error("desktop shell host window not found")]
    ShellHostMissing,

    #[error("worker surface unavailable after {attempts} attempt(s)")]
    WorkerSurfaceUnavailable { attempts: u32 },

    #[error("no screens reported")]
    NoScreens,

    #[error("could not re-parent {child} under {parent}")]
    ReparentFailed { child: WindowHandle, parent: WindowHandle },
}
