// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Live wallpaper embedding: slips an application window behind the desktop
//! icons and brings it back.
//!
//! The desktop shell keeps a worker surface between the wallpaper and the
//! icon layer. [`SessionController`] finds or spawns that surface, re-parents
//! the target window into it and later restores the original parent. All OS
//! access goes through [`WindowSystem`]; [`win32::Win32Shell`] binds it to the
//! real shell and `fake::FakeShell` (feature `testing`) to an in-memory one.
//!
//! Nothing here is thread-safe. The host drives a controller from a single
//! thread through periodic [`SessionController::tick`] calls.

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod fake;
pub mod handle;
pub mod locator;
pub mod os;
pub mod provisioner;
pub mod schedule;
pub mod session;
#[cfg(windows)]
pub mod win32;

pub use config::Config;
pub use display::{Display, DisplaySwitch};
pub use engine::{Placement, ReparentEngine};
pub use error::{ConfigError, EmbedError};
pub use handle::{Rect, Resolution, WindowHandle};
pub use locator::ShellLocator;
pub use os::{PositionFlags, WindowSystem};
pub use provisioner::{ShellHandles, WorkerSurfaceProvisioner};
pub use schedule::{ModeSchedule, ScheduledAction};
pub use session::{EmbeddingSession, Mode, SessionController, TargetSelector};
