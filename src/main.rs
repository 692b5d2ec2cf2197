// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

#![cfg_attr(windows, windows_subsystem = "windows")]

#[cfg(windows)]
mod host;
mod logging;

use anyhow::{Context, Result};
use backdrop::Config;
use tracing::info;

fn main() -> Result<()> {
    let path = Config::default_path()?;
    let config = Config::load_or_default(&path).context("loading configuration")?;
    logging::init(&config.host)?;
    info!("=== Backdrop START === (config {:?})", path);
    run(config)
}

#[cfg(windows)]
fn run(config: Config) -> Result<()> {
    host::run(config)
}

#[cfg(not(windows))]
fn run(_config: Config) -> Result<()> {
    tracing::error!("no supported desktop shell on this platform");
    anyhow::bail!("backdrop embeds windows behind the Windows desktop icons and only runs on Windows")
}
