// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One-shot timed mode switches measured from host start.

use std::time::Duration;

use crate::config::ScheduleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    EnterBackground,
    ExitBackground,
}

#[derive(Debug, Clone, Default)]
pub struct ModeSchedule {
    enter_after: Option<Duration>,
    exit_after: Option<Duration>,
}

impl ModeSchedule {
    pub fn new(enter_after: Option<Duration>, exit_after: Option<Duration>) -> Self {
        ModeSchedule { enter_after, exit_after }
    }

    /// Actions whose deadline `elapsed` has reached, in deadline order. Each
    /// fires once.
    pub fn due(&mut self, elapsed: Duration) -> Vec<ScheduledAction> {
        let mut fired: Vec<(Duration, ScheduledAction)> = Vec::new();
        if let Some(at) = self.enter_after.filter(|at| elapsed >= *at) {
            self.enter_after = None;
            fired.push((at, ScheduledAction::EnterBackground));
        }
        if let Some(at) = self.exit_after.filter(|at| elapsed >= *at) {
            self.exit_after = None;
            fired.push((at, ScheduledAction::ExitBackground));
        }
        fired.sort_by_key(|(at, _)| *at);
        fired.into_iter().map(|(_, action)| action).collect()
    }

    pub fn is_done(&self) -> bool {
        self.enter_after.is_none() && self.exit_after.is_none()
    }
}

impl From<&ScheduleConfig> for ModeSchedule {
    fn from(config: &ScheduleConfig) -> Self {
        ModeSchedule::new(
            config.enter_after_ms.map(Duration::from_millis),
            config.exit_after_ms.map(Duration::from_millis),
        )
    }
}
