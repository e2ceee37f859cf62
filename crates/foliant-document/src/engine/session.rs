// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine session — scoped ownership of an initialised engine.

use foliant_core::error::{FoliantError, Result};
use tracing::{info, warn};

use super::DocumentEngine;

/// An initialised engine, terminated when the session is dropped.
///
/// One session is started per process and lent to every merge run.
pub struct EngineSession<E: DocumentEngine> {
    engine: E,
}

impl<E: DocumentEngine> EngineSession<E> {
    /// Initialise `engine` and take ownership of it.
    pub fn start(mut engine: E, license_key: Option<&str>) -> Result<Self> {
        engine.initialize(license_key).map_err(|err| {
            FoliantError::EngineUnavailable(format!(
                "{} failed to initialise: {}",
                engine.engine_name(),
                err
            ))
        })?;
        if !engine.is_initialized() {
            return Err(FoliantError::EngineUnavailable(format!(
                "{} did not report ready after initialisation",
                engine.engine_name()
            )));
        }
        info!(engine = engine.engine_name(), "Document engine started");
        Ok(Self { engine })
    }

    /// The engine, provided it is still serving requests.
    pub fn engine(&self) -> Result<&E> {
        if self.engine.is_initialized() {
            Ok(&self.engine)
        } else {
            Err(FoliantError::EngineUnavailable(format!(
                "{} is not initialised",
                self.engine.engine_name()
            )))
        }
    }
}

impl<E: DocumentEngine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if !self.engine.is_initialized() {
            return;
        }
        match self.engine.terminate() {
            Ok(()) => info!(engine = self.engine.engine_name(), "Document engine terminated"),
            Err(err) => warn!(%err, "Document engine did not terminate cleanly"),
        }
    }
}
