// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use castlist_app::{CastEntry, LoadFailure};
use castlist_source::{Loader, Source};
use castlist_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;

pub struct SourceRuntime {
    loader: Loader,
    source: Source,
}

impl SourceRuntime {
    pub fn new(loader: Loader, source: Source) -> Self {
        Self { loader, source }
    }
}

impl castlist_tui::AppRuntime for SourceRuntime {
    fn source_label(&self) -> String {
        self.source.to_string()
    }

    fn load_dataset(&mut self) -> std::result::Result<Vec<CastEntry>, LoadFailure> {
        self.loader
            .load(&self.source)
            .map_err(|error| self.source.load_failure(&error))
    }

    fn spawn_load(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let loader = self.loader.clone();
        let source = self.source.clone();
        thread::Builder::new()
            .name("dataset-load".to_owned())
            .spawn(move || {
                let result = loader
                    .load(&source)
                    .map_err(|error| source.load_failure(&error));
                let _ = tx.send(InternalEvent::DatasetLoaded(result));
            })
            .context("spawn dataset load thread")?;
        Ok(())
    }
}
