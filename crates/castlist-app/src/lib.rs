// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod markup;
pub mod model;
pub mod state;
pub mod view;

pub use controller::*;
pub use model::*;
pub use state::*;
