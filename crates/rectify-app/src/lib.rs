// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod booking;
pub mod copy;
pub mod format;
pub mod forms;
pub mod model;
pub mod session;
pub mod submit;
pub mod towers;

pub use booking::apply_booking;
pub use format::{clean_number, format_date};
pub use forms::{FieldViolation, FormState};
pub use model::*;
pub use session::*;
pub use submit::*;
pub use towers::*;
