//! Form Sentinel: counts exercise repetitions from 2-D pose landmarks and
//! grades each one against a fixed set of form rules.
//!
//! Data flows one way: a [`source::PoseFrame`] is mapped to a
//! [`landmarks::KeypointSample`], the [`rep_counter::RepCounter`] decides
//! stage transitions and completions, and every [`rep_counter::RepEvent`] is
//! folded into the [`session::SessionHandle`] and written to a
//! [`sink::RepEventSink`].

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod overlay;
pub mod rep_counter;
pub mod rules;
pub mod session;
pub mod sink;
pub mod source;

pub use config::{Config, Thresholds};
pub use driver::{SessionDriver, SessionSummary, StopReason};
pub use landmarks::{KeypointSample, Landmark, Side};
pub use rep_counter::{RepCounter, RepEvent, RepStage};
pub use rules::{FormReport, FormRule, FormVerdict};
pub use session::{SessionHandle, SessionReport, SessionStats};
