//! Marketplace scheduling and booking API - Library exports for testing

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::core::push::PushTask;
use tokio::sync::OnceCell;
use tokio::sync::mpsc;

/// Sender feeding the background push-dispatch task. Left unset when the
/// dispatcher is not running; push delivery is best-effort either way.
pub static PUSH_SENDER: OnceCell<mpsc::Sender<PushTask>> = OnceCell::const_new();
