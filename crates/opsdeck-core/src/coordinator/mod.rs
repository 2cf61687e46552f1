//! Request coordination for one dashboard view.
//!
//! [`QueryCoordinator`] owns the sequence counter and the visible result;
//! [`Debouncer`] decides when free-text edits turn into a dispatch. The two
//! are independent: debounce controls when a request is issued, the
//! sequence guard controls whether its response is honored.

pub mod debounce;
pub mod sequence;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use sequence::{QueryCoordinator, QueryRequest, Resolution, ViewState};
