//! Sequence-guarded application of async responses

use crate::errors::ExError;
use crate::model::FilterState;
use opsdeck_core_types::RequestContext;

/// One dispatched query. `sequence` is never reused within a coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub sequence: u64,
    pub filter: FilterState,
    pub context: RequestContext,
}

/// Outcome of resolving a response against the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Superseded,
}

/// What the view currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loaded { sequence: u64, data: T },
    Failed { sequence: u64, error: ExError },
}

impl<T> ViewState<T> {
    pub fn sequence(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Loaded { sequence, .. } | Self::Failed { sequence, .. } => Some(*sequence),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ExError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Monotonic sequence guard plus the last applied result.
///
/// A response is applied iff its tag equals the current counter at the
/// moment it is resolved. Everything else is dropped without touching the
/// visible state, failures included.
#[derive(Debug)]
pub struct QueryCoordinator<T> {
    view: String,
    seq: u64,
    state: ViewState<T>,
}

impl<T> QueryCoordinator<T> {
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            seq: 0,
            state: ViewState::Idle,
        }
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    /// Latest issued sequence, 0 before the first dispatch
    pub fn current_sequence(&self) -> u64 {
        self.seq
    }

    /// Issue a new tagged request for `filter`
    pub fn dispatch(&mut self, filter: FilterState) -> QueryRequest {
        self.seq += 1;
        let context = RequestContext::new().with_sequence(self.seq);
        tracing::debug!(
            op = "view_dispatch",
            view = %self.view,
            sequence = self.seq,
            request_id = %context.request_id,
        );
        QueryRequest {
            sequence: self.seq,
            filter,
            context,
        }
    }

    /// True while the latest dispatched request has not been resolved
    pub fn is_fetching(&self) -> bool {
        self.seq > 0 && self.state.sequence() != Some(self.seq)
    }

    pub fn is_current(&self, tag: u64) -> bool {
        tag == self.seq
    }

    /// Apply or discard a response tagged `tag`
    pub fn resolve(&mut self, tag: u64, result: Result<T, ExError>) -> Resolution {
        if !self.is_current(tag) {
            tracing::debug!(
                op = "view_resolve",
                view = %self.view,
                sequence = tag,
                current = self.seq,
                outcome = "superseded",
            );
            return Resolution::Superseded;
        }

        self.state = match result {
            Ok(data) => {
                tracing::debug!(
                    op = "view_resolve",
                    view = %self.view,
                    sequence = tag,
                    outcome = "applied",
                );
                ViewState::Loaded {
                    sequence: tag,
                    data,
                }
            }
            Err(error) => {
                tracing::warn!(
                    op = "view_resolve",
                    view = %self.view,
                    sequence = tag,
                    err.code = error.code(),
                    outcome = "failed",
                );
                ViewState::Failed {
                    sequence: tag,
                    error,
                }
            }
        };
        Resolution::Applied
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    /// Currently visible data, if the last applied response succeeded
    pub fn visible(&self) -> Option<&T> {
        self.state.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::SortKey;

    fn filter(search: &str) -> FilterState {
        FilterState::default().with_search(search)
    }

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let mut coord: QueryCoordinator<Vec<u32>> = QueryCoordinator::new("jobs");
        let a = coord.dispatch(filter("a"));
        let b = coord.dispatch(filter("b"));
        assert_eq!(a.sequence, 1);
        assert_eq!(b.sequence, 2);
        assert_eq!(b.context.sequence, Some(2));
        assert_ne!(a.context.request_id, b.context.request_id);
    }

    #[test]
    fn test_reverse_resolution_keeps_last_dispatched() {
        let mut coord = QueryCoordinator::new("jobs");
        let requests: Vec<_> = (0..5).map(|i| coord.dispatch(filter(&i.to_string()))).collect();

        for req in requests.iter().rev() {
            let outcome = coord.resolve(req.sequence, Ok(req.filter.search_text.clone()));
            let expected = if req.sequence == 5 {
                Resolution::Applied
            } else {
                Resolution::Superseded
            };
            assert_eq!(outcome, expected);
        }
        assert_eq!(coord.visible().map(String::as_str), Some("4"));
    }

    #[test]
    fn test_stale_failure_does_not_clobber_success() {
        let mut coord = QueryCoordinator::new("emails");
        let old = coord.dispatch(filter("old"));
        let new = coord.dispatch(filter("new"));

        assert_eq!(coord.resolve(new.sequence, Ok(3usize)), Resolution::Applied);
        let err = ExError::new(ExErrorKind::ExternalService).with_message("boom");
        assert_eq!(coord.resolve(old.sequence, Err(err)), Resolution::Superseded);
        assert_eq!(coord.visible(), Some(&3));
    }

    #[test]
    fn test_current_failure_is_applied() {
        let mut coord: QueryCoordinator<()> = QueryCoordinator::new("contacts");
        let req = coord.dispatch(FilterState::default().with_sort(SortKey::Name));
        assert!(coord.is_fetching());
        let err = ExError::new(ExErrorKind::Timeout);
        assert_eq!(coord.resolve(req.sequence, Err(err)), Resolution::Applied);
        assert!(!coord.is_fetching());
        assert_eq!(
            coord.state().error().map(ExError::kind),
            Some(ExErrorKind::Timeout)
        );
    }

    #[test]
    fn test_resolution_after_new_dispatch_is_superseded() {
        let mut coord = QueryCoordinator::new("jobs");
        let first = coord.dispatch(filter("x"));
        coord.dispatch(filter("y"));
        assert_eq!(coord.resolve(first.sequence, Ok(1)), Resolution::Superseded);
        assert_eq!(coord.state(), &ViewState::Idle);
    }
}
