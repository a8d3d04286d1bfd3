use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use brave_http::{HttpError, QueryParams};
use serde_json::Value;

use crate::client::{Endpoint, SearchApi};

/// Scripted [`SearchApi`] that records every call it receives.
#[derive(Default)]
pub(crate) struct FakeApi {
    replies: Mutex<VecDeque<Result<Value, HttpError>>>,
    calls: Mutex<Vec<(Endpoint, QueryParams)>>,
}

impl FakeApi {
    pub(crate) fn replying(replies: impl IntoIterator<Item = Result<Value, HttpError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(Endpoint, QueryParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchApi for FakeApi {
    async fn request(&self, endpoint: Endpoint, params: QueryParams) -> Result<Value, HttpError> {
        self.calls.lock().unwrap().push((endpoint, params));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected call to {}", endpoint.path()))
    }
}
