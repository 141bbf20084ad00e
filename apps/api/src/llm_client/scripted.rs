//! Scripted Model Gateway for tests. No network.
//!
//! Returns queued responses in order and records every request so tests can
//! assert on what was (or was not) sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GatewayRequest, LlmError, ModelGateway};

pub enum Scripted {
    Reply(String),
    Fail(u16),
}

#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| Scripted::Reply(r.into()))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: impl Into<String>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(reply.into()));
        self
    }

    pub fn push_failure(&self, status: u16) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(status));
        self
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn ask(&self, request: &GatewayRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(status)) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}
