use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::payload::ProviderRequest;
use crate::provider::GenerationTransport;

/// In-process transport that records every payload. Scripted replies are used
/// first; once they run out each call answers with one image `image-{n}`.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    inner: Rc<ScriptInner>,
}

#[derive(Default)]
struct ScriptInner {
    calls: RefCell<Vec<ProviderRequest>>,
    replies: RefCell<VecDeque<Result<Value, String>>>,
    usage: RefCell<Option<Result<Value, String>>>,
    usage_calls: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_reply(&self, reply: Result<Value, String>) {
        self.inner.replies.borrow_mut().push_back(reply);
    }

    pub(crate) fn set_usage(&self, reply: Result<Value, String>) {
        *self.inner.usage.borrow_mut() = Some(reply);
    }

    pub(crate) fn calls(&self) -> Vec<ProviderRequest> {
        self.inner.calls.borrow().clone()
    }

    pub(crate) fn usage_calls(&self) -> Vec<String> {
        self.inner.usage_calls.borrow().clone()
    }
}

impl GenerationTransport for ScriptedTransport {
    fn generate_content(&self, _credential: &str, request: &ProviderRequest) -> Result<Value> {
        let call_number = {
            let mut calls = self.inner.calls.borrow_mut();
            calls.push(request.clone());
            calls.len()
        };
        match self.inner.replies.borrow_mut().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(image_reply(&[&format!("image-{call_number}")])),
        }
    }

    fn fetch_usage(&self, credential: &str) -> Result<Value> {
        self.inner
            .usage_calls
            .borrow_mut()
            .push(credential.to_string());
        match self.inner.usage.borrow().clone() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("usage not scripted")),
        }
    }
}

pub(crate) fn image_reply(images: &[&str]) -> Value {
    let parts: Vec<Value> = images
        .iter()
        .map(|data| json!({"inline_data": {"mime_type": "image/png", "data": data}}))
        .collect();
    json!({"candidates": [{"content": {"role": "model", "parts": parts}}]})
}
