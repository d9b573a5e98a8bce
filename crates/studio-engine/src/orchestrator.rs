//! One generation batch: validation, base payloads, and the sequential call loop.

use std::iter::FusedIterator;

use anyhow::Context;
use studio_contracts::references::ReferenceImage;
use studio_contracts::results::GeneratedResult;

use crate::count::ImageCount;
use crate::payload::{build_request, extract_inline_images, ProviderRequest};
use crate::provider::GenerationTransport;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API credential missing")]
    CredentialMissing,
    #[error("a prompt or at least one reference image is required")]
    PromptRequired,
    #[error("generation failed: {0}")]
    GenerationFailed(#[source] anyhow::Error),
}

/// A validated batch: the credential, the base payloads and the call count.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    credential: String,
    payloads: Vec<ProviderRequest>,
    requested: ImageCount,
}

impl BatchPlan {
    /// Validates inputs before any network traffic. One payload per reference
    /// (each carrying the prompt), or a single prompt-only payload.
    pub fn new(
        credential: &str,
        prompt: &str,
        references: &[ReferenceImage],
        requested: ImageCount,
    ) -> Result<Self, GenerationError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(GenerationError::CredentialMissing);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() && references.is_empty() {
            return Err(GenerationError::PromptRequired);
        }
        let payloads = if references.is_empty() {
            vec![build_request(Some(prompt), None)]
        } else {
            references
                .iter()
                .map(|reference| build_request(Some(prompt), Some(&reference.data)))
                .collect()
        };
        Ok(Self {
            credential: credential.to_string(),
            payloads,
            requested,
        })
    }

    pub fn payloads(&self) -> &[ProviderRequest] {
        &self.payloads
    }

    pub fn requested(&self) -> ImageCount {
        self.requested
    }

    /// Round-robin: call `i` uses payload `i mod payloads.len()`.
    pub fn payload_index(&self, call_index: usize) -> usize {
        call_index % self.payloads.len()
    }

    pub fn steps<'a, T>(&'a self, transport: &'a T) -> BatchSteps<'a, T>
    where
        T: GenerationTransport + ?Sized,
    {
        BatchSteps {
            plan: self,
            transport,
            next: 0,
            failed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub index: usize,
    pub payload_index: usize,
    pub images: Vec<String>,
}

/// Issues one remote call per `next()`. Yields at most one `Err`, after which
/// the iterator is exhausted.
pub struct BatchSteps<'a, T: ?Sized> {
    plan: &'a BatchPlan,
    transport: &'a T,
    next: usize,
    failed: bool,
}

impl<T> Iterator for BatchSteps<'_, T>
where
    T: GenerationTransport + ?Sized,
{
    type Item = anyhow::Result<StepOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.plan.requested.get();
        if self.failed || self.next >= total {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let payload_index = self.plan.payload_index(index);
        let payload = &self.plan.payloads[payload_index];

        match self
            .transport
            .generate_content(&self.plan.credential, payload)
            .with_context(|| format!("generation call {} of {} failed", index + 1, total))
        {
            Ok(response) => Some(Ok(StepOutcome {
                index,
                payload_index,
                images: extract_inline_images(&response),
            })),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.plan.requested.get().saturating_sub(self.next);
        (0, Some(remaining))
    }
}

impl<T> FusedIterator for BatchSteps<'_, T> where T: GenerationTransport + ?Sized {}

/// Drives the steps to completion, stopping at the first failed call. Nothing
/// accumulated before the failure is returned.
pub fn run_batch<T, F>(
    transport: &T,
    plan: &BatchPlan,
    mut on_step: F,
) -> Result<Vec<GeneratedResult>, GenerationError>
where
    T: GenerationTransport + ?Sized,
    F: FnMut(&StepOutcome),
{
    let mut images = Vec::new();
    for step in plan.steps(transport) {
        let outcome = step.map_err(GenerationError::GenerationFailed)?;
        on_step(&outcome);
        images.extend(outcome.images);
    }
    Ok(GeneratedResult::batch(
        chrono::Utc::now().timestamp_millis(),
        images,
    ))
}

pub fn generate<T>(
    transport: &T,
    credential: &str,
    prompt: &str,
    references: &[ReferenceImage],
    requested: ImageCount,
) -> Result<Vec<GeneratedResult>, GenerationError>
where
    T: GenerationTransport + ?Sized,
{
    let plan = BatchPlan::new(credential, prompt, references, requested)?;
    run_batch(transport, &plan, |_| {})
}
