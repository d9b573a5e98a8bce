#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResult {
    /// `{batch_millis}-{index}`, unique within a batch.
    pub id: String,
    /// Base64 image payload as returned by the provider.
    pub data: String,
}

impl GeneratedResult {
    pub fn batch(stamp_millis: i64, images: Vec<String>) -> Vec<Self> {
        images
            .into_iter()
            .enumerate()
            .map(|(index, data)| Self {
                id: format!("{stamp_millis}-{index}"),
                data,
            })
            .collect()
    }
}

/// Most recent batch, held in memory only.
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    current: Vec<GeneratedResult>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set; results never accumulate across batches.
    pub fn replace(&mut self, results: Vec<GeneratedResult>) {
        self.current = results;
    }

    pub fn current(&self) -> &[GeneratedResult] {
        &self.current
    }

    pub fn get(&self, id: &str) -> Option<&GeneratedResult> {
        self.current.iter().find(|result| result.id == id)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
