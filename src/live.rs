//! Debounced classify-as-you-type.
//!
//! Every keystroke schedules a classification, but only the most recent one
//! may apply. A generation counter stands in for task cancellation: stale
//! tasks observe a newer generation and drop their result instead of
//! writing it anywhere.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::ai_client::ClassificationResult;
use crate::classifier::Classifier;
use crate::db::Section;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

pub struct LiveClassifier {
    classifier: Arc<Classifier>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl LiveClassifier {
    pub fn new(classifier: Arc<Classifier>, debounce: Duration) -> Self {
        LiveClassifier {
            classifier,
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    /// Schedule classification for the current composition text.
    ///
    /// Supersedes any in-flight task for this composition. The returned
    /// handle resolves to `Some(result)` only if the task was still the
    /// latest one after both the quiet period and the classification
    /// itself; superseded tasks resolve to `None`.
    pub fn input_changed(
        &self,
        text: String,
        sections: Vec<Section>,
    ) -> JoinHandle<Option<ClassificationResult>> {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let classifier = Arc::clone(&self.classifier);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Superseded while waiting out the quiet period
            if generation.load(Ordering::SeqCst) != my_generation {
                return None;
            }

            let result = classifier.classify_note(&text, &sections).await;

            // Superseded while the classification was in flight
            if generation.load(Ordering::SeqCst) != my_generation {
                return None;
            }

            Some(result)
        })
    }

    /// Invalidate any in-flight classification (composition cleared or
    /// submitted). The next `input_changed` starts a fresh generation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
