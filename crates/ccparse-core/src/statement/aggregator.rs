//! Batch processing over many statements.

use std::path::Path;
use std::thread;

use tracing::{debug, info};

use super::extractor::{Extraction, StatementExtractor};
use crate::models::record::FieldRecord;
use crate::source::TextSource;

/// Runs the extractor over a list of documents.
///
/// Output row `i` always belongs to input document `i`, including documents
/// that degraded to an unknown or partial record.
pub struct BatchAggregator<'a, S> {
    extractor: &'a StatementExtractor<S>,
    jobs: usize,
}

impl<'a, S: TextSource> BatchAggregator<'a, S> {
    /// Create a sequential aggregator.
    pub fn new(extractor: &'a StatementExtractor<S>) -> Self {
        Self { extractor, jobs: 1 }
    }

    /// Set the number of worker threads; values below 2 run sequentially.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Extract every document and return one record per input, in order.
    pub fn process_all<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<FieldRecord> {
        self.process_all_with(paths, |_, _| {})
            .into_iter()
            .map(|extraction| extraction.record)
            .collect()
    }

    /// Like [`process_all`](Self::process_all), keeping issues and calling
    /// `on_done` with the input index after each document.
    pub fn process_all_with<P, F>(&self, paths: &[P], on_done: F) -> Vec<Extraction>
    where
        P: AsRef<Path> + Sync,
        F: Fn(usize, &Extraction) + Sync,
    {
        info!("Processing {} documents with {} jobs", paths.len(), self.jobs);

        if self.jobs <= 1 || paths.len() <= 1 {
            return paths
                .iter()
                .enumerate()
                .map(|(index, path)| self.run_one(index, path.as_ref(), &on_done))
                .collect();
        }

        let chunk_size = paths.len().div_ceil(self.jobs);
        let mut tagged: Vec<(usize, Extraction)> = thread::scope(|scope| {
            let handles: Vec<_> = paths
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_index, chunk)| {
                    let offset = chunk_index * chunk_size;
                    let on_done = &on_done;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(i, path)| {
                                let index = offset + i;
                                (index, self.run_one(index, path.as_ref(), on_done))
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        tagged.sort_by_key(|(index, _)| *index);
        tagged.into_iter().map(|(_, extraction)| extraction).collect()
    }

    fn run_one<F: Fn(usize, &Extraction)>(&self, index: usize, path: &Path, on_done: &F) -> Extraction {
        debug!("Parsing [{}] {}", index, path.display());
        let extraction = self.extractor.extract(path);
        on_done(index, &extraction);
        extraction
    }
}
