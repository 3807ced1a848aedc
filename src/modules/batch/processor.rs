//! The batch processor facade
//!
//! Owns one worker pool for its whole life and shares it between the
//! executor and the aggregator. The pool is released by
//! [`BatchProcessor::shutdown`] or when the last handle to it is dropped.

use std::path::Path;
use std::sync::Arc;

use crate::engines::compute::alignment::Comparison;
use crate::engines::core::config::ProcessorConfig;
use crate::engines::core::logging::Logger;
use crate::engines::core::parallel::WorkerPool;
use crate::engines::render::{RenderingSink, SvgRenderer, Visualizations};
use crate::engines::EngineResult;
use crate::modules::batch::executor::BatchExecutor;
use crate::modules::batch::summary::{AggregateSummary, SummaryAggregator};
use crate::modules::io::fasta;
use crate::modules::seq::{SequenceAnalysis, SequenceAnalyzer, StatRecord};

pub struct BatchProcessor<A = SequenceAnalyzer, R = SvgRenderer> {
    pool: Arc<WorkerPool>,
    executor: BatchExecutor<A>,
    aggregator: SummaryAggregator<R>,
}

impl BatchProcessor {
    /// Processor with the stock analyzer and SVG renderer, logging to the
    /// global `log` implementation
    pub fn from_config(config: &ProcessorConfig) -> EngineResult<Self> {
        Self::from_config_with_logger(config, Logger::default())
    }

    pub fn from_config_with_logger(config: &ProcessorConfig, logger: Logger) -> EngineResult<Self> {
        config.validate()?;

        let pool = WorkerPool::with_thread_prefix(
            config.workers,
            &config.thread_name_prefix,
            logger.with_target("seqbatch::pool"),
        )?;
        let analyzer = SequenceAnalyzer::from_config(config)?;
        let renderer = SvgRenderer::new(config.render);

        Ok(Self::new(Arc::new(pool), analyzer, renderer, logger))
    }
}

impl<A: SequenceAnalysis, R: RenderingSink> BatchProcessor<A, R> {
    pub fn new(pool: Arc<WorkerPool>, analyzer: A, renderer: R, logger: Logger) -> Self {
        let executor = BatchExecutor::new(
            Arc::new(analyzer),
            Arc::clone(&pool),
            logger.with_target("seqbatch::executor"),
        );
        let aggregator = SummaryAggregator::new(
            Arc::new(renderer),
            Arc::clone(&pool),
            logger.with_target("seqbatch::summary"),
        );

        Self {
            pool,
            executor,
            aggregator,
        }
    }

    /// Processor with a fresh pool of `workers` threads
    pub fn with_workers(workers: usize, analyzer: A, renderer: R, logger: Logger) -> EngineResult<Self> {
        let pool = WorkerPool::new(workers, logger.with_target("seqbatch::pool"))?;
        Ok(Self::new(Arc::new(pool), analyzer, renderer, logger))
    }

    /// Per-sequence statistics in input order; all or nothing
    pub fn process_batch<S>(&self, sequences: &[S]) -> EngineResult<Vec<StatRecord>>
    where
        S: AsRef<str> + Sync,
    {
        self.executor.process_batch(sequences)
    }

    /// Read a FASTA file and process its sequences in file order
    pub fn process_fasta<P: AsRef<Path>>(&self, path: P) -> EngineResult<Vec<StatRecord>> {
        let records = fasta::read_fasta(path)?;
        self.process_batch(&fasta::sequences(&records))
    }

    pub fn generate_visualizations(&self, records: &[StatRecord]) -> EngineResult<Visualizations> {
        self.aggregator.generate_visualizations(records)
    }

    pub fn summarize(&self, records: &[StatRecord]) -> EngineResult<AggregateSummary> {
        AggregateSummary::from_records(records)
    }

    pub fn compare(&self, seq1: &str, seq2: &str) -> EngineResult<Comparison> {
        Ok(self.executor.analyzer().compare(seq1, seq2)?)
    }

    pub fn analyzer(&self) -> &A {
        self.executor.analyzer()
    }

    pub fn renderer(&self) -> &R {
        self.aggregator.renderer()
    }

    /// Pool capacity
    pub fn workers(&self) -> usize {
        self.pool.capacity()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Release the worker pool; later batch calls fail with a pool error
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

impl<A, R> std::fmt::Debug for BatchProcessor<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::core::logging::MemoryLog;
    use crate::engines::core::parallel::PoolError;
    use crate::engines::render::{ArtifactKind, RenderResult, Series};
    use crate::engines::EngineError;
    use crate::modules::seq::{AnalysisResult, RandomQualityScorer};
    use log::Level;
    use parking_lot::Mutex;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config(workers: usize) -> ProcessorConfig {
        ProcessorConfig {
            workers,
            ..ProcessorConfig::default()
        }
    }

    fn logged_processor(workers: usize) -> (BatchProcessor, Arc<MemoryLog>) {
        let sink = Arc::new(MemoryLog::default());
        let logger = Logger::new(sink.clone(), "seqbatch");
        let processor = BatchProcessor::from_config_with_logger(&config(workers), logger).unwrap();
        (processor, sink)
    }

    #[test]
    fn test_end_to_end() {
        let (processor, _) = logged_processor(2);
        let sequences = vec!["ACGT", "GGCC", "NNNN", "ATAT", ""];

        let records = processor.process_batch(&sequences).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[1].gc_content, 1.0);
        assert_eq!(records[2].n_content, 1.0);
        assert_eq!(records[4].length, 0);

        let artifacts = processor.generate_visualizations(&records).unwrap();
        assert_eq!(artifacts.len(), 3);
        assert!(artifacts.contains_key(&ArtifactKind::SequenceLength));

        let summary = processor.summarize(&records).unwrap();
        assert_eq!(summary.total_bases, 16);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            BatchProcessor::from_config(&config(0)),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_compare() {
        let (processor, _) = logged_processor(1);

        let result = processor.compare("GATTACA", "GATTACA").unwrap();
        assert_eq!(result.similarity, 1.0);
        let (a, b) = result.alignment.unwrap();
        assert!(!a.contains('-') && !b.contains('-'));

        assert!(matches!(
            processor.compare("", "ACGT"),
            Err(EngineError::Alignment(_))
        ));
    }

    #[test]
    fn test_shutdown() {
        let (processor, sink) = logged_processor(2);
        processor.shutdown();
        processor.shutdown();

        assert!(processor.pool().is_shut_down());
        assert!(matches!(
            processor.process_batch(&["ACGT"]),
            Err(EngineError::Pool(PoolError::ShutDown))
        ));

        let released: Vec<String> = sink
            .messages_at(Level::Info)
            .into_iter()
            .filter(|m| m.starts_with("released worker pool"))
            .collect();
        assert_eq!(released.len(), 1);
    }

    #[test]
    fn test_drop_releases_pool() {
        let sink = Arc::new(MemoryLog::default());
        let logger = Logger::new(sink.clone(), "seqbatch");
        {
            let processor = BatchProcessor::from_config_with_logger(&config(2), logger).unwrap();
            processor.process_batch(&["ACGT"]).unwrap();
        }

        let entries = sink.entries();
        assert!(entries
            .iter()
            .any(|(_, target, msg)| target == "seqbatch::pool" && msg.starts_with("released")));
    }

    #[test]
    fn test_process_fasta() {
        let (processor, _) = logged_processor(3);
        let mut file = NamedTempFile::new().unwrap();
        write!(file, ">a\nGGGG\n>b desc\nAAAA\nCC\n>c\nNN\n").unwrap();

        let records = processor.process_fasta(file.path()).unwrap();
        let lengths: Vec<usize> = records.iter().map(|r| r.length).collect();
        assert_eq!(lengths, vec![4, 6, 2]);

        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "ACGT").unwrap();
        assert!(matches!(
            processor.process_fasta(bad.path()),
            Err(EngineError::Fasta(_))
        ));
    }

    struct ThreadRecorder {
        names: Mutex<Vec<String>>,
    }

    impl SequenceAnalysis for ThreadRecorder {
        fn analyze(&self, sequence: &str) -> AnalysisResult<StatRecord> {
            let name = std::thread::current().name().unwrap_or("").to_string();
            self.names.lock().push(name);
            SequenceAnalyzer::default().analyze(sequence)
        }
    }

    fn null_sink(_: Series<'_>, _: &str) -> RenderResult<Vec<u8>> {
        Ok(Vec::new())
    }

    #[test]
    fn test_units_run_on_pool_threads() {
        let processor = BatchProcessor::with_workers(
            4,
            ThreadRecorder {
                names: Mutex::new(Vec::new()),
            },
            null_sink,
            Logger::default(),
        )
        .unwrap();

        let sequences = vec!["ACGT"; 32];
        processor.process_batch(&sequences).unwrap();

        let names = processor.analyzer().names.lock().clone();
        assert_eq!(names.len(), 32);
        assert!(names.iter().all(|n| n.starts_with("seqbatch-worker-")));
        assert!(processor.pool().peak_in_flight() <= 4);
    }

    #[test]
    fn test_random_scorer_is_pluggable() {
        let processor = BatchProcessor::with_workers(
            2,
            SequenceAnalyzer::with_scorer(RandomQualityScorer::seeded(11)),
            SvgRenderer::default(),
            Logger::default(),
        )
        .unwrap();

        let records = processor.process_batch(&["ACGT", "GGCC", "ATAT"]).unwrap();
        assert!(records
            .iter()
            .all(|r| (0.0..1.0).contains(&r.quality_score)));
    }
}
