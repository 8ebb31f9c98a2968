//! Parquet I/O for graph persistence
//!
//! Based on `DuckDB` (Raasveldt et al., SIGMOD 2019) columnar storage patterns.
//!
//! # Format
//!
//! Graphs are stored as two Parquet files:
//! - `{path}_edges.parquet`: every stored arc as (source, target, weight),
//!   both directions for undirected graphs, in CSR order
//! - `{path}_meta.parquet`: a single row of (`num_nodes`, directed)
//!
//! Reading rebuilds the CSR arrays directly from the stored arcs, so a
//! round-trip reproduces the same graph including isolated trailing vertices.
//!
//! Encoding and file access run on tokio's blocking pool, so awaiting a
//! read or write never stalls a runtime worker.

use super::builder::{assemble, transpose};
use super::CsrGraph;
use anyhow::{bail, Context, Result};
use arrow::array::{BooleanArray, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use super::csr::Weight;

impl CsrGraph {
    /// Write graph to Parquet files
    ///
    /// Creates two files:
    /// - `{path}_edges.parquet`: Arc list (source, target, weight)
    /// - `{path}_meta.parquet`: Vertex count and directedness
    ///
    /// # Errors
    ///
    /// Returns error if file I/O fails or Arrow conversion fails
    pub async fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let base_path = path.as_ref().to_path_buf();
        let graph = self.clone();

        tokio::task::spawn_blocking(move || graph.write_parquet_blocking(&base_path))
            .await
            .context("Parquet writer task failed")?
    }

    /// Read graph from Parquet files
    ///
    /// # Errors
    ///
    /// Returns error if files don't exist, Arrow conversion fails, or an arc
    /// endpoint lies outside the stored vertex count
    pub async fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || Self::read_parquet_blocking(&base_path))
            .await
            .context("Parquet reader task failed")?
    }

    fn write_parquet_blocking(&self, base_path: &Path) -> Result<()> {
        self.write_edges_parquet(base_path)?;
        self.write_meta_parquet(base_path)?;

        tracing::debug!(
            path = %base_path.display(),
            arcs = self.num_edges_directed(),
            "wrote graph to parquet"
        );
        Ok(())
    }

    fn read_parquet_blocking(base_path: &Path) -> Result<Self> {
        let (num_nodes, directed) = Self::read_meta_parquet(base_path)?;
        let arcs = Self::read_edges_parquet(base_path)?;

        if let Some(&(src, dst, _)) = arcs
            .iter()
            .find(|(src, dst, _)| (*src as usize) >= num_nodes || (*dst as usize) >= num_nodes)
        {
            bail!("arc {src} -> {dst} out of bounds for {num_nodes} vertices");
        }

        let forward = assemble(num_nodes, &arcs, false);
        let reverse = directed.then(|| transpose(&forward));

        tracing::debug!(
            path = %base_path.display(),
            num_nodes,
            arcs = arcs.len(),
            "read graph from parquet"
        );
        Ok(Self::from_adjacency(num_nodes, directed, forward, reverse))
    }

    fn write_edges_parquet(&self, base_path: &Path) -> Result<()> {
        let edges_path = format!("{}_edges.parquet", base_path.display());

        let (offsets, targets, weights) = self.csr_components();
        let mut sources = Vec::with_capacity(targets.len());
        for u in 0..self.num_nodes() {
            #[allow(clippy::cast_possible_truncation)] // ids fit u32 by construction
            let src = u as u32;
            sources.extend(std::iter::repeat(src).take(offsets[u + 1] - offsets[u]));
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("source", DataType::UInt32, false),
            Field::new("target", DataType::UInt32, false),
            Field::new("weight", DataType::UInt32, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(UInt32Array::from(sources)),
                Arc::new(UInt32Array::from(targets.to_vec())),
                Arc::new(UInt32Array::from(weights.to_vec())),
            ],
        )
        .context("Failed to create RecordBatch")?;

        write_batch(&edges_path, schema, &batch)
    }

    fn write_meta_parquet(&self, base_path: &Path) -> Result<()> {
        let meta_path = format!("{}_meta.parquet", base_path.display());

        let schema = Arc::new(Schema::new(vec![
            Field::new("num_nodes", DataType::UInt64, false),
            Field::new("directed", DataType::Boolean, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(UInt64Array::from(vec![self.num_nodes() as u64])),
                Arc::new(BooleanArray::from(vec![self.is_directed()])),
            ],
        )
        .context("Failed to create meta RecordBatch")?;

        write_batch(&meta_path, schema, &batch)
    }

    fn read_edges_parquet(base_path: &Path) -> Result<Vec<(u32, u32, Weight)>> {
        let edges_path = format!("{}_edges.parquet", base_path.display());

        let file =
            File::open(&edges_path).with_context(|| format!("Failed to open {edges_path}"))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut arcs = Vec::new();

        for batch_result in reader {
            let batch: RecordBatch = batch_result?;

            let sources = batch
                .column(0)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid source column type")?;

            let targets = batch
                .column(1)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid target column type")?;

            let weights = batch
                .column(2)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid weight column type")?;

            for i in 0..batch.num_rows() {
                arcs.push((sources.value(i), targets.value(i), weights.value(i)));
            }
        }

        Ok(arcs)
    }

    fn read_meta_parquet(base_path: &Path) -> Result<(usize, bool)> {
        let meta_path = format!("{}_meta.parquet", base_path.display());

        let file = File::open(&meta_path).with_context(|| format!("Failed to open {meta_path}"))?;

        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batch = reader
            .next()
            .context("Meta file holds no rows")?
            .context("Failed to decode meta RecordBatch")?;
        if batch.num_rows() != 1 {
            bail!("Meta file must hold exactly one row, found {}", batch.num_rows());
        }

        let num_nodes = batch
            .column(0)
            .as_any()
            .downcast_ref::<UInt64Array>()
            .context("Invalid num_nodes column type")?
            .value(0);
        let directed = batch
            .column(1)
            .as_any()
            .downcast_ref::<BooleanArray>()
            .context("Invalid directed column type")?
            .value(0);

        let num_nodes = usize::try_from(num_nodes).context("Vertex count exceeds usize")?;
        if u32::try_from(num_nodes).is_err() {
            bail!("{num_nodes} vertices exceed the u32 id space");
        }
        Ok((num_nodes, directed))
    }
}

fn write_batch(path: &str, schema: Arc<Schema>, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3)?,
        ))
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    Ok(())
}
