use crate::data::BomboData;
use crate::formatting::round_half_away;
use crate::metrics::DashboardMetrics;
use crate::write_output_file;
use anyhow::{Context, Result};
use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
struct SeriesRecord<'a> {
    month: &'a str,
    mau: u32,
    dau: u32,
    new_users: u32,
    gtv: f64,
    stickiness: f64,
    gtv_growth: Option<f64>,
}

/// Writes the monthly series as CSV, or as `.csv.gz` when `archive` is set.
/// Returns the path actually written.
pub async fn save_series_csv(
    path: &Path,
    data: &BomboData,
    metrics: &DashboardMetrics,
    archive: bool,
) -> Result<PathBuf> {
    let serialized = serialize_series(data, metrics)?;
    let (target, bytes) = if archive {
        (archive_path(path), gzip_bytes(&serialized)?)
    } else {
        (path.to_path_buf(), serialized)
    };
    write_output_file(&target, &bytes).await?;
    info!(path = %target.display(), rows = data.monthly.len(), archive, "wrote monthly series");
    Ok(target)
}

pub async fn save_json(path: &Path, data: &BomboData) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(data).context("failed to serialize data table")?;
    write_output_file(path, &bytes).await?;
    info!(path = %path.display(), "wrote data table");
    Ok(())
}

pub fn serialize_series(data: &BomboData, metrics: &DashboardMetrics) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    for (idx, point) in data.monthly.iter().enumerate() {
        let record = SeriesRecord {
            month: point.month,
            mau: point.mau,
            dau: point.dau,
            new_users: point.new_users,
            gtv: point.gtv,
            stickiness: round_half_away(metrics.stickiness.get(idx).copied().unwrap_or_default(), 2),
            gtv_growth: metrics
                .gtv_growth
                .get(idx)
                .copied()
                .flatten()
                .map(|value| round_half_away(value, 2)),
        };
        writer
            .serialize(record)
            .context("failed to serialize monthly record")?;
    }
    finalize_writer(writer, "monthly series writer")
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .context("failed to compress CSV output")?;
    encoder.finish().context("failed to finish gzip stream")
}

/// `metrics.csv` becomes `metrics.csv.gz`; a path already ending in `.gz` is kept.
#[must_use]
pub fn archive_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz")) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bombo_data;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn series_csv_has_header_and_one_row_per_month() {
        let data = bombo_data();
        let metrics = DashboardMetrics::from_data(data);
        let bytes = serialize_series(data, &metrics).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("month,mau,dau,new_users,gtv,stickiness,gtv_growth")
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), data.monthly.len());
        assert!(rows[0].starts_with("2024-07,69601,16704,29503,"));
        assert!(rows[0].ends_with(','), "first month has no growth: {}", rows[0]);
        assert!(rows[11].ends_with(",25.3"), "{}", rows[11]);
    }

    #[test]
    fn archive_path_appends_gz_once() {
        assert_eq!(
            archive_path(Path::new("out/metrics.csv")),
            PathBuf::from("out/metrics.csv.gz")
        );
        assert_eq!(
            archive_path(Path::new("out/metrics.csv.gz")),
            PathBuf::from("out/metrics.csv.gz")
        );
    }

    #[test]
    fn gzip_round_trips() {
        let compressed = gzip_bytes(b"month,mau\n2025-06,316369\n").expect("gzip");
        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .expect("gunzip");
        assert_eq!(decoded, "month,mau\n2025-06,316369\n");
    }

    #[tokio::test]
    async fn saves_archive_and_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = bombo_data();
        let metrics = DashboardMetrics::from_data(data);

        let written = save_series_csv(&dir.path().join("series.csv"), data, &metrics, true)
            .await
            .expect("save csv");
        assert_eq!(written, dir.path().join("series.csv.gz"));
        assert!(written.exists());

        let json_path = dir.path().join("nested").join("data.json");
        save_json(&json_path, data).await.expect("save json");
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&json_path).expect("read json")).expect("parse");
        assert_eq!(value["key_metrics"]["total_users"], 801_492);
        assert_eq!(value["monthly"].as_array().map(Vec::len), Some(12));
    }
}
