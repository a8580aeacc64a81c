//! Library-level generation tests that need no pdfium.

mod common;

use common::{document_xml, media_names, xlsx_with_rows};
use edgequake_report::{
    generate_report, generate_to_file, ErrorCategory, ReportConfig, ReportError, ReportRequest,
    MAX_COORDINATES,
};

#[tokio::test]
async fn writes_report_atomically_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/out/report.docx");
    let request = ReportRequest {
        coordinates: Some("[[1, 1], [2, 3]]".into()),
        ..Default::default()
    };

    let report = generate_to_file(request, &out, &ReportConfig::default())
        .await
        .unwrap();

    let written = std::fs::read(&out).unwrap();
    assert_eq!(written, report.docx);
    assert!(!out.with_extension("docx.tmp").exists());
}

#[tokio::test]
async fn failed_generation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.docx");
    let request = ReportRequest {
        coordinates: Some("[]".into()),
        ..Default::default()
    };

    let err = generate_to_file(request, &out, &ReportConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidCoordinateInput);
    assert!(!out.exists());
}

#[tokio::test]
async fn spreadsheet_rows_are_capped_at_ten() {
    let rows: Vec<(f64, f64)> = (0..25).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
    let request = ReportRequest {
        spreadsheet: Some(xlsx_with_rows(&rows)),
        ..Default::default()
    };

    let report = generate_report(request, &ReportConfig::default()).await.unwrap();
    assert_eq!(report.coordinates.len(), MAX_COORDINATES);
    let trend = report.trend.unwrap();
    assert!((trend.slope - 2.0).abs() < 1e-9);
    assert!((trend.intercept - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn single_point_report_has_no_trend() {
    let request = ReportRequest {
        coordinates: Some("[[5, 5]]".into()),
        description: Some("   ".into()),
        ..Default::default()
    };
    let report = generate_report(request, &ReportConfig::default()).await.unwrap();
    assert!(report.trend.is_none());
    assert_eq!(media_names(&report.docx).len(), 1);
    assert!(document_xml(&report.docx).contains(">Description of the work<"));
}

#[tokio::test]
async fn oversized_pdf_is_rejected_before_pdfium() {
    let config = ReportConfig::builder()
        .max_document_bytes(1024)
        .pdfium_lib_path("/nonexistent/libpdfium.so")
        .build()
        .unwrap();
    let request = ReportRequest {
        coordinates: Some("[[0, 1]]".into()),
        document: Some(vec![b'%'; 4096]),
        ..Default::default()
    };
    let err = generate_report(request, &config).await.unwrap_err();
    assert!(matches!(err, ReportError::ResourceExhausted { .. }), "got: {err:?}");
}
