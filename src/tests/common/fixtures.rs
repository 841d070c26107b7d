//! Response fixtures for the analysis backend.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::config::{ApiConfig, UploadConfig};
use crate::core::api::{HttpDocumentClient, ProgressFn};

/// A client pointed at `base` with small upload slices so progress is
/// reported in several steps.
pub fn client_for(base: &str) -> HttpDocumentClient {
    let api = ApiConfig {
        base_url: base.to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    let upload = UploadConfig {
        chunk_size: 256,
        ..UploadConfig::default()
    };
    HttpDocumentClient::new(&api, &upload).expect("test client")
}

/// A progress callback that records every report.
pub fn recording_progress() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProgressFn = Arc::new(move |p| sink.lock().unwrap().push(p));
    (callback, seen)
}

pub fn summary_json(id: &str, filename: &str) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "upload_date": "2024-03-05T14:30:00.123456",
        "status": "processed"
    })
}

/// `GET /documents` body with `count` entries and the given grand total.
pub fn list_page_json(prefix: &str, count: usize, total: u64) -> Value {
    let data: Vec<Value> = (0..count)
        .map(|i| summary_json(&format!("{prefix}{i}"), &format!("{prefix}{i}.pdf")))
        .collect();
    json!({
        "data": data,
        "pagination": { "total": total, "page": 1, "limit": 10 }
    })
}

/// A fully analysed document.
pub fn analysed_document_json(id: &str) -> Value {
    json!({
        "id": id,
        "filename": "master-services.pdf",
        "upload_date": "2024-03-05T14:30:00",
        "text": "THIS MASTER SERVICES AGREEMENT is entered into...",
        "analysis": {
            "summary": "A services agreement between Acme and Globex.",
            "risks": [
                { "category": "Liability", "severity": "high", "description": "Uncapped indemnity" },
                { "category": "Liability", "severity": "medium", "description": "Broad warranty" },
                { "category": "Termination", "severity": "low", "description": "30 day notice" }
            ],
            "entities": {
                "parties": ["Acme Corp", "Globex Inc"],
                "dates": ["2024-01-01"],
                "amounts": [50000]
            }
        }
    })
}

/// A document whose processing failed: no text, no analysis.
pub fn failed_document_json(id: &str) -> Value {
    json!({
        "id": id,
        "filename": "scan.pdf",
        "upload_date": "2024-03-05T14:30:00",
        "status": "failed"
    })
}
