//! Tamper-evident, hash-linked audit log. `.tlog` is plain JSON-lines;
//! `.ztlog` is the same stream Snappy-framed, detected by its 10-byte
//! stream-identifier header.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use uuid::Uuid;

/// The Snappy framing format's stream identifier chunk: type `0xff`,
/// 3-byte little-endian length `6`, payload `sNaPpY`.
pub const SNAPPY_FRAMED_HEADER: [u8; 10] = *b"\xff\x06\x00\x00sNaPpY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event: String,
    #[serde(default)]
    pub invocation_id: Option<Uuid>,
    #[serde(default)]
    pub invoker_id: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub basis: Option<Value>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub input_args: Option<Value>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub prev_hash: String,
    #[serde(default)]
    pub hash: String,
}

impl AuditRecord {
    pub fn new(event: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            event: event.into(),
            invocation_id: None,
            invoker_id: None,
            decision: None,
            basis: None,
            skill: None,
            input_args: None,
            view: None,
            actions: None,
            status: None,
            timestamp,
            prev_hash: String::new(),
            hash: String::new(),
        }
    }
}

pub struct AuditLog {
    session_id: Uuid,
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new(session_id: Uuid) -> Self {
        Self { session_id, records: Vec::new() }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Append a record, chaining it to the previous record's hash.
    pub fn append(&mut self, mut record: AuditRecord) -> &AuditRecord {
        record.prev_hash = self.records.last().map(|r| r.hash.clone()).unwrap_or_else(|| "0".repeat(64));
        record.hash.clear();
        record.hash = link_hash(&record);
        self.records.push(record);
        self.records.last().expect("just pushed")
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Each record's `prev_hash` must match the prior record's `hash`, and
    /// its own `hash` must reproduce from its content — tampering with any
    /// field invalidates every subsequent record.
    pub fn verify_chain(&self) -> bool {
        let mut expected_prev = "0".repeat(64);
        for record in &self.records {
            if record.prev_hash != expected_prev {
                return false;
            }
            if link_hash(record) != record.hash {
                return false;
            }
            expected_prev = record.hash.clone();
        }
        true
    }

    pub fn to_plain_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for record in &self.records {
            serde_json::to_writer(&mut out, record).expect("AuditRecord always serializes");
            out.push(b'\n');
        }
        out
    }

    pub fn to_ztlog_bytes(&self) -> std::io::Result<Vec<u8>> {
        let plain = self.to_plain_bytes();
        let mut out = Vec::new();
        {
            let mut writer = snap::write::FrameEncoder::new(&mut out);
            writer.write_all(&plain)?;
            writer.flush()?;
        }
        Ok(out)
    }
}

fn link_hash(record: &AuditRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.event.as_bytes());
    if let Some(id) = record.invocation_id {
        hasher.update(id.as_bytes());
    }
    if let Some(status) = &record.status {
        hasher.update(status.as_bytes());
    }
    if let Some(decision) = &record.decision {
        hasher.update(decision.as_bytes());
    }
    hasher.update(record.timestamp.to_rfc3339().as_bytes());
    hex::encode(hasher.finalize())
}

/// Decode a log file's bytes: a fully-present 10-byte Snappy header
/// triggers stream decompression; anything else — including a truncated
/// header — is treated as plain JSON-lines.
pub fn decode_log(bytes: &[u8]) -> std::io::Result<Vec<AuditRecord>> {
    let body = if bytes.len() >= SNAPPY_FRAMED_HEADER.len() && bytes[..10] == SNAPPY_FRAMED_HEADER {
        let mut reader = snap::read::FrameDecoder::new(bytes);
        let mut decompressed = Vec::new();
        reader.read_to_end(&mut decompressed)?;
        decompressed
    } else {
        bytes.to_vec()
    };
    Ok(body
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_slice(line).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event: &str) -> AuditRecord {
        AuditRecord::new(event, DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().into())
    }

    #[test]
    fn chain_links_successive_records() {
        let mut log = AuditLog::new(Uuid::new_v4());
        log.append(record("session_created"));
        log.append(record("skill_end"));
        assert!(log.verify_chain());
        assert_eq!(log.records()[1].prev_hash, log.records()[0].hash);
    }

    #[test]
    fn tampering_breaks_the_chain() {
        let mut log = AuditLog::new(Uuid::new_v4());
        log.append(record("session_created"));
        log.append(record("skill_end"));
        log.records[0].event = "tampered".to_string();
        assert!(!log.verify_chain());
    }

    #[test]
    fn ztlog_round_trips_through_plain_decode() {
        let mut log = AuditLog::new(Uuid::new_v4());
        log.append(record("session_created"));
        log.append(record("skill_end"));
        let bytes = log.to_ztlog_bytes().unwrap();
        assert_eq!(&bytes[..10], &SNAPPY_FRAMED_HEADER);
        let decoded = decode_log(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].event, "session_created");
        assert_eq!(decoded[1].event, "skill_end");
    }

    #[test]
    fn plain_bytes_decode_without_header() {
        let mut log = AuditLog::new(Uuid::new_v4());
        log.append(record("session_created"));
        let decoded = decode_log(&log.to_plain_bytes()).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn truncated_snappy_header_falls_back_to_plain() {
        let mut log = AuditLog::new(Uuid::new_v4());
        log.append(record("first"));
        log.append(record("second"));
        // Only the first 4 bytes of the 10-byte header, then plain lines —
        // corrupts the first line but the fallback still recovers the rest.
        let mut bytes = SNAPPY_FRAMED_HEADER[..4].to_vec();
        bytes.extend_from_slice(&log.to_plain_bytes());
        let decoded = decode_log(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].event, "second");
    }
}
