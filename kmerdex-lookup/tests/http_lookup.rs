//! Lookups against a mocked HTTP document index

use kmerdex_core::config::IndexConfig;
use kmerdex_core::{IndexName, PartitionName, SampleId};
use kmerdex_lookup::{
    ErrorEnvelope, ErrorKind, HttpIndex, IndexAdmin, LookupService, SampleScope, TransportError,
};
use kmerdex_partition::{AssignmentTable, Router};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> IndexConfig {
    IndexConfig {
        url: server.uri(),
        timeout_secs: 2,
        connect_timeout_secs: 1,
        ..IndexConfig::default()
    }
}

fn round_robin_router() -> Arc<Router> {
    let pairs = kmerdex_test::round_robin_assignment(7, 4);
    Arc::new(Router::new(AssignmentTable::from_pairs(pairs).unwrap()))
}

fn service(server: &MockServer) -> LookupService<HttpIndex> {
    LookupService::new(round_robin_router(), HttpIndex::new(&config(server)).unwrap())
}

#[tokio::test]
async fn test_single_lookup_over_http() {
    kmerdex_test::init_test_logging();
    let server = MockServer::start().await;
    let service = service(&server);
    let kmer = kmerdex_test::generate_kmers(1, 31, 3).remove(0);
    let index = service.router().index_for(&kmer).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("/{}/kmer/{}", index, kmer)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": index.as_str(),
            "_id": kmer,
            "found": true,
            "_source": {"count": 2, "samples": ["00000005-12", "00000006-1"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hits = service
        .lookup_single(&kmer, &SampleScope::new([SampleId(5)]))
        .await
        .unwrap();
    assert!(hits.found);
    assert_eq!(hits.results.len(), 1);
    assert_eq!(hits.results[0].sample_id, SampleId(5));
    assert_eq!(hits.results[0].count, 12);
}

#[tokio::test]
async fn test_missing_document_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"found": false})))
        .mount(&server)
        .await;

    let hits = service(&server)
        .lookup_single(&"A".repeat(31), &SampleScope::new([SampleId(1)]))
        .await
        .unwrap();
    assert!(!hits.found);
    assert!(hits.results.is_empty());
}

#[tokio::test]
async fn test_missing_scope_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server)
        .lookup_single(&"A".repeat(31), &SampleScope::default())
        .await
        .unwrap_err();
    let envelope = ErrorEnvelope::from(err);
    assert_eq!(envelope.has_errors, ErrorKind::MissingSamples);
}

#[tokio::test]
async fn test_batch_sends_flat_deduplicated_ids() {
    let server = MockServer::start().await;
    let service = service(&server);
    let partition = PartitionName::new("P0");
    let index = service.router().index_name(&partition);

    Mock::given(method("POST"))
        .and(path(format!("/{}/kmer/_mget", index)))
        .and(body_json(json!({"ids": ["AAAA", "CCCC"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": [
            {"_id": "AAAA", "found": true, "_source": {"count": 1, "samples": ["00000003-9"]}},
            {"_id": "CCCC", "found": false}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let rows = service
        .lookup_batch(&partition, ["aaaa", "CCCC", "AAAA"], &SampleScope::new([SampleId(3)]))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kmer, "AAAA");
    assert_eq!(rows[0].count, 9);
}

/// Every string a sequence lookup routes, forward and reverse complement
fn routed_strings(sequence: &str, k: usize) -> Vec<String> {
    let mut strings = Vec::new();
    for start in 0..=(sequence.len() - k) {
        let kmer = &sequence[start..start + k];
        strings.push(kmer.to_string());
        strings.push(kmerdex_bio::reverse_complement(kmer).unwrap());
    }
    strings
}

#[tokio::test]
async fn test_sequence_fan_out_with_failed_partition() {
    let server = MockServer::start().await;
    let router = round_robin_router();
    let sequence = "ACGT".repeat(10);
    let strings = routed_strings(&sequence, 31);
    assert_eq!(strings.len(), 20);

    let indices: BTreeSet<IndexName> = strings
        .iter()
        .map(|s| router.index_for(s).unwrap())
        .collect();
    let failing = indices.iter().next().unwrap().clone();

    for index in &indices {
        let template = if *index == failing {
            ResponseTemplate::new(503)
        } else {
            ResponseTemplate::new(200).set_body_json(json!({"docs": []}))
        };
        Mock::given(method("POST"))
            .and(path(format!("/{}/kmer/_mget", index)))
            .respond_with(template)
            .expect(1)
            .mount(&server)
            .await;
    }

    let service = LookupService::new(router, HttpIndex::new(&config(&server)).unwrap());
    let lookup = service
        .lookup_sequence(&sequence, &SampleScope::new([SampleId(5)]))
        .await
        .unwrap();

    assert_eq!(lookup.kmers_considered, 10);
    assert_eq!(lookup.strings_considered, 20);
    assert_eq!(lookup.partitions_queried, indices.len());
    assert_eq!(lookup.partitions_answered(), indices.len() - 1);
    assert_eq!(lookup.failed_partitions.len(), 1);
    assert_eq!(lookup.failed_partitions[0].index, failing);
    assert!(matches!(
        lookup.failed_partitions[0].error,
        TransportError::Status { status: 503, .. }
    ));
    assert!(lookup.results.is_empty());
}

#[tokio::test]
async fn test_slow_partition_times_out_while_others_answer() {
    let server = MockServer::start().await;
    let router = round_robin_router();
    let sequence = "ACGT".repeat(10);
    let strings = routed_strings(&sequence, 31);

    let mut by_index: BTreeMap<IndexName, Vec<String>> = BTreeMap::new();
    for s in &strings {
        by_index
            .entry(router.index_for(s).unwrap())
            .or_default()
            .push(s.clone());
    }
    assert!(by_index.len() > 1);
    let slow = by_index.keys().next().unwrap().clone();

    for (index, routed) in &by_index {
        let template = if *index == slow {
            ResponseTemplate::new(200)
                .set_body_json(json!({"docs": []}))
                .set_delay(Duration::from_secs(3))
        } else {
            ResponseTemplate::new(200).set_body_json(json!({"docs": [
                {"_id": routed[0], "found": true, "_source": {"count": 1, "samples": ["00000005-4"]}}
            ]}))
        };
        Mock::given(method("POST"))
            .and(path(format!("/{}/kmer/_mget", index)))
            .respond_with(template)
            .mount(&server)
            .await;
    }

    let index = HttpIndex::new(&IndexConfig {
        timeout_secs: 1,
        ..config(&server)
    })
    .unwrap();
    let service = LookupService::new(router, index);
    let lookup = service
        .lookup_sequence(&sequence, &SampleScope::new([SampleId(5)]))
        .await
        .unwrap();

    assert!(lookup.is_partial());
    assert_eq!(lookup.partitions_queried, by_index.len());
    assert_eq!(lookup.partitions_answered(), by_index.len() - 1);
    assert_eq!(lookup.failed_partitions.len(), 1);
    assert_eq!(lookup.failed_partitions[0].index, slow);
    assert!(matches!(
        lookup.failed_partitions[0].error,
        TransportError::Timeout { .. }
    ));
    assert_eq!(lookup.results.len(), by_index.len() - 1);
    assert!(lookup.results.iter().all(|hit| hit.count == 4));
}

#[tokio::test]
async fn test_create_partition_indices_continues_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/kmer_p0"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/kmer_p1"))
        .and(body_json(json!({
            "settings": {"number_of_shards": 5, "number_of_replicas": 1},
            "mappings": {"kmer": {"properties": {
                "count": {"type": "long"},
                "samples": {"type": "keyword"}
            }}},
            "aliases": {"kmers": {}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    let admin = IndexAdmin::new(&config(&server)).unwrap();
    let outcomes = admin
        .create_partition_indices(&[IndexName::new("kmer_p0"), IndexName::new("kmer_p1")])
        .await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].1.is_err());
    assert!(outcomes[1].1.is_ok());
}
