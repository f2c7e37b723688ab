//! End-to-end specifications for the ranking and report-regeneration
//! pipeline: every mutation is followed by a full rebuild of the per-domain
//! artifacts, and the artifacts always reflect the live candidate set.

mod common {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use candidate_tracker::tracker::{
        CandidateDraft, CandidateId, CandidateRecord, CandidateService, CandidateStore, StoreError,
    };

    #[derive(Default)]
    pub(super) struct MemoryStore {
        records: Mutex<Vec<CandidateRecord>>,
        sequence: AtomicU64,
    }

    impl CandidateStore for MemoryStore {
        fn insert(&self, draft: CandidateDraft) -> Result<CandidateId, StoreError> {
            let id = CandidateId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
            let record = CandidateRecord::from_draft(id, Utc::now(), draft);
            self.records.lock().expect("store mutex").push(record);
            Ok(id)
        }

        fn delete(&self, ids: &[CandidateId]) -> Result<usize, StoreError> {
            let mut records = self.records.lock().expect("store mutex");
            let before = records.len();
            records.retain(|record| !ids.contains(&record.id));
            Ok(before - records.len())
        }

        fn scan_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
            Ok(self.records.lock().expect("store mutex").clone())
        }
    }

    pub(super) fn draft(name: &str, domain: &str, final_score: f64) -> CandidateDraft {
        CandidateDraft {
            name: Some(name.to_string()),
            university: Some("State Tech".to_string()),
            cgpa: Some(8.1),
            domain: Some(domain.to_string()),
            experience: Some("2 years".to_string()),
            test_score: Some(final_score / 2.0),
            weighted_test: Some(final_score / 4.0),
            avg_interview_raw: Some(final_score / 2.0),
            avg_interview_weighted: Some(final_score / 4.0),
            final_score: Some(final_score),
            remarks: Some("panel notes".to_string()),
        }
    }

    pub(super) fn build_service(
        dir: &tempfile::TempDir,
    ) -> (Arc<CandidateService<MemoryStore>>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let service = Arc::new(CandidateService::new(store.clone(), dir.path()));
        (service, store)
    }

    /// The data rows of an artifact, header stripped.
    pub(super) fn artifact_rows(dir: &tempfile::TempDir, file_name: &str) -> Vec<String> {
        let contents =
            std::fs::read_to_string(dir.path().join(file_name)).expect("artifact readable");
        contents.lines().skip(1).map(str::to_string).collect()
    }

    pub(super) fn tier_of(row: &str) -> String {
        row.rsplit(',').next().expect("row has columns").to_string()
    }
}

mod scenarios {
    use super::common::*;

    #[test]
    fn three_rf_candidates_split_across_all_tiers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        service.submit(draft("Asha", "RF", 90.0)).expect("submit");
        service.submit(draft("Birk", "RF", 80.0)).expect("submit");
        service.submit(draft("Chen", "RF", 70.0)).expect("submit");

        let rows = artifact_rows(&dir, "RF.csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(tier_of(&rows[0]), "Recommended");
        assert_eq!(tier_of(&rows[1]), "Stand By");
        assert_eq!(tier_of(&rows[2]), "Not Recommended");
        assert!(rows[0].contains("Asha"));
        assert!(rows[2].contains("Chen"));
    }

    #[test]
    fn four_way_tie_keeps_insertion_order_and_skips_the_bottom_tier() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        for name in ["Dana", "Emil", "Fern", "Gita"] {
            service.submit(draft(name, "FPGA", 10.0)).expect("submit");
        }

        let rows = artifact_rows(&dir, "FPGA.csv");
        assert_eq!(rows.len(), 4);
        let names: Vec<&str> = rows
            .iter()
            .map(|row| row.split(',').nth(1).expect("name column"))
            .collect();
        assert_eq!(names, ["Dana", "Emil", "Fern", "Gita"]);
        let tiers: Vec<String> = rows.iter().map(|row| tier_of(row)).collect();
        assert_eq!(tiers, ["Recommended", "Recommended", "Stand By", "Stand By"]);
    }

    #[test]
    fn deleting_every_candidate_in_a_domain_removes_its_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        let first = service.submit(draft("Asha", "RTOS", 55.0)).expect("submit");
        let second = service.submit(draft("Birk", "RTOS", 45.0)).expect("submit");
        assert!(dir.path().join("RTOS.csv").exists());

        let removed = service.remove(&[first, second]).expect("remove");
        assert_eq!(removed, 2);
        assert!(!dir.path().join("RTOS.csv").exists());
    }

    #[test]
    fn unknown_domains_never_produce_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        service
            .submit(draft("Hale", "QUANTUM", 99.9))
            .expect("submit");
        service.submit(draft("Ines", "RF", 60.0)).expect("submit");

        assert!(!dir.path().join("QUANTUM.csv").exists());
        let rows = artifact_rows(&dir, "RF.csv");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Ines"));
    }
}

mod regeneration {
    use super::common::*;
    use candidate_tracker::tracker::CandidateDraft;

    #[test]
    fn back_to_back_passes_are_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        service.submit(draft("Asha", "RF", 90.0)).expect("submit");
        service.submit(draft("Birk", "RF", 90.0)).expect("submit");
        service
            .submit(draft("Chen", "WIRELESS", 70.0))
            .expect("submit");

        service.regenerate_reports().expect("first pass");
        let first_rf = std::fs::read(dir.path().join("RF.csv")).expect("read RF");
        let first_wireless =
            std::fs::read(dir.path().join("WIRELESS.csv")).expect("read WIRELESS");

        service.regenerate_reports().expect("second pass");
        assert_eq!(
            std::fs::read(dir.path().join("RF.csv")).expect("read RF"),
            first_rf
        );
        assert_eq!(
            std::fs::read(dir.path().join("WIRELESS.csv")).expect("read WIRELESS"),
            first_wireless
        );
    }

    #[test]
    fn stale_artifacts_are_cleared_by_the_next_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        // an artifact for a spelling no longer in use, left by an older run
        std::fs::write(dir.path().join("SYSTEMS.csv"), "orphaned").expect("seed orphan");
        service.submit(draft("Asha", "EMBEDDED", 50.0)).expect("submit");

        assert!(!dir.path().join("SYSTEMS.csv").exists());
        assert!(dir.path().join("EMBEDDED.csv").exists());
    }

    #[test]
    fn empty_delete_is_a_noop_that_still_leaves_reports_fresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        service.submit(draft("Asha", "RF", 90.0)).expect("submit");
        let removed = service.remove(&[]).expect("noop remove");

        assert_eq!(removed, 0);
        let rows = artifact_rows(&dir, "RF.csv");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn candidates_missing_score_rank_at_the_bottom_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        service
            .submit(CandidateDraft {
                name: Some("Jory".to_string()),
                domain: Some("RF".to_string()),
                ..CandidateDraft::default()
            })
            .expect("submit");
        service.submit(draft("Kaia", "RF", 5.0)).expect("submit");

        let rows = artifact_rows(&dir, "RF.csv");
        assert!(rows[0].contains("Kaia"));
        assert!(rows[1].contains("Jory"));
        // normalized score is exported, not the stored absence
        let score_column: Vec<&str> = rows[1].split(',').collect();
        assert_eq!(score_column[10], "0");
    }

    #[test]
    fn every_known_domain_gets_exactly_one_artifact_when_populated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, _) = build_service(&dir);

        for (index, domain) in candidate_tracker::tracker::KNOWN_DOMAINS.iter().enumerate() {
            service
                .submit(draft(&format!("cand-{index}"), domain, 40.0 + index as f64))
                .expect("submit");
        }

        let mut artifacts: Vec<String> = std::fs::read_dir(dir.path())
            .expect("list dir")
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        artifacts.sort();

        let mut expected: Vec<String> = candidate_tracker::tracker::KNOWN_DOMAINS
            .iter()
            .map(|domain| candidate_tracker::tracker::artifact_file_name(domain))
            .collect();
        expected.sort();

        assert_eq!(artifacts, expected);
    }
}
