use async_trait::async_trait;
use panel_application::synthesis_engine::META_REVIEWER_INSTRUCTIONS;
use panel_application::{
    REVIEW_METADATA_KEY, ReviewOrchestrator, ReviewUseCase, SynthesisEngine, relocate_excerpts,
};
use panel_core::config::ReviewConfig;
use panel_core::notification::{Notice, Notifier, SilentNotifier};
use panel_core::persona::{FolderMappings, Persona, PersonaStore};
use panel_core::review::{Comment, NO_FEEDBACK_SYNTHESIS, SYNTHESIS_FAILED};
use panel_core::storage::DocumentStorage;
use panel_core::{GenerationBackend, GenerationError, GenerationResponse, PanelError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DOCUMENT: &str = "This is the specific quote and the second quote here.";

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Clone)]
enum Script {
    Reply { delay_ms: u64, text: &'static str },
    Fail,
    Panic,
}

/// Answers according to a marker found in the system instructions.
struct ScriptedBackend {
    personas: Vec<(&'static str, Script)>,
    synthesis: Script,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(personas: Vec<(&'static str, Script)>, synthesis: Script) -> Arc<Self> {
        Arc::new(Self {
            personas,
            synthesis,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn synthesis_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.as_str() == "synthesis")
            .count()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _prompt: &str,
        system_instructions: &str,
    ) -> std::result::Result<GenerationResponse, GenerationError> {
        let (label, script) = if system_instructions == META_REVIEWER_INSTRUCTIONS {
            ("synthesis", self.synthesis.clone())
        } else {
            self.personas
                .iter()
                .find(|(marker, _)| system_instructions.starts_with(marker))
                .map(|(marker, script)| (*marker, script.clone()))
                .expect("unscripted persona")
        };
        self.calls.lock().unwrap().push(label.to_string());

        match script {
            Script::Reply { delay_ms, text } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(GenerationResponse::text(text).with_usage(100, 20))
            }
            Script::Fail => Err(GenerationError::http(500, "upstream exploded", true)),
            Script::Panic => panic!("backend bug"),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
struct MemoryStorage {
    files: Mutex<BTreeMap<String, String>>,
    folders: Mutex<BTreeSet<String>>,
    metadata: Mutex<Vec<(String, String, String)>>,
    created_folders: Mutex<usize>,
}

impl MemoryStorage {
    fn with_file(path: &str, content: &str) -> Arc<Self> {
        let storage = Self::default();
        storage
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Arc::new(storage)
    }

    fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl DocumentStorage for MemoryStorage {
    async fn read(&self, path: &str) -> Result<String> {
        self.file(path)
            .ok_or_else(|| PanelError::not_found("document", path))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path)
            || self.folders.lock().unwrap().contains(path))
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        *self.created_folders.lock().unwrap() += 1;
        self.folders.lock().unwrap().insert(path.to_string());
        Ok(())
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn set_metadata_field(&self, path: &str, key: &str, value: &str) -> Result<()> {
        if self.file(path).is_none() {
            return Err(PanelError::not_found("document", path));
        }
        self.metadata
            .lock()
            .unwrap()
            .push((path.to_string(), key.to_string(), value.to_string()));
        Ok(())
    }
}

fn persona(id: &str, name: &str) -> Persona {
    // Instructions double as the script marker
    Persona::new(id, name, format!("[{id}]"))
}

fn config(personas: Vec<Persona>, mappings: FolderMappings) -> ReviewConfig {
    ReviewConfig {
        personas: PersonaStore::new(personas).unwrap(),
        folder_mappings: mappings,
        ..Default::default()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_comments_follow_resolution_order_not_completion_order() {
    let backend = ScriptedBackend::new(
        vec![
            ("[slow]", Script::Reply { delay_ms: 300, text: "- slow point" }),
            ("[fast]", Script::Reply { delay_ms: 10, text: "- fast one\n- fast two" }),
            ("[mid]", Script::Reply { delay_ms: 100, text: "* mid \"second quote\"" }),
        ],
        Script::Reply { delay_ms: 0, text: "  Summary.  \n" },
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let personas = vec![
        persona("slow", "Slow"),
        persona("fast", "Fast"),
        persona("mid", "Mid"),
    ];

    let outcome = ReviewOrchestrator::new(backend.clone(), notifier.clone())
        .review(DOCUMENT, &personas)
        .await;

    let order: Vec<_> = outcome
        .result
        .comments
        .iter()
        .map(|c| (c.persona_name.as_str(), c.text.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Slow", "slow point"),
            ("Fast", "fast one"),
            ("Fast", "fast two"),
            ("Mid", "mid \"second quote\""),
        ]
    );
    assert_eq!(outcome.result.comments[3].start, Some(35));
    assert_eq!(outcome.result.synthesis, "Summary.");
    assert!(outcome.failures.is_empty());
    assert!(notifier.notices().is_empty());
    assert_eq!(backend.synthesis_calls(), 1);
}

#[tokio::test]
async fn test_failing_persona_is_isolated_and_notified() {
    let backend = ScriptedBackend::new(
        vec![
            ("[logic]", Script::Reply { delay_ms: 0, text: "- Actionable feedback \"specific quote\"" }),
            ("[broken]", Script::Fail),
            ("[style]", Script::Reply { delay_ms: 0, text: "- Tighten" }),
        ],
        Script::Reply { delay_ms: 0, text: "Summary" },
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let personas = vec![
        persona("logic", "Logic Critic"),
        persona("broken", "Broken"),
        persona("style", "Style Editor"),
    ];

    let outcome = ReviewOrchestrator::new(backend, notifier.clone())
        .review(DOCUMENT, &personas)
        .await;

    assert_eq!(outcome.result.comments.len(), 2);
    assert_eq!(outcome.result.comments[0].start, Some(12));
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].persona_name, "Broken");
    assert_eq!(
        notifier.notices(),
        vec![Notice::PersonaFailed {
            persona_name: "Broken".to_string(),
            message: "upstream exploded".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_panicking_call_counts_as_persona_failure() {
    let backend = ScriptedBackend::new(
        vec![
            ("[ok]", Script::Reply { delay_ms: 0, text: "- fine" }),
            ("[boom]", Script::Panic),
        ],
        Script::Reply { delay_ms: 0, text: "Summary" },
    );
    let notifier = Arc::new(RecordingNotifier::default());

    let collected = ReviewOrchestrator::new(backend, notifier)
        .collect_feedback(DOCUMENT, &[persona("ok", "Ok"), persona("boom", "Boom")])
        .await;

    assert_eq!(collected.comments, vec![Comment::new("Ok", "fine")]);
    assert_eq!(collected.failures.len(), 1);
    assert_eq!(collected.failures[0].persona_name, "Boom");
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_persona_contributes_nothing() {
    let backend = ScriptedBackend::new(
        vec![
            ("[quick]", Script::Reply { delay_ms: 50, text: "- quick" }),
            ("[stuck]", Script::Reply { delay_ms: 60_000, text: "- too late" }),
        ],
        Script::Reply { delay_ms: 0, text: "Summary" },
    );
    let notifier = Arc::new(RecordingNotifier::default());

    let outcome = ReviewOrchestrator::new(backend, notifier.clone())
        .with_request_timeout(Some(Duration::from_secs(5)))
        .review(DOCUMENT, &[persona("quick", "Quick"), persona("stuck", "Stuck")])
        .await;

    assert_eq!(outcome.result.comments, vec![Comment::new("Quick", "quick")]);
    assert_eq!(
        outcome.failures[0].message,
        "Generation timed out after 5s"
    );
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test]
async fn test_no_comments_skips_synthesis_call() {
    let backend = ScriptedBackend::new(
        vec![("[quiet]", Script::Reply { delay_ms: 0, text: "\n  \n-\n" })],
        Script::Fail,
    );

    let outcome = ReviewOrchestrator::new(backend.clone(), Arc::new(RecordingNotifier::default()))
        .review(DOCUMENT, &[persona("quiet", "Quiet")])
        .await;

    assert!(outcome.result.comments.is_empty());
    assert_eq!(outcome.result.synthesis, NO_FEEDBACK_SYNTHESIS);
    assert_eq!(backend.synthesis_calls(), 0);
}

#[tokio::test]
async fn test_failed_synthesis_keeps_comments() {
    let backend = ScriptedBackend::new(
        vec![("[logic]", Script::Reply { delay_ms: 0, text: "- point" })],
        Script::Fail,
    );

    let comments = vec![Comment::new("Logic Critic", "point")];
    let synthesis = SynthesisEngine::new(backend.clone())
        .synthesize(&comments)
        .await;
    assert_eq!(synthesis, SYNTHESIS_FAILED);

    let outcome = ReviewOrchestrator::new(backend, Arc::new(SilentNotifier))
        .review(DOCUMENT, &[persona("logic", "Logic Critic")])
        .await;
    assert_eq!(outcome.result.synthesis, SYNTHESIS_FAILED);
    assert_eq!(outcome.result.comments, comments);
}

// ============================================================================
// Use case
// ============================================================================

#[tokio::test]
async fn test_review_document_writes_artifact_and_link() {
    let backend = ScriptedBackend::new(
        vec![
            ("[logic]", Script::Reply { delay_ms: 0, text: "- Actionable feedback \"specific quote\"" }),
            ("[style]", Script::Reply { delay_ms: 0, text: "* Another point \"SECOND QUOTE\"" }),
            ("[legal]", Script::Fail),
        ],
        Script::Reply { delay_ms: 0, text: "## Bottom Line Up Front\nSolid draft." },
    );
    let storage = MemoryStorage::with_file("work/Plan.md", DOCUMENT);
    let notifier = Arc::new(RecordingNotifier::default());
    let usecase = ReviewUseCase::new(
        config(
            vec![
                persona("logic", "Logic Critic"),
                persona("style", "Style Editor"),
                persona("legal", "Legal"),
            ],
            FolderMappings::new().with("work", &["style", "logic"]),
        ),
        storage.clone(),
        notifier.clone(),
    )
    .with_backend(backend);

    let report = usecase.review_document("work/Plan.md").await.unwrap();

    assert_eq!(report.artifact_path, "_reviews/Plan - Review.md");
    assert!(report.failures.is_empty());
    assert_eq!(report.result.comments[0].persona_name, "Style Editor");
    assert_eq!(
        report.result.comments[0].excerpt.as_deref(),
        Some("second quote")
    );

    let artifact = storage.file("_reviews/Plan - Review.md").unwrap();
    assert!(artifact.contains("original_note: \"[[work/Plan.md]]\""));
    assert!(artifact.contains("# Review for Plan"));
    let style_at = artifact.find("## Reviewer: Style Editor").unwrap();
    let logic_at = artifact.find("## Reviewer: Logic Critic").unwrap();
    assert!(style_at < logic_at);

    assert_eq!(
        storage.metadata.lock().unwrap().clone(),
        vec![(
            "work/Plan.md".to_string(),
            REVIEW_METADATA_KEY.to_string(),
            "[[_reviews/Plan - Review.md|Latest Review]]".to_string(),
        )]
    );
    assert_eq!(
        notifier.notices(),
        vec![
            Notice::ReviewStarted { persona_count: 2 },
            Notice::ArtifactSaved {
                path: "_reviews/Plan - Review.md".to_string()
            },
        ]
    );

    let mut stored = usecase.load_review("work/Plan.md").await.unwrap().unwrap();
    assert_eq!(stored.synthesis, "## Bottom Line Up Front\nSolid draft.");
    assert_eq!(stored.comments.len(), 2);
    assert!(stored.comments.iter().all(|c| !c.is_located()));

    let current = usecase.read_document("work/Plan.md").await.unwrap();
    assert_eq!(current, DOCUMENT);
    relocate_excerpts(&mut stored, &current);
    assert_eq!(stored.comments[0].start, Some(35));
    assert_eq!(stored.comments[1].start, Some(12));
}

#[tokio::test]
async fn test_existing_review_folder_is_reused() {
    let backend = ScriptedBackend::new(
        vec![("[logic]", Script::Reply { delay_ms: 0, text: "- point" })],
        Script::Reply { delay_ms: 0, text: "Summary" },
    );
    let storage = MemoryStorage::with_file("Plan.md", DOCUMENT);
    let usecase = ReviewUseCase::new(
        config(vec![persona("logic", "Logic Critic")], FolderMappings::new()),
        storage.clone(),
        Arc::new(RecordingNotifier::default()),
    )
    .with_backend(backend);

    usecase.review_document("Plan.md").await.unwrap();
    usecase.review_document("Plan.md").await.unwrap();

    assert_eq!(*storage.created_folders.lock().unwrap(), 1);
    assert_eq!(storage.metadata.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_no_personas_is_reported_before_any_call() {
    let backend = ScriptedBackend::new(vec![], Script::Fail);
    let notifier = Arc::new(RecordingNotifier::default());
    let usecase = ReviewUseCase::new(
        ReviewConfig::default(),
        MemoryStorage::with_file("Plan.md", DOCUMENT),
        notifier.clone(),
    )
    .with_backend(backend.clone());

    let err = usecase.review_document("Plan.md").await.unwrap_err();

    assert!(matches!(err, PanelError::NoPersonas));
    assert_eq!(notifier.notices(), vec![Notice::NoPersonasConfigured]);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_missing_backend_is_reported() {
    let notifier = Arc::new(RecordingNotifier::default());
    let usecase = ReviewUseCase::new(
        config(vec![persona("logic", "Logic Critic")], FolderMappings::new()),
        MemoryStorage::with_file("Plan.md", DOCUMENT),
        notifier.clone(),
    );

    let err = usecase.review_document("Plan.md").await.unwrap_err();

    assert!(matches!(err, PanelError::NoBackend));
    assert_eq!(notifier.notices(), vec![Notice::NoBackendConfigured]);
}

#[tokio::test]
async fn test_unreadable_document_fails_the_run_without_artifact() {
    let backend = ScriptedBackend::new(
        vec![("[logic]", Script::Reply { delay_ms: 0, text: "- point" })],
        Script::Reply { delay_ms: 0, text: "Summary" },
    );
    let storage = Arc::new(MemoryStorage::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let usecase = ReviewUseCase::new(
        config(vec![persona("logic", "Logic Critic")], FolderMappings::new()),
        storage.clone(),
        notifier.clone(),
    )
    .with_backend(backend.clone());

    let err = usecase.review_document("missing.md").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        notifier.notices().last(),
        Some(Notice::ReviewFailed { .. })
    ));
    assert!(backend.calls().is_empty());
    assert!(storage.files.lock().unwrap().is_empty());
    assert!(usecase.load_review("missing.md").await.unwrap().is_none());
}
