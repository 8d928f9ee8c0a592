//! End-to-end session scenarios driven through scripted services.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use dilemma_core::{
    Orchestrator, Services, SessionContext, TurnTiming,
    machine::{CLOSING_LINE, NOT_SURE_REPLY},
    manipulation::{Condition, UniformSource},
    message::{Message, Role},
    observer::RecordingObserver,
    services::{AttentionService, CompletionService, ListenService, VoiceService},
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

const SYSTEM: &str = "You are discussing the balloon dilemma.";
const GREETING: &str = "Hello! A balloon is sinking. Who should jump?";

/// Records everything spoken and always succeeds.
#[derive(Default)]
struct ScriptedVoice {
    spoken: Mutex<Vec<(String, bool)>>,
}

#[async_trait]
impl VoiceService for ScriptedVoice {
    async fn set_voice(&self) -> Result<()> {
        Ok(())
    }

    async fn speak(&self, text: &str, first_turn: bool) -> Result<()> {
        self.spoken.lock().unwrap().push((text.to_string(), first_turn));
        Ok(())
    }
}

struct NoAttention;

#[async_trait]
impl AttentionService for NoAttention {
    async fn attend_nearest(&self) -> Result<()> {
        Err(anyhow!("nobody in view"))
    }
}

/// Replays utterances; `None` entries simulate recognition failures.
struct ScriptedListen {
    utterances: Mutex<VecDeque<Option<&'static str>>>,
}

impl ScriptedListen {
    fn new(utterances: &[Option<&'static str>]) -> Self {
        Self {
            utterances: Mutex::new(utterances.iter().copied().collect()),
        }
    }
}

#[async_trait]
impl ListenService for ScriptedListen {
    async fn listen(&self) -> Result<String> {
        match self.utterances.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text.to_string()),
            Some(None) => Err(anyhow!("no speech captured")),
            None => Err(anyhow!("script exhausted")),
        }
    }
}

/// Replies with a fixed line and keeps every history it was sent.
#[derive(Default)]
struct ScriptedCompletion {
    histories: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, history: &[Message]) -> Result<String> {
        self.histories.lock().unwrap().push(history.to_vec());
        Ok("Could you tell me more about your choice?".to_string())
    }
}

struct FixedSource(VecDeque<f64>);

impl UniformSource for FixedSource {
    fn next_unit(&mut self) -> f64 {
        self.0.pop_front().unwrap_or(0.0)
    }
}

struct Harness {
    voice: Arc<ScriptedVoice>,
    completion: Arc<ScriptedCompletion>,
    observer: Arc<RecordingObserver>,
}

async fn run_session(
    utterances: &[Option<&'static str>],
    draws: &[f64],
) -> (dilemma_core::SessionReport, Harness) {
    let harness = Harness {
        voice: Arc::new(ScriptedVoice::default()),
        completion: Arc::new(ScriptedCompletion::default()),
        observer: Arc::new(RecordingObserver::default()),
    };
    let services = Services {
        voice: harness.voice.clone(),
        attention: Arc::new(NoAttention),
        listen: Arc::new(ScriptedListen::new(utterances)),
        completion: harness.completion.clone(),
    };
    let report = Orchestrator::new(
        SessionContext::new(SYSTEM, GREETING),
        FixedSource(draws.iter().copied().collect()),
        services,
        TurnTiming::immediate(),
        harness.observer.clone(),
    )
    .run()
    .await
    .expect("session should reach Done");
    (report, harness)
}

#[tokio::test]
async fn decision_then_yes_closes_the_session() {
    let (report, harness) =
        run_session(&[Some("I want the Pilot to jump"), Some("yes")], &[0.5, 0.2]).await;

    assert_eq!(report.condition, Some(Condition::Laughter));
    assert_eq!(report.context.extracted_person(), Some("pilot"));
    assert_eq!(report.context.last_result(), "yes");
    assert_eq!(
        report.context.messages(),
        &[
            Message::system(SYSTEM),
            Message::assistant(GREETING),
            Message::user("I want the Pilot to jump"),
            Message::assistant(CLOSING_LINE),
        ]
    );

    let spoken = harness.voice.spoken.lock().unwrap().clone();
    assert_eq!(
        spoken,
        vec![
            (GREETING.to_string(), true),
            ("Hahahaha! The pilot?".to_string(), false),
            (CLOSING_LINE.to_string(), false),
        ]
    );
    assert!(harness.completion.histories.lock().unwrap().is_empty());

    assert_eq!(
        harness.observer.states(),
        vec![
            "Setup.SetVoice",
            "Setup.AttendUser",
            "ConversationLoop.Speaking",
            "ConversationLoop.Listening",
            "Manipulation.Condition2",
            "Manipulation.Listening",
            "End",
            "Done",
        ]
    );
    let last = harness.observer.transitions().pop().unwrap();
    assert_eq!(last.extracted_person.as_deref(), Some("pilot"));
    assert_eq!(last.last_utterance, "yes");
}

#[tokio::test]
async fn negative_answer_hands_back_to_the_language_model() {
    let (report, harness) = run_session(
        &[
            Some("I want the teacher to jump"),
            Some("no"),
            Some("I want the teacher to jump"),
            Some("yeah"),
        ],
        &[0.1, 0.1],
    )
    .await;

    let histories = harness.completion.histories.lock().unwrap().clone();
    assert_eq!(histories.len(), 1);
    assert_eq!(
        histories[0],
        vec![
            Message::system(SYSTEM),
            Message::assistant(GREETING),
            Message::user("I want the teacher to jump"),
            Message::user(NOT_SURE_REPLY),
        ]
    );

    let spoken: Vec<String> = harness
        .voice
        .spoken
        .lock()
        .unwrap()
        .iter()
        .map(|(text, _)| text.clone())
        .collect();
    assert_eq!(
        spoken,
        vec![
            GREETING,
            "Hmmmmm, the teacher?",
            "Could you tell me more about your choice?",
            "Hmmmmm, the teacher?",
            CLOSING_LINE,
        ]
    );
    assert_eq!(report.context.latest(), &Message::assistant(CLOSING_LINE));
}

#[tokio::test]
async fn transcript_only_grows_and_first_turn_flag_flips_once() {
    let (report, harness) = run_session(
        &[
            None,
            Some("I would rather not say"),
            Some("I want the doctor to jump"),
            Some("maybe"),
            None,
            Some("yes, no"),
        ],
        &[0.9, 0.9, 0.5, 0.9],
    )
    .await;

    // Two rolls: the listen failure during confirmation re-asks.
    assert_eq!(report.condition, Some(Condition::Pause));

    let spoken = harness.voice.spoken.lock().unwrap().clone();
    let first_turns: Vec<bool> = spoken.iter().map(|(_, first)| *first).collect();
    assert_eq!(first_turns[0], true);
    assert!(first_turns[1..].iter().all(|first| !first));
    // The failed first listen re-prompts with the greeting.
    assert_eq!(spoken[1].0, GREETING);

    let messages = report.context.messages();
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[1..].iter().all(|m| m.role != Role::System));

    // Each completion saw the transcript so far; every earlier history is a
    // prefix of the final transcript.
    for history in harness.completion.histories.lock().unwrap().iter() {
        assert!(history.len() < messages.len());
        assert_eq!(history.as_slice(), &messages[..history.len()]);
    }
}
