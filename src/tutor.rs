//! One tutoring turn, end to end.

use crate::error::Result;
use crate::feedback::{FaceRating, FeedbackQuestion, FeedbackRecord, FeedbackSink, PromptId, PromptRecord};
use crate::rag::{ContextChunk, ConversationalChain};
use crate::session::{AccessGate, Session};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What a successful turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// 1-based turn number within the session.
    pub turn: usize,
    pub answer: String,
    pub sources: Vec<ContextChunk>,
    /// Set when the feedback service accepted the turn.
    pub prompt_id: Option<PromptId>,
}

/// Gate, chain and feedback sink wired together for a participant.
pub struct Tutor {
    gate: AccessGate,
    api_key: Option<String>,
    chain: ConversationalChain,
    feedback: Arc<dyn FeedbackSink>,
    tags: Vec<String>,
}

impl Tutor {
    pub fn new(
        gate: AccessGate,
        api_key: Option<String>,
        chain: ConversationalChain,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        Self {
            gate,
            api_key,
            chain,
            feedback,
            tags: Vec::new(),
        }
    }

    /// Tags attached to every logged prompt.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn model_name(&self) -> &str {
        self.chain.model_name()
    }

    /// Answer a question and log the turn.
    ///
    /// Gate failures return before any external call. A failed model call
    /// leaves the session untouched. A failed log keeps the answer but
    /// leaves the turn unratable.
    #[instrument(skip(self, session, question), fields(session = %session.id()))]
    pub async fn ask(&self, session: &mut Session, question: &str) -> Result<TurnOutcome> {
        self.gate
            .check(self.api_key.as_deref(), Some(session.participant()), question)?;

        let question = question.trim();
        let response = self.chain.run(question, session.memory()).await?;

        let turn = session.record_exchange(question, &response.answer);
        debug!(state = "AppendHistory", turn);

        debug!(state = "LogFeedbackSlot", turn);
        let record = PromptRecord {
            session_id: session.id(),
            user_id: session.participant().to_string(),
            prompt: question.to_string(),
            generation: response.answer.clone(),
            model: self.chain.model_name().to_string(),
            tags: self.tags.clone(),
            created_at: Utc::now(),
        };
        let prompt_id = match self.feedback.log_prompt(&record).await {
            Ok(id) => {
                session.attach_prompt_id(turn, id.clone())?;
                Some(id)
            }
            Err(e) => {
                warn!("Turn {} was not logged: {}", turn, e);
                None
            }
        };

        info!("Completed turn {}", turn);
        Ok(TurnOutcome {
            turn,
            answer: response.answer,
            sources: response.sources,
            prompt_id,
        })
    }

    /// Rate one question of an answered turn.
    #[instrument(skip(self, session), fields(session = %session.id()))]
    pub async fn rate(
        &self,
        session: &mut Session,
        turn: usize,
        question: FeedbackQuestion,
        rating: FaceRating,
    ) -> Result<()> {
        let prompt_id = session.feedback_target(turn, question)?;
        let record = FeedbackRecord::faces(
            prompt_id,
            session.participant(),
            question,
            rating,
            self.chain.model_name(),
        );

        self.feedback.log_feedback(&record).await?;
        session.mark_rated(turn, question);
        debug!("Rated turn {} {} as {}", turn, question, rating.score());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::error::CodeeError;
    use crate::rag::mock::{CountingEmbedder, MockChatModel};
    use crate::rag::{PromptAssembler, Retriever};
    use crate::vector_store::{MemoryVectorStore, VectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        prompts: Mutex<Vec<PromptRecord>>,
        feedback: Mutex<Vec<FeedbackRecord>>,
        fail_prompts: bool,
    }

    #[async_trait]
    impl FeedbackSink for RecordingSink {
        async fn log_prompt(&self, record: &PromptRecord) -> Result<PromptId> {
            if self.fail_prompts {
                return Err(CodeeError::Feedback("offline".to_string()));
            }
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(record.clone());
            Ok(PromptId(format!("p{}", prompts.len())))
        }

        async fn log_feedback(&self, record: &FeedbackRecord) -> Result<()> {
            self.feedback.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct Fixture {
        tutor: Tutor,
        model: Arc<MockChatModel>,
        embedder: Arc<CountingEmbedder>,
        sink: Arc<RecordingSink>,
    }

    fn fixture(api_key: Option<&str>, sink: RecordingSink) -> Fixture {
        let model = Arc::new(MockChatModel::echo());
        let embedder = Arc::new(CountingEmbedder::new());
        let sink = Arc::new(sink);
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let retriever = Retriever::new(store, embedder.clone() as Arc<dyn Embedder>);
        let chain = ConversationalChain::new(retriever, PromptAssembler::default(), model.clone());

        let tutor = Tutor::new(
            AccessGate::new(Some("sk-class".to_string())),
            api_key.map(str::to_string),
            chain,
            sink.clone(),
        )
        .with_tags(vec!["codee_chat".to_string()]);

        Fixture {
            tutor,
            model,
            embedder,
            sink,
        }
    }

    #[tokio::test]
    async fn test_wrong_credential_makes_no_calls() {
        let f = fixture(Some("sk-guess"), RecordingSink::default());
        let mut session = Session::new("12", "Hi", 5);

        let err = f.tutor.ask(&mut session, "What is a bit?").await.unwrap_err();
        assert!(matches!(err, CodeeError::InvalidCredential));
        assert!(err.is_gate());

        assert_eq!(f.model.calls(), 0);
        assert_eq!(f.embedder.calls(), 0);
        assert!(f.sink.prompts.lock().unwrap().is_empty());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_participant_and_empty_query_make_no_calls() {
        let f = fixture(Some("sk-class"), RecordingSink::default());

        let mut anonymous = Session::new("", "Hi", 5);
        let err = f.tutor.ask(&mut anonymous, "What is a bit?").await.unwrap_err();
        assert!(matches!(err, CodeeError::MissingParticipant));

        let mut session = Session::new("12", "Hi", 5);
        let err = f.tutor.ask(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, CodeeError::EmptyQuery));

        assert_eq!(f.model.calls(), 0);
        assert_eq!(f.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_matching_credential_answers_and_logs() {
        let f = fixture(Some("sk-class"), RecordingSink::default());
        let mut session = Session::new("12", "Hi", 5);

        let outcome = f.tutor.ask(&mut session, " What is a bit? ").await.unwrap();
        assert_eq!(outcome.turn, 1);
        assert_eq!(outcome.answer, "echo: What is a bit?");
        assert_eq!(outcome.prompt_id, Some(PromptId("p1".to_string())));
        assert_eq!(f.model.calls(), 1);
        assert_eq!(f.embedder.calls(), 1);

        let prompts = f.sink.prompts.lock().unwrap();
        assert_eq!(prompts[0].session_id, session.id());
        assert_eq!(prompts[0].user_id, "12");
        assert_eq!(prompts[0].model, "mock-gpt");
        assert_eq!(prompts[0].tags, vec!["codee_chat".to_string()]);
    }

    #[tokio::test]
    async fn test_turn_trace_leaves_streaming_to_the_presenter() {
        let (_guard, logs) = crate::cli::stream::tests::capture_logs();
        let f = fixture(Some("sk-class"), RecordingSink::default());
        let mut session = Session::new("12", "Hi", 5);

        f.tutor.ask(&mut session, "What is a bit?").await.unwrap();

        let logs = logs.contents();
        assert!(logs.contains("AppendHistory"));
        assert!(logs.contains("LogFeedbackSlot"));
        assert!(!logs.contains("StreamResponse"));
    }

    #[tokio::test]
    async fn test_ratings_reference_their_turn() {
        let f = fixture(Some("sk-class"), RecordingSink::default());
        let mut session = Session::new("12", "Hi", 5);
        let rating = FaceRating::new(4).unwrap();

        assert!(matches!(
            f.tutor
                .rate(&mut session, 1, FeedbackQuestion::Answered, rating)
                .await,
            Err(CodeeError::FeedbackNotReady(1))
        ));

        f.tutor.ask(&mut session, "first").await.unwrap();
        f.tutor.ask(&mut session, "second").await.unwrap();

        for question in FeedbackQuestion::ALL {
            f.tutor.rate(&mut session, 2, question, rating).await.unwrap();
        }
        f.tutor
            .rate(&mut session, 1, FeedbackQuestion::Examples, rating)
            .await
            .unwrap();
        assert!(matches!(
            f.tutor
                .rate(&mut session, 2, FeedbackQuestion::Answered, rating)
                .await,
            Err(CodeeError::DuplicateFeedback { turn: 2, .. })
        ));

        let feedback = f.sink.feedback.lock().unwrap();
        assert_eq!(feedback.len(), 5);
        assert!(feedback[..4]
            .iter()
            .all(|r| r.prompt_id == PromptId("p2".to_string())));
        assert_eq!(feedback[4].prompt_id, PromptId("p1".to_string()));
        assert_eq!(feedback[4].component, FeedbackQuestion::Examples);
    }

    #[tokio::test]
    async fn test_unlogged_turn_keeps_answer_but_cannot_be_rated() {
        let f = fixture(
            Some("sk-class"),
            RecordingSink {
                fail_prompts: true,
                ..Default::default()
            },
        );
        let mut session = Session::new("12", "Hi", 5);

        let outcome = f.tutor.ask(&mut session, "What is a byte?").await.unwrap();
        assert!(outcome.prompt_id.is_none());
        assert_eq!(session.memory().len(), 1);

        let err = f
            .tutor
            .rate(&mut session, 1, FeedbackQuestion::Answered, FaceRating::new(5).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CodeeError::FeedbackNotReady(1)));
    }
}
