//! Call shapes produced by each adapter kind, checked against a recording mock.

use enigma_core::{Speaker, Transcript};
use enigma_llm::{
    AdapterError, Backend, ChatMessage, LlmError, MockProvider, ProviderAdapter, ProviderKind,
    ProviderRequest, RecordedCall,
};
use std::sync::Arc;
use std::time::Duration;

const SYSTEM: &str = "Eres el detective";
const ASK: &str = "Formula una pregunta de sí/no";

fn detective_after_opening() -> Transcript {
    let mut t = Transcript::new();
    t.append(Speaker::Other, "Un hombre aparece muerto en un campo con una mochila.");
    t
}

#[tokio::test]
async fn stateful_session_is_seeded_once_then_sent_deltas() {
    let mock = Arc::new(MockProvider::scripted(["¿Cayó de un avión?", "¿Falló el paracaídas?"]));
    let mut adapter =
        ProviderAdapter::new(ProviderKind::StatefulSession, Backend::Session(mock.clone()))
            .unwrap();
    let mut transcript = detective_after_opening();

    let first = adapter.call(SYSTEM, transcript.entries(), ASK).await.unwrap();
    transcript.append(Speaker::Own, first);
    transcript.append(Speaker::Other, "Sí");

    let second = adapter.call(SYSTEM, transcript.entries(), ASK).await.unwrap();
    assert_eq!(second, "¿Falló el paracaídas?");

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    let opens = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::OpenSession { .. }))
        .count();
    assert_eq!(opens, 1, "the seed must not be resent");

    match &calls[0] {
        RecordedCall::OpenSession { seed, .. } => {
            assert_eq!(seed.system_prompt, SYSTEM);
            assert_eq!(
                seed.history,
                vec![ChatMessage::user("Un hombre aparece muerto en un campo con una mochila.")]
            );
        }
        other => panic!("expected session open, got {:?}", other),
    }
    match &calls[2] {
        RecordedCall::SendInSession { text, .. } => assert_eq!(text, &format!("Sí\n\n{}", ASK)),
        other => panic!("expected in-session send, got {:?}", other),
    }
}

#[tokio::test]
async fn stateful_pending_question_is_sent_once() {
    let mock = Arc::new(MockProvider::scripted(["Sí", "No"]));
    let mut adapter = ProviderAdapter::for_backend(Backend::Session(mock.clone()));

    let mut judge = Transcript::new();
    judge.append(Speaker::Own, "Un hombre aparece muerto en un campo.");
    judge.append(Speaker::Other, "¿Cayó de un avión?");
    let answer = adapter
        .call("Eres el juez", judge.entries(), "¿Cayó de un avión?")
        .await
        .unwrap();
    judge.append(Speaker::Own, answer);
    judge.append(Speaker::Other, "¿Iba solo?");

    match adapter.build_call("Eres el juez", judge.entries(), "¿Iba solo?") {
        ProviderRequest::SendInSession { message, .. } => assert_eq!(message, "¿Iba solo?"),
        other => panic!("expected in-session send, got {:?}", other),
    }
}

#[tokio::test]
async fn stateless_replay_carries_full_history() {
    let mock = Arc::new(MockProvider::constant("¿Había agua cerca?"));
    let mut adapter =
        ProviderAdapter::new(ProviderKind::StatelessReplay, Backend::Stateless(mock.clone()))
            .unwrap();
    let mut transcript = detective_after_opening();
    transcript.append(Speaker::Own, "¿Era de noche?");
    transcript.append(Speaker::Other, "No");

    adapter.call(SYSTEM, transcript.entries(), ASK).await.unwrap();
    adapter.call(SYSTEM, transcript.entries(), ASK).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        match call {
            RecordedCall::Stateless {
                system_prompt,
                history,
                instruction,
            } => {
                assert_eq!(system_prompt, SYSTEM);
                assert_eq!(history.len(), 3);
                assert_eq!(history[1], ChatMessage::assistant("¿Era de noche?"));
                assert_eq!(history[2], ChatMessage::user("No"));
                assert_eq!(instruction, ASK);
            }
            other => panic!("expected stateless call, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn single_turn_flattens_history_into_instruction() {
    let mock = Arc::new(MockProvider::constant("Sí"));
    let mut adapter =
        ProviderAdapter::new(ProviderKind::SingleTurn, Backend::SingleTurn(mock.clone())).unwrap();

    let mut judge = Transcript::new();
    judge.append(Speaker::Own, "Un hombre aparece muerto.");
    judge.append(Speaker::Other, "¿Fue un accidente?");

    adapter
        .call("Eres el juez", judge.entries(), "¿Fue un accidente?")
        .await
        .unwrap();

    match &mock.calls()[0] {
        RecordedCall::SingleTurn {
            system_prompt,
            instruction,
        } => {
            assert_eq!(system_prompt, "Eres el juez");
            assert_eq!(
                instruction,
                "Conversation so far:\nYou: Un hombre aparece muerto.\n\n¿Fue un accidente?"
            );
        }
        other => panic!("expected single-turn call, got {:?}", other),
    }
}

#[tokio::test]
async fn blank_reply_is_an_empty_response() {
    let mock = Arc::new(MockProvider::constant("  \n "));
    let mut adapter = ProviderAdapter::for_backend(Backend::Stateless(mock));

    let err = adapter
        .call(SYSTEM, detective_after_opening().entries(), ASK)
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::EmptyResponse { .. }));
}

#[tokio::test]
async fn replies_are_trimmed() {
    let mock = Arc::new(MockProvider::constant("  Es correcto\n"));
    let mut adapter = ProviderAdapter::for_backend(Backend::SingleTurn(mock));

    let reply = adapter.call("Eres el juez", &[], "SOLUCIÓN: ...").await.unwrap();
    assert_eq!(reply, "Es correcto");
}

#[tokio::test]
async fn transport_failure_is_backend_unavailable() {
    let mock = Arc::new(MockProvider::failing("connection refused"));
    let mut adapter = ProviderAdapter::for_backend(Backend::Session(mock.clone()));

    let err = adapter
        .call(SYSTEM, detective_after_opening().entries(), ASK)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::BackendUnavailable(LlmError::ConnectionFailed(_))
    ));
    assert!(adapter.session().is_none());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let mock = Arc::new(MockProvider::constant("Sí").with_latency(500));
    let mut adapter = ProviderAdapter::for_backend(Backend::Stateless(mock))
        .with_timeout(Duration::from_millis(20));

    let err = adapter.call(SYSTEM, &[], ASK).await.unwrap_err();
    assert!(matches!(
        err,
        AdapterError::BackendUnavailable(LlmError::Timeout(_))
    ));
}

#[test]
fn kind_must_match_backend_surface() {
    let mock = Arc::new(MockProvider::constant("Sí"));
    let err = ProviderAdapter::new(ProviderKind::StatefulSession, Backend::Stateless(mock))
        .unwrap_err();
    assert!(matches!(err, AdapterError::UnsupportedProviderKind(_)));
}

#[tokio::test]
async fn closed_session_is_reseeded_with_full_history() {
    let mock = Arc::new(MockProvider::scripted(["¿Era de noche?", "¿Llovía?"]));
    let mut adapter = ProviderAdapter::for_backend(Backend::Session(mock.clone()));
    let mut transcript = detective_after_opening();

    let first = adapter.call(SYSTEM, transcript.entries(), ASK).await.unwrap();
    transcript.append(Speaker::Own, first);
    transcript.append(Speaker::Other, "No");

    adapter.close_session().await;
    assert_eq!(mock.open_sessions(), 0);

    match adapter.build_call(SYSTEM, transcript.entries(), ASK) {
        ProviderRequest::OpenSession { seed, message, .. } => {
            assert_eq!(seed.history.len(), 3);
            assert_eq!(message, ASK);
        }
        other => panic!("expected a fresh session, got {:?}", other),
    }
}

#[tokio::test]
async fn restored_transcript_seeds_first_call() {
    let mock = Arc::new(MockProvider::constant("¿Iba en globo?"));
    let mut adapter = ProviderAdapter::for_backend(Backend::Session(mock.clone()));

    let mut transcript = detective_after_opening();
    transcript.append(Speaker::Own, "¿Era de noche?");
    transcript.append(Speaker::Other, "No");
    transcript.append(Speaker::Own, "¿Cayó desde lo alto?");
    transcript.append(Speaker::Other, "Sí");

    adapter.call(SYSTEM, transcript.entries(), ASK).await.unwrap();

    match &mock.calls()[0] {
        RecordedCall::OpenSession { seed, .. } => {
            let roles: Vec<_> = seed.history.iter().map(|m| m.role).collect();
            assert_eq!(seed.history.len(), 5);
            assert_eq!(roles[3], enigma_llm::ChatRole::Assistant);
        }
        other => panic!("expected session open, got {:?}", other),
    }
    assert_eq!(adapter.session().and_then(|s| s.resident_through), Some(4));
}
