#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use persona_relay::{
    base::{
        config::{Config, ConfigInner},
        prompts::{DEFAULT_ERROR_MESSAGE, QUOTE_SEPARATOR},
        types::{ChatTurn, CompletionError, ContentType, FailureReason, MessageEvent, ModelConfig, Sender, TurnRole, Void},
    },
    runtime::Runtime,
    service::{
        chat::{ChatClient, GenericChatClient, InboundFeed},
        llm::{GenericLlmClient, LlmClient},
    },
};

// Mocks.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn start(&self, feed: InboundFeed) -> Void;
        async fn send_message(&self, conversation_id: &str, text: &str) -> Void;
    }
}

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn complete(&self, model: &ModelConfig, turns: &[ChatTurn]) -> Result<String, CompletionError>;
    }
}

// Helpers.

type Sent = Arc<Mutex<Vec<(String, String)>>>;
type Requests = Arc<Mutex<Vec<Vec<ChatTurn>>>>;

/// A chat client that records every sent message.
fn get_mock_chat(sent: Sent) -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_start().returning(|_| Ok(()));
    mock.expect_send_message().returning(move |conversation_id, text| {
        sent.lock().unwrap().push((conversation_id.to_string(), text.to_string()));
        Ok(())
    });

    mock
}

/// An LLM client that records every request and answers with `reply`.
fn get_mock_llm(requests: Requests, reply: Result<String, CompletionError>) -> MockLlm {
    let mut mock = MockLlm::new();

    mock.expect_complete().returning(move |_, turns| {
        requests.lock().unwrap().push(turns.to_vec());
        reply.clone()
    });

    mock
}

fn create_test_config(keyword: &str, max_size: usize) -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_temperature: 0.8,
            openai_timeout_secs: 120,
            bot_name: "Bot".to_string(),
            disable_self_chat: true,
            trigger_keyword: keyword.to_string(),
            single_message_max_size: max_size,
            reserved_sender_names: vec!["USLACKBOT".to_string()],
            ignored_notices: vec!["收到红包，请在手机上查看".to_string()],
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            ..Default::default()
        }),
    }
}

struct TestEnvironment {
    runtime: Runtime,
    sent: Sent,
    requests: Requests,
}

fn setup_test_environment(config: Config, reply: Result<String, CompletionError>) -> TestEnvironment {
    let sent = Sent::default();
    let requests = Requests::default();

    let chat = ChatClient::new(Arc::new(get_mock_chat(sent.clone())));
    let llm = LlmClient::new(Arc::new(get_mock_llm(requests.clone(), reply)));

    TestEnvironment {
        runtime: Runtime::with_clients(config, llm, chat),
        sent,
        requests,
    }
}

fn private_message(text: &str) -> MessageEvent {
    MessageEvent {
        conversation_id: "D01".to_string(),
        sender: Sender {
            id: "U01".to_string(),
            name: "alice".to_string(),
            is_self: false,
        },
        group_id: None,
        content_type: ContentType::Text,
        text: text.to_string(),
    }
}

fn group_message(text: &str) -> MessageEvent {
    MessageEvent {
        conversation_id: "C01".to_string(),
        group_id: Some("C01".to_string()),
        ..private_message(text)
    }
}

// Tests.

#[tokio::test]
async fn test_private_message_is_relayed() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("  Hello there!  ".to_string()));

    env.runtime.router.handle_chat_event(private_message("chat hello")).await.unwrap();

    let requests = env.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0][0].role, TurnRole::System);
    assert!(requests[0][0].content.contains("丽丽"));
    assert_eq!(requests[0][1], ChatTurn::user(" hello"));

    let sent = env.sent.lock().unwrap();
    assert_eq!(*sent, vec![("D01".to_string(), "Hello there!".to_string())]);
}

#[tokio::test]
async fn test_private_message_without_keyword_is_dropped() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("unused".to_string()));

    env.runtime.router.handle_chat_event(private_message("hello")).await.unwrap();

    assert!(env.requests.lock().unwrap().is_empty());
    assert!(env.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_group_reply_includes_question() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("Hi!".to_string()));

    env.runtime.router.handle_chat_event(group_message("@Bot chat hi")).await.unwrap();

    assert_eq!(env.requests.lock().unwrap()[0][1], ChatTurn::user(" hi"));

    let sent = env.sent.lock().unwrap();
    assert_eq!(*sent, vec![("C01".to_string(), " hi\n----------\nHi!".to_string())]);
}

#[tokio::test]
async fn test_group_message_without_mention_is_dropped() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("unused".to_string()));

    env.runtime.router.handle_chat_event(group_message("chat hi")).await.unwrap();

    assert!(env.requests.lock().unwrap().is_empty());
    assert!(env.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_quoted_reply_forwards_only_new_content() {
    let env = setup_test_environment(create_test_config("", 500), Ok("ok".to_string()));
    let text = format!("「alice：old question」\n{QUOTE_SEPARATOR}\nnew question");

    env.runtime.router.handle_chat_event(private_message(&text)).await.unwrap();

    assert_eq!(env.requests.lock().unwrap()[0][1], ChatTurn::user("\nnew question"));
}

#[tokio::test]
async fn test_ineligible_messages_are_dropped() {
    let env = setup_test_environment(create_test_config("", 500), Ok("unused".to_string()));

    let mut from_self = private_message("hello");
    from_self.sender.is_self = true;

    let mut image = private_message("hello");
    image.content_type = ContentType::Image;

    let mut service_account = private_message("hello");
    service_account.sender.name = "USLACKBOT".to_string();

    let notice = private_message("收到红包，请在手机上查看");

    for event in [from_self, image, service_account, notice] {
        env.runtime.router.handle_chat_event(event).await.unwrap();
    }

    assert!(env.requests.lock().unwrap().is_empty());
    assert!(env.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_long_reply_is_chunked_in_order() {
    let env = setup_test_environment(create_test_config("", 4), Ok("abcdefghij".to_string()));

    env.runtime.router.handle_chat_event(private_message("hello")).await.unwrap();

    let sent = env.sent.lock().unwrap();
    let chunks = sent.iter().map(|(_, text)| text.as_str()).collect::<Vec<_>>();
    assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
}

#[tokio::test]
async fn test_completion_failure_sends_fallback() {
    let failure = CompletionError {
        reason: FailureReason::Auth,
        status_code: Some(401),
        status_text: Some("Unauthorized".to_string()),
        message: Some("Incorrect API key provided".to_string()),
    };
    let env = setup_test_environment(create_test_config("chat", 500), Err(failure));

    env.runtime.router.handle_chat_event(private_message("chat hello")).await.unwrap();

    let sent = env.sent.lock().unwrap();
    assert_eq!(*sent, vec![("D01".to_string(), DEFAULT_ERROR_MESSAGE.to_string())]);
}

#[tokio::test]
async fn test_persona_command_switches_persona_without_relaying() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("ok".to_string()));

    env.runtime.router.handle_chat_event(group_message("@Bot 绫波丽出来")).await.unwrap();

    assert!(env.requests.lock().unwrap().is_empty());
    assert_eq!(*env.sent.lock().unwrap(), vec![("C01".to_string(), "🤖️：人格已切换到绫波丽".to_string())]);
    assert!(env.runtime.router.persona().current().await.contains("绫波丽"));

    // The new persona applies to the next relayed message.

    env.runtime.router.handle_chat_event(private_message("chat hello")).await.unwrap();

    let requests = env.requests.lock().unwrap();
    assert!(requests[0][0].content.contains("绫波丽"));
}

#[tokio::test]
async fn test_persona_command_applies_even_to_ineligible_messages() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("ok".to_string()));

    let mut event = private_message("@Bot 逼乎模式");
    event.sender.is_self = true;

    env.runtime.router.handle_chat_event(event).await.unwrap();

    assert!(env.runtime.router.persona().current().await.contains("知乎"));
}

#[tokio::test]
async fn test_only_first_persona_command_applies() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("ok".to_string()));

    env.runtime.router.handle_chat_event(private_message("@Bot 清空人格 @Bot RPG模式")).await.unwrap();

    assert_eq!(env.sent.lock().unwrap().len(), 1);
    assert_eq!(env.sent.lock().unwrap()[0].1, "🤖️：已激活RPG模式");
    assert!(env.runtime.router.persona().current().await.contains("冒险游戏"));
}

#[tokio::test]
async fn test_raw_persona_command_stores_message_verbatim() {
    let env = setup_test_environment(create_test_config("chat", 500), Ok("ok".to_string()));
    let text = "@Bot -s You are a pirate who answers in rhymes.";

    env.runtime.router.handle_chat_event(private_message(text)).await.unwrap();

    assert_eq!(env.runtime.router.persona().current().await, text);
}

#[tokio::test]
async fn test_send_failure_is_reported_to_caller() {
    let mut chat = MockChat::new();
    chat.expect_send_message().returning(|_, _| Err(anyhow::anyhow!("channel_not_found")));

    let requests = Requests::default();
    let llm = LlmClient::new(Arc::new(get_mock_llm(requests, Ok("hi".to_string()))));
    let runtime = Runtime::with_clients(create_test_config("chat", 500), llm, ChatClient::new(Arc::new(chat)));

    let result = runtime.router.handle_chat_event(private_message("chat hello")).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_start_handles_messages_queued_before_listener_stops() {
    let sent = Sent::default();
    let requests = Requests::default();

    let mut chat = MockChat::new();
    chat.expect_start().returning(|feed| {
        feed.send(private_message("chat one")).unwrap();
        feed.send(private_message("chat two")).unwrap();
        Ok(())
    });
    chat.expect_send_message().returning({
        let sent = sent.clone();
        move |conversation_id, text| {
            sent.lock().unwrap().push((conversation_id.to_string(), text.to_string()));
            Ok(())
        }
    });

    let llm = LlmClient::new(Arc::new(get_mock_llm(requests.clone(), Ok("reply".to_string()))));
    let runtime = Runtime::with_clients(create_test_config("chat", 500), llm, ChatClient::new(Arc::new(chat)));

    runtime.start().await.unwrap();

    // One warm-up completion, then one per queued message.
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1][1], ChatTurn::user(" one"));
    assert_eq!(requests[2][1], ChatTurn::user(" two"));

    let sent = sent.lock().unwrap();
    assert_eq!(*sent, vec![("D01".to_string(), "reply".to_string()), ("D01".to_string(), "reply".to_string())]);
}

#[tokio::test]
async fn test_failed_delivery_does_not_block_next_message() {
    let sent = Sent::default();
    let sent_clone = sent.clone();

    let mut chat = MockChat::new();
    chat.expect_start().returning(|feed| {
        feed.send(private_message("chat first")).unwrap();
        feed.send(private_message("chat second")).unwrap();
        Ok(())
    });
    chat.expect_send_message().returning(move |conversation_id, text| {
        let mut sent = sent_clone.lock().unwrap();
        sent.push((conversation_id.to_string(), text.to_string()));

        // The first delivery fails; the second message must still be handled.
        if sent.len() == 1 { Err(anyhow::anyhow!("delivery failed")) } else { Ok(()) }
    });

    let requests = Requests::default();
    let llm = LlmClient::new(Arc::new(get_mock_llm(requests.clone(), Ok("reply".to_string()))));
    let runtime = Runtime::with_clients(create_test_config("chat", 500), llm, ChatClient::new(Arc::new(chat)));

    runtime.start().await.unwrap();

    // The warm-up completion plus both messages.
    assert_eq!(requests.lock().unwrap().len(), 3);
    assert_eq!(sent.lock().unwrap().len(), 2);
}
